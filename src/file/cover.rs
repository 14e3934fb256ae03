// Bookbinder - Audiobook binder for chapter files
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Cover art discovery
//!
//! An explicitly requested image must exist. Without one, the first image in
//! the book directory (same file name ordering as the chapter scanner) is
//! used. A book without any image is bound without cover art.

use crate::error::{BinderError, Result};
use crate::file::scanner::{list_matching_files, normalize_extensions};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Image extensions recognised by default
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Cover art locator
#[derive(Debug, Clone)]
pub struct CoverArtLocator {
    extensions: Vec<String>,
}

impl CoverArtLocator {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: normalize_extensions(extensions),
        }
    }

    /// Resolve the cover image for a book directory
    ///
    /// Returns `explicit` unchanged when it points at an existing file,
    /// `CoverArtNotFound` when it does not, and otherwise the first image
    /// found in `directory` (or `None`).
    pub async fn locate(&self, directory: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            let is_file = fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                return Err(BinderError::CoverArtNotFound(path.to_path_buf()));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let images = list_matching_files(directory, &self.extensions).await?;
        Ok(images.into_iter().next())
    }
}

impl Default for CoverArtLocator {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_locate_first_image_by_name() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("folder.png"), b"png").unwrap();
        std::fs::write(temp_dir.path().join("cover.JPG"), b"jpg").unwrap();
        std::fs::write(temp_dir.path().join("01.mp3"), b"").unwrap();

        let cover = CoverArtLocator::default()
            .locate(temp_dir.path(), None)
            .await
            .unwrap();
        assert_eq!(cover, Some(temp_dir.path().join("cover.JPG")));
    }

    #[tokio::test]
    async fn test_locate_without_images_is_none() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("01.mp3"), b"").unwrap();

        let cover = CoverArtLocator::default()
            .locate(temp_dir.path(), None)
            .await
            .unwrap();
        assert_eq!(cover, None);
    }

    #[tokio::test]
    async fn test_explicit_cover_wins() {
        let temp_dir = TempDir::new().unwrap();
        let art_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("cover.jpg"), b"jpg").unwrap();
        let explicit = art_dir.path().join("art.webp");
        std::fs::write(&explicit, b"webp").unwrap();

        let cover = CoverArtLocator::default()
            .locate(temp_dir.path(), Some(&explicit))
            .await
            .unwrap();
        assert_eq!(cover, Some(explicit));
    }

    #[tokio::test]
    async fn test_missing_explicit_cover_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.jpg");

        let err = CoverArtLocator::default()
            .locate(temp_dir.path(), Some(&missing))
            .await
            .unwrap_err();
        assert!(matches!(err, BinderError::CoverArtNotFound(p) if p == missing));
    }
}
