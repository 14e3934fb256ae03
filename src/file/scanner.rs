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


//! Chapter file discovery
//!
//! Lists the audio files directly inside a book directory and returns them
//! sorted by file name. Chapter order IS file name order: files must carry
//! zero-padded ordinals (`01`, `02`, ..., `10`) to bind in the intended order.
//! Unpadded names sort as `1, 10, 11, 2, ...` and are bound that way; the
//! scanner does not try to guess numeric order.

use crate::error::{BinderError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Audio extensions recognised by default
///
/// `m4b` is left out so a previously bound book sitting in the same
/// directory is never picked up as a chapter.
pub const DEFAULT_AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "flac", "ogg", "opus", "wav"];

/// Directory scanner for chapter files
#[derive(Debug, Clone)]
pub struct FileScanner {
    extensions: Vec<String>,
}

impl FileScanner {
    /// Create a scanner matching the given extensions (case-insensitive, no dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: normalize_extensions(extensions),
        }
    }

    /// Scan `directory` and return matching files in lexicographic file name order
    ///
    /// Fails with `DirectoryNotFound` if the path is missing or not a
    /// directory, and with `NoAudioFilesFound` if nothing matches.
    pub async fn scan(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let files = list_matching_files(directory, &self.extensions).await?;

        if files.is_empty() {
            return Err(BinderError::NoAudioFilesFound(directory.to_path_buf()));
        }

        Ok(files)
    }

    /// Check if file has one of the recognised audio extensions
    pub fn is_audio_file(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIO_EXTENSIONS)
    }
}

/// Lowercase and strip leading dots so `".MP3"` and `"mp3"` are equivalent
pub(crate) fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let ext = ext.to_lowercase();
            extensions.iter().any(|e| *e == ext)
        }
        None => false,
    }
}

/// List regular, non-hidden files of `directory` with one of `extensions`,
/// sorted by file name
///
/// Shared by the chapter scanner and the cover art locator so both use the
/// same ordering.
pub(crate) async fn list_matching_files(
    directory: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let is_dir = fs::metadata(directory)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(BinderError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut entries = fs::read_dir(directory)
        .await
        .map_err(|e| BinderError::file_io("read_dir", directory, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| BinderError::file_io("read_dir", directory, e))?
    {
        let name = entry.file_name();
        // Skip dotfiles such as macOS "._01.mp3" resource forks
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        // Follows symlinks, so a linked chapter file still counts
        let is_file = fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
        if is_file && has_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_scan_sorts_zero_padded_names_in_chapter_order() {
        let temp_dir = TempDir::new().unwrap();
        for i in (1..=12).rev() {
            touch(temp_dir.path(), &format!("{:02}_chapter.mp3", i));
        }

        let files = FileScanner::default().scan(temp_dir.path()).await.unwrap();
        let expected: Vec<String> = (1..=12).map(|i| format!("{:02}_chapter.mp3", i)).collect();
        assert_eq!(names(&files), expected);
    }

    #[tokio::test]
    async fn test_scan_unpadded_names_sort_lexicographically() {
        let temp_dir = TempDir::new().unwrap();
        for i in 1..=12 {
            touch(temp_dir.path(), &format!("{}.mp3", i));
        }

        let files = FileScanner::default().scan(temp_dir.path()).await.unwrap();
        let order: Vec<String> = names(&files)
            .into_iter()
            .map(|n| n.trim_end_matches(".mp3").to_string())
            .collect();
        assert_eq!(
            order,
            vec!["1", "10", "11", "12", "2", "3", "4", "5", "6", "7", "8", "9"]
        );
    }

    #[tokio::test]
    async fn test_scan_filters_extensions_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "01.MP3");
        touch(temp_dir.path(), "02.mp3");
        touch(temp_dir.path(), "cover.jpg");
        touch(temp_dir.path(), "notes.txt");
        touch(temp_dir.path(), "Old Book.m4b");
        touch(temp_dir.path(), "._01.mp3");
        std::fs::create_dir(temp_dir.path().join("03.mp3")).unwrap();

        let files = FileScanner::new(["mp3"]).scan(temp_dir.path()).await.unwrap();
        assert_eq!(names(&files), vec!["01.MP3", "02.mp3"]);
    }

    #[tokio::test]
    async fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileScanner::default().scan(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, BinderError::NoAudioFilesFound(_)));
    }

    #[tokio::test]
    async fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let err = FileScanner::default().scan(&missing).await.unwrap_err();
        assert!(matches!(err, BinderError::DirectoryNotFound(p) if p == missing));
    }

    #[tokio::test]
    async fn test_scan_file_instead_of_directory() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "01.mp3");
        let err = FileScanner::default()
            .scan(&temp_dir.path().join("01.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, BinderError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_normalize_extensions() {
        assert_eq!(
            normalize_extensions([".MP3", " m4a ", ""]),
            vec!["mp3".to_string(), "m4a".to_string()]
        );
    }

    #[test]
    fn test_is_audio_file() {
        let scanner = FileScanner::default();
        assert!(scanner.is_audio_file(Path::new("01.flac")));
        assert!(!scanner.is_audio_file(Path::new("01.m4b")));
        assert!(!scanner.is_audio_file(Path::new("README")));
    }
}
