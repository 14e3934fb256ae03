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


//! Bind plan composition
//!
//! # Pipeline
//! 1. Resolve the book directory (canonicalized, so `.` has a real name)
//! 2. Scan for chapter files in file name order
//! 3. Infer title and author; an empty title fails here, before any probe
//!    process is spawned
//! 4. Locate cover art
//! 5. Probe every file for duration and bitrate
//! 6. Resolve the output bitrate
//! 7. Plan chapters
//!
//! The first failure aborts the run and no partial plan is produced.

use crate::audio::codec::Codec;
use crate::audio::metadata::{BookTags, Chapter, ChapterEditor};
use crate::audio::probe::{probe_all, AudioFile, MediaProbe};
use crate::config::BinderConfig;
use crate::error::{BinderError, Result};
use crate::file::cover::CoverArtLocator;
use crate::file::paths::output_file_name;
use crate::file::scanner::FileScanner;
use crate::inference::bitrate::BitrateResolver;
use crate::inference::book_info::MetadataInferencer;
use crate::inference::chapters::ChapterPlanner;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Caller-supplied inputs for one bind
///
/// Every override is optional; empty strings count as not supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindRequest {
    /// Book directory containing the chapter files
    pub directory: PathBuf,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Cover image to use instead of searching the directory
    pub cover: Option<PathBuf>,
    pub codec: Option<Codec>,
    /// Output bitrate in kbps
    pub bitrate_kbps: Option<u32>,
    /// Separator between chapter number and chapter title in file names
    pub number_separator: Option<String>,
}

impl BindRequest {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }
}

/// Complete, immutable instructions for producing one audiobook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindPlan {
    pub(crate) files: Vec<AudioFile>,
    pub(crate) output_path: PathBuf,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) bitrate_kbps: u32,
    pub(crate) codec: Codec,
    pub(crate) cover: Option<PathBuf>,
    pub(crate) chapters: Vec<Chapter>,
}

impl BindPlan {
    /// Input files in bind order
    pub fn files(&self) -> &[AudioFile] {
        &self.files
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Empty when unknown
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn cover(&self) -> Option<&Path> {
        self.cover.as_deref()
    }

    /// One chapter per file, same order as [`BindPlan::files`]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Sum of all file durations in seconds
    pub fn total_duration_seconds(&self) -> f64 {
        self.chapters.last().map(|c| c.end_seconds).unwrap_or(0.0)
    }

    /// FFMETADATA1 document with book tags and chapters
    pub fn ffmetadata(&self, genre: &str) -> String {
        let tags = BookTags {
            title: &self.title,
            author: &self.author,
            genre,
        };
        ChapterEditor::generate_ffmetadata(&tags, &self.chapters)
    }

    /// Human readable table of contents
    pub fn chapter_list(&self) -> String {
        ChapterEditor::generate_chapter_list(&self.chapters)
    }
}

/// Builds a [`BindPlan`] from a [`BindRequest`]
pub struct BindPlanComposer<P: MediaProbe> {
    config: BinderConfig,
    probe: P,
}

impl<P: MediaProbe> BindPlanComposer<P> {
    pub fn new(config: BinderConfig, probe: P) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Run the planning pipeline for one book directory
    pub async fn compose(&self, request: &BindRequest) -> Result<BindPlan> {
        let directory = tokio::fs::canonicalize(&request.directory)
            .await
            .map_err(|_| BinderError::DirectoryNotFound(request.directory.clone()))?;

        let scanner = FileScanner::new(&self.config.audio_extensions);
        let paths = scanner.scan(&directory).await?;
        info!(directory = %directory.display(), files = paths.len(), "found chapter files");

        let directory_name = directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let book = MetadataInferencer::new(self.config.directory_separator.as_str()).infer(
            &directory_name,
            request.title.as_deref(),
            request.author.as_deref(),
        );
        if book.title.is_empty() {
            return Err(BinderError::IncompleteConfiguration(format!(
                "no title could be inferred from directory name {:?}; pass a title explicitly",
                directory_name
            )));
        }
        info!(title = %book.title, author = %book.author, "resolved book info");

        let cover = CoverArtLocator::new(&self.config.image_extensions)
            .locate(
                &directory,
                request
                    .cover
                    .as_deref()
                    .filter(|p| !p.as_os_str().is_empty()),
            )
            .await?;
        match &cover {
            Some(path) => info!(cover = %path.display(), "using cover art"),
            None => info!("no cover art found"),
        }

        let files = probe_all(&self.probe, paths, self.config.probe_workers()).await?;

        let bitrates: Vec<u32> = files.iter().map(AudioFile::bitrate_kbps).collect();
        debug!(?bitrates, "detected bitrates");
        let bitrate_kbps = BitrateResolver::resolve(&bitrates, request.bitrate_kbps);
        info!(bitrate_kbps, "resolved output bitrate");

        let number_separator = non_empty(request.number_separator.clone())
            .or_else(|| self.config.number_separator.clone());
        let chapters = ChapterPlanner::new(number_separator).plan(&files);

        let output_path = directory.join(output_file_name(
            &book.title,
            &book.author,
            &self.config.output_extension,
        ));

        Ok(BindPlan {
            files,
            output_path,
            title: book.title,
            author: book.author,
            bitrate_kbps,
            codec: request.codec.unwrap_or(self.config.codec),
            cover,
            chapters,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
