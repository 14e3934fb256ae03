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


//! Chapter planning
//!
//! One chapter per bound file, in file order.
//!
//! # Offsets
//! `start[0] = 0`, `start[i] = start[i-1] + duration[i-1]`. A chapter ends
//! where the next one starts; the last one ends at the total duration.
//!
//! # Titles
//! With a number separator such as `" - "`, `01 - The Beginning.mp3` becomes
//! `The Beginning` (everything after the first separator). Files without the
//! separator, or where nothing follows it, keep their file name without
//! extension, trimmed. The fallback applies per file; a blank stem keeps the
//! full file name so no chapter is untitled.

use crate::audio::metadata::Chapter;
use crate::audio::probe::AudioFile;

/// Chapter planner
#[derive(Debug, Clone, Default)]
pub struct ChapterPlanner {
    number_separator: Option<String>,
}

impl ChapterPlanner {
    /// `None` or an empty separator means "title = file name without extension"
    pub fn new(number_separator: Option<String>) -> Self {
        Self {
            number_separator: number_separator.filter(|s| !s.is_empty()),
        }
    }

    /// Build the chapter list for `files`
    pub fn plan(&self, files: &[AudioFile]) -> Vec<Chapter> {
        let mut chapters = Vec::with_capacity(files.len());
        let mut start_seconds = 0.0_f64;

        for file in files {
            let end_seconds = start_seconds + file.duration_seconds().max(0.0);
            chapters.push(Chapter {
                title: self.title_for(file),
                start_seconds,
                end_seconds,
            });
            start_seconds = end_seconds;
        }

        chapters
    }

    /// Derive a chapter title from a file name without extension
    ///
    /// The result is trimmed and may be empty only for a blank stem.
    pub fn chapter_title(&self, file_stem: &str) -> String {
        let derived = self
            .number_separator
            .as_deref()
            .and_then(|sep| file_stem.split_once(sep))
            .map(|(_, rest)| rest.trim())
            .filter(|rest| !rest.is_empty());

        derived.unwrap_or_else(|| file_stem.trim()).to_string()
    }

    /// Chapter title for a file, never blank
    fn title_for(&self, file: &AudioFile) -> String {
        let title = self.chapter_title(&file.file_stem());
        if title.is_empty() {
            file.file_name()
        } else {
            title
        }
    }
}
