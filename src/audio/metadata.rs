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


//! Chapter markers and FFmpeg metadata files
//!
//! # Metadata Embedding Strategy
//! - FFmpeg reads global tags and chapters from an FFMETADATA1 file passed
//!   as an extra input and selected with `-map_metadata` / `-map_chapters`
//! - Standard tags: title, album (= title), artist and album_artist (author),
//!   genre
//!
//! # Chapter Markers
//! - One `[CHAPTER]` block per bound file, `TIMEBASE=1/1000`
//! - Chapters are contiguous: each END is the next chapter's START and the
//!   last END is the total duration of the book

use serde::{Deserialize, Serialize};

/// One table-of-contents entry of the bound audiobook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// Start offset in seconds from the beginning of the book
    pub start_seconds: f64,
    /// End offset in seconds (start of the next chapter, or total duration)
    pub end_seconds: f64,
}

impl Chapter {
    /// Get chapter duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Start offset in milliseconds
    pub fn start_ms(&self) -> u64 {
        seconds_to_ms(self.start_seconds)
    }

    /// End offset in milliseconds
    pub fn end_ms(&self) -> u64 {
        seconds_to_ms(self.end_seconds)
    }

    /// Format timestamp for FFmpeg (HH:MM:SS.mmm)
    ///
    /// Hours are not wrapped, so books longer than a day print e.g. `26:00:00.000`.
    pub fn format_ffmpeg_timestamp(ms: u64) -> String {
        let total_seconds = ms / 1000;
        let milliseconds = ms % 1000;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            hours, minutes, seconds, milliseconds
        )
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Book-level tags written into the FFMETADATA header
#[derive(Debug, Clone, Copy)]
pub struct BookTags<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub genre: &'a str,
}

/// Chapter file generation for FFmpeg
pub struct ChapterEditor;

impl ChapterEditor {
    /// Generate FFmetadata format content
    ///
    /// Empty author/genre tags are omitted rather than written blank.
    pub fn generate_ffmetadata(tags: &BookTags<'_>, chapters: &[Chapter]) -> String {
        let mut content = String::from(";FFMETADATA1\n");

        content.push_str(&format!("title={}\n", escape_value(tags.title)));
        content.push_str(&format!("album={}\n", escape_value(tags.title)));
        if !tags.author.is_empty() {
            content.push_str(&format!("artist={}\n", escape_value(tags.author)));
            content.push_str(&format!("album_artist={}\n", escape_value(tags.author)));
        }
        if !tags.genre.is_empty() {
            content.push_str(&format!("genre={}\n", escape_value(tags.genre)));
        }

        for chapter in chapters {
            content.push_str("\n[CHAPTER]\n");
            content.push_str("TIMEBASE=1/1000\n");
            content.push_str(&format!("START={}\n", chapter.start_ms()));
            content.push_str(&format!("END={}\n", chapter.end_ms()));
            content.push_str(&format!("title={}\n", escape_value(&chapter.title)));
        }

        content
    }

    /// Human readable chapter list, one `HH:MM:SS.mmm Title` line per chapter
    pub fn generate_chapter_list(chapters: &[Chapter]) -> String {
        chapters
            .iter()
            .map(|c| {
                format!(
                    "{} {}\n",
                    Chapter::format_ffmpeg_timestamp(c.start_ms()),
                    c.title
                )
            })
            .collect()
    }
}

/// Escape a value for the FFMETADATA1 format
///
/// `=`, `;`, `#`, `\` and newlines must be backslash-escaped.
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
