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


//! Binder configuration
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change:
//!
//! ```json
//! { "codec": "alac", "number_separator": " - ", "probe_workers": 4 }
//! ```
//!
//! Command-line flags override these values for a single run.

use crate::audio::codec::Codec;
use crate::audio::probe::default_probe_workers;
use crate::error::{BinderError, Result};
use crate::file::cover::DEFAULT_IMAGE_EXTENSIONS;
use crate::file::scanner::DEFAULT_AUDIO_EXTENSIONS;
use crate::inference::book_info::DEFAULT_DIRECTORY_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default genre tag for bound books
pub const DEFAULT_GENRE: &str = "Audiobooks";

/// Default output container extension
pub const DEFAULT_OUTPUT_EXTENSION: &str = "m4b";

/// Binder options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Extensions (without dot) treated as chapter files
    pub audio_extensions: Vec<String>,

    /// Extensions (without dot) treated as cover images
    pub image_extensions: Vec<String>,

    /// Separator between title and author in directory names
    pub directory_separator: String,

    /// Separator between chapter number and chapter title in file names
    pub number_separator: Option<String>,

    /// Output audio codec
    pub codec: Codec,

    /// Concurrent ffprobe processes; `None` uses the CPU count
    pub probe_workers: Option<usize>,

    pub ffprobe_path: String,

    pub ffmpeg_path: String,

    /// Genre tag written into the output
    pub genre: String,

    /// Output container extension (without dot)
    pub output_extension: String,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            audio_extensions: to_strings(DEFAULT_AUDIO_EXTENSIONS),
            image_extensions: to_strings(DEFAULT_IMAGE_EXTENSIONS),
            directory_separator: DEFAULT_DIRECTORY_SEPARATOR.to_string(),
            number_separator: None,
            codec: Codec::default(),
            probe_workers: None,
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            genre: DEFAULT_GENRE.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl BinderConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BinderError::invalid_config(format!("unreadable config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BinderError::file_io("read config", path, e))?;
        Self::from_json_str(&json)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.audio_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(BinderError::invalid_config("audio_extensions must not be empty"));
        }
        if self.image_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(BinderError::invalid_config("image_extensions must not be empty"));
        }
        if self.directory_separator.is_empty() {
            return Err(BinderError::invalid_config("directory_separator must not be empty"));
        }
        if self.probe_workers == Some(0) {
            return Err(BinderError::invalid_config("probe_workers must be at least 1"));
        }
        if self.ffprobe_path.trim().is_empty() || self.ffmpeg_path.trim().is_empty() {
            return Err(BinderError::invalid_config("ffprobe_path and ffmpeg_path must be set"));
        }
        let extension = self.output_extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(BinderError::invalid_config(format!(
                "invalid output_extension: {:?}",
                self.output_extension
            )));
        }
        Ok(())
    }

    /// Effective number of concurrent probes
    pub fn probe_workers(&self) -> usize {
        self.probe_workers.unwrap_or_else(default_probe_workers)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
