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


//! Output audio codecs
//!
//! The identifiers are FFmpeg encoder names and are passed to `-c:a` as-is.
//! AAC is the default for a compressed audiobook, FLAC/ALAC for lossless.

use crate::error::{BinderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Audio encoder used for the bound container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// AAC (FFmpeg native encoder)
    #[default]
    Aac,
    /// Apple Lossless
    Alac,
    /// Free Lossless Audio Codec
    Flac,
    /// MP3 via LAME
    #[cfg_attr(feature = "cli", value(name = "libmp3lame"))]
    Libmp3lame,
    /// MPEG-4 Part 2
    #[cfg_attr(feature = "cli", value(name = "mpeg4"))]
    Mpeg4,
}

impl Codec {
    /// All supported codecs, in CLI help order
    pub const ALL: [Codec; 5] = [
        Codec::Aac,
        Codec::Alac,
        Codec::Flac,
        Codec::Libmp3lame,
        Codec::Mpeg4,
    ];

    /// FFmpeg encoder name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Alac => "alac",
            Self::Flac => "flac",
            Self::Libmp3lame => "libmp3lame",
            Self::Mpeg4 => "mpeg4",
        }
    }

    /// Lossless encoders ignore `-b:a`, so no bitrate is passed for them
    pub fn is_lossless(&self) -> bool {
        matches!(self, Self::Alac | Self::Flac)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = BinderError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|codec| codec.as_str() == wanted)
            .ok_or_else(|| BinderError::InvalidCodec(s.to_string()))
    }
}
