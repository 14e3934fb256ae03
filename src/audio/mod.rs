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


//! Audio inspection and encoding
//!
//! # Module Organization
//!
//! ## probe
//! Duration and bitrate inspection through ffprobe:
//! - `MediaProbe` - Probe seam, replaceable in tests
//! - `FfprobeProbe` - ffprobe-backed implementation
//! - `probe_all` - Bounded concurrent probing that preserves input order
//!
//! ## codec
//! - `Codec` - Output audio codecs accepted by the encoder
//!
//! ## metadata
//! - `Chapter` - Chapter marker with start/end offsets
//! - `ChapterEditor` - FFMETADATA1 and chapter list rendering
//!
//! ## encoder
//! - `AudiobookEncoder` - Turns a bind plan into an ffmpeg invocation
//!
//! # FFmpeg Integration
//!
//! Probing needs `ffprobe` and encoding needs `ffmpeg`, both looked up in
//! PATH unless configured otherwise. Planning a book with `--dry-run` only
//! needs `ffprobe`.
//!
//! ## Installation
//! - macOS: `brew install ffmpeg`
//! - Linux: `apt-get install ffmpeg` or `yum install ffmpeg`
//! - Windows: Download from https://ffmpeg.org/download.html

pub mod codec;
pub mod encoder;
pub mod metadata;
pub mod probe;

// Re-export commonly used types for convenience
pub use codec::Codec;
pub use encoder::{AudiobookEncoder, EncoderOptions, ProgressCallback};
pub use metadata::{BookTags, Chapter, ChapterEditor};
pub use probe::{probe_all, AudioFile, FfprobeProbe, MediaProbe, ProbeResult};
