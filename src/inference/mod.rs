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


//! Pure decisions derived from scanned and probed input
//!
//! Nothing in this module touches the filesystem or spawns processes.

pub mod bitrate;
pub mod book_info;
pub mod chapters;

pub use bitrate::BitrateResolver;
pub use book_info::{BookInfo, MetadataInferencer};
pub use chapters::ChapterPlanner;
