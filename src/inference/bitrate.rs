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


//! Representative output bitrate
//!
//! The most common source bitrate wins. When several bitrates are equally
//! common (including the case where no bitrate repeats) the highest of them
//! is used, so the output is never encoded below the best tied source.

use crate::audio::probe::DEFAULT_BITRATE_KBPS;
use std::collections::BTreeMap;

/// Bitrate resolver
pub struct BitrateResolver;

impl BitrateResolver {
    /// Pick the output bitrate in kbps
    ///
    /// An explicit override is returned verbatim.
    pub fn resolve(bitrates: &[u32], override_kbps: Option<u32>) -> u32 {
        match override_kbps {
            Some(kbps) => kbps,
            None => Self::most_common(bitrates).unwrap_or(DEFAULT_BITRATE_KBPS),
        }
    }

    /// Mode of `bitrates`, ties broken by the larger value
    pub fn most_common(bitrates: &[u32]) -> Option<u32> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for &kbps in bitrates {
            *counts.entry(kbps).or_insert(0) += 1;
        }

        // BTreeMap iterates in ascending bitrate order and max_by_key keeps the
        // last maximum, so equal counts resolve to the highest bitrate
        counts
            .into_iter()
            .max_by_key(|&(_, count)| count)
            .map(|(kbps, _)| kbps)
    }
}
