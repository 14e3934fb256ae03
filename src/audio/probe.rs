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


//! Duration and bitrate probing
//!
//! # Probe Strategy
//! - Executes: `ffprobe -v error -show_format -of json {path}`
//! - Duration comes from `format.duration` (seconds, string encoded)
//! - Bitrate comes from `format.bit_rate` (bits/s, string encoded)
//! - Files without a usable bitrate (missing, or below 1 kbps) are assumed
//!   to be 128 kbps
//!
//! # Failure Policy
//! A single file that cannot be probed fails the whole bind: every later
//! computation (chapter offsets, representative bitrate) depends on all of
//! the files. Probes are not retried.
//!
//! # Concurrency
//! [`probe_all`] keeps up to `workers` probes in flight and yields results in
//! input order regardless of which ffprobe finishes first.

use crate::error::{BinderError, Result};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Bitrate assumed when the probe does not report one
pub const DEFAULT_BITRATE_KBPS: u32 = 128;

/// Raw result of inspecting one media file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Bitrate in kilobits per second
    pub bitrate_kbps: u32,
}

/// One probed input chapter source
///
/// Its position in the bind is its index in the plan's file list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioFile {
    path: PathBuf,
    duration_seconds: f64,
    bitrate_kbps: u32,
}

impl AudioFile {
    pub fn new(path: PathBuf, probe: ProbeResult) -> Self {
        Self {
            path,
            duration_seconds: probe.duration_seconds,
            bitrate_kbps: probe.bitrate_kbps,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    /// File name with extension, e.g. `01 - The Beginning.mp3`
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension, e.g. `01 - The Beginning`
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// External media inspection capability
///
/// Implementations must be deterministic for a given file: the pipeline
/// never retries a probe.
pub trait MediaProbe: Send + Sync {
    /// Inspect one file and report its duration and bitrate
    fn probe(&self, path: &Path) -> impl Future<Output = Result<ProbeResult>> + Send;
}

/// [`MediaProbe`] backed by the `ffprobe` binary
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: String,
}

impl FfprobeProbe {
    /// Use `program` (a name looked up in PATH or a full path) as ffprobe
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Parse `ffprobe -show_format -of json` output
    pub fn parse_output(path: &Path, json: &str) -> Result<ProbeResult> {
        let probe: FfprobeOutput = serde_json::from_str(json).map_err(|e| {
            BinderError::probe_failed(path, format!("unreadable ffprobe output: {}", e))
        })?;

        let duration_seconds = probe
            .format
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| BinderError::probe_failed(path, "no duration reported"))?;

        // Some containers (raw AAC, some VBR MP3s) report no bitrate at all
        let bitrate_kbps = probe
            .format
            .bit_rate
            .as_deref()
            .and_then(|b| b.trim().parse::<u64>().ok())
            .map(|bps| (bps / 1000) as u32)
            .filter(|kbps| *kbps > 0)
            .unwrap_or(DEFAULT_BITRATE_KBPS);

        Ok(ProbeResult {
            duration_seconds,
            bitrate_kbps,
        })
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl MediaProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<ProbeResult> {
        let output = Command::new(&self.program)
            .arg("-v")
            .arg("error")
            .arg("-show_format")
            .arg("-of")
            .arg("json")
            .arg(path.as_os_str())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BinderError::probe_failed(path, format!("{} not found in PATH", self.program))
                } else {
                    BinderError::probe_failed(path, format!("failed to execute {}: {}", self.program, e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("ffprobe exited with {}", output.status),
                message => message.to_string(),
            };
            return Err(BinderError::probe_failed(path, reason));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        Self::parse_output(path, &json)
    }
}

/// Probe every file, keeping at most `workers` probes in flight
///
/// The returned files are in the same order as `paths`. The first failure
/// (in input order) is returned and the remaining probes are dropped.
pub async fn probe_all<P: MediaProbe>(
    probe: &P,
    paths: Vec<PathBuf>,
    workers: usize,
) -> Result<Vec<AudioFile>> {
    stream::iter(paths)
        .map(|path| async move {
            let result = probe.probe(&path).await?;
            debug!(
                file = %path.display(),
                duration = result.duration_seconds,
                bitrate = result.bitrate_kbps,
                "probed"
            );
            Ok::<_, BinderError>(AudioFile::new(path, result))
        })
        .buffered(workers.max(1))
        .try_collect()
        .await
}

/// Number of concurrent probes to use when none is configured
pub fn default_probe_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// FFprobe JSON output structures
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Probe whose later files answer first, to expose completion-order bugs
    struct SlowFirstProbe {
        durations: HashMap<String, f64>,
    }

    impl MediaProbe for SlowFirstProbe {
        async fn probe(&self, path: &Path) -> Result<ProbeResult> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let duration = *self
                .durations
                .get(&name)
                .ok_or_else(|| BinderError::probe_failed(path, "unknown file"))?;
            // Shorter sleeps for larger durations so completion order is reversed
            tokio::time::sleep(Duration::from_millis((1000.0 / duration) as u64)).await;
            Ok(ProbeResult {
                duration_seconds: duration,
                bitrate_kbps: 64,
            })
        }
    }

    #[test]
    fn test_parse_output() {
        let json = r#"{"format": {"filename": "01.mp3", "duration": "183.457959", "bit_rate": "128012"}}"#;
        let result = FfprobeProbe::parse_output(Path::new("01.mp3"), json).unwrap();
        assert!((result.duration_seconds - 183.457959).abs() < 1e-9);
        assert_eq!(result.bitrate_kbps, 128);
    }

    #[test]
    fn test_parse_output_missing_bitrate_defaults() {
        let json = r#"{"format": {"duration": "10.0"}}"#;
        let result = FfprobeProbe::parse_output(Path::new("a.aac"), json).unwrap();
        assert_eq!(result.bitrate_kbps, DEFAULT_BITRATE_KBPS);
    }

    #[test]
    fn test_parse_output_sub_kbps_bitrate_defaults() {
        let json = r#"{"format": {"duration": "10.0", "bit_rate": "999"}}"#;
        let result = FfprobeProbe::parse_output(Path::new("a.mp3"), json).unwrap();
        assert_eq!(result.bitrate_kbps, DEFAULT_BITRATE_KBPS);

        let json = r#"{"format": {"duration": "10.0", "bit_rate": "0"}}"#;
        let result = FfprobeProbe::parse_output(Path::new("a.mp3"), json).unwrap();
        assert_eq!(result.bitrate_kbps, DEFAULT_BITRATE_KBPS);
    }

    #[test]
    fn test_parse_output_missing_duration_fails() {
        let json = r#"{"format": {"bit_rate": "64000"}}"#;
        let err = FfprobeProbe::parse_output(Path::new("bad.mp3"), json).unwrap_err();
        match err {
            BinderError::ProbeFailed { file, .. } => assert_eq!(file, PathBuf::from("bad.mp3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_output_garbage_fails() {
        let err = FfprobeProbe::parse_output(Path::new("x.mp3"), "not json").unwrap_err();
        assert!(matches!(err, BinderError::ProbeFailed { .. }));

        let err = FfprobeProbe::parse_output(
            Path::new("x.mp3"),
            r#"{"format": {"duration": "N/A"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BinderError::ProbeFailed { .. }));
    }

    #[test]
    fn test_audio_file_names() {
        let file = AudioFile::new(
            PathBuf::from("/books/Tom/01 - The Beginning.mp3"),
            ProbeResult {
                duration_seconds: 1.0,
                bitrate_kbps: 64,
            },
        );
        assert_eq!(file.file_name(), "01 - The Beginning.mp3");
        assert_eq!(file.file_stem(), "01 - The Beginning");
    }

    #[tokio::test]
    async fn test_probe_all_preserves_input_order() {
        let probe = SlowFirstProbe {
            durations: HashMap::from([
                ("01.mp3".to_string(), 10.0),
                ("02.mp3".to_string(), 100.0),
                ("03.mp3".to_string(), 500.0),
            ]),
        };
        let paths = vec![
            PathBuf::from("01.mp3"),
            PathBuf::from("02.mp3"),
            PathBuf::from("03.mp3"),
        ];

        let files = probe_all(&probe, paths, 3).await.unwrap();
        let durations: Vec<f64> = files.iter().map(|f| f.duration_seconds()).collect();
        assert_eq!(durations, vec![10.0, 100.0, 500.0]);
        assert_eq!(files[0].path(), Path::new("01.mp3"));
    }

    #[tokio::test]
    async fn test_probe_all_fails_on_first_bad_file() {
        let probe = SlowFirstProbe {
            durations: HashMap::from([("01.mp3".to_string(), 10.0)]),
        };
        let paths = vec![PathBuf::from("01.mp3"), PathBuf::from("02.mp3")];

        let err = probe_all(&probe, paths, 2).await.unwrap_err();
        match err {
            BinderError::ProbeFailed { file, .. } => assert_eq!(file, PathBuf::from("02.mp3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_probe_failure() {
        let probe = FfprobeProbe::new("definitely-not-a-real-ffprobe-binary");
        let err = probe.probe(Path::new("01.mp3")).await.unwrap_err();
        assert!(matches!(err, BinderError::ProbeFailed { .. }));
    }
}
