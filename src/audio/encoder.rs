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


//! Audiobook encoding with FFmpeg
//!
//! # Invocation
//! ```text
//! ffmpeg -nostdin -y|-n -f concat -safe 0 -i files.txt [-i cover.jpg] -i chapters.txt \
//!     -map 0:a [-map 1:v -c:v copy -disposition:v:0 attached_pic] \
//!     -map_metadata N -map_chapters N -c:a CODEC [-b:a Kk] OUTPUT
//! ```
//! - Input 0 is a concat demuxer list with one `file '...'` line per chapter
//!   file, in plan order
//! - The cover, when present, is input 1 and is attached as a picture stream
//! - The FFMETADATA1 file is the last input and supplies tags and chapters
//! - Lossless codecs get no `-b:a`
//!
//! The list and metadata files live in a temporary directory that is removed
//! once FFmpeg exits, so nothing extra is left in the book directory.

use crate::audio::probe::AudioFile;
use crate::config::{BinderConfig, DEFAULT_GENRE};
use crate::error::{BinderError, Result};
use crate::plan::BindPlan;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Encoding progress callback type, called with values in `0.0..=1.0`
pub type ProgressCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Number of trailing FFmpeg stderr lines kept for error reports
const STDERR_TAIL_LINES: usize = 8;

/// Encoder options
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// FFmpeg binary name or path
    pub ffmpeg_path: String,

    /// Replace an existing output file
    pub overwrite: bool,

    /// Genre tag written into the output
    pub genre: String,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            overwrite: false,
            genre: DEFAULT_GENRE.to_string(),
        }
    }
}

impl EncoderOptions {
    /// Options taken from a binder configuration
    pub fn from_config(config: &BinderConfig, overwrite: bool) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            overwrite,
            genre: config.genre.clone(),
        }
    }
}

/// Runs FFmpeg for a [`BindPlan`]
pub struct AudiobookEncoder {
    options: EncoderOptions,
}

impl AudiobookEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Encode the plan, returning the output path
    pub async fn encode(&self, plan: &BindPlan) -> Result<PathBuf> {
        self.encode_with_progress(plan, Arc::new(|_| {})).await
    }

    /// Encode with progress callback
    pub async fn encode_with_progress(
        &self,
        plan: &BindPlan,
        progress_callback: ProgressCallback,
    ) -> Result<PathBuf> {
        let output = plan.output_path();
        if output.exists() && !self.options.overwrite {
            return Err(BinderError::OutputExists(output.to_path_buf()));
        }

        let work_dir = tempfile::Builder::new()
            .prefix("bookbinder-")
            .tempdir()
            .map_err(|e| BinderError::FileIoError(format!("create temp dir: {}", e)))?;

        let list_path = work_dir.path().join("files.txt");
        tokio::fs::write(&list_path, Self::concat_list(plan.files()))
            .await
            .map_err(|e| BinderError::file_io("write", &list_path, e))?;

        let metadata_path = work_dir.path().join("chapters.txt");
        tokio::fs::write(&metadata_path, plan.ffmetadata(&self.options.genre))
            .await
            .map_err(|e| BinderError::file_io("write", &metadata_path, e))?;

        let args = self.build_ffmpeg_args(plan, &list_path, &metadata_path);
        info!(output = %output.display(), codec = %plan.codec(), "encoding audiobook");
        debug!(?args, "ffmpeg arguments");

        self.execute(&args, plan.total_duration_seconds(), progress_callback)
            .await?;

        if !output.exists() {
            return Err(BinderError::EncodeFailed(
                "Output file was not created".to_string(),
            ));
        }

        Ok(output.to_path_buf())
    }

    /// Build FFmpeg arguments (without the program name)
    pub fn build_ffmpeg_args(
        &self,
        plan: &BindPlan,
        list_path: &Path,
        metadata_path: &Path,
    ) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            if self.options.overwrite { "-y" } else { "-n" }.to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.to_string_lossy().to_string(),
        ];

        if let Some(cover) = plan.cover() {
            args.push("-i".to_string());
            args.push(cover.to_string_lossy().to_string());
        }

        args.push("-i".to_string());
        args.push(metadata_path.to_string_lossy().to_string());

        args.push("-map".to_string());
        args.push("0:a".to_string());

        let metadata_input = if plan.cover().is_some() {
            args.extend(
                ["-map", "1:v", "-c:v", "copy", "-disposition:v:0", "attached_pic"]
                    .iter()
                    .map(|s| s.to_string()),
            );
            2
        } else {
            1
        };

        args.push("-map_metadata".to_string());
        args.push(metadata_input.to_string());
        args.push("-map_chapters".to_string());
        args.push(metadata_input.to_string());

        args.push("-c:a".to_string());
        args.push(plan.codec().as_str().to_string());
        if !plan.codec().is_lossless() {
            args.push("-b:a".to_string());
            args.push(format!("{}k", plan.bitrate_kbps()));
        }

        args.push(plan.output_path().to_string_lossy().to_string());
        args
    }

    /// Concat demuxer input list
    pub fn concat_list(files: &[AudioFile]) -> String {
        files
            .iter()
            .map(|f| format!("file '{}'\n", Self::escape_concat_path(f.path())))
            .collect()
    }

    /// Quote-escape a path for a concat list line
    ///
    /// Inside single quotes the only special character is `'`, written as `'\''`.
    pub fn escape_concat_path(path: &Path) -> String {
        path.to_string_lossy().replace('\'', r"'\''")
    }

    /// Run FFmpeg and report progress from its stderr
    async fn execute(
        &self,
        args: &[String],
        total_duration: f64,
        progress_callback: ProgressCallback,
    ) -> Result<()> {
        let mut child = Command::new(&self.options.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BinderError::FfmpegNotFound
                } else {
                    BinderError::EncodeFailed(format!("Failed to execute ffmpeg: {}", e))
                }
            })?;

        let stderr = child.stderr.take().ok_or_else(|| {
            BinderError::EncodeFailed("Failed to capture ffmpeg stderr".to_string())
        })?;

        let mut lines = BufReader::new(stderr).lines();

        let progress_task = tokio::spawn({
            let progress_callback = progress_callback.clone();
            async move {
                let mut last_progress = 0.0f32;
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(progress) = Self::parse_ffmpeg_progress(&line, total_duration) {
                        // Update every 1%
                        if (progress - last_progress).abs() > 0.01 {
                            last_progress = progress;
                            progress_callback(progress);
                        }
                        continue;
                    }
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                tail
            }
        });

        let status = child.wait().await.map_err(|e| {
            BinderError::EncodeFailed(format!("FFmpeg process failed: {}", e))
        })?;

        let tail = Self::join_stderr_tail(progress_task).await;

        if !status.success() {
            let details = tail.into_iter().collect::<Vec<_>>().join("\n");
            return Err(BinderError::EncodeFailed(if details.is_empty() {
                format!("FFmpeg exited with status: {}", status)
            } else {
                format!("FFmpeg exited with status: {}\n{}", status, details)
            }));
        }

        progress_callback(1.0);

        Ok(())
    }

    /// Wait for the stderr reader; a failed reader leaves no tail to report
    async fn join_stderr_tail(task: JoinHandle<VecDeque<String>>) -> VecDeque<String> {
        match task.await {
            Ok(tail) => tail,
            Err(e) => {
                warn!("ffmpeg stderr reader failed: {}", e);
                VecDeque::new()
            }
        }
    }

    /// Parse FFmpeg progress from stderr line
    ///
    /// FFmpeg outputs: "time=00:01:23.45 bitrate=64.0kbits/s"
    fn parse_ffmpeg_progress(line: &str, total_duration: f64) -> Option<f32> {
        let time_start = line.find("time=")?;
        let time_str = &line[time_start + 5..];
        let time_end = time_str.find(' ').unwrap_or(time_str.len());
        let elapsed_seconds = Self::parse_timestamp(&time_str[..time_end])?;

        if total_duration > 0.0 {
            Some((elapsed_seconds / total_duration).clamp(0.0, 1.0) as f32)
        } else {
            None
        }
    }

    /// Parse timestamp in format HH:MM:SS.ss to seconds
    fn parse_timestamp(timestamp: &str) -> Option<f64> {
        let parts: Vec<&str> = timestamp.split(':').collect();
        if parts.len() == 3 {
            let hours: f64 = parts[0].parse().ok()?;
            let minutes: f64 = parts[1].parse().ok()?;
            let seconds: f64 = parts[2].parse().ok()?;
            Some(hours * 3600.0 + minutes * 60.0 + seconds)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::codec::Codec;
    use crate::audio::metadata::Chapter;
    use crate::audio::probe::ProbeResult;
    use tempfile::TempDir;

    fn plan(dir: &Path, codec: Codec, cover: Option<PathBuf>) -> BindPlan {
        let files = vec![
            AudioFile::new(
                dir.join("01.mp3"),
                ProbeResult {
                    duration_seconds: 60.0,
                    bitrate_kbps: 64,
                },
            ),
            AudioFile::new(
                dir.join("Tom's Chapter.mp3"),
                ProbeResult {
                    duration_seconds: 30.0,
                    bitrate_kbps: 64,
                },
            ),
        ];
        BindPlan {
            files,
            output_path: dir.join("Tom Sawyer - Mark Twain.m4b"),
            title: "Tom Sawyer".to_string(),
            author: "Mark Twain".to_string(),
            bitrate_kbps: 64,
            codec,
            cover,
            chapters: vec![
                Chapter {
                    title: "01".to_string(),
                    start_seconds: 0.0,
                    end_seconds: 60.0,
                },
                Chapter {
                    title: "Tom's Chapter".to_string(),
                    start_seconds: 60.0,
                    end_seconds: 90.0,
                },
            ],
        }
    }

    fn position(args: &[String], value: &str) -> usize {
        args.iter().position(|a| a == value).unwrap()
    }

    #[test]
    fn test_args_without_cover() {
        let encoder = AudiobookEncoder::new(EncoderOptions::default());
        let plan = plan(Path::new("/books/Tom"), Codec::Aac, None);
        let args = encoder.build_ffmpeg_args(&plan, Path::new("/tmp/files.txt"), Path::new("/tmp/meta.txt"));

        assert_eq!(
            args,
            vec![
                "-nostdin", "-n", "-f", "concat", "-safe", "0", "-i", "/tmp/files.txt", "-i",
                "/tmp/meta.txt", "-map", "0:a", "-map_metadata", "1", "-map_chapters", "1",
                "-c:a", "aac", "-b:a", "64k", "/books/Tom/Tom Sawyer - Mark Twain.m4b",
            ]
        );
    }

    #[test]
    fn test_args_with_cover() {
        let encoder = AudiobookEncoder::new(EncoderOptions {
            overwrite: true,
            ..Default::default()
        });
        let plan = plan(
            Path::new("/books/Tom"),
            Codec::Aac,
            Some(PathBuf::from("/books/Tom/cover.jpg")),
        );
        let args = encoder.build_ffmpeg_args(&plan, Path::new("/tmp/files.txt"), Path::new("/tmp/meta.txt"));

        assert_eq!(args[1], "-y");
        assert_eq!(args[position(&args, "/books/Tom/cover.jpg") - 1], "-i");
        assert!(position(&args, "/books/Tom/cover.jpg") < position(&args, "/tmp/meta.txt"));
        assert_eq!(args[position(&args, "-map_metadata") + 1], "2");
        assert_eq!(args[position(&args, "-map_chapters") + 1], "2");
        assert_eq!(args[position(&args, "1:v") - 1], "-map");
        assert_eq!(args[position(&args, "-disposition:v:0") + 1], "attached_pic");
    }

    #[test]
    fn test_lossless_codec_has_no_bitrate() {
        let encoder = AudiobookEncoder::new(EncoderOptions::default());
        let plan = plan(Path::new("/books/Tom"), Codec::Alac, None);
        let args = encoder.build_ffmpeg_args(&plan, Path::new("l"), Path::new("m"));

        assert_eq!(args[position(&args, "-c:a") + 1], "alac");
        assert!(!args.contains(&"-b:a".to_string()));
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let plan = plan(Path::new("/books/Tom"), Codec::Aac, None);
        let list = AudiobookEncoder::concat_list(plan.files());
        assert_eq!(
            list,
            "file '/books/Tom/01.mp3'\nfile '/books/Tom/Tom'\\''s Chapter.mp3'\n"
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(AudiobookEncoder::parse_timestamp("00:00:30.50"), Some(30.5));
        assert_eq!(AudiobookEncoder::parse_timestamp("01:30:00.00"), Some(5400.0));
        assert_eq!(AudiobookEncoder::parse_timestamp("N/A"), None);
    }

    #[test]
    fn test_parse_ffmpeg_progress() {
        let line = "size=    1024kB time=00:01:30.00 bitrate=  64.0kbits/s speed=40.1x";
        let progress = AudiobookEncoder::parse_ffmpeg_progress(line, 180.0).unwrap();
        assert!((progress - 0.5).abs() < 1e-6);

        assert_eq!(AudiobookEncoder::parse_ffmpeg_progress("Input #0, concat", 180.0), None);
        assert_eq!(AudiobookEncoder::parse_ffmpeg_progress(line, 0.0), None);
    }

    #[tokio::test]
    async fn test_stderr_tail_survives_reader_panic() {
        let reader = tokio::spawn(async {
            if true {
                panic!("stderr reader died");
            }
            VecDeque::<String>::new()
        });
        assert!(AudiobookEncoder::join_stderr_tail(reader).await.is_empty());

        let reader = tokio::spawn(async { VecDeque::from(vec!["Invalid data".to_string()]) });
        assert_eq!(
            AudiobookEncoder::join_stderr_tail(reader).await,
            VecDeque::from(vec!["Invalid data".to_string()])
        );
    }

    #[tokio::test]
    async fn test_existing_output_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let plan = plan(temp_dir.path(), Codec::Aac, None);
        std::fs::write(plan.output_path(), b"old").unwrap();

        let err = AudiobookEncoder::new(EncoderOptions::default())
            .encode(&plan)
            .await
            .unwrap_err();
        assert!(matches!(err, BinderError::OutputExists(p) if p == plan.output_path()));
    }

    #[tokio::test]
    async fn test_missing_ffmpeg() {
        let temp_dir = TempDir::new().unwrap();
        let plan = plan(temp_dir.path(), Codec::Aac, None);

        let err = AudiobookEncoder::new(EncoderOptions {
            ffmpeg_path: "definitely-not-a-real-ffmpeg-binary".to_string(),
            ..Default::default()
        })
        .encode(&plan)
        .await
        .unwrap_err();
        assert!(matches!(err, BinderError::FfmpegNotFound));
    }
}
