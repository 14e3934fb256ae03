//! Error types for Bookbinder
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! The binding pipeline only ever produces typed failures; rendering them as
//! text and choosing a process exit code is left to the caller (see
//! [`BinderError::user_message`] and [`BinderError::exit_code`]).
//!
//! ## Where each error comes from
//!
//! ### Input discovery (file::scanner, file::cover)
//! - Missing or non-directory source path → `DirectoryNotFound`
//! - Directory without any recognised audio file → `NoAudioFilesFound`
//! - Explicit cover image that does not exist → `CoverArtNotFound`
//!
//! ### Probing (audio::probe)
//! - ffprobe failure, unreadable output, missing duration → `ProbeFailed`
//!
//! ### Plan composition (plan)
//! - Title still empty after inference, no override → `IncompleteConfiguration`
//!
//! ### Configuration (config, audio::codec)
//! - Unknown codec name → `InvalidCodec`
//! - Malformed config file or invalid values → `InvalidConfiguration`
//!
//! ### Encoding (audio::encoder)
//! - FFmpeg binary missing → `FfmpegNotFound`
//! - FFmpeg exited unsuccessfully → `EncodeFailed`
//! - Output file present and overwrite disabled → `OutputExists`

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our BinderError type
pub type Result<T> = std::result::Result<T, BinderError>;

/// Main error type for Bookbinder
#[derive(Error, Debug)]
pub enum BinderError {
    // ===== Input Errors =====

    /// Source path does not exist or is not a directory
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Source directory contains no file with a recognised audio extension
    #[error("No audio files found in {}", .0.display())]
    NoAudioFilesFound(PathBuf),

    /// Explicitly requested cover image does not exist
    #[error("Cover art not found: {}", .0.display())]
    CoverArtNotFound(PathBuf),

    // ===== Probe Errors =====

    /// Media inspection of a single file failed; aborts the whole bind
    #[error("Failed to probe {}: {reason}", file.display())]
    ProbeFailed {
        file: PathBuf,
        reason: String,
    },

    // ===== Composition / Configuration Errors =====

    /// Inference could not produce a required field and no override was given
    #[error("Incomplete configuration: {0}")]
    IncompleteConfiguration(String),

    /// Codec name outside the supported set
    #[error("Invalid codec '{0}'. Valid codecs are: aac, alac, flac, libmp3lame, mpeg4")]
    InvalidCodec(String),

    /// Configuration file or values are invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ===== Encoder Errors =====

    /// FFmpeg binary not found in PATH
    #[error("FFmpeg not found. Please install FFmpeg and ensure it's in your PATH.")]
    FfmpegNotFound,

    /// FFmpeg ran but did not produce the audiobook
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    /// Output container already exists and overwrite is disabled
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    // ===== Plumbing =====

    /// Generic file I/O error with context
    #[error("File I/O error: {0}")]
    FileIoError(String),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

// Helper methods for creating common errors
impl BinderError {
    /// Create a ProbeFailed error for a file
    pub fn probe_failed<P: Into<PathBuf>, S: Into<String>>(file: P, reason: S) -> Self {
        BinderError::ProbeFailed {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfiguration error with a message
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        BinderError::InvalidConfiguration(message.into())
    }

    /// Wrap an I/O failure on a specific path with the operation name
    pub fn file_io(operation: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        BinderError::FileIoError(format!("{}: {} - {}", operation, path.display(), err))
    }

    /// Check if the error was caused by the caller's input (paths, names, overrides)
    ///
    /// These are the failures a user can fix by pointing at a different
    /// directory or supplying an override.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BinderError::DirectoryNotFound(_)
                | BinderError::NoAudioFilesFound(_)
                | BinderError::CoverArtNotFound(_)
                | BinderError::IncompleteConfiguration(_)
                | BinderError::InvalidCodec(_)
                | BinderError::InvalidConfiguration(_)
        )
    }

    /// Check if the error came from the external FFmpeg/FFprobe tools
    pub fn is_encoder_error(&self) -> bool {
        matches!(
            self,
            BinderError::ProbeFailed { .. }
                | BinderError::FfmpegNotFound
                | BinderError::EncodeFailed(_)
        )
    }

    /// Process exit code for this error kind
    ///
    /// Codes are stable so that scripts wrapping the binary can branch on them.
    pub fn exit_code(&self) -> u8 {
        match self {
            BinderError::DirectoryNotFound(_) => 2,
            BinderError::NoAudioFilesFound(_) => 3,
            BinderError::ProbeFailed { .. } => 4,
            BinderError::CoverArtNotFound(_) => 5,
            BinderError::IncompleteConfiguration(_) => 6,
            BinderError::InvalidCodec(_) | BinderError::InvalidConfiguration(_) => 7,
            BinderError::FfmpegNotFound => 8,
            BinderError::EncodeFailed(_) => 9,
            BinderError::OutputExists(_) => 10,
            BinderError::FileIoError(_)
            | BinderError::IoError(_)
            | BinderError::SerdeJsonError(_) => 1,
        }
    }

    /// Get user-friendly error message suitable for display
    ///
    /// Every message names the file or directory involved where there is one.
    pub fn user_message(&self) -> String {
        match self {
            BinderError::DirectoryNotFound(path) => {
                format!("'{}' does not exist or is not a directory.", path.display())
            }
            BinderError::NoAudioFilesFound(path) => {
                format!(
                    "No audio files found in '{}'. Chapter files must sit directly in the book directory.",
                    path.display()
                )
            }
            BinderError::ProbeFailed { file, reason } => {
                format!(
                    "Could not read duration/bitrate of '{}' ({}). Is it a valid audio file and is ffprobe installed?",
                    file.display(),
                    reason
                )
            }
            BinderError::CoverArtNotFound(path) => {
                format!("Cover image '{}' does not exist.", path.display())
            }
            BinderError::IncompleteConfiguration(reason) => {
                format!("{}. Please pass the title explicitly with --title.", reason)
            }
            BinderError::OutputExists(path) => {
                format!(
                    "'{}' already exists. Use --overwrite to replace it.",
                    path.display()
                )
            }
            _ => self.to_string(),
        }
    }
}
