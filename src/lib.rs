//! Bookbinder: bind a directory of chapter files into one chaptered audiobook
//!
//! The library builds an immutable [`BindPlan`] from a book directory
//! (file order, title/author, cover, bitrate, chapters) and hands it to
//! [`AudiobookEncoder`], which drives FFmpeg.
//!
//! ```no_run
//! use bookbinder::{AudiobookEncoder, BindPlanComposer, BindRequest, BinderConfig, EncoderOptions, FfprobeProbe};
//!
//! # async fn run() -> bookbinder::Result<()> {
//! let config = BinderConfig::default();
//! let composer = BindPlanComposer::new(config.clone(), FfprobeProbe::new(&config.ffprobe_path));
//! let plan = composer.compose(&BindRequest::new("TomSawyer_MarkTwain")).await?;
//! AudiobookEncoder::new(EncoderOptions::from_config(&config, false)).encode(&plan).await?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod file;
pub mod inference;
pub mod plan;

pub use audio::{AudiobookEncoder, Codec, EncoderOptions, FfprobeProbe, MediaProbe};
pub use config::BinderConfig;
pub use error::{BinderError, Result};
pub use plan::{BindPlan, BindPlanComposer, BindRequest};
