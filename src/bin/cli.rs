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


use anyhow::Context;
use bookbinder::{
    AudiobookEncoder, BindPlan, BindPlanComposer, BindRequest, BinderConfig, BinderError, Codec,
    EncoderOptions, FfprobeProbe,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookbinder")]
#[command(about = "Bind a directory of chapter files into one chaptered audiobook", long_about = None)]
#[command(version)]
struct Cli {
    /// Book directory, named {TitleOfBook}_{AuthorName}
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Book title (inferred from the directory name by default)
    #[arg(short, long)]
    title: Option<String>,

    /// Book author (inferred from the directory name by default)
    #[arg(short, long)]
    author: Option<String>,

    /// Cover image (first jpg/png in the directory by default)
    #[arg(short, long)]
    cover_image: Option<PathBuf>,

    /// Audio encoder
    #[arg(short, long, value_enum)]
    encoder: Option<Codec>,

    /// Output bitrate in kbps (most common input bitrate by default)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    bitrate: Option<u32>,

    /// Separator between chapter number and chapter title, e.g. " - "
    #[arg(short, long)]
    number_separator: Option<String>,

    /// JSON configuration file
    #[arg(long, env = "BOOKBINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Print the plan without encoding
    #[arg(long)]
    dry_run: bool,

    /// Print the plan as JSON (implies --dry-run)
    #[arg(long)]
    json: bool,

    /// Replace an existing output file
    #[arg(long)]
    overwrite: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn request(&self) -> BindRequest {
        BindRequest {
            directory: self.directory.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            cover: self.cover_image.clone(),
            codec: self.encoder,
            bitrate_kbps: self.bitrate,
            number_separator: self.number_separator.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "bookbinder=debug"
    } else {
        "bookbinder=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<BinderError>() {
            Some(binder_error) => {
                error!("{}", binder_error.user_message());
                ExitCode::from(binder_error.exit_code())
            }
            None => {
                error!("{:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => BinderConfig::from_json_file(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BinderConfig::default(),
    };

    let probe = FfprobeProbe::new(config.ffprobe_path.as_str());
    let composer = BindPlanComposer::new(config.clone(), probe);
    let plan = composer.compose(&cli.request()).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    if cli.dry_run {
        print_plan(&plan);
        return Ok(());
    }

    let encoder = AudiobookEncoder::new(EncoderOptions::from_config(&config, cli.overwrite));
    let progress = Arc::new(|p: f32| {
        tracing::debug!("encoding {:.0}%", p * 100.0);
    });
    let output = encoder.encode_with_progress(&plan, progress).await?;

    info!("done");
    println!("{}", output.display());
    Ok(())
}

fn print_plan(plan: &BindPlan) {
    println!("Title:    {}", plan.title());
    if !plan.author().is_empty() {
        println!("Author:   {}", plan.author());
    }
    if let Some(cover) = plan.cover() {
        println!("Cover:    {}", cover.display());
    }
    println!("Codec:    {}", plan.codec());
    if !plan.codec().is_lossless() {
        println!("Bitrate:  {}k", plan.bitrate_kbps());
    }
    println!("Output:   {}", plan.output_path().display());
    println!("Files:    {}", plan.files().len());
    println!();
    print!("{}", plan.chapter_list());
}
