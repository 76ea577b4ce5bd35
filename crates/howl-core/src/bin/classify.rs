//! howl-classify - classify audio files from the command line
//!
//! Usage: `howl-classify [--config <path>] <file>...`
//!
//! Prints one line per file: `<file>: <Label> <confidence>% safe|unsafe`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use howl_core::config::HowlConfig;
use howl_core::{Pipeline, PipelineError};

struct Args {
    config: Option<PathBuf>,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut config = None;
    let mut files = Vec::new();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("Usage: howl-classify [--config <path>] <file>...");
                std::process::exit(0);
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }

    if files.is_empty() {
        bail!("Usage: howl-classify [--config <path>] <file>...");
    }
    Ok(Args { config, files })
}

fn run() -> Result<bool> {
    let args = parse_args()?;
    let config = HowlConfig::load(args.config.as_deref());
    let pipeline = Pipeline::from_config(&config.model)?;

    let mut all_ok = true;
    for file in &args.files {
        match pipeline.classify_file(file) {
            Ok(c) => {
                let safety = if c.is_safe { "safe" } else { "unsafe" };
                println!("{}: {} {}% {}", file.display(), c.label, c.confidence, safety);
            }
            Err(PipelineError::Features(e)) => {
                log::warn!("Cannot classify {:?}: {}", file, e);
                println!("{}: error: {}", file.display(), e);
                all_ok = false;
            }
            Err(e @ PipelineError::Classifier(_)) => return Err(e.into()),
        }
    }
    Ok(all_ok)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
