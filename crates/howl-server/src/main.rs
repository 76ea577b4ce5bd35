//! howl-server - animal sound classification web app
//!
//! ## Command line flags
//!
//! - `--config <path>`: YAML config file (default `~/.config/howl/config.yaml`)
//!
//! Rocket's own settings (address, port, upload limits, template directory)
//! come from `Rocket.toml` and `ROCKET_*` environment variables. The file is
//! `$ROCKET_CONFIG` when set, else `Rocket.toml` in the working directory,
//! else the one in this crate's source directory, so `cargo run -p howl-server`
//! works from the workspace root. A relocated binary needs `ROCKET_CONFIG` or
//! `ROCKET_TEMPLATE_DIR`.
//!
//! `upload_dir` and `static_dir` from the YAML config are relative to the
//! working directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use howl_core::config::HowlConfig;
use howl_core::Pipeline;
use rocket::tokio::task::spawn_blocking;

fn config_path_arg() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().context("--config needs a path")?;
            return Ok(Some(PathBuf::from(path)));
        }
    }
    Ok(None)
}

#[rocket::main]
async fn main() -> Result<()> {
    // Set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("howl-server starting up");

    let config = HowlConfig::load(config_path_arg()?.as_deref());

    // Model download and ONNX session setup block, keep them off the async workers
    let model_config = config.model.clone();
    let pipeline = spawn_blocking(move || Pipeline::from_config(&model_config))
        .await
        .context("Model loading task panicked")??;

    let rocket = howl_server::build(howl_server::rocket_figment(), &config.server, pipeline)?;
    rocket
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {e}"))?;

    Ok(())
}
