//! Howl web front-end
//!
//! `GET /` shows an upload form, `POST /` classifies the uploaded clip and
//! renders the result. Illustrations are served from `/static`.

pub mod images;
mod routes;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use howl_core::config::ServerConfig;
use howl_core::Pipeline;
use rocket::figment::providers::{Env, Format, Toml};
use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

/// Shared per-process state, read-only after startup
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub upload_dir: PathBuf,
    pub images_dir: PathBuf,
}

/// Rocket.toml shipped next to this crate's templates
const BUNDLED_ROCKET_TOML: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/Rocket.toml");

/// Rocket settings with the usual layering: defaults, then the config file,
/// then `ROCKET_*` variables.
///
/// The config file is `$ROCKET_CONFIG`, else `./Rocket.toml`, else the bundled
/// one. Relative paths in it, such as `template_dir`, resolve against the
/// file's own directory.
pub fn rocket_figment() -> Figment {
    let config_file = match std::env::var_os("ROCKET_CONFIG") {
        Some(path) => PathBuf::from(path),
        None if Path::new("Rocket.toml").is_file() => PathBuf::from("Rocket.toml"),
        None => PathBuf::from(BUNDLED_ROCKET_TOML),
    };
    figment_with_file(&config_file)
}

fn figment_with_file(config_file: &Path) -> Figment {
    log::debug!("Rocket settings from {:?}", config_file);
    Figment::from(rocket::Config::default())
        .merge(Toml::file(config_file).nested())
        .merge(Env::prefixed("ROCKET_").ignore(&["PROFILE"]).global())
}

/// Assemble the Rocket instance. `figment` carries Rocket's own settings.
pub fn build(
    figment: Figment,
    config: &ServerConfig,
    pipeline: Pipeline,
) -> anyhow::Result<Rocket<Build>> {
    let images_dir = config.images_dir();
    std::fs::create_dir_all(&config.upload_dir)
        .with_context(|| format!("Failed to create upload directory {:?}", config.upload_dir))?;
    std::fs::create_dir_all(&images_dir)
        .with_context(|| format!("Failed to create images directory {:?}", images_dir))?;

    log::info!(
        "Uploads go to {:?}, static files from {:?}",
        config.upload_dir,
        config.static_dir
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        upload_dir: config.upload_dir.clone(),
        images_dir,
    };

    Ok(rocket::custom(figment)
        .attach(Template::fairing())
        .manage(state)
        .mount("/", routes::routes())
        .mount("/static", FileServer::from(&config.static_dir)))
}
