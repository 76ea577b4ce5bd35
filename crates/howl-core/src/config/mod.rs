//! Configuration for howl
//!
//! One YAML file is shared by the web server and the CLI. Default location:
//! `~/.config/howl/config.yaml`.
//!
//! ```yaml
//! model:
//!   path: /var/lib/howl/best_sound.onnx
//!   download_url: https://example.org/best_sound.onnx
//!   intra_threads: 2
//! server:
//!   upload_dir: uploads
//!   static_dir: static
//! ```

mod io;
mod paths;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use io::{load_config, save_config, Validate};
pub use paths::{default_config_path, default_model_path};

pub const CONFIG_FILENAME: &str = "config.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HowlConfig {
    pub model: ModelConfig,
    pub server: ServerConfig,
}

impl HowlConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => load_config(path),
            None => load_config(&default_config_path(CONFIG_FILENAME)),
        }
    }
}

impl Validate for HowlConfig {
    fn validate(&mut self) {
        self.model.validate();
        self.server.validate();
    }
}

/// Classifier model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Location of the `.onnx` model
    pub path: PathBuf,
    /// Where to fetch the model when `path` does not exist
    pub download_url: Option<String>,
    /// ONNX Runtime intra-op threads (1-16)
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            download_url: None,
            intra_threads: 1,
        }
    }
}

impl Validate for ModelConfig {
    fn validate(&mut self) {
        self.intra_threads = self.intra_threads.clamp(1, 16);
        if self.download_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.download_url = None;
        }
    }
}

/// Web server file locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Uploaded clips are stored here
    pub upload_dir: PathBuf,
    /// Served under `/static`; illustrations live in `images/`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ServerConfig {
    pub fn images_dir(&self) -> PathBuf {
        self.static_dir.join("images")
    }
}

impl Validate for ServerConfig {
    fn validate(&mut self) {
        if self.upload_dir.as_os_str().is_empty() {
            self.upload_dir = Self::default().upload_dir;
        }
        if self.static_dir.as_os_str().is_empty() {
            self.static_dir = Self::default().static_dir;
        }
    }
}
