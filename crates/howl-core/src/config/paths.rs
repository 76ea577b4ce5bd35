//! Default locations for config and model files

use std::path::PathBuf;

use crate::models::DEFAULT_MODEL_FILENAME;

const APP_DIR: &str = "howl";

/// `<config dir>/howl/<filename>`, e.g. `~/.config/howl/config.yaml`
pub fn default_config_path(filename: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(filename)
}

/// `<cache dir>/howl/models/best_sound.onnx`
pub fn default_model_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("models")
        .join(DEFAULT_MODEL_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_includes_filename() {
        let path = default_config_path("config.yaml");
        assert!(path.ends_with("howl/config.yaml"));
    }

    #[test]
    fn test_model_path_uses_default_filename() {
        assert!(default_model_path().ends_with("models/best_sound.onnx"));
    }
}
