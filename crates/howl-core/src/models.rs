//! Model artifact bootstrap
//!
//! Locates the classifier model on disk and, when a download URL is
//! configured, fetches it on first use.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ModelConfig;

/// Default model file name
pub const DEFAULT_MODEL_FILENAME: &str = "best_sound.onnx";

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model not found at {0} and no download URL is configured")]
    NotFound(PathBuf),

    #[error("Model download failed: {0}")]
    DownloadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;

pub struct ModelManager {
    model_path: PathBuf,
    download_url: Option<String>,
}

impl ModelManager {
    pub fn new(model_path: PathBuf, download_url: Option<String>) -> Self {
        Self {
            model_path,
            download_url,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.path.clone(), config.download_url.clone())
    }

    pub fn is_available(&self) -> bool {
        self.model_path.is_file()
    }

    /// Path to the model, downloading it first if it is missing.
    pub fn ensure_model(&self) -> Result<PathBuf> {
        if self.is_available() {
            log::info!("Model found at {:?}", self.model_path);
            return Ok(self.model_path.clone());
        }

        let url = self
            .download_url
            .as_deref()
            .ok_or_else(|| ModelError::NotFound(self.model_path.clone()))?;

        log::info!("Model missing, downloading from {}", url);
        download_file(url, &self.model_path)?;
        Ok(self.model_path.clone())
    }
}

/// Stream `url` into a `.tmp` sibling of `target`, check the size, then rename.
///
/// The `.tmp` file is removed on every failure path.
fn download_file(url: &str, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = target.with_extension("tmp");

    let downloaded = match stream_to_file(url, &temp_path) {
        Ok(n) => n,
        Err(e) => {
            fs::remove_file(&temp_path).ok();
            return Err(e);
        }
    };

    fs::rename(&temp_path, target)?;
    log::info!("Downloaded model to {:?} ({} bytes)", target, downloaded);
    Ok(())
}

fn stream_to_file(url: &str, path: &Path) -> Result<u64> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| ModelError::DownloadFailed(e.to_string()))?;

    let content_length: Option<u64> = response
        .header("Content-Length")
        .and_then(|s| s.parse().ok());

    let mut file = fs::File::create(path)?;
    let mut reader = response.into_reader();
    let mut buffer = [0u8; 8192];
    let mut downloaded: u64 = 0;

    loop {
        let n = reader.read(&mut buffer).map_err(|e| {
            ModelError::DownloadFailed(format!("Read failed after {} bytes: {}", downloaded, e))
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])?;
        downloaded += n as u64;
    }
    file.flush()?;

    if let Some(expected) = content_length {
        if downloaded != expected {
            return Err(ModelError::DownloadFailed(format!(
                "Download incomplete: expected {} bytes, got {}",
                expected, downloaded
            )));
        }
    }
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// One-shot HTTP server answering with `headers` and `body`, then closing
    fn serve_once(headers: String, body: &'static [u8]) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/best_sound.onnx", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = stream;
            stream.write_all(headers.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
            stream.flush().unwrap();
        });
        (url, handle)
    }

    #[test]
    fn test_existing_model_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILENAME);
        fs::write(&path, b"onnx bytes").unwrap();

        let manager = ModelManager::new(path.clone(), None);
        assert!(manager.is_available());
        assert_eq!(manager.ensure_model().unwrap(), path);
    }

    #[test]
    fn test_missing_model_without_url() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path().join("absent.onnx"), None);
        assert!(!manager.is_available());
        assert!(matches!(
            manager.ensure_model(),
            Err(ModelError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_is_not_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path().to_path_buf(), None);
        assert!(!manager.is_available());
    }

    #[test]
    fn test_download_writes_model() {
        let body: &'static [u8] = b"0123456789";
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 10\r\nConnection: close\r\n\r\n".to_string(),
            body,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join(DEFAULT_MODEL_FILENAME);

        let manager = ModelManager::new(path.clone(), Some(url));
        assert_eq!(manager.ensure_model().unwrap(), path);
        server.join().unwrap();

        assert_eq!(fs::read(&path).unwrap(), body);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_truncated_download_leaves_nothing_behind() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 10\r\nConnection: close\r\n\r\n".to_string(),
            b"01234",
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILENAME);

        let manager = ModelManager::new(path.clone(), Some(url));
        let result = manager.ensure_model();
        server.join().unwrap();

        assert!(matches!(result, Err(ModelError::DownloadFailed(_))));
        assert!(!path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_http_error_is_download_failure() {
        let (url, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
            b"",
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILENAME);

        let result = ModelManager::new(path.clone(), Some(url)).ensure_model();
        server.join().unwrap();

        assert!(matches!(result, Err(ModelError::DownloadFailed(_))));
        assert!(!path.with_extension("tmp").exists());
    }
}
