//! ONNX Runtime classifier

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;

use super::{ClassifierError, Classify, Prediction};
use crate::features::MelSpectrogram;

/// Pretrained sound classifier loaded from an `.onnx` file.
///
/// `Session::run` needs `&mut self`, so the session sits behind a mutex and
/// concurrent requests take turns.
pub struct OnnxClassifier {
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, intra_threads: usize) -> Result<Self, ClassifierError> {
        log::info!("Loading ONNX model from {:?}", model_path);

        let session = Session::builder()
            .map_err(|e| load_error(model_path, e))?
            .with_intra_threads(intra_threads)
            .map_err(|e| load_error(model_path, e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(model_path, e))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

fn load_error(path: &Path, err: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::Load {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

impl Classify for OnnxClassifier {
    fn predict(&self, input: &MelSpectrogram) -> Result<Prediction, ClassifierError> {
        let tensor = Tensor::from_array(input.as_array().clone())
            .map_err(|e| ClassifierError::Inference(format!("Tensor creation error: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (_, value) = outputs.iter().next().ok_or(ClassifierError::EmptyOutput)?;

        // Output is [1, n_classes] softmax probabilities
        let (_shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Output extraction error: {}", e)))?;

        if data.is_empty() {
            return Err(ClassifierError::EmptyOutput);
        }

        Ok(Prediction::new(data.to_vec()))
    }
}
