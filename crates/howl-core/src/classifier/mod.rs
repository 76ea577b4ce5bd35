//! Classifier invocation
//!
//! A [`Classify`] implementation turns a [`MelSpectrogram`] into a
//! [`Prediction`] (one probability per class). [`Classification`] maps the
//! arg-max of a prediction onto the label table.

mod onnx;

use std::path::PathBuf;

use thiserror::Error;

use crate::features::MelSpectrogram;
use crate::labels::{Animal, LabelTable};

pub use onnx::OnnxClassifier;

/// Label shown when the model outputs an index outside the label table
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to load model {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model produced no output")]
    EmptyOutput,

    #[error("Model outputs {actual} classes, label table has {expected}")]
    CardinalityMismatch { expected: usize, actual: usize },
}

/// Something that can score a mel spectrogram against the animal classes
pub trait Classify: Send + Sync {
    fn predict(&self, input: &MelSpectrogram) -> Result<Prediction, ClassifierError>;
}

/// Per-class probabilities for one input
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
}

impl Prediction {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self { probabilities }
    }

    pub fn num_classes(&self) -> usize {
        self.probabilities.len()
    }

    /// Index and probability of the most likely class; the first index wins ties.
    pub fn top(&self) -> Option<(usize, f32)> {
        self.probabilities
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, p)| match best {
                Some((_, best_p)) if p <= best_p => best,
                _ => Some((i, p)),
            })
    }
}

/// What the user gets to see for one clip
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub animal: Option<Animal>,
    /// Capitalized animal name, or "Unknown"
    pub label: String,
    /// Max probability × 100, two decimals ("87.00")
    pub confidence: String,
    pub is_safe: bool,
}

impl Classification {
    pub fn from_prediction(
        prediction: &Prediction,
        labels: &LabelTable,
    ) -> Result<Self, ClassifierError> {
        let (index, probability) = prediction.top().ok_or(ClassifierError::EmptyOutput)?;
        let confidence = format!("{:.2}", probability * 100.0);

        let classification = match labels.resolve(index) {
            Some(animal) => Self {
                animal: Some(animal),
                label: animal.display_name(),
                confidence,
                is_safe: labels.is_safe(animal),
            },
            None => {
                log::warn!("Model predicted index {} outside the label table", index);
                Self {
                    animal: None,
                    label: UNKNOWN_LABEL.to_string(),
                    confidence,
                    is_safe: false,
                }
            }
        };

        Ok(classification)
    }
}
