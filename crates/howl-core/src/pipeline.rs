//! File → classification pipeline

use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use crate::classifier::{Classification, ClassifierError, Classify, OnnxClassifier};
use crate::config::ModelConfig;
use crate::features::{extract_mel_spectrogram, FeatureError, MelSpectrogram};
use crate::labels::LabelTable;
use crate::models::ModelManager;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The file could not be turned into model input
    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Feature extraction and inference, built once and shared read-only
pub struct Pipeline {
    classifier: Box<dyn Classify>,
    labels: LabelTable,
}

impl Pipeline {
    /// Wrap a classifier, checking with a warm-up run that it outputs one
    /// probability per label.
    pub fn new(classifier: Box<dyn Classify>, labels: LabelTable) -> Result<Self, ClassifierError> {
        let warmup = classifier.predict(&MelSpectrogram::zeros())?;
        if warmup.num_classes() != labels.len() {
            return Err(ClassifierError::CardinalityMismatch {
                expected: labels.len(),
                actual: warmup.num_classes(),
            });
        }
        log::info!("Classifier ready ({} classes)", labels.len());
        Ok(Self { classifier, labels })
    }

    /// Locate (or download) the ONNX model and build the pipeline around it.
    pub fn from_config(config: &ModelConfig) -> anyhow::Result<Self> {
        let model_path = ModelManager::from_config(config)
            .ensure_model()
            .context("Model is not available")?;
        let classifier = OnnxClassifier::load(&model_path, config.intra_threads)?;
        let labels = LabelTable::new().context("Invalid label table")?;
        let pipeline = Self::new(Box::new(classifier), labels)
            .with_context(|| format!("Model {:?} failed the startup check", model_path))?;
        Ok(pipeline)
    }

    pub fn classify_file(&self, path: &Path) -> Result<Classification, PipelineError> {
        let features = extract_mel_spectrogram(path)?;
        let classification = self.classify_spectrogram(&features)?;
        log::info!(
            "{:?}: {} ({}%)",
            path.file_name().unwrap_or_default(),
            classification.label,
            classification.confidence
        );
        Ok(classification)
    }

    pub fn classify_spectrogram(
        &self,
        features: &MelSpectrogram,
    ) -> Result<Classification, ClassifierError> {
        let prediction = self.classifier.predict(features)?;
        Classification::from_prediction(&prediction, &self.labels)
    }
}
