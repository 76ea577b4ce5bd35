//! Howl Core - animal sound classification
//!
//! Turns an audio clip into a normalized mel spectrogram and classifies it
//! with a pretrained ONNX model into one of ten animals, each flagged as safe
//! or unsafe.

pub mod classifier;
pub mod config;
pub mod features;
pub mod labels;
pub mod models;
pub mod pipeline;

pub use classifier::{Classification, ClassifierError, Classify, Prediction};
pub use features::{extract_mel_spectrogram, FeatureError, MelSpectrogram};
pub use labels::{Animal, LabelTable};
pub use pipeline::{Pipeline, PipelineError};
