//! Error types for the forecasting pipeline

use thiserror::Error;

use crate::types::SampleValidationError;

/// Errors raised by the advisor pipeline
#[derive(Debug, Error, PartialEq)]
pub enum AdvisorError {
    #[error("model has not been trained; call train() before predicting")]
    ModelNotTrained,

    #[error("training data is empty")]
    EmptyTrainingSet,

    #[error("need at least {required} samples for trend analysis, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("feature row has {actual} columns, expected {expected}")]
    FeatureWidthMismatch { expected: usize, actual: usize },

    #[error("feature matrix has {rows} rows but target has {targets} values")]
    TargetLengthMismatch { rows: usize, targets: usize },

    #[error("model fit failed: {0}")]
    ModelFit(String),

    #[error("forecast horizon produced no points")]
    EmptyForecast,

    #[error("invalid market sample: {0}")]
    InvalidSample(#[from] SampleValidationError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;
