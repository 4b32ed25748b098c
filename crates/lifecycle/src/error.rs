use brush_mask::MaskError;
use neongen_common::CommonError;
use thiserror::Error;

/// Why an operation request may not be submitted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,
    #[error("An edit needs a source image")]
    MissingSourceImage,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An operation is already processing")]
    Busy,

    #[error("Failed to prepare mask: {0}")]
    Mask(#[from] MaskError),
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error(transparent)]
    Asset(#[from] CommonError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No result image available")]
    NoResult,
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
