use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaskError {
    #[error("Failed to decode image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image asset: {0}")]
    Asset(#[from] neongen_common::CommonError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MaskError>;
