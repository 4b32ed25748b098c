//! # NeonGen Common - Shared Types
//!
//! Data structures shared by the mask surface, the generation client and the
//! request lifecycle: the immutable [`ImageAsset`] handle, data-URI helpers and
//! a few geometric primitives.
//!
//! ## Example
//!
//! ```rust
//! use neongen_common::ImageAsset;
//!
//! let asset = ImageAsset::from_base64("image/png", "iVBORw0KGgo=");
//! assert_eq!(asset.data_uri(), "data:image/png;base64,iVBORw0KGgo=");
//! assert_eq!(asset.media_type(), "image/png");
//! ```

pub mod asset;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use asset::{DEFAULT_MEDIA_TYPE, ImageAsset, strip_data_uri_header};

/// Result type for shared operations
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid data URI: {reason}")]
    InvalidDataUri { reason: String },

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}

/// 2D point in canvas-local logical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate this point by the given offsets
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Multiply both coordinates by independent factors
    pub fn scale(self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }

    pub fn distance_to(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f32; 2]> for Point2D {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}
