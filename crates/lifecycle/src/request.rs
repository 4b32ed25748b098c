use neongen_common::ImageAsset;
use strum::{Display, IntoStaticStr};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    /// Edit an uploaded image with a prompt
    Edit,
    /// Generate a new image from text alone
    Generate,
}

/// Input for one operation, checked before submission
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub prompt: String,
    pub source: Option<ImageAsset>,
    /// Binary region mask, only sent when mask attachment is enabled
    pub mask: Option<ImageAsset>,
}

impl OperationRequest {
    pub fn edit(source: impl Into<Option<ImageAsset>>, prompt: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Edit,
            prompt: prompt.into(),
            source: source.into(),
            mask: None,
        }
    }

    pub fn generate(prompt: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Generate,
            prompt: prompt.into(),
            source: None,
            mask: None,
        }
    }

    pub fn with_mask(mut self, mask: ImageAsset) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        if self.kind == OperationKind::Edit && self.source.is_none() {
            return Err(ValidationError::MissingSourceImage);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
