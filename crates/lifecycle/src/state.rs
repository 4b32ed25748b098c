use neongen_common::ImageAsset;
use strum::{Display, EnumIter, IntoStaticStr};

/// Coarse status, as shown by a UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Idle,
    Processing,
    Success,
    Error,
}

/// State of one operation instance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Processing,
    Success { image: ImageAsset },
    Error { message: String },
}

impl OperationState {
    pub fn status(&self) -> OperationStatus {
        match self {
            Self::Idle => OperationStatus::Idle,
            Self::Processing => OperationStatus::Processing,
            Self::Success { .. } => OperationStatus::Success,
            Self::Error { .. } => OperationStatus::Error,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        match self {
            Self::Success { image } => Some(image),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}
