//! Operation lifecycle for the editing and generation workflows.
//!
//! An [`OperationController`] owns the `Idle -> Processing -> Success | Error`
//! state of one workflow and runs at most one generation call at a time. The
//! [`EditorSession`] and [`GeneratorSession`] wrap a controller with the inputs
//! each workflow collects, and [`ToastHub`] surfaces failures transiently.

pub mod controller;
pub mod download;
pub mod error;
pub mod request;
pub mod session;
pub mod state;
pub mod toast;

#[cfg(test)]
mod testing;

pub use controller::{ErrorReporter, FALLBACK_ERROR_MESSAGE, OperationController, OperationHandle};
pub use download::{EDIT_DOWNLOAD_NAME, generated_download_name, save_asset};
pub use error::{LifecycleError, Result, SubmitError, ValidationError};
pub use request::{OperationKind, OperationRequest};
pub use session::{EditorSession, GeneratorSession, MaskPolicy};
pub use state::{OperationState, OperationStatus};
pub use toast::{TOAST_DURATION, Toast, ToastHub};
