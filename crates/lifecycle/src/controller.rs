use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use genai::GenerationService;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    error::{SubmitError, ValidationError},
    request::{OperationKind, OperationRequest},
    state::OperationState,
};

/// Message used when a failure carries no text of its own
pub const FALLBACK_ERROR_MESSAGE: &str = "Operation failed";

/// Sink for user-visible failure messages
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Drives one external call at a time through `Idle -> Processing -> Success | Error`.
///
/// A failed operation stays in `Error` until [`reset`](Self::reset) or the
/// next submission. State changes are published on a `watch` channel.
#[derive(Clone)]
pub struct OperationController {
    service: Arc<dyn GenerationService>,
    shared: Arc<Shared>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

struct Shared {
    state: watch::Sender<OperationState>,
    /// Bumped by every submit and reset; a completion only lands if its
    /// epoch is still current
    epoch: AtomicU64,
    /// Set while a service call is running, including one abandoned by reset
    in_flight: AtomicBool,
}

impl Shared {
    fn finish(&self, epoch: u64, next: OperationState) -> bool {
        self.state.send_if_modified(|state| {
            self.in_flight.store(false, Ordering::SeqCst);
            if self.epoch.load(Ordering::SeqCst) != epoch || !state.is_processing() {
                return false;
            }
            *state = next;
            true
        })
    }
}

impl OperationController {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        let (state, _) = watch::channel(OperationState::Idle);
        Self {
            service,
            shared: Arc::new(Shared {
                state,
                epoch: AtomicU64::new(0),
                in_flight: AtomicBool::new(false),
            }),
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn state(&self) -> OperationState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.shared.state.subscribe()
    }

    pub fn is_processing(&self) -> bool {
        self.shared.state.borrow().is_processing()
    }

    /// True while a service call is running, even one whose result a reset discarded
    pub fn is_busy(&self) -> bool {
        self.is_processing() || self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Whether a trigger control for `request` should be enabled
    pub fn can_submit(&self, request: &OperationRequest) -> bool {
        request.is_valid() && !self.is_busy()
    }

    /// Validate the request, move to `Processing` and start the call.
    ///
    /// The transition happens before this returns. The call itself runs on a
    /// spawned task, so it must be invoked from within a Tokio runtime.
    pub fn submit(&self, request: OperationRequest) -> Result<OperationHandle, SubmitError> {
        request.validate()?;

        let mut epoch = 0;
        let accepted = self.shared.state.send_if_modified(|state| {
            if state.is_processing() || self.shared.in_flight.load(Ordering::SeqCst) {
                return false;
            }
            self.shared.in_flight.store(true, Ordering::SeqCst);
            epoch = self.shared.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            *state = OperationState::Processing;
            true
        });
        if !accepted {
            tracing::warn!(kind = %request.kind, "Rejected submission while processing");
            return Err(SubmitError::Busy);
        }

        tracing::info!(kind = %request.kind, epoch, "Operation submitted");
        let kind = request.kind;
        let task = tokio::spawn(run_operation(
            self.service.clone(),
            self.shared.clone(),
            self.reporter.clone(),
            request,
            epoch,
        ));
        Ok(OperationHandle { kind, task })
    }

    /// Return to `Idle` from any state, dropping any held result.
    ///
    /// An in-flight call is not aborted; its outcome is discarded, and new
    /// submissions are refused as `Busy` until it completes.
    pub fn reset(&self) {
        self.shared.state.send_modify(|state| {
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
            *state = OperationState::Idle;
        });
    }
}

/// Completion of one submitted operation
#[derive(Debug)]
pub struct OperationHandle {
    kind: OperationKind,
    task: JoinHandle<OperationState>,
}

impl OperationHandle {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Wait for the call to finish.
    ///
    /// Yields the terminal state this call produced, even if the controller
    /// was reset in the meantime and no longer shows it.
    pub async fn wait(self) -> OperationState {
        match self.task.await {
            Ok(state) => state,
            Err(e) => OperationState::Error {
                message: format!("Operation task failed: {e}"),
            },
        }
    }
}

/// Moves the controller to `Error` if the task ends without completing
struct CompletionGuard {
    shared: Arc<Shared>,
    epoch: u64,
    armed: bool,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if self.armed {
            self.shared.finish(
                self.epoch,
                OperationState::Error {
                    message: "Operation was interrupted".to_string(),
                },
            );
        }
    }
}

async fn run_operation(
    service: Arc<dyn GenerationService>,
    shared: Arc<Shared>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    request: OperationRequest,
    epoch: u64,
) -> OperationState {
    let mut guard = CompletionGuard {
        shared: shared.clone(),
        epoch,
        armed: true,
    };

    let outcome = match (request.kind, request.source.as_ref()) {
        (OperationKind::Generate, _) => service.generate_image(&request.prompt).await,
        (OperationKind::Edit, Some(source)) => match request.mask.as_ref() {
            Some(mask) => {
                service
                    .edit_image_with_mask(
                        source.data_uri(),
                        source.media_type(),
                        &request.prompt,
                        mask,
                    )
                    .await
            }
            None => {
                service
                    .edit_image(source.data_uri(), source.media_type(), &request.prompt)
                    .await
            }
        },
        (OperationKind::Edit, None) => Err(genai::GenAiError::Upstream(
            ValidationError::MissingSourceImage.to_string(),
        )),
    };
    guard.armed = false;

    let next = match outcome {
        Ok(image) => {
            tracing::info!(
                kind = %request.kind,
                media_type = image.media_type(),
                "Operation succeeded"
            );
            OperationState::Success { image }
        }
        Err(e) => {
            let message = non_empty_message(e.to_string());
            tracing::error!(kind = %request.kind, %message, "Operation failed");
            OperationState::Error { message }
        }
    };

    if shared.finish(epoch, next.clone()) {
        if let (Some(reporter), OperationState::Error { message }) = (&reporter, &next) {
            reporter.report(message);
        }
    } else {
        tracing::debug!(kind = %request.kind, epoch, "Discarded result of abandoned operation");
    }
    next
}

fn non_empty_message(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingReporter, ScriptedService};
    use genai::GenAiError;
    use neongen_common::ImageAsset;

    fn source() -> ImageAsset {
        ImageAsset::from_base64("image/png", "U09VUkNF")
    }

    fn controller_with(service: ScriptedService) -> (OperationController, Arc<ScriptedService>) {
        let service = Arc::new(service);
        (OperationController::new(service.clone()), service)
    }

    #[tokio::test]
    async fn test_edit_success_holds_png_asset() {
        let (controller, service) = controller_with(ScriptedService::image("image/png"));

        let handle = controller
            .submit(OperationRequest::edit(source(), "make the sky purple"))
            .unwrap();
        assert_eq!(controller.state(), OperationState::Processing);

        let finished = handle.wait().await;
        let image = finished.image().expect("edit should succeed");
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(controller.state(), finished);

        let calls = service.recorded();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "edit_image");
        assert_eq!(calls[0].source_image.as_deref(), Some(source().data_uri()));
        assert_eq!(calls[0].mime_type.as_deref(), Some("image/png"));
        assert_eq!(calls[0].prompt, "make the sky purple");
    }

    #[tokio::test]
    async fn test_result_media_type_follows_response() {
        let (controller, _) = controller_with(ScriptedService::image("image/webp"));
        let finished = controller
            .submit(OperationRequest::generate("a neon city"))
            .unwrap()
            .wait()
            .await;
        assert!(finished.image().unwrap().data_uri().starts_with("data:image/webp;base64,"));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_and_state_stays_idle() {
        let (controller, service) = controller_with(ScriptedService::image("image/png"));

        let err = controller.submit(OperationRequest::generate("")).unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::EmptyPrompt)));
        assert_eq!(controller.state(), OperationState::Idle);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_edit_without_source_rejected() {
        let (controller, service) = controller_with(ScriptedService::image("image/png"));
        let err = controller
            .submit(OperationRequest::edit(None::<ImageAsset>, "make it red"))
            .unwrap_err();
        assert!(matches!(err, SubmitError::Validation(ValidationError::MissingSourceImage)));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_persists_as_error() {
        let reporter = Arc::new(RecordingReporter::default());
        let service = Arc::new(ScriptedService::failing(GenAiError::Upstream(
            "quota exceeded".into(),
        )));
        let controller = OperationController::new(service).with_reporter(reporter.clone());

        controller.submit(OperationRequest::generate("a cat")).unwrap().wait().await;

        // Generation failures no longer fall back to Idle.
        assert_eq!(
            controller.state(),
            OperationState::Error {
                message: "quota exceeded".to_string()
            }
        );
        assert_eq!(reporter.messages(), vec!["quota exceeded".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_image_reaches_error_with_message() {
        let (controller, _) =
            controller_with(ScriptedService::failing(GenAiError::NoImageInResponse));
        let finished = controller
            .submit(OperationRequest::edit(source(), "sharpen"))
            .unwrap()
            .wait()
            .await;
        let message = finished.error_message().expect("should fail");
        assert!(!message.trim().is_empty());
        assert_eq!(message, "No image data found in the response.");
    }

    #[tokio::test]
    async fn test_blank_error_message_replaced() {
        let (controller, _) =
            controller_with(ScriptedService::failing(GenAiError::Upstream(String::new())));
        let finished = controller
            .submit(OperationRequest::generate("x"))
            .unwrap()
            .wait()
            .await;
        assert_eq!(finished.error_message(), Some(FALLBACK_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_second_submit_while_processing_rejected() {
        let (service, gate) = ScriptedService::image("image/png").gated();
        let (controller, service) = controller_with(service);

        let first = controller.submit(OperationRequest::generate("first")).unwrap();
        let second = controller.submit(OperationRequest::generate("second"));
        assert!(matches!(second, Err(SubmitError::Busy)));
        assert!(!controller.can_submit(&OperationRequest::generate("third")));

        gate.notify_one();
        assert!(first.wait().await.is_terminal());
        assert_eq!(service.calls(), 1);
        assert_eq!(service.recorded()[0].prompt, "first");
    }

    #[tokio::test]
    async fn test_submit_allowed_from_terminal_states() {
        let (controller, service) =
            controller_with(ScriptedService::failing(GenAiError::NoImageInResponse));
        controller.submit(OperationRequest::generate("one")).unwrap().wait().await;
        assert!(controller.state().error_message().is_some());

        service.set_reply(Ok(ImageAsset::from_base64("image/png", "QUJD")));
        let handle = controller.submit(OperationRequest::generate("two")).unwrap();
        assert!(controller.state().is_processing());
        handle.wait().await;
        assert!(controller.state().image().is_some());

        controller.submit(OperationRequest::generate("three")).unwrap().wait().await;
        assert_eq!(service.calls(), 3);
    }

    #[tokio::test]
    async fn test_reset_from_every_state_yields_idle() {
        let (service, gate) = ScriptedService::image("image/png").gated();
        let (controller, service) = controller_with(service);

        controller.reset();
        assert_eq!(controller.state(), OperationState::Idle);

        let handle = controller.submit(OperationRequest::generate("a")).unwrap();
        controller.reset();
        assert_eq!(controller.state(), OperationState::Idle);
        gate.notify_one();
        handle.wait().await;
        // The abandoned call finished but its result is not shown.
        assert_eq!(controller.state(), OperationState::Idle);

        gate.notify_one();
        controller.submit(OperationRequest::generate("b")).unwrap().wait().await;
        assert!(controller.state().image().is_some());
        controller.reset();
        assert_eq!(controller.state(), OperationState::Idle);

        service.set_reply(Err(GenAiError::NoImageInResponse));
        gate.notify_one();
        controller.submit(OperationRequest::generate("c")).unwrap().wait().await;
        controller.reset();
        controller.reset();
        assert_eq!(controller.state(), OperationState::Idle);
    }

    #[tokio::test]
    async fn test_abandoned_call_still_blocks_submission() {
        let (service, gate) = ScriptedService::image("image/png").gated();
        let (controller, service) = controller_with(service);

        let abandoned = controller.submit(OperationRequest::generate("a")).unwrap();
        controller.reset();
        assert_eq!(controller.state(), OperationState::Idle);
        assert!(controller.is_busy());
        assert!(!controller.can_submit(&OperationRequest::generate("b")));
        assert!(matches!(
            controller.submit(OperationRequest::generate("b")),
            Err(SubmitError::Busy)
        ));
        assert_eq!(service.calls(), 1);

        gate.notify_one();
        abandoned.wait().await;
        assert!(!controller.is_busy());

        gate.notify_one();
        controller.submit(OperationRequest::generate("b")).unwrap().wait().await;
        assert_eq!(service.calls(), 2);
        assert_eq!(service.recorded()[1].prompt, "b");
    }

    #[tokio::test]
    async fn test_discarded_failure_not_reported() {
        let (service, gate) = ScriptedService::failing(GenAiError::Upstream("late".into())).gated();
        let reporter = Arc::new(RecordingReporter::default());
        let controller =
            OperationController::new(Arc::new(service)).with_reporter(reporter.clone());

        let handle = controller.submit(OperationRequest::generate("a")).unwrap();
        controller.reset();
        gate.notify_one();
        handle.wait().await;

        assert!(reporter.messages().is_empty());
        assert_eq!(controller.state(), OperationState::Idle);
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let (controller, _) = controller_with(ScriptedService::image("image/png"));
        let mut updates = controller.subscribe();

        let handle = controller.submit(OperationRequest::generate("watch me")).unwrap();
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_processing());

        handle.wait().await;
        updates.changed().await.unwrap();
        assert!(updates.borrow().image().is_some());
    }

    #[tokio::test]
    async fn test_masked_edit_uses_mask_call() {
        let (controller, service) = controller_with(ScriptedService::image("image/png"));
        let mask = ImageAsset::from_base64("image/png", "TUFTSw==");
        controller
            .submit(OperationRequest::edit(source(), "remove it").with_mask(mask.clone()))
            .unwrap()
            .wait()
            .await;

        let calls = service.recorded();
        assert_eq!(calls[0].method, "edit_image_with_mask");
        assert_eq!(calls[0].mask, Some(mask));
    }
}
