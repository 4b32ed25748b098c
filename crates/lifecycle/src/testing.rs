//! In-memory generation service used by the controller and session tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use genai::{GenAiError, GenerationService};
use neongen_common::ImageAsset;
use tokio::sync::Notify;

use crate::controller::ErrorReporter;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub source_image: Option<String>,
    pub mime_type: Option<String>,
    pub prompt: String,
    pub mask: Option<ImageAsset>,
}

pub struct ScriptedService {
    reply: Mutex<Result<ImageAsset, GenAiError>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    recorded: Mutex<Vec<RecordedCall>>,
}

impl ScriptedService {
    pub fn replying(reply: Result<ImageAsset, GenAiError>) -> Self {
        Self {
            reply: Mutex::new(reply),
            gate: None,
            calls: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn image(media_type: &str) -> Self {
        Self::replying(Ok(ImageAsset::from_base64(media_type, "iVBORw0KGgo=")))
    }

    pub fn failing(error: GenAiError) -> Self {
        Self::replying(Err(error))
    }

    /// Hold every call open until the returned gate is notified
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn set_reply(&self, reply: Result<ImageAsset, GenAiError>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.recorded.lock().unwrap().clone()
    }

    async fn respond(&self, call: RecordedCall) -> Result<ImageAsset, GenAiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn edit_image(
        &self,
        source_image: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<ImageAsset, GenAiError> {
        self.respond(RecordedCall {
            method: "edit_image",
            source_image: Some(source_image.to_string()),
            mime_type: Some(mime_type.to_string()),
            prompt: prompt.to_string(),
            mask: None,
        })
        .await
    }

    async fn edit_image_with_mask(
        &self,
        source_image: &str,
        mime_type: &str,
        prompt: &str,
        mask: &ImageAsset,
    ) -> Result<ImageAsset, GenAiError> {
        self.respond(RecordedCall {
            method: "edit_image_with_mask",
            source_image: Some(source_image.to_string()),
            mime_type: Some(mime_type.to_string()),
            prompt: prompt.to_string(),
            mask: Some(mask.clone()),
        })
        .await
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageAsset, GenAiError> {
        self.respond(RecordedCall {
            method: "generate_image",
            source_image: None,
            mime_type: None,
            prompt: prompt.to_string(),
            mask: None,
        })
        .await
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
