use async_trait::async_trait;
use neongen_common::ImageAsset;

use crate::{
    GenerationService,
    config::GenAiConfig,
    error::{GenAiError, Result},
    wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse},
};

const EDIT_FALLBACK: &str = "Failed to edit image";
const GENERATE_FALLBACK: &str = "Failed to generate image";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the hosted multimodal image model.
///
/// Each operation performs exactly one HTTP request. There is no retry,
/// streaming or cancellation.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GenAiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GenAiError::upstream(e.to_string(), "Failed to build HTTP client"))?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GenAiConfig::from_env())
    }

    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    async fn send(&self, body: &GenerateContentRequest, fallback: &str) -> Result<ImageAsset> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenAiError::AuthenticationMissing)?;

        let endpoint = self.config.endpoint();
        tracing::info!(model = %self.config.model, "Sending generateContent request");

        let response = self
            .http
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "generateContent request failed");
                GenAiError::upstream(e.to_string(), fallback)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenAiError::upstream(e.to_string(), fallback))?;

        if !status.is_success() {
            let message = ErrorEnvelope::message_for(status.as_u16(), &text);
            tracing::error!(status = status.as_u16(), %message, "generateContent rejected");
            return Err(GenAiError::upstream(message, fallback));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            GenAiError::upstream(format!("Invalid response from service: {e}"), fallback)
        })?;
        let asset = parsed.into_image_asset()?;
        tracing::info!(media_type = asset.media_type(), "Received generated image");
        Ok(asset)
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn edit_image(
        &self,
        source_image: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<ImageAsset> {
        let body = GenerateContentRequest::edit(source_image, mime_type, prompt, None);
        self.send(&body, EDIT_FALLBACK).await
    }

    async fn edit_image_with_mask(
        &self,
        source_image: &str,
        mime_type: &str,
        prompt: &str,
        mask: &ImageAsset,
    ) -> Result<ImageAsset> {
        let body = GenerateContentRequest::edit(source_image, mime_type, prompt, Some(mask));
        self.send(&body, EDIT_FALLBACK).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImageAsset> {
        let body = GenerateContentRequest::generate(prompt);
        self.send(&body, GENERATE_FALLBACK).await
    }
}
