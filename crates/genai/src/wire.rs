//! JSON bodies of the `generateContent` REST call.

use neongen_common::{DEFAULT_MEDIA_TYPE, ImageAsset, strip_data_uri_header};
use serde::{Deserialize, Serialize};

use crate::error::{GenAiError, Result};

/// Instruction sent alongside an attached stroke mask
pub const MASK_INSTRUCTION: &str = "The second image is a mask of the first: apply the edit only \
                                    inside the white region and leave black areas unchanged.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: Some(mime_type.into()),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "mime_type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<Modality>,
}

impl GenerationConfig {
    pub fn image_only() -> Self {
        Self {
            response_modalities: vec![Modality::Image],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Image,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// `{"error": {...}}` body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl GenerateContentRequest {
    fn single_turn(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content { role: None, parts }],
            generation_config: GenerationConfig::image_only(),
        }
    }

    /// Source image followed by the prompt, with an optional mask in between
    pub fn edit(
        source_image: &str,
        mime_type: &str,
        prompt: &str,
        mask: Option<&ImageAsset>,
    ) -> Self {
        let mut parts = vec![Part::inline(mime_type, strip_data_uri_header(source_image))];
        if let Some(mask) = mask {
            parts.push(Part::inline(mask.media_type(), mask.base64_payload()));
            parts.push(Part::text(MASK_INSTRUCTION));
        }
        parts.push(Part::text(prompt));
        Self::single_turn(parts)
    }

    pub fn generate(prompt: &str) -> Self {
        Self::single_turn(vec![Part::text(prompt)])
    }
}

impl GenerateContentResponse {
    /// The first inline image of the first candidate, in part order
    pub fn first_image(&self) -> Option<&Blob> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref())
    }

    pub fn into_image_asset(self) -> Result<ImageAsset> {
        let blob = self.first_image().ok_or_else(|| {
            if let Some(reason) = self
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
            {
                tracing::warn!(block_reason = reason, "Prompt blocked by the service");
            }
            GenAiError::NoImageInResponse
        })?;
        let mime_type = blob.mime_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE);
        Ok(ImageAsset::from_base64(mime_type, &blob.data))
    }
}

impl ErrorEnvelope {
    /// Best human-readable message for a failed HTTP exchange
    pub fn message_for(status: u16, body: &str) -> String {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
            if !envelope.error.message.trim().is_empty() {
                return envelope.error.message;
            }
            if let Some(status) = envelope.error.status {
                return status;
            }
        }
        let body = body.trim();
        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edit_request_shape() {
        let request = GenerateContentRequest::edit(
            "data:image/png;base64,QUJD",
            "image/png",
            "make the sky purple",
            None,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "QUJD" } },
                        { "text": "make the sky purple" }
                    ]
                }],
                "generationConfig": { "responseModalities": ["IMAGE"] }
            })
        );
    }

    #[test]
    fn test_edit_request_keeps_headerless_source() {
        let request = GenerateContentRequest::edit("QUJD", "image/jpeg", "p", None);
        let blob = request.contents[0].parts[0].inline_data.as_ref().unwrap();
        assert_eq!(blob.data, "QUJD");
        assert_eq!(blob.mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_edit_request_with_mask() {
        let mask = ImageAsset::from_base64("image/png", "TUFTSw==");
        let request =
            GenerateContentRequest::edit("QUJD", "image/png", "remove the cat", Some(&mask));
        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, "TUFTSw==");
        assert_eq!(parts[2].text.as_deref(), Some(MASK_INSTRUCTION));
        assert_eq!(parts[3].text.as_deref(), Some("remove the cat"));
    }

    #[test]
    fn test_generate_request_shape() {
        let value = serde_json::to_value(GenerateContentRequest::generate("a neon city")).unwrap();
        assert_eq!(value["contents"][0]["parts"], json!([{ "text": "a neon city" }]));
        assert_eq!(value["generationConfig"]["responseModalities"], json!(["IMAGE"]));
    }

    #[test]
    fn test_first_inline_part_wins() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here you go" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "Rk9P" } },
                    { "inlineData": { "mimeType": "image/png", "data": "QkFS" } }
                ]}
            }]
        }))
        .unwrap();
        let asset = response.into_image_asset().unwrap();
        assert_eq!(asset.data_uri(), "data:image/jpeg;base64,Rk9P");
    }

    #[test]
    fn test_empty_inline_part_still_taken_first() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "" } },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "Rk9P" } }
                ]}
            }]
        }))
        .unwrap();
        let asset = response.into_image_asset().unwrap();
        assert_eq!(asset.data_uri(), "data:image/png;base64,");
    }

    #[test]
    fn test_missing_media_type_defaults_to_png() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [ { "inline_data": { "data": "Rk9P" } } ] } }]
        }))
        .unwrap();
        let asset = response.into_image_asset().unwrap();
        assert_eq!(asset.media_type(), "image/png");
        assert!(asset.data_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_no_image_part() {
        let text_only: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [ { "text": "I can't draw that" } ] } }]
        }))
        .unwrap();
        assert_eq!(text_only.into_image_asset(), Err(GenAiError::NoImageInResponse));

        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(blocked.into_image_asset(), Err(GenAiError::NoImageInResponse));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(ErrorEnvelope::message_for(429, body), "quota exceeded");

        let statusless = r#"{"error":{"code":500,"message":"","status":"INTERNAL"}}"#;
        assert_eq!(ErrorEnvelope::message_for(500, statusless), "INTERNAL");

        assert_eq!(ErrorEnvelope::message_for(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(ErrorEnvelope::message_for(503, ""), "HTTP 503");
    }
}
