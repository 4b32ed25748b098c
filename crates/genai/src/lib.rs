//! # GenAI - Generation Service Client
//!
//! Thin adapter over a hosted multimodal model. An edit sends the source
//! image, its media type and the prompt; a generation sends only the prompt.
//! Both ask for image output and decode the first inline image of the reply
//! into an [`ImageAsset`].
//!
//! ```rust,no_run
//! use genai::{GeminiClient, GenAiConfig, GenerationService};
//!
//! # async fn run() -> genai::Result<()> {
//! let client = GeminiClient::new(GenAiConfig::from_env())?;
//! let asset = client.generate_image("a futuristic car in a neon city").await?;
//! println!("{}", asset.media_type());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod wire;

use async_trait::async_trait;
use neongen_common::ImageAsset;

pub use client::GeminiClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_MODEL, GenAiConfig};
pub use error::{GenAiError, Result};

/// One external call per invocation, yielding an image or a failure
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Edit `source_image` (a data URI or bare base64 payload) according to `prompt`
    async fn edit_image(
        &self,
        source_image: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<ImageAsset>;

    /// Same as [`edit_image`](Self::edit_image), also sending a binary mask of
    /// the region to change
    async fn edit_image_with_mask(
        &self,
        source_image: &str,
        mime_type: &str,
        prompt: &str,
        mask: &ImageAsset,
    ) -> Result<ImageAsset>;

    async fn generate_image(&self, prompt: &str) -> Result<ImageAsset>;
}
