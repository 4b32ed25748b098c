use std::{fmt, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::{CommonError, Result};

/// Media type assumed when a response or file does not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Immutable handle to encoded image data.
///
/// The pixels are held as a `data:{media_type};base64,{payload}` string.
/// Cloning is cheap and a clone never observes a different value, so an asset
/// can be kept around for "edit again" while a new one is produced.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    media_type: Arc<str>,
    data_uri: Arc<str>,
}

impl ImageAsset {
    /// Build an asset from an already base64-encoded payload
    pub fn from_base64(media_type: &str, payload: &str) -> Self {
        let media_type = if media_type.trim().is_empty() {
            DEFAULT_MEDIA_TYPE
        } else {
            media_type.trim()
        };
        Self {
            data_uri: format!("data:{media_type};base64,{payload}").into(),
            media_type: media_type.into(),
        }
    }

    /// Build an asset by base64-encoding raw file bytes
    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        Self::from_base64(media_type, &BASE64.encode(bytes))
    }

    /// Parse a `data:` URI of the form `data:<type>;base64,<payload>`
    pub fn parse(data_uri: &str) -> Result<Self> {
        let rest = data_uri
            .strip_prefix("data:")
            .ok_or_else(|| invalid("missing 'data:' prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("missing ',' separator"))?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("payload is not base64 encoded"))?;
        if payload.is_empty() {
            return Err(invalid("empty payload"));
        }
        Ok(Self::from_base64(media_type, payload))
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// The base64 payload without the `data:` header
    pub fn base64_payload(&self) -> &str {
        strip_data_uri_header(&self.data_uri)
    }

    /// Decode the payload back into the encoded file bytes
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(self.base64_payload())?)
    }

    /// File extension matching the declared media type
    pub fn extension(&self) -> &'static str {
        match self.media_type() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads run to megabytes; print only the size.
        f.debug_struct("ImageAsset")
            .field("media_type", &self.media_type)
            .field("payload_len", &self.base64_payload().len())
            .finish()
    }
}

/// Drop an embedded `data:...;base64,` header if one is present.
///
/// A string without a comma, or with nothing after the first comma, is
/// returned unchanged.
pub fn strip_data_uri_header(source: &str) -> &str {
    match source.split(',').nth(1) {
        Some(payload) if !payload.is_empty() => payload,
        _ => source,
    }
}

fn invalid(reason: &str) -> CommonError {
    CommonError::InvalidDataUri {
        reason: reason.to_string(),
    }
}
