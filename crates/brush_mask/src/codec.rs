//! Conversion between image files, decoded bitmaps and [`ImageAsset`]s.

use std::{fs, io::Cursor, path::Path};

use image::{DynamicImage, ImageFormat};
use neongen_common::ImageAsset;

use crate::error::{MaskError, Result};

/// Formats accepted at the upload boundary
const ACCEPTED_FORMATS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Jpeg];

/// Read a user-selected file into a data-URI asset
pub fn read_image_file<P: AsRef<Path>>(path: P) -> Result<ImageAsset> {
    let bytes = fs::read(path.as_ref())?;
    let asset = asset_from_bytes(&bytes)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        media_type = asset.media_type(),
        bytes = bytes.len(),
        "Read image file"
    );
    Ok(asset)
}

/// Wrap encoded file bytes, detecting the media type from their contents
pub fn asset_from_bytes(bytes: &[u8]) -> Result<ImageAsset> {
    let format = image::guess_format(bytes)?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(MaskError::UnsupportedFormat(format!("{format:?}")));
    }
    Ok(ImageAsset::from_bytes(format.to_mime_type(), bytes))
}

/// Decode an asset into a displayable bitmap
pub fn decode_asset(asset: &ImageAsset) -> Result<DynamicImage> {
    let bytes = asset.decode_bytes()?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Re-encode a bitmap as a PNG asset
pub fn encode_png(image: &DynamicImage) -> Result<ImageAsset> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(ImageAsset::from_bytes("image/png", buffer.get_ref()))
}
