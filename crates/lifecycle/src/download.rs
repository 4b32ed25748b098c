use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use neongen_common::ImageAsset;

use crate::error::Result;

pub const DOWNLOAD_PREFIX: &str = "neon-gen";
/// Edited results always download under the same name
pub const EDIT_DOWNLOAD_NAME: &str = "neon-gen-edit.png";

/// `neon-gen-{unix millis}.png`, unique per generation
pub fn generated_download_name(at: DateTime<Utc>) -> String {
    format!("{DOWNLOAD_PREFIX}-{}.png", at.timestamp_millis())
}

/// Decode the asset and write its bytes to `path`, creating parent directories
pub fn save_asset(asset: &ImageAsset, path: &Path) -> Result<PathBuf> {
    let bytes = asset.decode_bytes()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved image");
    Ok(path.to_path_buf())
}
