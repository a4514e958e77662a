//! File storage for uploaded store images.
//!
//! The front end sends images inline as base64, either bare or as a
//! `data:image/png;base64,...` URL. They are written under the configured root
//! as `stores/<uuid>.<ext>` and the relative path is kept in `stores.image`.

use crate::errors::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A decoded image ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// File extension for the detected type
    pub extension: &'static str,
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

/// Decodes a base64 image. Returns `None` when the payload is not valid
/// base64 or not a recognised image type.
#[must_use]
pub fn decode_image(encoded: &str) -> Option<DecodedImage> {
    let encoded = encoded.trim();
    let (declared, payload) = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (mime, data) = rest.split_once(";base64,")?;
            (Some(extension_for_mime(mime)?), data)
        }
        None => (None, encoded),
    };

    let bytes = STANDARD.decode(payload).ok()?;
    if bytes.is_empty() {
        return None;
    }
    let extension = declared.or_else(|| sniff_extension(&bytes))?;
    Some(DecodedImage { bytes, extension })
}

/// Local filesystem storage rooted at `storage.root`
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Storage writing under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a stored relative path.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes `image` as the picture for store `uuid` and returns the path
    /// relative to the storage root.
    pub async fn save_store_image(&self, uuid: &str, image: &DecodedImage) -> Result<String> {
        let relative = format!("stores/{uuid}.{}", image.extension);
        let path = self.path(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &image.bytes).await?;
        debug!("Stored {} bytes at {}", image.bytes.len(), path.display());
        Ok(relative)
    }

    /// Removes a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> Result<()> {
        let path = self.path(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} already removed", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
