//! Durable cart storage.
//!
//! The cart is stored as a versioned envelope:
//!
//! ```json
//! { "version": 1, "checksum": "<sha256 of items>", "items": [ ... ] }
//! ```
//!
//! Older storefronts wrote a bare array of items, sometimes with the image
//! nested as `image.url`. Those records are still accepted.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

use vitrine_core::{CartLineItem, Price, ProductId, Size};

use crate::persist;

/// Current envelope version.
pub const CART_FORMAT_VERSION: u32 = 1;

/// Errors from reading, writing or decoding the stored cart.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cart checksum mismatch")]
    ChecksumMismatch,

    #[error("unsupported cart format version {0}")]
    UnsupportedVersion(u32),
}

/// Where the serialized cart lives.
pub trait CartStorage: Send + Sync {
    /// The stored bytes, or `None` if nothing was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn read(&self) -> Result<Option<Vec<u8>>, CartStorageError>;

    /// Replace the stored bytes in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn write(&self, bytes: &[u8]) -> Result<(), CartStorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for Arc<T> {
    fn read(&self) -> Result<Option<Vec<u8>>, CartStorageError> {
        (**self).read()
    }

    fn write(&self, bytes: &[u8]) -> Result<(), CartStorageError> {
        (**self).write(bytes)
    }
}

/// Cart stored in a JSON file, replaced atomically on each write.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileCartStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, CartStorageError> {
        Ok(persist::read_optional(&self.path)?)
    }

    fn write(&self, bytes: &[u8]) -> Result<(), CartStorageError> {
        Ok(persist::write_atomic(&self.path, bytes)?)
    }
}

/// Cart kept in memory, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `bytes`.
    #[must_use]
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
        }
    }

    /// What was last written.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.bytes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl CartStorage for MemoryCartStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, CartStorageError> {
        Ok(self.contents())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), CartStorageError> {
        *self
            .bytes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }
}

// =============================================================================
// Encoding
// =============================================================================

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    checksum: String,
    items: &'a [CartLineItem],
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    checksum: String,
    items: Vec<CartLineItem>,
}

/// Stored forms, newest first.
#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Envelope(Envelope),
    Legacy(Vec<serde_json::Value>),
}

/// Pre-envelope line item.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLineItem {
    #[serde(alias = "_id")]
    id: ProductId,
    name: String,
    price: Price,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    image: Option<LegacyImage>,
    size: Size,
    quantity: i64,
}

#[derive(Deserialize)]
struct LegacyImage {
    #[serde(default)]
    url: Option<String>,
}

impl LegacyLineItem {
    fn into_line(self) -> Option<CartLineItem> {
        let quantity = u32::try_from(self.quantity).ok().filter(|q| *q >= 1)?;
        let image_url = self
            .image_url
            .or_else(|| self.image.and_then(|image| image.url))
            .unwrap_or_default();

        Some(CartLineItem {
            id: self.id,
            name: self.name,
            price: self.price,
            image_url,
            size: self.size,
            quantity,
        })
    }
}

fn checksum(items: &[CartLineItem]) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(items)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Serialize cart lines into the current envelope format.
///
/// # Errors
///
/// Returns an error if the lines cannot be serialized.
pub fn encode_items(items: &[CartLineItem]) -> Result<Vec<u8>, CartStorageError> {
    let envelope = EnvelopeRef {
        version: CART_FORMAT_VERSION,
        checksum: checksum(items)?,
        items,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Parse stored cart bytes, accepting the envelope and the legacy array.
///
/// Legacy entries that cannot be read are skipped one by one; entries with
/// no units are dropped. Duplicate lines are left for the caller to merge.
///
/// # Errors
///
/// Returns an error for malformed JSON, an unknown version or a checksum
/// mismatch.
pub fn decode_items(bytes: &[u8]) -> Result<Vec<CartLineItem>, CartStorageError> {
    match serde_json::from_slice::<Stored>(bytes)? {
        Stored::Envelope(envelope) => {
            if envelope.version != CART_FORMAT_VERSION {
                return Err(CartStorageError::UnsupportedVersion(envelope.version));
            }
            if checksum(&envelope.items)? != envelope.checksum {
                return Err(CartStorageError::ChecksumMismatch);
            }
            Ok(envelope.items)
        }
        Stored::Legacy(entries) => Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                match serde_json::from_value::<LegacyLineItem>(entry) {
                    Ok(item) => item.into_line(),
                    Err(e) => {
                        warn!(index, error = %e, "Skipping unreadable legacy cart item");
                        None
                    }
                }
            })
            .collect()),
    }
}
