//! # Blob Codec
//!
//! Content-addressed blob envelope and the billing status change codec.
//!
//! ## Envelope
//!
//! ```text
//! BlobEntry {
//!     digest:   hex(sha256(data))
//!     datahint: base64(json(DataDescriptor { type, descriptor }))
//!     data:     base64(json(payload))
//! }
//! ```
//!
//! Decoding checks the descriptor first, then recomputes the digest over the
//! payload bytes. A digest mismatch means stored data was corrupted or
//! tampered with and is never skipped.

use crate::domain::{BillingStatusChange, PiError, PiResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Data type tag for JSON structures.
pub const DATA_TYPE_STRUCTURE: &str = "struct";

/// Version suffix of the billing status descriptor.
const BILLING_STATUS_DESCRIPTOR_SUFFIX: &str = "-billingstatus-v1";

/// SHA-256 digest of `data`.
pub fn digest(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Describes what a blob holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDescriptor {
    /// Data type tag
    #[serde(rename = "type")]
    pub data_type: String,
    /// Versioned payload descriptor
    pub descriptor: String,
}

/// A persisted blob with its integrity digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEntry {
    /// Hex SHA-256 of the decoded data
    pub digest: String,
    /// Base64 JSON data descriptor
    #[serde(rename = "datahint")]
    pub data_hint: String,
    /// Base64 payload
    pub data: String,
}

impl BlobEntry {
    /// Wrap a hint and payload, computing the digest over the payload.
    pub fn new(hint: &[u8], data: &[u8]) -> Self {
        Self {
            digest: hex::encode(digest(data)),
            data_hint: STANDARD.encode(hint),
            data: STANDARD.encode(data),
        }
    }

    /// Decode the data descriptor.
    pub fn descriptor(&self) -> PiResult<DataDescriptor> {
        let b = STANDARD
            .decode(&self.data_hint)
            .map_err(|e| PiError::CorruptBlob(format!("decode data hint: {}", e)))?;
        serde_json::from_slice(&b)
            .map_err(|e| PiError::CorruptBlob(format!("unmarshal data hint: {}", e)))
    }

    /// Decode the payload bytes and verify them against the digest.
    pub fn verified_data(&self) -> PiResult<Vec<u8>> {
        let data = STANDARD
            .decode(&self.data)
            .map_err(|e| PiError::CorruptBlob(format!("decode data: {}", e)))?;
        let want = hex::decode(&self.digest)
            .map_err(|e| PiError::CorruptBlob(format!("decode digest: {}", e)))?;
        let got = digest(&data);
        if got.as_slice() != want.as_slice() {
            return Err(PiError::Integrity {
                got: hex::encode(got),
                want: self.digest.clone(),
            });
        }
        Ok(data)
    }

    /// Decode a verified payload carrying `expected` as its descriptor.
    pub fn decode<T: DeserializeOwned>(&self, expected: &str) -> PiResult<T> {
        let dd = self.descriptor()?;
        if dd.descriptor != expected {
            return Err(PiError::UnexpectedDescriptor {
                got: dd.descriptor,
                want: expected.to_string(),
            });
        }
        let data = self.verified_data()?;
        serde_json::from_slice(&data)
            .map_err(|e| PiError::CorruptBlob(format!("unmarshal {}: {}", expected, e)))
    }
}

/// Encodes and decodes billing status changes for a given plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillingStatusCodec {
    descriptor: String,
}

impl BillingStatusCodec {
    /// Codec for the plugin with the given id.
    pub fn new(plugin_id: &str) -> Self {
        Self {
            descriptor: format!("{}{}", plugin_id, BILLING_STATUS_DESCRIPTOR_SUFFIX),
        }
    }

    /// Descriptor string of billing status blobs.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Wrap a change in a blob entry.
    pub fn encode(&self, change: &BillingStatusChange) -> PiResult<BlobEntry> {
        let data = serde_json::to_vec(change)?;
        let hint = serde_json::to_vec(&DataDescriptor {
            data_type: DATA_TYPE_STRUCTURE.to_string(),
            descriptor: self.descriptor.clone(),
        })?;
        Ok(BlobEntry::new(&hint, &data))
    }

    /// Unwrap and verify a change.
    pub fn decode(&self, blob: &BlobEntry) -> PiResult<BillingStatusChange> {
        blob.decode(&self.descriptor)
    }
}
