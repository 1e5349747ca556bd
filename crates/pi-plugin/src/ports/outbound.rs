//! # Outbound Ports
//!
//! Services the host must provide: record and blob storage, the vote
//! plugin, the server identity and a clock.

use crate::codec::BlobEntry;
use crate::domain::{
    BackendError, Record, RecordRequest, SignatureError, Timestamp, Token, VoteSummary,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Host backend - outbound port.
///
/// Production: the politeia host. Testing: `InMemoryBackend`.
#[async_trait]
pub trait PluginBackend: Send + Sync {
    /// Fetch records. Missing tokens are absent from the returned map,
    /// which is keyed by hex token.
    async fn records(
        &self,
        requests: Vec<RecordRequest>,
    ) -> Result<HashMap<String, Record>, BackendError>;

    /// Vote summary from the vote plugin.
    async fn vote_summary(&self, token: &Token) -> Result<VoteSummary, BackendError>;

    /// Persist a blob against a record.
    async fn blob_save(&self, token: &Token, blob: BlobEntry) -> Result<(), BackendError>;

    /// All blobs with one of the given descriptors, in insertion order.
    async fn blobs_by_data_desc(
        &self,
        token: &Token,
        descriptors: &[String],
    ) -> Result<Vec<BlobEntry>, BackendError>;
}

/// Server identity and client signature checks.
pub trait Identity: Send + Sync {
    /// Sign a message with the server key.
    fn sign_message(&self, message: &[u8]) -> [u8; 64];

    /// Verify a hex client signature over `message` with a hex public key.
    fn verify_signature(
        &self,
        signature: &str,
        public_key: &str,
        message: &[u8],
    ) -> Result<(), SignatureError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}
