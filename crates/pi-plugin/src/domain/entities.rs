//! # Domain Entities
//!
//! Records, vote data, billing status changes and the JSON command payloads
//! exchanged with the host.

use super::errors::{PiError, PiResult};
use super::value_objects::{
    BillingStatus, ProposalStatus, RecordState, RecordStatus, Timestamp, Token, VoteStatus,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Record file holding the vote metadata.
pub const FILE_NAME_VOTE_METADATA: &str = "votemetadata.json";

// =============================================================================
// BILLING
// =============================================================================

/// A persisted billing status change. Immutable once saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingStatusChange {
    /// Record token as signed by the client
    pub token: String,
    /// New billing status
    pub status: BillingStatus,
    /// Reason for the change, required when closing
    pub reason: String,
    /// Client public key, hex
    #[serde(rename = "publickey")]
    pub public_key: String,
    /// Client signature, hex
    pub signature: String,
    /// Unix timestamp of the change
    pub timestamp: Timestamp,
    /// Server signature over the client signature, hex
    pub receipt: String,
}

// =============================================================================
// VOTE
// =============================================================================

/// Optional vote metadata attached to a proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteMetadata {
    /// Deadline for RFP submissions; non-zero marks an RFP base proposal
    #[serde(rename = "linkby", default)]
    pub link_by: Timestamp,
    /// Token of the RFP this proposal is submitted to
    #[serde(rename = "linkto", default)]
    pub link_to: String,
}

impl VoteMetadata {
    /// RFP base proposal: solicits submissions, never bills.
    pub fn is_rfp(&self) -> bool {
        self.link_by != 0
    }

    /// RFP submission: bills like any other proposal.
    pub fn is_rfp_submission(&self) -> bool {
        !self.link_to.is_empty()
    }
}

/// Whether the optional vote metadata marks an RFP base proposal.
pub fn is_rfp(vote_metadata: Option<&VoteMetadata>) -> bool {
    vote_metadata.is_some_and(VoteMetadata::is_rfp)
}

/// Vote summary as reported by the vote plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSummary {
    /// Vote status
    pub status: VoteStatus,
}

// =============================================================================
// RECORDS
// =============================================================================

/// Record metadata owned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Record token
    pub token: Token,
    /// Record state
    pub state: RecordState,
    /// Record status
    pub status: RecordStatus,
}

/// A record file. The payload is base64.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFile {
    /// File name
    pub name: String,
    /// Base64 payload
    pub payload: String,
}

impl RecordFile {
    /// Build a file from raw bytes.
    pub fn new(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            payload: STANDARD.encode(data),
        }
    }

    /// Build the vote metadata file.
    pub fn vote_metadata(vm: &VoteMetadata) -> PiResult<Self> {
        let data = serde_json::to_vec(vm)?;
        Ok(Self::new(FILE_NAME_VOTE_METADATA, &data))
    }
}

/// A record as returned by the backend, possibly with files filtered out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record metadata
    pub metadata: RecordMetadata,
    /// Files included by the request filter
    pub files: Vec<RecordFile>,
}

impl Record {
    /// Decode the vote metadata file if present.
    pub fn vote_metadata(&self) -> PiResult<Option<VoteMetadata>> {
        let Some(file) = self
            .files
            .iter()
            .find(|f| f.name == FILE_NAME_VOTE_METADATA)
        else {
            return Ok(None);
        };
        let data = STANDARD
            .decode(&file.payload)
            .map_err(|e| PiError::CorruptBlob(format!("decode vote metadata: {}", e)))?;
        let vm = serde_json::from_slice(&data)
            .map_err(|e| PiError::CorruptBlob(format!("unmarshal vote metadata: {}", e)))?;
        Ok(Some(vm))
    }
}

/// Request for a single record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordRequest {
    /// Record token
    pub token: Token,
    /// Only return files with these names
    pub filenames: Vec<String>,
    /// Return no files at all
    pub omit_all_files: bool,
}

impl RecordRequest {
    /// Metadata plus the vote metadata file only.
    pub fn with_vote_metadata(token: Token) -> Self {
        Self {
            token,
            filenames: vec![FILE_NAME_VOTE_METADATA.to_string()],
            omit_all_files: false,
        }
    }

    /// Metadata only.
    pub fn abridged(token: Token) -> Self {
        Self {
            token,
            filenames: Vec::new(),
            omit_all_files: true,
        }
    }
}

// =============================================================================
// COMMAND PAYLOADS
// =============================================================================

/// `setbillingstatus` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBillingStatus {
    /// Full-length record token
    pub token: String,
    /// Requested billing status
    pub status: BillingStatus,
    /// Reason, required when closing
    #[serde(default)]
    pub reason: String,
    /// Client public key, hex
    #[serde(rename = "publickey")]
    pub public_key: String,
    /// Client signature over `token + status + reason`, hex
    pub signature: String,
}

impl SetBillingStatus {
    /// The message the client signs.
    pub fn signing_message(&self) -> String {
        signing_message(&self.token, self.status, &self.reason)
    }
}

/// Message signed by the client for a billing status change.
pub fn signing_message(token: &str, status: BillingStatus, reason: &str) -> String {
    format!("{}{}{}", token, status.code(), reason)
}

/// `setbillingstatus` reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBillingStatusReply {
    /// Server timestamp of the change
    pub timestamp: Timestamp,
    /// Server receipt, hex
    pub receipt: String,
}

/// `billingstatuschanges` reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingStatusChangesReply {
    /// Changes ordered oldest to newest
    #[serde(rename = "billingstatuschanges")]
    pub billing_status_changes: Vec<BillingStatusChange>,
}

/// Derived proposal summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSummary {
    /// Proposal status
    pub status: ProposalStatus,
}

/// `summary` reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReply {
    /// Proposal summary
    pub summary: ProposalSummary,
}
