//! # Pi Plugin
//!
//! Proposal lifecycle plugin for an append-only, content-addressed record
//! backend.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Derive one authoritative proposal status from record metadata, the
//!   vote outcome and the billing status history
//! - Accept signed, append-only billing status changes
//! - Serve repeated summaries from a bounded cache of facts that can no
//!   longer change
//!
//! ## Commands
//!
//! | Command | Payload | Reply |
//! |---------|---------|-------|
//! | `setbillingstatus` | `{token, status, reason, publickey, signature}` | `{timestamp, receipt}` |
//! | `billingstatuschanges` | none | `{billingstatuschanges: [...]}` |
//! | `summary` | none | `{summary: {status}}` |
//!
//! ## Integrity
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Token binding | Payload token must equal the command token |
//! | Client signature | Ed25519 over `token + status + reason` |
//! | Server receipt | Ed25519 over the client signature |
//! | Digest check | Every stored change is re-hashed on read |
//!
//! ## Module Structure
//!
//! ```text
//! pi-plugin/
//! ├── domain/      # Statuses, entities, errors, derivation, transitions, cache
//! ├── codec/       # Blob envelope and billing status codec
//! ├── ports/       # API trait (inbound) + host services (outbound)
//! ├── adapters/    # Ed25519 identity, in-memory backend, clocks
//! ├── service.rs   # PiService command dispatcher
//! └── config.rs    # PiConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    verify_hex, BackendCalls, Ed25519Identity, FixedTimeSource, InMemoryBackend,
    SystemTimeSource,
};
pub use codec::{BillingStatusCodec, BlobEntry, DataDescriptor, DATA_TYPE_STRUCTURE};
pub use config::{PiConfig, PluginSetting, PLUGIN_ID, SETTING_BILLING_STATUS_CHANGES_MAX};
pub use domain::{
    approved_status, current_billing_status, is_legal, is_rfp, is_settable, legal_targets,
    proposal_status, signing_message, BackendError, BillingStatus, BillingStatusChange,
    BillingStatusChangesReply, CacheEntry, CacheStats, ErrorCode, ErrorKind, PiError, PiResult,
    PluginError, ProposalStatus, ProposalSummary, Record, RecordFile, RecordMetadata,
    RecordRequest, RecordState, RecordStatus, ResultCache, SetBillingStatus,
    SetBillingStatusReply, SignatureError, StatusTier, SummaryReply, Timestamp, Token,
    VoteMetadata, VoteStatus, VoteSummary, FILE_NAME_VOTE_METADATA,
    SETTABLE_BILLING_STATUSES,
};
pub use ports::{
    Identity, PiPluginApi, PluginBackend, TimeSource, CMD_BILLING_STATUS_CHANGES,
    CMD_SET_BILLING_STATUS, CMD_SUMMARY,
};
pub use service::PiService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
