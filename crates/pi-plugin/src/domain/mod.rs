//! # Domain Layer
//!
//! Pure plugin logic. Nothing in here performs I/O.
//!
//! ## Modules
//!
//! - `value_objects` - Token and the closed status enumerations
//! - `entities` - Records, vote data, billing changes, command payloads
//! - `errors` - Error taxonomy
//! - `transitions` - Legal billing status changes
//! - `status` - Proposal status derivation
//! - `cache` - Bounded FIFO cache of derived facts

pub mod cache;
pub mod entities;
pub mod errors;
pub mod status;
pub mod transitions;
pub mod value_objects;

pub use cache::{CacheEntry, CacheStats, ResultCache, DEFAULT_CACHE_LIMIT};
pub use entities::*;
pub use errors::*;
pub use status::{approved_status, current_billing_status, proposal_status};
pub use transitions::{is_legal, is_settable, legal_targets, SETTABLE_BILLING_STATUSES};
pub use value_objects::*;
