//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod identity;
pub mod memory;
pub mod time;

pub use identity::{verify_hex, Ed25519Identity};
pub use memory::{BackendCalls, InMemoryBackend};
pub use time::{FixedTimeSource, SystemTimeSource};
