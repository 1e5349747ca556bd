//! # Integration Tests
//!
//! End-to-end command flows through `PiService` and the in-memory backend.

pub mod flows;
