//! # Ports Layer
//!
//! - `inbound` - Commands the host may send to the plugin
//! - `outbound` - Services the host provides to the plugin

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
