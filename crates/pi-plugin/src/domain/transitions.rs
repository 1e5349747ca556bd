//! # Billing Status Transitions
//!
//! The static table of legal billing status changes.
//!
//! ```text
//!            ┌──────────┐
//!      ┌────→│  Closed  │←────┐
//!      │     └──────────┘     │
//!      ↓          ↑           ↓
//! ┌──────────┐    │     ┌───────────┐
//! │  Active  │←───┼────→│ Completed │
//! └──────────┘    │     └───────────┘
//! ```
//!
//! Every ordered pair of distinct settable statuses is legal. Self
//! transitions are not, and `Invalid` is never a source or a target.

use super::value_objects::BillingStatus;

/// Statuses a client may request.
pub const SETTABLE_BILLING_STATUSES: [BillingStatus; 3] = [
    BillingStatus::Active,
    BillingStatus::Closed,
    BillingStatus::Completed,
];

/// Whether `status` may be requested by a client.
pub fn is_settable(status: BillingStatus) -> bool {
    match status {
        BillingStatus::Active | BillingStatus::Closed | BillingStatus::Completed => true,
        BillingStatus::Invalid => false,
    }
}

/// Whether the billing status may move from `from` to `to`.
pub fn is_legal(from: BillingStatus, to: BillingStatus) -> bool {
    use BillingStatus::*;

    match (from, to) {
        (Active, Closed) | (Active, Completed) => true,
        (Closed, Active) | (Closed, Completed) => true,
        (Completed, Active) | (Completed, Closed) => true,
        (Active, Active) | (Closed, Closed) | (Completed, Completed) => false,
        (Invalid, _) | (_, Invalid) => false,
    }
}

/// Legal targets from `from`, in table order.
pub fn legal_targets(from: BillingStatus) -> Vec<BillingStatus> {
    SETTABLE_BILLING_STATUSES
        .into_iter()
        .filter(|to| is_legal(from, *to))
        .collect()
}
