//! # Inbound Ports
//!
//! API trait defining what the pi plugin can do.

use crate::domain::{
    BillingStatusChangesReply, PiResult, SetBillingStatus, SetBillingStatusReply, SummaryReply,
    Token,
};
use async_trait::async_trait;

/// Command id: set the billing status of an approved proposal.
pub const CMD_SET_BILLING_STATUS: &str = "setbillingstatus";

/// Command id: list the billing status changes of a proposal.
pub const CMD_BILLING_STATUS_CHANGES: &str = "billingstatuschanges";

/// Command id: derive the proposal summary.
pub const CMD_SUMMARY: &str = "summary";

/// Pi plugin API - inbound port.
#[async_trait]
pub trait PiPluginApi: Send + Sync {
    /// Validate, sign and persist a billing status change.
    async fn set_billing_status(
        &self,
        token: &Token,
        request: SetBillingStatus,
    ) -> PiResult<SetBillingStatusReply>;

    /// All billing status changes of a proposal, oldest first.
    async fn billing_status_changes(&self, token: &Token) -> PiResult<BillingStatusChangesReply>;

    /// Derived proposal status.
    async fn summary(&self, token: &Token) -> PiResult<SummaryReply>;

    /// Route a raw JSON command and return the JSON reply.
    ///
    /// Unknown command ids fail with [`crate::PiError::InvalidCommand`].
    async fn cmd(&self, token: &Token, cmd_id: &str, payload: &str) -> PiResult<String>;
}
