//! # Proposal Status Derivation
//!
//! Pure functions that fold record metadata, the vote outcome and the
//! billing status history into one proposal status.
//!
//! ```text
//! Unvetted ─┬─ Unreviewed ──→ Unvetted
//!           ├─ Archived ────→ UnvettedAbandoned
//!           └─ Censored ────→ UnvettedCensored
//! Vetted ───┬─ Archived ────→ Abandoned
//!           ├─ Censored ────→ Censored
//!           └─ Public ──────┬─ Unauthorized → UnderReview
//!                           ├─ Authorized ──→ VoteAuthorized
//!                           ├─ Started ─────→ VoteStarted
//!                           ├─ Rejected ────→ Rejected
//!                           └─ Approved ────→ Approved | Active | Closed | Completed
//! ```

use super::entities::{is_rfp, BillingStatusChange, VoteMetadata};
use super::errors::{PiError, PiResult};
use super::value_objects::{BillingStatus, ProposalStatus, RecordState, RecordStatus, VoteStatus};

/// Derive the proposal status.
///
/// `billing_history` must be sorted oldest to newest. Combinations that the
/// backend invariants rule out return [`PiError::Internal`].
pub fn proposal_status(
    state: RecordState,
    status: RecordStatus,
    vote_status: VoteStatus,
    vote_metadata: Option<&VoteMetadata>,
    billing_history: &[BillingStatusChange],
) -> PiResult<ProposalStatus> {
    match (state, status) {
        (RecordState::Unvetted, RecordStatus::Unreviewed) => Ok(ProposalStatus::Unvetted),
        (RecordState::Unvetted, RecordStatus::Archived) => Ok(ProposalStatus::UnvettedAbandoned),
        (RecordState::Unvetted, RecordStatus::Censored) => Ok(ProposalStatus::UnvettedCensored),
        (RecordState::Vetted, RecordStatus::Archived) => Ok(ProposalStatus::Abandoned),
        (RecordState::Vetted, RecordStatus::Censored) => Ok(ProposalStatus::Censored),
        (RecordState::Vetted, RecordStatus::Public) => match vote_status {
            VoteStatus::Unauthorized => Ok(ProposalStatus::UnderReview),
            VoteStatus::Authorized => Ok(ProposalStatus::VoteAuthorized),
            VoteStatus::Started => Ok(ProposalStatus::VoteStarted),
            VoteStatus::Rejected => Ok(ProposalStatus::Rejected),
            VoteStatus::Approved => approved_status(vote_metadata, billing_history),
            VoteStatus::Invalid => Err(unclassifiable(state, status, vote_status)),
        },
        (RecordState::Unvetted, RecordStatus::Public)
        | (RecordState::Vetted, RecordStatus::Unreviewed) => {
            Err(unclassifiable(state, status, vote_status))
        }
    }
}

/// Status of a proposal whose vote was approved.
///
/// RFP base proposals never bill and resolve to `Approved` whatever the
/// history holds. Everything else takes its billing status.
pub fn approved_status(
    vote_metadata: Option<&VoteMetadata>,
    billing_history: &[BillingStatusChange],
) -> PiResult<ProposalStatus> {
    if is_rfp(vote_metadata) {
        return Ok(ProposalStatus::Approved);
    }

    match current_billing_status(billing_history) {
        BillingStatus::Active => Ok(ProposalStatus::Active),
        BillingStatus::Closed => Ok(ProposalStatus::Closed),
        BillingStatus::Completed => Ok(ProposalStatus::Completed),
        BillingStatus::Invalid => Err(PiError::Internal(format!(
            "couldn't determine proposal status of an approved proposal: billing status {}",
            BillingStatus::Invalid
        ))),
    }
}

/// Current billing status of an approved proposal.
///
/// An empty history is `Active`; otherwise the last entry wins.
pub fn current_billing_status(billing_history: &[BillingStatusChange]) -> BillingStatus {
    billing_history
        .last()
        .map_or(BillingStatus::Active, |bsc| bsc.status)
}

fn unclassifiable(state: RecordState, status: RecordStatus, vote_status: VoteStatus) -> PiError {
    tracing::error!(
        %state,
        %status,
        %vote_status,
        "Proposal status inputs cannot be classified"
    );
    PiError::Internal(format!(
        "couldn't determine proposal status: state {}, status {}, vote status {}",
        state, status, vote_status
    ))
}
