//! # Domain Value Objects
//!
//! Immutable value types shared by every layer of the plugin: the record
//! token and the closed status enumerations, together with their stable
//! numeric wire codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of a record token in bytes.
pub const TOKEN_SIZE: usize = 8;

/// Unix timestamp in seconds.
pub type Timestamp = i64;

// =============================================================================
// TOKEN
// =============================================================================

/// Fixed-length record identifier.
///
/// The canonical string form is lowercase hex of the full token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token([u8; TOKEN_SIZE]);

impl Token {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self(bytes)
    }

    /// Decode a full-length hex token.
    pub fn from_hex(s: &str) -> Result<Self, TokenDecodeError> {
        if s.len() != TOKEN_SIZE * 2 {
            return Err(TokenDecodeError::InvalidLength { got: s.len() });
        }
        let mut bytes = [0u8; TOKEN_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| TokenDecodeError::InvalidHex)?;
        Ok(Self(bytes))
    }

    /// Canonical hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; TOKEN_SIZE] {
        &self.0
    }

    /// Human-readable description of the accepted token format.
    pub fn format_hint() -> String {
        format!("token must be {} hex characters", TOKEN_SIZE * 2)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Token {
    type Error = TokenDecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Token::from_hex(&value)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.to_hex()
    }
}

/// Reasons a token string fails to decode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenDecodeError {
    /// Token is not full length.
    #[error("invalid token length: got {got} characters, want {}", TOKEN_SIZE * 2)]
    InvalidLength {
        /// Characters received
        got: usize,
    },
    /// Token contains non-hex characters.
    #[error("token is not valid hex")]
    InvalidHex,
}

// =============================================================================
// RECORD STATE / STATUS (owned by the backend)
// =============================================================================

/// Record state as tracked by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RecordState {
    /// Record has not been made public.
    Unvetted,
    /// Record has been vetted by an admin.
    Vetted,
}

impl RecordState {
    /// All variants.
    pub const ALL: [RecordState; 2] = [RecordState::Unvetted, RecordState::Vetted];
}

impl TryFrom<u32> for RecordState {
    type Error = UnknownCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(RecordState::Unvetted),
            2 => Ok(RecordState::Vetted),
            _ => Err(UnknownCode::new("record state", code)),
        }
    }
}

impl From<RecordState> for u32 {
    fn from(state: RecordState) -> Self {
        match state {
            RecordState::Unvetted => 1,
            RecordState::Vetted => 2,
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordState::Unvetted => "unvetted",
            RecordState::Vetted => "vetted",
        })
    }
}

/// Record status as tracked by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RecordStatus {
    /// Awaiting admin review.
    Unreviewed,
    /// Publicly visible.
    Public,
    /// Censored by an admin.
    Censored,
    /// Abandoned by the author.
    Archived,
}

impl RecordStatus {
    /// All variants.
    pub const ALL: [RecordStatus; 4] = [
        RecordStatus::Unreviewed,
        RecordStatus::Public,
        RecordStatus::Censored,
        RecordStatus::Archived,
    ];
}

impl TryFrom<u32> for RecordStatus {
    type Error = UnknownCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(RecordStatus::Unreviewed),
            2 => Ok(RecordStatus::Public),
            3 => Ok(RecordStatus::Censored),
            4 => Ok(RecordStatus::Archived),
            _ => Err(UnknownCode::new("record status", code)),
        }
    }
}

impl From<RecordStatus> for u32 {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Unreviewed => 1,
            RecordStatus::Public => 2,
            RecordStatus::Censored => 3,
            RecordStatus::Archived => 4,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordStatus::Unreviewed => "unreviewed",
            RecordStatus::Public => "public",
            RecordStatus::Censored => "censored",
            RecordStatus::Archived => "archived",
        })
    }
}

/// A numeric code that does not name any variant of a closed enum.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code {code}")]
pub struct UnknownCode {
    /// Enum being decoded
    pub kind: &'static str,
    /// Offending code
    pub code: u32,
}

impl UnknownCode {
    fn new(kind: &'static str, code: u32) -> Self {
        Self { kind, code }
    }
}

// =============================================================================
// VOTE STATUS (consumed from the vote plugin)
// =============================================================================

/// Outcome of the proposal vote. Unrecognised codes decode to `Invalid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum VoteStatus {
    /// Unknown or unclassifiable.
    Invalid,
    /// Vote has not been authorized by the author.
    Unauthorized,
    /// Author authorized the vote.
    Authorized,
    /// Vote is in progress.
    Started,
    /// Vote finished and met the approval criteria.
    Approved,
    /// Vote finished and did not meet the approval criteria.
    Rejected,
}

impl VoteStatus {
    /// All variants.
    pub const ALL: [VoteStatus; 6] = [
        VoteStatus::Invalid,
        VoteStatus::Unauthorized,
        VoteStatus::Authorized,
        VoteStatus::Started,
        VoteStatus::Approved,
        VoteStatus::Rejected,
    ];
}

impl From<u32> for VoteStatus {
    fn from(code: u32) -> Self {
        match code {
            1 => VoteStatus::Unauthorized,
            2 => VoteStatus::Authorized,
            3 => VoteStatus::Started,
            5 => VoteStatus::Approved,
            6 => VoteStatus::Rejected,
            _ => VoteStatus::Invalid,
        }
    }
}

impl From<VoteStatus> for u32 {
    fn from(status: VoteStatus) -> Self {
        match status {
            VoteStatus::Invalid => 0,
            VoteStatus::Unauthorized => 1,
            VoteStatus::Authorized => 2,
            VoteStatus::Started => 3,
            VoteStatus::Approved => 5,
            VoteStatus::Rejected => 6,
        }
    }
}

impl fmt::Display for VoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoteStatus::Invalid => "invalid",
            VoteStatus::Unauthorized => "unauthorized",
            VoteStatus::Authorized => "authorized",
            VoteStatus::Started => "started",
            VoteStatus::Approved => "approved",
            VoteStatus::Rejected => "rejected",
        })
    }
}

// =============================================================================
// BILLING STATUS
// =============================================================================

/// Billing sub-state of an approved proposal.
///
/// Unrecognised codes decode to `Invalid` so that an out-of-range request is
/// rejected as an invalid billing status rather than a malformed payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum BillingStatus {
    /// Not a billing status.
    Invalid,
    /// Proposal may continue to bill.
    Active,
    /// Proposal was closed before completion.
    Closed,
    /// Proposal delivered and finished billing.
    Completed,
}

impl BillingStatus {
    /// All variants.
    pub const ALL: [BillingStatus; 4] = [
        BillingStatus::Invalid,
        BillingStatus::Active,
        BillingStatus::Closed,
        BillingStatus::Completed,
    ];

    /// Numeric wire code.
    pub fn code(self) -> u32 {
        self.into()
    }
}

impl From<u32> for BillingStatus {
    fn from(code: u32) -> Self {
        match code {
            1 => BillingStatus::Active,
            2 => BillingStatus::Closed,
            3 => BillingStatus::Completed,
            _ => BillingStatus::Invalid,
        }
    }
}

impl From<BillingStatus> for u32 {
    fn from(status: BillingStatus) -> Self {
        match status {
            BillingStatus::Invalid => 0,
            BillingStatus::Active => 1,
            BillingStatus::Closed => 2,
            BillingStatus::Completed => 3,
        }
    }
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BillingStatus::Invalid => "invalid",
            BillingStatus::Active => "active",
            BillingStatus::Closed => "closed",
            BillingStatus::Completed => "completed",
        })
    }
}

// =============================================================================
// PROPOSAL STATUS
// =============================================================================

/// How long a derived proposal status stays valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTier {
    /// Never changes again.
    Terminal,
    /// Vote outcome is fixed, billing sub-state may still change.
    QuasiTerminal,
    /// May change on any future read.
    Transient,
}

/// Unified proposal status derived from record, vote and billing data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ProposalStatus {
    /// Submitted, not yet reviewed.
    Unvetted,
    /// Abandoned before being made public.
    UnvettedAbandoned,
    /// Censored before being made public.
    UnvettedCensored,
    /// Public, vote not yet authorized.
    UnderReview,
    /// Abandoned after being made public.
    Abandoned,
    /// Censored after being made public.
    Censored,
    /// Vote authorized, not started.
    VoteAuthorized,
    /// Vote in progress.
    VoteStarted,
    /// Vote approved (RFP base proposals only; others carry a billing status).
    Approved,
    /// Vote rejected.
    Rejected,
    /// Approved, billing active.
    Active,
    /// Approved, billing completed.
    Completed,
    /// Approved, billing closed.
    Closed,
}

impl ProposalStatus {
    /// All variants.
    pub const ALL: [ProposalStatus; 13] = [
        ProposalStatus::Unvetted,
        ProposalStatus::UnvettedAbandoned,
        ProposalStatus::UnvettedCensored,
        ProposalStatus::UnderReview,
        ProposalStatus::Abandoned,
        ProposalStatus::Censored,
        ProposalStatus::VoteAuthorized,
        ProposalStatus::VoteStarted,
        ProposalStatus::Approved,
        ProposalStatus::Rejected,
        ProposalStatus::Active,
        ProposalStatus::Completed,
        ProposalStatus::Closed,
    ];

    /// Cacheability tier of this status.
    pub fn tier(self) -> StatusTier {
        match self {
            ProposalStatus::UnvettedAbandoned
            | ProposalStatus::UnvettedCensored
            | ProposalStatus::Abandoned
            | ProposalStatus::Censored
            | ProposalStatus::Approved
            | ProposalStatus::Rejected => StatusTier::Terminal,
            ProposalStatus::Active | ProposalStatus::Completed | ProposalStatus::Closed => {
                StatusTier::QuasiTerminal
            }
            ProposalStatus::Unvetted
            | ProposalStatus::UnderReview
            | ProposalStatus::VoteAuthorized
            | ProposalStatus::VoteStarted => StatusTier::Transient,
        }
    }

    /// Whether this status can never change again.
    pub fn is_terminal(self) -> bool {
        self.tier() == StatusTier::Terminal
    }
}

impl TryFrom<u32> for ProposalStatus {
    type Error = UnknownCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        ProposalStatus::ALL
            .into_iter()
            .find(|s| u32::from(*s) == code)
            .ok_or(UnknownCode::new("proposal status", code))
    }
}

impl From<ProposalStatus> for u32 {
    fn from(status: ProposalStatus) -> Self {
        match status {
            ProposalStatus::Unvetted => 1,
            ProposalStatus::UnvettedAbandoned => 2,
            ProposalStatus::UnvettedCensored => 3,
            ProposalStatus::UnderReview => 4,
            ProposalStatus::Abandoned => 5,
            ProposalStatus::Censored => 6,
            ProposalStatus::VoteAuthorized => 7,
            ProposalStatus::VoteStarted => 8,
            ProposalStatus::Approved => 9,
            ProposalStatus::Rejected => 10,
            ProposalStatus::Active => 11,
            ProposalStatus::Completed => 12,
            ProposalStatus::Closed => 13,
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProposalStatus::Unvetted => "unvetted",
            ProposalStatus::UnvettedAbandoned => "unvetted-abandoned",
            ProposalStatus::UnvettedCensored => "unvetted-censored",
            ProposalStatus::UnderReview => "under-review",
            ProposalStatus::Abandoned => "abandoned",
            ProposalStatus::Censored => "censored",
            ProposalStatus::VoteAuthorized => "vote-authorized",
            ProposalStatus::VoteStarted => "vote-started",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Active => "active",
            ProposalStatus::Completed => "completed",
            ProposalStatus::Closed => "closed",
        })
    }
}
