//! # Pi Service
//!
//! Command dispatcher: validates commands, talks to the host backend and
//! keeps the summary cache.
//!
//! ## Set Billing Status
//!
//! Checks run in a fixed order and the first failure wins. Nothing is
//! written unless every check passes.
//!
//! | Step | Check | Error |
//! |------|-------|-------|
//! | 1 | Payload token decodes and matches the command token | `TokenInvalid` |
//! | 2 | Status is Active, Closed or Completed | `BillingStatusInvalid` |
//! | 3 | Client signature verifies | `PublicKeyInvalid` / `SignatureInvalid` |
//! | 4 | Closing carries a reason | `BillingStatusChangeNotAllowed` |
//! | 5 | Vote was approved | `BillingStatusChangeNotAllowed` |
//! | 6 | Proposal is not an RFP | `BillingStatusChangeNotAllowed` |
//! | 7 | Change count stays within the limit | `BillingStatusChangeNotAllowed` |
//! | 8 | Transition is legal | `BillingStatusChangeNotAllowed` |
//!
//! ## Summary
//!
//! Cached terminal statuses are served without backend I/O. A cached
//! approved vote re-reads only the billing history. Everything else takes
//! the full derivation and is cached according to its tier.

use crate::adapters::SystemTimeSource;
use crate::codec::BillingStatusCodec;
use crate::config::PiConfig;
use crate::domain::{
    approved_status, current_billing_status, is_legal, is_rfp, is_settable, proposal_status,
    BackendError, BillingStatus, BillingStatusChange, BillingStatusChangesReply, ErrorCode,
    PiError, PiResult, ProposalStatus, ProposalSummary, Record, RecordRequest, RecordState,
    RecordStatus, ResultCache, SetBillingStatus, SetBillingStatusReply, StatusTier, SummaryReply,
    Token, VoteStatus, VoteSummary,
};
use crate::ports::inbound::{
    PiPluginApi, CMD_BILLING_STATUS_CHANGES, CMD_SET_BILLING_STATUS, CMD_SUMMARY,
};
use crate::ports::outbound::{Identity, PluginBackend, TimeSource};
use async_trait::async_trait;
use pi_telemetry::log_event;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pi plugin service.
///
/// The summary cache is injected so that several services (or tests) can
/// share or isolate it explicitly.
pub struct PiService<B, I>
where
    B: PluginBackend,
    I: Identity,
{
    config: PiConfig,
    codec: BillingStatusCodec,
    backend: Arc<B>,
    identity: Arc<I>,
    cache: Arc<ResultCache>,
    clock: Arc<dyn TimeSource>,
}

impl<B, I> PiService<B, I>
where
    B: PluginBackend,
    I: Identity,
{
    /// Create a service with an injected cache.
    pub fn new(
        config: PiConfig,
        backend: Arc<B>,
        identity: Arc<I>,
        cache: Arc<ResultCache>,
    ) -> PiResult<Self> {
        config.validate()?;
        Ok(Self {
            codec: config.codec(),
            config,
            backend,
            identity,
            cache,
            clock: Arc::new(SystemTimeSource),
        })
    }

    /// Create a service with a private cache sized from the config.
    pub fn with_config(config: PiConfig, backend: Arc<B>, identity: Arc<I>) -> PiResult<Self> {
        let cache = Arc::new(ResultCache::new(config.summary_cache_limit));
        Self::new(config, backend, identity, cache)
    }

    /// Replace the clock.
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Service configuration.
    pub fn config(&self) -> &PiConfig {
        &self.config
    }

    /// Summary cache.
    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    // =========================================================================
    // SET BILLING STATUS
    // =========================================================================

    async fn do_set_billing_status(
        &self,
        token: &Token,
        sbs: SetBillingStatus,
    ) -> PiResult<SetBillingStatusReply> {
        self.check_token(token, &sbs.token)?;

        if !is_settable(sbs.status) {
            return Err(self.reject(
                token,
                ErrorCode::BillingStatusInvalid,
                format!("invalid billing status code {}", sbs.status.code()),
            ));
        }

        let msg = sbs.signing_message();
        self.identity
            .verify_signature(&sbs.signature, &sbs.public_key, msg.as_bytes())
            .map_err(|e| self.reject(token, e.code(), e.context()))?;

        if sbs.status == BillingStatus::Closed && sbs.reason.is_empty() {
            return Err(self.reject(
                token,
                ErrorCode::BillingStatusChangeNotAllowed,
                "must provide a reason when setting billing status to closed",
            ));
        }

        let vs = self.vote_summary(token).await?;
        if vs.status != VoteStatus::Approved {
            return Err(self.reject(
                token,
                ErrorCode::BillingStatusChangeNotAllowed,
                "setting billing status is allowed only if proposal vote was approved",
            ));
        }

        let record = self.record(RecordRequest::with_vote_metadata(*token)).await?;
        let vm = record.vote_metadata()?;
        if is_rfp(vm.as_ref()) {
            return Err(self.reject(
                token,
                ErrorCode::BillingStatusChangeNotAllowed,
                "rfp proposals do not have a billing status",
            ));
        }

        let history = self.billing_history(token).await?;
        let max = self.config.billing_status_changes_max as usize;
        if history.len() + 1 > max {
            return Err(self.reject(
                token,
                ErrorCode::BillingStatusChangeNotAllowed,
                format!(
                    "number of billing status changes ({}) exceeds the maximum allowed ({})",
                    history.len() + 1,
                    max
                ),
            ));
        }

        let current = current_billing_status(&history);
        if !is_legal(current, sbs.status) {
            return Err(self.reject(
                token,
                ErrorCode::BillingStatusChangeNotAllowed,
                format!(
                    "invalid billing status transition, {} to {} is not allowed",
                    current, sbs.status
                ),
            ));
        }

        let receipt = hex::encode(self.identity.sign_message(sbs.signature.as_bytes()));
        let timestamp = self.clock.now();
        let change = BillingStatusChange {
            token: sbs.token,
            status: sbs.status,
            reason: sbs.reason,
            public_key: sbs.public_key,
            signature: sbs.signature,
            timestamp,
            receipt: receipt.clone(),
        };
        let blob = self.codec.encode(&change)?;
        self.backend
            .blob_save(token, blob)
            .await
            .map_err(|e| backend_error(token, e))?;

        log_event!(
            info,
            self.config.plugin_id.as_str(),
            "Billing status changed",
            %token,
            from = %current,
            to = %change.status,
            timestamp
        );

        Ok(SetBillingStatusReply { timestamp, receipt })
    }

    fn check_token(&self, token: &Token, payload_token: &str) -> PiResult<()> {
        let pt = Token::from_hex(payload_token)
            .map_err(|_| self.reject(token, ErrorCode::TokenInvalid, Token::format_hint()))?;
        if pt != *token {
            return Err(self.reject(
                token,
                ErrorCode::TokenInvalid,
                format!(
                    "payload token does not match command token: got {}, want {}",
                    pt, token
                ),
            ));
        }
        Ok(())
    }

    fn reject(&self, token: &Token, code: ErrorCode, context: impl Into<String>) -> PiError {
        let context = context.into();
        warn!(%token, code = code.code(), %context, "Rejected pi command");
        PiError::plugin(&self.config.plugin_id, code, context)
    }

    // =========================================================================
    // SUMMARY
    // =========================================================================

    async fn proposal_status(&self, token: &Token) -> PiResult<ProposalStatus> {
        if let Some(entry) = self.cache.get(token) {
            if let Some(status) = entry.proposal_status {
                debug!(%token, %status, "Summary cache hit: proposal status");
                return Ok(status);
            }
            if entry.vote_status == Some(VoteStatus::Approved) {
                debug!(%token, "Summary cache hit: vote approved");
                // RFP base proposals are cached as terminal, so no vote
                // metadata is needed here.
                let history = self.billing_history(token).await?;
                return approved_status(None, &history);
            }
        }
        debug!(%token, "Summary cache miss");

        let record = self.record(RecordRequest::with_vote_metadata(*token)).await?;
        let state = record.metadata.state;
        let status = record.metadata.status;
        let vm = record.vote_metadata()?;

        let mut vote_status = VoteStatus::Invalid;
        let mut history = Vec::new();
        if state == RecordState::Vetted && status == RecordStatus::Public {
            vote_status = self.vote_summary(token).await?.status;
            if vote_status == VoteStatus::Approved {
                history = self.billing_history(token).await?;
            }
        }

        let derived = proposal_status(state, status, vote_status, vm.as_ref(), &history)?;

        match derived.tier() {
            StatusTier::Terminal => {
                self.cache.set_proposal_status(*token, derived);
                debug!(%token, status = %derived, "Cached terminal proposal status");
            }
            StatusTier::QuasiTerminal => {
                self.cache.set_vote_status(*token, VoteStatus::Approved);
                debug!(%token, status = %derived, "Cached approved vote status");
            }
            StatusTier::Transient => {}
        }

        Ok(derived)
    }

    // =========================================================================
    // BACKEND HELPERS
    // =========================================================================

    /// Fetch a single record. A missing record is [`PiError::RecordNotFound`].
    pub async fn record(&self, request: RecordRequest) -> PiResult<Record> {
        let token = request.token;
        let mut reply = self
            .backend
            .records(vec![request])
            .await
            .map_err(|e| backend_error(&token, e))?;
        reply
            .remove(&token.to_hex())
            .ok_or(PiError::RecordNotFound { token })
    }

    /// Fetch a record with all files omitted.
    pub async fn record_abridged(&self, token: &Token) -> PiResult<Record> {
        self.record(RecordRequest::abridged(*token)).await
    }

    async fn vote_summary(&self, token: &Token) -> PiResult<VoteSummary> {
        self.backend
            .vote_summary(token)
            .await
            .map_err(|e| backend_error(token, e))
    }

    async fn billing_history(&self, token: &Token) -> PiResult<Vec<BillingStatusChange>> {
        let blobs = self
            .backend
            .blobs_by_data_desc(token, &[self.codec.descriptor().to_string()])
            .await
            .map_err(|e| backend_error(token, e))?;

        let mut changes = Vec::with_capacity(blobs.len());
        for blob in &blobs {
            let change = self.codec.decode(blob).map_err(|e| {
                log_event!(
                    error,
                    self.config.plugin_id.as_str(),
                    "Billing status blob failed verification",
                    %token,
                    error = %e
                );
                e
            })?;
            changes.push(change);
        }

        // Storage order is expected but not trusted. Stable, so equal
        // timestamps keep their stored order.
        changes.sort_by_key(|c| c.timestamp);
        Ok(changes)
    }
}

fn backend_error(token: &Token, err: BackendError) -> PiError {
    match err {
        BackendError::NotFound => PiError::RecordNotFound { token: *token },
        BackendError::Unavailable(msg) => PiError::Backend(msg),
    }
}

#[async_trait]
impl<B, I> PiPluginApi for PiService<B, I>
where
    B: PluginBackend,
    I: Identity,
{
    async fn set_billing_status(
        &self,
        token: &Token,
        request: SetBillingStatus,
    ) -> PiResult<SetBillingStatusReply> {
        self.do_set_billing_status(token, request).await
    }

    async fn billing_status_changes(&self, token: &Token) -> PiResult<BillingStatusChangesReply> {
        Ok(BillingStatusChangesReply {
            billing_status_changes: self.billing_history(token).await?,
        })
    }

    async fn summary(&self, token: &Token) -> PiResult<SummaryReply> {
        let status = self.proposal_status(token).await?;
        Ok(SummaryReply {
            summary: ProposalSummary { status },
        })
    }

    async fn cmd(&self, token: &Token, cmd_id: &str, payload: &str) -> PiResult<String> {
        debug!(%token, cmd = cmd_id, "Executing pi command");
        match cmd_id {
            CMD_SET_BILLING_STATUS => {
                let sbs: SetBillingStatus = serde_json::from_str(payload).map_err(|e| {
                    warn!(%token, error = %e, "Malformed setbillingstatus payload");
                    PiError::MalformedPayload(e.to_string())
                })?;
                let reply = self.set_billing_status(token, sbs).await?;
                Ok(serde_json::to_string(&reply)?)
            }
            CMD_BILLING_STATUS_CHANGES => {
                let reply = self.billing_status_changes(token).await?;
                Ok(serde_json::to_string(&reply)?)
            }
            CMD_SUMMARY => {
                let reply = self.summary(token).await?;
                Ok(serde_json::to_string(&reply)?)
            }
            other => Err(PiError::InvalidCommand(other.to_string())),
        }
    }
}
