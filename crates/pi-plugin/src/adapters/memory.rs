//! # In-Memory Backend
//!
//! `PluginBackend` implementation for tests and local tooling. Blobs are
//! kept per token in insertion order. Call counters let tests observe how
//! much backend work a command performed.

use crate::codec::BlobEntry;
use crate::domain::{
    BackendError, Record, RecordFile, RecordMetadata, RecordRequest, RecordState, RecordStatus,
    Token, VoteMetadata, VoteStatus, VoteSummary,
};
use crate::ports::PluginBackend;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Backend call counters.
#[derive(Debug, Default)]
pub struct BackendCalls {
    records: AtomicU64,
    vote_summary: AtomicU64,
    blob_save: AtomicU64,
    blobs_by_data_desc: AtomicU64,
}

impl BackendCalls {
    /// `records` calls.
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    /// `vote_summary` calls.
    pub fn vote_summary(&self) -> u64 {
        self.vote_summary.load(Ordering::Relaxed)
    }

    /// `blob_save` calls.
    pub fn blob_save(&self) -> u64 {
        self.blob_save.load(Ordering::Relaxed)
    }

    /// `blobs_by_data_desc` calls.
    pub fn blobs_by_data_desc(&self) -> u64 {
        self.blobs_by_data_desc.load(Ordering::Relaxed)
    }

    /// Sum of all calls.
    pub fn total(&self) -> u64 {
        self.records() + self.vote_summary() + self.blob_save() + self.blobs_by_data_desc()
    }
}

/// In-memory record, vote and blob store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    records: RwLock<HashMap<Token, Record>>,
    votes: RwLock<HashMap<Token, VoteStatus>>,
    blobs: RwLock<HashMap<Token, Vec<BlobEntry>>>,
    unavailable: AtomicBool,
    calls: BackendCalls,
}

impl InMemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record with no files.
    pub fn put_record(&self, token: Token, state: RecordState, status: RecordStatus) {
        let mut records = self.records.write();
        let files = records
            .remove(&token)
            .map(|r| r.files)
            .unwrap_or_default();
        records.insert(
            token,
            Record {
                metadata: RecordMetadata {
                    token,
                    state,
                    status,
                },
                files,
            },
        );
    }

    /// Change the state and status of an existing record.
    ///
    /// Returns `false` if the record does not exist.
    pub fn set_record_status(&self, token: &Token, state: RecordState, status: RecordStatus) -> bool {
        match self.records.write().get_mut(token) {
            Some(record) => {
                record.metadata.state = state;
                record.metadata.status = status;
                true
            }
            None => false,
        }
    }

    /// Attach or replace a file on an existing record.
    pub fn put_file(&self, token: &Token, file: RecordFile) -> bool {
        match self.records.write().get_mut(token) {
            Some(record) => {
                record.files.retain(|f| f.name != file.name);
                record.files.push(file);
                true
            }
            None => false,
        }
    }

    /// Attach vote metadata to an existing record.
    pub fn put_vote_metadata(&self, token: &Token, vm: &VoteMetadata) -> bool {
        match RecordFile::vote_metadata(vm) {
            Ok(file) => self.put_file(token, file),
            Err(_) => false,
        }
    }

    /// Set the vote status reported for a token.
    pub fn set_vote_status(&self, token: Token, status: VoteStatus) {
        self.votes.write().insert(token, status);
    }

    /// Stored blobs of a token, in insertion order.
    pub fn blobs(&self, token: &Token) -> Vec<BlobEntry> {
        self.blobs.read().get(token).cloned().unwrap_or_default()
    }

    /// Mutate the stored blobs of a token in place.
    pub fn with_blobs_mut<R>(&self, token: &Token, f: impl FnOnce(&mut Vec<BlobEntry>) -> R) -> R {
        f(self.blobs.write().entry(*token).or_default())
    }

    /// Make every call fail with [`BackendError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Call counters.
    pub fn calls(&self) -> &BackendCalls {
        &self.calls
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("backend offline".into()));
        }
        Ok(())
    }
}

fn filter_files(files: &[RecordFile], req: &RecordRequest) -> Vec<RecordFile> {
    if req.omit_all_files {
        return Vec::new();
    }
    if req.filenames.is_empty() {
        return files.to_vec();
    }
    files
        .iter()
        .filter(|f| req.filenames.contains(&f.name))
        .cloned()
        .collect()
}

#[async_trait]
impl PluginBackend for InMemoryBackend {
    async fn records(
        &self,
        requests: Vec<RecordRequest>,
    ) -> Result<HashMap<String, Record>, BackendError> {
        self.calls.records.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;

        let records = self.records.read();
        let found = requests
            .iter()
            .filter_map(|req| {
                records.get(&req.token).map(|r| {
                    let record = Record {
                        metadata: r.metadata.clone(),
                        files: filter_files(&r.files, req),
                    };
                    (req.token.to_hex(), record)
                })
            })
            .collect();
        Ok(found)
    }

    async fn vote_summary(&self, token: &Token) -> Result<VoteSummary, BackendError> {
        self.calls.vote_summary.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;

        if !self.records.read().contains_key(token) {
            return Err(BackendError::NotFound);
        }
        let status = self
            .votes
            .read()
            .get(token)
            .copied()
            .unwrap_or(VoteStatus::Unauthorized);
        Ok(VoteSummary { status })
    }

    async fn blob_save(&self, token: &Token, blob: BlobEntry) -> Result<(), BackendError> {
        self.calls.blob_save.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;

        if !self.records.read().contains_key(token) {
            return Err(BackendError::NotFound);
        }
        self.blobs.write().entry(*token).or_default().push(blob);
        Ok(())
    }

    async fn blobs_by_data_desc(
        &self,
        token: &Token,
        descriptors: &[String],
    ) -> Result<Vec<BlobEntry>, BackendError> {
        self.calls.blobs_by_data_desc.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;

        let blobs = self.blobs.read();
        let Some(entries) = blobs.get(token) else {
            return Ok(Vec::new());
        };
        // Blobs with an unreadable hint are returned so the caller's decode
        // surfaces the corruption instead of silently dropping the entry.
        let matching = entries
            .iter()
            .filter(|b| match b.descriptor() {
                Ok(dd) => descriptors.contains(&dd.descriptor),
                Err(_) => true,
            })
            .cloned()
            .collect();
        Ok(matching)
    }
}
