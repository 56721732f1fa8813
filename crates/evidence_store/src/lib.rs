//! Evidence store: owns the record collection and is the only component that
//! talks to persistence.
//!
//! Every mutation is a full read-modify-write of the collection performed inside
//! a single-writer critical section (an in-process mutex plus the backend's
//! exclusive guard), so concurrent updates of different records cannot clobber
//! each other.

pub mod backend;
pub mod config;
pub mod json_file;

pub use backend::{MemoryBackend, SnapshotBackend};
pub use config::StoreConfig;
pub use json_file::JsonFileBackend;

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use custody_core::{
    apply_edit, append_transfer, validate_chain, CustodyError, EvidenceFields, EvidenceId,
    EvidencePatch, EvidenceRecord, FingerprintPolicy, LedgerAppend, Result,
};

pub struct EvidenceStore<B: SnapshotBackend> {
    backend: B,
    policy: FingerprintPolicy,
    writer: Mutex<()>,
}

impl EvidenceStore<JsonFileBackend> {
    /// Open the JSON-file store described by `config`.
    pub fn open(config: &StoreConfig) -> Self {
        Self::new(JsonFileBackend::new(&config.data_file)).with_policy(config.fingerprint_policy)
    }
}

impl<B: SnapshotBackend> EvidenceStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: FingerprintPolicy::default(),
            writer: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: FingerprintPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> FingerprintPolicy {
        self.policy
    }

    /// Register a new evidence item. The id is one past the highest id in use.
    pub fn create(
        &self,
        fields: EvidenceFields,
        custodian: &str,
        now: DateTime<Utc>,
    ) -> Result<EvidenceRecord> {
        let record = self.write_cycle(|records| {
            let id = next_id(records)?;
            let record = EvidenceRecord::intake(id, fields, custodian, self.policy, now)?;
            records.push(record.clone());
            Ok(record)
        })?;

        tracing::info!(
            evidence_id = record.id,
            custodian = %record.custody_events[0].to,
            "evidence registered"
        );
        Ok(record)
    }

    pub fn get(&self, id: EvidenceId) -> Result<EvidenceRecord> {
        self.backend
            .load()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(CustodyError::NotFound(id))
    }

    /// All records in persisted (insertion) order.
    pub fn list(&self) -> Result<Vec<EvidenceRecord>> {
        self.backend.load()
    }

    /// Replace the stored record carrying `record.id`.
    ///
    /// The replacement must keep the stored intake time and extend the stored
    /// ledger; a record built from a stale snapshot is rejected rather than
    /// allowed to drop events appended since.
    pub fn update(&self, record: &EvidenceRecord) -> Result<()> {
        self.write_cycle(|records| {
            let slot = records
                .iter_mut()
                .find(|r| r.id == record.id)
                .ok_or(CustodyError::NotFound(record.id))?;
            check_replacement(slot, record)?;
            *slot = record.clone();
            Ok(())
        })?;

        tracing::info!(
            evidence_id = record.id,
            events = record.custody_events.len(),
            "evidence updated"
        );
        Ok(())
    }

    /// Transfer custody of `id` and persist the result in one writer cycle.
    pub fn transfer(
        &self,
        id: EvidenceId,
        to_custodian: &str,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<EvidenceRecord> {
        let LedgerAppend { record, event } =
            self.mutate(id, |current| append_transfer(current, to_custodian, notes, now))?;
        tracing::info!(evidence_id = id, from = %event.from, to = %event.to, "custody transferred");
        Ok(record)
    }

    /// Apply an audited edit to `id` and persist the result in one writer cycle.
    pub fn edit(
        &self,
        id: EvidenceId,
        new_fields: EvidenceFields,
        audit_notes: &str,
        now: DateTime<Utc>,
    ) -> Result<EvidenceRecord> {
        let policy = self.policy;
        let LedgerAppend { record, event } =
            self.mutate(id, |current| apply_edit(current, new_fields, audit_notes, policy, now))?;
        tracing::info!(evidence_id = id, custodian = %event.to, "evidence edited");
        Ok(record)
    }

    /// Like [`edit`](Self::edit), but fields absent from `patch` keep their stored values.
    /// The merge happens inside the writer cycle, against the latest stored record.
    pub fn edit_patch(
        &self,
        id: EvidenceId,
        patch: EvidencePatch,
        audit_notes: &str,
        now: DateTime<Utc>,
    ) -> Result<EvidenceRecord> {
        let policy = self.policy;
        let LedgerAppend { record, event } = self.mutate(id, |current| {
            let fields = current.fields().merged_with(patch);
            apply_edit(current, fields, audit_notes, policy, now)
        })?;
        tracing::info!(evidence_id = id, custodian = %event.to, "evidence edited");
        Ok(record)
    }

    fn mutate<F>(&self, id: EvidenceId, op: F) -> Result<LedgerAppend>
    where
        F: FnOnce(&EvidenceRecord) -> Result<LedgerAppend>,
    {
        self.write_cycle(|records| {
            let slot = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(CustodyError::NotFound(id))?;
            let appended = op(&*slot)?;
            check_replacement(&*slot, &appended.record)?;
            *slot = appended.record.clone();
            Ok(appended)
        })
    }

    fn write_cycle<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<EvidenceRecord>) -> Result<T>,
    {
        let _writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _guard = self.backend.acquire()?;

        let mut records = self.backend.load()?;
        let out = f(&mut records)?;
        if let Err(e) = self.backend.save(&records) {
            tracing::error!("failed to persist evidence collection: {}", e);
            return Err(e);
        }
        Ok(out)
    }
}

fn next_id(records: &[EvidenceRecord]) -> Result<EvidenceId> {
    let max = records.iter().map(|r| r.id).max().unwrap_or(0);
    max.checked_add(1).ok_or_else(|| {
        CustodyError::invalid_state(format!("evidence id space exhausted at {max}"))
    })
}

fn check_replacement(stored: &EvidenceRecord, replacement: &EvidenceRecord) -> Result<()> {
    validate_chain(replacement)?;

    if replacement.created_at != stored.created_at {
        return Err(CustodyError::invalid_state(format!(
            "evidence {}: intake time is immutable",
            stored.id
        )));
    }
    let kept = stored.custody_events.len();
    if replacement.custody_events.len() < kept
        || replacement.custody_events[..kept] != stored.custody_events[..]
    {
        return Err(CustodyError::invalid_state(format!(
            "evidence {}: update does not extend the stored custody ledger",
            stored.id
        )));
    }
    Ok(())
}
