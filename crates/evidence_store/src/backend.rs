use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use custody_core::{CustodyError, EvidenceRecord, Result};

/// Whole-collection snapshot persistence.
///
/// The store re-reads and rewrites the entire collection on every mutation and
/// holds the guard returned by `acquire` for the whole cycle.
pub trait SnapshotBackend: Send + Sync {
    type Guard;

    /// Exclusive write access held across one load/save cycle.
    fn acquire(&self) -> Result<Self::Guard>;

    fn load(&self) -> Result<Vec<EvidenceRecord>>;

    fn save(&self, records: &[EvidenceRecord]) -> Result<()>;
}

/// In-memory backend, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<EvidenceRecord>>,
    fail_next_save: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<EvidenceRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_next_save: AtomicBool::new(false),
        }
    }

    /// Make the next `save` fail with a persistence error.
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<EvidenceRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SnapshotBackend for MemoryBackend {
    type Guard = ();

    fn acquire(&self) -> Result<()> {
        Ok(())
    }

    fn load(&self) -> Result<Vec<EvidenceRecord>> {
        Ok(self.snapshot())
    }

    fn save(&self, records: &[EvidenceRecord]) -> Result<()> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(CustodyError::Persistence("injected save failure".to_string()));
        }
        *self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = records.to_vec();
        Ok(())
    }
}
