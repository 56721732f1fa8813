// Chain-of-custody core for digital evidence.
// Records, the append-only custody ledger, fingerprint verification and audited edits.

pub mod auditor;
pub mod error;
pub mod ledger;
pub mod model;
pub mod timestamp;
pub mod verifier;

pub use auditor::apply_edit;
pub use error::{CustodyError, Result};
pub use ledger::{
    append_edit_event, append_transfer, chain_head, current_custodian, validate_chain,
    LedgerAppend,
};
pub use model::{
    CustodyEvent, EventKind, EvidenceFields, EvidenceId, EvidencePatch, EvidenceRecord,
    FingerprintPolicy, EDIT_NOTES_PREFIX, INITIAL_INTAKE, INTAKE_NOTES,
};
pub use verifier::{
    fingerprint_bytes, fingerprint_reader, verify, verify_reader, Verdict, VerificationReport,
};
