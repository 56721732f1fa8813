use chrono::{DateTime, Utc};

use crate::error::{CustodyError, Result};
use crate::ledger::{append_edit_event, LedgerAppend};
use crate::model::{EvidenceFields, EvidenceRecord, FingerprintPolicy};

/// Apply an audited edit to the descriptive fields of `record`.
///
/// This is the only sanctioned way to change `name`, `fingerprint`, `source` or
/// `investigator`. The edit event and the field overwrite are both applied to a
/// copy; on any error the caller still holds the untouched snapshot, so a
/// half-applied edit can never reach the store.
pub fn apply_edit(
    record: &EvidenceRecord,
    new_fields: EvidenceFields,
    audit_notes: &str,
    policy: FingerprintPolicy,
    now: DateTime<Utc>,
) -> Result<LedgerAppend> {
    if audit_notes.trim().is_empty() {
        return Err(CustodyError::validation("audit notes are required for edits"));
    }
    new_fields.validate(policy)?;

    let LedgerAppend { mut record, event } = append_edit_event(record, audit_notes, now)?;
    record.name = new_fields.name;
    record.fingerprint = new_fields.fingerprint;
    record.source = new_fields.source;
    record.investigator = new_fields.investigator;

    tracing::debug!(evidence_id = record.id, custodian = %event.to, "edit applied");
    Ok(LedgerAppend { record, event })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvidencePatch;

    fn record() -> EvidenceRecord {
        EvidenceRecord::intake(
            2,
            EvidenceFields::new("phone.bin", "cd".repeat(32), "handset", "Alice"),
            "Alice",
            FingerprintPolicy::Lenient,
            Utc::now(),
        )
        .expect("intake")
    }

    #[test]
    fn edit_updates_fields_and_appends_event() {
        let rec = record();
        let fields = rec.fields().merged_with(EvidencePatch {
            name: Some("phone-extraction.bin".into()),
            ..Default::default()
        });

        let out = apply_edit(
            &rec,
            fields,
            "corrected name",
            FingerprintPolicy::Lenient,
            Utc::now(),
        )
        .expect("edit");

        assert_eq!(out.record.name, "phone-extraction.bin");
        assert_eq!(out.record.custody_events.len(), 2);
        assert_eq!(out.event.notes, "Edit performed: corrected name");
        assert_eq!(out.record.created_at, rec.created_at);
    }

    #[test]
    fn missing_notes_leave_record_untouched() {
        let rec = record();
        let before = rec.clone();
        let mut fields = rec.fields();
        fields.name = "changed".into();

        let err =
            apply_edit(&rec, fields, "", FingerprintPolicy::Lenient, Utc::now()).unwrap_err();
        assert!(matches!(err, CustodyError::Validation(_)));
        assert_eq!(rec, before);
    }

    #[test]
    fn invalid_new_fields_reject_whole_edit() {
        let rec = record();
        let mut fields = rec.fields();
        fields.fingerprint = "not-a-digest".into();

        let err = apply_edit(&rec, fields, "typo", FingerprintPolicy::Sha256Hex, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CustodyError::Validation(_)));
        assert_eq!(rec.custody_events.len(), 1);
    }
}
