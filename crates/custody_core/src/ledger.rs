//! Append-only custody ledger.
//!
//! Every append takes a record snapshot and returns a new record plus the event
//! it appended; the input is never modified. The `from` of an appended event is
//! always the `to` of the event before it, edit events included.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::{CustodyError, Result};
use crate::model::{CustodyEvent, EvidenceRecord, EDIT_NOTES_PREFIX, INITIAL_INTAKE};

/// Outcome of a ledger append: the updated record and the event added to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAppend {
    pub record: EvidenceRecord,
    pub event: CustodyEvent,
}

/// Custodian named by the last event of the ledger.
pub fn current_custodian(record: &EvidenceRecord) -> Result<&str> {
    record
        .last_event()
        .map(|e| e.to.as_str())
        .ok_or_else(|| {
            tracing::error!(evidence_id = record.id, "custody ledger is empty");
            CustodyError::invalid_state(format!(
                "evidence {} has an empty custody ledger",
                record.id
            ))
        })
}

/// Hand the item from the current custodian to `to_custodian`.
pub fn append_transfer(
    record: &EvidenceRecord,
    to_custodian: &str,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<LedgerAppend> {
    let to = to_custodian.trim();
    if to.is_empty() {
        return Err(CustodyError::validation("transfer target custodian is required"));
    }
    let from = current_custodian(record)?.to_string();

    append(
        record,
        CustodyEvent {
            from,
            to: to.to_string(),
            timestamp: now,
            notes: notes.unwrap_or_default().to_string(),
        },
    )
}

/// Record an audited edit as a self-transfer of the current custodian.
pub fn append_edit_event(
    record: &EvidenceRecord,
    audit_notes: &str,
    now: DateTime<Utc>,
) -> Result<LedgerAppend> {
    if audit_notes.trim().is_empty() {
        return Err(CustodyError::validation("audit notes are required for edits"));
    }
    let custodian = current_custodian(record)?.to_string();

    append(
        record,
        CustodyEvent {
            from: custodian.clone(),
            to: custodian,
            timestamp: now,
            notes: format!("{EDIT_NOTES_PREFIX}{audit_notes}"),
        },
    )
}

fn append(record: &EvidenceRecord, mut event: CustodyEvent) -> Result<LedgerAppend> {
    event.timestamp = crate::timestamp::normalize(event.timestamp);
    if let Some(last) = record.last_event() {
        if event.timestamp < last.timestamp {
            return Err(CustodyError::validation(format!(
                "event time {} precedes the last custody event at {}",
                crate::timestamp::format(&event.timestamp),
                crate::timestamp::format(&last.timestamp)
            )));
        }
    }

    let mut updated = record.clone();
    updated.custody_events.push(event.clone());
    Ok(LedgerAppend {
        record: updated,
        event,
    })
}

/// Check every ledger invariant of a record.
pub fn validate_chain(record: &EvidenceRecord) -> Result<()> {
    let events = &record.custody_events;
    let first = events.first().ok_or_else(|| {
        CustodyError::invalid_state(format!("evidence {} has an empty custody ledger", record.id))
    })?;
    if first.from != INITIAL_INTAKE {
        return Err(CustodyError::invalid_state(format!(
            "evidence {}: event 0 starts from {:?}, expected {:?}",
            record.id, first.from, INITIAL_INTAKE
        )));
    }

    for (i, pair) in events.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.from != prev.to {
            return Err(CustodyError::invalid_state(format!(
                "evidence {}: event {} breaks custody continuity ({:?} -> {:?}, previous holder {:?})",
                record.id,
                i + 1,
                next.from,
                next.to,
                prev.to
            )));
        }
        if next.timestamp < prev.timestamp {
            return Err(CustodyError::invalid_state(format!(
                "evidence {}: event {} is older than event {}",
                record.id,
                i + 1,
                i
            )));
        }
    }
    Ok(())
}

/// Running SHA-256 digest over the ledger: `h_i = sha256(h_{i-1} || event_i)`.
pub fn chain_head(record: &EvidenceRecord) -> Result<String> {
    let mut head: Option<[u8; 32]> = None;
    for event in &record.custody_events {
        let line = serde_json::to_vec(event)?;
        let mut hasher = Sha256::new();
        if let Some(prev) = head {
            hasher.update(prev);
        }
        hasher.update(&line);
        head = Some(hasher.finalize().into());
    }
    head.map(hex::encode).ok_or_else(|| {
        CustodyError::invalid_state(format!("evidence {} has an empty custody ledger", record.id))
    })
}
