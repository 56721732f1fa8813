use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CustodyError, Result};

pub type EvidenceId = u64;

/// `from` of the first event of every ledger.
pub const INITIAL_INTAKE: &str = "Initial Intake";
/// Notes attached to the synthesized intake event.
pub const INTAKE_NOTES: &str = "Initial evidence submission";
/// Prefix carried by the notes of every audited edit event.
pub const EDIT_NOTES_PREFIX: &str = "Edit performed: ";

/// One entry of a record's custody ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEvent {
    pub from: String,
    pub to: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

/// Custody event classification, derived from the event itself and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Intake,
    Transfer,
    Edit,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            EventKind::Intake => "INTAKE",
            EventKind::Transfer => "TRANSFER",
            EventKind::Edit => "EDIT",
        })
    }
}

impl CustodyEvent {
    pub fn kind(&self) -> EventKind {
        if self.from == INITIAL_INTAKE {
            EventKind::Intake
        } else if self.from == self.to && self.notes.starts_with(EDIT_NOTES_PREFIX) {
            EventKind::Edit
        } else {
            EventKind::Transfer
        }
    }
}

/// An evidence item together with its custody ledger.
///
/// The serialized field names (`hash`, `timestamp`, `custody_events`) are the
/// on-disk layout of the evidence data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: EvidenceId,
    pub name: String,
    #[serde(rename = "hash")]
    pub fingerprint: String,
    pub source: String,
    pub investigator: String,
    #[serde(rename = "timestamp", with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    pub custody_events: Vec<CustodyEvent>,
}

impl EvidenceRecord {
    /// Build a freshly taken-in record with its single intake event.
    pub fn intake(
        id: EvidenceId,
        fields: EvidenceFields,
        custodian: &str,
        policy: FingerprintPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if id == 0 {
            return Err(CustodyError::validation("evidence id must be positive"));
        }
        fields.validate(policy)?;
        let custodian = custodian.trim();
        if custodian.is_empty() {
            return Err(CustodyError::validation("custodian name is required"));
        }
        let now = crate::timestamp::normalize(now);

        Ok(Self {
            id,
            name: fields.name,
            fingerprint: fields.fingerprint,
            source: fields.source,
            investigator: fields.investigator,
            created_at: now,
            custody_events: vec![CustodyEvent {
                from: INITIAL_INTAKE.to_string(),
                to: custodian.to_string(),
                timestamp: now,
                notes: INTAKE_NOTES.to_string(),
            }],
        })
    }

    pub fn fields(&self) -> EvidenceFields {
        EvidenceFields {
            name: self.name.clone(),
            fingerprint: self.fingerprint.clone(),
            source: self.source.clone(),
            investigator: self.investigator.clone(),
        }
    }

    pub fn last_event(&self) -> Option<&CustodyEvent> {
        self.custody_events.last()
    }
}

/// How strictly registered fingerprints are checked at intake and edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FingerprintPolicy {
    /// Any non-empty value.
    #[default]
    Lenient,
    /// Exactly 64 lower-case hex characters (a SHA-256 digest).
    Sha256Hex,
}

/// The mutable descriptive fields of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceFields {
    pub name: String,
    pub fingerprint: String,
    pub source: String,
    pub investigator: String,
}

impl EvidenceFields {
    pub fn new(
        name: impl Into<String>,
        fingerprint: impl Into<String>,
        source: impl Into<String>,
        investigator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            fingerprint: fingerprint.into(),
            source: source.into(),
            investigator: investigator.into(),
        }
    }

    pub fn validate(&self, policy: FingerprintPolicy) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CustodyError::validation("evidence name is required"));
        }
        if self.fingerprint.trim().is_empty() {
            return Err(CustodyError::validation("fingerprint is required"));
        }
        if policy == FingerprintPolicy::Sha256Hex && !is_sha256_hex(&self.fingerprint) {
            return Err(CustodyError::validation(format!(
                "fingerprint must be 64 lower-case hex characters, got {:?}",
                self.fingerprint
            )));
        }
        Ok(())
    }

    /// Overlay the fields present in `patch`, keeping the rest.
    pub fn merged_with(&self, patch: EvidencePatch) -> Self {
        Self {
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            fingerprint: patch.fingerprint.unwrap_or_else(|| self.fingerprint.clone()),
            source: patch.source.unwrap_or_else(|| self.source.clone()),
            investigator: patch.investigator.unwrap_or_else(|| self.investigator.clone()),
        }
    }
}

/// Partial field update as submitted by a front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidencePatch {
    pub name: Option<String>,
    pub fingerprint: Option<String>,
    pub source: Option<String>,
    pub investigator: Option<String>,
}

impl EvidencePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.fingerprint.is_none()
            && self.source.is_none()
            && self.investigator.is_none()
    }
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> EvidenceFields {
        EvidenceFields::new("disk.img", "ab".repeat(32), "laptop-07", "Alice")
    }

    #[test]
    fn intake_synthesizes_single_initial_event() {
        let now = crate::timestamp::normalize(Utc::now());
        let record =
            EvidenceRecord::intake(1, fields(), "Alice", FingerprintPolicy::Lenient, now)
                .expect("intake");

        assert_eq!(record.custody_events.len(), 1);
        let event = &record.custody_events[0];
        assert_eq!(event.from, INITIAL_INTAKE);
        assert_eq!(event.to, "Alice");
        assert_eq!(event.notes, INTAKE_NOTES);
        assert_eq!(event.timestamp, now);
        assert_eq!(event.kind(), EventKind::Intake);
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn intake_keeps_stored_precision() {
        let now = Utc::now();
        let record = EvidenceRecord::intake(1, fields(), "Alice", FingerprintPolicy::Lenient, now)
            .expect("intake");
        assert_eq!(record.created_at, crate::timestamp::normalize(now));

        let text = serde_json::to_string(&record).expect("serialize");
        let back: EvidenceRecord = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, record);
    }

    #[test]
    fn event_kind_honours_width() {
        assert_eq!(format!("[{:<8}]", EventKind::Edit), "[EDIT    ]");
        assert_eq!(format!("[{:>8}]", EventKind::Intake), "[  INTAKE]");
        assert_eq!(format!("{}", EventKind::Transfer), "TRANSFER");
    }

    #[test]
    fn intake_rejects_blank_custodian_and_name() {
        let now = Utc::now();
        assert!(matches!(
            EvidenceRecord::intake(1, fields(), "  ", FingerprintPolicy::Lenient, now),
            Err(CustodyError::Validation(_))
        ));

        let mut unnamed = fields();
        unnamed.name = String::new();
        assert!(matches!(
            EvidenceRecord::intake(1, unnamed, "Alice", FingerprintPolicy::Lenient, now),
            Err(CustodyError::Validation(_))
        ));
    }

    #[test]
    fn strict_policy_requires_sha256_hex() {
        let mut f = fields();
        f.fingerprint = "ABC123".to_string();
        assert!(f.validate(FingerprintPolicy::Lenient).is_ok());
        assert!(f.validate(FingerprintPolicy::Sha256Hex).is_err());

        f.fingerprint = "AB".repeat(32);
        assert!(f.validate(FingerprintPolicy::Sha256Hex).is_err());

        f.fingerprint = "0f".repeat(32);
        assert!(f.validate(FingerprintPolicy::Sha256Hex).is_ok());
    }

    #[test]
    fn serializes_to_data_file_layout() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let record =
            EvidenceRecord::intake(3, fields(), "Alice", FingerprintPolicy::Lenient, now)
                .expect("intake");

        let value = serde_json::to_value(&record).expect("to_value");
        assert_eq!(value["id"], 3);
        assert_eq!(value["hash"], "ab".repeat(32));
        assert_eq!(value["timestamp"], "2024-05-01T10:00:00.000000Z");
        assert_eq!(value["custody_events"][0]["from"], "Initial Intake");
        assert!(value.get("fingerprint").is_none());
    }

    #[test]
    fn event_kind_classification() {
        let now = Utc::now();
        let edit = CustodyEvent {
            from: "Bob".into(),
            to: "Bob".into(),
            timestamp: now,
            notes: format!("{EDIT_NOTES_PREFIX}typo"),
        };
        assert_eq!(edit.kind(), EventKind::Edit);

        // A self-transfer without the edit prefix is still a transfer.
        let recheck = CustodyEvent {
            notes: "re-sealed bag".into(),
            ..edit
        };
        assert_eq!(recheck.kind(), EventKind::Transfer);
    }

    #[test]
    fn patch_overlays_only_present_fields() {
        let base = fields();
        let patch = EvidencePatch {
            name: Some("disk-final.img".into()),
            ..Default::default()
        };
        let merged = base.merged_with(patch);
        assert_eq!(merged.name, "disk-final.img");
        assert_eq!(merged.fingerprint, base.fingerprint);
        assert_eq!(merged.investigator, "Alice");
    }
}
