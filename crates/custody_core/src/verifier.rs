// Content fingerprinting and integrity checks against a record's registered hash.
// Verification is read-only: it never touches the record or its custody ledger.

use std::io::Read;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::model::EvidenceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Verdict::Match => "MATCH",
            Verdict::Mismatch => "MISMATCH",
        })
    }
}

/// Details of a single integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub evidence_id: u64,
    pub expected: String,
    pub computed: String,
    pub bytes_read: u64,
    pub verdict: Verdict,
}

impl VerificationReport {
    pub fn is_match(&self) -> bool {
        self.verdict == Verdict::Match
    }
}

/// Lower-case hex SHA-256 of `content`.
pub fn fingerprint_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Lower-case hex SHA-256 of everything `reader` yields, plus the byte count.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> Result<(String, u64)> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((hex::encode(hasher.finalize()), total))
}

/// Compare the fingerprint of `content` with the one registered on `record`.
pub fn verify(record: &EvidenceRecord, content: &[u8]) -> Verdict {
    compare(&record.fingerprint, &fingerprint_bytes(content))
}

/// Streaming variant of [`verify`] that reports both fingerprints.
pub fn verify_reader<R: Read>(record: &EvidenceRecord, reader: R) -> Result<VerificationReport> {
    let (computed, bytes_read) = fingerprint_reader(reader)?;
    let verdict = compare(&record.fingerprint, &computed);
    tracing::debug!(evidence_id = record.id, bytes_read, %verdict, "integrity check");

    Ok(VerificationReport {
        evidence_id: record.id,
        expected: record.fingerprint.clone(),
        computed,
        bytes_read,
        verdict,
    })
}

fn compare(expected: &str, computed: &str) -> Verdict {
    if expected.as_bytes() == computed.as_bytes() {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}
