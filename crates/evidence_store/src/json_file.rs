use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use custody_core::{EvidenceRecord, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::backend::SnapshotBackend;

/// On-disk forms accepted when loading.
///
/// Current files hold a bare array of records. Files written by the earlier
/// intake tool wrap that array as `{"next_id": n, "evidence": [...]}`.
#[derive(Debug)]
enum DataFile {
    Records(Vec<EvidenceRecord>),
    Legacy(LegacyEnvelope),
}

#[derive(Debug, Deserialize)]
struct LegacyEnvelope {
    #[allow(dead_code)]
    next_id: Option<u64>,
    evidence: Vec<EvidenceRecord>,
}

impl DataFile {
    /// Parse either layout. The array form is tried first and its error is the
    /// one reported unless the document is a JSON object.
    fn parse(raw: &str) -> serde_json::Result<Self> {
        match serde_json::from_str::<Vec<EvidenceRecord>>(raw) {
            Ok(records) => Ok(DataFile::Records(records)),
            Err(array_err) => {
                if !raw.trim_start().starts_with('{') {
                    return Err(array_err);
                }
                serde_json::from_str::<LegacyEnvelope>(raw).map(DataFile::Legacy)
            }
        }
    }
}

/// Snapshot backend over a single JSON file.
///
/// Saves go to a sibling temp file that is synced and renamed over the data file.
/// Writers serialize on an advisory lock taken on `<data file>.lock`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, "lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Exclusive lock on the data file; released when dropped.
pub struct FileLockGuard {
    file: File,
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("failed to release data file lock: {}", e);
        }
    }
}

impl SnapshotBackend for JsonFileBackend {
    type Guard = FileLockGuard;

    fn acquire(&self) -> Result<FileLockGuard> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?;
        file.lock_exclusive()?;
        Ok(FileLockGuard { file })
    }

    fn load(&self) -> Result<Vec<EvidenceRecord>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "data file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match DataFile::parse(&raw)? {
            DataFile::Records(records) => Ok(records),
            DataFile::Legacy(LegacyEnvelope { evidence, .. }) => {
                tracing::info!(
                    path = %self.path.display(),
                    records = evidence.len(),
                    "loaded legacy data file; next save rewrites it as a record array"
                );
                Ok(evidence)
            }
        }
    }

    fn save(&self, records: &[EvidenceRecord]) -> Result<()> {
        self.ensure_parent()?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut ser)?;
        buf.push(b'\n');

        let tmp_path = sibling(&self.path, "tmp");
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&buf)?;
        tmp.sync_all()?;
        drop(tmp);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o640));
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_core::{EvidenceFields, FingerprintPolicy};
    use chrono::Utc;

    #[test]
    fn sibling_appends_extension() {
        assert_eq!(
            sibling(Path::new("/tmp/data.json"), "lock"),
            PathBuf::from("/tmp/data.json.lock")
        );
        assert_eq!(sibling(Path::new("data.json"), "tmp"), PathBuf::from("data.json.tmp"));
    }

    #[test]
    fn data_file_accepts_both_layouts() {
        let record = EvidenceRecord::intake(
            4,
            EvidenceFields::new("a", "b", "c", "d"),
            "d",
            FingerprintPolicy::Lenient,
            Utc::now(),
        )
        .unwrap();
        let array = serde_json::to_string(&vec![record.clone()]).unwrap();
        let legacy = format!("{{\"next_id\": 5, \"evidence\": {array}}}");

        match DataFile::parse(&array).unwrap() {
            DataFile::Records(r) => assert_eq!(r, vec![record.clone()]),
            other => panic!("unexpected {other:?}"),
        }
        match DataFile::parse(&legacy).unwrap() {
            DataFile::Legacy(envelope) => assert_eq!(envelope.evidence, vec![record]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_record_error_names_the_cause() {
        let array = r#"[{"id": 1, "name": "n", "hash": "h", "source": "s",
            "investigator": "i", "timestamp": "not-a-time", "custody_events": []}]"#;
        let err = DataFile::parse(array).unwrap_err().to_string();
        assert!(err.contains("invalid timestamp: not-a-time"), "{err}");

        let legacy = format!("{{\"next_id\": 2, \"evidence\": {array}}}");
        let err = DataFile::parse(&legacy).unwrap_err().to_string();
        assert!(err.contains("invalid timestamp: not-a-time"), "{err}");
    }
}
