use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn custody(data: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_custody"))
        .arg("--data")
        .arg(data)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("CUSTODY_DATA_FILE")
        .env_remove("CUSTODY_STRICT_FINGERPRINTS")
        .output()
        .expect("run custody binary")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn intake_transfer_edit_verify_roundtrip() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("data.json");
    let evidence = dir.path().join("disk.img");
    let content = b"seized disk contents\n";
    fs::write(&evidence, content).expect("write evidence");
    let hash = custody_core::fingerprint_bytes(content);

    let out = custody(
        &data,
        &[
            "intake", "--name", "disk.img", "--hash", &hash, "--source", "laptop-07",
            "--investigator", "Alice",
        ],
    );
    assert!(out.status.success(), "{out:?}");
    assert!(stdout(&out).contains("Evidence #1 registered, held by Alice"));

    let out = custody(&data, &["transfer", "1", "--to", "Bob", "--notes", "handoff"]);
    assert!(out.status.success(), "{out:?}");
    assert!(stdout(&out).contains("Alice -> Bob"));

    let out = custody(&data, &["edit", "1", "--name", "disk-sda.img", "--notes", "corrected name"]);
    assert!(out.status.success(), "{out:?}");

    let out = custody(&data, &["show", "1"]);
    let report = stdout(&out);
    assert!(out.status.success(), "{out:?}");
    assert!(report.contains("name:         disk-sda.img"));
    assert!(report.contains("EDIT     Bob -> Bob"));
    assert!(report.contains("Edit performed: corrected name"));

    let out = custody(&data, &["verify", "1", evidence.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    assert!(stdout(&out).contains("Integrity verified"));

    fs::write(&evidence, b"seized disk contents!").expect("tamper");
    let out = custody(&data, &["verify", "1", evidence.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2), "{out:?}");
    assert!(stdout(&out).contains("Integrity compromised"));

    // Verification never adds custody events.
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&data).unwrap()).unwrap();
    assert_eq!(raw[0]["custody_events"].as_array().unwrap().len(), 3);

    let out = custody(&data, &["audit"]);
    assert!(out.status.success(), "{out:?}");
}

#[test]
fn unknown_id_and_empty_notes_fail_cleanly() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("data.json");

    let out = custody(&data, &["show", "999"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("evidence not found: 999"));

    let out = custody(
        &data,
        &["intake", "--name", "a", "--hash", "b", "--source", "c", "--investigator", "Dana"],
    );
    assert!(out.status.success(), "{out:?}");

    let out = custody(&data, &["edit", "1", "--name", "x", "--notes", "  "]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("audit notes are required"));
}

#[test]
fn strict_flag_rejects_non_sha256_hash() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("data.json");

    let out = custody(
        &data,
        &[
            "--strict", "intake", "--name", "a", "--hash", "ABC", "--source", "c",
            "--investigator", "Dana",
        ],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("64 lower-case hex"));
    assert!(stdout(&custody(&data, &["list"])).contains("No evidence registered"));
}

#[test]
fn audit_flags_broken_chain() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("data.json");
    fs::write(
        &data,
        r#"[{"id": 1, "name": "n", "hash": "h", "source": "s", "investigator": "i",
             "timestamp": "2024-01-01T00:00:00Z",
             "custody_events": [
               {"from": "Initial Intake", "to": "Ann", "timestamp": "2024-01-01T00:00:00Z", "notes": ""},
               {"from": "Mallory", "to": "Ben", "timestamp": "2024-01-02T00:00:00Z", "notes": ""}
             ]}]"#,
    )
    .expect("write data");

    let out = custody(&data, &["audit"]);
    assert_eq!(out.status.code(), Some(2), "{out:?}");
    assert!(stdout(&out).contains("VIOLATION"));
}
