use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use custody_core::EvidencePatch;

use super::Store;

pub fn run(store: &Store, id: u64, patch: EvidencePatch, notes: String) -> Result<ExitCode> {
    if patch.is_empty() {
        tracing::warn!(evidence_id = id, "edit without field changes; recording audit event only");
    }

    let record = store
        .edit_patch(id, patch, &notes, Utc::now())
        .with_context(|| format!("edit of evidence #{id} failed"))?;

    println!(
        "{}",
        format!(
            "Evidence #{id} updated; edit logged in chain of custody ({} events)",
            record.custody_events.len()
        )
        .bright_green()
    );
    Ok(ExitCode::SUCCESS)
}
