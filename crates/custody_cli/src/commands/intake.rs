use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use custody_core::EvidenceFields;

use super::Store;

pub fn run(
    store: &Store,
    name: String,
    hash: String,
    source: String,
    investigator: String,
    custodian: Option<String>,
) -> Result<ExitCode> {
    let custodian = custodian.unwrap_or_else(|| investigator.clone());
    let fields = EvidenceFields::new(name, hash, source, investigator);
    let record = store
        .create(fields, &custodian, Utc::now())
        .context("evidence intake failed")?;

    println!(
        "{}",
        format!("Evidence #{} registered, held by {}", record.id, custodian)
            .bright_green()
            .bold()
    );
    Ok(ExitCode::SUCCESS)
}
