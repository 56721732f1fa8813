use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;
use custody_core::validate_chain;

use super::Store;

pub fn run(store: &Store) -> Result<ExitCode> {
    let records = store.list().context("failed to load evidence")?;

    let mut violations = 0usize;
    for record in &records {
        if let Err(e) = validate_chain(record) {
            violations += 1;
            tracing::warn!(evidence_id = record.id, "custody chain violation: {}", e);
            println!("{} {}", "VIOLATION".bright_red().bold(), e);
        }
    }

    if violations == 0 {
        println!(
            "{}",
            format!("{} records audited, all custody chains intact", records.len()).bright_green()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{}",
            format!("{violations} of {} records failed the audit", records.len()).yellow()
        );
        Ok(ExitCode::from(2))
    }
}
