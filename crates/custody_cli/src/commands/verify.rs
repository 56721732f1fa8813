use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;
use custody_core::verify_reader;

use super::Store;

pub fn run(store: &Store, id: u64, file: &Path) -> Result<ExitCode> {
    let record = store.get(id)?;
    let reader = File::open(file)
        .map(BufReader::new)
        .with_context(|| format!("failed to open {}", file.display()))?;
    let report = verify_reader(&record, reader)
        .with_context(|| format!("failed to read {}", file.display()))?;

    tracing::info!(
        evidence_id = id,
        file = %file.display(),
        verdict = %report.verdict,
        "integrity check"
    );

    println!("expected: {}", report.expected);
    println!("computed: {}", report.computed);
    if report.is_match() {
        println!("{}", "Hash matches! Integrity verified.".bright_green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Hash does not match! Integrity compromised.".bright_red().bold());
        Ok(ExitCode::from(2))
    }
}
