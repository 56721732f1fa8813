use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;

use super::Store;
use crate::report;

pub fn run(store: &Store) -> Result<ExitCode> {
    let records = store.list().context("failed to load evidence")?;
    if records.is_empty() {
        println!("{}", "No evidence registered".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    for record in &records {
        println!("{}", report::summary_line(record));
    }
    Ok(ExitCode::SUCCESS)
}
