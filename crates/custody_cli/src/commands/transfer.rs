use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;

use super::Store;

pub fn run(store: &Store, id: u64, to: String, notes: Option<String>) -> Result<ExitCode> {
    let record = store
        .transfer(id, &to, notes.as_deref(), Utc::now())
        .with_context(|| format!("transfer of evidence #{id} failed"))?;

    if let Some(event) = record.last_event() {
        println!(
            "{}",
            format!("Evidence #{id}: {} -> {}", event.from, event.to).bright_green()
        );
    }
    Ok(ExitCode::SUCCESS)
}
