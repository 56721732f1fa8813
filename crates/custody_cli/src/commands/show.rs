use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::*;

use super::Store;
use crate::report;

pub fn run(store: &Store, id: u64) -> Result<ExitCode> {
    let record = store.get(id)?;
    let body = report::render(&record).context("failed to render custody report")?;

    println!(
        "{}",
        format!("Chain of custody for evidence #{id}").bright_cyan().bold()
    );
    print!("{body}");
    Ok(ExitCode::SUCCESS)
}
