use std::fmt::Write;

use custody_core::{chain_head, current_custodian, timestamp, EvidenceRecord, Result};

/// One-line listing entry: id, name, current holder, ledger length.
pub fn summary_line(record: &EvidenceRecord) -> String {
    let holder = current_custodian(record).unwrap_or("<no custodian>");
    format!(
        "#{:<4} {:<32} held by {:<20} {} event(s)",
        record.id,
        record.name,
        holder,
        record.custody_events.len()
    )
}

/// Full plain-text custody report for a single record.
pub fn render(record: &EvidenceRecord) -> Result<String> {
    let head = chain_head(record)?;
    let holder = current_custodian(record)?;

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "  name:         {}", record.name);
    let _ = writeln!(out, "  fingerprint:  {}", record.fingerprint);
    let _ = writeln!(out, "  source:       {}", record.source);
    let _ = writeln!(out, "  investigator: {}", record.investigator);
    let _ = writeln!(out, "  registered:   {}", timestamp::format(&record.created_at));
    let _ = writeln!(out, "  custodian:    {holder}");
    let _ = writeln!(out, "  chain head:   {head}");
    let _ = writeln!(out);

    for (i, event) in record.custody_events.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{i}] {} {:<8} {} -> {}",
            timestamp::format(&event.timestamp),
            event.kind(),
            event.from,
            event.to
        );
        if !event.notes.is_empty() {
            let _ = writeln!(out, "      {}", event.notes);
        }
    }
    Ok(out)
}
