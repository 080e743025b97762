use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{hosts::HostRegistry, runner::RunReport};

/// Record fields tried, in order, for the table's artifact column.
const ARTIFACT_FIELDS: [&str; 3] = ["ip", "dns", "domain"];

macro_rules! safe_println {
    ($($arg:tt)*) => {
        if let Err(e) = writeln!(io::stdout(), $($arg)*) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                // Silently exit: the consumer went away
                std::process::exit(0);
            } else {
                panic!("stdout error: {}", e);
            }
        }
    };
}

/// One row of the tabular summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub artifact: String,
    pub kind: String,
}

/// Sorted host list plus the flattened table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub hosts: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

/// Projects a record to its table row; records without an address-like field
/// have none.
pub fn summary_row(record: &Value) -> Option<SummaryRow> {
    let artifact = ARTIFACT_FIELDS
        .iter()
        .filter_map(|field| record.get(field).and_then(Value::as_str))
        .find(|value| !value.is_empty())?;
    let kind = record.get("kind").and_then(Value::as_str)?;
    Some(SummaryRow { artifact: artifact.to_string(), kind: kind.to_string() })
}

/// Single pass over a newline-delimited record stream.
pub fn summary_rows<R: BufRead>(records: R) -> Result<Vec<SummaryRow>> {
    let mut rows = Vec::new();
    for (index, line) in records.lines().enumerate() {
        let line = line.context("Failed to read record stream")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Value = serde_json::from_str(&line)
            .with_context(|| format!("Malformed record on line {}", index + 1))?;
        rows.extend(summary_row(&record));
    }
    Ok(rows)
}

pub fn summarize<R: BufRead>(records: R, hosts: &HostRegistry) -> Result<Summary> {
    Ok(Summary { hosts: hosts.sorted(), rows: summary_rows(records)? })
}

/// Writes the table with its `artifact,kind` header, even when empty.
pub fn write_summary_csv<W: Write>(rows: &[SummaryRow], writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(["artifact", "kind"])?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_host_list<W: Write>(hosts: &[String], mut writer: W) -> Result<()> {
    for host in hosts {
        writeln!(writer, "{host}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads the finished record stream at `records` and writes the host list and
/// table to their destinations.
pub fn write_artifacts(
    records: &Path,
    hosts: &HostRegistry,
    hosts_out: &Path,
    summary_out: &Path,
) -> Result<Summary> {
    let reader = BufReader::new(
        File::open(records)
            .with_context(|| format!("Failed to open record stream {}", records.display()))?,
    );
    let summary = summarize(reader, hosts)?;

    let file = File::create(hosts_out)
        .with_context(|| format!("Failed to create host list {}", hosts_out.display()))?;
    write_host_list(&summary.hosts, BufWriter::new(file))
        .with_context(|| format!("Failed to write host list {}", hosts_out.display()))?;

    let file = File::create(summary_out)
        .with_context(|| format!("Failed to create summary {}", summary_out.display()))?;
    write_summary_csv(&summary.rows, BufWriter::new(file))
        .with_context(|| format!("Failed to write summary {}", summary_out.display()))?;

    Ok(summary)
}

pub fn print_run_summary(report: &RunReport, artifacts: &[&Path]) {
    safe_println!("\n==========================================");
    safe_println!("Enumeration Summary:");
    safe_println!("==========================================");
    safe_println!(" |Sessions enumerated.........: {}", report.sessions);
    safe_println!(" |Accounts skipped............: {}", report.skipped_accounts.len());
    safe_println!(" |Regions scanned.............: {}", report.regions);
    safe_println!(" |Records emitted.............: {}", report.records);
    safe_println!(" |Unique hosts................: {}", report.hosts);
    safe_println!(" |Degraded invocations........: {}", report.degraded.len());
    for skipped in &report.skipped_accounts {
        safe_println!(" |__skipped {}: {}", skipped.account_id, skipped.reason);
    }
    for degraded in &report.degraded {
        safe_println!(" |__degraded {degraded}");
    }
    for path in artifacts {
        safe_println!(" |Wrote {}", path.display());
    }
}
