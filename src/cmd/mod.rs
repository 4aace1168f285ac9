pub mod pools;
pub mod report;
pub mod schema;
pub mod summary;

use crate::transaction::{self, Transaction};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;

/// Read transactions from a CSV or JSON file, or stdin with "-".
pub fn read_transactions(path: &Path) -> anyhow::Result<Vec<Transaction>> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        if path.extension().is_some_and(|e| e == "json") {
            transaction::read_json(reader)
        } else {
            transaction::read_csv(reader)
        }
    }
}

fn read_from_stdin() -> anyhow::Result<Vec<Transaction>> {
    let mut buffer = Vec::new();
    io::stdin().lock().read_to_end(&mut buffer)?;
    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    // Sniff the format: JSON input starts with an object
    let is_json = buffer
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{');
    let cursor = Cursor::new(buffer);
    if is_json {
        transaction::read_json(cursor)
    } else {
        transaction::read_csv(cursor)
    }
}

/// Print per-security calculation failures to stderr.
pub fn report_errors(report: &crate::tax::cgt::CgtReport) {
    if report.has_errors() {
        for error in &report.errors {
            eprintln!("warning: {error}");
        }
    }
}
