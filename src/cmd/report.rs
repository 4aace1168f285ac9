//! Report command - disposal events with cost, proceeds and gain split.

use clap::Args;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cmd::{read_transactions, report_errors};
use crate::tax::{calculate, DisposalEvent, TaxYear};

#[derive(Args, Debug)]
pub struct ReportCommand {
    /// Transactions file (CSV or JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Tax year to filter (e.g., 2025 for 2024-25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Filter by security symbol
    #[arg(short, long)]
    symbol: Option<String>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = read_transactions(&self.file)?;
        let report = calculate(&transactions);
        report_errors(&report);

        let year = self.year.map(TaxYear);
        let events: Vec<&DisposalEvent> = report
            .events
            .iter()
            .filter(|e| year.is_none_or(|y| e.tax_year() == y))
            .filter(|e| {
                self.symbol
                    .as_deref()
                    .is_none_or(|s| e.symbol.eq_ignore_ascii_case(s))
            })
            .collect();

        if self.json {
            self.print_json(&events)
        } else if self.csv {
            self.write_csv(&events)
        } else {
            self.print_table(&events, year);
            Ok(())
        }
    }

    fn print_json(&self, events: &[&DisposalEvent]) -> anyhow::Result<()> {
        #[derive(Serialize)]
        struct Output<'a> {
            events: &'a [&'a DisposalEvent],
        }
        println!("{}", serde_json::to_string_pretty(&Output { events })?);
        Ok(())
    }

    fn write_csv(&self, events: &[&DisposalEvent]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for event in events {
            let row: DisposalRow = (*event).into();
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn print_table(&self, events: &[&DisposalEvent], year: Option<TaxYear>) {
        let year_str = year.map_or("All Years".to_string(), |y| y.label());
        if events.is_empty() {
            println!("No disposals found ({year_str})");
            return;
        }

        println!();
        println!("DISPOSALS ({year_str})");
        println!();

        let rows: Vec<DisposalRow> = events.iter().map(|e| (*e).into()).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }
}

/// Row for table and CSV output.
#[derive(Debug, Clone, Tabled, Serialize)]
struct DisposalRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Tax Year")]
    tax_year: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Acq. Date")]
    acquisition_date: String,
    #[tabled(rename = "Cost")]
    allowable_cost: String,
    #[tabled(rename = "Proceeds")]
    net_proceeds: String,
    #[tabled(rename = "FX Gain")]
    fx_gain_loss: String,
    #[tabled(rename = "CGT Gain")]
    cgt_gain_loss: String,
    #[tabled(rename = "Total Gain")]
    total_gain_loss: String,
}

impl From<&DisposalEvent> for DisposalRow {
    fn from(e: &DisposalEvent) -> Self {
        DisposalRow {
            id: e.id.clone(),
            date: e.date.format("%Y-%m-%d").to_string(),
            tax_year: e.tax_year().label(),
            symbol: e.symbol.clone(),
            rule: e.matching_rule.to_string(),
            quantity: e.quantity.to_string(),
            acquisition_date: e
                .acquisition_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            allowable_cost: e.allowable_cost.to_string(),
            net_proceeds: e.net_proceeds.to_string(),
            fx_gain_loss: e.fx_gain_loss.to_string(),
            cgt_gain_loss: e.cgt_gain_loss.to_string(),
            total_gain_loss: e.total_gain_loss.to_string(),
        }
    }
}
