//! Summary command - per-tax-year totals with the annual exemption applied.

use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cmd::{read_transactions, report_errors};
use crate::tax::summary::TaxYearSummary;
use crate::tax::{aggregate, aggregate_all, calculate, ExemptAmounts, TaxYear};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// Transactions file (CSV or JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Tax year to report (e.g., 2025 for 2024-25); all years if omitted
    #[arg(short, long)]
    year: Option<i32>,

    /// Override the annual exempt amount for the selected year
    #[arg(long, requires = "year")]
    exemption: Option<Decimal>,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = read_transactions(&self.file)?;
        let report = calculate(&transactions);
        report_errors(&report);

        let mut exemptions = ExemptAmounts::new();
        if let (Some(year), Some(amount)) = (self.year, self.exemption) {
            exemptions.set(TaxYear(year), amount);
        }

        let summaries = match self.year {
            Some(year) => vec![aggregate(&report.events, TaxYear(year), &exemptions)],
            None => aggregate_all(&report.events, &exemptions),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            return Ok(());
        }

        if summaries.is_empty() {
            println!("No disposals found");
            return Ok(());
        }

        println!();
        println!("CAPITAL GAINS SUMMARY");
        println!();
        let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{table}");
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Tax Year")]
    tax_year: String,
    #[tabled(rename = "Disposals")]
    disposals: String,
    #[tabled(rename = "Proceeds")]
    proceeds: String,
    #[tabled(rename = "Costs")]
    costs: String,
    #[tabled(rename = "Net Gain")]
    net_gain: String,
    #[tabled(rename = "Exemption")]
    exemption: String,
    #[tabled(rename = "Taxable Gain")]
    taxable_gain: String,
}

impl From<&TaxYearSummary> for SummaryRow {
    fn from(s: &TaxYearSummary) -> Self {
        SummaryRow {
            tax_year: s.tax_year.clone(),
            disposals: s.disposal_count.to_string(),
            proceeds: s.total_proceeds.to_string(),
            costs: s.total_allowable_costs.to_string(),
            net_gain: s.net_gain.to_string(),
            exemption: s.exempt_amount.to_string(),
            taxable_gain: s.taxable_gain.to_string(),
        }
    }
}
