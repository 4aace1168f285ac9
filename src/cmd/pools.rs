//! Pools command - closing Section 104 pool balances per security.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cmd::{read_transactions, report_errors};
use crate::currency::MONEY_DP;
use crate::tax::calculate;
use crate::tax::pool::SecurityPool;

#[derive(Args, Debug)]
pub struct PoolsCommand {
    /// Transactions file (CSV or JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Filter by security symbol
    #[arg(short, long)]
    symbol: Option<String>,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct PoolBalance {
    symbol: String,
    quantity: String,
    cost_gbp: String,
    average_cost_gbp: String,
}

impl From<&SecurityPool> for PoolBalance {
    fn from(pool: &SecurityPool) -> Self {
        PoolBalance {
            symbol: pool.symbol.clone(),
            quantity: pool.quantity.to_string(),
            cost_gbp: pool.cost_gbp.round_dp(MONEY_DP).to_string(),
            average_cost_gbp: pool
                .average_cost()
                .map(|a| a.round_dp(MONEY_DP).to_string())
                .unwrap_or_default(),
        }
    }
}

impl PoolsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let transactions = read_transactions(&self.file)?;
        let report = calculate(&transactions);
        report_errors(&report);

        let balances: Vec<PoolBalance> = report
            .pools
            .values()
            .filter(|p| {
                self.symbol
                    .as_deref()
                    .is_none_or(|s| p.symbol.eq_ignore_ascii_case(s))
            })
            .map(PoolBalance::from)
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&balances)?);
            return Ok(());
        }

        if balances.is_empty() {
            println!("No pool balances found");
            return Ok(());
        }

        println!();
        println!("SECTION 104 POOLS");
        println!();
        let rows: Vec<PoolRow> = balances.iter().map(PoolRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{table}");
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct PoolRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Cost (GBP)")]
    cost_gbp: String,
    #[tabled(rename = "Avg Cost (GBP)")]
    average_cost_gbp: String,
}

impl From<&PoolBalance> for PoolRow {
    fn from(b: &PoolBalance) -> Self {
        PoolRow {
            symbol: b.symbol.clone(),
            quantity: b.quantity.clone(),
            cost_gbp: b.cost_gbp.clone(),
            average_cost_gbp: b.average_cost_gbp.clone(),
        }
    }
}
