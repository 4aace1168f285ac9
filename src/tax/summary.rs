//! Per-tax-year aggregation of disposal events.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::tax::disposal::DisposalEvent;
use crate::tax::uk::{ExemptAmounts, TaxYear};

/// Totals for one UK tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxYearSummary {
    pub tax_year: String,
    pub disposal_count: usize,
    pub total_proceeds: Decimal,
    pub total_allowable_costs: Decimal,
    pub net_gain: Decimal,
    pub exempt_amount: Decimal,
    /// Net gain less the exemption, floored at zero; losses are not
    /// reported as negative taxable amounts
    pub taxable_gain: Decimal,
}

/// Sum the events falling in `year` into a summary.
pub fn aggregate(
    events: &[DisposalEvent],
    year: TaxYear,
    exemptions: &ExemptAmounts,
) -> TaxYearSummary {
    let in_year: Vec<&DisposalEvent> =
        events.iter().filter(|e| year.contains(e.date)).collect();

    let total_proceeds: Decimal = in_year.iter().map(|e| e.net_proceeds).sum();
    let total_allowable_costs: Decimal = in_year.iter().map(|e| e.allowable_cost).sum();
    let net_gain: Decimal = in_year.iter().map(|e| e.total_gain_loss).sum();
    let exempt_amount = exemptions.for_year(year);
    let taxable_gain = (net_gain - exempt_amount).max(Decimal::ZERO);

    TaxYearSummary {
        tax_year: year.label(),
        disposal_count: in_year.len(),
        total_proceeds,
        total_allowable_costs,
        net_gain,
        exempt_amount,
        taxable_gain,
    }
}

/// Summaries for every tax year present in the events, ascending.
pub fn aggregate_all(events: &[DisposalEvent], exemptions: &ExemptAmounts) -> Vec<TaxYearSummary> {
    let years: BTreeSet<TaxYear> = events.iter().map(|e| e.tax_year()).collect();
    years
        .into_iter()
        .map(|y| aggregate(events, y, exemptions))
        .collect()
}
