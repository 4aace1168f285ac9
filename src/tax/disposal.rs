//! Turns match fragments into fully-populated disposal events.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::currency::{self, MONEY_DP};
use crate::error::CalcError;
use crate::tax::matching::{MatchOutcome, MatchRule, MatchSource};
use crate::tax::uk::TaxYear;
use crate::transaction::Transaction;

/// One disposal fragment priced for the CGT computation.
///
/// `total_gain_loss` always equals both `net_proceeds - allowable_cost`
/// and `fx_gain_loss + cgt_gain_loss` at 2 decimal places. Pool-matched
/// fragments report their cost in GBP at rate 1, since the pool blends
/// cost across acquisitions and keeps no original-currency provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisposalEvent {
    pub id: String,
    pub date: NaiveDate,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: Decimal,
    pub matching_rule: MatchRule,
    pub cost_amount: Decimal,
    pub cost_currency: String,
    pub cost_fx_rate: Decimal,
    pub cost_gbp: Decimal,
    pub cost_commission: Decimal,
    /// None for pool matches, which blend multiple acquisition dates
    pub acquisition_date: Option<NaiveDate>,
    pub proceeds_amount: Decimal,
    pub proceeds_currency: String,
    pub proceeds_fx_rate: Decimal,
    pub proceeds_gbp: Decimal,
    pub proceeds_commission: Decimal,
    pub allowable_cost: Decimal,
    pub net_proceeds: Decimal,
    pub fx_gain_loss: Decimal,
    pub cgt_gain_loss: Decimal,
    pub total_gain_loss: Decimal,
}

impl DisposalEvent {
    pub fn tax_year(&self) -> TaxYear {
        TaxYear::from_date(self.date)
    }
}

struct CostSide {
    amount: Decimal,
    currency: String,
    fx_rate: Decimal,
    gbp: Decimal,
    commission: Decimal,
    acquisition_date: Option<NaiveDate>,
    rule: MatchRule,
}

fn to_gbp_for(txn: &Transaction, amount: Decimal) -> Result<Decimal, CalcError> {
    currency::to_gbp(amount, txn.fx_rate).map_err(|e| CalcError::InvalidRate {
        id: txn.id.clone(),
        rate: e.0,
    })
}

/// Build one [`DisposalEvent`] per match fragment.
pub fn build_events(outcome: &MatchOutcome) -> Result<Vec<DisposalEvent>, CalcError> {
    let mut events = Vec::with_capacity(outcome.fragments.len());
    let mut last_disposal = usize::MAX;
    let mut seq = 0;

    for fragment in &outcome.fragments {
        let disposal = &outcome.disposals[fragment.disposal];
        seq = if fragment.disposal == last_disposal { seq + 1 } else { 1 };
        last_disposal = fragment.disposal;

        // Proceeds apportioned pro-rata to the fragment's quantity
        let ratio = fragment.quantity / disposal.quantity;
        let proceeds_amount = (disposal.amount() * ratio).round_dp(MONEY_DP);
        let proceeds_gbp = to_gbp_for(disposal, disposal.amount() * ratio)?.round_dp(MONEY_DP);
        let proceeds_commission = (disposal.commission_gbp * ratio).round_dp(MONEY_DP);

        let cost = match &fragment.source {
            MatchSource::Acquisition { index, rule } => {
                let acq = &outcome.acquisitions[*index];
                let acq_ratio = fragment.quantity / acq.quantity;
                CostSide {
                    amount: (acq.amount() * acq_ratio).round_dp(MONEY_DP),
                    currency: acq.currency.clone(),
                    fx_rate: acq.fx_rate,
                    gbp: to_gbp_for(acq, acq.amount() * acq_ratio)?.round_dp(MONEY_DP),
                    commission: (acq.commission_gbp * acq_ratio).round_dp(MONEY_DP),
                    acquisition_date: Some(acq.date),
                    rule: *rule,
                }
            }
            MatchSource::Pool { cost_gbp } => CostSide {
                amount: *cost_gbp,
                currency: "GBP".to_string(),
                fx_rate: Decimal::ONE,
                gbp: *cost_gbp,
                // Acquisition commissions were already blended into the
                // pool's cost when the shares were pooled.
                commission: Decimal::ZERO,
                acquisition_date: None,
                rule: MatchRule::Section104,
            },
        };

        let allowable_cost = cost.gbp + cost.commission;
        let net_proceeds = proceeds_gbp - proceeds_commission;
        let total_gain_loss = net_proceeds - allowable_cost;

        let split = currency::decompose_gain(
            cost.amount,
            cost.fx_rate,
            proceeds_amount,
            disposal.fx_rate,
            cost.gbp,
            proceeds_gbp,
        )
        .map_err(|e| CalcError::InvalidRate {
            id: disposal.id.clone(),
            rate: e.0,
        })?;
        // Residual pence from rounding are absorbed into the price
        // component, preserving total = fx + cgt exactly.
        let fx_gain_loss = split.fx.round_dp(MONEY_DP);
        let cgt_gain_loss = total_gain_loss - fx_gain_loss;

        events.push(DisposalEvent {
            id: format!("{}/{}", disposal.id, seq),
            date: disposal.date,
            symbol: disposal.symbol.clone(),
            name: disposal.name.clone(),
            quantity: fragment.quantity,
            matching_rule: cost.rule,
            cost_amount: cost.amount,
            cost_currency: cost.currency,
            cost_fx_rate: cost.fx_rate,
            cost_gbp: cost.gbp,
            cost_commission: cost.commission,
            acquisition_date: cost.acquisition_date,
            proceeds_amount,
            proceeds_currency: disposal.currency.clone(),
            proceeds_fx_rate: disposal.fx_rate,
            proceeds_gbp,
            proceeds_commission,
            allowable_cost,
            net_proceeds,
            fx_gain_loss,
            cgt_gain_loss,
            total_gain_loss,
        });
    }

    Ok(events)
}
