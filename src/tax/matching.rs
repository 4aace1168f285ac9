//! HMRC share identification rules for one security.
//!
//! Disposals are matched in priority order:
//! 1. Same-day rule: acquisitions on the disposal date
//! 2. Bed & breakfast rule: acquisitions within 30 days after the disposal
//! 3. Section 104 pool: the weighted-average holding
//!
//! Acquisition quantity not reserved by rules 1–2 feeds the pool as the
//! date cursor passes it, so the pool seen by each disposal reflects
//! exactly the acquisitions chronologically before it.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::MONEY_DP;
use crate::error::CalcError;
use crate::tax::pool::SecurityPool;
use crate::transaction::{Action, Transaction};

/// Statutory bed & breakfast window, in days after the disposal.
pub const BED_AND_BREAKFAST_WINDOW_DAYS: i64 = 30;

/// Which identification rule matched a disposal fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchRule {
    #[serde(rename = "same-day")]
    SameDay,
    #[serde(rename = "bed-breakfast")]
    BedAndBreakfast,
    #[serde(rename = "section104")]
    Section104,
}

impl MatchRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRule::SameDay => "same-day",
            MatchRule::BedAndBreakfast => "bed-breakfast",
            MatchRule::Section104 => "section104",
        }
    }
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a fragment's cost comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSource {
    /// Direct match against an acquisition (same-day or B&B); index into
    /// [`MatchOutcome::acquisitions`].
    Acquisition { index: usize, rule: MatchRule },
    /// Drawn from the Section 104 pool at the blended cost removed.
    Pool { cost_gbp: Decimal },
}

/// Part of a disposal satisfied by a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFragment {
    /// Index into [`MatchOutcome::disposals`].
    pub disposal: usize,
    pub quantity: Decimal,
    pub source: MatchSource,
}

/// The matched view of one security's transactions.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Acquisitions sorted by date, input order preserved within a date.
    pub acquisitions: Vec<Transaction>,
    /// Disposals sorted by date, input order preserved within a date.
    pub disposals: Vec<Transaction>,
    /// Fragments grouped by disposal, rule priority order within each.
    pub fragments: Vec<MatchFragment>,
}

/// Match all of one security's transactions, mutating the pool as the
/// date cursor advances. Fails with `Overdisposal` when a disposal cannot
/// be covered by direct matches plus the pool at its date.
pub fn match_security(
    transactions: &[Transaction],
    pool: &mut SecurityPool,
) -> Result<MatchOutcome, CalcError> {
    let mut acquisitions: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.action == Action::Acquire)
        .cloned()
        .collect();
    let mut disposals: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.action == Action::Dispose)
        .cloned()
        .collect();
    // Stable sorts keep input order within a date, making ties deterministic
    acquisitions.sort_by_key(|t| t.date);
    disposals.sort_by_key(|t| t.date);

    // Quantity per acquisition still available for direct matching; the
    // remainder after both passes is what feeds the pool.
    let mut available: Vec<Decimal> = acquisitions.iter().map(|a| a.quantity).collect();
    let mut fragments: Vec<Vec<MatchFragment>> = vec![Vec::new(); disposals.len()];
    let mut pool_needed: Vec<Decimal> = vec![Decimal::ZERO; disposals.len()];

    // Pass 1: reserve same-day and B&B quantity, disposals in date order.
    for (di, disposal) in disposals.iter().enumerate() {
        let mut remaining = disposal.quantity;
        let window_end = disposal.date + Duration::days(BED_AND_BREAKFAST_WINDOW_DAYS);

        for (ai, acq) in acquisitions.iter().enumerate() {
            if remaining.is_zero() || acq.date > disposal.date {
                break;
            }
            if acq.date == disposal.date && available[ai] > Decimal::ZERO {
                let quantity = remaining.min(available[ai]);
                available[ai] -= quantity;
                remaining -= quantity;
                log::debug!(
                    "{} same-day match: {} x {} against {}",
                    disposal.symbol,
                    quantity,
                    disposal.id,
                    acq.id
                );
                fragments[di].push(MatchFragment {
                    disposal: di,
                    quantity,
                    source: MatchSource::Acquisition {
                        index: ai,
                        rule: MatchRule::SameDay,
                    },
                });
            }
        }

        for (ai, acq) in acquisitions.iter().enumerate() {
            if remaining.is_zero() || acq.date > window_end {
                break;
            }
            if acq.date > disposal.date && available[ai] > Decimal::ZERO {
                let quantity = remaining.min(available[ai]);
                available[ai] -= quantity;
                remaining -= quantity;
                log::debug!(
                    "{} bed & breakfast match: {} x {} against {} ({})",
                    disposal.symbol,
                    quantity,
                    disposal.id,
                    acq.id,
                    acq.date
                );
                fragments[di].push(MatchFragment {
                    disposal: di,
                    quantity,
                    source: MatchSource::Acquisition {
                        index: ai,
                        rule: MatchRule::BedAndBreakfast,
                    },
                });
            }
        }

        pool_needed[di] = remaining;
    }

    // Pass 2: walk disposals in date order, feeding unreserved acquisition
    // quantity into the pool as the cursor passes it.
    let mut next_acq = 0;
    for (di, disposal) in disposals.iter().enumerate() {
        while next_acq < acquisitions.len() && acquisitions[next_acq].date < disposal.date {
            pool_unreserved(pool, &acquisitions[next_acq], available[next_acq])?;
            next_acq += 1;
        }

        let needed = pool_needed[di];
        if needed > Decimal::ZERO {
            if needed > pool.quantity {
                return Err(CalcError::Overdisposal {
                    symbol: disposal.symbol.clone(),
                    id: disposal.id.clone(),
                    shortfall: needed - pool.quantity,
                });
            }
            let cost_gbp = pool.dispose(needed)?;
            log::debug!(
                "{} pool match: {} x {} at cost {}",
                disposal.symbol,
                needed,
                disposal.id,
                cost_gbp
            );
            fragments[di].push(MatchFragment {
                disposal: di,
                quantity: needed,
                source: MatchSource::Pool { cost_gbp },
            });
        }
    }
    // Any acquisitions after the last disposal still belong in the pool.
    while next_acq < acquisitions.len() {
        pool_unreserved(pool, &acquisitions[next_acq], available[next_acq])?;
        next_acq += 1;
    }

    Ok(MatchOutcome {
        acquisitions,
        disposals,
        fragments: fragments.into_iter().flatten().collect(),
    })
}

/// Feed the unreserved part of an acquisition into the pool, cost
/// (including commission) apportioned to the pooled quantity.
fn pool_unreserved(
    pool: &mut SecurityPool,
    acquisition: &Transaction,
    unreserved: Decimal,
) -> Result<(), CalcError> {
    if unreserved.is_zero() {
        return Ok(());
    }
    let total_cost = acquisition.amount_gbp()? + acquisition.commission_gbp;
    let cost = (total_cost * unreserved / acquisition.quantity).round_dp(MONEY_DP);
    pool.acquire(unreserved, cost);
    Ok(())
}
