//! Calculation entry point: groups transactions by security, matches each
//! one independently, and collects per-security failures without blocking
//! the rest of the report.

use std::collections::BTreeMap;

use crate::error::CalcError;
use crate::tax::disposal::{build_events, DisposalEvent};
use crate::tax::matching::match_security;
use crate::tax::pool::SecurityPool;
use crate::transaction::Transaction;

/// Result of a calculation run.
#[derive(Debug)]
pub struct CgtReport {
    /// Disposal events, ordered by date then symbol
    pub events: Vec<DisposalEvent>,
    /// Closing Section 104 pools for securities that calculated cleanly
    pub pools: BTreeMap<String, SecurityPool>,
    /// Per-security failures; the named security has no events or pool
    pub errors: Vec<CalcError>,
}

impl CgtReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Calculate disposal events for a set of transactions.
///
/// Securities are independent: a validation or overdisposal failure in one
/// symbol is recorded in `errors` and does not abort the others.
pub fn calculate(transactions: &[Transaction]) -> CgtReport {
    let mut by_symbol: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
    for txn in transactions {
        by_symbol
            .entry(txn.symbol.clone())
            .or_default()
            .push(txn.clone());
    }

    let mut events = Vec::new();
    let mut pools = BTreeMap::new();
    let mut errors = Vec::new();

    for (symbol, txns) in by_symbol {
        match calculate_security(&symbol, &txns) {
            Ok((security_events, pool)) => {
                events.extend(security_events);
                pools.insert(symbol, pool);
            }
            Err(e) => {
                log::warn!("skipping {}: {}", symbol, e);
                errors.push(e);
            }
        }
    }

    // Within a symbol events are already date-ordered; interleave symbols
    // chronologically for the report (stable, so ties stay deterministic).
    events.sort_by_key(|e| e.date);

    CgtReport {
        events,
        pools,
        errors,
    }
}

fn calculate_security(
    symbol: &str,
    transactions: &[Transaction],
) -> Result<(Vec<DisposalEvent>, SecurityPool), CalcError> {
    for txn in transactions {
        txn.validate()?;
    }
    let mut pool = SecurityPool::new(symbol);
    let outcome = match_security(transactions, &mut pool)?;
    let events = build_events(&outcome)?;
    Ok((events, pool))
}
