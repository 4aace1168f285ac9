use rust_decimal::Decimal;

use crate::currency::MONEY_DP;
use crate::error::CalcError;

/// Section 104 holding for one security.
///
/// Acquisitions blend into a weighted-average cost; disposals remove cost
/// in proportion to quantity, leaving the average per share unchanged.
#[derive(Debug, Clone)]
pub struct SecurityPool {
    pub symbol: String,
    pub quantity: Decimal,
    pub cost_gbp: Decimal,
}

impl SecurityPool {
    pub fn new(symbol: impl Into<String>) -> Self {
        SecurityPool {
            symbol: symbol.into(),
            quantity: Decimal::ZERO,
            cost_gbp: Decimal::ZERO,
        }
    }

    /// Average cost per share, None for an empty pool.
    pub fn average_cost(&self) -> Option<Decimal> {
        if self.quantity.is_zero() {
            None
        } else {
            Some(self.cost_gbp / self.quantity)
        }
    }

    /// Add shares to the pool.
    pub fn acquire(&mut self, quantity: Decimal, cost_gbp: Decimal) {
        self.quantity += quantity;
        self.cost_gbp += cost_gbp;
        log::debug!(
            "pool {} acquire: qty={}, cost={}. now qty={}, cost={}",
            self.symbol,
            quantity,
            cost_gbp,
            self.quantity,
            self.cost_gbp
        );
    }

    /// Remove shares from the pool, returning the cost removed.
    ///
    /// The match engine never requests more than the pool holds, so an
    /// underflow here is a sequencing bug rather than a data error.
    pub fn dispose(&mut self, quantity: Decimal) -> Result<Decimal, CalcError> {
        if quantity > self.quantity {
            return Err(CalcError::InsufficientPool {
                symbol: self.symbol.clone(),
                requested: quantity,
                held: self.quantity,
            });
        }
        let cost = if quantity == self.quantity {
            // Full removal takes the exact remaining cost, avoiding dust.
            self.cost_gbp
        } else {
            (self.cost_gbp * quantity / self.quantity).round_dp(MONEY_DP)
        };
        self.quantity -= quantity;
        self.cost_gbp -= cost;
        log::debug!(
            "pool {} dispose: qty={}, cost={}. remaining qty={}, cost={}",
            self.symbol,
            quantity,
            cost,
            self.quantity,
            self.cost_gbp
        );
        Ok(cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn acquire_blends_weighted_average() {
        let mut pool = SecurityPool::new("VUSA");
        pool.acquire(dec!(100), dec!(1000));
        pool.acquire(dec!(50), dec!(800));
        assert_eq!(pool.quantity, dec!(150));
        assert_eq!(pool.cost_gbp, dec!(1800));
        // (1000 + 800) / 150 = £12/share
        assert_eq!(pool.average_cost(), Some(dec!(12)));
    }

    #[test]
    fn dispose_removes_proportional_cost() {
        let mut pool = SecurityPool::new("VUSA");
        pool.acquire(dec!(100), dec!(1000));
        pool.acquire(dec!(50), dec!(800));

        let cost = pool.dispose(dec!(75)).unwrap();
        assert_eq!(cost, dec!(900));
        assert_eq!(pool.quantity, dec!(75));
        assert_eq!(pool.cost_gbp, dec!(900));
        // Average is unchanged by a disposal
        assert_eq!(pool.average_cost(), Some(dec!(12)));
    }

    #[test]
    fn full_disposal_empties_pool() {
        let mut pool = SecurityPool::new("VUSA");
        pool.acquire(dec!(3), dec!(100));
        let cost = pool.dispose(dec!(3)).unwrap();
        assert_eq!(cost, dec!(100));
        assert_eq!(pool.quantity, dec!(0));
        assert_eq!(pool.cost_gbp, dec!(0));
        assert_eq!(pool.average_cost(), None);
    }

    #[test]
    fn dispose_more_than_held_is_an_error() {
        let mut pool = SecurityPool::new("VUSA");
        pool.acquire(dec!(10), dec!(100));
        let err = pool.dispose(dec!(15)).unwrap_err();
        assert_eq!(
            err,
            CalcError::InsufficientPool {
                symbol: "VUSA".to_string(),
                requested: dec!(15),
                held: dec!(10),
            }
        );
        // Pool untouched on failure
        assert_eq!(pool.quantity, dec!(10));
        assert_eq!(pool.cost_gbp, dec!(100));
    }
}
