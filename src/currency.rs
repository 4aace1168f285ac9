//! Sterling conversion and FX/price gain decomposition.
//!
//! Fx rates are quoted as units of foreign currency per 1 GBP, so the
//! sterling value of an amount is `amount / fx_rate`. A GBP amount always
//! carries a rate of exactly 1.

use rust_decimal::Decimal;

/// Decimal places reported for currency amounts.
pub const MONEY_DP: u32 = 2;
/// Decimal places reported for fx rates.
pub const FX_DP: u32 = 4;

/// A non-positive fx rate was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid fx rate {0}: rate must be positive")]
pub struct InvalidRate(pub Decimal);

/// Convert an amount in a foreign currency to GBP at the given rate.
pub fn to_gbp(amount: Decimal, fx_rate: Decimal) -> Result<Decimal, InvalidRate> {
    if fx_rate <= Decimal::ZERO {
        return Err(InvalidRate(fx_rate));
    }
    Ok(amount / fx_rate)
}

/// The split of a sterling gain into currency movement and price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainSplit {
    pub fx: Decimal,
    pub cgt: Decimal,
}

/// Decompose a sterling gain into FX and price components.
///
/// The price movement is the local-currency price delta converted at the
/// disposal-date rate; everything else (currency timing) is attributed to
/// FX. The two components always sum to `gbp_proceeds - gbp_cost`, and when
/// buy and sell rates are equal the FX component is exactly zero.
pub fn decompose_gain(
    buy_amount: Decimal,
    buy_fx_rate: Decimal,
    sell_amount: Decimal,
    sell_fx_rate: Decimal,
    gbp_cost: Decimal,
    gbp_proceeds: Decimal,
) -> Result<GainSplit, InvalidRate> {
    if buy_fx_rate <= Decimal::ZERO {
        return Err(InvalidRate(buy_fx_rate));
    }
    if sell_fx_rate <= Decimal::ZERO {
        return Err(InvalidRate(sell_fx_rate));
    }
    if buy_fx_rate == sell_fx_rate {
        // Identical rates carry no currency movement by definition, so the
        // whole gain is price movement.
        return Ok(GainSplit {
            fx: Decimal::ZERO,
            cgt: gbp_proceeds - gbp_cost,
        });
    }
    let cgt = (sell_amount - buy_amount) / sell_fx_rate;
    let fx = (gbp_proceeds - gbp_cost) - cgt;
    Ok(GainSplit { fx, cgt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn to_gbp_divides_by_rate() {
        assert_eq!(to_gbp(dec!(1000), dec!(1.25)).unwrap(), dec!(800));
        assert_eq!(to_gbp(dec!(500), dec!(1)).unwrap(), dec!(500));
    }

    #[test]
    fn to_gbp_rejects_non_positive_rate() {
        assert_eq!(to_gbp(dec!(100), dec!(0)), Err(InvalidRate(dec!(0))));
        assert_eq!(to_gbp(dec!(100), dec!(-1)), Err(InvalidRate(dec!(-1))));
    }

    #[test]
    fn pure_fx_movement_has_zero_price_gain() {
        // $1000 bought at $1.25/£ (£800), sold for $1000 at $1.00/£ (£1000):
        // no price movement in dollars, the whole £200 gain is FX.
        let split = decompose_gain(
            dec!(1000),
            dec!(1.25),
            dec!(1000),
            dec!(1.00),
            dec!(800),
            dec!(1000),
        )
        .unwrap();
        assert_eq!(split.cgt, dec!(0));
        assert_eq!(split.fx, dec!(200));
    }

    #[test]
    fn components_sum_to_total_gain() {
        let gbp_cost = to_gbp(dec!(1000), dec!(1.25)).unwrap();
        let gbp_proceeds = to_gbp(dec!(1300), dec!(1.30)).unwrap();
        let split = decompose_gain(
            dec!(1000),
            dec!(1.25),
            dec!(1300),
            dec!(1.30),
            gbp_cost,
            gbp_proceeds,
        )
        .unwrap();
        assert_eq!(split.fx + split.cgt, gbp_proceeds - gbp_cost);
    }

    #[test]
    fn same_rate_means_zero_fx() {
        // Price doubled but the rate never moved: zero FX gain.
        let split = decompose_gain(
            dec!(1000),
            dec!(1.25),
            dec!(2000),
            dec!(1.25),
            dec!(800),
            dec!(1600),
        )
        .unwrap();
        assert_eq!(split.fx, dec!(0));
        assert_eq!(split.cgt, dec!(800));
    }

    #[test]
    fn decompose_rejects_non_positive_rates() {
        let err = decompose_gain(
            dec!(1000),
            dec!(0),
            dec!(1000),
            dec!(1),
            dec!(0),
            dec!(1000),
        );
        assert_eq!(err, Err(InvalidRate(dec!(0))));
    }
}
