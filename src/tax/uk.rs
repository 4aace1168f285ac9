use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// UK Tax Year (runs 6 April to 5 April).
/// The value is the end year (e.g. 2025 = the 2024-25 tax year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Tax year containing a date.
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        // 6 April or later falls in the year ending next April
        if date >= NaiveDate::from_ymd_opt(year, 4, 6).expect("valid date") {
            TaxYear(year + 1)
        } else {
            TaxYear(year)
        }
    }

    /// 6 April of the previous calendar year.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 - 1, 4, 6).expect("valid date")
    }

    /// 5 April.
    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 4, 5).expect("valid date")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// Label in "2024-25" form.
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.0 - 1, self.0 % 100)
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Statutory annual exempt amount for a tax year.
fn statutory_exempt_amount(year: TaxYear) -> Decimal {
    match year.0 {
        // 2024-25 onwards: £3,000
        2025.. => dec!(3000),
        // 2023-24: £6,000
        2024 => dec!(6000),
        // 2022-23 and earlier: £12,300
        _ => dec!(12300),
    }
}

/// Annual exempt amounts per tax year.
///
/// Defaults to the statutory schedule; individual years can be overridden,
/// so the amount is configuration rather than a hardcoded constant.
#[derive(Debug, Clone, Default)]
pub struct ExemptAmounts {
    overrides: HashMap<TaxYear, Decimal>,
}

impl ExemptAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, year: TaxYear, amount: Decimal) {
        self.overrides.insert(year, amount);
    }

    pub fn for_year(&self, year: TaxYear) -> Decimal {
        self.overrides
            .get(&year)
            .copied()
            .unwrap_or_else(|| statutory_exempt_amount(year))
    }
}
