//! Normalized brokerage transactions and their CSV/JSON readers.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::currency;
use crate::error::CalcError;

/// Whether shares were bought or sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Action {
    Acquire,
    Dispose,
}

/// A single buy or sell of a security, as supplied by the parsing layer.
///
/// `fx_rate` is quoted as units of `currency` per 1 GBP; `commission_gbp`
/// is already converted to sterling at the transaction's own rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub symbol: String,
    pub name: Option<String>,
    pub action: Action,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub currency: String,
    pub fx_rate: Decimal,
    pub commission_gbp: Decimal,
}

impl Transaction {
    /// Total consideration in the transaction's own currency.
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Total consideration in GBP.
    pub fn amount_gbp(&self) -> Result<Decimal, CalcError> {
        currency::to_gbp(self.amount(), self.fx_rate).map_err(|e| CalcError::InvalidRate {
            id: self.id.clone(),
            rate: e.0,
        })
    }

    /// Check the input invariants: positive quantity, positive fx rate,
    /// and a unit rate for GBP-denominated transactions.
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.quantity <= Decimal::ZERO {
            return Err(CalcError::InvalidQuantity {
                id: self.id.clone(),
                quantity: self.quantity,
            });
        }
        if self.fx_rate <= Decimal::ZERO {
            return Err(CalcError::InvalidRate {
                id: self.id.clone(),
                rate: self.fx_rate,
            });
        }
        if self.currency == "GBP" && self.fx_rate != Decimal::ONE {
            return Err(CalcError::GbpRateNotUnity {
                id: self.id.clone(),
                rate: self.fx_rate,
            });
        }
        Ok(())
    }
}

/// Root document for JSON input.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransactionInput {
    pub transactions: Vec<TransactionRecord>,
}

fn default_currency() -> String {
    "GBP".to_string()
}

fn default_fx_rate() -> Decimal {
    Decimal::ONE
}

/// Serde-facing record, shared by the CSV and JSON readers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransactionRecord {
    /// Identifier used in audit messages; defaults to the row number
    #[serde(default)]
    pub id: Option<String>,
    /// Date (or datetime, time of day is ignored for matching)
    pub date: String,
    /// Security symbol, the identity key for pooling
    pub symbol: String,
    /// Optional security name for display
    #[serde(default)]
    pub name: Option<String>,
    /// "Acquire" or "Dispose"
    pub action: String,
    #[schemars(with = "f64")]
    pub quantity: Decimal,
    #[schemars(with = "f64")]
    pub unit_price: Decimal,
    /// ISO currency code of the consideration
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Units of `currency` per 1 GBP
    #[serde(default = "default_fx_rate")]
    #[schemars(with = "f64")]
    pub fx_rate: Decimal,
    /// Commission in GBP
    #[serde(default)]
    #[schemars(with = "f64")]
    pub commission_gbp: Decimal,
}

/// Parse a date that may carry a time component, keeping the date only.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

impl TransactionRecord {
    /// Convert to a [`Transaction`], using `row` for the fallback id.
    pub fn into_transaction(self, row: usize) -> Result<Transaction, CalcError> {
        let id = self.id.unwrap_or_else(|| format!("row-{row}"));
        let date = parse_date(&self.date).ok_or_else(|| CalcError::InvalidDate {
            id: id.clone(),
            value: self.date.clone(),
        })?;
        let action = match self.action.as_str() {
            "Acquire" => Action::Acquire,
            "Dispose" => Action::Dispose,
            _ => {
                return Err(CalcError::InvalidAction {
                    id,
                    value: self.action,
                })
            }
        };
        let txn = Transaction {
            id,
            date,
            symbol: self.symbol,
            name: self.name,
            action,
            quantity: self.quantity,
            unit_price: self.unit_price,
            currency: self.currency,
            fx_rate: self.fx_rate.round_dp(currency::FX_DP),
            commission_gbp: self.commission_gbp,
        };
        txn.validate()?;
        Ok(txn)
    }
}

fn into_transactions(records: Vec<TransactionRecord>) -> anyhow::Result<Vec<Transaction>> {
    let mut transactions = records
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_transaction(i + 1))
        .collect::<Result<Vec<_>, _>>()?;
    transactions.sort_by_key(|t| t.date);
    Ok(transactions)
}

/// Read transactions from CSV.
pub fn read_csv<R: Read>(reader: R) -> anyhow::Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records: Result<Vec<TransactionRecord>, _> =
        rdr.deserialize::<TransactionRecord>().collect();
    into_transactions(records?)
}

/// Read transactions from JSON.
pub fn read_json<R: Read>(reader: R) -> anyhow::Result<Vec<Transaction>> {
    let input: TransactionInput = serde_json::from_reader(reader)?;
    into_transactions(input.transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_csv_transactions() {
        let csv_data = "\
id,date,symbol,name,action,quantity,unit_price,currency,fx_rate,commission_gbp
t1,2024-06-01,VUSA,Vanguard S&P 500,Acquire,100,10.50,GBP,1,5.95
t2,2024-06-15,AAPL,,Dispose,25,190.00,USD,1.2650,3.50
";
        let txns = read_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].id, "t1");
        assert_eq!(txns[0].action, Action::Acquire);
        assert_eq!(txns[0].symbol, "VUSA");
        assert_eq!(txns[0].name.as_deref(), Some("Vanguard S&P 500"));
        assert_eq!(txns[0].amount(), dec!(1050.00));
        assert_eq!(txns[0].commission_gbp, dec!(5.95));

        assert_eq!(txns[1].action, Action::Dispose);
        assert_eq!(txns[1].currency, "USD");
        assert_eq!(txns[1].fx_rate, dec!(1.2650));
    }

    #[test]
    fn parse_json_transactions_sorted_by_date() {
        let json_data = r#"{
            "transactions": [
                { "date": "2024-06-15", "symbol": "VUSA", "action": "Dispose",
                  "quantity": 10, "unit_price": 12 },
                { "date": "2024-01-15", "symbol": "VUSA", "action": "Acquire",
                  "quantity": 10, "unit_price": 10 }
            ]
        }"#;
        let txns = read_json(json_data.as_bytes()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(txns[0].id, "row-2");
        // GBP defaults
        assert_eq!(txns[0].currency, "GBP");
        assert_eq!(txns[0].fx_rate, dec!(1));
        assert_eq!(txns[0].commission_gbp, dec!(0));
    }

    #[test]
    fn datetime_input_keeps_date_only() {
        assert_eq!(
            parse_date("2024-06-01T14:30:00"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert_eq!(parse_date("junk"), None);
    }

    fn record(quantity: Decimal, currency: &str, fx_rate: Decimal) -> TransactionRecord {
        TransactionRecord {
            id: Some("t1".to_string()),
            date: "2024-06-01".to_string(),
            symbol: "VUSA".to_string(),
            name: None,
            action: "Acquire".to_string(),
            quantity,
            unit_price: dec!(10),
            currency: currency.to_string(),
            fx_rate,
            commission_gbp: dec!(0),
        }
    }

    #[test]
    fn validation_rejects_non_positive_quantity() {
        let err = record(dec!(0), "GBP", dec!(1))
            .into_transaction(1)
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidQuantity { .. }));
    }

    #[test]
    fn validation_rejects_non_positive_rate() {
        let err = record(dec!(1), "USD", dec!(-0.5))
            .into_transaction(1)
            .unwrap_err();
        assert_eq!(
            err,
            CalcError::InvalidRate {
                id: "t1".to_string(),
                rate: dec!(-0.5),
            }
        );
    }

    #[test]
    fn validation_rejects_gbp_with_non_unit_rate() {
        let err = record(dec!(1), "GBP", dec!(1.25))
            .into_transaction(1)
            .unwrap_err();
        assert!(matches!(err, CalcError::GbpRateNotUnity { .. }));
    }

    #[test]
    fn invalid_action_is_rejected() {
        let mut rec = record(dec!(1), "GBP", dec!(1));
        rec.action = "Transfer".to_string();
        let err = rec.into_transaction(1).unwrap_err();
        assert!(matches!(err, CalcError::InvalidAction { .. }));
    }
}
