use rust_decimal::Decimal;

/// Errors raised while calculating disposals.
///
/// `InvalidRate`, `GbpRateNotUnity` and `InvalidQuantity` are input
/// validation failures; `Overdisposal` is a data error in the supplied
/// transactions. `InsufficientPool` indicates the match engine sequenced
/// pool operations incorrectly and is never expected for valid input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("invalid fx rate {rate} on transaction {id}: rate must be positive")]
    InvalidRate { id: String, rate: Decimal },
    #[error("transaction {id} is denominated in GBP but has fx rate {rate}")]
    GbpRateNotUnity { id: String, rate: Decimal },
    #[error("invalid quantity {quantity} on transaction {id}: quantity must be positive")]
    InvalidQuantity { id: String, quantity: Decimal },
    #[error("invalid date '{value}' on transaction {id}")]
    InvalidDate { id: String, value: String },
    #[error("invalid action '{value}' on transaction {id}: expected Acquire or Dispose")]
    InvalidAction { id: String, value: String },
    #[error("overdisposal of {symbol}: disposal {id} exceeds available shares by {shortfall}")]
    Overdisposal {
        symbol: String,
        id: String,
        shortfall: Decimal,
    },
    #[error("section 104 pool underflow for {symbol}: requested {requested}, held {held}")]
    InsufficientPool {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },
}
