pub mod cgt;
pub mod disposal;
pub mod matching;
pub mod pool;
pub mod summary;
pub mod uk;

pub use cgt::calculate;
pub use disposal::DisposalEvent;
pub use summary::{aggregate, aggregate_all};
pub use uk::{ExemptAmounts, TaxYear};
