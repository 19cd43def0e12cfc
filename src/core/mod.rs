pub mod error;

pub use error::{BrokerError, LedgerCallError, Result};
