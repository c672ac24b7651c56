//! Commander Core — shared types, amounts, configuration, messages, errors.

pub mod amount;
pub mod config;
pub mod error;
pub mod executor;
pub mod messages;
pub mod types;

pub use amount::Wei;
pub use config::{BudgetOverrides, CommanderConfig};
pub use error::{Error, Result};
pub use executor::{ExecutionOutcome, PhaseExecutor, PhaseRequest, QuoteAttempt};
pub use messages::{Locale, MessageId};
pub use types::*;
