//! Worker marketplace — feedback, reputation, ranking, ranked execution.
//!
//! Turns a feedback log into per-worker reputations, orders candidate
//! workers for a task category, and executes a phase against the best
//! candidate that will quote.

pub mod executor;
pub mod feedback;
pub mod ranker;
pub mod reputation;

pub use executor::{Quote, RankedExecutor, ServiceDirectory, WorkerClient, WorkerResponse};
pub use feedback::{FeedbackEntry, FeedbackLog};
pub use ranker::{RankedService, ServiceRanker};
pub use reputation::ReputationEngine;
