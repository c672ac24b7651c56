//! Commander runtime — drives a mission through budgeted, delegated phases.
//!
//! A planner hires workers one phase at a time through the `hire_agent`
//! tool. Each phase is gated by the budget ledger, raced against a deadline
//! and a cancellation signal, and settled into the ledger before the next
//! one may start.

pub mod cancel;
pub mod ledger;
pub mod orchestrator;
pub mod race;
pub mod state;
pub mod text;
pub mod tool;
pub mod trace;
pub mod types;

pub use cancel::CancelSignal;
pub use ledger::{BlockReason, Budget, SpendOutcome, StopReason};
pub use orchestrator::{Commander, MissionSession, Planner};
pub use race::race_phase;
pub use state::MissionState;
pub use tool::{HirePhase, HireRequest, HireResponse, PhaseSummary};
pub use trace::{RecordingSink, TraceEvent, TraceSink, TracingSink};
pub use types::{MissionBrief, MissionReport, RuntimeState};
