//! Mission-level state machine.

use commander_core::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionState {
    NotStarted,
    Running,
    Done,
    AllPhasesFailed,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionEvent {
    Started,
    /// At least one phase succeeded.
    Completed,
    /// No phase succeeded; `interrupted` if a cancellation reason is set.
    Failed { interrupted: bool },
    /// Cancelled before anything ran.
    Aborted,
}

impl MissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MissionState::Done | MissionState::AllPhasesFailed | MissionState::Interrupted
        )
    }

    pub fn transition(self, event: MissionEvent) -> Result<MissionState> {
        match (self, event) {
            (MissionState::NotStarted, MissionEvent::Started) => Ok(MissionState::Running),
            (MissionState::NotStarted, MissionEvent::Aborted) => Ok(MissionState::Interrupted),
            (MissionState::Running, MissionEvent::Completed) => Ok(MissionState::Done),
            (MissionState::Running, MissionEvent::Failed { interrupted: true }) => {
                Ok(MissionState::Interrupted)
            }
            (MissionState::Running, MissionEvent::Failed { interrupted: false }) => {
                Ok(MissionState::AllPhasesFailed)
            }
            _ => Err(Error::Transition(format!("{self:?} cannot handle {event:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = MissionState::NotStarted
            .transition(MissionEvent::Started)
            .unwrap()
            .transition(MissionEvent::Completed)
            .unwrap();
        assert_eq!(state, MissionState::Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_failure_outcomes() {
        let running = MissionState::Running;
        assert_eq!(
            running.transition(MissionEvent::Failed { interrupted: true }).unwrap(),
            MissionState::Interrupted
        );
        assert_eq!(
            running.transition(MissionEvent::Failed { interrupted: false }).unwrap(),
            MissionState::AllPhasesFailed
        );
        assert_eq!(
            MissionState::NotStarted.transition(MissionEvent::Aborted).unwrap(),
            MissionState::Interrupted
        );
    }

    #[test]
    fn test_terminal_states_reject_events() {
        for state in [MissionState::Done, MissionState::AllPhasesFailed, MissionState::Interrupted] {
            assert!(state.transition(MissionEvent::Started).is_err());
            assert!(state.transition(MissionEvent::Completed).is_err());
        }
        assert!(MissionState::NotStarted.transition(MissionEvent::Completed).is_err());
    }
}
