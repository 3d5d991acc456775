//! Orchestrator state machine states.
//!
//! ```text
//! Init → Dispatched → Synthesized → [DebateRound(n) → Dispatched → Synthesized]* → Done
//! ```
//!
//! Any state may move to `Done`. [`OrchestratorState::can_transition_to`]
//! encodes the allowed edges so the use case can assert it never skips one.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "round", rename_all = "snake_case")]
pub enum OrchestratorState {
    Init,
    Dispatched,
    Synthesized,
    DebateRound(usize),
    Done,
}

impl OrchestratorState {
    pub fn can_transition_to(&self, next: &OrchestratorState) -> bool {
        use OrchestratorState::*;
        match (self, next) {
            (Done, _) => false,
            (_, Done) => true,
            (Init, Dispatched) => true,
            (Dispatched, Synthesized) => true,
            (Synthesized, DebateRound(_)) => true,
            (DebateRound(_), Dispatched) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestratorState::Done)
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorState::Init => write!(f, "init"),
            OrchestratorState::Dispatched => write!(f, "dispatched"),
            OrchestratorState::Synthesized => write!(f, "synthesized"),
            OrchestratorState::DebateRound(n) => write!(f, "debate_round({})", n),
            OrchestratorState::Done => write!(f, "done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrchestratorState::*;

    #[test]
    fn test_happy_path_edges() {
        assert!(Init.can_transition_to(&Dispatched));
        assert!(Dispatched.can_transition_to(&Synthesized));
        assert!(Synthesized.can_transition_to(&DebateRound(1)));
        assert!(DebateRound(1).can_transition_to(&Dispatched));
        assert!(Synthesized.can_transition_to(&Done));
    }

    #[test]
    fn test_any_state_can_finish() {
        for state in [Init, Dispatched, Synthesized, DebateRound(2)] {
            assert!(state.can_transition_to(&Done));
        }
    }

    #[test]
    fn test_illegal_edges() {
        assert!(!Init.can_transition_to(&Synthesized));
        assert!(!Dispatched.can_transition_to(&DebateRound(1)));
        assert!(!Done.can_transition_to(&Init));
        assert!(!Done.can_transition_to(&Done));
    }

    #[test]
    fn test_display() {
        assert_eq!(DebateRound(3).to_string(), "debate_round(3)");
        assert!(Done.is_terminal());
    }
}
