use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelAction {
    Add,
    Spin,
    Finish,
    Reset,
}

impl std::fmt::Display for WheelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WheelAction::Add => "add",
            WheelAction::Spin => "spin",
            WheelAction::Finish => "finish",
            WheelAction::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Every failure the picker can hit. None of them are fatal: callers log and
/// carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("failed to load roster: {0}")]
    FetchFailure(String),
    #[error("wheel is full ({capacity} segments)")]
    CapacityExceeded { capacity: usize },
    #[error("'{name}' is already on the wheel")]
    DuplicateCandidate { name: String },
    #[error("'{name}' is not in the roster")]
    UnknownCandidate { name: String },
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: SessionState,
        action: WheelAction,
    },
    #[error("spin {ticket} was cancelled before it finished")]
    CancelledSpin { ticket: u64 },
}

impl PickerError {
    pub fn invalid(state: SessionState, action: WheelAction) -> Self {
        Self::InvalidTransition { state, action }
    }

    /// Rejections the UI should swallow without any feedback.
    pub fn is_silent(&self) -> bool {
        !matches!(self, PickerError::FetchFailure(_))
    }
}
