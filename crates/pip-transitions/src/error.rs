use std::result::Result as StdResult;

use pip_ids::{ContainerToken, TransitionHandle};
use thiserror::Error;

use crate::PipState;

/// Convenient result type for the transitions crate.
pub type Result<T> = StdResult<T, Error>;

/// Reasons a scheduler request or transition callback was not acted on.
///
/// None of these escape the public scheduling API: expected conditions are
/// logged at debug level and programming-error-class ones at warn level, and
/// the caller sees a `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No task is in picture-in-picture.
    #[error("no task is in picture-in-picture")]
    NoPipTask,

    /// The pinned task leash has not been recorded.
    #[error("pinned task leash is missing")]
    MissingLeash,

    /// The ready transition carries no change for the PiP container.
    #[error("transition has no change for {token}")]
    ChangeNotFound {
        /// Container searched for.
        token: ContainerToken,
    },

    /// Another transition is already active.
    #[error("another transition is active ({state})")]
    TransitionBusy {
        /// State at the time of the request.
        state: PipState,
    },

    /// A PiP instance is already live.
    #[error("already in picture-in-picture ({state})")]
    AlreadyInPip {
        /// State at the time of the request.
        state: PipState,
    },

    /// PiP is not live.
    #[error("not in picture-in-picture ({state})")]
    NotInPip {
        /// State at the time of the request.
        state: PipState,
    },

    /// The handle was never submitted by this scheduler or already finished.
    #[error("unknown transition {0}")]
    UnknownTransition(TransitionHandle),
}

impl Error {
    /// True for conditions that indicate a bug or a collaborator contract
    /// violation rather than an expected race.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::MissingLeash | Self::ChangeNotFound { .. })
    }
}
