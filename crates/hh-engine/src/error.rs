/// Errors a [`crate::GameEngine`] transition can reject with. Rejection
/// never mutates state (§4.3.3): the caller's `HandState` is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    NotEnoughPlayers,
    NoHandInProgress,
    OutOfTurn { expected: hh_core::Position, got: hh_core::Position },
    IllegalAction(String),
    /// A chip-conservation or other structural invariant failed to hold
    /// after a transition. Fatal: the match aborts (§7).
    InvariantViolation(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EngineError::NotEnoughPlayers => write!(f, "fewer than two eligible seats"),
            EngineError::NoHandInProgress => write!(f, "no hand is in progress"),
            EngineError::OutOfTurn { expected, got } => {
                write!(f, "out of turn: expected seat {expected}, got {got}")
            }
            EngineError::IllegalAction(reason) => write!(f, "illegal action: {reason}"),
            EngineError::InvariantViolation(reason) => {
                write!(f, "invariant violation: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
