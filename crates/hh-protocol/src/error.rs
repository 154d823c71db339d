use serde::Serialize;

/// Error codes carried on an `error` envelope (§6, §7). Spelled exactly as
/// the wire constants so clients can match on the string directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "BAD_SCHEMA")]
    BadSchema,
    #[serde(rename = "TEAM_TAKEN")]
    TeamTaken,
    #[serde(rename = "TEAM_UNKNOWN")]
    TeamUnknown,
    #[serde(rename = "TABLE_FULL")]
    TableFull,
    #[serde(rename = "INVALID_ACTION")]
    InvalidAction,
    #[serde(rename = "OUT_OF_TURN")]
    OutOfTurn,
    #[serde(rename = "ACTION_TOO_LATE")]
    ActionTooLate,
}

/// Failure modes of the wire layer itself — decoding or validating a
/// frame before it ever reaches the engine. Distinct from
/// [`hh_engine::EngineError`], which is a rejection by the rules of the
/// game rather than by the shape of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    BadSchema(String),
    UnknownCode(ErrorCode, String),
}

impl WireError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WireError::BadSchema(_) => ErrorCode::BadSchema,
            WireError::UnknownCode(code, _) => *code,
        }
    }
    pub fn message(&self) -> &str {
        match self {
            WireError::BadSchema(msg) | WireError::UnknownCode(_, msg) => msg,
        }
    }
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code(), self.message())
    }
}

impl std::error::Error for WireError {}
