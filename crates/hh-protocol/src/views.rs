use hh_core::{Chips, Position};
use serde::Serialize;

/// Process-wide table config echoed in `welcome` (§6).
#[derive(Debug, Clone, Serialize)]
pub struct TableConfig {
    pub variant: String,
    pub seats: usize,
    pub starting_stack: Chips,
    pub sb: Chips,
    pub bb: Chips,
    pub move_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbyPlayer {
    pub seat: Position,
    pub team: String,
    pub connected: bool,
    pub stack: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatStack {
    pub seat: Position,
    pub stack: Chips,
}

/// The acting seat's private view inside an `act` envelope: their own
/// hole cards, stack, and remaining clock.
#[derive(Debug, Clone, Serialize)]
pub struct YouView {
    pub hole: [String; 2],
    pub stack: Chips,
    pub to_call: Chips,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub sb: Chips,
    pub bb: Chips,
    pub seats: usize,
    pub button: Position,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub seat: Position,
    pub stack: Chips,
    pub has_folded: bool,
    pub committed: Chips,
}

#[derive(Debug, Clone, Serialize)]
pub struct WinnerView {
    pub seat: Position,
    pub team: String,
}
