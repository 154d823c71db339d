use crate::bot::WireEvent;
use crate::views::{LobbyPlayer, PlayerView, SeatStack, TableView};
use crate::WIRE_VERSION;
use hh_core::{Position, Seed};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Spectator,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Live,
    Presentation,
}

/// Control commands an operator connection may issue (§4.9). Invalid for
/// the current match state are silently dropped by the caller, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorCommand {
    StartHand,
    SkipAction,
    ForfeitSeat,
}

/// Frames a spectator or operator connection may send over `/spectate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpectatorClientMessage {
    Hello {
        role: Role,
        control: Option<String>,
        mode: Option<DeliveryMode>,
        v: u8,
    },
    Control {
        command: OperatorCommand,
        seat: Option<Position>,
        v: u8,
    },
}

/// Frames the core sends on `/spectate` (§4.8–4.9). Carries only public
/// information — no private hole cards outside of a `SHOWDOWN` reveal.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SpectatorServerMessage {
    #[serde(rename = "spectator/lobby")]
    Lobby { players: Vec<LobbyPlayer>, v: u8 },
    #[serde(rename = "spectator/start_hand")]
    StartHand {
        hand_id: String,
        seed: Seed,
        button: Position,
        stacks: Vec<SeatStack>,
        v: u8,
    },
    #[serde(rename = "spectator/event")]
    Event {
        hand_id: String,
        #[serde(flatten)]
        event: WireEvent,
        v: u8,
    },
    #[serde(rename = "spectator/end_hand")]
    EndHand { hand_id: String, stacks: Vec<SeatStack>, v: u8 },
    #[serde(rename = "spectator/snapshot")]
    Snapshot {
        hand_id: String,
        phase: String,
        table: TableView,
        players: Vec<PlayerView>,
        community: Vec<String>,
        v: u8,
    },
    /// Broadcast to operator connections whenever any advisory flag
    /// changes (§4.9).
    #[serde(rename = "spectator/status")]
    Status {
        in_hand: bool,
        awaiting_manual_start: bool,
        manual_start_armed: bool,
        players_ready: usize,
        can_start: bool,
        v: u8,
    },
}

impl SpectatorServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("spectator message always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_slash_qualified_type_tag() {
        let msg = SpectatorServerMessage::Status {
            in_hand: true,
            awaiting_manual_start: false,
            manual_start_armed: false,
            players_ready: 3,
            can_start: true,
            v: WIRE_VERSION,
        };
        assert!(msg.to_json().contains(r#""type":"spectator/status""#));
    }

    #[test]
    fn hello_decodes_operator_with_presentation_mode() {
        let msg: SpectatorClientMessage = serde_json::from_str(
            r#"{"type":"hello","role":"operator","control":"secret","mode":"presentation","v":1}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            SpectatorClientMessage::Hello { role: Role::Operator, mode: Some(DeliveryMode::Presentation), .. }
        ));
    }
}
