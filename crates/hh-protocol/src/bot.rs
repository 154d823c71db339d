use crate::error::ErrorCode;
use crate::views::{LobbyPlayer, PlayerView, SeatStack, TableConfig, TableView, WinnerView, YouView};
use crate::WIRE_VERSION;
use hh_core::{Chips, Position, Seed};
use serde::{Deserialize, Serialize};

/// Frames a bot connection may send over `/ws`. `hello` must be first;
/// the registry rejects anything else before it (§4.5).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        team: String,
        join_code: Option<String>,
        v: u8,
    },
    Action {
        hand_id: String,
        action: String,
        amount: Option<Chips>,
        v: u8,
    },
}

/// One public engine event, reshaped for the wire: cards become their
/// two-character labels rather than the internal bitset/enum types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "ev", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireEvent {
    PostBlinds {
        sb_seat: Position,
        sb_amount: Chips,
        bb_seat: Position,
        bb_amount: Chips,
    },
    Bet {
        seat: Position,
        to: Chips,
    },
    Call {
        seat: Position,
        amount: Chips,
    },
    Check {
        seat: Position,
    },
    Fold {
        seat: Position,
    },
    Flop {
        cards: [String; 3],
    },
    Turn {
        card: String,
    },
    River {
        card: String,
    },
    Showdown {
        seat: Position,
        hole: [String; 2],
    },
    PotAward {
        seat: Position,
        amount: Chips,
        pot_index: usize,
    },
    Eliminated {
        seat: Position,
    },
}

impl From<&hh_engine::EngineEvent> for WireEvent {
    fn from(event: &hh_engine::EngineEvent) -> Self {
        use hh_engine::EngineEvent as E;
        match event {
            E::PostBlinds { sb_seat, sb_amount, bb_seat, bb_amount } => WireEvent::PostBlinds {
                sb_seat: *sb_seat,
                sb_amount: *sb_amount,
                bb_seat: *bb_seat,
                bb_amount: *bb_amount,
            },
            E::Bet { seat, to } => WireEvent::Bet { seat: *seat, to: *to },
            E::Call { seat, amount } => WireEvent::Call { seat: *seat, amount: *amount },
            E::Check { seat } => WireEvent::Check { seat: *seat },
            E::Fold { seat } => WireEvent::Fold { seat: *seat },
            E::Flop { cards } => WireEvent::Flop {
                cards: [cards[0].to_string(), cards[1].to_string(), cards[2].to_string()],
            },
            E::Turn { card } => WireEvent::Turn { card: card.to_string() },
            E::River { card } => WireEvent::River { card: card.to_string() },
            E::Showdown { seat, hole } => WireEvent::Showdown {
                seat: *seat,
                hole: [hole[0].to_string(), hole[1].to_string()],
            },
            E::PotAward { seat, amount, pot_index } => WireEvent::PotAward {
                seat: *seat,
                amount: *amount,
                pot_index: *pot_index,
            },
            E::Eliminated { seat } => WireEvent::Eliminated { seat: *seat },
        }
    }
}

/// Frames the core sends a bot over `/ws` (§6).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        table_id: String,
        seat: Position,
        config: TableConfig,
        v: u8,
    },
    Lobby {
        players: Vec<LobbyPlayer>,
        v: u8,
    },
    StartHand {
        hand_id: String,
        seed: Seed,
        button: Position,
        stacks: Vec<SeatStack>,
        v: u8,
    },
    /// Private: sent only to the acting seat's bound connection.
    Act {
        hand_id: String,
        seat: Position,
        phase: String,
        you: YouView,
        table: TableView,
        players: Vec<PlayerView>,
        community: Vec<String>,
        legal: Vec<String>,
        call_amount: Chips,
        min_raise_to: Chips,
        max_raise_to: Chips,
        v: u8,
    },
    #[serde(rename = "event")]
    Event {
        hand_id: String,
        #[serde(flatten)]
        event: WireEvent,
        v: u8,
    },
    EndHand {
        hand_id: String,
        stacks: Vec<SeatStack>,
        v: u8,
    },
    /// Private: sent on reconnect, includes the seat's own hole cards.
    Snapshot {
        hand_id: String,
        phase: String,
        you: YouView,
        table: TableView,
        players: Vec<PlayerView>,
        community: Vec<String>,
        time_ms_remaining: u64,
        v: u8,
    },
    /// `winner` is `None` when the match was aborted by an internal
    /// invariant violation rather than settled by play (§7, §10.3).
    MatchEnd {
        winner: Option<WinnerView>,
        final_stacks: Vec<SeatStack>,
        v: u8,
    },
    Error {
        code: ErrorCode,
        msg: String,
        v: u8,
    },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, msg: impl Into<String>) -> Self {
        ServerMessage::Error { code, msg: msg.into(), v: WIRE_VERSION }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server message always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_requires_version_field() {
        let err = serde_json::from_str::<ClientMessage>(
            r#"{"type":"hello","team":"alpha"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("v"));
    }

    #[test]
    fn action_decodes_with_optional_amount() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"action","hand_id":"H-20260727-000001","action":"FOLD","v":1}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::Action { amount: None, .. }));
    }

    #[test]
    fn event_envelope_flattens_the_inner_tag() {
        let wire = ServerMessage::Event {
            hand_id: "H-20260727-000001".to_string(),
            event: WireEvent::Check { seat: 2 },
            v: WIRE_VERSION,
        };
        let json = wire.to_json();
        assert!(json.contains(r#""type":"event""#));
        assert!(json.contains(r#""ev":"CHECK""#));
        assert!(json.contains(r#""seat":2"#));
        assert!(json.contains(r#""v":1"#));
    }
}
