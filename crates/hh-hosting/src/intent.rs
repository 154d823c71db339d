use hh_core::{Chips, Position};
use hh_protocol::{DeliveryMode, OperatorCommand, Role, ServerMessage, SpectatorServerMessage};
use hh_seats::RegistryError;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Everything a transport connection can ask of the table, submitted over a
/// single channel into the [`crate::table::SessionLoop`] so all engine
/// mutation happens from one context (§5's shared-resource policy: "transport
/// read paths ... submit intents and do not mutate engine state directly").
pub enum Intent {
    BotHello {
        team: String,
        join_code: Option<String>,
        outbox: UnboundedSender<ServerMessage>,
        reply_to: oneshot::Sender<Result<Position, RegistryError>>,
    },
    BotAction {
        seat: Position,
        hand_id: String,
        action: String,
        amount: Option<Chips>,
    },
    BotDisconnect {
        seat: Position,
    },
    SpectatorHello {
        role: Role,
        mode: Option<DeliveryMode>,
        outbox: UnboundedSender<SpectatorServerMessage>,
    },
    OperatorControl {
        command: OperatorCommand,
        seat: Option<Position>,
        role: Role,
    },
}
