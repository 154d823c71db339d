//! JSON wire envelopes for both protocol dialects (§6): the bot-facing
//! `/ws` protocol and the spectator/operator-facing `/spectate` protocol.
//! Schema validation and engine-event encoding live here so neither
//! dialect's shape leaks into `hh-hosting`'s transport plumbing.
mod bot;
mod codec;
mod error;
mod spectator;
mod views;

/// Envelope version every frame carries, both directions (§6).
pub const WIRE_VERSION: u8 = 1;

pub use bot::{ClientMessage, ServerMessage, WireEvent};
pub use codec::WireCodec;
pub use error::{ErrorCode, WireError};
pub use spectator::{DeliveryMode, OperatorCommand, Role, SpectatorClientMessage, SpectatorServerMessage};
pub use views::{LobbyPlayer, PlayerView, SeatStack, TableConfig, TableView, WinnerView, YouView};
