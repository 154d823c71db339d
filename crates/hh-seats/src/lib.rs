//! Seat identity (§4.5), per-turn decision clocks (§4.6), and the
//! public/private broadcast fan-out (§4.8) that `hh-hosting`'s
//! `SessionLoop` wires together over a single table's connections.
mod broadcaster;
mod clock;
mod error;
mod registry;

pub use broadcaster::Broadcaster;
pub use clock::{auto_action, ClockMode, DecisionClock};
pub use error::RegistryError;
pub use registry::{ConnectionId, HelloOutcome, Seat, SeatRegistry};
