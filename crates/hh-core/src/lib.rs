//! Shared scalar types and process plumbing for the tournament host.
//!
//! Every other crate in the workspace depends on this one for the chip and
//! seat types, the test-support [`Arbitrary`] trait, and the logging /
//! shutdown setup shared by the `hosting` binary.
mod ids;
mod logging;

pub use ids::*;
pub use logging::*;

/// Chip count. Signed so intermediate arithmetic (deltas, pnl) never needs
/// a checked-subtraction dance; stacks and pots themselves are asserted
/// non-negative at the boundaries that produce them.
pub type Chips = i64;

/// Seat index at the table, stable across hands: `0..seats`.
pub type Position = usize;

/// RNG seed published alongside `start_hand`, so a client can replay the
/// deal deterministically.
pub type Seed = u64;

/// Trait for random generation, used only by tests that need an arbitrary
/// instance of a type rather than a hand-picked fixture.
pub trait Arbitrary {
    fn random() -> Self;
}
