//! The single-hand NLHE state machine and the multi-hand controller above
//! it. `GameEngine` is kept free of I/O, timers, and connection state — it
//! transitions a `HandState` and returns the events that transition
//! produced; everything else lives in `hh-seats`/`hh-hosting`.
mod action;
mod engine;
mod error;
mod event;
mod hand_state;
mod match_controller;
mod pot;
mod seating;

pub use action::{Action, LegalActions};
pub use engine::GameEngine;
pub use error::EngineError;
pub use event::EngineEvent;
pub use hand_state::{HandState, Phase, PlayerHandState};
pub use match_controller::{HandControl, MatchController};
pub use pot::{build_pots, Pot};
