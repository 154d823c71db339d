use hh_cards::{Card, CardDeck};
use hh_core::{Chips, HandId, Position, Seed};
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

/// Per-seat state scoped to the hand in progress. Discarded along with the
/// rest of `HandState` once payout completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHandState {
    pub hole: [Card; 2],
    pub committed_this_street: Chips,
    pub total_in_pot: Chips,
    pub has_folded: bool,
    pub is_all_in: bool,
}

/// One hand's complete mutable state, owned exclusively by the
/// [`crate::SessionLoop`] equivalent driving it and mutated only through
/// [`crate::GameEngine`] transitions.
#[derive(Debug, Clone)]
pub struct HandState {
    pub hand_id: HandId,
    pub seed: Seed,
    pub table_size: usize,
    pub button_seat: Position,
    pub deck: CardDeck,
    pub phase: Phase,
    pub community: Vec<Card>,
    pub players: BTreeMap<Position, PlayerHandState>,
    /// Stacks still chips-in-hand for each seat dealt into this hand;
    /// drained by commits, credited back at payout.
    pub stacks: BTreeMap<Position, Chips>,
    pub sb: Chips,
    pub bb: Chips,
    pub current_bet: Chips,
    pub min_raise_increment: Chips,
    pub last_aggressor_seat: Option<Position>,
    pub to_act_queue: VecDeque<Position>,
    /// Total chips in play at hand start, checked against
    /// [`HandState::total_chips_in_play`] after every transition (§3
    /// invariant 1, §7 internal invariant violation handling).
    pub initial_chip_total: Chips,
}

impl HandState {
    pub fn live_seats(&self) -> Vec<Position> {
        self.players
            .iter()
            .filter(|(_, p)| !p.has_folded)
            .map(|(seat, _)| *seat)
            .collect()
    }

    pub fn current_actor(&self) -> Option<Position> {
        self.to_act_queue.front().copied()
    }

    /// Chip-conservation check (§3 invariant 1), scoped to this hand:
    /// every chip dealt in is either still in a stack or committed.
    pub fn total_chips_in_play(&self) -> Chips {
        let stacks: Chips = self.stacks.values().sum();
        let committed: Chips = self.players.values().map(|p| p.total_in_pot).sum();
        stacks + committed
    }
}
