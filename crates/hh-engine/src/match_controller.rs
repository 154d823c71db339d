use crate::event::EngineEvent;
use crate::seating;
use hh_core::{Chips, HandId, Position};
use std::collections::{BTreeMap, BTreeSet};

/// Who may start the next hand: the engine itself as soon as the table is
/// ready, or a privileged operator connection (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandControl {
    Auto,
    Operator,
}

/// Multi-hand orchestration above [`crate::GameEngine`]: button rotation,
/// elimination tracking, `hand_id` minting, and match-end detection
/// (§4.4). Holds no `HandState` itself — the driver owns that — only the
/// state that persists *across* hands.
#[derive(Debug, Clone)]
pub struct MatchController {
    table_size: usize,
    button_seat: Position,
    hand_sequence: u64,
    match_date: String,
    hand_control: HandControl,
    eliminated: BTreeSet<Position>,
}

impl MatchController {
    /// `match_date` is the `yyyymmdd` stamp embedded in every `hand_id`
    /// minted this match; the caller supplies it so this type stays a
    /// pure function of its inputs rather than reading the wall clock.
    pub fn new(
        table_size: usize,
        starting_button: Position,
        match_date: impl Into<String>,
        hand_control: HandControl,
    ) -> Self {
        Self {
            table_size,
            button_seat: starting_button,
            hand_sequence: 0,
            match_date: match_date.into(),
            hand_control,
            eliminated: BTreeSet::new(),
        }
    }

    pub fn hand_control(&self) -> HandControl {
        self.hand_control
    }

    pub fn button_seat(&self) -> Position {
        self.button_seat
    }

    /// Mints the next monotonic `hand_id` and advances the sequence.
    pub fn next_hand_id(&mut self) -> HandId {
        self.hand_sequence += 1;
        HandId::new(&self.match_date, self.hand_sequence)
    }

    /// Rotates the button to the next eligible (`stack > 0`) seat
    /// clockwise, called once a hand concludes and stacks are final.
    pub fn rotate_button(&mut self, stacks: &BTreeMap<Position, Chips>) {
        let eligible: BTreeSet<Position> = stacks
            .iter()
            .filter(|(_, stack)| **stack > 0)
            .map(|(seat, _)| *seat)
            .collect();
        if let Some(next) = seating::next_clockwise(self.button_seat, self.table_size, &eligible) {
            self.button_seat = next;
        }
    }

    /// Emits `ELIMINATED` for every seat newly at zero stack this hand
    /// (§3 invariant 7: the seat index survives, future play does not).
    pub fn settle_hand(&mut self, stacks: &BTreeMap<Position, Chips>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for (seat, stack) in stacks {
            if *stack == 0 && self.eliminated.insert(*seat) {
                events.push(EngineEvent::Eliminated { seat: *seat });
            }
        }
        events
    }

    /// `Some(seat)` once exactly one seat among every seat ever seated
    /// still holds chips; a disconnected seat with chips still counts.
    pub fn match_winner(&self, stacks: &BTreeMap<Position, Chips>) -> Option<Position> {
        let mut alive = stacks.iter().filter(|(_, stack)| **stack > 0);
        let winner = alive.next()?;
        if alive.next().is_some() {
            None
        } else {
            Some(*winner.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_ids_are_monotonic_within_a_match() {
        let mut mc = MatchController::new(4, 0, "20260727", HandControl::Auto);
        assert_eq!(mc.next_hand_id().to_string(), "H-20260727-000001");
        assert_eq!(mc.next_hand_id().to_string(), "H-20260727-000002");
    }

    #[test]
    fn button_rotates_to_next_eligible_seat() {
        let mut mc = MatchController::new(4, 0, "20260727", HandControl::Auto);
        let stacks = BTreeMap::from([(0, 100), (1, 0), (2, 100), (3, 100)]);
        mc.rotate_button(&stacks);
        assert_eq!(mc.button_seat(), 2);
    }

    #[test]
    fn eliminated_seat_reported_once() {
        let mut mc = MatchController::new(3, 0, "20260727", HandControl::Auto);
        let stacks = BTreeMap::from([(0, 0), (1, 100), (2, 100)]);
        let first = mc.settle_hand(&stacks);
        assert_eq!(first.len(), 1);
        let second = mc.settle_hand(&stacks);
        assert!(second.is_empty(), "already-eliminated seat must not repeat");
    }

    #[test]
    fn match_winner_is_none_until_one_seat_remains() {
        let mc = MatchController::new(3, 0, "20260727", HandControl::Auto);
        let still_playing = BTreeMap::from([(0, 100), (1, 100), (2, 0)]);
        assert_eq!(mc.match_winner(&still_playing), None);
        let decided = BTreeMap::from([(0, 300), (1, 0), (2, 0)]);
        assert_eq!(mc.match_winner(&decided), Some(0));
    }
}
