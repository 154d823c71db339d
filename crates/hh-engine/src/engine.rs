use crate::action::{Action, LegalActions};
use crate::error::EngineError;
use crate::event::EngineEvent;
use crate::hand_state::{HandState, Phase, PlayerHandState};
use crate::pot;
use crate::seating;
use hh_cards::{Card, CardDeck, HandEvaluator};
use hh_core::{Chips, HandId, Position, Seed};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// The single-hand No-Limit Hold'em state machine. Every method is a pure
/// function of its inputs plus the `&mut HandState` it transitions: no
/// I/O, no clocks, no network — those live in the driver that calls this
/// engine (§5).
pub struct GameEngine;

impl GameEngine {
    /// Starts a hand per §4.3.1. `seats_with_stacks` need not be sorted;
    /// only entries with `stack > 0` are dealt in.
    pub fn start_hand(
        seats_with_stacks: &[(Position, Chips)],
        table_size: usize,
        button_seat: Position,
        seed: Seed,
        sb: Chips,
        bb: Chips,
        hand_id: HandId,
    ) -> Result<(HandState, Vec<EngineEvent>), EngineError> {
        let eligible: BTreeSet<Position> = seats_with_stacks
            .iter()
            .filter(|(_, stack)| *stack > 0)
            .map(|(seat, _)| *seat)
            .collect();
        if eligible.len() < 2 {
            return Err(EngineError::NotEnoughPlayers);
        }

        let (sb_seat, bb_seat) = if eligible.len() == 2 {
            // Heads-up: the button is the small blind.
            let other = seating::next_clockwise(button_seat, table_size, &eligible)
                .expect("two eligible seats");
            (button_seat, other)
        } else {
            let sb_seat = seating::next_clockwise(button_seat, table_size, &eligible)
                .expect("at least two eligible seats");
            let bb_seat = seating::next_clockwise(sb_seat, table_size, &eligible)
                .expect("at least two eligible seats");
            (sb_seat, bb_seat)
        };

        let mut stacks: BTreeMap<Position, Chips> = seats_with_stacks
            .iter()
            .copied()
            .filter(|(seat, _)| eligible.contains(seat))
            .collect();

        let mut deck = CardDeck::shuffle(seed);
        let deal_order = seating::order_from(button_seat, table_size, &eligible);
        let mut holes: BTreeMap<Position, Vec<Card>> =
            deal_order.iter().map(|seat| (*seat, Vec::with_capacity(2))).collect();
        for _ in 0..2 {
            for seat in &deal_order {
                let card = deck.deal().expect("fresh deck covers every hole deal");
                holes.get_mut(seat).expect("seat dealt in").push(card);
            }
        }

        let mut players: BTreeMap<Position, PlayerHandState> = deal_order
            .iter()
            .map(|seat| {
                let hole = holes.remove(seat).expect("hole dealt above");
                (
                    *seat,
                    PlayerHandState {
                        hole: [hole[0], hole[1]],
                        committed_this_street: 0,
                        total_in_pot: 0,
                        has_folded: false,
                        is_all_in: false,
                    },
                )
            })
            .collect();

        let sb_amount = Self::post_blind(&mut stacks, &mut players, sb_seat, sb);
        let bb_amount = Self::post_blind(&mut stacks, &mut players, bb_seat, bb);

        let mut hand = HandState {
            hand_id,
            seed,
            table_size,
            button_seat,
            deck,
            phase: Phase::PreFlop,
            community: Vec::new(),
            players,
            stacks,
            sb,
            bb,
            current_bet: bb,
            min_raise_increment: bb,
            last_aggressor_seat: Some(bb_seat),
            to_act_queue: VecDeque::new(),
            initial_chip_total: 0,
        };
        hand.initial_chip_total = hand.total_chips_in_play();

        // Pre-flop order starts left of BB and wraps back through SB, BB —
        // `order_from` visiting every eligible seat once starting after
        // `bb_seat` produces exactly that, including the heads-up case
        // where it degenerates to `[sb_seat, bb_seat]`.
        let live_not_allin: BTreeSet<Position> = hand
            .players
            .iter()
            .filter(|(_, p)| !p.is_all_in)
            .map(|(seat, _)| *seat)
            .collect();
        hand.to_act_queue = Self::street_queue(bb_seat, table_size, &live_not_allin);

        let mut events = vec![EngineEvent::PostBlinds {
            sb_seat,
            sb_amount,
            bb_seat,
            bb_amount,
        }];
        // Blinds alone can leave fewer than two seats able to act (e.g. both
        // blinds posted all-in) — run the board out immediately rather than
        // leaving a lone seat queued with no one left to act against.
        events.extend(Self::advance_if_settled(&mut hand));
        Ok((hand, events))
    }

    fn post_blind(
        stacks: &mut BTreeMap<Position, Chips>,
        players: &mut BTreeMap<Position, PlayerHandState>,
        seat: Position,
        blind: Chips,
    ) -> Chips {
        let stack = stacks.get_mut(&seat).expect("seat has a stack");
        let amount = blind.min(*stack);
        *stack -= amount;
        let player = players.get_mut(&seat).expect("seat dealt in");
        player.committed_this_street += amount;
        player.total_in_pot += amount;
        if *stack == 0 {
            player.is_all_in = true;
        }
        amount
    }

    /// The seat currently owing action and its legal action set, per
    /// §4.3.2. `None` actor means the street (or hand) has settled.
    pub fn legal_actions(hand: &HandState) -> Result<(Position, LegalActions), EngineError> {
        let seat = hand.current_actor().ok_or(EngineError::NoHandInProgress)?;
        Ok((seat, Self::legal_actions_for(hand, seat)?))
    }

    fn legal_actions_for(hand: &HandState, seat: Position) -> Result<LegalActions, EngineError> {
        let player = hand.players.get(&seat).ok_or(EngineError::NoHandInProgress)?;
        let stack = *hand.stacks.get(&seat).ok_or(EngineError::NoHandInProgress)?;
        let call_amount = (hand.current_bet - player.committed_this_street).clamp(0, stack);
        let min_raise_to =
            (hand.current_bet + hand.min_raise_increment).min(player.committed_this_street + stack);
        let max_raise_to = player.committed_this_street + stack;

        Ok(if call_amount == 0 {
            LegalActions {
                can_fold: true,
                can_check: true,
                can_call: false,
                can_raise: stack > 0,
                call_amount: 0,
                min_raise_to,
                max_raise_to,
            }
        } else {
            LegalActions {
                can_fold: true,
                can_check: false,
                can_call: true,
                can_raise: stack > call_amount,
                call_amount,
                min_raise_to,
                max_raise_to,
            }
        })
    }

    /// Applies one action for the seat currently owing it (§4.3.3),
    /// dealing streets and running payout as far as the resulting state
    /// allows. Never mutates `hand` on rejection.
    pub fn apply_action(
        hand: &mut HandState,
        seat: Position,
        action: Action,
    ) -> Result<Vec<EngineEvent>, EngineError> {
        let actor = hand.current_actor().ok_or(EngineError::NoHandInProgress)?;
        if actor != seat {
            return Err(EngineError::OutOfTurn { expected: actor, got: seat });
        }
        let legal = Self::legal_actions_for(hand, seat)?;
        if !legal.allows(action) {
            return Err(EngineError::IllegalAction(format!(
                "{action} not in legal set for seat {seat}"
            )));
        }

        let mut events = Vec::new();
        match action {
            Action::Fold => {
                hand.players.get_mut(&seat).expect("seat in hand").has_folded = true;
                hand.to_act_queue.pop_front();
                events.push(EngineEvent::Fold { seat });
                if hand.live_seats().len() == 1 {
                    hand.to_act_queue.clear();
                    hand.phase = Phase::Showdown;
                    events.push(Self::payout_walkover(hand));
                    return Ok(events);
                }
            }
            Action::Check => {
                hand.to_act_queue.pop_front();
                events.push(EngineEvent::Check { seat });
            }
            Action::Call => {
                let call_amount = legal.call_amount;
                Self::commit(hand, seat, call_amount);
                hand.to_act_queue.pop_front();
                events.push(EngineEvent::Call { seat, amount: call_amount });
            }
            Action::RaiseTo(amount) => {
                let committed = hand.players[&seat].committed_this_street;
                let delta = amount - committed;
                let previous_bet = hand.current_bet;
                Self::commit(hand, seat, delta);
                hand.to_act_queue.pop_front();
                hand.current_bet = amount;
                let full_raise = amount - previous_bet >= hand.min_raise_increment;
                if full_raise {
                    hand.min_raise_increment = amount - previous_bet;
                    hand.last_aggressor_seat = Some(seat);
                    let reopened: BTreeSet<Position> = hand
                        .players
                        .iter()
                        .filter(|(s, p)| **s != seat && !p.has_folded && !p.is_all_in)
                        .map(|(s, _)| *s)
                        .collect();
                    hand.to_act_queue = seating::order_from(seat, hand.table_size, &reopened)
                        .into_iter()
                        .collect();
                }
                events.push(EngineEvent::Bet { seat, to: amount });
            }
        }

        events.extend(Self::advance_if_settled(hand));

        if hand.total_chips_in_play() != hand.initial_chip_total {
            let reason = format!(
                "chip total drifted from {} to {} during hand {}",
                hand.initial_chip_total,
                hand.total_chips_in_play(),
                hand.hand_id
            );
            log::error!("{reason}");
            return Err(EngineError::InvariantViolation(reason));
        }
        Ok(events)
    }

    /// Folds `seat` out of the hand regardless of whose turn it currently
    /// is, for an operator's `FORFEIT_SEAT` (§4.7, §4.9). A no-op if the
    /// seat already folded or was never dealt into this hand.
    pub fn force_fold(hand: &mut HandState, seat: Position) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        match hand.players.get_mut(&seat) {
            Some(player) if !player.has_folded => player.has_folded = true,
            _ => return events,
        }
        hand.to_act_queue.retain(|s| *s != seat);
        events.push(EngineEvent::Fold { seat });
        if hand.live_seats().len() == 1 {
            hand.to_act_queue.clear();
            hand.phase = Phase::Showdown;
            events.push(Self::payout_walkover(hand));
            return events;
        }
        events.extend(Self::advance_if_settled(hand));
        events
    }

    fn commit(hand: &mut HandState, seat: Position, amount: Chips) {
        let stack = hand.stacks.get_mut(&seat).expect("seat has a stack");
        *stack -= amount;
        let player = hand.players.get_mut(&seat).expect("seat in hand");
        player.committed_this_street += amount;
        player.total_in_pot += amount;
        if *stack == 0 {
            player.is_all_in = true;
        }
    }

    /// The queue an upcoming street (or the hand's first street) should
    /// act through, gated to the "fewer than two non-all-in seats remain"
    /// rule (§4.3.4): with zero or one seat still able to act, there is no
    /// one left to act against, so the queue comes back empty and
    /// `advance_if_settled`'s loop deals straight through to showdown
    /// instead of prompting a lone seat.
    fn street_queue(from: Position, table_size: usize, live_not_allin: &BTreeSet<Position>) -> VecDeque<Position> {
        if live_not_allin.len() < 2 {
            VecDeque::new()
        } else {
            seating::order_from(from, table_size, live_not_allin).into_iter().collect()
        }
    }

    /// Deals streets out (and finally runs payout) for as long as the
    /// street just settled leaves nobody left to act — including the
    /// "runout with no further betting" case when fewer than two
    /// non-all-in seats remain (§4.3.4).
    fn advance_if_settled(hand: &mut HandState) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while hand.to_act_queue.is_empty() && hand.phase != Phase::Showdown {
            events.extend(Self::advance_street(hand));
        }
        if hand.phase == Phase::Showdown {
            events.extend(Self::payout(hand));
        }
        events
    }

    fn advance_street(hand: &mut HandState) -> Option<EngineEvent> {
        for player in hand.players.values_mut() {
            player.committed_this_street = 0;
        }
        hand.current_bet = 0;
        hand.min_raise_increment = hand.bb;
        hand.last_aggressor_seat = None;

        let live_not_allin: BTreeSet<Position> = hand
            .players
            .iter()
            .filter(|(_, p)| !p.has_folded && !p.is_all_in)
            .map(|(seat, _)| *seat)
            .collect();
        hand.to_act_queue = Self::street_queue(hand.button_seat, hand.table_size, &live_not_allin);

        match hand.phase {
            Phase::PreFlop => {
                let cards = [
                    hand.deck.deal().expect("deck has cards for the flop"),
                    hand.deck.deal().expect("deck has cards for the flop"),
                    hand.deck.deal().expect("deck has cards for the flop"),
                ];
                hand.community.extend(cards);
                hand.phase = Phase::Flop;
                Some(EngineEvent::Flop { cards })
            }
            Phase::Flop => {
                let card = hand.deck.deal().expect("deck has a card for the turn");
                hand.community.push(card);
                hand.phase = Phase::Turn;
                Some(EngineEvent::Turn { card })
            }
            Phase::Turn => {
                let card = hand.deck.deal().expect("deck has a card for the river");
                hand.community.push(card);
                hand.phase = Phase::River;
                Some(EngineEvent::River { card })
            }
            Phase::River => {
                hand.phase = Phase::Showdown;
                None
            }
            Phase::Showdown => None,
        }
    }

    fn payout(hand: &mut HandState) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for seat in hand.live_seats() {
            events.push(EngineEvent::Showdown {
                seat,
                hole: hand.players[&seat].hole,
            });
        }

        let contributions: Vec<(Position, Chips, bool)> = hand
            .players
            .iter()
            .map(|(seat, player)| (*seat, player.total_in_pot, player.has_folded))
            .collect();
        let pots = pot::build_pots(&contributions);

        for (index, pot) in pots.iter().enumerate() {
            let winners = Self::winners_of(hand, &pot.eligible);
            let ordered = seating::order_from(
                hand.button_seat,
                hand.table_size,
                &winners.iter().copied().collect(),
            );
            let share = pot.amount / ordered.len() as Chips;
            let remainder = pot.amount - share * ordered.len() as Chips;
            for (rank, seat) in ordered.iter().enumerate() {
                let amount = if rank == 0 { share + remainder } else { share };
                if amount == 0 {
                    continue;
                }
                *hand.stacks.get_mut(seat).expect("winner has a stack") += amount;
                events.push(EngineEvent::PotAward { seat: *seat, amount, pot_index: index });
            }
        }
        // The pot is fully distributed; clear contributions so a
        // post-payout chip-conservation check sees stacks alone.
        for player in hand.players.values_mut() {
            player.total_in_pot = 0;
        }
        events
    }

    fn payout_walkover(hand: &mut HandState) -> EngineEvent {
        let winner = hand.live_seats()[0];
        let amount: Chips = hand.players.values().map(|p| p.total_in_pot).sum();
        *hand.stacks.get_mut(&winner).expect("winner has a stack") += amount;
        for player in hand.players.values_mut() {
            player.total_in_pot = 0;
        }
        EngineEvent::PotAward { seat: winner, amount, pot_index: 0 }
    }

    /// The seats among `eligible` holding the best (possibly tied)
    /// HandEvaluator score.
    fn winners_of(hand: &HandState, eligible: &[Position]) -> Vec<Position> {
        let scored: Vec<(Position, _)> = eligible
            .iter()
            .map(|seat| {
                let mut cards = hand.players[seat].hole.to_vec();
                cards.extend(hand.community.iter().copied());
                (*seat, HandEvaluator::score(&cards))
            })
            .collect();
        let best = scored.iter().map(|(_, score)| score).max().expect("pot has an eligible seat").clone();
        scored
            .into_iter()
            .filter(|(_, score)| *score == best)
            .map(|(seat, _)| seat)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(stacks: &[(Position, Chips)], button: Position, seed: Seed) -> HandState {
        GameEngine::start_hand(stacks, stacks.len(), button, seed, 50, 100, HandId::new("20260727", 1))
            .unwrap()
            .0
    }

    #[test]
    fn heads_up_button_posts_small_blind() {
        let hand = start(&[(0, 10_000), (1, 10_000)], 0, 1);
        assert_eq!(hand.players[&0].committed_this_street, 50);
        assert_eq!(hand.players[&1].committed_this_street, 100);
        assert_eq!(hand.current_actor(), Some(0));
    }

    #[test]
    fn fold_to_win_awards_entire_pot_without_reveal() {
        let mut hand = start(&[(0, 10_000), (1, 10_000), (2, 10_000)], 0, 7);
        // Preflop order after BB wraps: seat 0 (UTG relative to button=0 is seat... )
        let (actor, _legal) = GameEngine::legal_actions(&hand).unwrap();
        let events = GameEngine::apply_action(&mut hand, actor, Action::Fold).unwrap();
        assert!(events.iter().any(|e| matches!(e, EngineEvent::Fold { .. })));
        let (actor2, _legal2) = GameEngine::legal_actions(&hand).unwrap();
        let events2 = GameEngine::apply_action(&mut hand, actor2, Action::Fold).unwrap();
        assert!(events2
            .iter()
            .any(|e| matches!(e, EngineEvent::PotAward { .. })));
        assert!(!events2.iter().any(|e| matches!(e, EngineEvent::Showdown { .. })));
    }

    #[test]
    fn out_of_turn_action_is_rejected_without_mutation() {
        let mut hand = start(&[(0, 10_000), (1, 10_000)], 0, 3);
        let not_actor = if hand.current_actor() == Some(0) { 1 } else { 0 };
        let before = hand.clone();
        let err = GameEngine::apply_action(&mut hand, not_actor, Action::Fold).unwrap_err();
        assert!(matches!(err, EngineError::OutOfTurn { .. }));
        assert_eq!(hand.players, before.players);
    }

    #[test]
    fn short_raise_all_in_does_not_reopen_betting() {
        // Seat 0: 125 stack, seat 1: plenty. BB=100, so seat 0's all-in
        // raise to 125 is a short raise (delta 25 < min_raise_increment 100).
        let mut hand = start(&[(0, 125), (1, 10_000), (2, 10_000)], 0, 11);
        // Drive action around to seat 0 by folding everyone else down to it
        // is unnecessary for this check; instead directly exercise the
        // short-raise rule once it is seat 0's turn.
        while hand.current_actor() != Some(0) {
            let (actor, legal) = GameEngine::legal_actions(&hand).unwrap();
            let action = if legal.can_check { Action::Check } else { Action::Call };
            GameEngine::apply_action(&mut hand, actor, action).unwrap();
        }
        let queue_len_before = hand.to_act_queue.len();
        GameEngine::apply_action(&mut hand, 0, Action::RaiseTo(125)).unwrap();
        assert!(hand.players[&0].is_all_in);
        assert_eq!(hand.min_raise_increment, 100, "short raise must not change the increment");
        assert!(hand.to_act_queue.len() <= queue_len_before);
    }

    #[test]
    fn runs_out_the_board_when_only_one_non_allin_seat_remains() {
        // Seat 0 (button) shoves all-in over the top, seat 1 (SB) calls with
        // plenty of chips behind, seat 2 (BB) folds — leaving seat 1 as the
        // sole non-all-in seat with no one left to act against.
        let mut hand = start(&[(0, 150), (1, 10_000), (2, 10_000)], 0, 13);
        GameEngine::apply_action(&mut hand, 0, Action::RaiseTo(150)).unwrap();
        GameEngine::apply_action(&mut hand, 1, Action::Call).unwrap();
        let events = GameEngine::apply_action(&mut hand, 2, Action::Fold).unwrap();

        assert_eq!(hand.phase, Phase::Showdown, "must run out immediately, not prompt seat 1");
        assert!(hand.to_act_queue.is_empty());
        assert_eq!(hand.community.len(), 5);
        assert!(events.iter().any(|e| matches!(e, EngineEvent::River { .. })));
        assert!(events.iter().any(|e| matches!(e, EngineEvent::PotAward { .. })));
    }

    #[test]
    fn force_fold_removes_a_seat_out_of_turn() {
        let mut hand = start(&[(0, 10_000), (1, 10_000), (2, 10_000)], 0, 5);
        let not_actor = (0..3).find(|s| Some(*s) != hand.current_actor()).unwrap();
        let events = GameEngine::force_fold(&mut hand, not_actor);
        assert!(events.iter().any(|e| matches!(e, EngineEvent::Fold { seat } if *seat == not_actor)));
        assert!(hand.players[&not_actor].has_folded);
        assert!(!hand.to_act_queue.contains(&not_actor));
    }

    #[test]
    fn chip_conservation_holds_after_every_transition() {
        let stacks = [(0, 1_000), (1, 1_000), (2, 1_000)];
        let total: Chips = stacks.iter().map(|(_, s)| s).sum();
        let mut hand = start(&stacks, 0, 21);
        assert_eq!(hand.total_chips_in_play(), total);
        loop {
            let Ok((actor, legal)) = GameEngine::legal_actions(&hand) else { break };
            let action = if legal.can_check { Action::Check } else { Action::Call };
            GameEngine::apply_action(&mut hand, actor, action).unwrap();
            assert_eq!(hand.total_chips_in_play(), total);
            if hand.phase == Phase::Showdown {
                break;
            }
        }
    }
}
