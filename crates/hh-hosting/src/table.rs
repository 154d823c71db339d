use std::collections::BTreeMap;

use hh_core::{Chips, Position};
use hh_engine::{
    Action, EngineError, EngineEvent, GameEngine, HandControl, HandState, MatchController,
};
use hh_protocol::{
    DeliveryMode, ErrorCode, LobbyPlayer, OperatorCommand, PlayerView, Role, SeatStack,
    ServerMessage, SpectatorServerMessage, TableConfig, TableView, WinnerView, WireCodec,
    WireEvent, YouView, WIRE_VERSION,
};
use hh_seats::{auto_action, Broadcaster, ClockMode, DecisionClock, SeatRegistry};
use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use crate::config::HostConfig;
use crate::date;
use crate::intent::Intent;
use crate::status::{StatusFlags, StatusTracker};

/// The single-threaded cooperative driver of one table (§4.7, §5): the only
/// place `HandState` is mutated. Transport handlers never touch it — they
/// submit [`Intent`]s over a channel and this loop processes one at a time,
/// matching §5's "transport read paths ... submit intents and do not mutate
/// engine state directly".
pub struct SessionLoop {
    config: HostConfig,
    table_id: String,
    registry: SeatRegistry,
    broadcaster: Broadcaster,
    controller: MatchController,
    hand: Option<HandState>,
    clock: Option<DecisionClock>,
    status: StatusTracker,
    match_over: bool,
}

impl SessionLoop {
    pub fn new(config: HostConfig) -> Self {
        let seats = config.seats;
        let starting_stack = config.starting_stack;
        let hand_control = config.hand_control;
        let mut broadcaster = Broadcaster::new(seats);
        broadcaster.set_presentation(config.presentation_delay());
        Self {
            table_id: uuid::Uuid::new_v4().to_string(),
            registry: SeatRegistry::new(seats, starting_stack),
            broadcaster,
            controller: MatchController::new(seats, 0, date::today_yyyymmdd(), hand_control),
            hand: None,
            clock: None,
            status: StatusTracker::default(),
            match_over: false,
            config,
        }
    }

    /// Drives the table until the match ends or the intent channel closes
    /// (process shutdown). See §4.7 for the per-hand contract this
    /// implements.
    ///
    /// Races a ctrl-c listener of its own alongside `hh_core::init()`'s
    /// process-wide shutdown hook, so a hand in progress gets a chance at a
    /// best-effort `match_end` before the other hook's `process::exit`
    /// tears the process down — a race with no ordering guarantee, hence
    /// "a chance" rather than a guarantee (§11).
    pub async fn run(mut self, mut intents: UnboundedReceiver<Intent>) {
        info!("[table {}] session loop starting", self.table_id);
        loop {
            if self.match_over {
                break;
            }
            if self.ready_to_autostart() {
                self.start_hand().await;
            }
            let clock_wait_ms = self
                .clock
                .as_ref()
                .filter(|c| !c.is_paused())
                .map(|c| c.remaining_ms());
            tokio::select! {
                maybe = intents.recv() => match maybe {
                    Some(intent) => self.handle_intent(intent).await,
                    None => break,
                },
                _ = sleep_or_pending(clock_wait_ms) => self.handle_clock_expiry().await,
                _ = tokio::signal::ctrl_c() => {
                    warn!("[table {}] ctrl-c received, flushing best-effort match_end", self.table_id);
                    if !self.match_over {
                        self.abort_match().await;
                    }
                    break;
                }
            }
        }
        info!("[table {}] session loop exiting", self.table_id);
    }

    fn ready_to_autostart(&self) -> bool {
        self.hand.is_none()
            && self.controller.hand_control() == HandControl::Auto
            && self.live_seat_count() >= 2
    }

    fn live_seat_count(&self) -> usize {
        self.registry.seats().iter().filter(|s| s.stack > 0).count()
    }

    fn current_stacks(&self) -> BTreeMap<Position, Chips> {
        self.registry.seats().iter().map(|s| (s.index, s.stack)).collect()
    }

    // -- intent dispatch -----------------------------------------------

    async fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::BotHello { team, join_code, outbox, reply_to } => {
                self.handle_bot_hello(team, join_code, outbox, reply_to).await;
            }
            Intent::BotAction { seat, hand_id, action, amount } => {
                self.handle_bot_action(seat, hand_id, action, amount).await;
            }
            Intent::BotDisconnect { seat } => self.handle_bot_disconnect(seat).await,
            Intent::SpectatorHello { role, mode: _, outbox } => {
                self.handle_spectator_hello(role, outbox).await;
            }
            Intent::OperatorControl { command, seat, role } => {
                self.handle_operator_command(command, seat, role).await;
            }
        }
    }

    async fn handle_bot_hello(
        &mut self,
        team: String,
        join_code: Option<String>,
        outbox: UnboundedSender<ServerMessage>,
        reply_to: oneshot::Sender<Result<Position, hh_seats::RegistryError>>,
    ) {
        match self.registry.hello(&team, join_code.as_deref()) {
            Ok(outcome) => {
                self.broadcaster.bind_bot(outcome.seat, outbox.clone());
                let welcome = ServerMessage::Welcome {
                    table_id: self.table_id.clone(),
                    seat: outcome.seat,
                    config: TableConfig {
                        variant: "NLHE".to_string(),
                        seats: self.config.seats,
                        starting_stack: self.config.starting_stack,
                        sb: self.config.sb,
                        bb: self.config.bb,
                        move_time_ms: self.config.move_time_ms,
                    },
                    v: WIRE_VERSION,
                };
                self.broadcaster.unicast(outcome.seat, welcome);

                if outcome.reconnected {
                    if let Some(snapshot) = self.build_snapshot(outcome.seat) {
                        self.broadcaster.unicast(outcome.seat, snapshot);
                    }
                    let resume = self
                        .hand
                        .as_ref()
                        .and_then(|hand| GameEngine::legal_actions(hand).ok())
                        .filter(|(seat, _)| *seat == outcome.seat);
                    if let Some((seat, legal)) = resume {
                        if let Some(clock) = self.clock.as_mut() {
                            clock.resume();
                        }
                        self.dispatch_act(seat, &legal);
                    }
                }
                let _ = reply_to.send(Ok(outcome.seat));
                self.broadcast_lobby().await;
            }
            Err(err) => {
                warn!("hello from {team:?} rejected: {err}");
                let _ = reply_to.send(Err(err));
            }
        }
    }

    async fn handle_bot_action(&mut self, seat: Position, hand_id: String, action: String, amount: Option<Chips>) {
        let Some(hand) = self.hand.as_ref() else {
            self.broadcaster
                .unicast(seat, ServerMessage::error(ErrorCode::ActionTooLate, "no hand in progress"));
            return;
        };
        if hand.hand_id.to_string() != hand_id {
            self.broadcaster
                .unicast(seat, ServerMessage::error(ErrorCode::ActionTooLate, "hand_id is stale"));
            return;
        }
        let Ok((actor, legal)) = GameEngine::legal_actions(hand) else {
            self.broadcaster
                .unicast(seat, ServerMessage::error(ErrorCode::ActionTooLate, "hand has settled"));
            return;
        };
        if actor != seat {
            self.broadcaster.unicast(
                seat,
                ServerMessage::error(ErrorCode::OutOfTurn, format!("seat {actor} is owed action, not {seat}")),
            );
            return;
        }
        match WireCodec::decode_action(&action, amount).and_then(|a| WireCodec::validate(a, &legal)) {
            Ok(parsed) => self.apply_and_advance(seat, parsed).await,
            Err(err) => self.broadcaster.unicast(seat, ServerMessage::error(err.code(), err.message())),
        }
    }

    async fn handle_bot_disconnect(&mut self, seat: Position) {
        self.registry.disconnect(seat);
        self.broadcaster.unbind_bot(seat);
        let is_actor = self
            .hand
            .as_ref()
            .and_then(|hand| GameEngine::legal_actions(hand).ok())
            .map(|(actor, _)| actor == seat)
            .unwrap_or(false);
        if is_actor {
            if let Some(clock) = self.clock.as_mut() {
                clock.pause();
            }
        }
        self.broadcast_lobby().await;
    }

    async fn handle_spectator_hello(&mut self, role: Role, outbox: UnboundedSender<SpectatorServerMessage>) {
        match role {
            Role::Spectator => self.broadcaster.add_spectator(outbox.clone()),
            Role::Operator => self.broadcaster.add_operator(outbox.clone()),
        }
        let _ = outbox.send(self.lobby_message_for_spectators());
        if role == Role::Operator {
            let _ = outbox.send(self.status_flags().to_message());
        }
    }

    async fn handle_operator_command(&mut self, command: OperatorCommand, seat: Option<Position>, role: Role) {
        if role != Role::Operator {
            warn!("[table {}] control frame from non-operator connection, dropping", self.table_id);
            return;
        }
        match command {
            OperatorCommand::StartHand => {
                if self.controller.hand_control() == HandControl::Operator
                    && self.hand.is_none()
                    && self.live_seat_count() >= 2
                {
                    self.start_hand().await;
                }
            }
            OperatorCommand::SkipAction => {
                if let Some(hand) = self.hand.as_ref() {
                    if let Ok((seat, legal)) = GameEngine::legal_actions(hand) {
                        let stack = *hand.stacks.get(&seat).unwrap_or(&0);
                        self.apply_and_advance(seat, auto_action(&legal, stack)).await;
                    }
                }
            }
            OperatorCommand::ForfeitSeat => {
                if let Some(seat) = seat {
                    self.forfeit_seat(seat).await;
                }
            }
        }
        self.publish_status().await;
    }

    // -- hand lifecycle --------------------------------------------------

    async fn start_hand(&mut self) {
        let seats_with_stacks: Vec<(Position, Chips)> =
            self.registry.seats().iter().map(|s| (s.index, s.stack)).collect();
        let hand_id = self.controller.next_hand_id();
        let seed: u64 = rand::random();
        let button = self.controller.button_seat();
        match GameEngine::start_hand(&seats_with_stacks, self.config.seats, button, seed, self.config.sb, self.config.bb, hand_id.clone()) {
            Ok((hand, events)) => {
                let stacks: Vec<SeatStack> =
                    hand.stacks.iter().map(|(seat, stack)| SeatStack { seat: *seat, stack: *stack }).collect();
                let hand_id_str = hand_id.to_string();
                self.broadcaster.broadcast_bots(ServerMessage::StartHand {
                    hand_id: hand_id_str.clone(),
                    seed,
                    button,
                    stacks: stacks.clone(),
                    v: WIRE_VERSION,
                });
                self.broadcaster
                    .broadcast_spectators(SpectatorServerMessage::StartHand {
                        hand_id: hand_id_str.clone(),
                        seed,
                        button,
                        stacks,
                        v: WIRE_VERSION,
                    })
                    .await;
                self.hand = Some(hand);
                self.clock = None;
                self.after_transition(hand_id_str, events).await;
            }
            Err(err) => warn!("[table {}] start_hand refused: {err}", self.table_id),
        }
    }

    /// Broadcasts the events from one engine transition, then either
    /// prompts the next actor or, if the hand has reached showdown,
    /// settles it (§4.7 steps e–g).
    async fn after_transition(&mut self, hand_id: String, events: Vec<EngineEvent>) {
        self.broadcast_events(&hand_id, &events).await;
        self.clock = None;
        let next = self.hand.as_ref().and_then(|hand| GameEngine::legal_actions(hand).ok());
        match next {
            Some((seat, legal)) => self.dispatch_act(seat, &legal),
            None => self.finish_hand(hand_id).await,
        }
        self.publish_status().await;
    }

    async fn broadcast_events(&mut self, hand_id: &str, events: &[EngineEvent]) {
        for event in events {
            let wire: WireEvent = event.into();
            self.broadcaster.broadcast_bots(ServerMessage::Event {
                hand_id: hand_id.to_string(),
                event: wire.clone(),
                v: WIRE_VERSION,
            });
            self.broadcaster
                .broadcast_spectators(SpectatorServerMessage::Event { hand_id: hand_id.to_string(), event: wire, v: WIRE_VERSION })
                .await;
        }
    }

    fn dispatch_act(&mut self, seat: Position, legal: &hh_engine::LegalActions) {
        let Some(hand) = self.hand.as_ref() else { return };
        let you = YouView {
            hole: [hand.players[&seat].hole[0].to_string(), hand.players[&seat].hole[1].to_string()],
            stack: *hand.stacks.get(&seat).unwrap_or(&0),
            to_call: legal.call_amount,
            time_ms: self.config.move_time_ms,
        };
        let table = TableView { sb: hand.sb, bb: hand.bb, seats: hand.table_size, button: hand.button_seat };
        let players: Vec<PlayerView> = hand
            .players
            .iter()
            .map(|(s, p)| PlayerView {
                seat: *s,
                stack: *hand.stacks.get(s).unwrap_or(&0),
                has_folded: p.has_folded,
                committed: p.committed_this_street,
            })
            .collect();
        let community: Vec<String> = hand.community.iter().map(|c| c.to_string()).collect();

        let mut clock = DecisionClock::new(ClockMode::PauseOnDisconnect, self.config.move_time());
        clock.start();
        if !self.registry.is_connected(seat) {
            clock.pause();
        }
        self.clock = Some(clock);

        let msg = ServerMessage::Act {
            hand_id: hand.hand_id.to_string(),
            seat,
            phase: format!("{:?}", hand.phase),
            you,
            table,
            players,
            community,
            legal: legal_labels(legal),
            call_amount: legal.call_amount,
            min_raise_to: legal.min_raise_to,
            max_raise_to: legal.max_raise_to,
            v: WIRE_VERSION,
        };
        self.broadcaster.unicast(seat, msg);
    }

    async fn apply_and_advance(&mut self, seat: Position, action: Action) {
        let Some(hand) = self.hand.as_mut() else { return };
        let hand_id = hand.hand_id.to_string();
        match GameEngine::apply_action(hand, seat, action) {
            Ok(events) => {
                self.clock = None;
                self.after_transition(hand_id, events).await;
            }
            Err(err) => {
                warn!("[table {}] seat {seat} action rejected: {err}", self.table_id);
                self.broadcaster.unicast(seat, ServerMessage::error(map_engine_error(&err), err.to_string()));
                if matches!(err, EngineError::InvariantViolation(_)) {
                    self.abort_match().await;
                }
            }
        }
    }

    async fn handle_clock_expiry(&mut self) {
        let expired = self.clock.as_ref().map(|c| c.expired()).unwrap_or(false);
        if !expired {
            return;
        }
        let Some(hand) = self.hand.as_ref() else { return };
        let Ok((seat, legal)) = GameEngine::legal_actions(hand) else { return };
        let stack = *hand.stacks.get(&seat).unwrap_or(&0);
        debug!("[table {}] clock expired for seat {seat}", self.table_id);
        self.apply_and_advance(seat, auto_action(&legal, stack)).await;
    }

    async fn forfeit_seat(&mut self, seat: Position) {
        let in_current_hand = self.hand.as_ref().map(|h| h.players.contains_key(&seat)).unwrap_or(false);
        if in_current_hand {
            let hand = self.hand.as_mut().expect("checked above");
            let hand_id = hand.hand_id.to_string();
            let events = GameEngine::force_fold(hand, seat);
            self.after_transition(hand_id, events).await;
        }
        self.registry.sync_stack(seat, 0);
        if !in_current_hand {
            self.settle_and_check_match_end("").await;
        }
        self.broadcast_lobby().await;
    }

    async fn finish_hand(&mut self, hand_id: String) {
        let Some(hand) = self.hand.take() else { return };
        self.clock = None;
        let stacks: Vec<SeatStack> = hand.stacks.iter().map(|(s, v)| SeatStack { seat: *s, stack: *v }).collect();
        for (seat, stack) in &hand.stacks {
            self.registry.sync_stack(*seat, *stack);
        }
        self.broadcaster.broadcast_bots(ServerMessage::EndHand {
            hand_id: hand_id.clone(),
            stacks: stacks.clone(),
            v: WIRE_VERSION,
        });
        self.broadcaster
            .broadcast_spectators(SpectatorServerMessage::EndHand { hand_id: hand_id.clone(), stacks, v: WIRE_VERSION })
            .await;
        self.controller.rotate_button(&self.current_stacks());
        self.settle_and_check_match_end(&hand_id).await;
    }

    async fn settle_and_check_match_end(&mut self, hand_id: &str) {
        let stacks = self.current_stacks();
        let elimination_events = self.controller.settle_hand(&stacks);
        if !elimination_events.is_empty() {
            self.broadcast_events(hand_id, &elimination_events).await;
        }
        if let Some(winner) = self.controller.match_winner(&stacks) {
            self.emit_match_end(Some(winner)).await;
        }
        self.broadcast_lobby().await;
    }

    async fn abort_match(&mut self) {
        warn!("[table {}] aborting match on internal invariant violation", self.table_id);
        self.hand = None;
        self.clock = None;
        self.emit_match_end(None).await;
    }

    async fn emit_match_end(&mut self, winner_seat: Option<Position>) {
        let winner = winner_seat.map(|seat| WinnerView {
            seat,
            team: self.registry.seat(seat).map(|s| s.team.clone()).unwrap_or_default(),
        });
        let final_stacks: Vec<SeatStack> =
            self.registry.seats().iter().map(|s| SeatStack { seat: s.index, stack: s.stack }).collect();
        self.broadcaster.broadcast_bots(ServerMessage::MatchEnd { winner, final_stacks, v: WIRE_VERSION });
        self.match_over = true;
    }

    // -- views / advisories ----------------------------------------------

    fn build_snapshot(&self, seat: Position) -> Option<ServerMessage> {
        let hand = self.hand.as_ref()?;
        let you = YouView {
            hole: [hand.players[&seat].hole[0].to_string(), hand.players[&seat].hole[1].to_string()],
            stack: *hand.stacks.get(&seat).unwrap_or(&0),
            to_call: GameEngine::legal_actions(hand).ok().filter(|(a, _)| *a == seat).map(|(_, l)| l.call_amount).unwrap_or(0),
            time_ms: self.clock.as_ref().map(|c| c.remaining_ms()).unwrap_or(0),
        };
        let table = TableView { sb: hand.sb, bb: hand.bb, seats: hand.table_size, button: hand.button_seat };
        let players: Vec<PlayerView> = hand
            .players
            .iter()
            .map(|(s, p)| PlayerView {
                seat: *s,
                stack: *hand.stacks.get(s).unwrap_or(&0),
                has_folded: p.has_folded,
                committed: p.committed_this_street,
            })
            .collect();
        Some(ServerMessage::Snapshot {
            hand_id: hand.hand_id.to_string(),
            phase: format!("{:?}", hand.phase),
            you,
            table,
            players,
            community: hand.community.iter().map(|c| c.to_string()).collect(),
            time_ms_remaining: self.clock.as_ref().map(|c| c.remaining_ms()).unwrap_or(0),
            v: WIRE_VERSION,
        })
    }

    fn lobby_players(&self) -> Vec<LobbyPlayer> {
        self.registry
            .seats()
            .iter()
            .map(|s| LobbyPlayer { seat: s.index, team: s.team.clone(), connected: s.connected, stack: s.stack })
            .collect()
    }

    async fn broadcast_lobby(&mut self) {
        let players = self.lobby_players();
        self.broadcaster
            .broadcast_bots(ServerMessage::Lobby { players: players.clone(), v: WIRE_VERSION });
        self.broadcaster
            .broadcast_spectators(SpectatorServerMessage::Lobby { players, v: WIRE_VERSION })
            .await;
    }

    fn lobby_message_for_spectators(&self) -> SpectatorServerMessage {
        SpectatorServerMessage::Lobby { players: self.lobby_players(), v: WIRE_VERSION }
    }

    fn status_flags(&self) -> StatusFlags {
        let players_ready = self.live_seat_count();
        let awaiting_manual_start = self.controller.hand_control() == HandControl::Operator && self.hand.is_none();
        StatusFlags {
            in_hand: self.hand.is_some(),
            awaiting_manual_start,
            manual_start_armed: awaiting_manual_start && players_ready >= 2,
            players_ready,
            can_start: players_ready >= 2,
        }
    }

    async fn publish_status(&mut self) {
        if let Some(message) = self.status.observe(self.status_flags()) {
            self.broadcaster.broadcast_operators(message);
        }
    }
}

fn legal_labels(legal: &hh_engine::LegalActions) -> Vec<String> {
    let mut labels = Vec::new();
    if legal.can_fold {
        labels.push("FOLD".to_string());
    }
    if legal.can_check {
        labels.push("CHECK".to_string());
    }
    if legal.can_call {
        labels.push("CALL".to_string());
    }
    if legal.can_raise {
        labels.push("RAISE_TO".to_string());
    }
    labels
}

fn map_engine_error(err: &EngineError) -> ErrorCode {
    match err {
        EngineError::OutOfTurn { .. } => ErrorCode::OutOfTurn,
        EngineError::IllegalAction(_) => ErrorCode::InvalidAction,
        EngineError::NoHandInProgress | EngineError::NotEnoughPlayers | EngineError::InvariantViolation(_) => {
            ErrorCode::ActionTooLate
        }
    }
}

async fn sleep_or_pending(deadline_ms: Option<u64>) {
    match deadline_ms {
        Some(ms) => tokio::time::sleep(std::time::Duration::from_millis(ms)).await,
        None => futures::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hh_engine::LegalActions;

    #[test]
    fn legal_labels_lists_only_permitted_actions() {
        let legal = LegalActions {
            can_fold: true,
            can_check: false,
            can_call: true,
            can_raise: true,
            call_amount: 20,
            min_raise_to: 40,
            max_raise_to: 500,
        };
        assert_eq!(legal_labels(&legal), vec!["FOLD", "CALL", "RAISE_TO"]);
    }

    #[test]
    fn legal_labels_empty_when_nothing_is_legal() {
        let legal = LegalActions {
            can_fold: false,
            can_check: false,
            can_call: false,
            can_raise: false,
            call_amount: 0,
            min_raise_to: 0,
            max_raise_to: 0,
        };
        assert!(legal_labels(&legal).is_empty());
    }

    #[test]
    fn out_of_turn_maps_to_out_of_turn_code() {
        let err = EngineError::OutOfTurn { expected: 1, got: 2 };
        assert_eq!(map_engine_error(&err), ErrorCode::OutOfTurn);
    }

    #[test]
    fn stale_action_errors_map_to_action_too_late() {
        assert_eq!(map_engine_error(&EngineError::NoHandInProgress), ErrorCode::ActionTooLate);
        assert_eq!(
            map_engine_error(&EngineError::InvariantViolation("drift".to_string())),
            ErrorCode::ActionTooLate
        );
    }
}
