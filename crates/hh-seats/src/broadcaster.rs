use std::time::Duration;

use hh_core::Position;
use hh_protocol::{ServerMessage, SpectatorServerMessage, WIRE_VERSION};
use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

/// Fan-out of core output to every connected recipient (§4.8), adapted from
/// the teacher's `Table::unicast`/`broadcast`: one mailbox per bot seat,
/// plus an arbitrary number of spectator mailboxes with no seat binding.
/// Public events reach every bot and every spectator; private `act`/
/// `snapshot` payloads reach only the target seat's bound connection.
pub struct Broadcaster {
    bots: Vec<Option<UnboundedSender<ServerMessage>>>,
    spectators: Vec<UnboundedSender<SpectatorServerMessage>>,
    /// Operator connections are tracked apart from plain spectators: §4.8
    /// is explicit that operator delivery is never paced, even while
    /// presentation mode delays everyone else.
    operators: Vec<UnboundedSender<SpectatorServerMessage>>,
    presentation_delay: Option<Duration>,
    next_release: Option<Instant>,
}

impl Broadcaster {
    pub fn new(seats: usize) -> Self {
        Self {
            bots: vec![None; seats],
            spectators: Vec::new(),
            operators: Vec::new(),
            presentation_delay: None,
            next_release: None,
        }
    }

    pub fn bind_bot(&mut self, seat: Position, sender: UnboundedSender<ServerMessage>) {
        if let Some(slot) = self.bots.get_mut(seat) {
            *slot = Some(sender);
        }
    }

    pub fn unbind_bot(&mut self, seat: Position) {
        if let Some(slot) = self.bots.get_mut(seat) {
            *slot = None;
        }
    }

    pub fn add_spectator(&mut self, sender: UnboundedSender<SpectatorServerMessage>) {
        self.spectators.push(sender);
    }

    pub fn add_operator(&mut self, sender: UnboundedSender<SpectatorServerMessage>) {
        self.operators.push(sender);
    }

    /// Sends a `spectator/status` advisory (§4.9) to every operator
    /// connection, bypassing presentation-mode pacing entirely.
    pub fn broadcast_operators(&self, message: SpectatorServerMessage) {
        for sender in &self.operators {
            let _ = sender.send(message.clone());
        }
    }

    pub fn connected_bots(&self) -> usize {
        self.bots.iter().filter(|s| s.is_some()).count()
    }

    /// Enables or disables presentation-mode pacing for spectator delivery
    /// (§4.8). Passing `None` returns to immediate live delivery.
    pub fn set_presentation(&mut self, delay: Option<Duration>) {
        self.presentation_delay = delay;
        self.next_release = None;
    }

    /// Sends a private envelope to exactly one seat's bound connection.
    pub fn unicast(&self, seat: Position, message: ServerMessage) {
        match self.bots.get(seat).and_then(|s| s.as_ref()) {
            Some(sender) => {
                if sender.send(message).is_err() {
                    warn!("seat {seat} mailbox closed, dropping unicast");
                }
            }
            None => debug!("seat {seat} has no bound connection, dropping unicast"),
        }
    }

    /// Sends a public envelope to every connected bot.
    pub fn broadcast_bots(&self, message: ServerMessage) {
        for (seat, sender) in self.bots.iter().enumerate() {
            if let Some(sender) = sender {
                if sender.send(message.clone()).is_err() {
                    warn!("seat {seat} mailbox closed, dropping broadcast");
                }
            }
        }
    }

    /// Sends a public envelope to every spectator connection, pacing it
    /// through the presentation-mode FIFO when enabled. Callers must invoke
    /// this once per event in production order — pacing is implemented as
    /// an inter-call delay relative to the previous release, not relative
    /// to wall-clock event production time, which is what keeps order and
    /// spacing correct without a background task or shared queue.
    pub async fn broadcast_spectators(&mut self, message: SpectatorServerMessage) {
        if let Some(delay) = self.presentation_delay {
            let now = Instant::now();
            let release = self.next_release.map(|t| t.max(now)).unwrap_or(now) + delay;
            tokio::time::sleep_until(release).await;
            self.next_release = Some(release);
        }
        for sender in &self.spectators {
            let _ = sender.send(message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hh_protocol::ErrorCode;

    #[test]
    fn unicast_to_unbound_seat_does_not_panic() {
        let broadcaster = Broadcaster::new(2);
        broadcaster.unicast(0, ServerMessage::error(ErrorCode::InvalidAction, "no one home"));
    }

    #[test]
    fn broadcast_reaches_every_bound_seat() {
        let mut broadcaster = Broadcaster::new(2);
        let (tx0, mut rx0) = tokio::sync::mpsc::unbounded_channel();
        let (tx1, mut rx1) = tokio::sync::mpsc::unbounded_channel();
        broadcaster.bind_bot(0, tx0);
        broadcaster.bind_bot(1, tx1);
        broadcaster.broadcast_bots(ServerMessage::error(ErrorCode::BadSchema, "x"));
        assert!(rx0.try_recv().is_ok());
        assert!(rx1.try_recv().is_ok());
    }

    #[tokio::test]
    async fn presentation_mode_paces_spectator_releases() {
        let mut broadcaster = Broadcaster::new(0);
        broadcaster.set_presentation(Some(Duration::from_millis(5)));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        broadcaster.add_spectator(tx);

        let lobby = SpectatorServerMessage::Lobby { players: vec![], v: WIRE_VERSION };
        let start = tokio::time::Instant::now();
        broadcaster.broadcast_spectators(lobby.clone()).await;
        broadcaster.broadcast_spectators(lobby).await;
        assert!(start.elapsed() >= Duration::from_millis(5));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }
}
