use std::collections::HashMap;

use hh_core::{Chips, Position};
use log::{debug, warn};

use crate::error::RegistryError;

/// Opaque handle a transport layer uses to distinguish two physical
/// connections bound to the same logical seat across a reconnect, mirroring
/// the teacher's one-`UnboundedSender`-per-seat model (`Table`) one level up:
/// the registry tracks *who* is bound, the broadcaster (separately) owns the
/// actual mailbox.
pub type ConnectionId = u64;

/// A persistent seat record: team identity, chip stack, and connection
/// binding. Survives disconnects — only `connected`/`bound_connection`
/// change.
#[derive(Debug, Clone)]
pub struct Seat {
    pub index: Position,
    pub team: String,
    pub stack: Chips,
    pub connected: bool,
    pub bound_connection: Option<ConnectionId>,
}

/// Outcome of a successful `hello` (§4.5): which seat it bound to, the new
/// connection id, and whether this was a fresh seating or a reconnect (the
/// caller uses this to decide `welcome`-only vs `welcome`+`snapshot`).
#[derive(Debug, Clone, Copy)]
pub struct HelloOutcome {
    pub seat: Position,
    pub connection: ConnectionId,
    pub reconnected: bool,
}

/// Team binding, seating, and reconnection (§4.5). Adapted from the
/// teacher's `Table`: where `Table` maps a fixed `Position` to an
/// `Option<Sender>`, `SeatRegistry` additionally maps a team name to a
/// `Position` so the same team reclaims its seat and stack across
/// reconnects, and optionally locks a seat behind a `join_code`.
pub struct SeatRegistry {
    capacity: usize,
    starting_stack: Chips,
    seats: Vec<Seat>,
    by_team: HashMap<String, Position>,
    join_codes: HashMap<Position, String>,
    next_connection: ConnectionId,
}

impl SeatRegistry {
    pub fn new(capacity: usize, starting_stack: Chips) -> Self {
        Self {
            capacity,
            starting_stack,
            seats: Vec::with_capacity(capacity),
            by_team: HashMap::new(),
            join_codes: HashMap::new(),
            next_connection: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, index: Position) -> Option<&Seat> {
        self.seats.get(index)
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.capacity
    }

    pub fn connected_count(&self) -> usize {
        self.seats.iter().filter(|s| s.connected).count()
    }

    fn mint_connection(&mut self) -> ConnectionId {
        self.next_connection += 1;
        self.next_connection
    }

    /// Handles one `hello{team, join_code?}` frame (§4.5). `join_code` is
    /// validated only against a seat that was locked with one on its first
    /// seating; an unconfigured table ignores the field entirely.
    pub fn hello(&mut self, team: &str, join_code: Option<&str>) -> Result<HelloOutcome, RegistryError> {
        let key = team.to_lowercase();

        if let Some(&seat_index) = self.by_team.get(&key) {
            if let Some(locked) = self.join_codes.get(&seat_index) {
                if join_code != Some(locked.as_str()) {
                    warn!("seat {seat_index} rejected reconnect: join_code mismatch for team {team:?}");
                    return Err(RegistryError::JoinCodeMismatch);
                }
            }
            let connection = self.mint_connection();
            let seat = &mut self.seats[seat_index];
            seat.connected = true;
            seat.bound_connection = Some(connection);
            debug!("seat {seat_index} ({team}) reconnected on connection {connection}");
            return Ok(HelloOutcome { seat: seat_index, connection, reconnected: true });
        }

        if self.is_full() {
            warn!("hello from {team:?} rejected: table full ({} seats)", self.capacity);
            return Err(RegistryError::TableFull);
        }

        let index = self.seats.len();
        let connection = self.mint_connection();
        self.seats.push(Seat {
            index,
            team: team.to_string(),
            stack: self.starting_stack,
            connected: true,
            bound_connection: Some(connection),
        });
        self.by_team.insert(key, index);
        if let Some(code) = join_code {
            self.join_codes.insert(index, code.to_string());
        }
        debug!("seat {index} assigned to team {team:?}");
        Ok(HelloOutcome { seat: index, connection, reconnected: false })
    }

    /// Marks a seat disconnected on transport close (§4.5). Stack and seat
    /// index are retained.
    pub fn disconnect(&mut self, index: Position) {
        if let Some(seat) = self.seats.get_mut(index) {
            seat.connected = false;
            seat.bound_connection = None;
            debug!("seat {index} disconnected");
        }
    }

    pub fn is_connected(&self, index: Position) -> bool {
        self.seats.get(index).map(|s| s.connected).unwrap_or(false)
    }

    /// Called after every hand settles, so the registry's copy of each
    /// stack stays in sync with `MatchController`'s authoritative ledger.
    pub fn sync_stack(&mut self, index: Position, stack: Chips) {
        if let Some(seat) = self.seats.get_mut(index) {
            seat.stack = stack;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_team_takes_next_free_seat() {
        let mut registry = SeatRegistry::new(3, 10_000);
        let a = registry.hello("alpha", None).unwrap();
        let b = registry.hello("bravo", None).unwrap();
        assert_eq!(a.seat, 0);
        assert_eq!(b.seat, 1);
        assert!(!a.reconnected && !b.reconnected);
    }

    #[test]
    fn full_table_rejects_new_team() {
        let mut registry = SeatRegistry::new(1, 10_000);
        registry.hello("alpha", None).unwrap();
        assert_eq!(registry.hello("bravo", None).unwrap_err(), RegistryError::TableFull);
    }

    #[test]
    fn known_team_reconnects_to_same_seat_and_keeps_stack() {
        let mut registry = SeatRegistry::new(2, 10_000);
        let first = registry.hello("Alpha", None).unwrap();
        registry.sync_stack(first.seat, 4_500);
        registry.disconnect(first.seat);
        assert!(!registry.is_connected(first.seat));

        let second = registry.hello("alpha", None).unwrap();
        assert_eq!(second.seat, first.seat);
        assert!(second.reconnected);
        assert_ne!(second.connection, first.connection);
        assert_eq!(registry.seat(first.seat).unwrap().stack, 4_500);
    }

    #[test]
    fn join_code_mismatch_is_rejected() {
        let mut registry = SeatRegistry::new(2, 10_000);
        let first = registry.hello("alpha", Some("secret")).unwrap();
        registry.disconnect(first.seat);
        let err = registry.hello("alpha", Some("wrong")).unwrap_err();
        assert_eq!(err, RegistryError::JoinCodeMismatch);
    }

    #[test]
    fn join_code_is_ignored_when_seat_was_never_locked() {
        let mut registry = SeatRegistry::new(2, 10_000);
        let first = registry.hello("alpha", None).unwrap();
        registry.disconnect(first.seat);
        assert!(registry.hello("alpha", Some("whatever")).is_ok());
    }
}
