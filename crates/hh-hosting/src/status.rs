use hh_protocol::{SpectatorServerMessage, WIRE_VERSION};

/// The advisory flags broadcast to operator connections (§4.9, §11).
/// Recomputed after every engine transition and operator command;
/// [`StatusTracker`] only emits when one of the fields actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags {
    pub in_hand: bool,
    pub awaiting_manual_start: bool,
    pub manual_start_armed: bool,
    pub players_ready: usize,
    pub can_start: bool,
}

impl StatusFlags {
    pub fn to_message(self) -> SpectatorServerMessage {
        SpectatorServerMessage::Status {
            in_hand: self.in_hand,
            awaiting_manual_start: self.awaiting_manual_start,
            manual_start_armed: self.manual_start_armed,
            players_ready: self.players_ready,
            can_start: self.can_start,
            v: WIRE_VERSION,
        }
    }
}

/// De-duplicates `spectator/status` broadcasts (§4.9: "broadcast ... whenever
/// any of ... changes").
#[derive(Default)]
pub struct StatusTracker {
    last: Option<StatusFlags>,
}

impl StatusTracker {
    /// Returns `Some(message)` only the first time these flags are seen.
    pub fn observe(&mut self, flags: StatusFlags) -> Option<SpectatorServerMessage> {
        if self.last == Some(flags) {
            return None;
        }
        self.last = Some(flags);
        Some(flags.to_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(players_ready: usize) -> StatusFlags {
        StatusFlags {
            in_hand: false,
            awaiting_manual_start: true,
            manual_start_armed: false,
            players_ready,
            can_start: players_ready >= 2,
        }
    }

    #[test]
    fn repeated_identical_flags_emit_only_once() {
        let mut tracker = StatusTracker::default();
        assert!(tracker.observe(flags(2)).is_some());
        assert!(tracker.observe(flags(2)).is_none());
        assert!(tracker.observe(flags(3)).is_some());
    }
}
