use std::time::Duration;

use hh_core::Chips;
use hh_engine::{Action, LegalActions};
use tokio::time::Instant;

/// How a [`DecisionClock`] behaves when its bound seat disconnects
/// mid-countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// §4.6 default: the clock pauses while the acting seat is
    /// disconnected and resumes with its remaining time on reconnect. A
    /// departure from the teacher's `Timer`, which is strict wall-clock and
    /// has no notion of the seat it is timing being reachable at all — that
    /// is fine for a solver clocking tree search, but here auto-folding a
    /// bot that merely lost its socket for a few seconds would be an
    /// unrecoverable and unfair penalty, so the countdown itself is
    /// suspended rather than left running against a seat that cannot act.
    PauseOnDisconnect,
    /// Runs like the teacher's `Timer`: wall-clock only, no pause.
    StrictWallClock,
}

/// Per-turn countdown (§4.6). One instance is live per active turn; it is
/// replaced, not reused, the way the teacher's `Timer::start_decision`
/// rearms a single deadline field rather than tracking a history.
pub struct DecisionClock {
    mode: ClockMode,
    move_time: Duration,
    deadline: Option<Instant>,
    paused_remaining: Option<Duration>,
}

impl DecisionClock {
    pub fn new(mode: ClockMode, move_time: Duration) -> Self {
        Self { mode, move_time, deadline: None, paused_remaining: None }
    }

    /// Arms the countdown for a freshly dispatched `act` (§4.6).
    pub fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.move_time);
        self.paused_remaining = None;
    }

    /// Suspends the countdown because the acting seat went `connected:false`.
    /// A no-op under [`ClockMode::StrictWallClock`].
    pub fn pause(&mut self) {
        if self.mode != ClockMode::PauseOnDisconnect {
            return;
        }
        if let Some(deadline) = self.deadline.take() {
            let now = Instant::now();
            self.paused_remaining = Some(if deadline > now { deadline - now } else { Duration::ZERO });
        }
    }

    /// Rearms the countdown with whatever time remained when it was
    /// paused. A no-op if the clock was not paused.
    pub fn resume(&mut self) {
        if self.mode != ClockMode::PauseOnDisconnect {
            return;
        }
        if let Some(remaining) = self.paused_remaining.take() {
            self.deadline = Some(Instant::now() + remaining);
        }
    }

    /// Cancels the countdown on action receipt, operator skip/forfeit, or
    /// hand termination (§4.6).
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.paused_remaining = None;
    }

    pub fn is_paused(&self) -> bool {
        self.deadline.is_none() && self.paused_remaining.is_some()
    }

    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    pub fn remaining_ms(&self) -> u64 {
        if let Some(deadline) = self.deadline {
            let now = Instant::now();
            if deadline > now { (deadline - now).as_millis() as u64 } else { 0 }
        } else if let Some(remaining) = self.paused_remaining {
            remaining.as_millis() as u64
        } else {
            0
        }
    }
}

/// Chooses the forced action on expiry (§4.6): auto-CHECK, else auto-CALL
/// for the lesser of the call amount and the seat's own stack (always equal
/// to `legal.call_amount`, since that field is already capped at the
/// engine's short-call clamp), else auto-FOLD.
pub fn auto_action(legal: &LegalActions, stack: Chips) -> Action {
    if legal.can_check {
        Action::Check
    } else if legal.can_call {
        let _ = stack;
        Action::Call
    } else {
        Action::Fold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal(can_check: bool, can_call: bool) -> LegalActions {
        LegalActions {
            can_fold: true,
            can_check,
            can_call,
            can_raise: false,
            call_amount: 50,
            min_raise_to: 0,
            max_raise_to: 0,
        }
    }

    #[test]
    fn auto_action_prefers_check_over_call_and_fold() {
        assert_eq!(auto_action(&legal(true, true), 1000), Action::Check);
    }

    #[test]
    fn auto_action_falls_back_to_call_then_fold() {
        assert_eq!(auto_action(&legal(false, true), 1000), Action::Call);
        assert_eq!(auto_action(&legal(false, false), 1000), Action::Fold);
    }

    #[test]
    fn strict_mode_ignores_pause() {
        let mut clock = DecisionClock::new(ClockMode::StrictWallClock, Duration::from_secs(30));
        clock.start();
        clock.pause();
        assert!(!clock.is_paused());
        assert!(clock.remaining_ms() > 0);
    }

    #[test]
    fn pause_then_resume_rearms_with_remaining_time() {
        let mut clock = DecisionClock::new(ClockMode::PauseOnDisconnect, Duration::from_secs(30));
        clock.start();
        clock.pause();
        assert!(clock.is_paused());
        assert!(!clock.expired());
        clock.resume();
        assert!(!clock.is_paused());
        assert!(clock.remaining_ms() > 0);
    }

    #[test]
    fn cancel_clears_both_deadline_and_paused_remainder() {
        let mut clock = DecisionClock::new(ClockMode::PauseOnDisconnect, Duration::from_secs(30));
        clock.start();
        clock.pause();
        clock.cancel();
        assert_eq!(clock.remaining_ms(), 0);
        assert!(!clock.is_paused());
    }
}
