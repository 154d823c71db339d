use hh_cards::Card;
use hh_core::{Chips, Position};

/// Public events produced by a single [`crate::GameEngine`] transition. A
/// transition always returns a contiguous `Vec<EngineEvent>`; callers never
/// see a partial burst (§5 ordering guarantees).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PostBlinds {
        sb_seat: Position,
        sb_amount: Chips,
        bb_seat: Position,
        bb_amount: Chips,
    },
    Bet {
        seat: Position,
        to: Chips,
    },
    Call {
        seat: Position,
        amount: Chips,
    },
    Check {
        seat: Position,
    },
    Fold {
        seat: Position,
    },
    Flop {
        cards: [Card; 3],
    },
    Turn {
        card: Card,
    },
    River {
        card: Card,
    },
    /// Hole cards revealed for a seat still live at showdown.
    Showdown {
        seat: Position,
        hole: [Card; 2],
    },
    PotAward {
        seat: Position,
        amount: Chips,
        pot_index: usize,
    },
    Eliminated {
        seat: Position,
    },
}

impl std::fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EngineEvent::PostBlinds {
                sb_seat,
                sb_amount,
                bb_seat,
                bb_amount,
            } => write!(f, "P{sb_seat} posts SB {sb_amount}, P{bb_seat} posts BB {bb_amount}"),
            EngineEvent::Bet { seat, to } => write!(f, "P{seat} bets to {to}"),
            EngineEvent::Call { seat, amount } => write!(f, "P{seat} calls {amount}"),
            EngineEvent::Check { seat } => write!(f, "P{seat} checks"),
            EngineEvent::Fold { seat } => write!(f, "P{seat} folds"),
            EngineEvent::Flop { cards } => {
                write!(f, "FLOP {} {} {}", cards[0], cards[1], cards[2])
            }
            EngineEvent::Turn { card } => write!(f, "TURN {card}"),
            EngineEvent::River { card } => write!(f, "RIVER {card}"),
            EngineEvent::Showdown { seat, hole } => write!(f, "P{seat} shows {} {}", hole[0], hole[1]),
            EngineEvent::PotAward {
                seat,
                amount,
                pot_index,
            } => write!(f, "P{seat} wins {amount} from pot #{pot_index}"),
            EngineEvent::Eliminated { seat } => write!(f, "P{seat} eliminated"),
        }
    }
}
