use hh_core::{Chips, Position};

/// One contribution tier, built by peeling `total_in_pot` levels across
/// non-folded seats (§4.3.5). `eligible` is exactly the set of seats whose
/// hole cards may win this pot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<Position>,
}

/// Peels side pots from each seat's `total_in_pot` this hand.
///
/// `contributions` holds every seat that put money in, folded or not;
/// `live` is the subset still eligible to win a pot built from their
/// contribution tier. Folded seats contribute dead money to whichever
/// pots their stake reaches but never appear in `eligible`.
pub fn build_pots(contributions: &[(Position, Chips, bool)]) -> Vec<Pot> {
    let mut remaining: Vec<(Position, Chips, bool)> = contributions
        .iter()
        .copied()
        .filter(|(_, amount, _)| *amount > 0)
        .collect();
    let mut pots = Vec::new();

    while !remaining.is_empty() {
        let level = remaining
            .iter()
            .filter(|(_, _, folded)| !folded)
            .map(|(_, amount, _)| *amount)
            .min();
        let Some(level) = level else {
            // Only folded dead money left with no live contributor to peg
            // a level against — fold it into the final pot as it has no
            // eligible winner of its own to separate it from.
            break;
        };

        let eligible: Vec<Position> = remaining
            .iter()
            .filter(|(_, _, folded)| !folded)
            .map(|(seat, _, _)| *seat)
            .collect();
        let amount = level * remaining.len() as Chips;
        pots.push(Pot { amount, eligible });

        remaining = remaining
            .into_iter()
            .filter_map(|(seat, stake, folded)| {
                let left = stake - level;
                (left > 0).then_some((seat, left, folded))
            })
            .collect();
    }

    pots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pot_when_all_contribute_equally() {
        let pots = build_pots(&[(0, 100, false), (1, 100, false), (2, 100, false)]);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible.len(), 3);
    }

    #[test]
    fn short_all_in_builds_main_and_side_pot() {
        // Seat 0 all-in for 300, seat 1 for 500, seat 2 for 1000.
        let pots = build_pots(&[(0, 300, false), (1, 500, false), (2, 1000, false)]);
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 900);
        assert_eq!(pots[0].eligible, vec![0, 1, 2]);
        assert_eq!(pots[1].amount, 400);
        assert_eq!(pots[1].eligible, vec![1, 2]);
        assert_eq!(pots[2].amount, 500);
        assert_eq!(pots[2].eligible, vec![2]);
    }

    #[test]
    fn folded_seat_contributes_dead_money_without_eligibility() {
        let pots = build_pots(&[(0, 100, true), (1, 100, false), (2, 100, false)]);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec![1, 2]);
    }
}
