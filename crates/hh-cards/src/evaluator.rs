use super::card::Card;
use super::rank::Rank;
use itertools::Itertools;

/// Hand category, worst to last. Declaration order is the derived `Ord`,
/// so two scores in different categories compare correctly without
/// touching their tiebreak payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    HighCard,
    OnePair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
}

/// A hand's total-order score: category first, then ranks relevant to
/// breaking ties within that category, highest-impact rank first. Since
/// `Rank` orders low-to-high and `Vec<Rank>` compares lexicographically,
/// the derived `Ord` on `Score` already implements standard kicker
/// comparison: equal scores compare equal (split pot), and the wheel
/// straight (A-2-3-4-5) scores as `Straight` with tiebreak `[Five]`, making
/// it the lowest straight as required.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    category: Category,
    tiebreak: Vec<Rank>,
}

impl Score {
    pub fn category(&self) -> Category {
        self.category
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    InvalidCard(String),
}

impl std::fmt::Display for CardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardError::InvalidCard(s) => write!(f, "invalid card label: {s}"),
        }
    }
}
impl std::error::Error for CardError {}

/// Ranks any 5-to-7 card selection, choosing the best 5-card sub-hand.
pub struct HandEvaluator;

impl HandEvaluator {
    /// Parses card labels and scores them, surfacing `InvalidCard` for any
    /// malformed label. This is the only error path: a well-formed card
    /// set is always scorable.
    pub fn score_labels(labels: &[&str]) -> Result<Score, CardError> {
        let cards = labels
            .iter()
            .map(|s| Card::try_from(*s).map_err(CardError::InvalidCard))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::score(&cards))
    }

    /// Scores a 5-to-7 card selection. `score(cards) == score(permuted
    /// cards)` for any permutation, since we enumerate every 5-card
    /// combination and keep the best.
    pub fn score(cards: &[Card]) -> Score {
        debug_assert!((5..=7).contains(&cards.len()));
        cards
            .iter()
            .copied()
            .combinations(5)
            .map(|five| Self::score_five(&five))
            .max()
            .expect("at least one 5-card combination exists")
    }

    fn score_five(cards: &[Card]) -> Score {
        debug_assert_eq!(cards.len(), 5);
        let mut ranks: Vec<Rank> = cards.iter().map(Card::rank).collect();
        ranks.sort_by(|a, b| b.cmp(a));

        let flush = cards.iter().map(Card::suit).all_equal();
        let straight_high = Self::straight_high(&ranks);

        let mut counts: Vec<(Rank, usize)> = ranks
            .iter()
            .copied()
            .dedup_with_count()
            .map(|(n, r)| (r, n))
            .collect();
        // dedup_with_count needs sorted-adjacent input, which `ranks` is
        // (descending), but group identical ranks together first.
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

        match (flush, straight_high, counts.as_slice()) {
            (true, Some(high), _) => Score {
                category: Category::StraightFlush,
                tiebreak: vec![high],
            },
            (_, _, [(quad, 4), (kicker, 1)]) => Score {
                category: Category::Quads,
                tiebreak: vec![*quad, *kicker],
            },
            (_, _, [(trip, 3), (pair, 2)]) => Score {
                category: Category::FullHouse,
                tiebreak: vec![*trip, *pair],
            },
            (true, _, _) => Score {
                category: Category::Flush,
                tiebreak: ranks,
            },
            (_, Some(high), _) => Score {
                category: Category::Straight,
                tiebreak: vec![high],
            },
            (_, _, [(trip, 3), (k1, 1), (k2, 1)]) => Score {
                category: Category::Trips,
                tiebreak: vec![*trip, *k1.max(k2), *k1.min(k2)],
            },
            (_, _, [(hi, 2), (lo, 2), (kicker, 1)]) => Score {
                category: Category::TwoPair,
                tiebreak: vec![*hi.max(lo), *hi.min(lo), *kicker],
            },
            (_, _, [(pair, 2), (k1, 1), (k2, 1), (k3, 1)]) => {
                let mut kickers = [*k1, *k2, *k3];
                kickers.sort_by(|a, b| b.cmp(a));
                Score {
                    category: Category::OnePair,
                    tiebreak: [*pair].into_iter().chain(kickers).collect(),
                }
            }
            _ => Score {
                category: Category::HighCard,
                tiebreak: ranks,
            },
        }
    }

    /// Highest card of a straight formed by five distinct descending ranks,
    /// or `None`. The wheel (A-2-3-4-5) reports `Five` as the high card.
    fn straight_high(desc_ranks: &[Rank]) -> Option<Rank> {
        let mut distinct: Vec<Rank> = desc_ranks.to_vec();
        distinct.dedup();
        if distinct.len() != 5 {
            return None;
        }
        let consecutive = distinct
            .windows(2)
            .all(|w| u8::from(w[0]) == u8::from(w[1]) + 1);
        if consecutive {
            return Some(distinct[0]);
        }
        let is_wheel = distinct == [Rank::Ace, Rank::Five, Rank::Four, Rank::Three, Rank::Two];
        is_wheel.then_some(Rank::Five)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(labels: &[&str]) -> Score {
        HandEvaluator::score_labels(labels).expect("valid hand")
    }

    #[test]
    fn ranks_straight_flush_above_quads() {
        let sf = hand(&["5h", "6h", "7h", "8h", "9h"]);
        let quads = hand(&["2c", "2d", "2h", "2s", "Ah"]);
        assert!(sf > quads);
    }

    #[test]
    fn wheel_straight_is_lowest_straight() {
        let wheel = hand(&["Ah", "2c", "3d", "4h", "5s"]);
        let six_high = hand(&["2h", "3c", "4d", "5h", "6s"]);
        assert_eq!(wheel.category(), Category::Straight);
        assert!(wheel < six_high);
    }

    #[test]
    fn full_house_beats_flush() {
        let fh = hand(&["3c", "3d", "3h", "9s", "9h"]);
        let fl = hand(&["2h", "5h", "9h", "Jh", "Kh"]);
        assert!(fh > fl);
    }

    #[test]
    fn kicker_breaks_one_pair_ties() {
        let a = hand(&["9c", "9d", "2h", "5s", "Kh"]);
        let b = hand(&["9h", "9s", "2c", "5h", "Qd"]);
        assert!(a > b);
    }

    #[test]
    fn identical_hands_score_equal() {
        let a = hand(&["Ah", "Kh", "Qh", "Jh", "Th"]);
        let b = hand(&["Th", "Jh", "Qh", "Kh", "Ah"]);
        assert_eq!(a, b);
    }

    #[test]
    fn score_is_invariant_to_permutation_of_seven() {
        let seven = ["2c", "5d", "9h", "Jc", "Qh", "Kh", "Ah"];
        let a = HandEvaluator::score_labels(&seven).unwrap();
        let mut shuffled = seven;
        shuffled.reverse();
        let b = HandEvaluator::score_labels(&shuffled).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn picks_best_five_from_seven() {
        // Board gives a flush; hole cards are irrelevant scraps.
        let seven = ["2h", "5h", "9h", "Jh", "Kh", "2c", "3d"];
        let score = HandEvaluator::score_labels(&seven).unwrap();
        assert_eq!(score.category(), Category::Flush);
    }

    #[test]
    fn malformed_label_is_invalid_card_error() {
        let err = HandEvaluator::score_labels(&["Zz", "2c", "3d", "4h", "5s"]).unwrap_err();
        assert_eq!(err, CardError::InvalidCard("Zz".to_string()));
    }
}
