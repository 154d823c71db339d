use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use hh_core::Seed;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// The 52-card universe, shuffled deterministically from a 64-bit seed.
///
/// `shuffle(seed)` is a pure function of `seed` and the canonical card
/// ordering (`Rank::all() x Suit::all()`, rank-major): two decks built with
/// equal seeds deal byte-identical cards, matching the teacher's own use of
/// a seedable `rand::seq::SliceRandom::shuffle` (see `Permutation::random`)
/// rather than the teacher's thread-rng `Deck::draw`, which this spec's
/// cross-implementation determinism requirement rules out.
///
/// Classical poker pre-street burns are intentionally NOT modeled: `deal`
/// always pops the next card face-up. Adding a burn would desynchronize
/// this deck from any other implementation shuffling the same seed.
#[derive(Debug, Clone)]
pub struct CardDeck {
    remaining: Vec<Card>,
}

impl CardDeck {
    /// Canonical pre-shuffle ordering: rank-major, suit-minor.
    fn canonical() -> Vec<Card> {
        Rank::all()
            .into_iter()
            .flat_map(|r| Suit::all().into_iter().map(move |s| Card::from((r, s))))
            .collect()
    }

    pub fn shuffle(seed: Seed) -> Self {
        let mut remaining = Self::canonical();
        let mut rng = StdRng::seed_from_u64(seed);
        remaining.shuffle(&mut rng);
        Self { remaining }
    }

    /// Pops the top of the deck. `None` once all 52 cards are dealt.
    pub fn deal(&mut self) -> Option<Card> {
        self.remaining.pop()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_seeds_deal_identical_sequences() {
        let mut a = CardDeck::shuffle(42);
        let mut b = CardDeck::shuffle(42);
        for _ in 0..52 {
            assert_eq!(a.deal(), b.deal());
        }
    }

    #[test]
    fn different_seeds_usually_differ() {
        let mut a = CardDeck::shuffle(1);
        let mut b = CardDeck::shuffle(2);
        let (ca, cb): (Vec<_>, Vec<_>) = (
            std::iter::from_fn(|| a.deal()).collect(),
            std::iter::from_fn(|| b.deal()).collect(),
        );
        assert_ne!(ca, cb);
    }

    #[test]
    fn deals_all_52_distinct_cards() {
        let mut deck = CardDeck::shuffle(7);
        let mut seen = std::collections::HashSet::new();
        while let Some(card) = deck.deal() {
            assert!(seen.insert(card), "duplicate card dealt");
        }
        assert_eq!(seen.len(), 52);
        assert_eq!(deck.deal(), None);
    }

    #[test]
    fn remaining_tracks_deal_count() {
        let mut deck = CardDeck::shuffle(9);
        assert_eq!(deck.remaining(), 52);
        deck.deal();
        assert_eq!(deck.remaining(), 51);
    }
}
