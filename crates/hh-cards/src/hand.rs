use super::card::Card;

/// An unordered set of cards, packed as a 52-bit mask in a `u64`. Used for
/// the community board and for the 5-from-7 combinations the evaluator
/// scores; avoids heap allocation for what is almost always a handful of
/// cards.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Hand(u64);

impl Hand {
    pub fn empty() -> Self {
        Self(0)
    }
    pub fn add(lhs: Self, rhs: Self) -> Self {
        debug_assert!(u64::from(lhs) & u64::from(rhs) == 0, "overlapping cards");
        Self(lhs.0 | rhs.0)
    }
    pub fn size(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn contains(&self, card: Card) -> bool {
        self.0 & u64::from(card) != 0
    }

    const fn mask() -> u64 {
        0x000F_FFFF_FFFF_FFFF
    }
}

impl From<Card> for Hand {
    fn from(card: Card) -> Self {
        Self(u64::from(card))
    }
}

impl From<u64> for Hand {
    fn from(n: u64) -> Self {
        Self(n & Self::mask())
    }
}
impl From<Hand> for u64 {
    fn from(h: Hand) -> Self {
        h.0
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards.into_iter().map(u64::from).fold(0u64, |a, b| a | b))
    }
}

impl From<Hand> for Vec<Card> {
    fn from(h: Hand) -> Self {
        let mut value = h.0;
        let mut index = 0u8;
        let mut cards = Vec::new();
        while value > 0 {
            if value & 1 == 1 {
                cards.push(Card::from(index));
            }
            value >>= 1;
            index += 1;
        }
        cards
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let cards = Vec::<Card>::from(*self)
            .into_iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{cards}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u64() {
        let hand = Hand::from(vec![Card::try_from("2c").unwrap(), Card::try_from("Ks").unwrap()]);
        assert_eq!(hand, Hand::from(u64::from(hand)));
    }

    #[test]
    fn size_counts_cards() {
        let hand = Hand::from(vec![
            Card::try_from("2c").unwrap(),
            Card::try_from("3d").unwrap(),
            Card::try_from("4h").unwrap(),
        ]);
        assert_eq!(hand.size(), 3);
    }

    #[test]
    fn contains_checks_membership() {
        let ace = Card::try_from("Ah").unwrap();
        let hand = Hand::from(vec![ace]);
        assert!(hand.contains(ace));
        assert!(!hand.contains(Card::try_from("Ac").unwrap()));
    }

    #[test]
    #[should_panic]
    fn add_overlapping_panics_in_debug() {
        let a = Hand::from(vec![Card::try_from("2c").unwrap()]);
        let b = Hand::from(vec![Card::try_from("2c").unwrap()]);
        Hand::add(a, b);
    }
}
