use super::rank::Rank;
use super::suit::Suit;

/// A single playing card, packed as `rank * 4 + suit` into one byte so a
/// `Hand` of cards is just a 52-bit mask.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct Card(u8);

impl Card {
    pub fn rank(&self) -> Rank {
        Rank::from(self.0 / 4)
    }
    pub fn suit(&self) -> Suit {
        Suit::from(self.0 % 4)
    }
}

/// (Rank, Suit) isomorphism.
impl From<(Rank, Suit)> for Card {
    fn from((r, s): (Rank, Suit)) -> Self {
        Self(u8::from(r) * 4 + u8::from(s))
    }
}

/// u8 isomorphism: position in the canonical 52-card ordering.
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        c.0
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self(n)
    }
}

/// u64 isomorphism: one bit turned on, used to build `Hand` bitsets.
impl From<Card> for u64 {
    fn from(c: Card) -> u64 {
        1 << u8::from(c)
    }
}

/// Canonical two-character label, e.g. `"Ah"`, `"Tc"`.
impl TryFrom<&str> for Card {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.len() != 2 {
            return Err(format!("invalid card label: {s}"));
        }
        let rank = Rank::try_from(&s[0..1])?;
        let suit = Suit::try_from(&s[1..2])?;
        Ok(Card::from((rank, suit)))
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_rank_suit() {
        let card = Card::try_from("Ah").unwrap();
        assert_eq!(card, Card::from((card.rank(), card.suit())));
    }

    #[test]
    fn bijective_u8() {
        let card = Card::try_from("Th").unwrap();
        assert_eq!(card, Card::from(u8::from(card)));
    }

    #[test]
    fn round_trips_through_label() {
        let card = Card::try_from("Ac").unwrap();
        assert_eq!(card.to_string(), "Ac");
    }

    #[test]
    fn rejects_malformed_label() {
        assert!(Card::try_from("Zz").is_err());
        assert!(Card::try_from("A").is_err());
    }
}
