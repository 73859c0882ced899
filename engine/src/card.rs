//! Playing cards
//!
//! A card is a value 0-51: `suit * 13 + rank`, where rank 0 is a deuce and
//! rank 12 an ace, and suits run spades, hearts, diamonds, clubs.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];
const SUIT_CHARS: [char; 4] = ['s', 'h', 'd', 'c'];

/// Number of cards in the deck
pub const DECK_SIZE: u8 = 52;

/// A single playing card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card(u8);

impl Card {
    /// Create a new card from a value 0-51
    pub fn new(value: u8) -> Self {
        assert!(value < DECK_SIZE, "Card value must be 0-51");
        Card(value)
    }

    /// Build a card from its rank (0 = deuce .. 12 = ace) and suit (0-3)
    pub fn from_parts(rank: u8, suit: u8) -> Self {
        Card::new(suit * 13 + rank)
    }

    /// Get the raw card value (0-51)
    pub fn value(self) -> u8 {
        self.0
    }

    /// Rank index, 0 = deuce .. 12 = ace
    pub fn rank(self) -> u8 {
        self.0 % 13
    }

    /// Suit index, 0-3
    pub fn suit(self) -> u8 {
        self.0 / 13
    }

    /// The full deck in value order
    pub fn deck() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE).map(Card)
    }

    /// Bitmask with one bit per card value
    pub fn mask(cards: &[Card]) -> u64 {
        cards.iter().fold(0u64, |m, c| m | (1u64 << c.0))
    }

    /// Parse a whitespace/comma separated or concatenated list, e.g. `"AsKd"`
    /// or `"As Kd"`.
    pub fn parse_many(text: &str) -> Result<Vec<Card>, EngineError> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',' && *c != '-')
            .collect();
        if compact.len() % 2 != 0 {
            return Err(EngineError::malformed(format!("odd-length card list '{}'", text)));
        }
        compact
            .as_bytes()
            .chunks(2)
            .map(|pair| std::str::from_utf8(pair).map_err(|_| EngineError::malformed("non-ascii card")))
            .map(|s| s.and_then(str::parse))
            .collect()
    }
}

fn rank_index(c: char) -> Option<u8> {
    let up = c.to_ascii_uppercase();
    RANK_CHARS.iter().position(|&r| r == up).map(|i| i as u8)
}

fn suit_index(c: char) -> Option<u8> {
    let low = c.to_ascii_lowercase();
    SUIT_CHARS.iter().position(|&s| s == low).map(|i| i as u8)
}

impl FromStr for Card {
    type Err = EngineError;

    /// Accepts rank-first (`As`, `Td`) and the table host's suit-first form
    /// (`SA`, `DT`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (a, b) = match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => (a, b),
            _ => return Err(EngineError::malformed(format!("bad card '{}'", s))),
        };
        if let (Some(rank), Some(suit)) = (rank_index(a), suit_index(b)) {
            return Ok(Card::from_parts(rank, suit));
        }
        if let (Some(suit), Some(rank)) = (suit_index(a), rank_index(b)) {
            return Ok(Card::from_parts(rank, suit));
        }
        Err(EngineError::malformed(format!("bad card '{}'", s)))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANK_CHARS[self.rank() as usize],
            SUIT_CHARS[self.suit() as usize]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rank_first() {
        let c: Card = "As".parse().unwrap();
        assert_eq!(c.rank(), 12);
        assert_eq!(c.suit(), 0);
        assert_eq!(c.to_string(), "As");
    }

    #[test]
    fn test_parse_suit_first() {
        let c: Card = "DT".parse().unwrap();
        assert_eq!(c, "Td".parse().unwrap());
    }

    #[test]
    fn test_parse_many() {
        let cards = Card::parse_many("AsKd 2c").unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[2].to_string(), "2c");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("Zz".parse::<Card>().is_err());
        assert!("A".parse::<Card>().is_err());
        assert!(Card::parse_many("AsK").is_err());
    }

    #[test]
    fn test_mask_distinct() {
        let m = Card::mask(&[Card::new(0), Card::new(51)]);
        assert_eq!(m.count_ones(), 2);
    }
}
