use std::fmt;

use itertools::Itertools;
use once_cell::sync::Lazy;

use crate::error::{CfrError, CfrResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_char(c: char) -> CfrResult<Rank> {
        match c.to_ascii_uppercase() {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(CfrError::InvalidRank(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    /// Numeric rank, 2 through 14 (ace high).
    pub fn value(self) -> u8 {
        self as u8
    }
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spades = 1,
    Hearts = 2,
    Diamonds = 3,
    Clubs = 4,
}

impl Suit {
    pub fn from_char(c: char) -> CfrResult<Suit> {
        match c.to_ascii_lowercase() {
            's' => Ok(Suit::Spades),
            'h' => Ok(Suit::Hearts),
            'd' => Ok(Suit::Diamonds),
            'c' => Ok(Suit::Clubs),
            _ => Err(CfrError::InvalidSuit(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    /// Suit id in 1..=4 (s, h, d, c).
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "\u{2660}",
            Suit::Hearts => "\u{2665}",
            Suit::Diamonds => "\u{2666}",
            Suit::Clubs => "\u{2663}",
        }
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    /// Dense index in 0..52, rank-major.
    pub fn index(&self) -> usize {
        (self.rank.value() as usize - 2) * 4 + (self.suit.id() as usize - 1)
    }

    pub fn pretty(&self) -> String {
        format!("{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

/// The 52 cards in rank-major order (2s, 2h, 2d, 2c, 3s, ...).
pub static FULL_DECK: Lazy<Vec<Card>> = Lazy::new(|| {
    ALL_RANKS
        .iter()
        .flat_map(|&r| ALL_SUITS.iter().map(move |&s| Card::new(r, s)))
        .collect()
});

/// Cards of the full deck not present in `dead`, in deck order.
pub fn remaining_cards(dead: &[Card]) -> Vec<Card> {
    FULL_DECK
        .iter()
        .filter(|c| !dead.contains(c))
        .copied()
        .collect()
}

pub fn parse_card(notation: &str) -> CfrResult<Card> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();
    if chars.len() != 2 {
        return Err(CfrError::InvalidCardNotation(notation.to_string()));
    }
    let rank = Rank::from_char(chars[0])?;
    let suit = Suit::from_char(chars[1])?;
    Ok(Card::new(rank, suit))
}

pub fn parse_board(notation: &str) -> CfrResult<Vec<Card>> {
    let notation = notation.trim().replace([' ', ','], "");
    if notation.len() % 2 != 0 {
        return Err(CfrError::InvalidBoardNotation(notation));
    }
    let chars: Vec<char> = notation.chars().collect();
    chars
        .chunks(2)
        .map(|pair| parse_card(&pair.iter().collect::<String>()))
        .collect()
}

pub fn parse_hand(notation: &str) -> CfrResult<[Card; 2]> {
    let cards = parse_board(notation)?;
    match cards.as_slice() {
        [a, b] if a != b => Ok([*a, *b]),
        _ => Err(CfrError::InvalidCardNotation(notation.to_string())),
    }
}

/// Concatenated notation, e.g. `7s6c3s`.
pub fn format_cards(cards: &[Card]) -> String {
    cards.iter().join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_deck_is_unique() {
        let mut indices: Vec<usize> = FULL_DECK.iter().map(|c| c.index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 52);
        assert_eq!(indices[51], 51);
    }

    #[test]
    fn suit_ids_follow_shdc() {
        assert_eq!(Suit::Spades.id(), 1);
        assert_eq!(Suit::Clubs.id(), 4);
    }

    #[test]
    fn parse_and_format() {
        let board = parse_board("7s 6c,3s").unwrap();
        assert_eq!(format_cards(&board), "7s6c3s");
        assert!(parse_hand("AsAs").is_err());
        assert!(parse_card("1s").is_err());
    }
}
