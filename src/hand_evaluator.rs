use std::cmp::Ordering;
use std::fmt;

use crate::cards::Card;
use crate::error::{CfrError, CfrResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::FourOfAKind => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
        }
    }
}

/// Best five-card value of a 5-7 card holding. Ordering compares category
/// first, then the tiebreak ranks in significance order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandResult {
    pub category: HandCategory,
    pub kickers: Vec<u8>,
}

impl fmt::Display for HandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

/// Highest straight in a rank bitmask (bit v set for rank v), ace plays low.
fn straight_high(mask: u16) -> Option<u8> {
    let mask = if mask & (1 << 14) != 0 { mask | (1 << 1) } else { mask };
    (5..=14u8).rev().find(|&high| {
        let run = 0b11111u16 << (high - 4);
        mask & run == run
    })
}

/// The `n` highest ranks set in `mask`, skipping `exclude`.
fn top_ranks(mask: u16, n: usize, exclude: &[u8]) -> Vec<u8> {
    (2..=14u8)
        .rev()
        .filter(|&v| mask & (1 << v) != 0 && !exclude.contains(&v))
        .take(n)
        .collect()
}

pub fn evaluate_cards(cards: &[Card]) -> CfrResult<HandResult> {
    if cards.len() < 5 {
        return Err(CfrError::Accounting(format!(
            "need at least 5 cards to evaluate, got {}",
            cards.len()
        )));
    }

    let mut counts = [0u8; 15];
    let mut suit_masks = [0u16; 5];
    let mut suit_counts = [0u8; 5];
    let mut rank_mask = 0u16;
    for c in cards {
        let v = c.value();
        counts[v as usize] += 1;
        suit_masks[c.suit.id() as usize] |= 1 << v;
        suit_counts[c.suit.id() as usize] += 1;
        rank_mask |= 1 << v;
    }

    let flush_suit = (1..=4).find(|&s| suit_counts[s] >= 5);
    if let Some(s) = flush_suit {
        if let Some(high) = straight_high(suit_masks[s]) {
            return Ok(HandResult {
                category: HandCategory::StraightFlush,
                kickers: vec![high],
            });
        }
    }

    let ranks_with = |n: u8| -> Vec<u8> {
        (2..=14u8).rev().filter(|&v| counts[v as usize] >= n).collect()
    };
    let quads = ranks_with(4);
    let trips = ranks_with(3);
    let pairs: Vec<u8> = (2..=14u8).rev().filter(|&v| counts[v as usize] == 2).collect();

    if let Some(&q) = quads.first() {
        let kicker = top_ranks(rank_mask, 1, &[q]);
        let mut kickers = vec![q];
        kickers.extend(kicker);
        return Ok(HandResult {
            category: HandCategory::FourOfAKind,
            kickers,
        });
    }

    if let Some(&t) = trips.first() {
        let second = trips
            .iter()
            .skip(1)
            .chain(pairs.iter())
            .copied()
            .max();
        if let Some(p) = second {
            return Ok(HandResult {
                category: HandCategory::FullHouse,
                kickers: vec![t, p],
            });
        }
    }

    if let Some(s) = flush_suit {
        return Ok(HandResult {
            category: HandCategory::Flush,
            kickers: top_ranks(suit_masks[s], 5, &[]),
        });
    }

    if let Some(high) = straight_high(rank_mask) {
        return Ok(HandResult {
            category: HandCategory::Straight,
            kickers: vec![high],
        });
    }

    if let Some(&t) = trips.first() {
        let mut kickers = vec![t];
        kickers.extend(top_ranks(rank_mask, 2, &[t]));
        return Ok(HandResult {
            category: HandCategory::ThreeOfAKind,
            kickers,
        });
    }

    if pairs.len() >= 2 {
        let (hi, lo) = (pairs[0], pairs[1]);
        let mut kickers = vec![hi, lo];
        kickers.extend(top_ranks(rank_mask, 1, &[hi, lo]));
        return Ok(HandResult {
            category: HandCategory::TwoPair,
            kickers,
        });
    }

    if let Some(&p) = pairs.first() {
        let mut kickers = vec![p];
        kickers.extend(top_ranks(rank_mask, 3, &[p]));
        return Ok(HandResult {
            category: HandCategory::OnePair,
            kickers,
        });
    }

    Ok(HandResult {
        category: HandCategory::HighCard,
        kickers: top_ranks(rank_mask, 5, &[]),
    })
}

pub fn evaluate_hand(hole_cards: &[Card], board: &[Card]) -> CfrResult<HandResult> {
    let mut all_cards: Vec<Card> = Vec::with_capacity(hole_cards.len() + board.len());
    all_cards.extend_from_slice(hole_cards);
    all_cards.extend_from_slice(board);
    evaluate_cards(&all_cards)
}

pub fn compare_hands(hand1: &[Card], hand2: &[Card], board: &[Card]) -> CfrResult<Ordering> {
    let r1 = evaluate_hand(hand1, board)?;
    let r2 = evaluate_hand(hand2, board)?;
    Ok(r1.cmp(&r2))
}
