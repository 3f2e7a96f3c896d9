//! Myopic discard heuristic.
//!
//! Decides whether a hole card should be exchanged on the flop or turn. It is
//! not learned: the same rule drives both players during training and the
//! bot's own hand during live play.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{remaining_cards, Card};
use crate::config::{DiscardConfig, DiscardMethod};
use crate::equity::EquityOracle;
use crate::error::{CfrError, CfrResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscardDecision {
    /// Index (0 or 1) of the hole card to throw away, if any.
    pub discard: Option<usize>,
    /// Average equity over all replacement cards for the evaluated swap.
    pub swap_equity: f64,
    pub baseline_equity: f64,
}

impl DiscardDecision {
    pub fn should_discard(&self) -> bool {
        self.discard.is_some()
    }
}

fn undealt(hand: &[Card; 2], board: &[Card]) -> Vec<Card> {
    let mut dead = hand.to_vec();
    dead.extend_from_slice(board);
    remaining_cards(&dead)
}

/// A comparison card is neutral when its rank is at least two away from both
/// hole cards and it shares a suit with neither.
fn is_neutral(card: &Card, hand: &[Card; 2]) -> bool {
    hand.iter().all(|h| {
        let gap = (card.value() as i16 - h.value() as i16).abs();
        gap > 1 && card.suit != h.suit
    })
}

/// Index of the hole card worth keeping.
///
/// Pairs each hole card with one of two random neutral cards and plays the
/// two resulting hands against each other in both pairings. The average
/// equity, nudged toward the higher rank by `highcard_weight` per rank step,
/// decides.
pub fn choose_card_to_keep<O, R>(
    hand: &[Card; 2],
    board: &[Card],
    oracle: &O,
    rng: &mut R,
    iterations: usize,
    highcard_weight: f64,
) -> CfrResult<usize>
where
    O: EquityOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut neutral = undealt(hand, board);
    neutral.shuffle(rng);
    let mut picks = neutral.into_iter().filter(|c| is_neutral(c, hand));
    let (x, y) = match (picks.next(), picks.next()) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(CfrError::DeckExhausted {
                requested: 2,
                available: 0,
            })
        }
    };

    let (a, b) = (hand[0], hand[1]);
    let (a1, b1) = oracle.head_to_head(&[a, x], &[b, y], board, iterations);
    let (a2, b2) = oracle.head_to_head(&[a, y], &[b, x], board, iterations);

    let rank_diff = a.value() as f64 - b.value() as f64;
    let score_a = (a1 + a2) / 2.0 + highcard_weight * rank_diff;
    let score_b = (b1 + b2) / 2.0 - highcard_weight * rank_diff;

    Ok(if score_a > score_b { 0 } else { 1 })
}

/// Average equity of `hand` with `hand[slot]` replaced by each undealt card.
fn average_swap_equity<O: EquityOracle + ?Sized>(
    hand: &[Card; 2],
    board: &[Card],
    slot: usize,
    oracle: &O,
    iterations: usize,
) -> CfrResult<f64> {
    let candidates = undealt(hand, board);
    if candidates.is_empty() {
        return Err(CfrError::DeckExhausted {
            requested: 1,
            available: 0,
        });
    }
    let total: f64 = candidates
        .iter()
        .map(|&card| {
            let mut swapped = *hand;
            swapped[slot] = card;
            oracle.equity(&swapped, board, iterations)
        })
        .sum();
    Ok(total / candidates.len() as f64)
}

/// Keep the better card, then discard the other one only if an average
/// replacement beats the current hand by more than `min_improvement`.
pub fn should_discard<O, R>(
    hand: &[Card; 2],
    board: &[Card],
    oracle: &O,
    rng: &mut R,
    config: &DiscardConfig,
) -> CfrResult<DiscardDecision>
where
    O: EquityOracle + ?Sized,
    R: Rng + ?Sized,
{
    let keep = choose_card_to_keep(
        hand,
        board,
        oracle,
        rng,
        config.keep_iterations,
        config.highcard_weight,
    )?;
    let baseline = oracle.equity(hand, board, config.baseline_iterations);
    let toss = 1 - keep;
    let swap = average_swap_equity(hand, board, toss, oracle, config.swap_iterations)?;

    Ok(DiscardDecision {
        discard: (swap > baseline + config.min_improvement).then_some(toss),
        swap_equity: swap,
        baseline_equity: baseline,
    })
}

/// Score swapping either card and take the better swap if it clears the
/// threshold. Twice the oracle work of `should_discard`.
pub fn best_discard_exhaustive<O: EquityOracle + ?Sized>(
    hand: &[Card; 2],
    board: &[Card],
    oracle: &O,
    config: &DiscardConfig,
) -> CfrResult<DiscardDecision> {
    let baseline = oracle.equity(hand, board, config.baseline_iterations);
    let first = average_swap_equity(hand, board, 0, oracle, config.swap_iterations)?;
    let second = average_swap_equity(hand, board, 1, oracle, config.swap_iterations)?;

    let (slot, swap) = if first > second { (0, first) } else { (1, second) };
    if swap > baseline + config.min_improvement {
        Ok(DiscardDecision {
            discard: Some(slot),
            swap_equity: swap,
            baseline_equity: baseline,
        })
    } else {
        Ok(DiscardDecision {
            discard: None,
            swap_equity: 0.0,
            baseline_equity: baseline,
        })
    }
}

pub fn decide_discard<O, R>(
    hand: &[Card; 2],
    board: &[Card],
    oracle: &O,
    rng: &mut R,
    config: &DiscardConfig,
) -> CfrResult<DiscardDecision>
where
    O: EquityOracle + ?Sized,
    R: Rng + ?Sized,
{
    match config.method {
        DiscardMethod::Fast => should_discard(hand, board, oracle, rng, config),
        DiscardMethod::Exhaustive => best_discard_exhaustive(hand, board, oracle, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_hand;

    #[test]
    fn neutral_cards_avoid_neighbours_and_suits() {
        let hand = parse_hand("9s4h").unwrap();
        let eight = crate::cards::parse_card("8d").unwrap();
        let jack_spade = crate::cards::parse_card("Js").unwrap();
        let queen = crate::cards::parse_card("Qc").unwrap();
        assert!(!is_neutral(&eight, &hand));
        assert!(!is_neutral(&jack_spade, &hand));
        assert!(is_neutral(&queen, &hand));
    }
}
