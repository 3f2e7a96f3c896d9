//! Equity oracle: Monte-Carlo hand strength and showdown comparison.
//!
//! The solver only talks to the `EquityOracle` trait. `MonteCarloOracle` is the
//! default implementation; it splits trials into fixed-size chunks evaluated in
//! parallel, each chunk seeded from the oracle seed, a per-call counter and the
//! chunk index, so results are reproducible for a given seed and call order.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::cards::{remaining_cards, Card};
use crate::error::{CfrError, CfrResult};
use crate::hand_evaluator::compare_hands;

const CHUNK: usize = 64;

/// Result of comparing two hands on a complete board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Showdown {
    A,
    B,
    Tie,
}

pub trait EquityOracle {
    /// Probability that `hand` beats a uniformly random opponent hand, ties
    /// counted as half a win.
    fn equity(&self, hand: &[Card; 2], board: &[Card], iterations: usize) -> f64;

    /// Equities of two known hands against each other, `(a, b)`, summing to 1.
    fn head_to_head(
        &self,
        a: &[Card; 2],
        b: &[Card; 2],
        board: &[Card],
        iterations: usize,
    ) -> (f64, f64);

    /// Deterministic showdown on a five-card board.
    fn compare(&self, a: &[Card; 2], b: &[Card; 2], board: &[Card]) -> CfrResult<Showdown> {
        if board.len() != 5 {
            return Err(CfrError::Accounting(format!(
                "showdown needs a 5-card board, got {}",
                board.len()
            )));
        }
        Ok(match compare_hands(a, b, board)? {
            Ordering::Greater => Showdown::A,
            Ordering::Less => Showdown::B,
            Ordering::Equal => Showdown::Tie,
        })
    }
}

pub struct MonteCarloOracle {
    seed: u64,
    calls: AtomicU64,
}

impl MonteCarloOracle {
    pub fn new(seed: u64) -> Self {
        MonteCarloOracle {
            seed,
            calls: AtomicU64::new(0),
        }
    }

    fn next_call(&self) -> u64 {
        self.calls.fetch_add(1, AtomicOrdering::Relaxed)
    }

    fn chunk_rng(&self, call: u64, chunk: usize) -> StdRng {
        let mixed = self
            .seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(call.wrapping_mul(0xBF58_476D_1CE4_E5B9))
            .wrapping_add(chunk as u64);
        StdRng::seed_from_u64(mixed)
    }

    /// Mean score for hero over `iterations` runouts. `draw` receives a
    /// shuffled deck and returns hero's score for that trial; unscored trials
    /// are left out of the mean.
    fn simulate<F>(&self, dead: &[Card], iterations: usize, draw: F) -> f64
    where
        F: Fn(&[Card]) -> Option<f64> + Sync,
    {
        if iterations == 0 {
            return 0.5;
        }
        let call = self.next_call();
        let remaining = remaining_cards(dead);
        let chunks = iterations.div_ceil(CHUNK);

        let (total, scored) = (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut rng = self.chunk_rng(call, chunk);
                let mut deck = remaining.clone();
                let trials = CHUNK.min(iterations - chunk * CHUNK);
                (0..trials)
                    .filter_map(|_| {
                        deck.shuffle(&mut rng);
                        draw(&deck)
                    })
                    .fold((0.0, 0usize), |(sum, n), x| (sum + x, n + 1))
            })
            .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

        if scored == 0 {
            return 0.5;
        }
        total / scored as f64
    }
}

impl Default for MonteCarloOracle {
    fn default() -> Self {
        MonteCarloOracle::new(rand::random())
    }
}

/// Hero's share of one runout; `None` when the hands cannot be ranked.
fn score(hero: &[Card], villain: &[Card], board: &[Card]) -> Option<f64> {
    match compare_hands(hero, villain, board) {
        Ok(Ordering::Greater) => Some(1.0),
        Ok(Ordering::Equal) => Some(0.5),
        Ok(Ordering::Less) => Some(0.0),
        Err(e) => {
            log::warn!("unscored runout: {}", e);
            None
        }
    }
}

impl EquityOracle for MonteCarloOracle {
    fn equity(&self, hand: &[Card; 2], board: &[Card], iterations: usize) -> f64 {
        let mut dead: Vec<Card> = hand.to_vec();
        dead.extend_from_slice(board);
        let needed = 5 - board.len().min(5);

        self.simulate(&dead, iterations, |deck| {
            let villain = &deck[..2];
            let mut full_board = board.to_vec();
            full_board.extend_from_slice(&deck[2..2 + needed]);
            score(hand, villain, &full_board)
        })
    }

    fn head_to_head(
        &self,
        a: &[Card; 2],
        b: &[Card; 2],
        board: &[Card],
        iterations: usize,
    ) -> (f64, f64) {
        let mut dead: Vec<Card> = a.to_vec();
        dead.extend_from_slice(b);
        dead.extend_from_slice(board);
        let needed = 5 - board.len().min(5);

        let ea = self.simulate(&dead, iterations, |deck| {
            let mut full_board = board.to_vec();
            full_board.extend_from_slice(&deck[..needed]);
            score(a, b, &full_board)
        });
        (ea, 1.0 - ea)
    }
}
