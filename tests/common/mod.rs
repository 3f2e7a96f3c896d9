#![allow(dead_code)]

use pineapple_cfr::cards::Card;
use pineapple_cfr::equity::{EquityOracle, Showdown};
use pineapple_cfr::error::CfrResult;

/// Same equity for every hand; showdowns resolve to a fixed outcome.
pub struct FlatOracle {
    pub equity: f64,
    pub showdown: Showdown,
}

impl FlatOracle {
    pub fn new(equity: f64, showdown: Showdown) -> Self {
        FlatOracle { equity, showdown }
    }
}

impl EquityOracle for FlatOracle {
    fn equity(&self, _hand: &[Card; 2], _board: &[Card], _iterations: usize) -> f64 {
        self.equity
    }

    fn head_to_head(&self, _a: &[Card; 2], _b: &[Card; 2], _board: &[Card], _iterations: usize) -> (f64, f64) {
        (0.5, 0.5)
    }

    fn compare(&self, _a: &[Card; 2], _b: &[Card; 2], _board: &[Card]) -> CfrResult<Showdown> {
        Ok(self.showdown)
    }
}

/// Equity grows with the hole-card ranks, so low cards are worth replacing.
pub struct RankOracle;

impl EquityOracle for RankOracle {
    fn equity(&self, hand: &[Card; 2], _board: &[Card], _iterations: usize) -> f64 {
        (hand[0].value() + hand[1].value()) as f64 / 28.0
    }

    fn head_to_head(&self, _a: &[Card; 2], _b: &[Card; 2], _board: &[Card], _iterations: usize) -> (f64, f64) {
        (0.5, 0.5)
    }
}

/// Fresh scratch directory under the system temp dir, removed on drop.
pub struct ScratchDir(pub std::path::PathBuf);

impl ScratchDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "pineapple-cfr-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        ScratchDir(path)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
