//! Configuration for the game rules, the discard heuristic and the trainer.
//!
//! Every section has defaults matching the reference engine (200-chip stacks,
//! 1/2 blinds). A JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CfrError, CfrResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    /// Pot-size bets are dropped once half the pot exceeds this fraction of
    /// either remaining bankroll.
    pub pot_commit_fraction: f64,
    /// Oracle trials for the equities written into the action log.
    pub equity_iterations: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            starting_stack: 200,
            small_blind: 1,
            big_blind: 2,
            pot_commit_fraction: 0.6,
            equity_iterations: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardMethod {
    /// Pick the card to keep first, then score swaps of the other one.
    Fast,
    /// Score swaps of both cards against every remaining card.
    Exhaustive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscardConfig {
    pub min_improvement: f64,
    pub baseline_iterations: usize,
    pub swap_iterations: usize,
    pub keep_iterations: usize,
    pub highcard_weight: f64,
    pub method: DiscardMethod,
}

impl Default for DiscardConfig {
    fn default() -> Self {
        DiscardConfig {
            min_improvement: 0.02,
            baseline_iterations: 1000,
            swap_iterations: 100,
            keep_iterations: 1000,
            highcard_weight: 0.03,
            method: DiscardMethod::Fast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Exploration floor for traverser action sampling.
    pub epsilon: f64,
    /// Smoothing constant of average-strategy sampling.
    pub beta: f64,
    pub first_checkpoint: u64,
    pub checkpoint_every: u64,
    pub log_every: u64,
    pub accumulate_traverser_strategy: bool,
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            epsilon: 0.1,
            beta: 10.0,
            first_checkpoint: 100,
            checkpoint_every: 1000,
            log_every: 10,
            accumulate_traverser_strategy: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub discard: DiscardConfig,
    pub trainer: TrainerConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> CfrResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> CfrResult<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CfrResult<()> {
        let g = &self.game;
        if g.starting_stack == 0 {
            return Err(CfrError::Config("starting_stack must be positive".into()));
        }
        if g.small_blind == 0 || g.small_blind > g.big_blind {
            return Err(CfrError::Config(
                "blinds must satisfy 0 < small_blind <= big_blind".into(),
            ));
        }
        if g.big_blind >= g.starting_stack {
            return Err(CfrError::Config("big_blind must be below starting_stack".into()));
        }
        if !(g.pot_commit_fraction > 0.0) {
            return Err(CfrError::Config("pot_commit_fraction must be positive".into()));
        }

        let d = &self.discard;
        if d.min_improvement < 0.0 {
            return Err(CfrError::Config("min_improvement must be non-negative".into()));
        }

        let t = &self.trainer;
        if !(t.epsilon > 0.0 && t.epsilon <= 1.0) {
            return Err(CfrError::Config("epsilon must lie in (0, 1]".into()));
        }
        if t.beta < 0.0 {
            return Err(CfrError::Config("beta must be non-negative".into()));
        }
        if t.checkpoint_every == 0 {
            return Err(CfrError::Config("checkpoint_every must be positive".into()));
        }
        Ok(())
    }
}
