//! Cumulative regret and strategy tables.
//!
//! Both tables map an information-set key to a row of per-action weights.
//! Rows are created lazily the first time a key is updated; a key that was
//! never visited is a cold start, not an error.
//!
//! On disk each table is one JSON object `{ infoset: { action: weight } }`
//! with the compact action tokens as inner keys.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{CfrError, CfrResult};

pub const REGRETS_FILE: &str = "cumulative_regrets.json";
pub const STRATEGY_FILE: &str = "cumulative_strategy.json";

pub type Row = BTreeMap<Action, f64>;
pub type Table = HashMap<String, Row>;

/// Running totals of table writes, reported by the trainer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCounters {
    pub regret_updates: u64,
    pub strategy_updates: u64,
    /// Updates that hit an already existing row.
    pub revisits: u64,
}

#[derive(Debug, Clone, Default)]
pub struct StrategyStore {
    regrets: Table,
    strategy: Table,
    counters: UpdateCounters,
}

fn uniform(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Rows must cover exactly the legal actions of the node they were built at.
fn check_row(key: &str, row: &Row, legal: &[Action]) -> CfrResult<()> {
    if row.len() != legal.len() || legal.iter().any(|a| !row.contains_key(a)) {
        return Err(CfrError::ActionMismatch {
            infoset: key.to_string(),
        });
    }
    Ok(())
}

impl StrategyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(regrets: Table, strategy: Table) -> Self {
        StrategyStore {
            regrets,
            strategy,
            counters: UpdateCounters::default(),
        }
    }

    pub fn regrets(&self) -> &Table {
        &self.regrets
    }

    pub fn strategy(&self) -> &Table {
        &self.strategy
    }

    pub fn counters(&self) -> UpdateCounters {
        self.counters
    }

    pub fn num_infosets(&self) -> usize {
        self.regrets.len().max(self.strategy.len())
    }

    // -----------------------------------------------------------------------
    // Regret matching
    // -----------------------------------------------------------------------

    /// Current strategy at `key` over `legal`, in the order of `legal`.
    ///
    /// Proportional to positive cumulative regret; uniform when the key is
    /// unseen or no action has positive regret.
    pub fn current_strategy(&self, key: &str, legal: &[Action]) -> CfrResult<Vec<f64>> {
        let row = match self.regrets.get(key) {
            Some(row) => row,
            None => return Ok(uniform(legal.len())),
        };
        check_row(key, row, legal)?;

        let positive: Vec<f64> = legal.iter().map(|a| row[a].max(0.0)).collect();
        let total: f64 = positive.iter().sum();
        if total > 0.0 {
            Ok(positive.into_iter().map(|r| r / total).collect())
        } else {
            Ok(uniform(legal.len()))
        }
    }

    /// Cumulative strategy weights at `key` in the order of `legal`, creating
    /// a zero row if the key is unseen.
    pub fn strategy_row(&mut self, key: &str, legal: &[Action]) -> CfrResult<Vec<f64>> {
        let row = self
            .strategy
            .entry(key.to_string())
            .or_insert_with(|| legal.iter().map(|&a| (a, 0.0)).collect());
        check_row(key, row, legal)?;
        Ok(legal.iter().map(|a| row[a]).collect())
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    /// `strategy[key][a] += sigma[a] / q` for every legal action.
    pub fn accumulate_strategy(
        &mut self,
        key: &str,
        legal: &[Action],
        sigma: &[f64],
        q: f64,
    ) -> CfrResult<()> {
        let existed = self.strategy.contains_key(key);
        add_to_row(&mut self.strategy, key, legal, sigma, 1.0 / q)?;
        self.counters.strategy_updates += 1;
        if existed {
            self.counters.revisits += 1;
        }
        Ok(())
    }

    /// `regrets[key][a] += deltas[a]` for every legal action.
    pub fn add_regrets(&mut self, key: &str, legal: &[Action], deltas: &[f64]) -> CfrResult<()> {
        let existed = self.regrets.contains_key(key);
        add_to_row(&mut self.regrets, key, legal, deltas, 1.0)?;
        self.counters.regret_updates += 1;
        if existed {
            self.counters.revisits += 1;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    /// Average strategy at `key`, normalised to sum to one. `None` when the key
    /// was never visited or its row carries no weight.
    pub fn query_strategy(&self, key: &str) -> Option<Vec<(Action, f64)>> {
        let row = self.strategy.get(key)?;
        let total: f64 = row.values().sum();
        if !(total > 0.0) {
            return None;
        }
        Some(row.iter().map(|(&a, &w)| (a, w / total)).collect())
    }

    /// Sampling weights over `legal` from the average strategy, uniform when
    /// the key is unknown or none of its actions are in `legal`.
    pub fn playable_weights(&self, key: &str, legal: &[Action]) -> Vec<f64> {
        let weights: Vec<f64> = match self.strategy.get(key) {
            Some(row) => legal.iter().map(|a| row.get(a).copied().unwrap_or(0.0).max(0.0)).collect(),
            None => Vec::new(),
        };
        if weights.iter().sum::<f64>() > 0.0 {
            weights
        } else {
            vec![1.0; legal.len()]
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load both tables from `dir`. A missing file yields an empty table.
    pub fn load<P: AsRef<Path>>(dir: P) -> CfrResult<Self> {
        let dir = dir.as_ref();
        let regrets = read_table(&dir.join(REGRETS_FILE))?;
        let strategy = read_table(&dir.join(STRATEGY_FILE))?;
        log::info!(
            "loaded {} regret rows and {} strategy rows from {}",
            regrets.len(),
            strategy.len(),
            dir.display()
        );
        Ok(Self::from_tables(regrets, strategy))
    }

    /// Overwrite both table files in `dir`.
    pub fn flush<P: AsRef<Path>>(&self, dir: P) -> CfrResult<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        write_table(&dir.join(REGRETS_FILE), &self.regrets)?;
        write_table(&dir.join(STRATEGY_FILE), &self.strategy)?;
        log::debug!("flushed {} infosets to {}", self.num_infosets(), dir.display());
        Ok(())
    }
}

fn add_to_row(
    table: &mut Table,
    key: &str,
    legal: &[Action],
    values: &[f64],
    scale: f64,
) -> CfrResult<()> {
    if values.len() != legal.len() {
        return Err(CfrError::ActionMismatch {
            infoset: key.to_string(),
        });
    }
    let row = table
        .entry(key.to_string())
        .or_insert_with(|| legal.iter().map(|&a| (a, 0.0)).collect());
    check_row(key, row, legal)?;
    for (action, value) in legal.iter().zip(values) {
        if let Some(cell) = row.get_mut(action) {
            *cell += value * scale;
        }
    }
    Ok(())
}

fn read_table(path: &Path) -> CfrResult<Table> {
    if !path.exists() {
        return Ok(Table::new());
    }
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Write to a sibling temp file and rename over the target, so a reader never
/// sees a half-written table.
fn write_table(path: &Path, table: &Table) -> CfrResult<()> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(table)?;
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
