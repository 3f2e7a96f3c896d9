//! Monte-Carlo CFR with average-strategy sampling.
//!
//! Each walk deals a fresh hand and follows one trajectory through chance and
//! opponent nodes. At the traverser's nodes every action is explored
//! independently with probability
//! `rho = max(epsilon, (beta + s[a]) / (beta + sum(s)))`, where `s` is the
//! cumulative strategy row, so historically favoured actions are explored more
//! often while every action keeps at least `epsilon`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, DiscardConfig};
use crate::equity::EquityOracle;
use crate::error::{CfrError, CfrResult};
use crate::history::{History, NodeKind};
use crate::tables::StrategyStore;

/// The walk is always evaluated from this player's seat; the button
/// alternates between walks instead.
pub const TRAVERSER: usize = 0;

/// Pick one action index from a distribution.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> CfrResult<usize> {
    let dist = WeightedIndex::new(weights).map_err(|e| CfrError::Sampling(e.to_string()))?;
    Ok(dist.sample(rng))
}

/// Summary of a finished `train` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub walks: u64,
    pub last_value: f64,
    pub seconds: f64,
}

pub struct Trainer<O: EquityOracle> {
    store: StrategyStore,
    oracle: O,
    config: Config,
    rng: StdRng,
    walks: u64,
    checkpoint_dir: Option<PathBuf>,
}

impl<O: EquityOracle> Trainer<O> {
    pub fn new(store: StrategyStore, oracle: O, config: Config) -> Self {
        let rng = match config.trainer.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Trainer {
            store,
            oracle,
            config,
            rng,
            walks: 0,
            checkpoint_dir: None,
        }
    }

    /// Persist tables to `dir` on the checkpoint cadence and when training
    /// ends.
    pub fn with_checkpoints<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.checkpoint_dir = Some(dir.into());
        self
    }

    pub fn store(&self) -> &StrategyStore {
        &self.store
    }

    pub fn into_store(self) -> StrategyStore {
        self.store
    }

    pub fn walks(&self) -> u64 {
        self.walks
    }

    /// Expected value for `traverser` of the subtree at `h`, sampled along a
    /// single trajectory. `q` is the sampling reach probability of `h`.
    pub fn walk_tree(&mut self, h: &History, traverser: usize, q: f64) -> CfrResult<f64> {
        match h.kind() {
            NodeKind::Terminal => Ok(h.terminal_utilities(&self.oracle)?[traverser]),
            NodeKind::Chance => {
                let next = h.resolve_chance(&self.oracle, &self.config.discard, &mut self.rng)?;
                self.walk_tree(&next, traverser, q)
            }
            NodeKind::Decision if h.active_player() != traverser => {
                self.walk_opponent(h, traverser, q)
            }
            NodeKind::Decision => self.walk_traverser(h, traverser, q),
        }
    }

    fn walk_opponent(&mut self, h: &History, traverser: usize, q: f64) -> CfrResult<f64> {
        let key = h.infoset_key(h.active_player());
        let legal = h.legal_actions()?;
        let sigma = self.store.current_strategy(&key, &legal)?;
        self.store.accumulate_strategy(&key, &legal, &sigma, q)?;

        let pick = sample_index(&sigma, &mut self.rng)?;
        let next = h.apply_action(legal[pick])?;
        self.walk_tree(&next, traverser, q)
    }

    fn walk_traverser(&mut self, h: &History, traverser: usize, q: f64) -> CfrResult<f64> {
        let key = h.infoset_key(traverser);
        let legal = h.legal_actions()?;
        let sigma = self.store.current_strategy(&key, &legal)?;
        if self.config.trainer.accumulate_traverser_strategy {
            self.store.accumulate_strategy(&key, &legal, &sigma, q)?;
        }

        let s = self.store.strategy_row(&key, &legal)?;
        let total: f64 = s.iter().sum();
        let (epsilon, beta) = (self.config.trainer.epsilon, self.config.trainer.beta);

        // Unexplored actions keep a value of zero and still receive a regret
        // update below.
        let mut values = vec![0.0; legal.len()];
        for (slot, &action) in legal.iter().enumerate() {
            let rho = epsilon.max((beta + s[slot]) / (beta + total));
            if self.rng.gen::<f64>() < rho {
                let next = h.apply_action(action)?;
                values[slot] = self.walk_tree(&next, traverser, q * rho.min(1.0))?;
            }
        }

        let sigma_ev: f64 = sigma.iter().zip(&values).map(|(p, v)| p * v).sum();
        let deltas: Vec<f64> = values.iter().map(|v| v - sigma_ev).collect();
        self.store.add_regrets(&key, &legal, &deltas)?;
        Ok(sigma_ev)
    }

    /// One walk from a fresh root; the button alternates with the walk count.
    pub fn run_walk(&mut self) -> CfrResult<f64> {
        let button = (self.walks % 2) as usize;
        let root = History::root(button, self.config.game, &mut self.rng);
        let value = self.walk_tree(&root, TRAVERSER, 1.0)?;
        self.walks += 1;
        Ok(value)
    }

    fn is_checkpoint(&self) -> bool {
        let t = &self.config.trainer;
        self.walks == t.first_checkpoint || self.walks % t.checkpoint_every == 0
    }

    fn checkpoint(&self) -> CfrResult<()> {
        if let Some(dir) = &self.checkpoint_dir {
            self.store.flush(dir)?;
            log::info!(
                "checkpoint at walk {}: {} infosets written to {}",
                self.walks,
                self.store.num_infosets(),
                dir.display()
            );
        }
        Ok(())
    }

    /// Walk until `limit` walks have run (if set) or `stop` is raised, then
    /// flush. Errors abort training without a final flush, so the last good
    /// checkpoint stays on disk.
    pub fn train(&mut self, limit: Option<u64>, stop: Arc<AtomicBool>) -> CfrResult<TrainingReport> {
        let start = Instant::now();
        let mut last_value = 0.0;
        let mut done = 0u64;

        while limit.map_or(true, |n| done < n) && !stop.load(Ordering::Relaxed) {
            last_value = self.run_walk()?;
            done += 1;

            if self.walks % self.config.trainer.log_every.max(1) == 0 {
                let counters = self.store.counters();
                log::info!(
                    "walk {:>8} | regrets {:>7} strategy {:>7} | updates {}/{} revisits {} | value {:+.3} | {:.1}s",
                    self.walks,
                    self.store.regrets().len(),
                    self.store.strategy().len(),
                    counters.regret_updates,
                    counters.strategy_updates,
                    counters.revisits,
                    last_value,
                    start.elapsed().as_secs_f64()
                );
            }
            if self.is_checkpoint() {
                self.checkpoint()?;
            }
        }

        if stop.load(Ordering::Relaxed) {
            log::warn!("training interrupted after {} walks", self.walks);
        }
        self.checkpoint()?;
        Ok(TrainingReport {
            walks: done,
            last_value,
            seconds: start.elapsed().as_secs_f64(),
        })
    }
}

/// Spawn a thread that raises the returned flag once `q` is entered on stdin.
pub fn stdin_interrupt() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);
    std::thread::spawn(move || {
        log::info!("training started. type 'q + Enter' to stop after the current walk.");
        let mut buffer = String::new();
        loop {
            buffer.clear();
            match std::io::stdin().read_line(&mut buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) if buffer.trim().eq_ignore_ascii_case("q") => {
                    log::warn!("stop requested, finishing current walk...");
                    raised.store(true, Ordering::Relaxed);
                    break;
                }
                Ok(_) => {}
            }
        }
    });
    flag
}

/// Play one hand from `root` to a terminal node. Each seat samples the
/// stored average strategy for its key, uniformly when the key is unknown.
/// Returns the terminal node and the key seen at every decision.
pub fn play_hand<O, R>(
    root: History,
    store: &StrategyStore,
    oracle: &O,
    discard: &DiscardConfig,
    rng: &mut R,
) -> CfrResult<(History, Vec<String>)>
where
    O: EquityOracle + ?Sized,
    R: Rng + ?Sized,
{
    let mut h = root;
    let mut keys = Vec::new();
    loop {
        h = match h.kind() {
            NodeKind::Terminal => return Ok((h, keys)),
            NodeKind::Chance => h.resolve_chance(oracle, discard, rng)?,
            NodeKind::Decision => {
                let key = h.infoset_key(h.active_player());
                let legal = h.legal_actions()?;
                let pick = sample_index(&store.playable_weights(&key, &legal), rng)?;
                keys.push(key);
                h.apply_action(legal[pick])?
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_index_respects_zero_weight() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(sample_index(&[0.0, 1.0, 0.0], &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn sample_index_rejects_empty_mass() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            sample_index(&[0.0, 0.0], &mut rng),
            Err(CfrError::Sampling(_))
        ));
    }
}
