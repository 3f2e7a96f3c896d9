mod common;

use common::{FlatOracle, RankOracle};
use pineapple_cfr::cards::{parse_board, parse_hand};
use pineapple_cfr::config::{DiscardConfig, DiscardMethod};
use pineapple_cfr::discard::*;
use pineapple_cfr::equity::{MonteCarloOracle, Showdown};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn quick() -> DiscardConfig {
    DiscardConfig {
        baseline_iterations: 600,
        swap_iterations: 60,
        keep_iterations: 300,
        ..DiscardConfig::default()
    }
}

#[test]
fn test_keeps_the_higher_card_when_equities_tie() {
    let mut rng = StdRng::seed_from_u64(1);
    let board = parse_board("KdQc7s").unwrap();
    let hand = parse_hand("2s9h").unwrap();
    let keep = choose_card_to_keep(&hand, &board, &RankOracle, &mut rng, 100, 0.03).unwrap();
    assert_eq!(keep, 1);
    let hand = parse_hand("9h2s").unwrap();
    let keep = choose_card_to_keep(&hand, &board, &RankOracle, &mut rng, 100, 0.03).unwrap();
    assert_eq!(keep, 0);
}

#[test]
fn test_low_card_is_thrown() {
    let mut rng = StdRng::seed_from_u64(2);
    let hand = parse_hand("2s9h").unwrap();
    let board = parse_board("KdQc7s").unwrap();
    let decision = should_discard(&hand, &board, &RankOracle, &mut rng, &DiscardConfig::default()).unwrap();
    assert_eq!(decision.discard, Some(0));
    assert!(decision.should_discard());
    assert!(decision.swap_equity > decision.baseline_equity + 0.02);
}

#[test]
fn test_strong_hand_stands_pat() {
    let mut rng = StdRng::seed_from_u64(3);
    let hand = parse_hand("AsKh").unwrap();
    let board = parse_board("KdQc7s").unwrap();
    let decision = should_discard(&hand, &board, &RankOracle, &mut rng, &DiscardConfig::default()).unwrap();
    assert_eq!(decision.discard, None);
}

#[test]
fn test_no_gain_means_no_discard() {
    let mut rng = StdRng::seed_from_u64(4);
    let oracle = FlatOracle::new(0.3, Showdown::Tie);
    let hand = parse_hand("2s3h").unwrap();
    let board = parse_board("KdQc7s").unwrap();
    for config in [DiscardConfig::default(), DiscardConfig { method: DiscardMethod::Exhaustive, ..DiscardConfig::default() }] {
        let decision = decide_discard(&hand, &board, &oracle, &mut rng, &config).unwrap();
        assert!(!decision.should_discard());
    }
}

#[test]
fn test_exhaustive_picks_the_better_swap() {
    let hand = parse_hand("2s9h").unwrap();
    let board = parse_board("KdQc7s").unwrap();
    let decision = best_discard_exhaustive(&hand, &board, &RankOracle, &DiscardConfig::default()).unwrap();
    assert_eq!(decision.discard, Some(0));
}

#[test]
fn test_threshold_is_configurable() {
    let mut rng = StdRng::seed_from_u64(5);
    let hand = parse_hand("2s9h").unwrap();
    let board = parse_board("KdQc7s").unwrap();
    let strict = DiscardConfig {
        min_improvement: 0.5,
        ..DiscardConfig::default()
    };
    let decision = should_discard(&hand, &board, &RankOracle, &mut rng, &strict).unwrap();
    assert_eq!(decision.discard, None);
}

#[test]
fn test_overpair_keeps_both_cards() {
    let oracle = MonteCarloOracle::new(17);
    let board = parse_board("2c7h9s").unwrap();
    let hand = parse_hand("AsAd").unwrap();
    for seed in 0..3 {
        let mut rng = StdRng::seed_from_u64(seed);
        let decision = should_discard(&hand, &board, &oracle, &mut rng, &quick()).unwrap();
        assert!(!decision.should_discard(), "seed {}", seed);
    }
}

#[test]
fn test_air_looks_for_a_replacement() {
    let oracle = MonteCarloOracle::new(23);
    let board = parse_board("AhKsQd").unwrap();
    let hand = parse_hand("2c3h").unwrap();
    let mut rng = StdRng::seed_from_u64(8);
    let decision = should_discard(&hand, &board, &oracle, &mut rng, &DiscardConfig::default()).unwrap();
    assert!(decision.should_discard());
}
