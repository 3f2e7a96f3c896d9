mod common;

use common::{FlatOracle, RankOracle};
use pineapple_cfr::action::{Action, Size};
use pineapple_cfr::cards::FULL_DECK;
use pineapple_cfr::config::{DiscardConfig, GameConfig};
use pineapple_cfr::dealer::Dealer;
use pineapple_cfr::equity::Showdown;
use pineapple_cfr::error::CfrError;
use pineapple_cfr::history::{History, LogEntry, NodeKind, Round, Street};
use pineapple_cfr::tables::StrategyStore;
use pineapple_cfr::trainer::play_hand;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn dealt(button: usize, oracle: &FlatOracle) -> History {
    let root = History::new(button, Dealer::from_cards(FULL_DECK.clone()), GameConfig::default());
    let mut rng = StdRng::seed_from_u64(1);
    root.resolve_chance(oracle, &DiscardConfig::default(), &mut rng).unwrap()
}

fn apply_all(h: &History, actions: &[Action]) -> History {
    actions
        .iter()
        .fold(h.clone(), |h, &a| h.apply_action(a).unwrap())
}

fn next_street(h: &History, oracle: &FlatOracle) -> History {
    let mut rng = StdRng::seed_from_u64(2);
    h.resolve_chance(oracle, &DiscardConfig::default(), &mut rng).unwrap()
}

#[test]
fn test_root_is_chance() {
    let mut rng = StdRng::seed_from_u64(0);
    let root = History::root(0, GameConfig::default(), &mut rng);
    assert_eq!(root.kind(), NodeKind::Chance);
    assert_eq!(root.street(), Street::Preflop);
    assert_eq!(root.round(), Round::Deal);
    assert!(root.board().is_empty());
    assert!(root.hand(0).is_none());
    assert!(matches!(root.legal_actions(), Err(CfrError::WrongNodeKind { .. })));
}

#[test]
fn test_preflop_deal_posts_blinds() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = dealt(0, &oracle);
    assert_eq!(h.kind(), NodeKind::Decision);
    assert_eq!(h.pot(), 3);
    assert_eq!(h.bankroll(), [199, 198]);
    assert_eq!(h.in_pot(), [1, 2]);
    assert_eq!(h.active_player(), 0);
    assert_eq!(h.round(), Round::Betting(1));
    assert!(h.check_chips().is_ok());
    assert!(matches!(h.log()[0], LogEntry::Hands { .. }));
    assert_eq!(h.log()[0].to_string(), "H0:2s2h:0.500:H1:2d2c:0.500");
}

#[test]
fn test_button_faces_small_blind_difference() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = dealt(1, &oracle);
    assert_eq!(h.active_player(), 1);
    assert_eq!(
        h.legal_actions().unwrap(),
        vec![Action::Fold, Action::Call, Action::Raise(Size::Pot), Action::Raise(Size::AllIn)]
    );
}

#[test]
fn test_fold_scenario_zero_sum() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = dealt(0, &oracle);
    let h = apply_all(&h, &[Action::Call, Action::Fold]);
    assert_eq!(h.kind(), NodeKind::Terminal);
    let [u0, u1] = h.terminal_utilities(&oracle).unwrap();
    assert!(u0 > 0.0);
    assert_eq!(u0 + u1, 0.0);
    assert_eq!(u0, 2.0);
}

#[test]
fn test_fold_to_pot_bet() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = dealt(0, &oracle);
    let h = apply_all(&h, &[Action::Call, Action::Bet(Size::Pot)]);
    assert_eq!(h.pot(), 8);
    assert_eq!(h.round(), Round::Betting(2));
    assert_eq!(h.active_player(), 0);
    let h = h.apply_action(Action::Fold).unwrap();
    assert_eq!(h.terminal_utilities(&oracle).unwrap(), [-2.0, 2.0]);
}

#[test]
fn test_limped_preflop_moves_to_flop() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = dealt(0, &oracle);
    let h = h.apply_action(Action::Call).unwrap();
    assert_eq!(h.kind(), NodeKind::Decision);
    assert_eq!(h.street(), Street::Preflop);
    let h = h.apply_action(Action::Check).unwrap();
    assert_eq!(h.kind(), NodeKind::Chance);
    assert_eq!(h.street(), Street::Flop);
    assert_eq!(h.in_pot(), [0, 0]);
    assert_eq!(h.active_player(), 1);
}

#[test]
fn test_checked_down_tie_pays_nothing() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let mut h = apply_all(&dealt(0, &oracle), &[Action::Call, Action::Check]);
    for _ in 0..3 {
        h = next_street(&h, &oracle);
        assert_eq!(h.active_player(), 1);
        h = apply_all(&h, &[Action::Check, Action::Check]);
    }
    assert_eq!(h.kind(), NodeKind::Terminal);
    assert_eq!(h.street(), Street::Showdown);
    assert_eq!(h.board().len(), 5);
    assert_eq!(h.terminal_utilities(&oracle).unwrap(), [0.0, 0.0]);
}

#[test]
fn test_showdown_winner_takes_half_pot() {
    let oracle = FlatOracle::new(0.5, Showdown::B);
    let mut h = apply_all(&dealt(0, &oracle), &[Action::Call, Action::Check]);
    for _ in 0..3 {
        h = next_street(&h, &oracle);
        h = apply_all(&h, &[Action::Check, Action::Check]);
    }
    assert_eq!(h.terminal_utilities(&oracle).unwrap(), [-2.0, 2.0]);
}

#[test]
fn test_flop_logs_board_and_stand_pats() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = apply_all(&dealt(0, &oracle), &[Action::Call, Action::Check]);
    let h = next_street(&h, &oracle);
    let tail: Vec<String> = h.log()[3..].iter().map(|e| e.to_string()).collect();
    assert_eq!(tail, vec!["FP:3s3h3d:H0:0.500:H1:0.500", "0:CK", "1:CK"]);
    assert_eq!(h.infoset_key(0), "H2.*CL.CK.H2.");
}

#[test]
fn test_discard_replaces_low_card() {
    let oracle = RankOracle;
    let root = History::new(0, Dealer::from_cards(FULL_DECK.clone()), GameConfig::default());
    let mut rng = StdRng::seed_from_u64(9);
    let discard = DiscardConfig::default();
    let h = root.resolve_chance(&oracle, &discard, &mut rng).unwrap();
    let h = apply_all(&h, &[Action::Call, Action::Check]);
    let h = h.resolve_chance(&oracle, &discard, &mut rng).unwrap();

    let discards = h
        .log()
        .iter()
        .filter(|e| matches!(e, LogEntry::Discard { .. }))
        .count();
    assert_eq!(discards, 2);
    // both started with a pair of deuces and threw the first one
    let [p0, p1] = [h.hand(0).unwrap(), h.hand(1).unwrap()];
    assert_eq!(p0[1].to_string(), "2h");
    assert_eq!(p1[1].to_string(), "2c");
    assert!(p0[0].value() > 2 && p1[0].value() > 2);
    assert!(h.check_chips().is_ok());
}

#[test]
fn test_bet_then_raise_accounting() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = apply_all(&dealt(0, &oracle), &[Action::Call, Action::Check]);
    let h = next_street(&h, &oracle);
    // pot 4: half-pot bet is 2, then a pot raise calls 2 and adds the 6 in the pot
    let h = h.apply_action(Action::Bet(Size::Half)).unwrap();
    assert_eq!(h.in_pot(), [0, 2]);
    assert_eq!(h.round(), Round::Betting(1));
    let h = h.apply_action(Action::Raise(Size::Pot)).unwrap();
    assert_eq!(h.in_pot(), [8, 2]);
    assert_eq!(h.round(), Round::Betting(2));
    assert_eq!(h.pot(), 14);
    let h = h.apply_action(Action::Call).unwrap();
    assert_eq!(h.kind(), NodeKind::Chance);
    assert_eq!(h.street(), Street::Turn);
    assert_eq!(h.bankroll(), [190, 190]);
}

#[test]
fn test_call_without_debt_is_rejected() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = apply_all(&dealt(0, &oracle), &[Action::Call]);
    assert!(matches!(h.apply_action(Action::Call), Err(CfrError::Accounting(_))));
}

#[test]
fn test_all_in_leaves_fold_or_call() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = apply_all(&dealt(0, &oracle), &[Action::Call, Action::Bet(Size::AllIn)]);
    assert_eq!(h.bankroll(), [198, 0]);
    assert_eq!(h.legal_actions().unwrap(), vec![Action::Fold, Action::Call]);
    let h = h.apply_action(Action::Call).unwrap();
    let h = next_street(&h, &oracle);
    assert_eq!(h.legal_actions().unwrap(), vec![Action::Check]);
}

#[test]
fn test_pot_commitment_drops_pot_sized_bets() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = apply_all(
        &dealt(0, &oracle),
        &[Action::Raise(Size::Pot), Action::Raise(Size::Pot), Action::Raise(Size::Pot)],
    );
    // pot 41 with 171 and 188 behind: still free to raise pot
    let legal = h.legal_actions().unwrap();
    assert!(legal.contains(&Action::Raise(Size::Pot)));
    assert!(h.check_chips().is_ok());

    // pot 239 with only 31 left for player 0
    let h = apply_all(&h, &[Action::Raise(Size::Pot), Action::Raise(Size::Pot)]);
    assert_eq!(h.bankroll(), [31, 130]);
    let legal = h.legal_actions().unwrap();
    assert!(!legal.contains(&Action::Raise(Size::Pot)));
    assert!(legal.contains(&Action::Raise(Size::AllIn)));
}

#[test]
fn test_random_hands_conserve_chips_and_sum_to_zero() {
    let store = StrategyStore::new();
    let discard = DiscardConfig::default();
    for (seed, showdown) in [(1, Showdown::A), (2, Showdown::B), (3, Showdown::Tie)] {
        let oracle = FlatOracle::new(0.4, showdown);
        let mut rng = StdRng::seed_from_u64(seed);
        for n in 0..200 {
            let root = History::root(n % 2, GameConfig::default(), &mut rng);
            let (terminal, keys) = play_hand(root, &store, &oracle, &discard, &mut rng).unwrap();
            assert!(!keys.is_empty());
            assert!(terminal.check_chips().is_ok());
            let [u0, u1] = terminal.terminal_utilities(&oracle).unwrap();
            assert_eq!(u0 + u1, 0.0);
        }
    }
}

#[test]
fn test_legal_actions_well_formed_along_random_play() {
    let oracle = FlatOracle::new(0.6, Showdown::A);
    let discard = DiscardConfig::default();
    let mut rng = StdRng::seed_from_u64(77);
    for n in 0..200 {
        let mut h = History::root(n % 2, GameConfig::default(), &mut rng);
        while h.kind() != NodeKind::Terminal {
            if h.kind() == NodeKind::Chance {
                h = h.resolve_chance(&oracle, &discard, &mut rng).unwrap();
                continue;
            }
            let legal = h.legal_actions().unwrap();
            assert!(!legal.is_empty());
            let owed = h.owed();
            for a in &legal {
                match a {
                    Action::Raise(_) => assert!(owed > 0),
                    Action::Bet(_) => assert_eq!(owed, 0),
                    _ => {}
                }
            }
            let pick = legal[n % legal.len()];
            h = h.apply_action(pick).unwrap();
            assert!(h.check_chips().is_ok());
        }
    }
}

#[test]
fn test_infoset_key_is_stable() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = apply_all(&dealt(0, &oracle), &[Action::Call, Action::Check]);
    let h = next_street(&h, &oracle);
    let first = h.infoset_key(1);
    for _ in 0..10 {
        assert_eq!(h.infoset_key(1), first);
    }
}

#[test]
fn test_describe_uses_log_tokens() {
    let oracle = FlatOracle::new(0.5, Showdown::Tie);
    let h = apply_all(&dealt(0, &oracle), &[Action::Call, Action::Bet(Size::Half)]);
    assert_eq!(
        h.describe(),
        "['H0:2s2h:0.500:H1:2d2c:0.500', '0:CL', '1:B:H']"
    );
}
