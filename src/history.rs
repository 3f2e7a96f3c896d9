//! Extensive-form game state.
//!
//! A `History` is one node of the game tree. It is never mutated once built:
//! `apply_action` and `resolve_chance` clone the node (dealer included) and
//! return the successor, so sibling branches explored in one walk never share
//! deck state.
//!
//! ```text
//! Chance(Preflop) ─deal+blinds─▶ Decision ─…─▶ Chance(Flop) ─deal+discards─▶ Decision
//!        … Chance(Turn) … Chance(River) … Decision ─close─▶ Terminal(Showdown)
//! any Decision ─Fold─▶ Terminal
//! ```

use std::fmt;

use itertools::Itertools;
use rand::Rng;

use crate::action::{Action, Size};
use crate::cards::{format_cards, Card};
use crate::config::{DiscardConfig, GameConfig};
use crate::dealer::Dealer;
use crate::discard::decide_discard;
use crate::equity::{EquityOracle, Showdown};
use crate::error::{CfrError, CfrResult};
use crate::infoset::infoset_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Chance,
    Decision,
    Terminal,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Chance => "chance",
            NodeKind::Decision => "decision",
            NodeKind::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    /// Betting on the river has closed.
    Showdown,
}

impl Street {
    pub fn next(self) -> Street {
        match self {
            Street::Preflop => Street::Flop,
            Street::Flop => Street::Turn,
            Street::Turn => Street::River,
            Street::River | Street::Showdown => Street::Showdown,
        }
    }

    /// Log tag of the board entry opening this street.
    pub fn tag(self) -> &'static str {
        match self {
            Street::Preflop => "PF",
            Street::Flop => "FP",
            Street::Turn => "TN",
            Street::River => "RV",
            Street::Showdown => "SD",
        }
    }
}

/// Phase within a street: before the deal, or the n-th betting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Round {
    Deal,
    Betting(u8),
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::Deal => write!(f, "0"),
            Round::Betting(n) => write!(f, "B{}", n),
        }
    }
}

/// One entry of the action log. Equities are against a random opponent hand;
/// a value the logging side cannot know (live play) is stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    /// Hole cards dealt, with pre-discard equity per player.
    Hands {
        hands: [Option<[Card; 2]>; 2],
        equity: [f64; 2],
    },
    /// Community cards dealt for `street`.
    Board {
        street: Street,
        board: Vec<Card>,
        equity: [f64; 2],
    },
    Discard {
        player: usize,
    },
    /// Declined to discard.
    StandPat {
        player: usize,
    },
    /// Hand after a discard.
    Reveal {
        player: usize,
        hand: Option<[Card; 2]>,
        equity: f64,
    },
    Act {
        player: usize,
        action: Action,
    },
}

fn hand_str(hand: &Option<[Card; 2]>) -> String {
    match hand {
        Some(cards) => format_cards(cards),
        None => "xx".to_string(),
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Hands { hands, equity } => write!(
                f,
                "H0:{}:{:.3}:H1:{}:{:.3}",
                hand_str(&hands[0]),
                equity[0],
                hand_str(&hands[1]),
                equity[1]
            ),
            LogEntry::Board {
                street,
                board,
                equity,
            } => write!(
                f,
                "{}:{}:H0:{:.3}:H1:{:.3}",
                street.tag(),
                format_cards(board),
                equity[0],
                equity[1]
            ),
            LogEntry::Discard { player } => write!(f, "{}:D", player),
            LogEntry::StandPat { player } => write!(f, "{}:CK", player),
            LogEntry::Reveal {
                player,
                hand,
                equity,
            } => write!(f, "H{}:{}:{:.3}", player, hand_str(hand), equity),
            LogEntry::Act { player, action } => write!(f, "{}:{}", player, action.log_token()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    log: Vec<LogEntry>,
    kind: NodeKind,
    street: Street,
    round: Round,
    button: usize,
    active: usize,
    pot: u32,
    in_pot: [u32; 2],
    bankroll: [u32; 2],
    hands: [Option<[Card; 2]>; 2],
    board: Vec<Card>,
    dealer: Dealer,
    rules: GameConfig,
    blinds_posted: bool,
}

impl History {
    /// Root chance node before any card is dealt. The button acts first
    /// preflop.
    pub fn new(button: usize, dealer: Dealer, rules: GameConfig) -> History {
        History {
            log: Vec::new(),
            kind: NodeKind::Chance,
            street: Street::Preflop,
            round: Round::Deal,
            button,
            active: button,
            pot: 0,
            in_pot: [0, 0],
            bankroll: [rules.starting_stack; 2],
            hands: [None, None],
            board: Vec::new(),
            dealer,
            rules,
            blinds_posted: false,
        }
    }

    /// Root node with a freshly shuffled deck.
    pub fn root<R: Rng + ?Sized>(button: usize, rules: GameConfig, rng: &mut R) -> History {
        History::new(button, Dealer::new(rng), rules)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn button(&self) -> usize {
        self.button
    }

    pub fn active_player(&self) -> usize {
        self.active
    }

    pub fn pot(&self) -> u32 {
        self.pot
    }

    pub fn in_pot(&self) -> [u32; 2] {
        self.in_pot
    }

    pub fn bankroll(&self) -> [u32; 2] {
        self.bankroll
    }

    pub fn hand(&self, player: usize) -> Option<[Card; 2]> {
        self.hands[player]
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn rules(&self) -> &GameConfig {
        &self.rules
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    /// Outstanding amount the player behind in this round must add to call.
    pub fn owed(&self) -> u32 {
        self.in_pot[0].abs_diff(self.in_pot[1])
    }

    /// Abstracted information-set key from `viewpoint`'s perspective.
    pub fn infoset_key(&self, viewpoint: usize) -> String {
        infoset_key(&self.log, viewpoint)
    }

    /// The action log in its textual token form.
    pub fn describe(&self) -> String {
        format!("[{}]", self.log.iter().map(|e| format!("'{}'", e)).join(", "))
    }

    fn expect(&self, kind: NodeKind) -> CfrResult<()> {
        if self.kind != kind {
            return Err(CfrError::WrongNodeKind {
                expected: kind.name(),
                found: self.kind.name(),
            });
        }
        Ok(())
    }

    /// Bankrolls plus pot must always equal both starting stacks.
    pub fn check_chips(&self) -> CfrResult<()> {
        if !self.blinds_posted {
            return Ok(());
        }
        let expected = 2 * self.rules.starting_stack;
        if self.bankroll[0] + self.bankroll[1] + self.pot != expected {
            return Err(CfrError::ChipConservation {
                banks: self.bankroll,
                pot: self.pot,
                expected,
            });
        }
        Ok(())
    }

    fn is_pot_committed(&self) -> bool {
        let half_pot = self.pot as f64 / 2.0;
        let limit = self.rules.pot_commit_fraction;
        self.bankroll
            .iter()
            .any(|&bank| half_pot > bank as f64 * limit)
    }

    pub fn legal_actions(&self) -> CfrResult<Vec<Action>> {
        self.expect(NodeKind::Decision)?;
        let owed = self.owed();

        if self.bankroll.contains(&0) {
            if self.bankroll[self.active] == 0 {
                return Ok(vec![Action::Check]);
            }
            return Ok(if owed > 0 {
                vec![Action::Fold, Action::Call]
            } else {
                vec![Action::Check]
            });
        }

        if self.round == Round::Betting(4) {
            if owed == 0 {
                return Err(CfrError::Accounting(
                    "fourth betting round reached without an outstanding bet".into(),
                ));
            }
            return Ok(vec![Action::Fold, Action::Call]);
        }

        let mut actions = if owed == 0 {
            vec![
                Action::Check,
                Action::Bet(Size::Half),
                Action::Bet(Size::Pot),
                Action::Bet(Size::AllIn),
            ]
        } else {
            vec![
                Action::Fold,
                Action::Call,
                Action::Raise(Size::Pot),
                Action::Raise(Size::AllIn),
            ]
        };

        if self.is_pot_committed() {
            actions.retain(|a| {
                !matches!(
                    a,
                    Action::Bet(Size::Half | Size::Pot) | Action::Raise(Size::Half | Size::Pot)
                )
            });
        }
        Ok(actions)
    }

    /// Chips the active player puts in for a bet of `size` (before adding
    /// anything owed, for raises).
    fn bet_amount(&self, size: Size) -> u32 {
        let min_bet = self.rules.big_blind.max(self.owed());
        let max_bet = self.bankroll[self.active];

        let amount = match size {
            Size::Half => {
                let half = self.pot / 2;
                if (min_bet..=max_bet).contains(&half) {
                    half
                } else if half > 0 && (half as f64 / min_bet as f64) <= (max_bet as f64 / half as f64) {
                    min_bet
                } else {
                    max_bet
                }
            }
            Size::Pot => self.pot.min(max_bet),
            Size::AllIn => max_bet,
        };
        amount.min(max_bet)
    }

    fn commit(&mut self, player: usize, amount: u32) -> CfrResult<()> {
        if amount > self.bankroll[player] {
            return Err(CfrError::Accounting(format!(
                "player {} cannot put {} in with a bankroll of {}",
                player, amount, self.bankroll[player]
            )));
        }
        self.bankroll[player] -= amount;
        self.in_pot[player] += amount;
        self.pot += amount;
        Ok(())
    }

    /// Preflop the non-button player closes the action; postflop the button.
    fn closes_round(&self, player: usize) -> bool {
        if self.street == Street::Preflop {
            player != self.button
        } else {
            player == self.button
        }
    }

    fn round_after_aggression(&self) -> CfrResult<Round> {
        if !self.closes_round(self.active) {
            return Ok(self.round);
        }
        match self.round {
            Round::Betting(n) => Ok(Round::Betting(n + 1)),
            Round::Deal => Err(CfrError::Accounting("bet placed before the deal".into())),
        }
    }

    /// Successor node after the active player takes `action`.
    pub fn apply_action(&self, action: Action) -> CfrResult<History> {
        self.expect(NodeKind::Decision)?;
        let mut next = self.clone();
        let me = self.active;
        let owed = self.owed();
        let mut advance = false;

        match action {
            Action::Fold => next.kind = NodeKind::Terminal,
            Action::Check => advance = self.closes_round(me),
            Action::Call => {
                if self.in_pot[me] >= self.in_pot[1 - me] {
                    return Err(CfrError::Accounting(format!(
                        "player {} called without being behind in the pot",
                        me
                    )));
                }
                next.commit(me, owed)?;
                advance = self.street != Street::Preflop
                    || me != self.button
                    || self.round != Round::Betting(1);
            }
            Action::Bet(size) => {
                if owed != 0 {
                    return Err(CfrError::Accounting("bet facing an outstanding bet".into()));
                }
                next.commit(me, self.bet_amount(size))?;
                next.round = self.round_after_aggression()?;
            }
            Action::Raise(size) => {
                if owed == 0 {
                    return Err(CfrError::Accounting("raise without an outstanding bet".into()));
                }
                let amount = (owed + self.bet_amount(size)).min(self.bankroll[me]);
                next.commit(me, amount)?;
                next.round = self.round_after_aggression()?;
            }
        }

        if advance {
            next.street = self.street.next();
            next.round = Round::Deal;
            next.kind = if self.street == Street::River {
                NodeKind::Terminal
            } else {
                NodeKind::Chance
            };
            next.in_pot = [0, 0];
            next.active = 1 - self.button;
        } else {
            next.active = 1 - me;
        }

        next.log.push(LogEntry::Act { player: me, action });
        next.check_chips()?;
        Ok(next)
    }

    fn post_blinds(&mut self) -> CfrResult<()> {
        let small = self.button;
        let big = 1 - self.button;
        self.commit(small, self.rules.small_blind)?;
        self.commit(big, self.rules.big_blind)?;
        self.blinds_posted = true;
        Ok(())
    }

    fn dealt_hand(&self, player: usize) -> CfrResult<[Card; 2]> {
        self.hands[player].ok_or_else(|| {
            CfrError::Accounting(format!("player {} has no hole cards", player))
        })
    }

    fn board_equities<O: EquityOracle + ?Sized>(&self, oracle: &O) -> CfrResult<[f64; 2]> {
        let iterations = self.rules.equity_iterations;
        Ok([
            oracle.equity(&self.dealt_hand(0)?, &self.board, iterations),
            oracle.equity(&self.dealt_hand(1)?, &self.board, iterations),
        ])
    }

    fn resolve_discards<O, R>(
        &mut self,
        oracle: &O,
        discard: &DiscardConfig,
        rng: &mut R,
    ) -> CfrResult<()>
    where
        O: EquityOracle + ?Sized,
        R: Rng + ?Sized,
    {
        for player in 0..2 {
            let mut hand = self.dealt_hand(player)?;
            let decision = decide_discard(&hand, &self.board, oracle, rng, discard)?;
            match decision.discard {
                Some(slot) => {
                    hand[slot] = self.dealer.deal_card()?;
                    self.hands[player] = Some(hand);
                    let equity = oracle.equity(&hand, &self.board, self.rules.equity_iterations);
                    self.log.push(LogEntry::Discard { player });
                    self.log.push(LogEntry::Reveal {
                        player,
                        hand: Some(hand),
                        equity,
                    });
                }
                None => self.log.push(LogEntry::StandPat { player }),
            }
        }
        Ok(())
    }

    /// Sample the chance event at this node: hole cards and blinds preflop,
    /// community cards plus both discard decisions on the flop and turn, the
    /// last card on the river.
    pub fn resolve_chance<O, R>(
        &self,
        oracle: &O,
        discard: &DiscardConfig,
        rng: &mut R,
    ) -> CfrResult<History>
    where
        O: EquityOracle + ?Sized,
        R: Rng + ?Sized,
    {
        self.expect(NodeKind::Chance)?;
        let mut next = self.clone();

        match self.street {
            Street::Preflop => {
                let first = next.dealer.deal_hand()?;
                let second = next.dealer.deal_hand()?;
                next.hands = [Some(first), Some(second)];
                let equity = [
                    oracle.equity(&first, &[], self.rules.equity_iterations),
                    oracle.equity(&second, &[], self.rules.equity_iterations),
                ];
                next.log.push(LogEntry::Hands {
                    hands: next.hands,
                    equity,
                });
                next.post_blinds()?;
            }
            Street::Flop | Street::Turn => {
                let full = if self.street == Street::Flop { 3 } else { 4 };
                if next.board.len() < full {
                    if self.street == Street::Flop {
                        let flop = next.dealer.deal_flop()?;
                        next.board.extend_from_slice(&flop);
                    } else {
                        let card = next.dealer.deal_card()?;
                        next.board.push(card);
                    }
                    let equity = next.board_equities(oracle)?;
                    next.log.push(LogEntry::Board {
                        street: self.street,
                        board: next.board.clone(),
                        equity,
                    });
                }
                next.resolve_discards(oracle, discard, rng)?;
            }
            Street::River => {
                let card = next.dealer.deal_card()?;
                next.board.push(card);
                let equity = next.board_equities(oracle)?;
                next.log.push(LogEntry::Board {
                    street: Street::River,
                    board: next.board.clone(),
                    equity,
                });
            }
            Street::Showdown => {
                return Err(CfrError::Accounting("no chance event after the river".into()));
            }
        }

        if next.round == Round::Deal {
            next.round = Round::Betting(1);
        }
        next.kind = NodeKind::Decision;
        next.check_chips()?;
        Ok(next)
    }

    /// Signed payoff per player; always sums to zero.
    pub fn terminal_utilities<O: EquityOracle + ?Sized>(&self, oracle: &O) -> CfrResult<[f64; 2]> {
        self.expect(NodeKind::Terminal)?;

        if let Some(LogEntry::Act {
            player: folder,
            action: Action::Fold,
        }) = self.log.last()
        {
            let winner = 1 - folder;
            let won = self.bankroll[winner] as f64 + self.pot as f64
                - self.rules.starting_stack as f64;
            let mut utilities = [0.0; 2];
            utilities[winner] = won;
            utilities[*folder] = -won;
            return Ok(utilities);
        }

        if self.street != Street::Showdown {
            return Err(CfrError::Accounting(
                "terminal node reached without a fold or a showdown".into(),
            ));
        }
        if self.bankroll[0] != self.bankroll[1] {
            return Err(CfrError::Accounting(format!(
                "unequal bankrolls {:?} at showdown",
                self.bankroll
            )));
        }

        let share = self.pot as f64 / 2.0;
        let outcome = oracle.compare(&self.dealt_hand(0)?, &self.dealt_hand(1)?, &self.board)?;
        Ok(match outcome {
            Showdown::A => [share, -share],
            Showdown::B => [-share, share],
            Showdown::Tie => [0.0, 0.0],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_display() {
        assert_eq!(Round::Deal.to_string(), "0");
        assert_eq!(Round::Betting(3).to_string(), "B3");
    }

    #[test]
    fn street_order() {
        assert_eq!(Street::River.next(), Street::Showdown);
        assert!(Street::Flop < Street::Turn);
    }
}
