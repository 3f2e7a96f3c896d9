//! Live-play driver.
//!
//! Rebuilds the action log from the engine's event stream so the bot can look
//! up its own information set. The bot is always seat 0 in that log and the
//! opponent seat 1; the opponent's cards and equity stay unknown.
//!
//! Discards come from the same heuristic used in training. Betting decisions
//! sample the trained average strategy restricted to the moves the engine
//! allows, falling back to uniform when the key was never visited.

use std::io::{BufRead, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::action::{Action, Size};
use crate::cards::Card;
use crate::config::Config;
use crate::discard::decide_discard;
use crate::engine::{
    parse_packet, BotAction, EngineAction, GetAction, LegalAction, NewGame, NewHand, Packet,
};
use crate::equity::EquityOracle;
use crate::error::{CfrError, CfrResult};
use crate::history::{LogEntry, Street};
use crate::infoset::infoset_key;
use crate::tables::StrategyStore;
use crate::trainer::sample_index;

pub const ME: usize = 0;
pub const OPPONENT: usize = 1;

/// Abstract size closest to a bet of `extra` chips into `pot`.
pub fn map_bet_size(extra: u32, pot: u32) -> Option<Size> {
    if pot == 0 {
        return None;
    }
    let ratio = extra as f64 / pot as f64;
    Some(if ratio <= 0.75 {
        Size::Half
    } else if ratio <= 1.5 {
        Size::Pot
    } else {
        Size::AllIn
    })
}

/// Chip bookkeeping and log for the hand in progress.
#[derive(Debug, Clone)]
pub struct LiveHand {
    hand: [Card; 2],
    log: Vec<LogEntry>,
    pot: u32,
    in_pot: [u32; 2],
    /// Discard decisions still expected on this street.
    discards_open: usize,
    /// Abstract action behind our last bet or raise, matched against its echo.
    pending: Option<Action>,
}

impl LiveHand {
    pub fn new(hand: [Card; 2], equity: f64) -> Self {
        LiveHand {
            hand,
            log: vec![LogEntry::Hands {
                hands: [Some(hand), None],
                equity: [equity, f64::NAN],
            }],
            pot: 0,
            in_pot: [0, 0],
            discards_open: 0,
            pending: None,
        }
    }

    pub fn hand(&self) -> [Card; 2] {
        self.hand
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn pot(&self) -> u32 {
        self.pot
    }

    pub fn infoset_key(&self) -> String {
        infoset_key(&self.log, ME)
    }

    fn owed(&self) -> u32 {
        self.in_pot[0].abs_diff(self.in_pot[1])
    }

    fn put_in(&mut self, seat: usize, amount: u32) {
        self.in_pot[seat] += amount;
        self.pot += amount;
    }

    /// Abstract action for an aggressive move that adds `extra` chips on top
    /// of matching the outstanding bet.
    fn aggressive(&mut self, seat: usize, extra: u32, raise: bool) -> Action {
        if seat == ME {
            if let Some(action) = self.pending.take() {
                return action;
            }
        }
        match map_bet_size(extra, self.pot) {
            Some(size) if raise => Action::Raise(size),
            Some(size) => Action::Bet(size),
            None => {
                log::warn!("could not map a bet of {} into pot {}; logging a call", extra, self.pot);
                Action::Call
            }
        }
    }

    fn act(&mut self, seat: usize, action: Action) {
        self.log.push(LogEntry::Act { player: seat, action });
    }

    /// Fold one engine event into the log. `equity` scores our hand on a
    /// board and is only called when a new board or hand appears.
    pub fn observe<F>(&mut self, event: &EngineAction, me: &str, board: &[Card], equity: F)
    where
        F: Fn(&[Card; 2], &[Card]) -> f64,
    {
        let seat = |actor: &str| if actor == me { ME } else { OPPONENT };

        match event {
            EngineAction::Post { amount, actor } => self.put_in(seat(actor), *amount),
            EngineAction::Deal(street) => {
                self.in_pot = [0, 0];
                let shown = match street {
                    Street::Flop => 3,
                    Street::Turn => 4,
                    _ => 5,
                };
                let cards = board[..shown.min(board.len())].to_vec();
                let ours = equity(&self.hand, &cards);
                if matches!(street, Street::Flop | Street::Turn) {
                    self.discards_open = 2;
                }
                self.log.push(LogEntry::Board {
                    street: *street,
                    board: cards,
                    equity: [ours, f64::NAN],
                });
            }
            EngineAction::Discard { swap, actor } => {
                let player = seat(actor);
                self.discards_open = self.discards_open.saturating_sub(1);
                self.log.push(LogEntry::Discard { player });
                match swap {
                    Some((old, new)) if player == ME => {
                        if let Some(slot) = self.hand.iter().position(|c| c == old) {
                            self.hand[slot] = *new;
                        }
                        let visible = &self.board_cards();
                        self.log.push(LogEntry::Reveal {
                            player,
                            hand: Some(self.hand),
                            equity: equity(&self.hand, visible),
                        });
                    }
                    _ => self.log.push(LogEntry::Reveal {
                        player,
                        hand: None,
                        equity: f64::NAN,
                    }),
                }
            }
            EngineAction::Check { actor } => {
                if self.discards_open > 0 {
                    self.discards_open -= 1;
                    self.log.push(LogEntry::StandPat { player: seat(actor) });
                } else {
                    self.act(seat(actor), Action::Check);
                }
            }
            EngineAction::Call { actor } => {
                let player = seat(actor);
                let owed = self.owed();
                self.put_in(player, owed);
                self.act(player, Action::Call);
            }
            EngineAction::Fold { actor } => self.act(seat(actor), Action::Fold),
            EngineAction::Bet { amount, actor } => {
                let player = seat(actor);
                let action = self.aggressive(player, *amount, false);
                self.put_in(player, *amount);
                self.act(player, action);
            }
            EngineAction::Raise { amount, actor } => {
                let player = seat(actor);
                let top = self.in_pot[0].max(self.in_pot[1]);
                let action = self.aggressive(player, amount.saturating_sub(top), true);
                let added = amount.saturating_sub(self.in_pot[player]);
                self.put_in(player, added);
                self.act(player, action);
            }
            EngineAction::Refund { .. }
            | EngineAction::Show { .. }
            | EngineAction::Tie { .. }
            | EngineAction::Win { .. } => {}
        }
    }

    fn board_cards(&self) -> Vec<Card> {
        self.log
            .iter()
            .rev()
            .find_map(|e| match e {
                LogEntry::Board { board, .. } => Some(board.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Abstract actions playable under the engine's legal set.
pub fn abstract_legal(legal: &[LegalAction]) -> Vec<Action> {
    let sizes = [Size::Half, Size::Pot, Size::AllIn];
    let mut out = Vec::new();
    for action in legal {
        match action {
            LegalAction::Fold => out.push(Action::Fold),
            LegalAction::Check => out.push(Action::Check),
            LegalAction::Call => out.push(Action::Call),
            LegalAction::Bet { .. } => out.extend(sizes.iter().map(|&s| Action::Bet(s))),
            LegalAction::Raise { .. } => out.extend(sizes.iter().map(|&s| Action::Raise(s))),
            LegalAction::Discard(_) => {}
        }
    }
    out.sort();
    out.dedup();
    out
}

/// Concrete chip amount for an abstract size: a fraction of the pot, clamped
/// to the engine's `[min, max]`; all-in is always `max`.
pub fn concrete_amount(size: Size, base: u32, pot: u32, min: u32, max: u32) -> u32 {
    match size.pot_fraction() {
        Some(fraction) => {
            let target = base + (fraction * pot as f64).round() as u32;
            target.clamp(min, max.max(min))
        }
        None => max,
    }
}

/// Reply for a line that could not be handled: decision requests still get
/// an answer, `CALL` when the raw legal tokens offer it and `CHECK` otherwise.
pub fn fallback_reply(line: &str) -> Option<BotAction> {
    let mut words = line.split_whitespace();
    if words.next() != Some("GETACTION") {
        return None;
    }
    if words.any(|w| w == "CALL") {
        Some(BotAction::Call)
    } else {
        Some(BotAction::Check)
    }
}

pub struct Bot<O: EquityOracle> {
    store: StrategyStore,
    oracle: O,
    config: Config,
    rng: StdRng,
    game: Option<NewGame>,
    live: Option<LiveHand>,
}

impl<O: EquityOracle> Bot<O> {
    pub fn new(store: StrategyStore, oracle: O, config: Config) -> Self {
        let rng = match config.trainer.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Bot {
            store,
            oracle,
            config,
            rng,
            game: None,
            live: None,
        }
    }

    pub fn live_hand(&self) -> Option<&LiveHand> {
        self.live.as_ref()
    }

    fn name(&self) -> &str {
        self.game.as_ref().map_or("", |g| g.name.as_str())
    }

    fn start_hand(&mut self, packet: &NewHand) {
        let equity = self
            .oracle
            .equity(&packet.hand, &[], self.config.game.equity_iterations);
        log::debug!("hand {} dealt, button: {}", packet.hand_id, packet.button);
        self.live = Some(LiveHand::new(packet.hand, equity));
    }

    fn observe_all(&mut self, events: &[EngineAction], board: &[Card]) {
        let name = self.name().to_string();
        let iterations = self.config.game.equity_iterations;
        let oracle = &self.oracle;
        if let Some(live) = self.live.as_mut() {
            for event in events {
                live.observe(event, &name, board, |hand, cards| {
                    oracle.equity(hand, cards, iterations)
                });
            }
        }
    }

    /// Reply to one packet; `None` when the packet needs no answer.
    pub fn handle(&mut self, packet: Packet) -> CfrResult<Option<BotAction>> {
        match packet {
            Packet::NewGame(game) => {
                log::info!("new game vs {}: {} hands", game.opponent, game.num_hands);
                self.game = Some(game);
                Ok(None)
            }
            Packet::NewHand(hand) => {
                self.start_hand(&hand);
                Ok(None)
            }
            Packet::GetAction(request) => {
                self.observe_all(&request.last_actions, &request.board);
                self.decide(&request).map(Some)
            }
            Packet::HandOver(over) => {
                self.observe_all(&over.last_actions, &over.board);
                if let Some(live) = self.live.take() {
                    log::debug!("hand over: {}", live.infoset_key());
                }
                Ok(None)
            }
            Packet::RequestKeyValues { .. } => Ok(Some(BotAction::Finish)),
        }
    }

    fn decide(&mut self, request: &GetAction) -> CfrResult<BotAction> {
        let live = self
            .live
            .as_ref()
            .ok_or_else(|| CfrError::InvalidPacket("GETACTION outside a hand".into()))?;

        if request.can_discard() {
            let hand = live.hand();
            let decision =
                decide_discard(&hand, &request.board, &self.oracle, &mut self.rng, &self.config.discard)?;
            return Ok(match decision.discard {
                Some(slot) => BotAction::Discard(hand[slot]),
                None => BotAction::Check,
            });
        }

        let legal = abstract_legal(&request.legal);
        if legal.is_empty() {
            return Err(CfrError::InvalidPacket("no playable action offered".into()));
        }
        let key = live.infoset_key();
        let weights = self.store.playable_weights(&key, &legal);
        let choice = legal[sample_index(&weights, &mut self.rng)?];
        log::debug!("infoset {} -> {}", key, choice);

        let top = live.in_pot[0].max(live.in_pot[1]);
        let pot = request.pot;
        let reply = match choice {
            Action::Fold => BotAction::Fold,
            Action::Check => BotAction::Check,
            Action::Call => BotAction::Call,
            Action::Bet(size) => {
                let (min, max) = request.betting_range().unwrap_or((0, 0));
                BotAction::Bet(concrete_amount(size, 0, pot, min, max))
            }
            Action::Raise(size) => {
                let (min, max) = request.raising_range().unwrap_or((0, 0));
                BotAction::Raise(concrete_amount(size, top, pot, min, max))
            }
        };
        if choice.is_aggressive() {
            if let Some(live) = self.live.as_mut() {
                live.pending = Some(choice);
            }
        }
        Ok(reply)
    }

    /// Answer packets from `input` line by line until it closes.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> CfrResult<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let reply = match parse_packet(&line).and_then(|packet| self.handle(packet)) {
                Ok(reply) => reply,
                Err(e) => {
                    let reply = fallback_reply(&line);
                    match &reply {
                        Some(action) => log::warn!("{}; answering {}", e, action),
                        None => log::warn!("{}", e),
                    }
                    reply
                }
            };
            if let Some(action) = reply {
                writeln!(output, "{}", action)?;
                output.flush()?;
            }
        }
        Ok(())
    }
}
