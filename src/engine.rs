//! Game-engine records.
//!
//! The engine speaks a line protocol: one packet per line, space separated,
//! with colon-separated action tokens. This module turns lines into typed
//! packets and renders the bot's replies. Transport is left to the caller.
//!
//! ```text
//! NEWGAME me villain 200 2 1000 20.0
//! NEWHAND 4 true 5c Ad 0 0 20.0
//! GETACTION 3 0 2 POST:1:me POST:2:villain 3 CALL FOLD RAISE:4:200 19.9
//! ```

use std::fmt;
use std::str::{FromStr, SplitWhitespace};

use crate::cards::{parse_card, Card};
use crate::error::{CfrError, CfrResult};
use crate::history::Street;

#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub name: String,
    pub opponent: String,
    pub stack: u32,
    pub big_blind: u32,
    pub num_hands: u32,
    pub time_bank: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHand {
    pub hand_id: u32,
    pub button: bool,
    pub hand: [Card; 2],
    pub my_bank: i64,
    pub opp_bank: i64,
    pub time_bank: f64,
}

/// An event reported in a packet's action history.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineAction {
    Bet { amount: u32, actor: String },
    Call { actor: String },
    Check { actor: String },
    Deal(Street),
    /// `swap` is only visible for the bot's own discards.
    Discard {
        swap: Option<(Card, Card)>,
        actor: String,
    },
    Fold { actor: String },
    Post { amount: u32, actor: String },
    /// `amount` is the raiser's total for the street.
    Raise { amount: u32, actor: String },
    Refund { amount: u32, actor: String },
    Show { cards: [Card; 2], actor: String },
    Tie { amount: u32, actor: String },
    Win { amount: u32, actor: String },
}

/// A move the engine currently accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegalAction {
    Bet { min: u32, max: u32 },
    Call,
    Check,
    Discard(Card),
    Fold,
    Raise { min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetAction {
    pub pot: u32,
    pub board: Vec<Card>,
    pub last_actions: Vec<EngineAction>,
    pub legal: Vec<LegalAction>,
    pub time_bank: f64,
}

impl GetAction {
    pub fn betting_range(&self) -> Option<(u32, u32)> {
        self.legal.iter().find_map(|a| match a {
            LegalAction::Bet { min, max } => Some((*min, *max)),
            _ => None,
        })
    }

    pub fn raising_range(&self) -> Option<(u32, u32)> {
        self.legal.iter().find_map(|a| match a {
            LegalAction::Raise { min, max } => Some((*min, *max)),
            _ => None,
        })
    }

    pub fn can_discard(&self) -> bool {
        self.legal.iter().any(|a| matches!(a, LegalAction::Discard(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandOver {
    pub my_bank: i64,
    pub opp_bank: i64,
    pub board: Vec<Card>,
    pub last_actions: Vec<EngineAction>,
    pub time_bank: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    NewGame(NewGame),
    NewHand(NewHand),
    GetAction(GetAction),
    HandOver(HandOver),
    RequestKeyValues { bytes_left: u64 },
}

/// Reply sent back to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BotAction {
    Fold,
    Check,
    Call,
    Bet(u32),
    Raise(u32),
    Discard(Card),
    Finish,
}

impl fmt::Display for BotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotAction::Fold => write!(f, "FOLD"),
            BotAction::Check => write!(f, "CHECK"),
            BotAction::Call => write!(f, "CALL"),
            BotAction::Bet(n) => write!(f, "BET:{}", n),
            BotAction::Raise(n) => write!(f, "RAISE:{}", n),
            BotAction::Discard(card) => write!(f, "DISCARD:{}", card),
            BotAction::Finish => write!(f, "FINISH"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

struct Fields<'a> {
    line: &'a str,
    parts: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str) -> Self {
        Fields {
            line,
            parts: line.split_whitespace(),
        }
    }

    fn bad(&self, what: &str) -> CfrError {
        CfrError::InvalidPacket(format!("{} in '{}'", what, self.line))
    }

    fn word(&mut self) -> CfrResult<&'a str> {
        self.parts.next().ok_or_else(|| self.bad("truncated packet"))
    }

    fn num<T: FromStr>(&mut self) -> CfrResult<T> {
        let word = self.word()?;
        word.parse().map_err(|_| self.bad(&format!("bad number '{}'", word)))
    }

    fn cards(&mut self) -> CfrResult<Vec<Card>> {
        let count: usize = self.num()?;
        (0..count).map(|_| parse_card(self.word()?)).collect()
    }

    fn list<T>(&mut self, parse: fn(&str) -> CfrResult<T>) -> CfrResult<Vec<T>> {
        let count: usize = self.num()?;
        (0..count).map(|_| parse(self.word()?)).collect()
    }
}

fn bad_token(token: &str) -> CfrError {
    CfrError::InvalidPacket(format!("bad action token '{}'", token))
}

fn amount(token: &str, field: Option<&str>) -> CfrResult<u32> {
    field
        .and_then(|f| f.parse().ok())
        .ok_or_else(|| bad_token(token))
}

fn actor(token: &str, field: Option<&str>) -> CfrResult<String> {
    field.map(str::to_string).ok_or_else(|| bad_token(token))
}

pub fn parse_engine_action(token: &str) -> CfrResult<EngineAction> {
    let f: Vec<&str> = token.split(':').collect();
    let at = |i: usize| f.get(i).copied();

    let action = match f[0] {
        "BET" => EngineAction::Bet {
            amount: amount(token, at(1))?,
            actor: actor(token, at(2))?,
        },
        "RAISE" => EngineAction::Raise {
            amount: amount(token, at(1))?,
            actor: actor(token, at(2))?,
        },
        "POST" => EngineAction::Post {
            amount: amount(token, at(1))?,
            actor: actor(token, at(2))?,
        },
        "REFUND" => EngineAction::Refund {
            amount: amount(token, at(1))?,
            actor: actor(token, at(2))?,
        },
        "TIE" => EngineAction::Tie {
            amount: amount(token, at(1))?,
            actor: actor(token, at(2))?,
        },
        "WIN" => EngineAction::Win {
            amount: amount(token, at(1))?,
            actor: actor(token, at(2))?,
        },
        "CALL" => EngineAction::Call {
            actor: actor(token, at(1))?,
        },
        "CHECK" => EngineAction::Check {
            actor: actor(token, at(1))?,
        },
        "FOLD" => EngineAction::Fold {
            actor: actor(token, at(1))?,
        },
        "DEAL" => EngineAction::Deal(match at(1) {
            Some("FLOP") => Street::Flop,
            Some("TURN") => Street::Turn,
            Some("RIVER") => Street::River,
            _ => return Err(bad_token(token)),
        }),
        "DISCARD" if f.len() == 4 => EngineAction::Discard {
            swap: Some((parse_card(f[1])?, parse_card(f[2])?)),
            actor: f[3].to_string(),
        },
        "DISCARD" => EngineAction::Discard {
            swap: None,
            actor: actor(token, at(1))?,
        },
        "SHOW" if f.len() == 4 => EngineAction::Show {
            cards: [parse_card(f[1])?, parse_card(f[2])?],
            actor: f[3].to_string(),
        },
        _ => return Err(bad_token(token)),
    };
    Ok(action)
}

pub fn parse_legal_action(token: &str) -> CfrResult<LegalAction> {
    let f: Vec<&str> = token.split(':').collect();
    let range = || -> CfrResult<(u32, u32)> {
        Ok((amount(token, f.get(1).copied())?, amount(token, f.get(2).copied())?))
    };
    match f[0] {
        "BET" => range().map(|(min, max)| LegalAction::Bet { min, max }),
        "RAISE" => range().map(|(min, max)| LegalAction::Raise { min, max }),
        "CALL" => Ok(LegalAction::Call),
        "CHECK" => Ok(LegalAction::Check),
        "FOLD" => Ok(LegalAction::Fold),
        "DISCARD" if f.len() == 2 => Ok(LegalAction::Discard(parse_card(f[1])?)),
        _ => Err(bad_token(token)),
    }
}

fn parse_bool(word: &str) -> CfrResult<bool> {
    match word {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CfrError::InvalidPacket(format!("bad flag '{}'", word))),
    }
}

pub fn parse_packet(line: &str) -> CfrResult<Packet> {
    let mut f = Fields::new(line);
    let packet = match f.word()? {
        "NEWGAME" => Packet::NewGame(NewGame {
            name: f.word()?.to_string(),
            opponent: f.word()?.to_string(),
            stack: f.num()?,
            big_blind: f.num()?,
            num_hands: f.num()?,
            time_bank: f.num()?,
        }),
        "NEWHAND" => Packet::NewHand(NewHand {
            hand_id: f.num()?,
            button: parse_bool(f.word()?)?,
            hand: [parse_card(f.word()?)?, parse_card(f.word()?)?],
            my_bank: f.num()?,
            opp_bank: f.num()?,
            time_bank: f.num()?,
        }),
        "GETACTION" => Packet::GetAction(GetAction {
            pot: f.num()?,
            board: f.cards()?,
            last_actions: f.list(parse_engine_action)?,
            legal: f.list(parse_legal_action)?,
            time_bank: f.num()?,
        }),
        "HANDOVER" => Packet::HandOver(HandOver {
            my_bank: f.num()?,
            opp_bank: f.num()?,
            board: f.cards()?,
            last_actions: f.list(parse_engine_action)?,
            time_bank: f.num()?,
        }),
        "REQUESTKEYVALUES" => Packet::RequestKeyValues {
            bytes_left: f.num()?,
        },
        other => return Err(f.bad(&format!("unknown packet type '{}'", other))),
    };
    Ok(packet)
}
