//! Abstract betting actions.
//!
//! Table rows are keyed by the compact token of each action (`F`, `CK`, `CL`,
//! `BH`, `BP`, `BA`, `RH`, `RP`, `RA`). Parsing also accepts the colon form
//! used in logs (`B:H`).

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CfrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Size {
    Half,
    Pot,
    AllIn,
}

impl Size {
    pub fn to_char(self) -> char {
        match self {
            Size::Half => 'H',
            Size::Pot => 'P',
            Size::AllIn => 'A',
        }
    }

    pub fn from_char(c: char) -> Option<Size> {
        match c {
            'H' => Some(Size::Half),
            'P' => Some(Size::Pot),
            'A' => Some(Size::AllIn),
            _ => None,
        }
    }

    /// Fraction of the pot this size targets; all-in has none.
    pub fn pot_fraction(self) -> Option<f64> {
        match self {
            Size::Half => Some(0.5),
            Size::Pot => Some(1.0),
            Size::AllIn => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet(Size),
    Raise(Size),
}

impl Action {
    /// Two-letter shorthand used inside information-set keys.
    pub fn shorthand(self) -> &'static str {
        match self {
            Action::Fold => "F",
            Action::Check => "CK",
            Action::Call => "CL",
            Action::Bet(Size::Half) => "BH",
            Action::Bet(Size::Pot) => "BP",
            Action::Bet(Size::AllIn) => "BA",
            Action::Raise(Size::Half) => "RH",
            Action::Raise(Size::Pot) => "RP",
            Action::Raise(Size::AllIn) => "RA",
        }
    }

    /// Log form: `F`, `CK`, `CL`, `B:H`, `R:A`, ...
    pub fn log_token(self) -> String {
        match self {
            Action::Bet(size) => format!("B:{}", size.to_char()),
            Action::Raise(size) => format!("R:{}", size.to_char()),
            other => other.shorthand().to_string(),
        }
    }

    pub fn is_aggressive(self) -> bool {
        matches!(self, Action::Bet(_) | Action::Raise(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shorthand())
    }
}

impl FromStr for Action {
    type Err = CfrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.trim().chars().filter(|&c| c != ':').collect();
        let size = |c: char| Size::from_char(c).ok_or_else(|| CfrError::UnknownAction(s.to_string()));
        let mut chars = compact.chars();
        let action = match (chars.next(), chars.next(), chars.next()) {
            (Some('F'), None, None) => Action::Fold,
            (Some('C'), Some('K'), None) => Action::Check,
            (Some('C'), Some('L'), None) => Action::Call,
            (Some('B'), Some(c), None) => Action::Bet(size(c)?),
            (Some('R'), Some(c), None) => Action::Raise(size(c)?),
            _ => return Err(CfrError::UnknownAction(s.to_string())),
        };
        Ok(action)
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.shorthand())
    }
}

struct ActionVisitor;

impl<'de> Visitor<'de> for ActionVisitor {
    type Value = Action;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an action token such as CK or BP")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Action, E> {
        v.parse().map_err(|_| E::custom(format!("unknown action token '{}'", v)))
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ActionVisitor)
    }
}
