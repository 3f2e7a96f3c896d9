use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfrError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Cannot deal {requested} cards, only {available} remaining")]
    DeckExhausted { requested: usize, available: usize },

    #[error("Expected a {expected} node, found {found}")]
    WrongNodeKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Chip conservation broken: banks {banks:?} + pot {pot} != {expected}")]
    ChipConservation {
        banks: [u32; 2],
        pot: u32,
        expected: u32,
    },

    #[error("Accounting invariant violated: {0}")]
    Accounting(String),

    #[error("Stored actions for infoset '{infoset}' do not match the legal actions")]
    ActionMismatch { infoset: String },

    #[error("Unknown action token: {0}")]
    UnknownAction(String),

    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot sample from strategy: {0}")]
    Sampling(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type CfrResult<T> = Result<T, CfrError>;
