pub mod action;
pub mod bot;
pub mod cards;
pub mod cli;
pub mod config;
pub mod dealer;
pub mod discard;
pub mod display;
pub mod engine;
pub mod equity;
pub mod error;
pub mod hand_evaluator;
pub mod history;
pub mod infoset;
pub mod tables;
pub mod trainer;
