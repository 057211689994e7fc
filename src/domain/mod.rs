//! Core domain types and logic.

pub mod backtest;
pub mod candle;
pub mod error;
pub mod features;
pub mod instrument;
pub mod scoring;
pub mod search;
pub mod simulator;
pub mod sizing;
pub mod strategy;
