//! Core domain types and logic.

pub mod ohlcv;
pub mod ledger;
pub mod strategy;
pub mod strategies;
pub mod backtest;
pub mod metrics;
pub mod indicator;
pub mod error;
