//! Moving-average indicators consumed by the built-in strategies.
//!
//! The core executes orders; it never computes these itself. Indicator
//! series are precomputed in a strategy's `setup` and read per bar, with a
//! `valid` flag covering the warmup window.

pub mod sma;
pub mod ema;

pub use ema::calculate_ema;
pub use sma::calculate_sma;

use std::fmt;

/// A single point in an indicator time series.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorPoint {
    pub valid: bool,
    pub value: f64,
}

/// Indicator identity + parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, or None during warmup / out of range.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

/// True when `fast` closes above `slow` at `index` having been at or below
/// it on the previous bar. Requires valid values at both bars; insufficient
/// history is simply not a crossover.
pub fn cross_above(fast: &IndicatorSeries, slow: &IndicatorSeries, index: usize) -> bool {
    if index == 0 {
        return false;
    }
    let (Some(fast_prev), Some(slow_prev)) = (fast.value_at(index - 1), slow.value_at(index - 1))
    else {
        return false;
    };
    let (Some(fast_now), Some(slow_now)) = (fast.value_at(index), slow.value_at(index)) else {
        return false;
    };
    fast_prev <= slow_prev && fast_now > slow_now
}
