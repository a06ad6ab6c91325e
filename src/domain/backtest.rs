//! Backtest configuration and the bar-by-bar simulation loop.

use super::error::SbtError;
use super::ledger::{Ledger, Trade};
use super::ohlcv::PriceSeries;
use super::strategy::Strategy;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    pub commission_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 10_000.0,
            commission_rate: 0.002,
        }
    }
}

/// Read-only outcome of a completed run.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// One equity mark per processed bar: cash + position × close.
    pub equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
    pub final_cash: f64,
    pub final_position: u64,
}

/// Drive `strategy` across every bar of `series` in order.
///
/// Each bar: `decide(i)` first, then the equity snapshot at that bar's
/// close. The loop is strictly sequential; bar i+1's ledger state depends
/// on bar i's outcome. An empty series yields an empty curve without
/// touching the strategy's decide hook.
pub fn run_backtest(
    series: &PriceSeries,
    strategy: &mut dyn Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, SbtError> {
    let mut ledger = Ledger::new(series, config.initial_cash, config.commission_rate)?;
    strategy.setup(series)?;

    let mut equity_curve = Vec::with_capacity(series.len());
    for bar in 0..series.len() {
        strategy.decide(bar, series, &mut ledger)?;
        equity_curve.push(ledger.equity(bar)?);
    }

    let final_cash = ledger.cash();
    let final_position = ledger.position();
    Ok(BacktestResult {
        equity_curve,
        trades: ledger.into_trades(),
        final_cash,
        final_position,
    })
}
