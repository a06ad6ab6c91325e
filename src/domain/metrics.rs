//! Performance metrics over a completed equity curve and trade log.
//!
//! The formulas are a fixed contract: annualization applies the 252-day
//! exponent to the mean per-bar return (not a CAGR over elapsed calendar
//! time), and Sharpe keeps a 1e-9 additive epsilon in the denominator so
//! constant-return curves divide cleanly. Do not "correct" either.

use super::ledger::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const SHARPE_EPSILON: f64 = 1e-9;

/// Fixed-key metrics report, computed once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub trade_count: usize,
}

impl Metrics {
    /// Pure function of (equity curve, trade log); running it twice on the
    /// same inputs yields identical results.
    ///
    /// Fewer than 2 equity points ⇒ total, annualized and Sharpe are all
    /// exactly 0.0 rather than NaN or an error.
    pub fn compute(equity_curve: &[f64], trades: &[Trade]) -> Metrics {
        let trade_count = trades.len();
        let max_drawdown_pct = compute_max_drawdown_pct(equity_curve);

        if equity_curve.len() < 2 {
            return Metrics {
                total_return_pct: 0.0,
                annualized_return_pct: 0.0,
                max_drawdown_pct,
                sharpe_ratio: 0.0,
                trade_count,
            };
        }

        let first = equity_curve[0];
        let last = equity_curve[equity_curve.len() - 1];
        let total_return_pct = (last / first - 1.0) * 100.0;

        let returns = per_bar_returns(equity_curve);
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let stddev = variance.sqrt();

        let annualized_return_pct = ((1.0 + mean).powf(TRADING_DAYS_PER_YEAR) - 1.0) * 100.0;
        let sharpe_ratio = (mean / (stddev + SHARPE_EPSILON)) * TRADING_DAYS_PER_YEAR.sqrt();

        Metrics {
            total_return_pct,
            annualized_return_pct,
            max_drawdown_pct,
            sharpe_ratio,
            trade_count,
        }
    }
}

/// Simple returns `eq_i / eq_{i-1} - 1` for i ≥ 1.
fn per_bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Most negative percentage decline from the running equity peak.
/// 0.0 for an empty curve.
fn compute_max_drawdown_pct(equity_curve: &[f64]) -> f64 {
    let mut running_max = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > running_max {
            running_max = equity;
        }
        let dd = equity / running_max - 1.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd * 100.0
}
