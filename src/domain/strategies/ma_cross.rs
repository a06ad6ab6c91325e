//! Moving-average crossover strategy.
//!
//! Buys a lot-rounded slice of current equity when the fast average crosses
//! above the slow one, and closes the position on the reverse cross. Lot
//! sizing is the strategy's own constraint, not the ledger's.

use crate::domain::error::SbtError;
use crate::domain::indicator::{calculate_ema, calculate_sma, cross_above, IndicatorSeries};
use crate::domain::ledger::Ledger;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaKind {
    Sma,
    Ema,
}

#[derive(Debug)]
pub struct MaCross {
    kind: MaKind,
    fast_period: usize,
    slow_period: usize,
    /// Fraction of current equity committed per entry.
    position_pct: f64,
    /// Shares per lot; orders are rounded down to whole lots.
    lot_size: u64,
    fast: Option<IndicatorSeries>,
    slow: Option<IndicatorSeries>,
}

impl MaCross {
    pub fn new(
        kind: MaKind,
        fast_period: usize,
        slow_period: usize,
        position_pct: f64,
        lot_size: u64,
    ) -> Result<Self, SbtError> {
        if fast_period == 0 || slow_period == 0 || fast_period >= slow_period {
            return Err(SbtError::InvalidParameter {
                name: "ma periods",
                reason: format!("need 0 < fast < slow, got {fast_period}/{slow_period}"),
            });
        }
        if !(0.0..=1.0).contains(&position_pct) {
            return Err(SbtError::InvalidParameter {
                name: "position_pct",
                reason: format!("must be in [0, 1], got {position_pct}"),
            });
        }
        if lot_size == 0 {
            return Err(SbtError::InvalidParameter {
                name: "lot_size",
                reason: "must be at least 1".into(),
            });
        }
        Ok(MaCross {
            kind,
            fast_period,
            slow_period,
            position_pct,
            lot_size,
            fast: None,
            slow: None,
        })
    }

    /// EMA 52/104, 30% of equity, 100-share lots.
    pub fn ema_defaults() -> Self {
        MaCross::new(MaKind::Ema, 52, 104, 0.3, 100).unwrap()
    }

    /// SMA 20/50, 30% of equity, 100-share lots.
    pub fn sma_defaults() -> Self {
        MaCross::new(MaKind::Sma, 20, 50, 0.3, 100).unwrap()
    }
}

impl Strategy for MaCross {
    fn setup(&mut self, series: &PriceSeries) -> Result<(), SbtError> {
        let calc = match self.kind {
            MaKind::Sma => calculate_sma,
            MaKind::Ema => calculate_ema,
        };
        self.fast = Some(calc(series.bars(), self.fast_period));
        self.slow = Some(calc(series.bars(), self.slow_period));
        Ok(())
    }

    fn decide(
        &mut self,
        bar: usize,
        series: &PriceSeries,
        ledger: &mut Ledger,
    ) -> Result<(), SbtError> {
        let (Some(fast), Some(slow)) = (self.fast.as_ref(), self.slow.as_ref()) else {
            return Ok(());
        };

        if cross_above(fast, slow, bar) {
            let price = series.close(bar)?;
            let budget = ledger.equity(bar)? * self.position_pct;
            let lots = (budget / price).floor() as u64 / self.lot_size;
            let size = lots * self.lot_size;
            if size >= self.lot_size {
                ledger.buy(bar, size)?;
            }
        } else if cross_above(slow, fast, bar) {
            ledger.close(bar)?;
        }
        Ok(())
    }
}
