//! Cash/position ledger and the append-only trade log.
//!
//! All fills happen at the current bar's close price with a proportional
//! commission on both legs. Orders that cannot be honoured (insufficient
//! cash, over-selling, zero size) are silently rejected: no state change,
//! no trade recorded. Callers that care must check preconditions or watch
//! the trade log length.

use super::error::SbtError;
use super::ohlcv::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Immutable record of one fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub bar: usize,
    pub side: TradeSide,
    pub price: f64,
    pub size: u64,
    pub cash_after: f64,
}

/// Owns cash, position size and average cost for one run.
///
/// Fields are private: strategies mutate state only through
/// [`buy`](Ledger::buy) / [`sell`](Ledger::sell) / [`close`](Ledger::close).
/// A ledger is not reusable across runs.
#[derive(Debug)]
pub struct Ledger<'a> {
    series: &'a PriceSeries,
    commission_rate: f64,
    cash: f64,
    position: u64,
    avg_cost: f64,
    trades: Vec<Trade>,
}

impl<'a> Ledger<'a> {
    /// Configuration errors surface here, before any bar is processed.
    pub fn new(
        series: &'a PriceSeries,
        initial_cash: f64,
        commission_rate: f64,
    ) -> Result<Self, SbtError> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(SbtError::InvalidParameter {
                name: "initial_cash",
                reason: format!("must be a positive finite number, got {initial_cash}"),
            });
        }
        if !commission_rate.is_finite() || !(0.0..1.0).contains(&commission_rate) {
            return Err(SbtError::InvalidParameter {
                name: "commission_rate",
                reason: format!("must be in [0, 1), got {commission_rate}"),
            });
        }
        Ok(Ledger {
            series,
            commission_rate,
            cash: initial_cash,
            position: 0,
            avg_cost: 0.0,
            trades: Vec::new(),
        })
    }

    /// Buy `size` shares at the close of `bar`.
    ///
    /// `cost = close × size × (1 + commission_rate)`. Rejected without any
    /// state change if `size` is zero or cash cannot cover the cost; a
    /// rejection is `Ok(())`. The only error is a pricing failure.
    pub fn buy(&mut self, bar: usize, size: u64) -> Result<(), SbtError> {
        if size == 0 {
            return Ok(());
        }
        let price = self.series.close(bar)?;
        let cost = price * size as f64 * (1.0 + self.commission_rate);
        if self.cash < cost {
            return Ok(());
        }

        // Weighted mean over the old lot and the new one.
        let total_cost = self.avg_cost * self.position as f64 + price * size as f64;
        self.position += size;
        self.avg_cost = total_cost / self.position as f64;
        self.cash -= cost;
        self.trades.push(Trade {
            bar,
            side: TradeSide::Buy,
            price,
            size,
            cash_after: self.cash,
        });
        Ok(())
    }

    /// Sell `size` shares at the close of `bar`.
    ///
    /// `proceeds = close × size × (1 − commission_rate)`. Over-selling is
    /// rejected outright, never truncated to the held position.
    pub fn sell(&mut self, bar: usize, size: u64) -> Result<(), SbtError> {
        if size == 0 || size > self.position {
            return Ok(());
        }
        let price = self.series.close(bar)?;
        let proceeds = price * size as f64 * (1.0 - self.commission_rate);

        self.position -= size;
        if self.position == 0 {
            self.avg_cost = 0.0;
        }
        self.cash += proceeds;
        self.trades.push(Trade {
            bar,
            side: TradeSide::Sell,
            price,
            size,
            cash_after: self.cash,
        });
        Ok(())
    }

    /// Sell the entire current position; no-op when flat.
    pub fn close(&mut self, bar: usize) -> Result<(), SbtError> {
        if self.position > 0 {
            self.sell(bar, self.position)
        } else {
            Ok(())
        }
    }

    /// Cash plus the position marked to the close of `bar`.
    pub fn equity(&self, bar: usize) -> Result<f64, SbtError> {
        Ok(self.cash + self.position as f64 * self.series.close(bar)?)
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn avg_cost(&self) -> f64 {
        self.avg_cost
    }

    pub fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    fn make_series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect();
        PriceSeries::new("TEST".into(), bars).unwrap()
    }

    #[test]
    fn new_rejects_non_positive_cash() {
        let series = make_series(&[100.0]);
        assert!(matches!(
            Ledger::new(&series, 0.0, 0.0),
            Err(SbtError::InvalidParameter { name: "initial_cash", .. })
        ));
        assert!(matches!(
            Ledger::new(&series, -5.0, 0.0),
            Err(SbtError::InvalidParameter { name: "initial_cash", .. })
        ));
    }

    #[test]
    fn new_rejects_bad_commission() {
        let series = make_series(&[100.0]);
        assert!(matches!(
            Ledger::new(&series, 1000.0, 1.0),
            Err(SbtError::InvalidParameter { name: "commission_rate", .. })
        ));
        assert!(matches!(
            Ledger::new(&series, 1000.0, -0.01),
            Err(SbtError::InvalidParameter { name: "commission_rate", .. })
        ));
    }

    #[test]
    fn buy_fills_at_close_no_commission() {
        let series = make_series(&[100.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.0).unwrap();
        ledger.buy(0, 5).unwrap();

        assert!((ledger.cash() - 500.0).abs() < f64::EPSILON);
        assert_eq!(ledger.position(), 5);
        assert_eq!(ledger.trades().len(), 1);
        let trade = &ledger.trades()[0];
        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.size, 5);
        assert!((trade.price - 100.0).abs() < f64::EPSILON);
        assert!((trade.cash_after - 500.0).abs() < f64::EPSILON);
        assert!((ledger.equity(0).unwrap() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buy_rejected_on_insufficient_cash() {
        // cost = 100 * 11 * 1.01 = 1111 > 1000
        let series = make_series(&[100.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.01).unwrap();
        ledger.buy(0, 11).unwrap();

        assert!((ledger.cash() - 1000.0).abs() < f64::EPSILON);
        assert_eq!(ledger.position(), 0);
        assert!(ledger.trades().is_empty());
    }

    #[test]
    fn buy_pays_commission() {
        let series = make_series(&[100.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.01).unwrap();
        ledger.buy(0, 9).unwrap();

        // cost = 100 * 9 * 1.01 = 909
        assert!((ledger.cash() - 91.0).abs() < 1e-9);
        assert_eq!(ledger.position(), 9);
    }

    #[test]
    fn buy_zero_size_is_noop() {
        let series = make_series(&[100.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.0).unwrap();
        ledger.buy(0, 0).unwrap();
        assert_eq!(ledger.position(), 0);
        assert!(ledger.trades().is_empty());
    }

    #[test]
    fn avg_cost_weighted_mean() {
        let series = make_series(&[100.0, 200.0]);
        let mut ledger = Ledger::new(&series, 100_000.0, 0.0).unwrap();
        ledger.buy(0, 10).unwrap();
        assert!((ledger.avg_cost() - 100.0).abs() < f64::EPSILON);

        ledger.buy(1, 10).unwrap();
        // (100*10 + 200*10) / 20 = 150
        assert!((ledger.avg_cost() - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sell_receives_commission_reduced_proceeds() {
        let series = make_series(&[100.0, 110.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.01).unwrap();
        ledger.buy(0, 5).unwrap();
        let cash_after_buy = ledger.cash();

        ledger.sell(1, 5).unwrap();
        // proceeds = 110 * 5 * 0.99 = 544.5
        assert!((ledger.cash() - (cash_after_buy + 544.5)).abs() < 1e-9);
        assert_eq!(ledger.position(), 0);
    }

    #[test]
    fn sell_beyond_position_rejected() {
        // position 5, sell 10: rejected outright, not truncated to 5
        let series = make_series(&[100.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.0).unwrap();
        ledger.buy(0, 5).unwrap();
        let trades_before = ledger.trades().len();

        ledger.sell(0, 10).unwrap();
        assert_eq!(ledger.position(), 5);
        assert_eq!(ledger.trades().len(), trades_before);
    }

    #[test]
    fn sell_to_flat_resets_avg_cost() {
        let series = make_series(&[100.0, 110.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.0).unwrap();
        ledger.buy(0, 5).unwrap();
        assert!(ledger.avg_cost() > 0.0);

        ledger.sell(1, 5).unwrap();
        assert_eq!(ledger.position(), 0);
        assert!((ledger.avg_cost() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_sell_keeps_avg_cost() {
        let series = make_series(&[100.0, 110.0]);
        let mut ledger = Ledger::new(&series, 10_000.0, 0.0).unwrap();
        ledger.buy(0, 10).unwrap();
        ledger.sell(1, 4).unwrap();

        assert_eq!(ledger.position(), 6);
        assert!((ledger.avg_cost() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn close_sells_everything() {
        let series = make_series(&[100.0, 120.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.0).unwrap();
        ledger.buy(0, 7).unwrap();

        ledger.close(1).unwrap();
        assert_eq!(ledger.position(), 0);
        assert_eq!(ledger.trades().len(), 2);
        assert_eq!(ledger.trades()[1].size, 7);
    }

    #[test]
    fn close_when_flat_is_noop() {
        let series = make_series(&[100.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.0).unwrap();
        ledger.close(0).unwrap();
        assert!(ledger.trades().is_empty());
    }

    #[test]
    fn buy_on_missing_price_is_data_error() {
        let series = make_series(&[100.0]);
        let mut ledger = Ledger::new(&series, 1000.0, 0.0).unwrap();
        assert!(matches!(
            ledger.buy(5, 1),
            Err(SbtError::MissingPrice { index: 5 })
        ));
        // Faulted order leaves no trace either.
        assert_eq!(ledger.position(), 0);
        assert!(ledger.trades().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Order {
            Buy(u64),
            Sell(u64),
            Close,
        }

        fn order_strategy() -> impl Strategy<Value = Order> {
            prop_oneof![
                (1u64..50).prop_map(Order::Buy),
                (1u64..50).prop_map(Order::Sell),
                Just(Order::Close),
            ]
        }

        proptest! {
            #[test]
            fn invariants_hold_for_any_order_sequence(
                orders in prop::collection::vec((0usize..20, order_strategy()), 0..60),
                closes in prop::collection::vec(1.0f64..500.0, 20),
                commission in 0.0f64..0.1,
            ) {
                let series = make_series(&closes);
                let mut ledger = Ledger::new(&series, 10_000.0, commission).unwrap();

                for (bar, order) in orders {
                    match order {
                        Order::Buy(size) => ledger.buy(bar, size).unwrap(),
                        Order::Sell(size) => ledger.sell(bar, size).unwrap(),
                        Order::Close => ledger.close(bar).unwrap(),
                    }
                    // No buy may drive cash negative; no sell may short.
                    prop_assert!(ledger.cash() >= 0.0);
                    if ledger.position() == 0 {
                        prop_assert_eq!(ledger.avg_cost(), 0.0);
                    } else {
                        prop_assert!(ledger.avg_cost() > 0.0);
                    }
                }

                // Position must equal net bought minus sold from the log.
                let net: i64 = ledger
                    .trades()
                    .iter()
                    .map(|t| match t.side {
                        TradeSide::Buy => t.size as i64,
                        TradeSide::Sell => -(t.size as i64),
                    })
                    .sum();
                prop_assert_eq!(net, ledger.position() as i64);

                // Each trade snapshots the cash balance right after its fill.
                if let Some(last) = ledger.trades().last() {
                    prop_assert!((last.cash_after - ledger.cash()).abs() < 1e-9);
                }
            }
        }
    }
}
