//! OHLCV bar representation and the validated price series.

use chrono::NaiveDateTime;

use super::error::SbtError;

/// One time-stamped OHLCV sample. Immutable for the lifetime of a run.
///
/// A missing price field is carried as NaN; it only becomes an error when a
/// fill or an equity snapshot needs to price that bar.
#[derive(Debug, Clone)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// An ordered, immutable series of bars for one symbol.
///
/// Construction enforces strictly increasing timestamps; everything else
/// reads it through index accessors.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: String, bars: Vec<OhlcvBar>) -> Result<Self, SbtError> {
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SbtError::Data {
                    reason: format!(
                        "timestamps not strictly increasing at {}",
                        pair[1].timestamp
                    ),
                });
            }
        }
        Ok(PriceSeries { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn bar(&self, index: usize) -> Option<&OhlcvBar> {
        self.bars.get(index)
    }

    /// Close price used for fills and equity marks.
    ///
    /// Out-of-range indices and non-finite closes are hard data errors:
    /// the caller asked to price a bar that cannot be priced.
    pub fn close(&self, index: usize) -> Result<f64, SbtError> {
        let bar = self
            .bars
            .get(index)
            .ok_or(SbtError::MissingPrice { index })?;
        if bar.close.is_finite() {
            Ok(bar.close)
        } else {
            Err(SbtError::MissingPrice { index })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: ts(day),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn new_accepts_increasing_timestamps() {
        let series = PriceSeries::new("BHP".into(), vec![bar(1, 100.0), bar(2, 101.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "BHP");
    }

    #[test]
    fn new_rejects_duplicate_timestamps() {
        let result = PriceSeries::new("BHP".into(), vec![bar(1, 100.0), bar(1, 101.0)]);
        assert!(matches!(result, Err(SbtError::Data { .. })));
    }

    #[test]
    fn new_rejects_backwards_timestamps() {
        let result = PriceSeries::new("BHP".into(), vec![bar(2, 100.0), bar(1, 101.0)]);
        assert!(matches!(result, Err(SbtError::Data { .. })));
    }

    #[test]
    fn new_accepts_empty_series() {
        let series = PriceSeries::new("BHP".into(), vec![]).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn close_returns_price() {
        let series = PriceSeries::new("BHP".into(), vec![bar(1, 100.0)]).unwrap();
        assert!((series.close(0).unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn close_out_of_range_is_missing_price() {
        let series = PriceSeries::new("BHP".into(), vec![bar(1, 100.0)]).unwrap();
        assert!(matches!(
            series.close(1),
            Err(SbtError::MissingPrice { index: 1 })
        ));
    }

    #[test]
    fn close_nan_is_missing_price() {
        let mut b = bar(1, 100.0);
        b.close = f64::NAN;
        let series = PriceSeries::new("BHP".into(), vec![b]).unwrap();
        assert!(matches!(
            series.close(0),
            Err(SbtError::MissingPrice { index: 0 })
        ));
    }
}
