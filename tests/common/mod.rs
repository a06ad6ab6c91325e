#![allow(dead_code)]

use chrono::NaiveDate;
use sbt::domain::error::SbtError;
pub use sbt::domain::ohlcv::{OhlcvBar, PriceSeries};
use sbt::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, SbtError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SbtError::Data {
                reason: reason.clone(),
            });
        }
        let mut bars = self.data.get(symbol).cloned().unwrap_or_default();
        bars.retain(|b| {
            let date = b.timestamp.date();
            start_date.is_none_or(|s| date >= s) && end_date.is_none_or(|e| date <= e)
        });
        PriceSeries::new(symbol.to_string(), bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SbtError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn data_range(&self, symbol: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SbtError> {
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let first = bars.iter().map(|b| b.timestamp.date()).min().unwrap();
                let last = bars.iter().map(|b| b.timestamp.date()).max().unwrap();
                Ok(Some((first, last, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(day_offset: i64, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap()
            + chrono::Duration::days(day_offset),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

pub fn make_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as i64, close))
        .collect();
    PriceSeries::new(symbol.to_string(), bars).unwrap()
}
