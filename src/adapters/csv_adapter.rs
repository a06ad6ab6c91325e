//! CSV file data adapter.
//!
//! One file per symbol at `<base>/<symbol>.csv` with columns
//! `datetime,open,high,low,close,volume`. Timestamps accept either
//! `%Y-%m-%d %H:%M:%S` or a bare date (midnight). Blank price cells load
//! as NaN; the core faults only if a fill or equity mark touches them.

use crate::domain::error::SbtError;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, SbtError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| SbtError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SbtError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp = parse_timestamp(field(&record, 0, "datetime")?)?;
            let open = parse_price(field(&record, 1, "open")?, "open")?;
            let high = parse_price(field(&record, 2, "high")?, "high")?;
            let low = parse_price(field(&record, 3, "low")?, "low")?;
            let close = parse_price(field(&record, 4, "close")?, "close")?;
            let volume = parse_price(field(&record, 5, "volume")?, "volume")?;

            bars.push(OhlcvBar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, SbtError> {
    record.get(index).ok_or_else(|| SbtError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SbtError> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
        .map_err(|e| SbtError::Data {
            reason: format!("invalid datetime {:?}: {}", value, e),
        })
}

/// Blank cells become NaN (a bar the core may never need to price);
/// anything else must parse.
fn parse_price(value: &str, name: &str) -> Result<f64, SbtError> {
    if value.trim().is_empty() {
        return Ok(f64::NAN);
    }
    value.trim().parse().map_err(|e| SbtError::Data {
        reason: format!("invalid {} value {:?}: {}", name, value, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, SbtError> {
        let mut bars = self.read_bars(symbol)?;
        bars.retain(|b| {
            let date = b.timestamp.date();
            start_date.is_none_or(|s| date >= s) && end_date.is_none_or(|e| date <= e)
        });
        PriceSeries::new(symbol.to_string(), bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SbtError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SbtError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SbtError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn data_range(&self, symbol: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SbtError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.read_bars(symbol)?;
        Ok(bars.first().zip(bars.last()).map(|(first, last)| {
            (first.timestamp.date(), last.timestamp.date(), bars.len())
        }))
    }
}
