//! Data access port trait.

use crate::domain::error::SbtError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

/// Source of historical price series. The core only ever sees the
/// materialized, validated [`PriceSeries`].
pub trait DataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, SbtError>;

    fn list_symbols(&self) -> Result<Vec<String>, SbtError>;

    /// (first timestamp's date, last timestamp's date, bar count), or None
    /// when no data exists for the symbol.
    fn data_range(&self, symbol: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SbtError>;
}
