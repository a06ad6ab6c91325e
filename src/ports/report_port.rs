//! Report hand-off port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SbtError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::PriceSeries;

/// Port handing the completed run to a rendering/reporting collaborator.
/// Everything passed in is read-only; the core does not know how it is
/// displayed or persisted.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        series: &PriceSeries,
        output_dir: &Path,
    ) -> Result<(), SbtError>;
}
