//! CSV report adapter.
//!
//! Writes the run's outputs as three CSV files in the output directory:
//! `equity.csv` (timestamp, equity), `trades.csv` (bar, timestamp, side,
//! price, size, cash_after) and `metrics.csv` (metric, value). Charting and
//! any further presentation happen downstream of these files.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SbtError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn write_equity(
        result: &BacktestResult,
        series: &PriceSeries,
        path: &Path,
    ) -> Result<(), SbtError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["timestamp", "equity"])?;
        for (i, equity) in result.equity_curve.iter().enumerate() {
            let timestamp = series
                .bar(i)
                .map(|b| b.timestamp.to_string())
                .unwrap_or_default();
            wtr.write_record([timestamp, format!("{equity}")])?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(
        result: &BacktestResult,
        series: &PriceSeries,
        path: &Path,
    ) -> Result<(), SbtError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["bar", "timestamp", "side", "price", "size", "cash_after"])?;
        for trade in &result.trades {
            let timestamp = series
                .bar(trade.bar)
                .map(|b| b.timestamp.to_string())
                .unwrap_or_default();
            wtr.write_record([
                trade.bar.to_string(),
                timestamp,
                trade.side.to_string(),
                format!("{}", trade.price),
                trade.size.to_string(),
                format!("{}", trade.cash_after),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_metrics(metrics: &Metrics, path: &Path) -> Result<(), SbtError> {
        let rows = [
            ("TotalReturnPct", format!("{}", metrics.total_return_pct)),
            (
                "AnnualizedReturnPct",
                format!("{}", metrics.annualized_return_pct),
            ),
            ("MaxDrawdownPct", format!("{}", metrics.max_drawdown_pct)),
            ("SharpeRatio", format!("{}", metrics.sharpe_ratio)),
            ("TradeCount", metrics.trade_count.to_string()),
        ];
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["metric", "value"])?;
        for (metric, value) in rows {
            wtr.write_record([metric.to_string(), value])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl From<csv::Error> for SbtError {
    fn from(err: csv::Error) -> Self {
        SbtError::Data {
            reason: format!("CSV write error: {}", err),
        }
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        series: &PriceSeries,
        output_dir: &Path,
    ) -> Result<(), SbtError> {
        fs::create_dir_all(output_dir)?;
        Self::write_equity(result, series, &output_dir.join("equity.csv"))?;
        Self::write_trades(result, series, &output_dir.join("trades.csv"))?;
        Self::write_metrics(metrics, &output_dir.join("metrics.csv"))?;
        Ok(())
    }
}
