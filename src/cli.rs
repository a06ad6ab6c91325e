//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::error::SbtError;
use crate::domain::metrics::Metrics;
use crate::domain::strategies::{BuyAndHold, MaCross, MaKind, BUILTIN_STRATEGIES};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sbt", about = "Bar-by-bar trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory of per-symbol CSV files (overrides [data] dir)
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// Built-in strategy name (overrides [strategy] name)
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(long)]
        cash: Option<f64>,
        #[arg(long)]
        commission: Option<f64>,
        /// Restrict to bars on or after this date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// Restrict to bars on or before this date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Directory for equity/trades/metrics CSV reports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List built-in strategies
    ListStrategies,
    /// Show data range for a symbol
    Info {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            symbol,
            strategy,
            cash,
            commission,
            start_date,
            end_date,
            output,
        } => run_backtest_command(BacktestArgs {
            config,
            data,
            symbol,
            strategy,
            cash,
            commission,
            start_date,
            end_date,
            output,
        }),
        Command::ListStrategies => run_list_strategies(),
        Command::Info {
            symbol,
            data,
            config,
        } => run_info(&symbol, data, config.as_ref()),
    }
}

pub struct BacktestArgs {
    pub config: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub symbol: Option<String>,
    pub strategy: Option<String>,
    pub cash: Option<f64>,
    pub commission: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub output: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, SbtError> {
    match path {
        Some(p) => FileConfigAdapter::from_file(p).map_err(|e| SbtError::ConfigParse {
            file: p.display().to_string(),
            reason: e.to_string(),
        }),
        // No file: every lookup falls back to its default.
        None => FileConfigAdapter::from_string("").map_err(|e| SbtError::ConfigParse {
            file: "<empty>".into(),
            reason: e,
        }),
    }
}

/// Flags override config keys; validation happens before any data loads.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    cash_override: Option<f64>,
    commission_override: Option<f64>,
) -> Result<BacktestConfig, SbtError> {
    let initial_cash =
        cash_override.unwrap_or_else(|| config.get_double("backtest", "initial_cash", 10_000.0));
    let commission_rate =
        commission_override.unwrap_or_else(|| config.get_double("backtest", "commission", 0.002));

    if !initial_cash.is_finite() || initial_cash <= 0.0 {
        return Err(SbtError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_cash".into(),
            reason: format!("must be a positive finite number, got {initial_cash}"),
        });
    }
    if !commission_rate.is_finite() || !(0.0..1.0).contains(&commission_rate) {
        return Err(SbtError::ConfigInvalid {
            section: "backtest".into(),
            key: "commission".into(),
            reason: format!("must be in [0, 1), got {commission_rate}"),
        });
    }

    Ok(BacktestConfig {
        initial_cash,
        commission_rate,
    })
}

/// Map a strategy name to a boxed instance, parameters from [strategy].
pub fn build_strategy(
    name: &str,
    config: &dyn ConfigPort,
) -> Result<Box<dyn Strategy>, SbtError> {
    let position_pct = config.get_double("strategy", "position_pct", 0.3);
    let lot_size = config.get_int("strategy", "lot_size", 100).max(0) as u64;

    match name {
        "ema-cross" => {
            let fast = config.get_int("strategy", "fast", 52).max(0) as usize;
            let slow = config.get_int("strategy", "slow", 104).max(0) as usize;
            Ok(Box::new(MaCross::new(
                MaKind::Ema,
                fast,
                slow,
                position_pct,
                lot_size,
            )?))
        }
        "sma-cross" => {
            let fast = config.get_int("strategy", "fast", 20).max(0) as usize;
            let slow = config.get_int("strategy", "slow", 50).max(0) as usize;
            Ok(Box::new(MaCross::new(
                MaKind::Sma,
                fast,
                slow,
                position_pct,
                lot_size,
            )?))
        }
        "buy-and-hold" => Ok(Box::new(BuyAndHold)),
        _ => Err(SbtError::UnknownStrategy {
            name: name.to_string(),
        }),
    }
}

pub fn resolve_date(
    value: Option<&str>,
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, SbtError> {
    let raw = match value {
        Some(v) => Some(v.to_string()),
        None => config.get_string("backtest", key),
    };
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| SbtError::ConfigInvalid {
                section: "backtest".into(),
                key: key.into(),
                reason: format!("{:?}: {}", s, e),
            }),
    }
}

fn resolve_data_dir(flag: Option<PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    flag.unwrap_or_else(|| {
        PathBuf::from(config.get_string("data", "dir").unwrap_or_else(|| "./data".into()))
    })
}

fn run_backtest_command(args: BacktestArgs) -> ExitCode {
    match try_run_backtest(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn try_run_backtest(args: BacktestArgs) -> Result<(), SbtError> {
    // Stage 1: Load config and resolve parameters
    let config = load_config(args.config.as_ref())?;
    let bt_config = build_backtest_config(&config, args.cash, args.commission)?;

    let symbol = match args.symbol.or_else(|| config.get_string("backtest", "symbol")) {
        Some(s) => s,
        None => {
            return Err(SbtError::ConfigMissing {
                section: "backtest".into(),
                key: "symbol".into(),
            })
        }
    };
    let strategy_name = match args
        .strategy
        .or_else(|| config.get_string("strategy", "name"))
    {
        Some(s) => s,
        None => {
            return Err(SbtError::ConfigMissing {
                section: "strategy".into(),
                key: "name".into(),
            })
        }
    };
    let start_date = resolve_date(args.start_date.as_deref(), &config, "start_date")?;
    let end_date = resolve_date(args.end_date.as_deref(), &config, "end_date")?;

    // Stage 2: Build strategy
    let mut strategy = build_strategy(&strategy_name, &config)?;
    eprintln!("Loading strategy: {strategy_name}");

    // Stage 3: Fetch price series
    let data_dir = resolve_data_dir(args.data, &config);
    let adapter = CsvAdapter::new(data_dir);
    let series = adapter.fetch_series(&symbol, start_date, end_date)?;
    eprintln!("Loaded {} bars for {symbol}", series.len());

    // Stage 4: Run simulation
    let result = run_backtest(&series, strategy.as_mut(), &bt_config)?;

    // Stage 5: Compute metrics and print summary
    let metrics = Metrics::compute(&result.equity_curve, &result.trades);

    eprintln!("\n=== Backtest Results: {symbol} ({strategy_name}) ===");
    eprintln!("Total Return:     {:.2}%", metrics.total_return_pct);
    eprintln!("Annualized:       {:.2}%", metrics.annualized_return_pct);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown_pct);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Trades:           {}", metrics.trade_count);
    eprintln!("Final Cash:       {:.2}", result.final_cash);
    eprintln!("Final Position:   {}", result.final_position);

    // Stage 6: Optional report hand-off
    let output = args
        .output
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from));
    if let Some(output_dir) = output {
        CsvReportAdapter.write(&result, &metrics, &series, &output_dir)?;
        eprintln!("Report written to {}", output_dir.display());
    }

    Ok(())
}

fn run_list_strategies() -> ExitCode {
    for (name, description) in BUILTIN_STRATEGIES {
        println!("{name:<14} {description}");
    }
    ExitCode::SUCCESS
}

fn run_info(symbol: &str, data: Option<PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let result = (|| -> Result<(), SbtError> {
        let config = load_config(config_path)?;
        let adapter = CsvAdapter::new(resolve_data_dir(data, &config));
        match adapter.data_range(symbol)? {
            Some((first, last, bars)) => {
                println!("{symbol}: {bars} bars, {first} to {last}");
            }
            None => println!("{symbol}: no data"),
        }
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
