//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{simulate, BacktestConfig};
use crate::domain::comparison::{compare_run, compare_symbols, SymbolComparison};
use crate::domain::condition::{assess, ConditionThresholds};
use crate::domain::config_validation::{
    self, validate_data_config, validate_distribution_config, validate_indicator_config,
    validate_trendguard_config,
};
use crate::domain::distribution::{detect_with_expiration, DistributionConfig};
use crate::domain::error::TrendGuardError;
use crate::domain::outlook::{assess_outlook, IndicatorConfig};
use crate::domain::series::PriceSeries;
use crate::domain::summary::build_summary;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(name = "trendguard", about = "Distribution-day and trend-following market analyzer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze distribution days and market condition for a symbol
    Distribution {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        /// Evaluation date (defaults to the last session in the data)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Backtest the trend strategy against buy-and-hold for a symbol
    Trend {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Backtest a comma-separated list of symbols and tabulate improvements
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbols: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Distribution {
            config,
            symbol,
            as_of,
            output,
        } => run_distribution(&config, &symbol, as_of, output.as_deref()),
        Command::Trend {
            config,
            symbol,
            output,
        } => run_trend(&config, &symbol, output.as_deref()),
        Command::Compare {
            config,
            symbols,
            output,
        } => run_compare(&config, &symbols, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TrendGuardError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_distribution_config(config: &dyn ConfigPort) -> DistributionConfig {
    DistributionConfig {
        expiration_sessions: config.get_int(
            "distribution",
            "expiration_sessions",
            config_validation::DEFAULT_EXPIRATION_SESSIONS,
        ) as usize,
        recovery_threshold: config.get_double(
            "distribution",
            "recovery_threshold",
            config_validation::DEFAULT_RECOVERY_THRESHOLD,
        ),
    }
}

pub fn build_condition_thresholds(config: &dyn ConfigPort) -> ConditionThresholds {
    ConditionThresholds {
        moderate_count: config.get_int(
            "distribution",
            "moderate_count",
            config_validation::DEFAULT_MODERATE_COUNT,
        ) as usize,
        high_count: config.get_int(
            "distribution",
            "high_count",
            config_validation::DEFAULT_HIGH_COUNT,
        ) as usize,
        recent_high_count: config.get_int(
            "distribution",
            "recent_high_count",
            config_validation::DEFAULT_RECENT_HIGH_COUNT,
        ) as usize,
        recent_window: config.get_int(
            "distribution",
            "recent_window",
            config_validation::DEFAULT_RECENT_WINDOW,
        ) as usize,
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        sma_months: config.get_int(
            "trendguard",
            "sma_months",
            config_validation::DEFAULT_SMA_MONTHS,
        ) as usize,
        cash_yield: config.get_double(
            "trendguard",
            "cash_yield",
            config_validation::DEFAULT_CASH_YIELD,
        ),
        initial_equity: config.get_double(
            "trendguard",
            "initial_equity",
            config_validation::DEFAULT_INITIAL_EQUITY,
        ),
    }
}

pub fn build_indicator_config(config: &dyn ConfigPort) -> IndicatorConfig {
    IndicatorConfig {
        ma_short: config.get_int("indicators", "ma_short", config_validation::DEFAULT_MA_SHORT)
            as usize,
        ma_long: config.get_int("indicators", "ma_long", config_validation::DEFAULT_MA_LONG)
            as usize,
        rsi_period: config.get_int(
            "indicators",
            "rsi_period",
            config_validation::DEFAULT_RSI_PERIOD,
        ) as usize,
        ..IndicatorConfig::default()
    }
}

/// Comma-separated symbol list, trimmed, input order preserved.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, TrendGuardError> {
    let symbols: Vec<String> = input
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(TrendGuardError::Data {
            reason: "no symbols given".to_string(),
        });
    }
    Ok(symbols)
}

fn date_range(config: &dyn ConfigPort) -> (NaiveDate, NaiveDate) {
    let parse = |key: &str, fallback: NaiveDate| {
        config
            .get_string("data", key)
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
            .unwrap_or(fallback)
    };
    (
        parse("start_date", NaiveDate::MIN),
        parse("end_date", NaiveDate::MAX),
    )
}

fn fetch_series(
    adapter: &FileConfigAdapter,
    symbol: &str,
) -> Result<PriceSeries, TrendGuardError> {
    let csv_dir = adapter
        .get_string("data", "csv_dir")
        .ok_or_else(|| TrendGuardError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })?;
    let (start, end) = date_range(adapter);
    let data_port = CsvAdapter::new(PathBuf::from(csv_dir));
    let series = data_port.fetch_daily(symbol, start, end)?;
    tracing::debug!(symbol, bars = series.len(), "loaded daily series");
    Ok(series)
}

fn write_report<T: serde::Serialize>(value: &T, output: Option<&std::path::Path>) -> ExitCode {
    if let Some(path) = output {
        if let Err(e) = JsonReportAdapter.write(value, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Report written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_distribution(
    config_path: &PathBuf,
    symbol: &str,
    as_of: Option<NaiveDate>,
    output: Option<&std::path::Path>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    for validation in [
        validate_data_config(&adapter),
        validate_distribution_config(&adapter),
        validate_indicator_config(&adapter),
    ] {
        if let Err(e) = validation {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let series = match fetch_series(&adapter, symbol) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let as_of = as_of.unwrap_or_else(|| series.last_date());

    let distribution_config = build_distribution_config(&adapter);
    let thresholds = build_condition_thresholds(&adapter);
    let indicator_config = build_indicator_config(&adapter);

    let records = detect_with_expiration(&series, as_of, &distribution_config);
    let condition = assess(&records, &series, as_of, &thresholds);
    let outlook = assess_outlook(&series, &indicator_config);
    let summary = build_summary(&series, &records, condition, outlook, None, as_of);

    eprintln!(
        "{}: {} sessions analyzed, {} to {}",
        symbol,
        series.len(),
        series.first_date(),
        series.last_date(),
    );
    eprintln!("\n=== Distribution Days ===");
    for record in records.iter().filter(|r| r.is_active()) {
        eprintln!(
            "  {}: close {:.2}, volume {}, weighted change {:.2}%",
            record.date,
            record.close,
            record.volume,
            record.weighted_change * 100.0,
        );
    }
    eprintln!(
        "Active: {}  (raw {}, expired {})",
        summary.distribution.condition.total_count,
        summary.distribution.raw_count,
        summary.distribution.expired_count,
    );
    eprintln!(
        "Recent (last {} sessions): {}",
        thresholds.recent_window, summary.distribution.condition.recent_count,
    );
    eprintln!("Verdict: {:?}", summary.distribution.condition.verdict);
    eprintln!("\n=== Technical Outlook ===");
    eprintln!("Last close: {:.2}", summary.outlook.last_close);
    match (summary.outlook.ma_short, summary.outlook.ma_long) {
        (Some(short), Some(long)) => {
            eprintln!("MA{}: {:.2}  MA{}: {:.2}", indicator_config.ma_short, short, indicator_config.ma_long, long);
            eprintln!("Trend: {:?}", summary.outlook.trend.unwrap());
        }
        _ => eprintln!("Moving averages: insufficient history"),
    }
    match summary.outlook.rsi {
        Some(rsi) => eprintln!("RSI: {:.1} ({:?})", rsi, summary.outlook.momentum.unwrap()),
        None => eprintln!("RSI: insufficient history"),
    }

    write_report(&summary, output)
}

fn run_trend(config_path: &PathBuf, symbol: &str, output: Option<&std::path::Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    for validation in [
        validate_data_config(&adapter),
        validate_trendguard_config(&adapter),
    ] {
        if let Err(e) = validation {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let series = match fetch_series(&adapter, symbol) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bt_config = build_backtest_config(&adapter);
    let run = match simulate(&series, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let row = compare_run(&run);

    eprintln!(
        "{}: {} months, {} to {}",
        symbol, row.strategy.month_count, row.strategy.period_start, row.strategy.period_end,
    );
    eprintln!("\n=== Buy & Hold ===");
    eprintln!("CAGR:          {:.2}%", row.buy_hold.cagr * 100.0);
    eprintln!("Max Drawdown:  {:.2}%", row.buy_hold.max_drawdown * 100.0);
    eprintln!("Sharpe Ratio:  {:.2}", row.buy_hold.sharpe_ratio);
    eprintln!("\n=== Trend Guard ({}-month SMA) ===", bt_config.sma_months);
    eprintln!("CAGR:          {:.2}%", row.strategy.cagr * 100.0);
    eprintln!("Max Drawdown:  {:.2}%", row.strategy.max_drawdown * 100.0);
    eprintln!("Sharpe Ratio:  {:.2}", row.strategy.sharpe_ratio);
    eprintln!("Time Invested: {:.1}%", row.strategy.time_invested * 100.0);
    eprintln!("\n=== Improvement ===");
    eprintln!("Drawdown Reduction: {:.1}%", row.drawdown_reduction * 100.0);
    eprintln!("CAGR Delta:         {:+.2}%", row.cagr_delta * 100.0);
    eprintln!("Sharpe Delta:       {:+.2}", row.sharpe_delta);

    write_report(&row, output)
}

fn run_compare(config_path: &PathBuf, symbols: &str, output: Option<&std::path::Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    for validation in [
        validate_data_config(&adapter),
        validate_trendguard_config(&adapter),
    ] {
        if let Err(e) = validation {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let symbols = match parse_symbols(symbols) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Fetch sequentially (the data port is the one blocking collaborator),
    // analyze in parallel.
    let mut series_list = Vec::with_capacity(symbols.len());
    let mut fetch_failures: Vec<SymbolComparison> = Vec::new();
    for symbol in &symbols {
        match fetch_series(&adapter, symbol) {
            Ok(series) => series_list.push(series),
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                fetch_failures.push(SymbolComparison {
                    symbol: symbol.clone(),
                    outcome: Err(e),
                });
            }
        }
    }

    if series_list.is_empty() {
        eprintln!("error: no symbols with data to compare");
        return ExitCode::from(5);
    }

    let bt_config = build_backtest_config(&adapter);
    let results = compare_symbols(&series_list, &bt_config);

    eprintln!("\n=== Trend Guard vs Buy & Hold ===");
    eprintln!(
        "{:<8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Symbol", "BH CAGR", "TG CAGR", "BH MaxDD", "TG MaxDD", "DD Red."
    );
    let mut rows = Vec::new();
    for result in &results {
        match &result.outcome {
            Ok(row) => {
                eprintln!(
                    "{:<8} {:>9.2}% {:>9.2}% {:>9.2}% {:>9.2}% {:>9.1}%",
                    row.symbol,
                    row.buy_hold.cagr * 100.0,
                    row.strategy.cagr * 100.0,
                    row.buy_hold.max_drawdown * 100.0,
                    row.strategy.max_drawdown * 100.0,
                    row.drawdown_reduction * 100.0,
                );
                rows.push(row.clone());
            }
            Err(e) => eprintln!("{:<8} failed: {}", result.symbol, e),
        }
    }
    for failure in &fetch_failures {
        if let Err(e) = &failure.outcome {
            eprintln!("{:<8} failed: {}", failure.symbol, e);
        }
    }

    write_report(&rows, output)
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    for validation in [
        validate_data_config(&adapter),
        validate_distribution_config(&adapter),
        validate_trendguard_config(&adapter),
        validate_indicator_config(&adapter),
    ] {
        if let Err(e) = validation {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    eprintln!("Config validated successfully");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let Some(csv_dir) = adapter.get_string("data", "csv_dir") else {
        let err = TrendGuardError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        };
        eprintln!("error: {err}");
        return (&err).into();
    };
    let data_port = CsvAdapter::new(PathBuf::from(csv_dir));

    match data_port.list_symbols() {
        Ok(symbols) => {
            for symbol in symbols {
                println!("{symbol}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
