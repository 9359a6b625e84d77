//! Configuration validation.
//!
//! Every tunable has a documented default, so validation only rejects
//! values that are present and out of range, plus the one key that has no
//! sensible default: the data directory.

use crate::domain::error::TrendGuardError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_EXPIRATION_SESSIONS: i64 = 25;
pub const DEFAULT_RECOVERY_THRESHOLD: f64 = 1.05;
pub const DEFAULT_RECENT_WINDOW: i64 = 10;
pub const DEFAULT_MODERATE_COUNT: i64 = 5;
pub const DEFAULT_HIGH_COUNT: i64 = 8;
pub const DEFAULT_RECENT_HIGH_COUNT: i64 = 4;
pub const DEFAULT_SMA_MONTHS: i64 = 12;
pub const DEFAULT_CASH_YIELD: f64 = 0.03;
pub const DEFAULT_INITIAL_EQUITY: f64 = 1.0;
pub const DEFAULT_MA_SHORT: i64 = 50;
pub const DEFAULT_MA_LONG: i64 = 200;
pub const DEFAULT_RSI_PERIOD: i64 = 14;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    match config.get_string("data", "csv_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TrendGuardError::ConfigMissing {
            section: "data".to_string(),
            key: "csv_dir".to_string(),
        }),
    }
}

pub fn validate_distribution_config(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    validate_expiration_sessions(config)?;
    validate_recovery_threshold(config)?;
    validate_recent_window(config)?;
    validate_verdict_thresholds(config)?;
    Ok(())
}

pub fn validate_trendguard_config(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    validate_sma_months(config)?;
    validate_cash_yield(config)?;
    validate_initial_equity(config)?;
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let ma_short = config.get_int("indicators", "ma_short", DEFAULT_MA_SHORT);
    if ma_short < 1 {
        return Err(invalid("indicators", "ma_short", "must be at least 1"));
    }
    let ma_long = config.get_int("indicators", "ma_long", DEFAULT_MA_LONG);
    if ma_long <= ma_short {
        return Err(invalid(
            "indicators",
            "ma_long",
            "must be longer than ma_short",
        ));
    }
    let rsi_period = config.get_int("indicators", "rsi_period", DEFAULT_RSI_PERIOD);
    if rsi_period < 1 {
        return Err(invalid("indicators", "rsi_period", "must be at least 1"));
    }
    Ok(())
}

fn validate_expiration_sessions(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let value = config.get_int("distribution", "expiration_sessions", DEFAULT_EXPIRATION_SESSIONS);
    if value < 1 {
        return Err(invalid(
            "distribution",
            "expiration_sessions",
            "must be at least 1 session",
        ));
    }
    Ok(())
}

fn validate_recovery_threshold(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let value = config.get_double("distribution", "recovery_threshold", DEFAULT_RECOVERY_THRESHOLD);
    if value < 1.0 {
        return Err(invalid(
            "distribution",
            "recovery_threshold",
            "must be at least 1.0 (a multiple of the record close)",
        ));
    }
    Ok(())
}

fn validate_recent_window(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let value = config.get_int("distribution", "recent_window", DEFAULT_RECENT_WINDOW);
    if value < 1 {
        return Err(invalid("distribution", "recent_window", "must be at least 1"));
    }
    Ok(())
}

fn validate_verdict_thresholds(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let moderate = config.get_int("distribution", "moderate_count", DEFAULT_MODERATE_COUNT);
    if moderate < 1 {
        return Err(invalid("distribution", "moderate_count", "must be at least 1"));
    }
    let high = config.get_int("distribution", "high_count", DEFAULT_HIGH_COUNT);
    if high < moderate {
        return Err(invalid(
            "distribution",
            "high_count",
            "must not be below moderate_count",
        ));
    }
    let recent_high = config.get_int("distribution", "recent_high_count", DEFAULT_RECENT_HIGH_COUNT);
    if recent_high < 1 {
        return Err(invalid(
            "distribution",
            "recent_high_count",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_sma_months(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let value = config.get_int("trendguard", "sma_months", DEFAULT_SMA_MONTHS);
    if value < 1 {
        return Err(invalid("trendguard", "sma_months", "must be at least 1 month"));
    }
    Ok(())
}

fn validate_cash_yield(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let value = config.get_double("trendguard", "cash_yield", DEFAULT_CASH_YIELD);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "trendguard",
            "cash_yield",
            "must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_initial_equity(config: &dyn ConfigPort) -> Result<(), TrendGuardError> {
    let value = config.get_double("trendguard", "initial_equity", DEFAULT_INITIAL_EQUITY);
    if value <= 0.0 {
        return Err(invalid("trendguard", "initial_equity", "must be positive"));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendGuardError {
    TrendGuardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
