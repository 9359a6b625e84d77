//! Domain error types.

/// Top-level error type for trendguard.
#[derive(Debug, thiserror::Error)]
pub enum TrendGuardError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed price series for {symbol}: {reason}")]
    MalformedSeries { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient history for {symbol}: have {have} {unit}, need {need} for {what}")]
    InsufficientHistory {
        symbol: String,
        have: usize,
        need: usize,
        unit: &'static str,
        what: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrendGuardError> for std::process::ExitCode {
    fn from(err: &TrendGuardError) -> Self {
        let code: u8 = match err {
            TrendGuardError::Io(_) => 1,
            TrendGuardError::ConfigParse { .. }
            | TrendGuardError::ConfigMissing { .. }
            | TrendGuardError::ConfigInvalid { .. } => 2,
            TrendGuardError::Data { .. } => 3,
            TrendGuardError::Report { .. } => 4,
            TrendGuardError::MalformedSeries { .. }
            | TrendGuardError::NoData { .. }
            | TrendGuardError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
