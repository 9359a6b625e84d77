//! Technical outlook: long-horizon averages and momentum at the end of
//! the series.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::series::PriceSeries;
use serde::Serialize;

/// Indicator periods and RSI zones.
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_short: 50,
            ma_long: 200,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    StrongUptrend,
    StrongDowntrend,
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumState {
    Overbought,
    Oversold,
    Neutral,
}

/// Snapshot at the last bar. Fields are None when the series is shorter
/// than the indicator's window; a missing input leaves the derived state
/// missing too.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalOutlook {
    pub last_close: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub trend: Option<TrendState>,
    pub momentum: Option<MomentumState>,
}

pub fn assess_outlook(series: &PriceSeries, config: &IndicatorConfig) -> TechnicalOutlook {
    let bars = series.bars();
    let last_close = bars[bars.len() - 1].close;

    let ma_short = calculate_sma(bars, config.ma_short)
        .last_valid()
        .map(|p| p.value);
    let ma_long = calculate_sma(bars, config.ma_long)
        .last_valid()
        .map(|p| p.value);
    let rsi = calculate_rsi(bars, config.rsi_period)
        .last_valid()
        .map(|p| p.value);

    let trend = match (ma_short, ma_long) {
        (Some(short), Some(long)) => Some(classify_trend(last_close, short, long)),
        _ => None,
    };

    let momentum = rsi.map(|value| {
        if value > config.rsi_overbought {
            MomentumState::Overbought
        } else if value < config.rsi_oversold {
            MomentumState::Oversold
        } else {
            MomentumState::Neutral
        }
    });

    TechnicalOutlook {
        last_close,
        ma_short,
        ma_long,
        rsi,
        trend,
        momentum,
    }
}

fn classify_trend(close: f64, short: f64, long: f64) -> TrendState {
    if close > short && short > long {
        TrendState::StrongUptrend
    } else if close < short && short < long {
        TrendState::StrongDowntrend
    } else if short > long {
        TrendState::Bullish
    } else {
        TrendState::Bearish
    }
}
