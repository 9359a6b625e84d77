//! Trend Guard backtest engine.
//!
//! Replays the lagged monthly signal into an equity curve next to an
//! always-invested baseline over the identical month range, compounding
//! from the same starting capital.

use crate::domain::error::TrendGuardError;
use crate::domain::monthly::{monthly_observations, MonthlyObservation, Position, SignalConfig};
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Backtest parameters.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Trailing SMA window in months.
    pub sma_months: usize,
    /// Annual yield earned while out of the market.
    pub cash_yield: f64,
    /// Starting capital for both equity curves.
    pub initial_equity: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            sma_months: 12,
            cash_yield: 0.03,
            initial_equity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Month-end equity values, one point per accounted month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn initial(&self) -> f64 {
        self.points.first().map(|p| p.equity).unwrap_or(0.0)
    }

    pub fn last(&self) -> f64 {
        self.points.last().map(|p| p.equity).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Output of one simulation: the tradable monthly window (observations
/// whose SMA is defined) and both curves over exactly that window.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub symbol: String,
    pub months: Vec<MonthlyObservation>,
    pub strategy_curve: EquityCurve,
    pub buy_hold_curve: EquityCurve,
    pub cash_yield: f64,
}

/// Simulates Trend Guard and Buy & Hold over `series`.
///
/// The first tradable month anchors both curves at the initial capital;
/// returns apply from the second tradable month on, so a signal that never
/// leaves Invested reproduces the baseline exactly.
pub fn simulate(
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestRun, TrendGuardError> {
    if config.initial_equity <= 0.0 {
        return Err(TrendGuardError::ConfigInvalid {
            section: "trendguard".into(),
            key: "initial_equity".into(),
            reason: format!("initial equity must be positive, got {}", config.initial_equity),
        });
    }

    let observations = monthly_observations(
        series,
        &SignalConfig {
            sma_months: config.sma_months,
        },
    );
    let total_months = observations.len();

    let months: Vec<MonthlyObservation> = observations
        .into_iter()
        .filter(|o| o.trailing_sma.is_some())
        .collect();

    if months.len() < 2 {
        return Err(TrendGuardError::InsufficientHistory {
            symbol: series.symbol().to_string(),
            have: total_months,
            need: config.sma_months + 1,
            unit: "months",
            what: format!("{}-month SMA signal", config.sma_months),
        });
    }

    let cash_monthly = config.cash_yield / 12.0;

    let mut strategy = Vec::with_capacity(months.len());
    let mut buy_hold = Vec::with_capacity(months.len());
    strategy.push(EquityPoint {
        date: months[0].month_end,
        equity: config.initial_equity,
    });
    buy_hold.push(EquityPoint {
        date: months[0].month_end,
        equity: config.initial_equity,
    });

    for t in 1..months.len() {
        let prev_price = months[t - 1].price;
        let asset_return = if prev_price > 0.0 {
            months[t].price / prev_price - 1.0
        } else {
            0.0
        };
        let realized = match months[t].position {
            Position::Invested => asset_return,
            Position::Cash => cash_monthly,
        };

        strategy.push(EquityPoint {
            date: months[t].month_end,
            equity: strategy[t - 1].equity * (1.0 + realized),
        });
        buy_hold.push(EquityPoint {
            date: months[t].month_end,
            equity: buy_hold[t - 1].equity * (1.0 + asset_return),
        });
    }

    Ok(BacktestRun {
        symbol: series.symbol().to_string(),
        months,
        strategy_curve: EquityCurve { points: strategy },
        buy_hold_curve: EquityCurve { points: buy_hold },
        cash_yield: config.cash_yield,
    })
}
