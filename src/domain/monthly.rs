//! Month-end resampling and the lagged trend signal.
//!
//! The signal computed from month m's close is the position HELD during
//! month m+1. Trading the same month's signal would leak information that
//! was not available at decision time.

use crate::domain::series::PriceSeries;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Signal parameters.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Trailing window, in months, of the simple moving average.
    pub sma_months: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { sma_months: 12 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Invested,
    Cash,
}

/// One calendar month: last available close, trailing SMA (None until the
/// window fills), and the position held during this month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyObservation {
    pub month_end: NaiveDate,
    pub price: f64,
    pub trailing_sma: Option<f64>,
    pub position: Position,
}

/// Resamples the daily series to month-end closes and derives the lagged
/// invested/cash signal. Months before the first signal (and the first
/// signalled month itself, which has no prior signal to inherit) hold Cash.
pub fn monthly_observations(
    series: &PriceSeries,
    config: &SignalConfig,
) -> Vec<MonthlyObservation> {
    let mut month_ends: Vec<(NaiveDate, f64)> = Vec::new();
    for bar in series.bars() {
        match month_ends.last_mut() {
            Some((date, price))
                if date.year() == bar.date.year() && date.month() == bar.date.month() =>
            {
                *date = bar.date;
                *price = bar.close;
            }
            _ => month_ends.push((bar.date, bar.close)),
        }
    }

    let mut observations = Vec::with_capacity(month_ends.len());
    let mut prev_signal: Option<Position> = None;

    for (i, &(month_end, price)) in month_ends.iter().enumerate() {
        let trailing_sma = if config.sma_months > 0 && i + 1 >= config.sma_months {
            let window = &month_ends[i + 1 - config.sma_months..=i];
            Some(window.iter().map(|&(_, p)| p).sum::<f64>() / config.sma_months as f64)
        } else {
            None
        };

        observations.push(MonthlyObservation {
            month_end,
            price,
            trailing_sma,
            position: prev_signal.unwrap_or(Position::Cash),
        });

        if let Some(sma) = trailing_sma {
            prev_signal = Some(if price >= sma {
                Position::Invested
            } else {
                Position::Cash
            });
        }
    }

    observations
}
