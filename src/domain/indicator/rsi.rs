//! RSI (Relative Strength Index) over daily closes.
//!
//! Wilder's smoothing: the first average gain/loss is a simple mean over
//! the initial window, after which avg = (prev_avg * (n-1) + current) / n.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), pinned to 100 when there
//! are no losses. The first `period` points are warmup (a change needs two
//! closes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::series::PriceBar;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = Vec::with_capacity(bars.len());

    let warmup_only = period == 0 || bars.len() <= period;
    let mut avg_gain = 0.0f64;
    let mut avg_loss = 0.0f64;

    for (i, bar) in bars.iter().enumerate() {
        if warmup_only || i < period {
            if i > 0 && !warmup_only {
                // Accumulate the seed means over the first `period` changes.
                let change = bar.close - bars[i - 1].close;
                avg_gain += change.max(0.0) / period as f64;
                avg_loss += (-change).max(0.0) / period as f64;
            }
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
            continue;
        }

        let change = bar.close - bars[i - 1].close;
        if i == period {
            avg_gain += change.max(0.0) / period as f64;
            avg_loss += (-change).max(0.0) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + change.max(0.0)) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + (-change).max(0.0)) / period as f64;
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: rsi,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
