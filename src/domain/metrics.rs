//! Performance metrics for monthly equity curves.

use crate::domain::backtest::EquityCurve;
use crate::domain::monthly::Position;
use chrono::NaiveDate;
use serde::Serialize;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Risk/return statistics for one (symbol, strategy) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub cagr: f64,
    /// Most negative peak-to-trough decline, reported as a fraction <= 0.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Fraction of accounted months spent invested.
    pub time_invested: f64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub month_count: usize,
}

impl BacktestResult {
    /// Reduces an equity curve to its summary statistics.
    ///
    /// `positions` must align with the curve's points. Sharpe uses sample
    /// standard deviation (n-1 denominator) of the monthly returns.
    pub fn compute(curve: &EquityCurve, positions: &[Position], cash_yield: f64) -> Self {
        let n = curve.len();
        let period_start = curve.points.first().map(|p| p.date).unwrap_or(NaiveDate::MIN);
        let period_end = curve.points.last().map(|p| p.date).unwrap_or(NaiveDate::MIN);

        let initial = curve.initial();
        let final_equity = curve.last();

        let cagr = if n > 0 && initial > 0.0 {
            (final_equity / initial).powf(MONTHS_PER_YEAR / n as f64) - 1.0
        } else {
            0.0
        };

        let max_drawdown = compute_drawdown(curve);

        let returns = monthly_returns(curve);
        let sharpe_ratio = compute_sharpe(&returns, cash_yield / MONTHS_PER_YEAR);

        let invested = positions
            .iter()
            .filter(|p| **p == Position::Invested)
            .count();
        let time_invested = if positions.is_empty() {
            0.0
        } else {
            invested as f64 / positions.len() as f64
        };

        BacktestResult {
            cagr,
            max_drawdown,
            sharpe_ratio,
            time_invested,
            period_start,
            period_end,
            month_count: n,
        }
    }
}

fn monthly_returns(curve: &EquityCurve) -> Vec<f64> {
    curve
        .points
        .windows(2)
        .map(|w| {
            if w[0].equity > 0.0 {
                w[1].equity / w[0].equity - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

fn compute_drawdown(curve: &EquityCurve) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0f64;

    for point in &curve.points {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = point.equity / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_sharpe(returns: &[f64], cash_monthly: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean - cash_monthly) / stddev * MONTHS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
