//! Multi-symbol strategy-versus-baseline comparison.
//!
//! Each symbol's pipeline is independent, so the fan-out runs on rayon and
//! joins at the end. A failing symbol reports its own error and leaves the
//! rest of the table intact.

use crate::domain::backtest::{simulate, BacktestConfig, BacktestRun};
use crate::domain::error::TrendGuardError;
use crate::domain::metrics::BacktestResult;
use crate::domain::monthly::Position;
use crate::domain::series::PriceSeries;
use rayon::prelude::*;
use serde::Serialize;

/// Relative improvement of Trend Guard over Buy & Hold for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub symbol: String,
    pub buy_hold: BacktestResult,
    pub strategy: BacktestResult,
    /// 1 - strategy_dd / buy_hold_dd; positive when the strategy's
    /// drawdown magnitude is smaller, 0 when the baseline never drew down.
    pub drawdown_reduction: f64,
    pub cagr_delta: f64,
    pub sharpe_delta: f64,
}

/// Per-symbol outcome: a row, or that symbol's isolated failure.
#[derive(Debug)]
pub struct SymbolComparison {
    pub symbol: String,
    pub outcome: Result<ComparisonRow, TrendGuardError>,
}

/// Metrics for both curves of a completed run, plus the deltas.
pub fn compare_run(run: &BacktestRun) -> ComparisonRow {
    let positions: Vec<Position> = run.months.iter().map(|m| m.position).collect();
    let strategy = BacktestResult::compute(&run.strategy_curve, &positions, run.cash_yield);

    let always_invested = vec![Position::Invested; run.months.len()];
    let buy_hold = BacktestResult::compute(&run.buy_hold_curve, &always_invested, run.cash_yield);

    let drawdown_reduction = if buy_hold.max_drawdown == 0.0 {
        0.0
    } else {
        1.0 - strategy.max_drawdown / buy_hold.max_drawdown
    };

    ComparisonRow {
        symbol: run.symbol.clone(),
        cagr_delta: strategy.cagr - buy_hold.cagr,
        sharpe_delta: strategy.sharpe_ratio - buy_hold.sharpe_ratio,
        drawdown_reduction,
        buy_hold,
        strategy,
    }
}

/// Runs the backtest pipeline per symbol in parallel, preserving input
/// order in the output.
pub fn compare_symbols(
    series_list: &[PriceSeries],
    config: &BacktestConfig,
) -> Vec<SymbolComparison> {
    tracing::debug!(symbols = series_list.len(), "running comparison fan-out");

    series_list
        .par_iter()
        .map(|series| {
            let outcome = simulate(series, config).map(|run| compare_run(&run));
            if let Err(err) = &outcome {
                tracing::warn!(symbol = series.symbol(), %err, "symbol pipeline failed");
            }
            SymbolComparison {
                symbol: series.symbol().to_string(),
                outcome,
            }
        })
        .collect()
}
