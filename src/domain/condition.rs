//! Market-condition assessment from active distribution days.

use crate::domain::distribution::DistributionRecord;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Verdict thresholds. IBD practice tunes these per market regime, so they
/// are configuration, not constants baked into the logic.
#[derive(Debug, Clone)]
pub struct ConditionThresholds {
    /// Active count at or above this is moderate pressure.
    pub moderate_count: usize,
    /// Active count at or above this is high pressure.
    pub high_count: usize,
    /// Recent count at or above this is high pressure on its own.
    pub recent_high_count: usize,
    /// Trailing session window that makes a record "recent".
    pub recent_window: usize,
}

impl Default for ConditionThresholds {
    fn default() -> Self {
        Self {
            moderate_count: 5,
            high_count: 8,
            recent_high_count: 4,
            recent_window: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Healthy,
    ModeratePressure,
    HighPressure,
}

/// Aggregate over the non-expired records, recomputed on demand.
#[derive(Debug, Clone, Serialize)]
pub struct MarketCondition {
    pub total_count: usize,
    pub recent_count: usize,
    pub total_weighted_change: f64,
    pub verdict: Verdict,
}

/// Aggregates the active (non-expired, dated at or before `as_of`) subset
/// of `records`. The series supplies the session clock for the recency
/// window.
pub fn assess(
    records: &[DistributionRecord],
    series: &PriceSeries,
    as_of: NaiveDate,
    thresholds: &ConditionThresholds,
) -> MarketCondition {
    let bars = series.bars();
    let last_idx = series.last_index_at(as_of);
    let beyond = usize::from(!bars.is_empty() && as_of > bars[bars.len() - 1].date);

    let mut total_count = 0usize;
    let mut recent_count = 0usize;
    let mut total_weighted_change = 0.0f64;

    for record in records {
        if record.expired || record.date > as_of {
            continue;
        }
        total_count += 1;
        total_weighted_change += record.weighted_change;

        let recent = match (last_idx, bars.binary_search_by_key(&record.date, |b| b.date)) {
            (Some(last), Ok(idx)) if idx <= last => last - idx + beyond < thresholds.recent_window,
            _ => false,
        };
        if recent {
            recent_count += 1;
        }
    }

    let verdict = if total_count >= thresholds.high_count
        || recent_count >= thresholds.recent_high_count
    {
        Verdict::HighPressure
    } else if total_count >= thresholds.moderate_count {
        Verdict::ModeratePressure
    } else {
        Verdict::Healthy
    };

    MarketCondition {
        total_count,
        recent_count,
        total_weighted_change,
        verdict,
    }
}
