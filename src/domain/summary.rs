//! Flattened numeric summary for the presentation layer and the
//! narrative-analysis collaborator.
//!
//! The field names here are a published shape: downstream consumers key on
//! the serialized JSON, so renames are breaking changes.

use crate::domain::comparison::ComparisonRow;
use crate::domain::condition::MarketCondition;
use crate::domain::distribution::DistributionRecord;
use crate::domain::outlook::TechnicalOutlook;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Distribution-day aggregates over the analyzed window.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionSummary {
    pub raw_count: usize,
    pub expired_count: usize,
    pub condition: MarketCondition,
    /// Sum of percent changes across active distribution days.
    pub total_percent_decline: f64,
    /// Mean volume increase across active distribution days.
    pub average_volume_increase: f64,
}

/// Everything the narrative collaborator needs in one flat record.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub sessions: usize,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub distribution: DistributionSummary,
    pub outlook: TechnicalOutlook,
    pub trend_guard: Option<ComparisonRow>,
}

pub fn build_summary(
    series: &PriceSeries,
    records: &[DistributionRecord],
    condition: MarketCondition,
    outlook: TechnicalOutlook,
    trend_guard: Option<ComparisonRow>,
    as_of: NaiveDate,
) -> AnalysisSummary {
    let active: Vec<&DistributionRecord> = records.iter().filter(|r| r.is_active()).collect();

    let total_percent_decline = active.iter().map(|r| r.percent_change).sum();
    let average_volume_increase = if active.is_empty() {
        0.0
    } else {
        active.iter().map(|r| r.volume_change).sum::<f64>() / active.len() as f64
    };

    AnalysisSummary {
        symbol: series.symbol().to_string(),
        as_of,
        sessions: series.len(),
        period_start: series.first_date(),
        period_end: series.last_date(),
        distribution: DistributionSummary {
            raw_count: records.len(),
            expired_count: records.iter().filter(|r| r.expired).count(),
            condition,
            total_percent_decline,
            average_volume_increase,
        },
        outlook,
        trend_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{assess, ConditionThresholds};
    use crate::domain::distribution::{detect_with_expiration, DistributionConfig};
    use crate::domain::outlook::{assess_outlook, IndicatorConfig};
    use crate::domain::series::test_support::series_from;

    fn summarize(series: &PriceSeries) -> AnalysisSummary {
        let as_of = series.last_date();
        let records = detect_with_expiration(series, as_of, &DistributionConfig::default());
        let condition = assess(&records, series, as_of, &ConditionThresholds::default());
        let outlook = assess_outlook(series, &IndicatorConfig::default());
        build_summary(series, &records, condition, outlook, None, as_of)
    }

    #[test]
    fn aggregates_over_active_records() {
        let series = series_from("SPY", &[(100.0, 1000), (99.0, 1100), (98.0, 1210)]);
        let summary = summarize(&series);

        assert_eq!(summary.distribution.raw_count, 2);
        assert_eq!(summary.distribution.expired_count, 0);
        // Each day dropped ~1% on 10% more volume.
        assert!((summary.distribution.average_volume_increase - 0.10).abs() < 1e-9);
        assert!(summary.distribution.total_percent_decline < 0.0);
        assert_eq!(summary.sessions, 3);
        assert_eq!(summary.symbol, "SPY");
    }

    #[test]
    fn no_distribution_days_yields_zero_aggregates() {
        let series = series_from("SPY", &[(100.0, 1000), (101.0, 900), (102.0, 800)]);
        let summary = summarize(&series);

        assert_eq!(summary.distribution.raw_count, 0);
        assert_eq!(summary.distribution.total_percent_decline, 0.0);
        assert_eq!(summary.distribution.average_volume_increase, 0.0);
    }

    #[test]
    fn expired_records_leave_the_aggregates() {
        let mut data = vec![(100.0, 1000), (95.0, 1100)];
        // Recovery retires the day; the raw log still remembers it.
        data.push((100.0, 900));
        let series = series_from("SPY", &data);
        let summary = summarize(&series);

        assert_eq!(summary.distribution.raw_count, 1);
        assert_eq!(summary.distribution.expired_count, 1);
        assert_eq!(summary.distribution.condition.total_count, 0);
        assert_eq!(summary.distribution.total_percent_decline, 0.0);
    }

    #[test]
    fn trend_guard_results_ride_along_when_present() {
        use crate::domain::backtest::{simulate, BacktestConfig};
        use crate::domain::comparison::compare_run;
        use crate::domain::monthly::test_support::monthly_series;

        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.004f64.powi(i)).collect();
        let series = monthly_series("EEM", &closes);
        let run = simulate(&series, &BacktestConfig::default()).unwrap();
        let row = compare_run(&run);

        let as_of = series.last_date();
        let records = detect_with_expiration(&series, as_of, &DistributionConfig::default());
        let condition = assess(&records, &series, as_of, &ConditionThresholds::default());
        let outlook = assess_outlook(&series, &IndicatorConfig::default());
        let summary = build_summary(&series, &records, condition, outlook, Some(row), as_of);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["trend_guard"]["symbol"], "EEM");
        assert!(json["trend_guard"]["strategy"]["cagr"].is_number());
        assert!(json["trend_guard"]["drawdown_reduction"].is_number());
    }

    #[test]
    fn serialized_shape_is_stable() {
        let series = series_from("SPY", &[(100.0, 1000), (99.0, 1100)]);
        let summary = summarize(&series);
        let json = serde_json::to_value(&summary).unwrap();

        for key in [
            "symbol",
            "as_of",
            "sessions",
            "period_start",
            "period_end",
            "distribution",
            "outlook",
            "trend_guard",
        ] {
            assert!(json.get(key).is_some(), "missing top-level key {key}");
        }
        let distribution = json.get("distribution").unwrap();
        for key in [
            "raw_count",
            "expired_count",
            "condition",
            "total_percent_decline",
            "average_volume_increase",
        ] {
            assert!(distribution.get(key).is_some(), "missing distribution key {key}");
        }
        assert!(json["trend_guard"].is_null());
    }
}
