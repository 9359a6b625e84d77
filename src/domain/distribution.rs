//! Distribution-day detection and expiration.
//!
//! A distribution day is a session that closes lower than the prior session
//! on higher volume — the IBD signature of institutional selling. Detected
//! days stay on the active count until they age out (a fixed number of
//! trading sessions) or the price recovers enough to retire them early.

use crate::domain::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Detection and expiration parameters.
#[derive(Debug, Clone)]
pub struct DistributionConfig {
    /// Trading sessions a distribution day stays on the count.
    pub expiration_sessions: usize,
    /// Close multiple that retires a day early (1.05 = 5% recovery).
    pub recovery_threshold: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            expiration_sessions: 25,
            recovery_threshold: 1.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationReason {
    None,
    Time,
    PriceRecovery,
}

/// One detected distribution day. Expiration flags are set by
/// [`apply_expiration`]; records are never removed from the log.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
    pub percent_change: f64,
    pub volume_change: f64,
    pub weighted_change: f64,
    pub expired: bool,
    pub expiration: ExpirationReason,
}

impl DistributionRecord {
    pub fn is_active(&self) -> bool {
        !self.expired
    }
}

/// Scans the series for distribution days. Pure function of the series.
pub fn detect(series: &PriceSeries) -> Vec<DistributionRecord> {
    let bars = series.bars();
    let mut records = Vec::new();

    for i in 1..bars.len() {
        let prev = &bars[i - 1];
        let bar = &bars[i];

        if bar.close < prev.close && bar.volume > prev.volume {
            // prev.close > bar.close >= 0, so the denominator is nonzero.
            let percent_change = bar.close / prev.close - 1.0;
            let volume_change = if prev.volume == 0 {
                0.0
            } else {
                bar.volume as f64 / prev.volume as f64 - 1.0
            };
            let weighted_change = percent_change * (1.0 + volume_change);

            records.push(DistributionRecord {
                date: bar.date,
                close: bar.close,
                volume: bar.volume,
                percent_change,
                volume_change,
                weighted_change,
                expired: false,
                expiration: ExpirationReason::None,
            });
        }
    }

    records
}

/// Flags expired records against `series` as of `as_of` (normally the
/// series' last date; a later date counts as one further elapsed session).
///
/// Per record the bars after it are walked chronologically, recovery
/// checked before the time boundary at each step: a close at or above
/// `recovery_threshold` times the record close retires it as
/// `PriceRecovery`; otherwise once `expiration_sessions` sessions have
/// elapsed it retires as `Time`. The scan per record is bounded by the
/// expiration window, not the full series tail.
pub fn apply_expiration(
    records: &mut [DistributionRecord],
    series: &PriceSeries,
    as_of: NaiveDate,
    config: &DistributionConfig,
) {
    let bars = series.bars();
    let Some(last_idx) = series.last_index_at(as_of) else {
        return;
    };
    let beyond = usize::from(as_of > bars[bars.len() - 1].date);

    for record in records.iter_mut() {
        let Ok(idx) = bars.binary_search_by_key(&record.date, |b| b.date) else {
            continue;
        };
        if idx > last_idx {
            continue;
        }

        let elapsed = last_idx - idx + beyond;
        let window_end = (idx + config.expiration_sessions).min(last_idx);
        let threshold = config.recovery_threshold * record.close;

        if bars[idx + 1..=window_end].iter().any(|b| b.close >= threshold) {
            record.expired = true;
            record.expiration = ExpirationReason::PriceRecovery;
        } else if elapsed >= config.expiration_sessions {
            record.expired = true;
            record.expiration = ExpirationReason::Time;
        }
    }
}

/// Detect then expire in one call.
pub fn detect_with_expiration(
    series: &PriceSeries,
    as_of: NaiveDate,
    config: &DistributionConfig,
) -> Vec<DistributionRecord> {
    let mut records = detect(series);
    apply_expiration(&mut records, series, as_of, config);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::test_support::series_from;
    use chrono::Duration;

    #[test]
    fn down_close_up_volume_qualifies() {
        let series = series_from("SPY", &[(100.0, 1000), (99.0, 1100)]);
        let records = detect(&series);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert!((r.percent_change - (-0.01)).abs() < 1e-12);
        assert!((r.volume_change - 0.10).abs() < 1e-12);
        assert!((r.weighted_change - (-0.01 * 1.10)).abs() < 1e-12);
        assert!(!r.expired);
        assert_eq!(r.expiration, ExpirationReason::None);
    }

    #[test]
    fn down_close_down_volume_does_not_qualify() {
        let series = series_from("SPY", &[(100.0, 1000), (99.0, 900)]);
        assert!(detect(&series).is_empty());
    }

    #[test]
    fn up_close_up_volume_does_not_qualify() {
        let series = series_from("SPY", &[(100.0, 1000), (101.0, 1100)]);
        assert!(detect(&series).is_empty());
    }

    #[test]
    fn flat_close_does_not_qualify() {
        let series = series_from("SPY", &[(100.0, 1000), (100.0, 1100)]);
        assert!(detect(&series).is_empty());
    }

    #[test]
    fn single_bar_yields_nothing() {
        let series = series_from("SPY", &[(100.0, 1000)]);
        assert!(detect(&series).is_empty());
    }

    #[test]
    fn zero_previous_volume_guards_volume_change() {
        let series = series_from("SPY", &[(100.0, 0), (99.0, 500)]);
        let records = detect(&series);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].volume_change, 0.0);
        // With the guard the weighting collapses to the bare percent change.
        assert!((records[0].weighted_change - records[0].percent_change).abs() < 1e-12);
    }

    #[test]
    fn recovery_expires_record() {
        // Distribution day at 95, later close 100 >= 1.05 * 95 = 99.75.
        let series = series_from(
            "SPY",
            &[(100.0, 1000), (95.0, 1200), (97.0, 900), (100.0, 800)],
        );
        let records = detect_with_expiration(
            &series,
            series.last_date(),
            &DistributionConfig::default(),
        );

        assert_eq!(records.len(), 1);
        assert!(records[0].expired);
        assert_eq!(records[0].expiration, ExpirationReason::PriceRecovery);
    }

    #[test]
    fn recovery_just_below_threshold_stays_active() {
        // 99.7 < 99.75, not enough to retire the day.
        let series = series_from("SPY", &[(100.0, 1000), (95.0, 1200), (99.7, 900)]);
        let records = detect_with_expiration(
            &series,
            series.last_date(),
            &DistributionConfig::default(),
        );

        assert_eq!(records.len(), 1);
        assert!(!records[0].expired);
    }

    #[test]
    fn time_expiry_after_window_elapses() {
        // One distribution day, then 25 flat-volume drifting sessions.
        let mut data = vec![(100.0, 1000), (99.0, 1100)];
        for _ in 0..25 {
            data.push((99.0, 1000));
        }
        let series = series_from("SPY", &data);
        let records = detect_with_expiration(
            &series,
            series.last_date(),
            &DistributionConfig::default(),
        );

        assert_eq!(records.len(), 1);
        assert!(records[0].expired);
        assert_eq!(records[0].expiration, ExpirationReason::Time);
    }

    #[test]
    fn within_window_stays_active() {
        let mut data = vec![(100.0, 1000), (99.0, 1100)];
        for _ in 0..24 {
            data.push((99.0, 1000));
        }
        let series = series_from("SPY", &data);
        let records = detect_with_expiration(
            &series,
            series.last_date(),
            &DistributionConfig::default(),
        );

        assert!(!records[0].expired);
    }

    #[test]
    fn recovery_wins_tie_on_same_session() {
        // Recovery lands exactly on the session where the time window closes.
        let mut data = vec![(100.0, 1000), (95.0, 1100)];
        for _ in 0..24 {
            data.push((96.0, 1000));
        }
        data.push((100.0, 1000)); // session 25 after the record, close >= 99.75
        let series = series_from("SPY", &data);
        let records = detect_with_expiration(
            &series,
            series.last_date(),
            &DistributionConfig::default(),
        );

        assert!(records[0].expired);
        assert_eq!(records[0].expiration, ExpirationReason::PriceRecovery);
    }

    #[test]
    fn recovery_after_time_boundary_leaves_time_reason() {
        // The record ages out first; a recovery past the boundary is moot.
        let mut data = vec![(100.0, 1000), (95.0, 1100)];
        for _ in 0..25 {
            data.push((96.0, 1000));
        }
        data.push((110.0, 1000));
        let series = series_from("SPY", &data);
        let records = detect_with_expiration(
            &series,
            series.last_date(),
            &DistributionConfig::default(),
        );

        assert!(records[0].expired);
        assert_eq!(records[0].expiration, ExpirationReason::Time);
    }

    #[test]
    fn twenty_six_session_decline_scenario() {
        // 26 sessions, each close 1% below and volume 10% above the prior:
        // every bar after the first is a distribution day.
        let mut data = Vec::new();
        let mut close = 100.0;
        let mut volume = 1_000_000f64;
        for _ in 0..26 {
            data.push((close, volume as i64));
            close *= 0.99;
            volume *= 1.10;
        }
        let series = series_from("SPY", &data);

        let mut records = detect(&series);
        assert_eq!(records.len(), 25);

        // As-of one session past the last bar: only the earliest record has
        // a full 25-session window behind it.
        let as_of = series.last_date() + Duration::days(1);
        apply_expiration(&mut records, &series, as_of, &DistributionConfig::default());

        let expired: Vec<_> = records.iter().filter(|r| r.expired).collect();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].date, series.bars()[1].date);
        assert_eq!(expired[0].expiration, ExpirationReason::Time);
        assert_eq!(records.iter().filter(|r| r.is_active()).count(), 24);
    }

    #[test]
    fn as_of_before_record_leaves_it_untouched() {
        let series = series_from("SPY", &[(100.0, 1000), (99.0, 1100), (98.0, 1200)]);
        let mut records = detect(&series);
        // As-of at the first bar: both records postdate it.
        apply_expiration(
            &mut records,
            &series,
            series.first_date(),
            &DistributionConfig::default(),
        );

        assert!(records.iter().all(|r| !r.expired));
    }

    #[test]
    fn tighter_recovery_threshold_expires_sooner() {
        let series = series_from("SPY", &[(100.0, 1000), (95.0, 1200), (97.0, 900)]);
        let config = DistributionConfig {
            recovery_threshold: 1.02,
            ..DistributionConfig::default()
        };
        // 97 >= 1.02 * 95 = 96.9
        let records = detect_with_expiration(&series, series.last_date(), &config);

        assert!(records[0].expired);
        assert_eq!(records[0].expiration, ExpirationReason::PriceRecovery);
    }
}
