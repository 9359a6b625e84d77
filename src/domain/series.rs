//! Daily price/volume series representation.

use crate::domain::error::TrendGuardError;
use chrono::NaiveDate;
use serde::Serialize;

/// One trading session: close price and traded volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
}

/// Validated daily series for one symbol.
///
/// Construction enforces the input contract: at least one bar, strictly
/// increasing dates, no negative close or volume. Analytical components
/// borrow the series and never mutate it.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, TrendGuardError> {
        let symbol = symbol.into();

        if bars.is_empty() {
            return Err(TrendGuardError::NoData { symbol });
        }

        for (i, bar) in bars.iter().enumerate() {
            if bar.close < 0.0 {
                return Err(TrendGuardError::MalformedSeries {
                    symbol,
                    reason: format!("negative close {} at index {}", bar.close, i),
                });
            }
            if bar.volume < 0 {
                return Err(TrendGuardError::MalformedSeries {
                    symbol,
                    reason: format!("negative volume {} at index {}", bar.volume, i),
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(TrendGuardError::MalformedSeries {
                    symbol,
                    reason: format!("dates not strictly increasing at index {}", i),
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    /// Index of the last bar with date <= `as_of`, or None if the series
    /// starts after `as_of`.
    pub fn last_index_at(&self, as_of: NaiveDate) -> Option<usize> {
        self.bars
            .iter()
            .rposition(|b| b.date <= as_of)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: f64, volume: i64) -> PriceBar {
        PriceBar {
            date,
            close,
            volume,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn valid_series() {
        let series = PriceSeries::new(
            "SPY",
            vec![
                bar(d(2024, 1, 2), 470.0, 80_000_000),
                bar(d(2024, 1, 3), 468.5, 85_000_000),
            ],
        )
        .unwrap();

        assert_eq!(series.symbol(), "SPY");
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), d(2024, 1, 2));
        assert_eq!(series.last_date(), d(2024, 1, 3));
    }

    #[test]
    fn empty_series_is_no_data() {
        let err = PriceSeries::new("SPY", vec![]).unwrap_err();
        assert!(matches!(err, TrendGuardError::NoData { symbol } if symbol == "SPY"));
    }

    #[test]
    fn duplicate_date_rejected() {
        let err = PriceSeries::new(
            "SPY",
            vec![
                bar(d(2024, 1, 2), 470.0, 1000),
                bar(d(2024, 1, 2), 471.0, 1000),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, TrendGuardError::MalformedSeries { .. }));
    }

    #[test]
    fn out_of_order_dates_rejected() {
        let err = PriceSeries::new(
            "SPY",
            vec![
                bar(d(2024, 1, 3), 470.0, 1000),
                bar(d(2024, 1, 2), 471.0, 1000),
            ],
        )
        .unwrap_err();
        assert!(
            matches!(err, TrendGuardError::MalformedSeries { reason, .. }
                if reason.contains("index 1"))
        );
    }

    #[test]
    fn negative_close_rejected() {
        let err = PriceSeries::new("SPY", vec![bar(d(2024, 1, 2), -1.0, 1000)]).unwrap_err();
        assert!(matches!(err, TrendGuardError::MalformedSeries { .. }));
    }

    #[test]
    fn negative_volume_rejected() {
        let err = PriceSeries::new("SPY", vec![bar(d(2024, 1, 2), 470.0, -5)]).unwrap_err();
        assert!(matches!(err, TrendGuardError::MalformedSeries { .. }));
    }

    #[test]
    fn last_index_at_exact_and_between() {
        let series = PriceSeries::new(
            "SPY",
            vec![
                bar(d(2024, 1, 2), 470.0, 1000),
                bar(d(2024, 1, 3), 471.0, 1000),
                bar(d(2024, 1, 5), 472.0, 1000),
            ],
        )
        .unwrap();

        assert_eq!(series.last_index_at(d(2024, 1, 3)), Some(1));
        assert_eq!(series.last_index_at(d(2024, 1, 4)), Some(1));
        assert_eq!(series.last_index_at(d(2024, 1, 10)), Some(2));
        assert_eq!(series.last_index_at(d(2024, 1, 1)), None);
    }
}
