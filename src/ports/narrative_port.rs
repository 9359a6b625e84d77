//! Narrative-analysis port trait.
//!
//! The collaborator behind this port turns an [`AnalysisSummary`] and a
//! rendered chart into free text. The core only promises the summary's
//! shape; it never interprets the narrative or the image bytes.

use crate::domain::error::TrendGuardError;
use crate::domain::summary::AnalysisSummary;

pub trait NarrativePort {
    fn narrate(
        &self,
        summary: &AnalysisSummary,
        chart: &[u8],
    ) -> Result<String, TrendGuardError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{assess, ConditionThresholds};
    use crate::domain::distribution::{detect_with_expiration, DistributionConfig};
    use crate::domain::outlook::{assess_outlook, IndicatorConfig};
    use crate::domain::series::test_support::series_from;
    use crate::domain::summary::build_summary;

    /// Stand-in collaborator: echoes the numbers it was handed.
    struct EchoNarrator;

    impl NarrativePort for EchoNarrator {
        fn narrate(
            &self,
            summary: &AnalysisSummary,
            chart: &[u8],
        ) -> Result<String, TrendGuardError> {
            Ok(format!(
                "{}: {} active distribution days, {} chart bytes",
                summary.symbol, summary.distribution.condition.total_count, chart.len(),
            ))
        }
    }

    #[test]
    fn port_receives_the_flattened_summary() {
        let series = series_from("SPY", &[(100.0, 1000), (99.0, 1100)]);
        let as_of = series.last_date();
        let records = detect_with_expiration(&series, as_of, &DistributionConfig::default());
        let condition = assess(&records, &series, as_of, &ConditionThresholds::default());
        let outlook = assess_outlook(&series, &IndicatorConfig::default());
        let summary = build_summary(&series, &records, condition, outlook, None, as_of);

        let narrative = EchoNarrator.narrate(&summary, &[0u8; 16]).unwrap();
        assert_eq!(narrative, "SPY: 1 active distribution days, 16 chart bytes");
    }
}
