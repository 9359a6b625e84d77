//! Market-data port trait.
//!
//! The data-fetch collaborator owns retries, timeouts, and provider
//! details; the core sees one synchronous call that either yields a
//! complete validated series or an error.

use crate::domain::error::TrendGuardError;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;

pub trait MarketDataPort {
    fn fetch_daily(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendGuardError>;

    fn list_symbols(&self) -> Result<Vec<String>, TrendGuardError>;
}
