//! CSV market-data adapter.
//!
//! Reads one `<SYMBOL>.csv` file per symbol (`date,close,volume` with a
//! header row) from a base directory. Rows are sorted by date before the
//! series contract is enforced, so unsorted files load fine but duplicate
//! dates still fail.

use crate::domain::error::TrendGuardError;
use crate::domain::series::{PriceBar, PriceSeries};
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    close: f64,
    volume: i64,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_daily(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TrendGuardError> {
        let path = self.csv_path(symbol);
        let file = File::open(&path).map_err(|e| TrendGuardError::Data {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut reader = csv::Reader::from_reader(file);
        let mut bars = Vec::new();

        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| TrendGuardError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                TrendGuardError::Data {
                    reason: format!("invalid date {:?} in {}: {}", row.date, path.display(), e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(PriceBar {
                date,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrendGuardError> {
        let entries = std::fs::read_dir(&self.base_path).map_err(|e| TrendGuardError::Data {
            reason: format!("failed to read {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TrendGuardError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(symbol) = name.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
