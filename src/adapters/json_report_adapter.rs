//! JSON report adapter.
//!
//! The presentation boundary is plain structured data; this adapter turns
//! any serializable analysis output into pretty-printed JSON, to a string
//! or straight to disk.

use crate::domain::error::TrendGuardError;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String, TrendGuardError> {
        serde_json::to_string_pretty(value).map_err(|e| TrendGuardError::Report {
            reason: format!("JSON serialization failed: {}", e),
        })
    }

    pub fn write<T: Serialize>(&self, value: &T, path: &Path) -> Result<(), TrendGuardError> {
        let mut json = self.render(value)?;
        json.push('\n');
        fs::write(path, json).map_err(|e| TrendGuardError::Report {
            reason: format!("failed to write {}: {}", path.display(), e),
        })
    }
}
