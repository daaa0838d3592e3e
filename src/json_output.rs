//! JSON summary output
//!
//! Sprint 3: results.json for machine parsing

use anyhow::Result;

use crate::stats::SummaryRecord;

/// Render the summary record as pretty-printed JSON, trailing newline
/// included
pub fn to_json(record: &SummaryRecord) -> Result<String> {
    let mut json = serde_json::to_string_pretty(record)?;
    json.push('\n');
    Ok(json)
}
