//! CSV summary output
//!
//! Sprint 3: results.csv for spreadsheet analysis and run aggregation
//!
//! The run's seven-field summary record persists as a single-row delimited
//! file under the run's output directory, one header row and one data row.

use crate::stats::SummaryRecord;

/// Fixed column order of the results file
const HEADER: &str = "fuzzer,total_tries,total_time,failures,success,regressions,first_regression_time";

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the summary record as header plus one data row
pub fn to_csv(record: &SummaryRecord) -> String {
    let fields = [
        escape_field(&record.fuzzer),
        record.total_tries.to_string(),
        format!("{:.2}", record.total_time),
        record.failures.to_string(),
        record.success.to_string(),
        record.regressions.to_string(),
        format!("{:.2}", record.first_regression_time),
    ];
    format!("{}\n{}\n", HEADER, fields.join(","))
}
