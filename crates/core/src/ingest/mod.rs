pub(crate) mod columns;
pub mod news;
pub mod prices;

pub use news::{load_news_records, read_news_records};
pub use prices::{load_price_records, read_price_records};

use crate::error::RecordRef;

/// What to do with a row that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Abort the load at the first bad row.
    #[default]
    Fail,
    /// Log the row, leave it out, keep going.
    Skip,
}

#[derive(Debug, Clone)]
pub struct RowIssue {
    pub record: RecordRef,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_used: usize,
    pub skipped: Vec<RowIssue>,
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub report: LoadReport,
}

/// Applies `policy` to one row's parse result.
fn accept_row<T>(
    source: &str,
    policy: RowPolicy,
    record: RecordRef,
    parsed: anyhow::Result<T>,
    out: &mut Vec<T>,
    report: &mut LoadReport,
) -> anyhow::Result<()> {
    report.rows_read += 1;
    match parsed {
        Ok(value) => {
            out.push(value);
            report.rows_used += 1;
            Ok(())
        }
        Err(err) => match policy {
            RowPolicy::Fail => Err(err.context(format!("{source}: bad row at {record}"))),
            RowPolicy::Skip => {
                tracing::warn!(source, %record, error = %format!("{err:#}"), "skipping malformed row");
                report.skipped.push(RowIssue {
                    record,
                    message: format!("{err:#}"),
                });
                Ok(())
            }
        },
    }
}
