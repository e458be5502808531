use crate::domain::news::NewsRecord;
use crate::error::RecordRef;
use crate::ingest::columns::{field, record_ref, HeaderIndex};
use crate::ingest::{accept_row, LoadReport, Loaded, RowPolicy};
use crate::time::parse_news_timestamp;
use anyhow::Context;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

struct NewsColumns {
    date: usize,
    text: usize,
    url: usize,
}

impl NewsColumns {
    fn resolve(index: &HeaderIndex) -> anyhow::Result<Self> {
        Ok(Self {
            date: index.require("Date")?,
            text: index.require("New_text")?,
            url: index.require("Url")?,
        })
    }

    fn parse(&self, row: &StringRecord, record: &RecordRef) -> anyhow::Result<NewsRecord> {
        let publish_timestamp = parse_news_timestamp(field(row, self.date, "Date")?)
            .map_err(|e| e.at_record(record.clone()))?;
        // A missing or empty body is still a valid article.
        let body_text = row.get(self.text).unwrap_or_default().to_string();
        let source_url = field(row, self.url, "Url")?.to_string();
        Ok(NewsRecord {
            publish_timestamp,
            body_text,
            source_url,
        })
    }
}

pub fn load_news_records(path: &Path, policy: RowPolicy) -> anyhow::Result<Loaded<NewsRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open news file {}", path.display()))?;
    read_news_records(file, &path.display().to_string(), policy)
}

/// Reads the news corpus in file order.
pub fn read_news_records<R: Read>(
    reader: R,
    source: &str,
    policy: RowPolicy,
) -> anyhow::Result<Loaded<NewsRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{source}: failed to read CSV header"))?
        .clone();
    let columns = NewsColumns::resolve(&HeaderIndex::new(source, &headers))?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    for row in rdr.records() {
        let row = row.with_context(|| format!("{source}: failed to read CSV row"))?;
        let mut record = record_ref(&row);
        if let Some(url) = row.get(columns.url).map(str::trim).filter(|u| !u.is_empty()) {
            record = record.with_key(url);
        }
        let parsed = columns.parse(&row, &record);
        accept_row(source, policy, record, parsed, &mut records, &mut report)?;
    }

    tracing::info!(
        source,
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        skipped = report.skipped.len(),
        "loaded news corpus"
    );
    Ok(Loaded { records, report })
}
