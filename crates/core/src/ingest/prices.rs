use crate::domain::price::PriceRecord;
use crate::ingest::columns::{field, parse_f64, parse_u64, record_ref, HeaderIndex};
use crate::ingest::{accept_row, LoadReport, Loaded, RowPolicy};
use crate::time::parse_price_date;
use anyhow::Context;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

struct PriceColumns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adjclose: usize,
    volume: usize,
}

impl PriceColumns {
    fn resolve(index: &HeaderIndex) -> anyhow::Result<Self> {
        Ok(Self {
            date: index.require("date")?,
            open: index.require("open")?,
            high: index.require("high")?,
            low: index.require("low")?,
            close: index.require("close")?,
            adjclose: index.require("adjclose")?,
            volume: index.require("volume")?,
        })
    }

    fn parse(&self, row: &StringRecord) -> anyhow::Result<PriceRecord> {
        let trading_date = parse_price_date(field(row, self.date, "date")?)
            .map_err(|e| e.at_record(record_ref(row)))?;
        Ok(PriceRecord {
            trading_date,
            open: parse_f64(row, self.open, "open")?,
            high: parse_f64(row, self.high, "high")?,
            low: parse_f64(row, self.low, "low")?,
            close: parse_f64(row, self.close, "close")?,
            adjusted_close: parse_f64(row, self.adjclose, "adjclose")?,
            volume: parse_u64(row, self.volume, "volume")?,
        })
    }
}

pub fn load_price_records(path: &Path, policy: RowPolicy) -> anyhow::Result<Loaded<PriceRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open price file {}", path.display()))?;
    read_price_records(file, &path.display().to_string(), policy)
}

/// Reads the price series, sorted ascending by trading date.
///
/// Columns are checked before any row is read. Two rows for the same trading date are an error
/// under either policy.
pub fn read_price_records<R: Read>(
    reader: R,
    source: &str,
    policy: RowPolicy,
) -> anyhow::Result<Loaded<PriceRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{source}: failed to read CSV header"))?
        .clone();
    let columns = PriceColumns::resolve(&HeaderIndex::new(source, &headers))?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    for row in rdr.records() {
        let row = row.with_context(|| format!("{source}: failed to read CSV row"))?;
        accept_row(
            source,
            policy,
            record_ref(&row),
            columns.parse(&row),
            &mut records,
            &mut report,
        )?;
    }

    records.sort_by_key(|r| r.trading_date);
    if let Some(w) = records
        .windows(2)
        .find(|w| w[0].trading_date == w[1].trading_date)
    {
        anyhow::bail!("{source}: duplicate trading_date {}", w[0].trading_date);
    }

    tracing::info!(
        source,
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        skipped = report.skipped.len(),
        "loaded price series"
    );
    Ok(Loaded { records, report })
}
