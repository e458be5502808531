use crate::domain::features::FeatureRow;
use crate::domain::price::PriceRecord;
use crate::error::PipelineError;
use crate::features::FeatureTable;
use crate::ingest::columns::{field, parse_f64, parse_u64, record_ref, HeaderIndex};
use crate::storage::write_atomically;
use anyhow::Context;
use chrono::NaiveDate;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";
const PRICE_COLUMNS: [&str; 7] = ["stock_date", "open", "high", "low", "close", "adjclose", "volume"];
const SCORE_SUFFIX: &str = "day_mean_score";
const LAG_COLUMN_PATTERNS: [&str; 3] = [
    "prev_{lag}day_mean_score",
    "prev_{lag}day_news_count",
    "prev_{lag}day_mean_numeric",
];

pub fn lag_columns(lag: usize) -> [String; 3] {
    [
        format!("prev_{lag}day_mean_score"),
        format!("prev_{lag}day_news_count"),
        format!("prev_{lag}day_mean_numeric"),
    ]
}

fn header(lag: usize) -> Vec<String> {
    PRICE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(lag_columns(lag))
        .collect()
}

fn encode(row: &FeatureRow) -> [String; 10] {
    let p = &row.price;
    [
        p.trading_date.format(DATE_FORMAT).to_string(),
        p.open.to_string(),
        p.high.to_string(),
        p.low.to_string(),
        p.close.to_string(),
        p.adjusted_close.to_string(),
        p.volume.to_string(),
        row.prev_lag_mean_score.to_string(),
        row.prev_lag_news_count.to_string(),
        row.prev_lag_mean_polarity.to_string(),
    ]
}

/// Writes the final feature table, one row per trading day in table order.
///
/// The whole table is already in memory; the file is replaced only once it is fully written.
pub fn write_feature_table(path: &Path, table: &FeatureTable) -> anyhow::Result<()> {
    write_atomically(path, |w| {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(header(table.lag))?;
        for row in &table.rows {
            wtr.write_record(encode(row))?;
        }
        wtr.flush()?;
        Ok(())
    })?;
    tracing::info!(
        path = %path.display(),
        rows = table.rows.len(),
        lag = table.lag,
        "wrote feature table"
    );
    Ok(())
}

pub fn read_feature_table(path: &Path) -> anyhow::Result<FeatureTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open feature table {}", path.display()))?;
    read_feature_table_from(file, &path.display().to_string())
}

/// Reads a feature table back. The lag is recovered from the `prev_{lag}day_*` column names.
pub fn read_feature_table_from<R: Read>(reader: R, source: &str) -> anyhow::Result<FeatureTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{source}: failed to read CSV header"))?
        .clone();
    let index = HeaderIndex::new(source, &headers);

    let mut price_idx = [0usize; 7];
    for (slot, column) in price_idx.iter_mut().zip(PRICE_COLUMNS) {
        *slot = index.require(column)?;
    }

    let lag = headers
        .iter()
        .find_map(|h| {
            h.trim()
                .strip_prefix("prev_")?
                .strip_suffix(SCORE_SUFFIX)?
                .parse::<usize>()
                .ok()
        })
        .ok_or(PipelineError::MissingRequiredColumn {
            file: source.to_string(),
            column: LAG_COLUMN_PATTERNS[0],
        })?;
    let names = lag_columns(lag);
    let mut lag_idx = [0usize; 3];
    for ((slot, name), reported) in lag_idx.iter_mut().zip(&names).zip(LAG_COLUMN_PATTERNS) {
        *slot = index.require_as(name, reported)?;
    }

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.with_context(|| format!("{source}: failed to read CSV row"))?;
        let row = decode(&rec, &price_idx, &lag_idx, &names)
            .with_context(|| format!("{source}: invalid feature row at {}", record_ref(&rec)))?;
        rows.push(row);
    }

    Ok(FeatureTable { lag, rows })
}

fn decode(
    rec: &StringRecord,
    price_idx: &[usize; 7],
    lag_idx: &[usize; 3],
    lag_names: &[String; 3],
) -> anyhow::Result<FeatureRow> {
    let raw_date = field(rec, price_idx[0], PRICE_COLUMNS[0])?;
    let trading_date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
        .map_err(|_| PipelineError::malformed_date(raw_date, DATE_FORMAT).at_record(record_ref(rec)))?;

    Ok(FeatureRow {
        price: PriceRecord {
            trading_date,
            open: parse_f64(rec, price_idx[1], PRICE_COLUMNS[1])?,
            high: parse_f64(rec, price_idx[2], PRICE_COLUMNS[2])?,
            low: parse_f64(rec, price_idx[3], PRICE_COLUMNS[3])?,
            close: parse_f64(rec, price_idx[4], PRICE_COLUMNS[4])?,
            adjusted_close: parse_f64(rec, price_idx[5], PRICE_COLUMNS[5])?,
            volume: parse_u64(rec, price_idx[6], PRICE_COLUMNS[6])?,
        },
        prev_lag_mean_score: parse_f64(rec, lag_idx[0], &lag_names[0])?,
        prev_lag_news_count: parse_u64(rec, lag_idx[1], &lag_names[1])?,
        prev_lag_mean_polarity: parse_f64(rec, lag_idx[2], &lag_names[2])?,
    })
}
