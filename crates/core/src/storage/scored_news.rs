use crate::domain::news::{ScoredNewsRecord, SentimentLabel};
use crate::error::{PipelineError, RecordRef};
use crate::storage::write_atomically;
use crate::time::{news_date, parse_news_timestamp};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const COLUMNS: [&str; 6] = [
    "news_date",
    "New_text",
    "Url",
    "sentiment_label",
    "sentiment_score",
    "sentiment_numeric",
];

#[derive(Debug, Serialize)]
struct ScoredNewsRowOut<'a> {
    news_date: NaiveDate,
    #[serde(rename = "New_text")]
    text: &'a str,
    #[serde(rename = "Url")]
    url: &'a str,
    sentiment_label: &'a str,
    sentiment_score: f64,
    sentiment_numeric: i8,
}

#[derive(Debug, Deserialize)]
struct ScoredNewsRowIn {
    news_date: String,
    #[serde(rename = "New_text", default)]
    text: String,
    #[serde(rename = "Url")]
    url: String,
    sentiment_label: String,
    sentiment_score: f64,
    sentiment_numeric: f64,
}

/// Writes the scored-news table. Floats are written in shortest round-trip form.
pub fn write_scored_news(path: &Path, rows: &[ScoredNewsRecord]) -> anyhow::Result<()> {
    write_atomically(path, |w| {
        let mut wtr = csv::Writer::from_writer(w);
        for r in rows {
            wtr.serialize(ScoredNewsRowOut {
                news_date: r.news_date,
                text: &r.body_text,
                url: &r.source_url,
                sentiment_label: r.sentiment_label.as_str(),
                sentiment_score: r.sentiment_confidence,
                sentiment_numeric: r.sentiment_polarity,
            })
            .context("failed to serialize scored news row")?;
        }
        if rows.is_empty() {
            wtr.write_record(COLUMNS)?;
        }
        wtr.flush()?;
        Ok(())
    })?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote scored news table");
    Ok(())
}

pub fn read_scored_news(path: &Path) -> anyhow::Result<Vec<ScoredNewsRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open scored news table {}", path.display()))?;
    read_scored_news_from(file, &path.display().to_string())
}

pub fn read_scored_news_from<R: Read>(
    reader: R,
    source: &str,
) -> anyhow::Result<Vec<ScoredNewsRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{source}: failed to read CSV header"))?
        .clone();
    for column in COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(PipelineError::MissingRequiredColumn {
                file: source.to_string(),
                column,
            }
            .into());
        }
    }

    let mut out = Vec::new();
    for row in rdr.deserialize::<ScoredNewsRowIn>() {
        let row = row.with_context(|| format!("{source}: failed to decode scored news row"))?;
        let record = RecordRef::default().with_key(row.url.clone());
        out.push(
            row.into_record()
                .with_context(|| format!("{source}: invalid row {record}"))?,
        );
    }
    Ok(out)
}

impl ScoredNewsRowIn {
    fn into_record(self) -> anyhow::Result<ScoredNewsRecord> {
        let news_date = parse_table_date(&self.news_date)?;
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.sentiment_score),
            "sentiment_score out of [0, 1]: {}",
            self.sentiment_score
        );
        let sentiment_polarity = match self.sentiment_numeric {
            v if v == 1.0 => 1,
            v if v == 0.0 => 0,
            v if v == -1.0 => -1,
            v => anyhow::bail!("sentiment_numeric must be -1, 0 or 1 (got {v})"),
        };
        Ok(ScoredNewsRecord {
            news_date,
            body_text: self.text,
            source_url: self.url,
            sentiment_label: SentimentLabel::parse(&self.sentiment_label),
            sentiment_confidence: self.sentiment_score,
            sentiment_polarity,
        })
    }
}

/// `YYYY-MM-DD`, or a full timestamp whose UTC date is taken.
fn parse_table_date(s: &str) -> Result<NaiveDate, PipelineError> {
    if let Ok(d) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        return Ok(d);
    }
    parse_news_timestamp(s).map(news_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, label: SentimentLabel, confidence: f64, text: &str) -> ScoredNewsRecord {
        let sentiment_polarity = label.polarity();
        ScoredNewsRecord {
            news_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            body_text: text.to_string(),
            source_url: format!("https://news.example/{day}/{confidence}"),
            sentiment_label: label,
            sentiment_confidence: confidence,
            sentiment_polarity,
        }
    }

    #[test]
    fn write_then_read_preserves_scores_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news_data_with_sentiment.csv");
        let rows = vec![
            row(2, SentimentLabel::Positive, 0.912_345_678_901_234_5, "Beat, \"raised\" guidance\nagain"),
            row(2, SentimentLabel::Negative, 1.0 / 3.0, ""),
            row(4, SentimentLabel::Other("LABEL_7".to_string()), 0.000_012_5, "odd"),
        ];

        write_scored_news(&path, &rows).unwrap();
        let back = read_scored_news(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn empty_table_still_has_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scored.csv");
        write_scored_news(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("news_date,New_text,Url,"));
        assert!(read_scored_news(&path).unwrap().is_empty());
    }

    #[test]
    fn accepts_timestamp_dates_and_float_numeric() {
        let csv = "news_date,New_text,Url,sentiment_label,sentiment_score,sentiment_numeric\n\
                   2024-01-02 00:00:00,hi,https://n/1,negative,0.75,-1.0\n";
        let rows = read_scored_news_from(csv.as_bytes(), "scored.csv").unwrap();
        assert_eq!(rows[0].news_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(rows[0].sentiment_polarity, -1);
    }

    #[test]
    fn rejects_missing_columns_and_bad_values() {
        let csv = "news_date,New_text,Url,sentiment_label,sentiment_score\n";
        let err = read_scored_news_from(csv.as_bytes(), "scored.csv").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingRequiredColumn { column: "sentiment_numeric", .. })
        ));

        let csv = "news_date,New_text,Url,sentiment_label,sentiment_score,sentiment_numeric\n\
                   2024-01-02,hi,https://n/1,positive,0.75,2\n";
        let err = read_scored_news_from(csv.as_bytes(), "scored.csv").unwrap_err();
        assert!(format!("{err:#}").contains("https://n/1"));
    }
}
