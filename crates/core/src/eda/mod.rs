pub mod bins;
pub mod charts;
pub mod stats;

use crate::features::FeatureTable;
use crate::storage::feature_table::lag_columns;
use crate::storage::write_atomically;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const PRICE_CHART_FILE: &str = "nvidia_price_timeseries.json";
pub const HISTOGRAM_FILE: &str = "sentiment_histogram.json";
pub const SCATTER_FILE: &str = "return_vs_sentiment_scatter.json";
pub const BOXPLOT_FILE: &str = "return_by_sentiment_boxplot.json";
pub const HEATMAP_DATA_FILE: &str = "d3_calendar_heatmap_data.csv";

/// One trading day as the charts see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdaRow {
    pub stock_date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    pub daily_return: f64,
    pub prev_mean_score: f64,
    pub prev_news_count: u64,
    pub prev_mean_polarity: f64,
    pub sentiment_bin: &'static str,
}

pub fn eda_rows(table: &FeatureTable) -> Vec<EdaRow> {
    let close: Vec<f64> = table.rows.iter().map(|r| r.price.close).collect();
    let returns = stats::daily_returns(&close);
    table
        .rows
        .iter()
        .zip(returns)
        .map(|(r, daily_return)| EdaRow {
            stock_date: r.price.trading_date,
            close: r.price.close,
            volume: r.price.volume,
            daily_return,
            prev_mean_score: r.prev_lag_mean_score,
            prev_news_count: r.prev_lag_news_count,
            prev_mean_polarity: r.prev_lag_mean_polarity,
            sentiment_bin: bins::sentiment_bin(r.prev_lag_mean_polarity),
        })
        .collect()
}

pub fn key_correlations(lag: usize, rows: &[EdaRow]) -> stats::CorrelationMatrix {
    let [score, count, numeric] = lag_columns(lag);
    let col = |f: fn(&EdaRow) -> f64| rows.iter().map(f).collect::<Vec<_>>();
    stats::correlation_matrix(&[
        ("close", col(|r| r.close)),
        ("volume", col(|r| r.volume as f64)),
        ("daily_return", col(|r| r.daily_return)),
        (score.as_str(), col(|r| r.prev_mean_score)),
        (count.as_str(), col(|r| r.prev_news_count as f64)),
        (numeric.as_str(), col(|r| r.prev_mean_polarity)),
    ])
}

#[derive(Debug, Clone)]
pub struct EdaOptions {
    pub symbol: String,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct EdaSummary {
    pub written: Vec<PathBuf>,
    pub correlations: stats::CorrelationMatrix,
}

/// Writes every chart spec plus the heat-map data into `opts.out_dir`.
pub fn render_all(table: &FeatureTable, opts: &EdaOptions) -> anyhow::Result<EdaSummary> {
    let rows = eda_rows(table);
    let lag = table.lag;

    let correlations = key_correlations(lag, &rows);
    let [score, count, _] = lag_columns(lag);
    for other in [score.as_str(), count.as_str()] {
        match correlations.get(other, "daily_return") {
            Some(c) => tracing::info!(column = other, correlation = c, "correlation with daily_return"),
            None => tracing::info!(column = other, "correlation with daily_return undefined"),
        }
    }

    let specs = [
        (PRICE_CHART_FILE, charts::price_timeseries(&opts.symbol, &rows)),
        (HISTOGRAM_FILE, charts::sentiment_histogram(lag, &rows)),
        (SCATTER_FILE, charts::return_vs_sentiment(&opts.symbol, lag, &rows)),
        (BOXPLOT_FILE, charts::return_by_sentiment_bin(lag, &rows)),
    ];

    let mut written = Vec::with_capacity(specs.len() + 1);
    for (name, spec) in specs {
        let path = opts.out_dir.join(name);
        write_atomically(&path, |w| {
            serde_json::to_writer_pretty(w, &spec)
                .with_context(|| format!("failed to serialize chart {name}"))
        })?;
        tracing::info!(path = %path.display(), "chart spec written");
        written.push(path);
    }

    let heatmap = opts.out_dir.join(HEATMAP_DATA_FILE);
    write_heatmap_data(&heatmap, lag, &rows)?;
    written.push(heatmap);

    Ok(EdaSummary {
        written,
        correlations,
    })
}

/// Calendar heat-map input: date, return, and the two headline sentiment features.
pub fn write_heatmap_data(path: &Path, lag: usize, rows: &[EdaRow]) -> anyhow::Result<()> {
    let [score, count, _] = lag_columns(lag);
    write_atomically(path, |w| {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(["stock_date", "daily_return", score.as_str(), count.as_str()])?;
        for r in rows {
            wtr.write_record([
                r.stock_date.format("%Y-%m-%d").to_string(),
                r.daily_return.to_string(),
                r.prev_mean_score.to_string(),
                r.prev_news_count.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    })?;
    tracing::info!(path = %path.display(), rows = rows.len(), "heat-map data written");
    Ok(())
}
