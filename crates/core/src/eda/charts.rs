use crate::eda::bins::BIN_LABELS;
use crate::eda::EdaRow;
use serde_json::{json, Value};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

fn base(title: String, rows: &[EdaRow]) -> Value {
    json!({
        "$schema": SCHEMA,
        "title": title,
        "width": "container",
        "data": { "values": rows },
    })
}

fn merge(mut spec: Value, extra: Value) -> Value {
    if let (Some(dst), Value::Object(src)) = (spec.as_object_mut(), extra) {
        dst.extend(src);
    }
    spec
}

/// Closing price over time, with an x-interval selection for linked views.
pub fn price_timeseries(symbol: &str, rows: &[EdaRow]) -> Value {
    merge(
        base(format!("{symbol} Stock Price Over Time"), rows),
        json!({
            "mark": "line",
            "params": [{ "name": "interval", "select": { "type": "interval", "encodings": ["x"] } }],
            "encoding": {
                "x": { "field": "stock_date", "type": "temporal", "title": "Date" },
                "y": { "field": "close", "type": "quantitative", "title": "Closing Price (USD)" },
                "tooltip": [
                    { "field": "stock_date", "type": "temporal" },
                    { "field": "close", "type": "quantitative", "format": "$.2f" }
                ]
            }
        }),
    )
}

pub fn sentiment_histogram(lag: usize, rows: &[EdaRow]) -> Value {
    let title = format!("Previous {lag}-Day Avg. Sentiment Score");
    merge(
        base("Distribution of Daily Sentiment Scores".to_string(), rows),
        json!({
            "mark": "bar",
            "params": [{ "name": "hist_interval", "select": { "type": "interval", "encodings": ["x"] } }],
            "encoding": {
                "x": { "field": "prev_mean_score", "type": "quantitative", "bin": { "maxbins": 30 }, "title": title },
                "y": { "aggregate": "count", "type": "quantitative", "title": "Number of Days" },
                "tooltip": [
                    { "field": "prev_mean_score", "type": "quantitative", "bin": { "maxbins": 30 } },
                    { "aggregate": "count", "type": "quantitative" }
                ]
            }
        }),
    )
}

pub fn return_vs_sentiment(symbol: &str, lag: usize, rows: &[EdaRow]) -> Value {
    merge(
        base(format!("{symbol} Daily Return vs. Previous {lag}-Day Sentiment Score"), rows),
        json!({
            "mark": { "type": "point", "opacity": 0.4, "size": 10 },
            "params": [{ "name": "grid", "select": "interval", "bind": "scales" }],
            "encoding": {
                "x": { "field": "prev_mean_score", "type": "quantitative", "title": format!("Previous {lag}-Day Avg. Sentiment Score") },
                "y": { "field": "daily_return", "type": "quantitative", "title": "Daily Return (%)" },
                "tooltip": [
                    { "field": "stock_date", "type": "temporal" },
                    { "field": "prev_mean_score", "type": "quantitative", "format": ".3f" },
                    { "field": "daily_return", "type": "quantitative", "format": ".2f" }
                ]
            }
        }),
    )
}

/// Box plot of daily return per mean-polarity bucket.
pub fn return_by_sentiment_bin(lag: usize, rows: &[EdaRow]) -> Value {
    merge(
        base(
            format!("Distribution of Daily Returns by Previous {lag}-Day Sentiment Category"),
            rows,
        ),
        json!({
            "mark": { "type": "boxplot", "extent": "min-max" },
            "encoding": {
                "x": {
                    "field": "sentiment_bin",
                    "type": "ordinal",
                    "title": format!("Previous {lag}-Day Sentiment Category"),
                    "sort": BIN_LABELS
                },
                "y": { "field": "daily_return", "type": "quantitative", "title": "Daily Return (%)" }
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rows() -> Vec<EdaRow> {
        vec![EdaRow {
            stock_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            close: 48.2,
            volume: 100,
            daily_return: 0.0,
            prev_mean_score: 0.85,
            prev_news_count: 2,
            prev_mean_polarity: 0.0,
            sentiment_bin: "Neu (-0.1 to 0.1)",
        }]
    }

    #[test]
    fn specs_embed_data_inline() {
        let spec = price_timeseries("NVDA", &rows());
        assert_eq!(spec["$schema"], SCHEMA);
        assert_eq!(spec["mark"], "line");
        assert_eq!(spec["data"]["values"][0]["stock_date"], "2024-01-02");
        assert_eq!(spec["data"]["values"][0]["close"], 48.2);
    }

    #[test]
    fn boxplot_orders_bins() {
        let spec = return_by_sentiment_bin(1, &rows());
        assert_eq!(spec["encoding"]["x"]["sort"][0], "Very Neg (< -0.5)");
        assert_eq!(spec["mark"]["extent"], "min-max");
    }

    #[test]
    fn histogram_uses_thirty_bins() {
        let spec = sentiment_histogram(1, &rows());
        assert_eq!(spec["encoding"]["x"]["bin"]["maxbins"], 30);
        assert_eq!(spec["encoding"]["x"]["title"], "Previous 1-Day Avg. Sentiment Score");
    }

    #[test]
    fn scatter_axis_follows_the_lag() {
        let spec = return_vs_sentiment("NVDA", 3, &rows());
        assert_eq!(spec["encoding"]["x"]["title"], "Previous 3-Day Avg. Sentiment Score");
        assert_eq!(
            spec["title"],
            "NVDA Daily Return vs. Previous 3-Day Sentiment Score"
        );
    }
}
