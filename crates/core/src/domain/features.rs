use crate::domain::price::PriceRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-day sentiment aggregate. Only days with at least one article exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub calendar_date: NaiveDate,
    pub mean_confidence: f64,
    pub mean_polarity: f64,
    pub article_count: u64,
}

impl DailySentiment {
    pub fn values(&self) -> SentimentValues {
        SentimentValues {
            mean_confidence: self.mean_confidence,
            mean_polarity: self.mean_polarity,
            article_count: self.article_count,
        }
    }
}

/// The numeric part of a [`DailySentiment`], as carried forward by the lag stage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentValues {
    pub mean_confidence: f64,
    pub mean_polarity: f64,
    pub article_count: u64,
}

/// `lagged` is `None` when the date has no predecessor `lag` positions back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaggedDailySentiment {
    pub calendar_date: NaiveDate,
    pub lagged: Option<SentimentValues>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub price: PriceRecord,
    pub prev_lag_mean_score: f64,
    pub prev_lag_news_count: u64,
    pub prev_lag_mean_polarity: f64,
}

impl FeatureRow {
    pub fn trading_date(&self) -> NaiveDate {
        self.price.trading_date
    }
}
