use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of the price series. `trading_date` is unique across a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub trading_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: u64,
}
