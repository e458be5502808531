use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub publish_timestamp: DateTime<Utc>,
    pub body_text: String,
    pub source_url: String,
}

/// Categorical classifier output. Labels outside the known three are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Other(String),
}

impl SentimentLabel {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Self::Positive,
            "neutral" => Self::Neutral,
            "negative" => Self::Negative,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// Fixed mapping positive→+1, neutral→0, negative→−1; anything else is 0.
    pub fn polarity(&self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Neutral => 0,
            Self::Negative => -1,
            Self::Other(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for SentimentLabel {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A news article after scoring. `news_date` is the UTC calendar date of publication.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNewsRecord {
    pub news_date: NaiveDate,
    pub body_text: String,
    pub source_url: String,
    pub sentiment_label: SentimentLabel,
    pub sentiment_confidence: f64,
    pub sentiment_polarity: i8,
}
