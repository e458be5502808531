pub mod aggregate;
pub mod join;
pub mod lag;

pub use aggregate::aggregate_daily;
pub use join::join_features;
pub use lag::lag_daily_sentiment;

use crate::domain::features::FeatureRow;
use crate::domain::news::ScoredNewsRecord;
use crate::domain::price::PriceRecord;

/// How the lag stage steps back from a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LagMode {
    /// Step back `lag` news-bearing days.
    #[default]
    NewsDays,
    /// Step back `lag` calendar days.
    CalendarDays,
}

impl std::str::FromStr for LagMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news-days" | "news_days" => Ok(Self::NewsDays),
            "calendar-days" | "calendar_days" => Ok(Self::CalendarDays),
            other => anyhow::bail!("unknown lag mode: {other} (expected news-days|calendar-days)"),
        }
    }
}

/// The joined output. `lag` names the `prev_{lag}day_*` columns on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub lag: usize,
    pub rows: Vec<FeatureRow>,
}

/// Aggregate, lag and join in one pass. Each stage reads the previous stage's output only.
pub fn build_feature_table(
    prices: &[PriceRecord],
    scored: &[ScoredNewsRecord],
    lag: usize,
    mode: LagMode,
) -> anyhow::Result<FeatureTable> {
    let daily = aggregate_daily(scored);
    tracing::info!(articles = scored.len(), days = daily.len(), "aggregated daily sentiment");

    let lagged = lag_daily_sentiment(&daily, lag, mode)?;
    let defined = lagged.iter().filter(|r| r.lagged.is_some()).count();
    tracing::info!(lag, ?mode, defined, undefined = lagged.len() - defined, "lagged daily sentiment");

    let rows = join_features(prices, &lagged);
    let matched = rows.iter().filter(|r| r.prev_lag_news_count > 0).count();
    tracing::info!(trading_days = rows.len(), matched, "joined sentiment onto price series");

    Ok(FeatureTable { lag, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lag_modes() {
        assert_eq!("news-days".parse::<LagMode>().unwrap(), LagMode::NewsDays);
        assert_eq!("Calendar_Days".parse::<LagMode>().unwrap(), LagMode::CalendarDays);
        assert!("weekly".parse::<LagMode>().is_err());
    }
}
