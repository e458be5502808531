use crate::domain::features::DailySentiment;
use crate::domain::news::ScoredNewsRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy)]
struct Acc {
    confidence_sum: f64,
    polarity_sum: i64,
    count: u64,
}

/// One row per distinct news date, ascending. Days without news are absent, not zero.
pub fn aggregate_daily(scored: &[ScoredNewsRecord]) -> Vec<DailySentiment> {
    let mut by_date: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for rec in scored {
        let acc = by_date.entry(rec.news_date).or_default();
        acc.confidence_sum += rec.sentiment_confidence;
        acc.polarity_sum += i64::from(rec.sentiment_polarity);
        acc.count += 1;
    }

    by_date
        .into_iter()
        .map(|(calendar_date, acc)| {
            let n = acc.count as f64;
            DailySentiment {
                calendar_date,
                mean_confidence: acc.confidence_sum / n,
                mean_polarity: acc.polarity_sum as f64 / n,
                article_count: acc.count,
            }
        })
        .collect()
}
