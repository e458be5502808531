use crate::domain::features::{FeatureRow, LaggedDailySentiment, SentimentValues};
use crate::domain::price::PriceRecord;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Left join on `trading_date == calendar_date`.
///
/// Every price row appears exactly once, in input order. Trading days with no lagged row, or
/// whose lagged row is undefined, get all-zero sentiment features.
pub fn join_features(prices: &[PriceRecord], lagged: &[LaggedDailySentiment]) -> Vec<FeatureRow> {
    let by_date: HashMap<NaiveDate, Option<SentimentValues>> = lagged
        .iter()
        .map(|row| (row.calendar_date, row.lagged))
        .collect();

    prices
        .iter()
        .map(|price| {
            let values = by_date
                .get(&price.trading_date)
                .copied()
                .flatten()
                .unwrap_or_default();
            FeatureRow {
                price: price.clone(),
                prev_lag_mean_score: values.mean_confidence,
                prev_lag_news_count: values.article_count,
                prev_lag_mean_polarity: values.mean_polarity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn price(d: u32) -> PriceRecord {
        PriceRecord {
            trading_date: date(d),
            open: 10.0 + d as f64,
            high: 11.0 + d as f64,
            low: 9.0 + d as f64,
            close: 10.5 + d as f64,
            adjusted_close: 10.4 + d as f64,
            volume: 1_000 * d as u64,
        }
    }

    #[test]
    fn preserves_cardinality_and_order() {
        let prices: Vec<_> = [4, 5, 6, 7, 8, 11].into_iter().map(price).collect();
        let lagged = vec![
            LaggedDailySentiment {
                calendar_date: date(5),
                lagged: None,
            },
            LaggedDailySentiment {
                calendar_date: date(9),
                lagged: Some(SentimentValues {
                    mean_confidence: 0.7,
                    mean_polarity: 1.0,
                    article_count: 2,
                }),
            },
        ];

        let rows = join_features(&prices, &lagged);
        assert_eq!(rows.len(), prices.len());
        for (row, p) in rows.iter().zip(&prices) {
            assert_eq!(row.trading_date(), p.trading_date);
            assert_eq!(&row.price, p);
        }
        // The 9th is not a trading day, so its sentiment is dropped.
        assert!(rows.iter().all(|r| r.prev_lag_news_count == 0));
    }

    #[test]
    fn matched_rows_carry_lagged_values() {
        let prices = vec![price(1), price(2)];
        let lagged = vec![LaggedDailySentiment {
            calendar_date: date(2),
            lagged: Some(SentimentValues {
                mean_confidence: 0.85,
                mean_polarity: -0.5,
                article_count: 4,
            }),
        }];

        let rows = join_features(&prices, &lagged);
        assert_eq!(rows[0].prev_lag_news_count, 0);
        assert_eq!(rows[0].prev_lag_mean_score, 0.0);
        assert_eq!(rows[1].prev_lag_mean_score, 0.85);
        assert_eq!(rows[1].prev_lag_mean_polarity, -0.5);
        assert_eq!(rows[1].prev_lag_news_count, 4);
    }

    #[test]
    fn empty_sentiment_gives_all_zero_features() {
        let prices = vec![price(1), price(2), price(3)];
        let rows = join_features(&prices, &[]);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.prev_lag_mean_score == 0.0
            && r.prev_lag_mean_polarity == 0.0
            && r.prev_lag_news_count == 0));
    }
}
