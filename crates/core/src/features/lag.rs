use crate::domain::features::{DailySentiment, LaggedDailySentiment};
use crate::features::LagMode;
use anyhow::Context;
use chrono::Days;

/// Shifts daily aggregates forward by `lag`.
///
/// [`LagMode::NewsDays`] shifts by position along the news-date axis: the row for the i-th news
/// date carries the aggregate of the (i - lag)-th news date, and the first `lag` rows carry
/// `None`. Gaps between news dates are not filled, so one step may span several calendar days.
///
/// [`LagMode::CalendarDays`] re-keys every aggregate to `calendar_date + lag` days instead.
pub fn lag_daily_sentiment(
    daily: &[DailySentiment],
    lag: usize,
    mode: LagMode,
) -> anyhow::Result<Vec<LaggedDailySentiment>> {
    anyhow::ensure!(lag >= 1, "lag must be >= 1 (got {lag})");
    anyhow::ensure!(
        daily
            .windows(2)
            .all(|w| w[0].calendar_date < w[1].calendar_date),
        "daily sentiment must be strictly ascending by calendar_date"
    );

    match mode {
        LagMode::NewsDays => Ok(daily
            .iter()
            .enumerate()
            .map(|(i, row)| LaggedDailySentiment {
                calendar_date: row.calendar_date,
                lagged: i.checked_sub(lag).map(|src| daily[src].values()),
            })
            .collect()),
        LagMode::CalendarDays => daily
            .iter()
            .map(|row| -> anyhow::Result<LaggedDailySentiment> {
                let calendar_date = row
                    .calendar_date
                    .checked_add_days(Days::new(lag as u64))
                    .with_context(|| format!("{} + {lag} days overflows", row.calendar_date))?;
                Ok(LaggedDailySentiment {
                    calendar_date,
                    lagged: Some(row.values()),
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32, polarity: f64, count: u64) -> DailySentiment {
        DailySentiment {
            calendar_date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            mean_confidence: 0.5 + polarity / 4.0,
            mean_polarity: polarity,
            article_count: count,
        }
    }

    #[test]
    fn rank_shift_leaves_leading_rows_undefined() {
        let daily = vec![day(1, 1.0, 3), day(5, -1.0, 1), day(6, 0.5, 2), day(20, 0.0, 4)];
        for lag in 1..=3 {
            let out = lag_daily_sentiment(&daily, lag, LagMode::NewsDays).unwrap();
            assert_eq!(out.len(), daily.len());
            for (i, row) in out.iter().enumerate() {
                assert_eq!(row.calendar_date, daily[i].calendar_date);
                if i < lag {
                    assert_eq!(row.lagged, None);
                } else {
                    assert_eq!(row.lagged, Some(daily[i - lag].values()));
                }
            }
        }
    }

    #[test]
    fn rank_shift_spans_news_gaps() {
        // Jan 5 sees Jan 1's aggregate even though Jan 2-4 had no news.
        let daily = vec![day(1, 1.0, 3), day(5, -1.0, 1)];
        let out = lag_daily_sentiment(&daily, 1, LagMode::NewsDays).unwrap();
        assert_eq!(out[1].lagged.unwrap().article_count, 3);
    }

    #[test]
    fn lag_at_or_beyond_length_is_all_undefined() {
        let daily = vec![day(1, 1.0, 1), day(2, 0.0, 1)];
        for lag in [2, 3, 100] {
            let out = lag_daily_sentiment(&daily, lag, LagMode::NewsDays).unwrap();
            assert!(out.iter().all(|r| r.lagged.is_none()));
        }
    }

    #[test]
    fn calendar_mode_rekeys_by_days() {
        let daily = vec![day(1, 1.0, 3), day(5, -1.0, 1)];
        let out = lag_daily_sentiment(&daily, 2, LagMode::CalendarDays).unwrap();
        assert_eq!(out[0].calendar_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(out[0].lagged, Some(daily[0].values()));
        assert_eq!(out[1].calendar_date, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }

    #[test]
    fn rejects_zero_lag_and_unsorted_input() {
        let daily = vec![day(2, 1.0, 1), day(1, 0.0, 1)];
        assert!(lag_daily_sentiment(&daily[..1], 0, LagMode::NewsDays).is_err());
        assert!(lag_daily_sentiment(&daily, 1, LagMode::NewsDays).is_err());
    }
}
