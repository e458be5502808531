pub mod http;
pub mod lexicon;

use crate::config::{ClassifierBackend, Settings};
use crate::domain::news::{NewsRecord, ScoredNewsRecord, SentimentLabel};
use crate::error::PipelineError;
use crate::time::news_date;

/// One classifier verdict for one input text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl Classification {
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

/// Text → (label, confidence) capability. Called once per run with the whole corpus.
///
/// Implementations must return exactly one classification per input, in input order, and must
/// accept empty strings. Any failure to load or invoke the backend is reported for the whole
/// batch; there is no partial success.
#[async_trait::async_trait]
pub trait TextClassifier: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn classify_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Classification>>;
}

pub fn classifier_from_settings(settings: &Settings) -> anyhow::Result<Box<dyn TextClassifier>> {
    match settings.classifier_backend {
        ClassifierBackend::Http => {
            let client = http::HttpClassifier::from_settings(settings)?;
            Ok(Box::new(client))
        }
        ClassifierBackend::Lexicon => Ok(Box::new(lexicon::LexiconClassifier::default())),
    }
}

/// Scores every article with a single classifier call.
///
/// An empty corpus yields an empty result without invoking the classifier.
pub async fn score_news(
    classifier: &dyn TextClassifier,
    news: &[NewsRecord],
) -> anyhow::Result<Vec<ScoredNewsRecord>> {
    if news.is_empty() {
        tracing::info!("no news to score; skipping classifier call");
        return Ok(Vec::new());
    }

    let texts: Vec<String> = news.iter().map(|n| n.body_text.clone()).collect();
    let backend = classifier.backend_name();

    let t0 = std::time::Instant::now();
    let classifications = classifier.classify_batch(&texts).await?;
    tracing::info!(
        backend,
        articles = texts.len(),
        elapsed_ms = t0.elapsed().as_millis(),
        "sentiment batch classified"
    );

    if classifications.len() != news.len() {
        return Err(PipelineError::unavailable(
            backend,
            "validate",
            format!(
                "classifier returned {} results for {} inputs",
                classifications.len(),
                news.len()
            ),
        )
        .into());
    }

    let mut out = Vec::with_capacity(news.len());
    for (record, c) in news.iter().zip(classifications) {
        if !(0.0..=1.0).contains(&c.confidence) {
            return Err(PipelineError::unavailable(
                backend,
                "validate",
                format!("confidence out of [0, 1]: {} for {}", c.confidence, record.source_url),
            )
            .into());
        }
        let sentiment_polarity = c.label.polarity();
        out.push(ScoredNewsRecord {
            news_date: news_date(record.publish_timestamp),
            body_text: record.body_text.clone(),
            source_url: record.source_url.clone(),
            sentiment_label: c.label,
            sentiment_confidence: c.confidence,
            sentiment_polarity,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Labels by keyword; counts how many times it was invoked.
    #[derive(Default)]
    struct KeywordStub {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TextClassifier for KeywordStub {
        fn backend_name(&self) -> &'static str {
            "stub"
        }

        async fn classify_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Classification>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("up") {
                        Classification::new(SentimentLabel::Positive, 0.9)
                    } else if t.contains("down") {
                        Classification::new(SentimentLabel::Negative, 0.8)
                    } else if t.is_empty() {
                        Classification::new(SentimentLabel::Other("LABEL_X".to_string()), 0.4)
                    } else {
                        Classification::new(SentimentLabel::Neutral, 0.7)
                    }
                })
                .collect())
        }
    }

    struct Broken;

    #[async_trait::async_trait]
    impl TextClassifier for Broken {
        fn backend_name(&self) -> &'static str {
            "broken"
        }

        async fn classify_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Classification>> {
            Err(PipelineError::unavailable("broken", "load", "model weights missing").into())
        }
    }

    struct Short;

    #[async_trait::async_trait]
    impl TextClassifier for Short {
        fn backend_name(&self) -> &'static str {
            "short"
        }

        async fn classify_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Classification>> {
            Ok(vec![Classification::new(SentimentLabel::Neutral, 0.5)])
        }
    }

    fn article(h: u32, text: &str, url: &str) -> NewsRecord {
        NewsRecord {
            publish_timestamp: Utc.with_ymd_and_hms(2024, 1, 2, h, 0, 0).unwrap(),
            body_text: text.to_string(),
            source_url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn scores_in_input_order_with_one_call() {
        let stub = KeywordStub::default();
        let news = vec![
            article(1, "shares up", "u1"),
            article(2, "shares down", "u2"),
            article(3, "", "u3"),
            article(23, "flat day", "u4"),
        ];

        let scored = score_news(&stub, &news).await.unwrap();
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(scored.len(), 4);

        let urls: Vec<_> = scored.iter().map(|s| s.source_url.as_str()).collect();
        assert_eq!(urls, ["u1", "u2", "u3", "u4"]);

        let polarities: Vec<_> = scored.iter().map(|s| s.sentiment_polarity).collect();
        assert_eq!(polarities, [1, -1, 0, 0]);
        assert_eq!(scored[2].sentiment_label.as_str(), "LABEL_X");
        assert!(scored
            .iter()
            .all(|s| s.news_date == NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    }

    #[tokio::test]
    async fn empty_corpus_skips_the_classifier() {
        let stub = KeywordStub::default();
        let scored = score_news(&stub, &[]).await.unwrap();
        assert!(scored.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_failure_fails_the_whole_batch() {
        let news = vec![article(1, "a", "u1"), article(2, "b", "u2")];
        let err = score_news(&Broken, &news).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::ClassificationUnavailable { stage: "load", .. })
        ));
    }

    #[tokio::test]
    async fn length_mismatch_is_reported_as_unavailable() {
        let news = vec![article(1, "a", "u1"), article(2, "b", "u2")];
        let err = score_news(&Short, &news).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::ClassificationUnavailable { stage: "validate", .. })
        ));
    }
}
