use crate::domain::news::SentimentLabel;
use crate::sentiment::{Classification, TextClassifier};
use std::collections::HashMap;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("beat", 0.6),
    ("beats", 0.6),
    ("bullish", 0.8),
    ("exceed", 0.6),
    ("exceeds", 0.6),
    ("gain", 0.5),
    ("gains", 0.5),
    ("growth", 0.6),
    ("outperform", 0.7),
    ("profit", 0.6),
    ("rally", 0.7),
    ("rebound", 0.5),
    ("record", 0.6),
    ("rise", 0.5),
    ("rises", 0.5),
    ("soar", 0.8),
    ("soars", 0.8),
    ("strong", 0.5),
    ("surge", 0.7),
    ("surges", 0.7),
    ("upgrade", 0.6),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bearish", -0.8),
    ("crash", -0.9),
    ("decline", -0.6),
    ("declines", -0.6),
    ("downgrade", -0.6),
    ("drop", -0.6),
    ("drops", -0.6),
    ("fall", -0.5),
    ("falls", -0.5),
    ("fear", -0.6),
    ("lawsuit", -0.6),
    ("loss", -0.6),
    ("losses", -0.6),
    ("miss", -0.6),
    ("misses", -0.6),
    ("plunge", -0.8),
    ("plunges", -0.8),
    ("probe", -0.5),
    ("weak", -0.5),
];

const NEGATIONS: &[&str] = &["no", "not", "never", "without", "didn't", "doesn't", "isn't"];

// |normalized score| at or below this is neutral.
const NEUTRAL_BAND: f64 = 0.2;

/// Offline word-list classifier for runs without an inference service.
///
/// Deterministic: the same text always yields the same label and confidence.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    words: HashMap<&'static str, f64>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        let words = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS.iter())
            .copied()
            .collect();
        Self { words }
    }
}

impl LexiconClassifier {
    /// Squashed word score in (-1, 1).
    fn score(&self, text: &str) -> f64 {
        let mut sum = 0.0;
        let mut negate = false;
        for raw in text.split_whitespace() {
            let token = raw
                .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase();
            if NEGATIONS.contains(&token.as_str()) {
                negate = true;
                continue;
            }
            if let Some(w) = self.words.get(token.as_str()) {
                sum += if negate { -w } else { *w };
            }
            negate = false;
        }
        sum / (sum.abs() + 1.0)
    }

    pub fn classify(&self, text: &str) -> Classification {
        if text.trim().is_empty() {
            return Classification::new(SentimentLabel::Neutral, 1.0);
        }
        let s = self.score(text);
        if s > NEUTRAL_BAND {
            Classification::new(SentimentLabel::Positive, 0.5 + s / 2.0)
        } else if s < -NEUTRAL_BAND {
            Classification::new(SentimentLabel::Negative, 0.5 + s.abs() / 2.0)
        } else {
            Classification::new(SentimentLabel::Neutral, 1.0 - s.abs())
        }
    }
}

#[async_trait::async_trait]
impl TextClassifier for LexiconClassifier {
    fn backend_name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Classification>> {
        Ok(texts.iter().map(|t| self.classify(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_by_direction() {
        let lex = LexiconClassifier::default();
        assert_eq!(
            lex.classify("Nvidia shares surge after earnings beat").label,
            SentimentLabel::Positive
        );
        assert_eq!(
            lex.classify("Chip stocks plunge on export probe").label,
            SentimentLabel::Negative
        );
        assert_eq!(
            lex.classify("The company will hold its annual meeting").label,
            SentimentLabel::Neutral
        );
    }

    #[test]
    fn negation_flips_the_next_word() {
        let lex = LexiconClassifier::default();
        assert_eq!(
            lex.classify("Guidance did not disappoint, revenue did not fall").label,
            SentimentLabel::Positive
        );
    }

    #[test]
    fn empty_text_is_confident_neutral() {
        let c = LexiconClassifier::default().classify("");
        assert_eq!(c.label, SentimentLabel::Neutral);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn confidence_stays_in_unit_interval() {
        let lex = LexiconClassifier::default();
        let long = "surge ".repeat(200);
        for text in ["crash crash crash crash", long.as_str(), "record gains", "no"] {
            let c = lex.classify(text);
            assert!((0.0..=1.0).contains(&c.confidence), "{text}: {}", c.confidence);
        }
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let lex = LexiconClassifier::default();
        let texts = vec!["shares soar".to_string(), String::new(), "shares drop".to_string()];
        let out = lex.classify_batch(&texts).await.unwrap();
        let polarities: Vec<_> = out.iter().map(|c| c.label.polarity()).collect();
        assert_eq!(polarities, [1, 0, -1]);
    }
}
