pub mod domain;
pub mod eda;
pub mod error;
pub mod features;
pub mod ingest;
pub mod sentiment;
pub mod storage;
pub mod time;

pub mod config {
    use crate::features::LagMode;
    use anyhow::Context;

    const DEFAULT_CLASSIFIER_MODEL: &str = "ProsusAI/finbert";
    const DEFAULT_LAG_DAYS: usize = 1;
    // Whole-corpus batches can take minutes on CPU-only inference servers.
    const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 300;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ClassifierBackend {
        Http,
        Lexicon,
    }

    impl std::str::FromStr for ClassifierBackend {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "http" => Ok(Self::Http),
                "lexicon" => Ok(Self::Lexicon),
                other => anyhow::bail!("unknown CLASSIFIER_BACKEND: {other} (expected http|lexicon)"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub classifier_backend: ClassifierBackend,
        pub classifier_base_url: Option<String>,
        pub classifier_api_key: Option<String>,
        pub classifier_model: String,
        pub classifier_timeout_secs: u64,
        pub lag_days: usize,
        pub lag_mode: LagMode,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let classifier_backend = match std::env::var("CLASSIFIER_BACKEND") {
                Ok(s) if !s.trim().is_empty() => s.parse()?,
                _ => ClassifierBackend::Http,
            };

            let lag_days = positive_var(
                "SENTIMENT_LAG_DAYS",
                std::env::var("SENTIMENT_LAG_DAYS").ok(),
                DEFAULT_LAG_DAYS,
            )?;
            let classifier_timeout_secs = positive_var(
                "CLASSIFIER_TIMEOUT_SECS",
                std::env::var("CLASSIFIER_TIMEOUT_SECS").ok(),
                DEFAULT_CLASSIFIER_TIMEOUT_SECS,
            )?;

            let lag_mode = match std::env::var("SENTIMENT_LAG_MODE") {
                Ok(s) if !s.trim().is_empty() => s.parse()?,
                _ => LagMode::NewsDays,
            };

            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                classifier_backend,
                classifier_base_url: std::env::var("CLASSIFIER_BASE_URL").ok(),
                classifier_api_key: std::env::var("CLASSIFIER_API_KEY")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                classifier_model: std::env::var("CLASSIFIER_MODEL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string()),
                classifier_timeout_secs,
                lag_days,
                lag_mode,
            })
        }

        pub fn require_classifier_base_url(&self) -> anyhow::Result<&str> {
            self.classifier_base_url
                .as_deref()
                .context("CLASSIFIER_BASE_URL is required for CLASSIFIER_BACKEND=http")
        }
    }

    /// Parses an integer setting that must be at least 1; unset or blank means `default`.
    fn positive_var<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
    where
        T: std::str::FromStr + PartialOrd + From<u8>,
    {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(default);
        };
        let value = raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{name} is not an integer: {raw}"))?;
        anyhow::ensure!(value >= T::from(1), "{name} must be >= 1 (got {raw})");
        Ok(value)
    }

}
