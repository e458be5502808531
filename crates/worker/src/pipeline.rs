use anyhow::Context;
use newslag_core::config::Settings;
use newslag_core::domain::price::PriceRecord;
use newslag_core::eda::{render_all, EdaOptions};
use newslag_core::features::{build_feature_table, LagMode};
use newslag_core::ingest::{load_news_records, load_price_records, RowPolicy};
use newslag_core::sentiment::{classifier_from_settings, score_news, TextClassifier};
use newslag_core::storage::feature_table::{read_feature_table, write_feature_table};
use newslag_core::storage::scored_news::{read_scored_news, write_scored_news};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BuildInput {
    pub prices: PathBuf,
    pub scored: PathBuf,
    pub out: PathBuf,
    pub lag: Option<usize>,
    pub lag_mode: Option<LagMode>,
}

/// Build inputs with CLI overrides applied on top of environment settings.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub prices: PathBuf,
    pub scored: PathBuf,
    pub out: PathBuf,
    pub lag: usize,
    pub lag_mode: LagMode,
}

impl BuildPlan {
    pub fn resolve(settings: &Settings, input: BuildInput) -> anyhow::Result<Self> {
        let lag = input.lag.unwrap_or(settings.lag_days);
        anyhow::ensure!(lag >= 1, "--lag must be >= 1 (got {lag})");
        Ok(Self {
            prices: input.prices,
            scored: input.scored,
            out: input.out,
            lag,
            lag_mode: input.lag_mode.unwrap_or(settings.lag_mode),
        })
    }
}

/// Loads the news corpus, classifies it in one batch and writes the scored-news table.
pub async fn score(
    settings: &Settings,
    news_path: &Path,
    scored_path: &Path,
    policy: RowPolicy,
) -> anyhow::Result<()> {
    // Load the model before touching the data so a missing backend fails fast.
    let classifier = classifier_from_settings(settings)?;
    score_with(classifier.as_ref(), news_path, scored_path, policy).await
}

async fn score_with(
    classifier: &dyn TextClassifier,
    news_path: &Path,
    scored_path: &Path,
    policy: RowPolicy,
) -> anyhow::Result<()> {
    let news = load_news_records(news_path, policy)?;
    let scored = score_news(classifier, &news.records)
        .await
        .context("sentiment scoring failed; no output written")?;
    write_scored_news(scored_path, &scored)?;
    tracing::info!(
        backend = classifier.backend_name(),
        articles = scored.len(),
        skipped = news.report.skipped.len(),
        path = %scored_path.display(),
        "score step complete"
    );
    Ok(())
}

/// Joins lagged daily sentiment onto the price series and writes the feature table.
pub fn build(plan: &BuildPlan, policy: RowPolicy) -> anyhow::Result<()> {
    let prices = load_price_records(&plan.prices, policy)?;
    build_from(plan, &prices.records)
}

fn build_from(plan: &BuildPlan, prices: &[PriceRecord]) -> anyhow::Result<()> {
    let scored = read_scored_news(&plan.scored)?;
    let table = build_feature_table(prices, &scored, plan.lag, plan.lag_mode)?;
    anyhow::ensure!(
        table.rows.len() == prices.len(),
        "feature table has {} rows for {} trading days",
        table.rows.len(),
        prices.len()
    );
    write_feature_table(&plan.out, &table)?;
    tracing::info!(
        trading_days = table.rows.len(),
        lag = plan.lag,
        lag_mode = ?plan.lag_mode,
        path = %plan.out.display(),
        "build step complete"
    );
    Ok(())
}

/// Score, then build.
///
/// Both input files are validated before the classifier runs, so a bad price file fails the
/// run without replacing the scored-news table.
pub async fn run(
    settings: &Settings,
    news_path: &Path,
    plan: &BuildPlan,
    policy: RowPolicy,
) -> anyhow::Result<()> {
    let classifier = classifier_from_settings(settings)?;
    run_with(classifier.as_ref(), news_path, plan, policy).await
}

async fn run_with(
    classifier: &dyn TextClassifier,
    news_path: &Path,
    plan: &BuildPlan,
    policy: RowPolicy,
) -> anyhow::Result<()> {
    let prices = load_price_records(&plan.prices, policy)?;
    score_with(classifier, news_path, &plan.scored, policy).await?;
    build_from(plan, &prices.records)
}

pub fn eda(features_path: &Path, out_dir: &Path, symbol: &str) -> anyhow::Result<()> {
    let table = read_feature_table(features_path)?;
    let opts = EdaOptions {
        symbol: symbol.to_string(),
        out_dir: out_dir.to_path_buf(),
    };
    let summary = render_all(&table, &opts)?;
    tracing::info!(
        artifacts = summary.written.len(),
        out_dir = %out_dir.display(),
        "eda step complete"
    );
    Ok(())
}
