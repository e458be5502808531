use clap::{Args as ClapArgs, Parser, Subcommand};
use newslag_core::config::Settings;
use newslag_core::features::LagMode;
use newslag_core::ingest::RowPolicy;
use std::path::PathBuf;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod pipeline;

#[derive(Debug, Parser)]
#[command(name = "newslag_worker")]
struct Args {
    /// Skip rows that fail to parse instead of aborting the run.
    #[arg(long, global = true)]
    skip_malformed: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify every news article and write the scored-news table.
    Score(ScoreArgs),
    /// Aggregate, lag and join scored news onto the price series.
    Build(BuildArgs),
    /// Score, then build.
    Run(RunArgs),
    /// Render chart specs and heat-map data from a feature table.
    Eda(EdaArgs),
}

#[derive(Debug, ClapArgs)]
struct ScoreArgs {
    #[arg(long, default_value = "news(processed).csv")]
    news: PathBuf,

    /// Where the scored-news table is written.
    #[arg(long, default_value = "news_data_with_sentiment.csv")]
    scored: PathBuf,
}

#[derive(Debug, ClapArgs)]
struct BuildArgs {
    #[arg(long, default_value = "nvidia_stock_2015_to_2024.csv")]
    prices: PathBuf,

    /// Scored-news table produced by `score`.
    #[arg(long, default_value = "news_data_with_sentiment.csv")]
    scored: PathBuf,

    #[arg(long, default_value = "final_nvda_stock_sentiment_data.csv")]
    out: PathBuf,

    /// Lag in days (>= 1). Defaults to SENTIMENT_LAG_DAYS or 1.
    #[arg(long)]
    lag: Option<usize>,

    /// news-days | calendar-days. Defaults to SENTIMENT_LAG_MODE or news-days.
    #[arg(long)]
    lag_mode: Option<LagMode>,
}

#[derive(Debug, ClapArgs)]
struct RunArgs {
    #[arg(long, default_value = "news(processed).csv")]
    news: PathBuf,

    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Debug, ClapArgs)]
struct EdaArgs {
    #[arg(long, default_value = "final_nvda_stock_sentiment_data.csv")]
    features: PathBuf,

    #[arg(long, default_value = "web/data")]
    out_dir: PathBuf,

    /// Ticker shown in chart titles.
    #[arg(long, default_value = "NVDA")]
    symbol: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let policy = if args.skip_malformed {
        RowPolicy::Skip
    } else {
        RowPolicy::Fail
    };

    let run_id = uuid::Uuid::new_v4();
    let started_at = chrono::Utc::now();
    let span = tracing::info_span!("pipeline_run", %run_id);

    let result = dispatch(args.command, &settings, policy)
        .instrument(span)
        .await;

    let elapsed_ms = (chrono::Utc::now() - started_at).num_milliseconds();
    match result {
        Ok(()) => {
            tracing::info!(%run_id, elapsed_ms, "run finished");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            let kind = err
                .downcast_ref::<newslag_core::error::PipelineError>()
                .map(|e| e.kind())
                .unwrap_or("other");
            tracing::error!(%run_id, elapsed_ms, kind, error = %format!("{err:#}"), "run failed");
            Err(err)
        }
    }
}

async fn dispatch(command: Command, settings: &Settings, policy: RowPolicy) -> anyhow::Result<()> {
    match command {
        Command::Score(a) => pipeline::score(settings, &a.news, &a.scored, policy).await,
        Command::Build(a) => {
            let plan = pipeline::BuildPlan::resolve(settings, a.into())?;
            pipeline::build(&plan, policy)
        }
        Command::Run(a) => {
            let plan = pipeline::BuildPlan::resolve(settings, a.build.into())?;
            pipeline::run(settings, &a.news, &plan, policy).await
        }
        Command::Eda(a) => pipeline::eda(&a.features, &a.out_dir, &a.symbol),
    }
}

impl From<BuildArgs> for pipeline::BuildInput {
    fn from(a: BuildArgs) -> Self {
        Self {
            prices: a.prices,
            scored: a.scored,
            out: a.out,
            lag: a.lag,
            lag_mode: a.lag_mode,
        }
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
