use anyhow::Context;
use clap::{Parser, Subcommand};
use fishcast_core::error::ReportError;
use fishcast_core::render::table;
use fishcast_core::service::http::HttpPredictionBackend;
use fishcast_core::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "fishcast")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a survival prediction for a date range and print the table.
    Predict(PredictArgs),
}

#[derive(Debug, clap::Args)]
struct PredictArgs {
    /// First forecast day (YYYY-MM-DD).
    #[arg(long, requires = "end", conflicts_with = "range")]
    start: Option<String>,

    /// Last forecast day (YYYY-MM-DD), inclusive.
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Date range in picker form: "YYYY-MM-DD - YYYY-MM-DD".
    #[arg(long)]
    range: Option<String>,

    /// Number of fish in the lot.
    #[arg(long)]
    fish_count: String,

    /// Write FishReport-<date>.txt for this date (repeatable).
    #[arg(long = "export-date")]
    export_dates: Vec<String>,

    /// Write FishReports.zip with every predicted date.
    #[arg(long)]
    export_all: bool,

    /// Directory for exported files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the records as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fishcast_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let backend = Arc::new(HttpPredictionBackend::from_settings(&settings)?);
    let session = Session::new(backend, &settings);

    match args.command {
        Command::Predict(predict) => run_predict(&session, predict).await,
    }
}

async fn run_predict(session: &Session, args: PredictArgs) -> anyhow::Result<()> {
    let result = match (&args.range, &args.start, &args.end) {
        (Some(range), _, _) => session.predict_range(range, &args.fish_count).await,
        (None, Some(start), Some(end)) => session.predict(start, end, &args.fish_count).await,
        _ => session.predict("", "", &args.fish_count).await,
    };

    let records = match result {
        Ok(records) => records,
        Err(err) => {
            if let Some(kind) = ReportError::of(&err) {
                tracing::error!(kind = kind.kind(), error = %err, "prediction failed");
            }
            if !matches!(ReportError::of(&err), Some(ReportError::Validation(_))) {
                sentry_anyhow::capture_anyhow(&err);
            }
            return Err(err);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", table::to_text(&session.view().await.rows));
    }

    for date in &args.export_dates {
        let doc = session.export_one(date).await?;
        let path = write_export(&args.out_dir, &doc.file_name, doc.body.as_bytes())?;
        tracing::info!(%date, path = %path.display(), "wrote report");
    }

    if args.export_all {
        let bundle = session.export_all().await?;
        let path = write_export(&args.out_dir, &bundle.file_name, &bundle.bytes)?;
        tracing::info!(entries = bundle.entries.len(), path = %path.display(), "wrote report archive");
    }

    Ok(())
}

fn write_export(out_dir: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn init_sentry(settings: &fishcast_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
