use anyhow::Context;
use clap::Parser;
use member_etl::config::{Config, Credentials};
use member_etl::logging;
use member_etl::pipeline::Pipeline;
use member_etl::sink::{InMemorySink, MongoSink, Sink};
use member_etl::transform::RecordTransformer;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "member_etl")]
#[command(about = "Load delimited member-data files into MongoDB")]
#[command(version)]
struct Cli {
    /// Input files, processed in the order given
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML configuration file (defaults to ./etl.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transform and count rows without connecting to the database
    #[arg(long)]
    dry_run: bool,

    /// Treat any rejected row or failed write as a failed run
    #[arg(long)]
    strict: bool,
}

async fn connect_sink(config: &Config, dry_run: bool) -> anyhow::Result<Arc<dyn Sink>> {
    if dry_run {
        info!("Dry run: documents are kept in memory");
        return Ok(Arc::new(InMemorySink::new()));
    }
    let credentials = Credentials::from_env()?;
    let sink = MongoSink::connect(&config.sink, &credentials)
        .await
        .context("connecting to MongoDB")?;
    Ok(Arc::new(sink))
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let sink = connect_sink(&config, cli.dry_run).await?;

    let transformer = RecordTransformer::new(config.schema, config.transform.reference_date);
    let pipeline = Pipeline::new(transformer, config.input, sink);
    let summary = pipeline.run_and_close(&cli.files).await;

    println!("{summary}");
    info!(
        attempted = summary.attempted(),
        accepted = summary.accepted(),
        rejected = summary.rejected(),
        write_failed = summary.write_failed(),
        failed_files = summary.failed_files(),
        "Run finished"
    );
    Ok(summary.is_success(cli.strict))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            println!("❌ Run completed with failures");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Run aborted: {:#}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
