use std::sync::Arc;

use clap::{Parser, Subcommand};
use tally::{
    cmd::send::{self, SendArgs},
    config::{AppConfig, ReportFormat},
    reporter::{JsonReportSink, ReportSink, StdoutReportSink},
    supervisor::Supervisor,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the collector: TCP ingestion plus periodic statistics reports.
    Run,
    /// Reads log lines from stdin and forwards them to a file or collector.
    Send(SendArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_collector().await?,
        Commands::Send(args) => send::execute(args).await?,
    }

    Ok(())
}

async fn run_collector() -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(None)?;
    tracing::debug!(
        port = config.listen_port,
        report_every_n_records = config.report_every_n_records,
        report_after_secs = config.report_after_secs.as_secs(),
        "Configuration loaded."
    );

    let sink: Arc<dyn ReportSink> = match config.report_format {
        ReportFormat::Text => Arc::new(StdoutReportSink),
        ReportFormat::Json => Arc::new(JsonReportSink),
    };
    let supervisor = Supervisor::new(config, sink);
    tracing::info!("Supervisor initialized, starting collector...");
    supervisor.run().await?;

    Ok(())
}
