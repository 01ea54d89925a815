use anyhow::Result;
use clap::{Parser, Subcommand};
use job_search::jobs_cli::{handle_jobs_command, JobsCli};
use job_search::{start_web_server, AppConfig};
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "worklance")]
#[command(about = "Freelance marketplace job-search service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve,
    /// Manage job postings
    Jobs(JobsCli),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("job_search=info,worklance=info,rocket::server=off")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = AppConfig::load()?;
            config.ensure_directories().await?;

            info!("Starting worklance job-search API server");
            info!(
                "Environment: {}",
                std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string())
            );
            info!("Database: {}", config.environment.database_path.display());
            info!("Server: http://0.0.0.0:{}", config.environment.port);

            start_web_server(config).await
        }
        Command::Jobs(jobs) => handle_jobs_command(jobs).await,
    }
}
