use anyhow::Context;
use clap::{Parser, Subcommand};
use trivia_api::db;
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run migrations and serve the API
    Serve,
    /// Only run migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    let pool = db::establish_connection(&settings.database)
        .await
        .with_context(|| format!("Cannot connect to {}", settings.database.url))?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(pool, &settings).await?,
        Commands::Migrate => tracing::info!("Migrations applied"),
    };
    Ok(())
}
