use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use trivia_api::db::queries::categories::get_all_categories;
use trivia_api::db::queries::questions::get_all_questions;
use trivia_api::db::{self, Category, Question};
use trivia_api::settings::DatabaseSettings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database url, e.g. sqlite:trivia.db
    db_url: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import categories.csv and questions.csv from a directory
    Import { path: PathBuf },
    /// Export categories.csv and questions.csv to a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("warn");
    let cli = Cli::parse();
    let pool = db::establish_connection(&DatabaseSettings {
        url: cli.db_url.clone(),
        max_connections: 1,
        create_if_missing: true,
    })
    .await
    .with_context(|| format!("Cannot connect to {}", cli.db_url))?;
    db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Export { path } => export_data(&pool, &path).await.context("Cannot export"),
        Commands::Import { path } => import_data(&pool, &path).await.context("Cannot import"),
    }
}

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn export_table<T: Serialize>(dir: &Path, name: &str, rows: &[T]) -> anyhow::Result<()> {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    rows.iter().try_for_each(|row| writer.serialize(row))?;
    writer.flush()?;
    tracing::info!(rows = rows.len(), "Wrote {}", path.display());
    Ok(())
}

fn load_table<T: DeserializeOwned>(dir: &Path, name: &str) -> anyhow::Result<Vec<T>> {
    let path = dir.join(name);
    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Malformed row in {}", path.display()))?;
    Ok(rows)
}

async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    std::fs::create_dir_all(dir)?;
    export_table(dir, CATEGORIES_FILE, &categories)?;
    export_table(dir, QUESTIONS_FILE, &questions)?;
    Ok(())
}

/// Both files are parsed before the database is touched; the import itself is one transaction.
async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = load_table(dir, CATEGORIES_FILE)?;
    let questions: Vec<Question> = load_table(dir, QUESTIONS_FILE)?;
    db::import_catalog(pool, categories, questions).await?;
    tracing::info!("Imported from {}", dir.display());
    Ok(())
}
