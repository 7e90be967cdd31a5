use clap::Parser;
use lobbygraph::Config;
use lobbygraph::db::{Db, import, migrate};
use std::path::PathBuf;
use std::time::Instant;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "load")]
#[command(about = "Import entities and relationships from a JSON fixture (upsert by id)")]
struct Args {
    /// Fixture file: {"entities": [...], "relationships": [...]}
    fixture: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let config = Config::load()?;
    log::info!("Database path: {}", config.db_path().display());

    let db = Db::new(config.db_path());
    let migrations_dir = config.migrations_dir().to_path_buf();
    db.with_connection(move |conn| {
        migrate::run_migrations(conn, &migrations_dir)
    }).await?;

    let start = Instant::now();
    let fixture = import::read_fixture(&args.fixture)?;
    log::info!(
        "Read {} entities and {} relationships from {}",
        fixture.entities.len(),
        fixture.relationships.len(),
        args.fixture.display()
    );

    let stats = import::import_fixture(&db, fixture).await?;
    log::info!(
        "Imported {} entities, {} relationships in {:?}",
        stats.entities,
        stats.relationships,
        start.elapsed()
    );

    Ok(())
}
