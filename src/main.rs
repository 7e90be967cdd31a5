use lobbygraph::Config;
use lobbygraph::api::GraphApiServer;
use lobbygraph::db::{Db, migrate};
use lobbygraph::error::LobbyGraphError;
use lobbygraph::store::{ApiStore, SqliteStore};
use std::sync::Arc;
use anyhow::Result;

fn init_logging(config: &Config) {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.lobbygraph.log_level.as_str())
    ).init();
}

/// Open the database and bring its schema up to date.
async fn open_database(config: &Config) -> Result<Db> {
    let db = Db::new(config.db_path());
    let migrations_dir = config.migrations_dir().to_path_buf();
    db.with_connection(move |conn| {
        migrate::run_migrations(conn, &migrations_dir)
    }).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config);

    let command = std::env::args().nth(1).unwrap_or_else(|| "verify".to_string());
    match command.as_str() {
        "serve" => run_http_server(config).await?,
        "verify" => run_schema_verification(config).await?,
        other => anyhow::bail!("Unknown command '{}'. Usage: lobbygraph [serve|verify]", other),
    }

    Ok(())
}

/// Run the graph API
async fn run_http_server(config: Config) -> Result<()> {
    log::info!("Starting lobbygraph HTTP server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Database path: {}", config.db_path().display());

    let db = open_database(&config).await?;
    // Constructed once here and shared by every request.
    let store: Arc<dyn ApiStore> = Arc::new(SqliteStore::new(db));

    let server = GraphApiServer::new(store, &config);
    server.run().await?;

    Ok(())
}

/// Run migrations and check the schema
async fn run_schema_verification(config: Config) -> Result<()> {
    log::info!("Starting lobbygraph v{}", env!("CARGO_PKG_VERSION"));

    let db = open_database(&config).await?;
    log::info!("Verifying schema of {}", db.path().display());
    verify_database_schema(&db).await?;

    Ok(())
}

/// Verify that all expected database objects exist
async fn verify_database_schema(db: &Db) -> Result<()> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let tables: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for table in ["entities", "relationships", "schema_migrations"] {
            if !tables.iter().any(|t| t == table) {
                log::error!("Missing table: {}", table);
                return Err(LobbyGraphError::Config(format!("Missing table: {}", table)));
            }
            log::debug!("✓ Table exists: {}", table);
        }

        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")?;
        let indexes: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for index_name in ["idx_relationships_source_type", "idx_relationships_target_type"] {
            if indexes.iter().any(|i| i == index_name) {
                log::debug!("✓ Index exists: {}", index_name);
            } else {
                log::warn!("Index not found: {} (frontier queries will scan)", index_name);
            }
        }

        let applied = migrate::get_applied_migrations(conn)?;
        log::debug!("✓ {} migrations applied", applied.len());

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(LobbyGraphError::Config(format!("Database integrity check failed: {}", integrity)));
        }

        let (entities, relationships): (i64, i64) = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM entities), (SELECT COUNT(*) FROM relationships)",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        log::info!("✓ Database OK: {} entities, {} relationships", entities, relationships);

        Ok(())
    }).await?;

    Ok(())
}
