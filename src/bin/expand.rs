use clap::Parser;
use lobbygraph::Config;
use lobbygraph::db::{Db, migrate};
use lobbygraph::graph::{expand_graph, parse_relationship_types, ExpandRequest, OrphanEdges};
use lobbygraph::store::SqliteStore;
use std::time::Instant;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "expand")]
#[command(about = "Expand the relationship graph around a seed entity and print it as JSON")]
struct Args {
    /// Seed entity id
    seed_id: String,

    /// Hops to expand (1-2); defaults to graph.default_depth
    #[arg(short, long)]
    depth: Option<usize>,

    /// Edge budget (1-500); defaults to graph.default_limit
    #[arg(short, long)]
    limit: Option<usize>,

    /// Comma-separated relationship types (donation,lobbying,vote,employment)
    #[arg(short, long, default_value = "")]
    types: String,

    /// Remove edges whose endpoints are not in the store
    #[arg(long)]
    drop_orphans: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "warn")
    ).init();

    let args = Args::parse();
    let config = Config::load()?;

    let db = Db::new(config.db_path());
    let migrations_dir = config.migrations_dir().to_path_buf();
    db.with_connection(move |conn| {
        migrate::run_migrations(conn, &migrations_dir)
    }).await?;
    let store = SqliteStore::new(db);

    let orphan_edges = if args.drop_orphans {
        OrphanEdges::Drop
    } else {
        config.graph.orphan_edges
    };
    let request = ExpandRequest::new(args.seed_id)
        .depth(args.depth.unwrap_or(config.graph.default_depth))
        .limit(args.limit.unwrap_or(config.graph.default_limit))
        .types(parse_relationship_types(&args.types)?)
        .orphan_edges(orphan_edges);

    let start = Instant::now();
    let graph = expand_graph(&store, &request).await?;
    let duration = start.elapsed();

    println!("{}", serde_json::to_string_pretty(&graph)?);
    eprintln!(
        "{} nodes, {} edges in {:?}",
        graph.nodes.len(),
        graph.edges.len(),
        duration
    );

    Ok(())
}
