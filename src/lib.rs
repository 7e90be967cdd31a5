pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod store;

pub use config::Config;
pub use error::{LobbyGraphError, Result};
pub use graph::{expand_graph, Entity, ExpandRequest, GraphResult, Relationship};
pub use store::{GraphStore, MemoryStore, SqliteStore};
