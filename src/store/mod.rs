//! Entity-Relationship Store: the read capability the expansion engine runs against.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::graph::{Entity, EntityType, Relationship, RelationshipType};
use crate::Result;

/// The four queries bounded expansion needs.
///
/// Implementations return an empty vector, without touching the backend,
/// when `ids` is empty or `limit` is zero.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Fetch one entity; `Ok(None)` when the id is unknown.
    async fn get_entity(&self, id: &str) -> Result<Option<Entity>>;

    /// Fetch many entities. Ids with no record are omitted.
    async fn get_entities_by_ids(&self, ids: &BTreeSet<String>) -> Result<Vec<Entity>>;

    /// Relationships whose `source_id` is in `ids`, restricted to `types`.
    async fn relationships_by_source(
        &self,
        ids: &BTreeSet<String>,
        types: &[RelationshipType],
        limit: usize,
    ) -> Result<Vec<Relationship>>;

    /// Relationships whose `target_id` is in `ids`, restricted to `types`.
    async fn relationships_by_target(
        &self,
        ids: &BTreeSet<String>,
        types: &[RelationshipType],
        limit: usize,
    ) -> Result<Vec<Relationship>>;
}

/// Filter for entity listing.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    /// Case-insensitive substring matched against name and description.
    pub query: Option<String>,
    pub entity_type: Option<EntityType>,
    pub limit: usize,
}

/// Entity browsing used by the HTTP layer.
#[async_trait]
pub trait EntityCatalog: Send + Sync {
    /// Matching entities, most recently updated first (undated last), ties by id.
    async fn list_entities(&self, filter: &EntityFilter) -> Result<Vec<Entity>>;
}

/// Everything the HTTP service needs from a store.
pub trait ApiStore: GraphStore + EntityCatalog {}

impl<T: GraphStore + EntityCatalog> ApiStore for T {}
