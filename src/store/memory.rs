//! In-memory store, used as a test fixture and for demos.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

use super::{EntityCatalog, EntityFilter, GraphStore};
use crate::graph::{Entity, Relationship, RelationshipType};
use crate::Result;

/// Entities keyed by id plus relationships in insertion order.
///
/// Relationship ids are not required to be unique here, so fixtures can
/// model a backend that returns duplicate rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entities: BTreeMap<String, Entity>,
    relationships: Vec<Relationship>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.insert_entity(entity);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.insert_relationship(relationship);
        self
    }

    pub fn insert_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn insert_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    fn select<F>(&self, types: &[RelationshipType], limit: usize, endpoint: F) -> Vec<Relationship>
    where
        F: Fn(&Relationship) -> bool,
    {
        self.relationships
            .iter()
            .filter(|r| types.contains(&r.relationship_type) && endpoint(r))
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        Ok(self.entities.get(id).cloned())
    }

    async fn get_entities_by_ids(&self, ids: &BTreeSet<String>) -> Result<Vec<Entity>> {
        Ok(ids.iter().filter_map(|id| self.entities.get(id).cloned()).collect())
    }

    async fn relationships_by_source(
        &self,
        ids: &BTreeSet<String>,
        types: &[RelationshipType],
        limit: usize,
    ) -> Result<Vec<Relationship>> {
        if ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.select(types, limit, |r| ids.contains(&r.source_id)))
    }

    async fn relationships_by_target(
        &self,
        ids: &BTreeSet<String>,
        types: &[RelationshipType],
        limit: usize,
    ) -> Result<Vec<Relationship>> {
        if ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.select(types, limit, |r| ids.contains(&r.target_id)))
    }
}

#[async_trait]
impl EntityCatalog for MemoryStore {
    async fn list_entities(&self, filter: &EntityFilter) -> Result<Vec<Entity>> {
        let needle = filter.query.as_deref().map(str::to_lowercase);
        let mut out: Vec<Entity> = self
            .entities
            .values()
            .filter(|e| filter.entity_type.map_or(true, |t| e.entity_type == t))
            .filter(|e| match &needle {
                None => true,
                Some(n) => {
                    e.name.to_lowercase().contains(n)
                        || e.description
                            .as_deref()
                            .map_or(false, |d| d.to_lowercase().contains(n))
                }
            })
            .cloned()
            .collect();
        // Newest first, undated last; BTreeMap iteration already gives id order for ties.
        out.sort_by(|a, b| match (a.last_updated, b.last_updated) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        out.truncate(filter.limit);
        Ok(out)
    }
}
