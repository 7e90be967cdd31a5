#![allow(dead_code)]

use async_trait::async_trait;
use lobbygraph::graph::{Entity, EntityType, Relationship, RelationshipType};
use lobbygraph::store::{EntityCatalog, EntityFilter, GraphStore, MemoryStore};
use lobbygraph::{LobbyGraphError, Result};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// E1 donates to E2; E3 lobbies E1.
pub fn scenario_store() -> MemoryStore {
    MemoryStore::new()
        .with_entity(Entity::new("E1", EntityType::Politician, "Sen. Jane Roe"))
        .with_entity(Entity::new("E2", EntityType::Company, "Acme Energy"))
        .with_entity(Entity::new("E3", EntityType::Lobbyist, "K Street Partners"))
        .with_relationship(Relationship::new("don-1", RelationshipType::Donation, "E1", "E2"))
        .with_relationship(Relationship::new("lob-1", RelationshipType::Lobbying, "E3", "E1"))
}

/// Two-level neighbourhood around P1 with mixed types and a cycle.
pub fn dense_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for (id, t) in [
        ("P1", EntityType::Politician),
        ("P2", EntityType::Politician),
        ("C1", EntityType::Company),
        ("C2", EntityType::Company),
        ("PAC1", EntityType::Pac),
        ("L1", EntityType::Lobbyist),
        ("B1", EntityType::Bill),
        ("B2", EntityType::Bill),
    ] {
        store.insert_entity(Entity::new(id, t, id));
    }
    for (id, t, s, d) in [
        ("d1", RelationshipType::Donation, "PAC1", "P1"),
        ("d2", RelationshipType::Donation, "C1", "PAC1"),
        ("d3", RelationshipType::Donation, "C2", "P2"),
        ("l1", RelationshipType::Lobbying, "L1", "P1"),
        ("l2", RelationshipType::Lobbying, "L1", "P2"),
        ("v1", RelationshipType::Vote, "P1", "B1"),
        ("v2", RelationshipType::Vote, "P2", "B1"),
        ("v3", RelationshipType::Vote, "P2", "B2"),
        ("e1", RelationshipType::Employment, "L1", "C1"),
        ("e2", RelationshipType::Employment, "P1", "C2"),
    ] {
        store.insert_relationship(Relationship::new(id, t, s, d));
    }
    store
}

/// Store whose backend is down; counts how many calls reached it.
#[derive(Default)]
pub struct UnavailableStore {
    pub calls: AtomicUsize,
}

impl UnavailableStore {
    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LobbyGraphError::StoreUnavailable("connection refused".to_string()))
    }
}

#[async_trait]
impl GraphStore for UnavailableStore {
    async fn get_entity(&self, _id: &str) -> Result<Option<Entity>> {
        self.fail()
    }

    async fn get_entities_by_ids(&self, _ids: &BTreeSet<String>) -> Result<Vec<Entity>> {
        self.fail()
    }

    async fn relationships_by_source(
        &self,
        _ids: &BTreeSet<String>,
        _types: &[RelationshipType],
        _limit: usize,
    ) -> Result<Vec<Relationship>> {
        self.fail()
    }

    async fn relationships_by_target(
        &self,
        _ids: &BTreeSet<String>,
        _types: &[RelationshipType],
        _limit: usize,
    ) -> Result<Vec<Relationship>> {
        self.fail()
    }
}

#[async_trait]
impl EntityCatalog for UnavailableStore {
    async fn list_entities(&self, _filter: &EntityFilter) -> Result<Vec<Entity>> {
        self.fail()
    }
}
