//! Bounded breadth-first expansion from a seed entity.
//!
//! Each round queries the store for edges touching the current frontier in
//! both directions, keeps only relationships not seen before, and charges
//! each new one against the edge budget. Newly discovered endpoints form the
//! next frontier.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::{GraphResult, Relationship, RelationshipType};
use crate::store::GraphStore;
use crate::{LobbyGraphError, Result};

pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 2;
pub const DEFAULT_DEPTH: usize = 1;

pub const MIN_EDGE_LIMIT: usize = 1;
pub const MAX_EDGE_LIMIT: usize = 500;
pub const DEFAULT_EDGE_LIMIT: usize = 200;

/// What to do with edges whose endpoints cannot be resolved to an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanEdges {
    /// Return them anyway; callers tolerate dangling endpoints.
    #[default]
    Keep,
    /// Remove them after node resolution.
    Drop,
}

/// Parameters for [`expand_graph`].
#[derive(Debug, Clone)]
pub struct ExpandRequest {
    pub seed_id: String,
    pub depth: usize,
    pub limit: usize,
    /// Allowed relationship types; empty means all of them.
    pub types: Vec<RelationshipType>,
    pub orphan_edges: OrphanEdges,
}

impl ExpandRequest {
    pub fn new(seed_id: impl Into<String>) -> Self {
        Self {
            seed_id: seed_id.into(),
            depth: DEFAULT_DEPTH,
            limit: DEFAULT_EDGE_LIMIT,
            types: Vec::new(),
            orphan_edges: OrphanEdges::Keep,
        }
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn types(mut self, types: Vec<RelationshipType>) -> Self {
        self.types = types;
        self
    }

    pub fn orphan_edges(mut self, policy: OrphanEdges) -> Self {
        self.orphan_edges = policy;
        self
    }

    /// Reject out-of-range input. Values are never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.seed_id.trim().is_empty() {
            return Err(LobbyGraphError::InvalidArgument("seed_id must not be empty".to_string()));
        }
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&self.depth) {
            return Err(LobbyGraphError::InvalidArgument(format!(
                "depth must be between {} and {}, got {}",
                MIN_DEPTH, MAX_DEPTH, self.depth
            )));
        }
        if !(MIN_EDGE_LIMIT..=MAX_EDGE_LIMIT).contains(&self.limit) {
            return Err(LobbyGraphError::InvalidArgument(format!(
                "limit must be between {} and {}, got {}",
                MIN_EDGE_LIMIT, MAX_EDGE_LIMIT, self.limit
            )));
        }
        Ok(())
    }

    fn effective_types(&self) -> Vec<RelationshipType> {
        if self.types.is_empty() {
            return RelationshipType::ALL.to_vec();
        }
        let unique: BTreeSet<RelationshipType> = self.types.iter().copied().collect();
        unique.into_iter().collect()
    }
}

/// Parse a comma-separated relationship type list.
///
/// Blank tokens are ignored and duplicates collapse; an empty list means all
/// four types. The first unknown token is reported in the error.
pub fn parse_relationship_types(raw: &str) -> Result<Vec<RelationshipType>> {
    let mut out: BTreeSet<RelationshipType> = BTreeSet::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        out.insert(token.parse()?);
    }
    if out.is_empty() {
        return Ok(RelationshipType::ALL.to_vec());
    }
    Ok(out.into_iter().collect())
}

/// Expand the induced subgraph around `request.seed_id`.
///
/// Fails with [`LobbyGraphError::SeedNotFound`] when the seed does not exist;
/// store errors are returned as-is and end the call.
pub async fn expand_graph<S>(store: &S, request: &ExpandRequest) -> Result<GraphResult>
where
    S: GraphStore + ?Sized,
{
    request.validate()?;
    let types = request.effective_types();
    let seed_id = request.seed_id.clone();

    let seed = store
        .get_entity(&seed_id)
        .await?
        .ok_or_else(|| LobbyGraphError::SeedNotFound(seed_id.clone()))?;

    let mut node_set: BTreeSet<String> = BTreeSet::from([seed_id.clone()]);
    let mut frontier: BTreeSet<String> = node_set.clone();
    let mut seen_edges: HashSet<String> = HashSet::new();
    let mut edges: Vec<Relationship> = Vec::new();
    let mut remaining = request.limit;

    for round in 1..=request.depth {
        if remaining == 0 || frontier.is_empty() {
            break;
        }

        let (outgoing, incoming) = tokio::try_join!(
            store.relationships_by_source(&frontier, &types, remaining),
            store.relationships_by_target(&frontier, &types, remaining),
        )?;
        let fetched = outgoing.len() + incoming.len();

        let mut next_frontier = BTreeSet::new();
        let mut added = 0usize;
        for rel in outgoing.into_iter().chain(incoming) {
            if remaining == 0 {
                break;
            }
            if !seen_edges.insert(rel.id.clone()) {
                continue;
            }
            for endpoint in [&rel.source_id, &rel.target_id] {
                if node_set.insert(endpoint.clone()) {
                    next_frontier.insert(endpoint.clone());
                }
            }
            edges.push(rel);
            remaining -= 1;
            added += 1;
        }

        log::debug!(
            "expand seed={} round={} frontier={} fetched={} added={} remaining={}",
            seed_id,
            round,
            frontier.len(),
            fetched,
            added,
            remaining
        );
        frontier = next_frontier;
    }

    let mut nodes = store.get_entities_by_ids(&node_set).await?;
    if !nodes.iter().any(|n| n.id == seed_id) {
        // Seed deleted after it was resolved; keep the record we already hold.
        nodes.push(seed);
    }
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    edges.truncate(request.limit);
    if request.orphan_edges == OrphanEdges::Drop {
        let resolved: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let before = edges.len();
        edges.retain(|e| {
            resolved.contains(e.source_id.as_str()) && resolved.contains(e.target_id.as_str())
        });
        if edges.len() < before {
            log::debug!("expand seed={} dropped {} orphan edges", seed_id, before - edges.len());
        }
    }

    log::info!(
        "Expanded graph from {}: {} nodes, {} edges (depth {}, limit {})",
        seed_id,
        nodes.len(),
        edges.len(),
        request.depth,
        request.limit
    );

    Ok(GraphResult {
        seed_id,
        nodes,
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Entity, EntityType};
    use crate::store::MemoryStore;

    fn chain_store() -> MemoryStore {
        // A -> B -> C, plus D -> A
        MemoryStore::new()
            .with_entity(Entity::new("A", EntityType::Politician, "A"))
            .with_entity(Entity::new("B", EntityType::Company, "B"))
            .with_entity(Entity::new("C", EntityType::Pac, "C"))
            .with_entity(Entity::new("D", EntityType::Lobbyist, "D"))
            .with_relationship(Relationship::new("ab", RelationshipType::Donation, "A", "B"))
            .with_relationship(Relationship::new("bc", RelationshipType::Donation, "B", "C"))
            .with_relationship(Relationship::new("da", RelationshipType::Lobbying, "D", "A"))
    }

    #[test]
    fn test_parse_types_defaults_and_dedup() {
        assert_eq!(parse_relationship_types("").unwrap(), RelationshipType::ALL.to_vec());
        assert_eq!(parse_relationship_types(" , ").unwrap(), RelationshipType::ALL.to_vec());
        assert_eq!(
            parse_relationship_types("vote, donation,vote").unwrap(),
            vec![RelationshipType::Donation, RelationshipType::Vote]
        );
    }

    #[test]
    fn test_parse_types_names_offending_token() {
        let err = parse_relationship_types("donation,gift").unwrap_err();
        assert!(matches!(err, LobbyGraphError::InvalidArgument(_)));
        assert!(err.to_string().contains("Invalid relationship type: gift"));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(ExpandRequest::new("A").validate().is_ok());
        assert!(ExpandRequest::new("  ").validate().is_err());
        assert!(ExpandRequest::new("A").depth(0).validate().is_err());
        assert!(ExpandRequest::new("A").depth(3).validate().is_err());
        assert!(ExpandRequest::new("A").limit(0).validate().is_err());
        assert!(ExpandRequest::new("A").limit(501).validate().is_err());
        assert!(ExpandRequest::new("A").depth(2).limit(500).validate().is_ok());
    }

    #[tokio::test]
    async fn test_depth_one_explores_both_directions() {
        let store = chain_store();
        let result = expand_graph(&store, &ExpandRequest::new("A")).await.unwrap();
        assert_eq!(result.node_ids(), vec!["A", "B", "D"]);
        assert_eq!(result.edges.len(), 2);
    }

    #[tokio::test]
    async fn test_depth_two_reaches_second_hop() {
        let store = chain_store();
        let result = expand_graph(&store, &ExpandRequest::new("A").depth(2)).await.unwrap();
        assert_eq!(result.node_ids(), vec!["A", "B", "C", "D"]);
        assert_eq!(result.edges.len(), 3);
    }

    #[tokio::test]
    async fn test_edges_from_earlier_rounds_not_recharged() {
        // Round 2 re-fetches "ab" as an incoming edge of B; it must not count twice.
        let store = chain_store();
        let result = expand_graph(&store, &ExpandRequest::new("A").depth(2).limit(3))
            .await
            .unwrap();
        assert_eq!(result.edge_ids().len(), 3);
        assert!(result.edge_ids().contains(&"bc"));
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_store() {
        let store = MemoryStore::new();
        let err = expand_graph(&store, &ExpandRequest::new("A").depth(5)).await.unwrap_err();
        assert!(matches!(err, LobbyGraphError::InvalidArgument(_)));
    }
}
