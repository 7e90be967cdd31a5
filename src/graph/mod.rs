//! Political-finance knowledge graph: entity and relationship types, and
//! bounded breadth-first expansion from a seed entity.

mod expand;

pub use expand::{
    expand_graph, parse_relationship_types, ExpandRequest, OrphanEdges, DEFAULT_DEPTH,
    DEFAULT_EDGE_LIMIT, MAX_DEPTH, MAX_EDGE_LIMIT, MIN_DEPTH, MIN_EDGE_LIMIT,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::LobbyGraphError;

/// Kind of node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Politician,
    Company,
    Pac,
    Lobbyist,
    Bill,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::Politician,
        EntityType::Company,
        EntityType::Pac,
        EntityType::Lobbyist,
        EntityType::Bill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Politician => "politician",
            EntityType::Company => "company",
            EntityType::Pac => "pac",
            EntityType::Lobbyist => "lobbyist",
            EntityType::Bill => "bill",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = LobbyGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LobbyGraphError::InvalidArgument(format!("Invalid entity type: {}", s)))
    }
}

/// Kind of edge in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Donation,
    Lobbying,
    Vote,
    Employment,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 4] = [
        RelationshipType::Donation,
        RelationshipType::Lobbying,
        RelationshipType::Vote,
        RelationshipType::Employment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Donation => "donation",
            RelationshipType::Lobbying => "lobbying",
            RelationshipType::Vote => "vote",
            RelationshipType::Employment => "employment",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = LobbyGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationshipType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                LobbyGraphError::InvalidArgument(format!("Invalid relationship type: {}", s))
            })
    }
}

/// A node: politician, company, PAC, lobbyist or bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub total_lobbying: Option<f64>,
    #[serde(default)]
    pub total_donations: Option<f64>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Entity {
    /// Minimal entity with only the required fields set.
    pub fn new(id: impl Into<String>, entity_type: EntityType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type,
            name: name.into(),
            description: None,
            party: None,
            state: None,
            industry: None,
            total_lobbying: None,
            total_donations: None,
            metadata: Map::new(),
            last_updated: None,
        }
    }
}

/// A directed, typed edge (source --type--> target).
///
/// `id` is globally unique and is the only key used for deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub cycle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        relationship_type: RelationshipType,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            relationship_type,
            source_id: source_id.into(),
            target_id: target_id.into(),
            amount: None,
            date: None,
            cycle: None,
            description: None,
            metadata: Map::new(),
            last_updated: None,
        }
    }
}

/// Induced subgraph returned by [`expand_graph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResult {
    pub seed_id: String,
    pub nodes: Vec<Entity>,
    pub edges: Vec<Relationship>,
}

impl GraphResult {
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn edge_ids(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.id.as_str()).collect()
    }
}
