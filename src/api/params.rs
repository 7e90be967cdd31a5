//! Query-string validation for the HTTP boundary.
//!
//! Bound violations are rejected here, before any store call is made.

use std::collections::HashMap;

use crate::config::GraphConfig;
use crate::error::{LobbyGraphError, Result};
use crate::graph::{
    parse_relationship_types, EntityType, ExpandRequest, MAX_DEPTH, MAX_EDGE_LIMIT, MIN_DEPTH,
    MIN_EDGE_LIMIT,
};
use crate::store::EntityFilter;

pub const DEFAULT_ENTITY_LIMIT: usize = 20;
pub const MAX_ENTITY_LIMIT: usize = 50;

fn bounded(
    params: &HashMap<String, String>,
    name: &str,
    default: usize,
    min: usize,
    max: usize,
) -> Result<usize> {
    let Some(raw) = params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    let value: i64 = raw.parse().map_err(|_| {
        LobbyGraphError::InvalidArgument(format!("{} must be an integer, got '{}'", name, raw))
    })?;
    if value < min as i64 || value > max as i64 {
        return Err(LobbyGraphError::InvalidArgument(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(value as usize)
}

/// Build an expansion request from `seed_id`, `depth`, `limit` and `types`.
pub fn graph_request(params: &HashMap<String, String>, defaults: &GraphConfig) -> Result<ExpandRequest> {
    let seed_id = params
        .get("seed_id")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| LobbyGraphError::InvalidArgument("seed_id is required".to_string()))?;

    let depth = bounded(params, "depth", defaults.default_depth, MIN_DEPTH, MAX_DEPTH)?;
    let limit = bounded(params, "limit", defaults.default_limit, MIN_EDGE_LIMIT, MAX_EDGE_LIMIT)?;
    let types = parse_relationship_types(params.get("types").map(String::as_str).unwrap_or(""))?;

    Ok(ExpandRequest::new(seed_id)
        .depth(depth)
        .limit(limit)
        .types(types)
        .orphan_edges(defaults.orphan_edges))
}

/// Build an entity listing filter from `q`, `type` and `limit`.
pub fn entity_filter(params: &HashMap<String, String>) -> Result<EntityFilter> {
    let query = match params.get("q") {
        None => None,
        Some(q) if q.trim().is_empty() => {
            return Err(LobbyGraphError::InvalidArgument("q must not be empty".to_string()));
        }
        Some(q) => Some(q.trim().to_string()),
    };
    let entity_type = params
        .get("type")
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::parse::<EntityType>)
        .transpose()?;
    let limit = bounded(params, "limit", DEFAULT_ENTITY_LIMIT, 1, MAX_ENTITY_LIMIT)?;

    Ok(EntityFilter {
        query,
        entity_type,
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{OrphanEdges, RelationshipType};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_graph_request_defaults() {
        let req = graph_request(&params(&[("seed_id", "E1")]), &GraphConfig::default()).unwrap();
        assert_eq!(req.seed_id, "E1");
        assert_eq!(req.depth, 1);
        assert_eq!(req.limit, 200);
        assert_eq!(req.types, RelationshipType::ALL.to_vec());
        assert_eq!(req.orphan_edges, OrphanEdges::Keep);
    }

    #[test]
    fn test_graph_request_rejects_out_of_range() {
        let defaults = GraphConfig::default();
        for (key, value) in [("depth", "0"), ("depth", "3"), ("limit", "0"), ("limit", "501"), ("limit", "-4")] {
            let err = graph_request(&params(&[("seed_id", "E1"), (key, value)]), &defaults).unwrap_err();
            assert!(matches!(err, LobbyGraphError::InvalidArgument(_)), "{}={}", key, value);
        }
        let err = graph_request(&params(&[("seed_id", "E1"), ("depth", "two")]), &defaults).unwrap_err();
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_graph_request_requires_seed() {
        let defaults = GraphConfig::default();
        assert!(graph_request(&params(&[]), &defaults).is_err());
        assert!(graph_request(&params(&[("seed_id", "  ")]), &defaults).is_err());
    }

    #[test]
    fn test_graph_request_keeps_seed_verbatim() {
        let req = graph_request(&params(&[("seed_id", " E1")]), &GraphConfig::default()).unwrap();
        assert_eq!(req.seed_id, " E1");
    }

    #[test]
    fn test_entity_filter() {
        let filter = entity_filter(&params(&[("q", " acme "), ("type", "company")])).unwrap();
        assert_eq!(filter.query.as_deref(), Some("acme"));
        assert_eq!(filter.entity_type, Some(EntityType::Company));
        assert_eq!(filter.limit, DEFAULT_ENTITY_LIMIT);

        assert!(entity_filter(&params(&[("q", "")])).is_err());
        assert!(entity_filter(&params(&[("type", "document")])).is_err());
        assert!(entity_filter(&params(&[("limit", "51")])).is_err());
    }
}
