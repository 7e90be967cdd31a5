//! SQLite-backed store over the `entities` and `relationships` tables.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params_from_iter, Connection, Row, ToSql};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{EntityCatalog, EntityFilter, GraphStore};
use crate::db::Db;
use crate::graph::{Entity, Relationship, RelationshipType};
use crate::{LobbyGraphError, Result};

const ENTITY_COLUMNS: &str = "id, type, name, description, party, state, industry, \
     total_lobbying, total_donations, metadata_json, last_updated";

const RELATIONSHIP_COLUMNS: &str = "id, type, source_id, target_id, amount, date, cycle, \
     description, metadata_json, last_updated";

/// Bound parameters per `IN (...)` batch; stays under SQLite's historical 999 limit.
const MAX_IN_PARAMS: usize = 900;

/// Read-only graph queries against a [`Db`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Db,
}

impl SqliteStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn relationships_by_endpoint(
        &self,
        column: &'static str,
        ids: &BTreeSet<String>,
        types: &[RelationshipType],
        limit: usize,
    ) -> Result<Vec<Relationship>> {
        if ids.is_empty() || types.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().cloned().collect();
        let types: Vec<&'static str> = types.iter().map(|t| t.as_str()).collect();

        self.db
            .with_connection(move |conn| {
                let mut out: Vec<Relationship> = Vec::new();
                for chunk in ids.chunks(MAX_IN_PARAMS) {
                    let remaining = limit - out.len();
                    if remaining == 0 {
                        break;
                    }
                    let query = format!(
                        "SELECT {} FROM relationships WHERE {} IN ({}) AND type IN ({}) \
                         ORDER BY id LIMIT ?",
                        RELATIONSHIP_COLUMNS,
                        column,
                        placeholders(chunk.len()),
                        placeholders(types.len()),
                    );
                    let mut params: Vec<Box<dyn ToSql>> = Vec::with_capacity(chunk.len() + types.len() + 1);
                    for id in chunk {
                        params.push(Box::new(id.clone()));
                    }
                    for t in &types {
                        params.push(Box::new(*t));
                    }
                    params.push(Box::new(remaining as i64));

                    let mut stmt = conn.prepare(&query)?;
                    let rows = stmt.query_map(params_from_iter(params), relationship_from_row)?;
                    for row in rows {
                        out.push(row?);
                    }
                }
                Ok(out)
            })
            .await
    }
}

#[async_trait]
impl GraphStore for SqliteStore {
    async fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let query = format!("SELECT {} FROM entities WHERE id = ?1 LIMIT 1", ENTITY_COLUMNS);
                let mut stmt = conn.prepare(&query)?;
                let mut rows = stmt.query_map([&id], entity_from_row)?;
                let entity = rows.next().transpose()?;
                Ok(entity)
            })
            .await
    }

    async fn get_entities_by_ids(&self, ids: &BTreeSet<String>) -> Result<Vec<Entity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().cloned().collect();
        self.db
            .with_connection(move |conn| {
                let mut out = Vec::with_capacity(ids.len());
                for chunk in ids.chunks(MAX_IN_PARAMS) {
                    out.extend(select_entities_in(conn, chunk)?);
                }
                Ok(out)
            })
            .await
    }

    async fn relationships_by_source(
        &self,
        ids: &BTreeSet<String>,
        types: &[RelationshipType],
        limit: usize,
    ) -> Result<Vec<Relationship>> {
        self.relationships_by_endpoint("source_id", ids, types, limit).await
    }

    async fn relationships_by_target(
        &self,
        ids: &BTreeSet<String>,
        types: &[RelationshipType],
        limit: usize,
    ) -> Result<Vec<Relationship>> {
        self.relationships_by_endpoint("target_id", ids, types, limit).await
    }
}

#[async_trait]
impl EntityCatalog for SqliteStore {
    async fn list_entities(&self, filter: &EntityFilter) -> Result<Vec<Entity>> {
        let entity_type = filter.entity_type.map(|t| t.as_str());
        let pattern = filter
            .query
            .as_deref()
            .map(|q| format!("%{}%", escape_like(q)));
        let limit = filter.limit as i64;

        self.db
            .with_connection(move |conn| {
                let query = format!(
                    "SELECT {} FROM entities \
                     WHERE (?1 IS NULL OR type = ?1) \
                       AND (?2 IS NULL OR name LIKE ?2 ESCAPE '\\' OR description LIKE ?2 ESCAPE '\\') \
                     ORDER BY last_updated IS NULL, last_updated DESC, id \
                     LIMIT ?3",
                    ENTITY_COLUMNS
                );
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map(
                    rusqlite::params![entity_type, pattern, limit],
                    entity_from_row,
                )?;
                rows.collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
                    .map_err(LobbyGraphError::from)
            })
            .await
    }
}

fn select_entities_in(conn: &Connection, ids: &[String]) -> Result<Vec<Entity>> {
    let query = format!(
        "SELECT {} FROM entities WHERE id IN ({})",
        ENTITY_COLUMNS,
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map(params_from_iter(ids.iter()), entity_from_row)?;
    rows.collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
        .map_err(LobbyGraphError::from)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn metadata_at(row: &Row, idx: usize) -> rusqlite::Result<Map<String, Value>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
        }
        _ => Ok(Map::new()),
    }
}

fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let Some(raw) = row.get::<_, Option<String>>(idx)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    // No offset (ISO `T` form or CURRENT_TIMESTAMP): stored as UTC.
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| conversion_error(idx, e))
}

fn date_at(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn entity_from_row(row: &Row) -> rusqlite::Result<Entity> {
    let type_str: String = row.get(1)?;
    Ok(Entity {
        id: row.get(0)?,
        entity_type: type_str.parse().map_err(|e| conversion_error(1, e))?,
        name: row.get(2)?,
        description: row.get(3)?,
        party: row.get(4)?,
        state: row.get(5)?,
        industry: row.get(6)?,
        total_lobbying: row.get(7)?,
        total_donations: row.get(8)?,
        metadata: metadata_at(row, 9)?,
        last_updated: timestamp_at(row, 10)?,
    })
}

fn relationship_from_row(row: &Row) -> rusqlite::Result<Relationship> {
    let type_str: String = row.get(1)?;
    Ok(Relationship {
        id: row.get(0)?,
        relationship_type: type_str.parse().map_err(|e| conversion_error(1, e))?,
        source_id: row.get(2)?,
        target_id: row.get(3)?,
        amount: row.get(4)?,
        date: date_at(row, 5)?,
        cycle: row.get(6)?,
        description: row.get(7)?,
        metadata: metadata_at(row, 8)?,
        last_updated: timestamp_at(row, 9)?,
    })
}
