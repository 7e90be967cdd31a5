//! Offline fixture import: upserts entities and relationships from JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::db::Db;
use crate::error::{LobbyGraphError, Result};
use crate::graph::{Entity, Relationship};

/// On-disk fixture shape: `{"entities": [...], "relationships": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GraphFixture {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub entities: usize,
    pub relationships: usize,
}

/// Read and parse a fixture file.
pub fn read_fixture(path: &Path) -> Result<GraphFixture> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| LobbyGraphError::Parse(format!("{}: {}", path.display(), e)))
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn metadata_json(map: &serde_json::Map<String, serde_json::Value>) -> Result<String> {
    serde_json::to_string(map).map_err(|e| LobbyGraphError::Parse(e.to_string()))
}

/// Upsert every row of the fixture in a single transaction.
pub async fn import_fixture(db: &Db, fixture: GraphFixture) -> Result<ImportStats> {
    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO entities (
                    id, type, name, description, party, state, industry,
                    total_lobbying, total_donations, metadata_json, last_updated
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(id) DO UPDATE SET
                    type = excluded.type,
                    name = excluded.name,
                    description = excluded.description,
                    party = excluded.party,
                    state = excluded.state,
                    industry = excluded.industry,
                    total_lobbying = excluded.total_lobbying,
                    total_donations = excluded.total_donations,
                    metadata_json = excluded.metadata_json,
                    last_updated = excluded.last_updated
                "#,
            )?;
            for e in &fixture.entities {
                stmt.execute(params![
                    e.id,
                    e.entity_type.as_str(),
                    e.name,
                    e.description,
                    e.party,
                    e.state,
                    e.industry,
                    e.total_lobbying,
                    e.total_donations,
                    metadata_json(&e.metadata)?,
                    format_timestamp(e.last_updated),
                ])?;
            }

            let mut stmt = tx.prepare(
                r#"
                INSERT INTO relationships (
                    id, type, source_id, target_id, amount, date, cycle,
                    description, metadata_json, last_updated
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(id) DO UPDATE SET
                    type = excluded.type,
                    source_id = excluded.source_id,
                    target_id = excluded.target_id,
                    amount = excluded.amount,
                    date = excluded.date,
                    cycle = excluded.cycle,
                    description = excluded.description,
                    metadata_json = excluded.metadata_json,
                    last_updated = excluded.last_updated
                "#,
            )?;
            for r in &fixture.relationships {
                stmt.execute(params![
                    r.id,
                    r.relationship_type.as_str(),
                    r.source_id,
                    r.target_id,
                    r.amount,
                    r.date.map(|d| d.format("%Y-%m-%d").to_string()),
                    r.cycle,
                    r.description,
                    metadata_json(&r.metadata)?,
                    format_timestamp(r.last_updated),
                ])?;
            }
        }
        tx.commit()?;

        Ok(ImportStats {
            entities: fixture.entities.len(),
            relationships: fixture.relationships.len(),
        })
    })
    .await
}
