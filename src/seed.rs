//! One-shot bulk seeding from the JSON fixture document.

use crate::error::AppError;
use crate::location::NewLocation;
use crate::store;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use std::path::Path;

/// External fixture keys renamed to internal column names at ingestion.
/// An alias never overwrites a record that already uses the internal name.
pub const FIXTURE_KEY_ALIASES: &[(&str, &str)] = &[
    ("locations", "loca"),
    ("Layout", "layout_info"),
];

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub attempted: usize,
}

/// Load the fixture and insert every valid record in a single transaction.
/// Records missing required fields are logged and skipped; if none survive,
/// the transaction rolls back and the call fails with a data-format error.
///
/// The caller is responsible for the secret check and the emptiness guard.
pub async fn run(pool: &SqlitePool, fixture_path: &Path) -> Result<SeedReport, AppError> {
    let raw = tokio::fs::read_to_string(fixture_path).await.map_err(|err| {
        AppError::Fixture(format!(
            "fixture file {} unreadable: {err}",
            fixture_path.display()
        ))
    })?;
    let records = parse_fixture(&raw)?;
    let attempted = records.len();

    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<NewLocation>(Value::Object(remap_keys(record))) {
            Ok(new) => {
                store::insert_tx(&mut *tx, &new).await?;
                inserted += 1;
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping fixture record");
            }
        }
    }
    if inserted == 0 {
        // Dropping the uncommitted transaction rolls everything back.
        return Err(AppError::Fixture(
            "fixture contained no valid location records".into(),
        ));
    }
    tx.commit().await?;
    tracing::info!(inserted, attempted, "seed committed");
    Ok(SeedReport {
        inserted,
        attempted,
    })
}

fn parse_fixture(raw: &str) -> Result<Vec<Map<String, Value>>, AppError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|err| AppError::Fixture(format!("fixture is not valid JSON: {err}")))?;
    let entries = doc
        .get("locations")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AppError::Fixture("fixture must contain a top-level \"locations\" array".into())
        })?;
    entries
        .iter()
        .map(|entry| match entry {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(AppError::Fixture(
                "fixture \"locations\" entries must be objects".into(),
            )),
        })
        .collect()
}

/// Apply [`FIXTURE_KEY_ALIASES`] to one raw record.
fn remap_keys(mut record: Map<String, Value>) -> Map<String, Value> {
    for (external, internal) in FIXTURE_KEY_ALIASES {
        if record.contains_key(*internal) {
            record.remove(*external);
            continue;
        }
        if let Some(value) = record.remove(*external) {
            record.insert((*internal).to_string(), value);
        }
    }
    record
}
