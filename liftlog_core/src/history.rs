//! Persistence helpers over the storage abstraction.
//!
//! Everything the application keeps between launches flows through here:
//! the per-owner completed-session log, the explicit "current session"
//! slot, routines, the profile, measurements and cardio logs. Keys follow
//! the `entityType/ownerId/entityId` convention so profiles never collide
//! in a shared store.

use crate::storage::{entity_key, load_json, owner_prefix, save_json, Store};
use crate::types::{
    ActiveSession, CardioLog, CompletedSession, Measurement, Profile, Routine,
};
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// Slot id for the single in-progress session of an owner.
///
/// This is the explicit replacement for a process-wide "current session"
/// singleton; the application shell owns its lifecycle.
const CURRENT_SESSION_SLOT: &str = "current";

// ============================================================================
// Completed-session log
// ============================================================================

/// Append a completed session to the owner's log
pub async fn append_completed(
    store: &dyn Store,
    owner: &str,
    session: &CompletedSession,
) -> Result<()> {
    let key = entity_key("sessionlog", owner, &session.id.to_string());
    save_json(store, &key, session).await?;
    tracing::debug!(session = %session.id, owner, "appended session to log");
    Ok(())
}

/// Load the owner's completed sessions, newest first.
///
/// Records that fail to deserialize are skipped with a warning; one bad
/// document must not hide the rest of the history.
pub async fn load_completed(store: &dyn Store, owner: &str) -> Result<Vec<CompletedSession>> {
    let prefix = owner_prefix("sessionlog", owner);
    let mut sessions = Vec::new();

    for key in store.keys().await? {
        if !key.starts_with(&prefix) {
            continue;
        }
        match load_json::<CompletedSession>(store, &key).await {
            Ok(Some(session)) => sessions.push(session),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("skipping malformed session log at '{}': {}", key, e);
            }
        }
    }

    sessions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.completed_at.cmp(&a.completed_at))
    });

    tracing::debug!(owner, count = sessions.len(), "loaded session history");
    Ok(sessions)
}

// ============================================================================
// Current-session slot
// ============================================================================

/// Persist the in-progress session into the owner's current slot
pub async fn save_active(store: &dyn Store, owner: &str, session: &ActiveSession) -> Result<()> {
    let key = entity_key("session", owner, CURRENT_SESSION_SLOT);
    save_json(store, &key, session).await
}

/// Load the in-progress session, if one exists
pub async fn load_active(store: &dyn Store, owner: &str) -> Result<Option<ActiveSession>> {
    let key = entity_key("session", owner, CURRENT_SESSION_SLOT);
    load_json(store, &key).await
}

/// Clear the current slot (after completion or abandonment)
pub async fn clear_active(store: &dyn Store, owner: &str) -> Result<()> {
    let key = entity_key("session", owner, CURRENT_SESSION_SLOT);
    store.remove(&key).await
}

// ============================================================================
// Routines and profile
// ============================================================================

pub async fn save_routine(store: &dyn Store, owner: &str, routine: &Routine) -> Result<()> {
    let key = entity_key("routine", owner, &routine.id);
    save_json(store, &key, routine).await
}

/// Load a single routine, failing with `NotFound` when absent
pub async fn load_routine(store: &dyn Store, owner: &str, routine_id: &str) -> Result<Routine> {
    let key = entity_key("routine", owner, routine_id);
    load_json(store, &key)
        .await?
        .ok_or_else(|| Error::NotFound(format!("routine '{routine_id}'")))
}

/// Load all routines of an owner, ordered by name
pub async fn load_routines(store: &dyn Store, owner: &str) -> Result<Vec<Routine>> {
    let prefix = owner_prefix("routine", owner);
    let mut routines = Vec::new();

    for key in store.keys().await? {
        if !key.starts_with(&prefix) {
            continue;
        }
        match load_json::<Routine>(store, &key).await {
            Ok(Some(routine)) => routines.push(routine),
            Ok(None) => {}
            Err(e) => tracing::warn!("skipping malformed routine at '{}': {}", key, e),
        }
    }

    routines.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(routines)
}

pub async fn save_profile(store: &dyn Store, profile: &Profile) -> Result<()> {
    let key = entity_key("profile", &profile.id, "self");
    save_json(store, &key, profile).await
}

pub async fn load_profile(store: &dyn Store, owner: &str) -> Result<Option<Profile>> {
    let key = entity_key("profile", owner, "self");
    load_json(store, &key).await
}

// ============================================================================
// Measurements and cardio logs
// ============================================================================

/// Save a measurement keyed by its date; a second measurement on the same
/// day replaces the first (last write wins)
pub async fn save_measurement(
    store: &dyn Store,
    owner: &str,
    measurement: &Measurement,
) -> Result<()> {
    let key = entity_key("measurement", owner, &measurement.date.to_string());
    save_json(store, &key, measurement).await
}

/// Load measurements ordered oldest first (a time series)
pub async fn load_measurements(store: &dyn Store, owner: &str) -> Result<Vec<Measurement>> {
    let prefix = owner_prefix("measurement", owner);
    let mut measurements = Vec::new();

    for key in store.keys().await? {
        if !key.starts_with(&prefix) {
            continue;
        }
        match load_json::<Measurement>(store, &key).await {
            Ok(Some(m)) => measurements.push(m),
            Ok(None) => {}
            Err(e) => tracing::warn!("skipping malformed measurement at '{}': {}", key, e),
        }
    }

    measurements.sort_by_key(|m| m.date);
    Ok(measurements)
}

/// Append a cardio log under a fresh id
pub async fn append_cardio(store: &dyn Store, owner: &str, log: &CardioLog) -> Result<()> {
    let key = entity_key("cardio", owner, &Uuid::new_v4().to_string());
    save_json(store, &key, log).await
}

/// Load cardio logs, newest first
pub async fn load_cardio(store: &dyn Store, owner: &str) -> Result<Vec<CardioLog>> {
    let prefix = owner_prefix("cardio", owner);
    let mut logs = Vec::new();

    for key in store.keys().await? {
        if !key.starts_with(&prefix) {
            continue;
        }
        match load_json::<CardioLog>(store, &key).await {
            Ok(Some(log)) => logs.push(log),
            Ok(None) => {}
            Err(e) => tracing::warn!("skipping malformed cardio log at '{}': {}", key, e),
        }
    }

    logs.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(logs)
}

// ============================================================================
// CSV export
// ============================================================================

/// A row in the CSV export
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    routine_id: String,
    date: String,
    entries: usize,
    performed_entries: usize,
    duration_seconds: Option<u32>,
    total_volume: f64,
    completed_at: String,
}

impl From<&CompletedSession> for CsvRow {
    fn from(session: &CompletedSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            routine_id: session.routine_id.clone(),
            date: session.date.to_string(),
            entries: session.entries.len(),
            performed_entries: session
                .entries
                .iter()
                .filter(|e| e.performed.is_some())
                .count(),
            duration_seconds: session.duration_seconds,
            total_volume: session.muscle_volume.values().sum(),
            completed_at: session.completed_at.to_rfc3339(),
        }
    }
}

/// Export completed sessions to CSV, one row per session.
///
/// Appends to an existing file, writing headers only when the file is new
/// or empty, and fsyncs before returning. Returns the number of rows
/// written.
pub fn export_sessions_csv(sessions: &[CompletedSession], path: &Path) -> Result<usize> {
    if sessions.is_empty() {
        tracing::info!("no sessions to export");
        return Ok(0);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in sessions {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!(rows = sessions.len(), "exported sessions to CSV");
    Ok(sessions.len())
}
