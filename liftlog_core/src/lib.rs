#![forbid(unsafe_code)]

//! Core domain model and business logic for the Liftlog workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, routines, sessions, measurements, cardio)
//! - Built-in exercise catalog
//! - Pure metrics engine (one-rep max, volume, pace, conversions, plates)
//! - Session state machine with frozen completion totals
//! - Progress aggregation (week stats, streaks, muscle volume, PRs)
//! - Async pluggable storage (memory, file, remote stub)
//! - Trust-boundary validation and bulk import/export

pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod progress;
pub mod session;
pub mod storage;
pub mod transfer;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseCatalog};
pub use config::Config;
pub use error::{Error, FieldIssue, Result};
pub use metrics::OneRepMaxFormula;
pub use progress::{exercise_frequency, personal_records, volume_by_muscle, week_stats};
pub use session::{start_session, CompletionPolicy};
pub use storage::{FileStore, MemoryStore, RemoteStore, Store};
pub use transfer::{export_bundle, import_bundle, ExportBundle, ImportReport};
pub use types::*;
