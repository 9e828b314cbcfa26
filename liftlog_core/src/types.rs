//! Core domain types for the liftlog workout tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their properties
//! - Routines, routine days and per-day blocks
//! - Workout sessions and planned/performed entries
//! - Body measurements and cardio logs
//! - Personal records and profiles

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Muscle group targeted by an exercise
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    FullBody,
}

impl std::fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Forearms => "forearms",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
            MuscleGroup::Core => "core",
            MuscleGroup::FullBody => "full_body",
        };
        f.write_str(name)
    }
}

/// Equipment category for an exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Machine,
    Cable,
    Bodyweight,
    Band,
    /// Free-form equipment not covered by the fixed set
    Other(String),
}

/// Difficulty rating for an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// An exercise definition (e.g. "Barbell Back Squat")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub primary_muscle: MuscleGroup,
    pub secondary_muscles: Vec<MuscleGroup>,
    pub equipment: Equipment,
    pub difficulty: Difficulty,
    pub media_url: Option<String>,
    pub instructions: Vec<String>,
}

// ============================================================================
// Routine Types
// ============================================================================

/// One exercise slot within a routine day
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutineDayBlock {
    pub exercise_id: String,
    pub target_sets: u32,
    pub target_reps: Option<u32>,
    pub target_weight: Option<f64>,
    pub rest_seconds: Option<u32>,
    pub notes: Option<String>,
}

/// A single training day within a routine, keyed by weekday (0 = Monday .. 6 = Sunday)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutineDay {
    pub weekday: u8,
    pub blocks: Vec<RoutineDayBlock>,
}

/// A workout routine: an ordered collection of training days
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub goal: Option<String>,
    pub days: Vec<RoutineDay>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Routine {
    /// Create a routine with both timestamps set to `now`
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            goal: None,
            days: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// Targets for a set, copied from the routine block when a session starts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedSet {
    pub reps: u32,
    pub weight: f64,
    pub rest_seconds: u32,
}

/// What was actually lifted for a set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformedSet {
    pub reps: u32,
    pub weight: f64,
    /// Perceived effort on a 1-10 scale
    pub effort: Option<u8>,
    pub notes: Option<String>,
}

/// Lifecycle status of a session entry; only ever moves Pending -> Done
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Done,
}

/// A single planned/performed set within a session.
///
/// The (exercise_id, set_index) pair is unique within a session; the state
/// machine enforces this when entries are constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionEntry {
    pub exercise_id: String,
    pub set_index: u32,
    pub planned: PlannedSet,
    pub performed: Option<PerformedSet>,
    pub status: EntryStatus,
}

/// A workout session that is still being executed.
///
/// Created directly in progress when a routine is started; there is no
/// object for the conceptual "not started" state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveSession {
    pub id: Uuid,
    pub routine_id: String,
    pub date: NaiveDate,
    pub entries: Vec<SessionEntry>,
    pub started_at: DateTime<Utc>,
}

/// A finished workout session, frozen at completion.
///
/// This is a distinct type so a completed session can never be mutated or
/// fed back through the state machine: completion consumes the
/// `ActiveSession` and the aggregate totals are computed exactly once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletedSession {
    pub id: Uuid,
    pub routine_id: String,
    pub date: NaiveDate,
    pub entries: Vec<SessionEntry>,
    pub duration_seconds: Option<u32>,
    /// Training volume per primary muscle group, summed over performed
    /// entries only; frozen at completion
    pub muscle_volume: BTreeMap<MuscleGroup, f64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

// ============================================================================
// Measurement and Cardio Types
// ============================================================================

/// A body measurement time-series row
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Measurement {
    pub date: NaiveDate,
    pub body_weight_kg: f64,
    pub body_fat_pct: Option<f64>,
    pub notes: Option<String>,
}

/// A logged cardio activity.
///
/// `pace_seconds_per_km` is always derived from distance and duration; build
/// instances through [`CardioLog::new`] so the invariant holds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardioLog {
    pub date: NaiveDate,
    pub activity: String,
    pub distance_km: f64,
    pub duration_seconds: f64,
    pub pace_seconds_per_km: f64,
}

impl CardioLog {
    /// Build a cardio log with the pace derived from distance and duration
    pub fn new(
        date: NaiveDate,
        activity: impl Into<String>,
        distance_km: f64,
        duration_seconds: f64,
    ) -> crate::Result<Self> {
        let pace = crate::metrics::pace(distance_km, duration_seconds)?;
        Ok(Self {
            date,
            activity: activity.into(),
            distance_km,
            duration_seconds,
            pace_seconds_per_km: pace,
        })
    }
}

// ============================================================================
// Personal Record and Profile Types
// ============================================================================

/// A derived personal record for an exercise.
///
/// `estimated_one_rep_max` always equals the metrics engine's output for
/// (weight, reps); records are produced by the progress aggregator, never
/// authored by hand.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
    pub estimated_one_rep_max: f64,
}

/// Which day a calendar week begins on
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

/// The owning user profile; storage keys are namespaced by its id
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub weight_unit: WeightUnit,
    pub distance_unit: DistanceUnit,
    pub week_starts_on: WeekStart,
}

// ============================================================================
// Unit Types
// ============================================================================

/// Weight unit for display and conversion
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

/// Distance unit for display and conversion
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Km,
    Mi,
}
