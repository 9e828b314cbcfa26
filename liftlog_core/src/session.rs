//! Workout session state machine.
//!
//! A session moves through `not_started -> in_progress -> completed`. The
//! in-progress phase is an [`ActiveSession`] (created directly by
//! [`start_session`]; nothing represents "not started"), and completion
//! consumes it into an immutable [`CompletedSession`] with the per-muscle
//! volume totals computed once and frozen. Callers serialize mutations to a
//! given session; the types themselves hold no locks.

use crate::catalog::ExerciseCatalog;
use crate::types::{
    ActiveSession, CompletedSession, EntryStatus, PerformedSet, PlannedSet, Routine, SessionEntry,
};
use crate::{metrics, Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// What `complete` requires of the remaining entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Pending entries are treated as not performed (the default)
    #[default]
    AllowPartial,
    /// Every entry must be done; otherwise completion fails
    RequireAllDone,
}

/// Start a session from one day of a routine.
///
/// Builds one pending entry per block x target set, with `planned` copied
/// from the block targets. Set indices are assigned per exercise across the
/// whole day, so a routine that repeats an exercise in two blocks still
/// yields a unique (exercise_id, set_index) key for every entry.
///
/// Fails with `NotFound` when `day_index` does not address a day of the
/// routine.
pub fn start_session(
    routine: &Routine,
    day_index: usize,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<ActiveSession> {
    let day = routine.days.get(day_index).ok_or_else(|| {
        Error::NotFound(format!(
            "routine '{}' has no day at index {day_index}",
            routine.id
        ))
    })?;

    let mut next_index: HashMap<&str, u32> = HashMap::new();
    let mut entries = Vec::new();

    for block in &day.blocks {
        let planned = PlannedSet {
            reps: block.target_reps.unwrap_or(0),
            weight: block.target_weight.unwrap_or(0.0),
            rest_seconds: block.rest_seconds.unwrap_or(0),
        };

        let counter = next_index.entry(block.exercise_id.as_str()).or_insert(0);
        for _ in 0..block.target_sets {
            entries.push(SessionEntry {
                exercise_id: block.exercise_id.clone(),
                set_index: *counter,
                planned: planned.clone(),
                performed: None,
                status: EntryStatus::Pending,
            });
            *counter += 1;
        }
    }

    tracing::info!(
        routine = %routine.id,
        entries = entries.len(),
        "started session"
    );

    Ok(ActiveSession {
        id: Uuid::new_v4(),
        routine_id: routine.id.clone(),
        date,
        entries,
        started_at: now,
    })
}

impl ActiveSession {
    /// Record what was lifted for one set.
    ///
    /// Replaces the entry's `performed` record and marks it done. Fails with
    /// `NotFound` when no entry matches the (exercise_id, set_index) key.
    /// Calling again for the same key overwrites the previous record rather
    /// than duplicating the entry.
    pub fn mark_set_performed(
        &mut self,
        exercise_id: &str,
        set_index: u32,
        performed: PerformedSet,
    ) -> Result<()> {
        if let Some(effort) = performed.effort {
            if !(1..=10).contains(&effort) {
                return Err(Error::validation(
                    "performed.effort",
                    format!("must be between 1 and 10, got {effort}"),
                ));
            }
        }

        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.exercise_id == exercise_id && e.set_index == set_index)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no entry for exercise '{exercise_id}' set {set_index}"
                ))
            })?;

        entry.performed = Some(performed);
        entry.status = EntryStatus::Done;

        tracing::debug!(exercise = exercise_id, set = set_index, "set performed");
        Ok(())
    }

    /// Number of entries still pending
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Pending)
            .count()
    }

    /// Complete the session, freezing it into a [`CompletedSession`].
    ///
    /// Under `RequireAllDone` the call fails with `IncompleteSession` while
    /// entries remain pending; under `AllowPartial` pending entries simply
    /// contribute nothing. The per-muscle volume totals are computed here,
    /// over performed entries only, and never recomputed afterwards.
    pub fn complete(
        self,
        catalog: &ExerciseCatalog,
        policy: CompletionPolicy,
        duration_seconds: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<CompletedSession> {
        let remaining = self.pending_count();
        if policy == CompletionPolicy::RequireAllDone && remaining > 0 {
            return Err(Error::IncompleteSession { remaining });
        }

        let muscle_volume = muscle_volume_totals(&self.entries, catalog);

        tracing::info!(
            session = %self.id,
            skipped = remaining,
            "completed session"
        );

        Ok(CompletedSession {
            id: self.id,
            routine_id: self.routine_id,
            date: self.date,
            entries: self.entries,
            duration_seconds,
            muscle_volume,
            started_at: self.started_at,
            completed_at: now,
        })
    }
}

/// Sum performed-set volume per primary muscle group.
///
/// Entries whose exercise is not in the catalog are skipped with a warning;
/// a missing mapping should not lose the rest of the session.
fn muscle_volume_totals(
    entries: &[SessionEntry],
    catalog: &ExerciseCatalog,
) -> BTreeMap<crate::types::MuscleGroup, f64> {
    let mut totals = BTreeMap::new();

    for entry in entries {
        let Some(performed) = &entry.performed else {
            continue;
        };
        let Some(exercise) = catalog.get(&entry.exercise_id) else {
            tracing::warn!(
                exercise = %entry.exercise_id,
                "exercise missing from catalog, excluded from volume totals"
            );
            continue;
        };

        let volume = metrics::set_volume(performed.weight, performed.reps);
        *totals.entry(exercise.primary_muscle).or_insert(0.0) += volume;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::types::{RoutineDay, RoutineDayBlock};
    use std::collections::HashSet;

    fn block(exercise_id: &str, sets: u32, reps: u32, weight: f64) -> RoutineDayBlock {
        RoutineDayBlock {
            exercise_id: exercise_id.into(),
            target_sets: sets,
            target_reps: Some(reps),
            target_weight: Some(weight),
            rest_seconds: Some(120),
            notes: None,
        }
    }

    fn test_routine() -> Routine {
        let mut routine = Routine::new("push_pull", "Push/Pull", Utc::now());
        routine.days.push(RoutineDay {
            weekday: 0,
            blocks: vec![
                block("bench_press", 3, 5, 80.0),
                block("barbell_row", 3, 8, 60.0),
            ],
        });
        routine
    }

    fn performed(reps: u32, weight: f64) -> PerformedSet {
        PerformedSet {
            reps,
            weight,
            effort: Some(7),
            notes: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_start_session_all_pending() {
        let session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        assert_eq!(session.entries.len(), 6);
        assert!(session
            .entries
            .iter()
            .all(|e| e.status == EntryStatus::Pending && e.performed.is_none()));
        assert_eq!(session.entries[0].planned.reps, 5);
        assert_eq!(session.entries[0].planned.weight, 80.0);
    }

    #[test]
    fn test_start_session_unknown_day() {
        let result = start_session(&test_routine(), 3, today(), Utc::now());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_entry_keys_unique_with_repeated_exercise() {
        let mut routine = test_routine();
        // Same exercise appears in two blocks of the same day
        routine.days[0]
            .blocks
            .push(block("bench_press", 2, 10, 60.0));

        let session = start_session(&routine, 0, today(), Utc::now()).unwrap();

        let mut seen = HashSet::new();
        for entry in &session.entries {
            assert!(
                seen.insert((entry.exercise_id.clone(), entry.set_index)),
                "duplicate key {:?}",
                (&entry.exercise_id, entry.set_index)
            );
        }

        // Second bench block continues the index sequence
        let bench_indices: Vec<u32> = session
            .entries
            .iter()
            .filter(|e| e.exercise_id == "bench_press")
            .map(|e| e.set_index)
            .collect();
        assert_eq!(bench_indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_mark_set_performed_updates_only_that_entry() {
        let mut session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        session
            .mark_set_performed("bench_press", 1, performed(5, 80.0))
            .unwrap();

        for entry in &session.entries {
            if entry.exercise_id == "bench_press" && entry.set_index == 1 {
                assert_eq!(entry.status, EntryStatus::Done);
                assert_eq!(entry.performed.as_ref().unwrap().reps, 5);
            } else {
                assert_eq!(entry.status, EntryStatus::Pending);
            }
        }
    }

    #[test]
    fn test_mark_set_performed_overwrites_on_repeat() {
        let mut session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        session
            .mark_set_performed("bench_press", 0, performed(5, 80.0))
            .unwrap();
        session
            .mark_set_performed("bench_press", 0, performed(4, 82.5))
            .unwrap();

        assert_eq!(session.entries.len(), 6);
        let entry = session
            .entries
            .iter()
            .find(|e| e.exercise_id == "bench_press" && e.set_index == 0)
            .unwrap();
        assert_eq!(entry.performed.as_ref().unwrap().weight, 82.5);
    }

    #[test]
    fn test_mark_set_performed_unknown_key() {
        let mut session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        let result = session.mark_set_performed("deadlift", 0, performed(5, 100.0));
        assert!(matches!(result, Err(Error::NotFound(_))));

        let result = session.mark_set_performed("bench_press", 99, performed(5, 80.0));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_mark_set_performed_rejects_bad_effort() {
        let mut session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        let mut set = performed(5, 80.0);
        set.effort = Some(11);
        let result = session.mark_set_performed("bench_press", 0, set);
        assert!(matches!(result, Err(Error::Validation(_))));

        let mut set = performed(5, 80.0);
        set.effort = Some(0);
        assert!(session
            .mark_set_performed("bench_press", 0, set)
            .is_err());
    }

    #[test]
    fn test_complete_partial_allowed_by_default() {
        let catalog = build_default_catalog();
        let mut session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        session
            .mark_set_performed("bench_press", 0, performed(5, 80.0))
            .unwrap();

        let completed = session
            .complete(&catalog, CompletionPolicy::AllowPartial, Some(1800), Utc::now())
            .unwrap();

        assert_eq!(completed.duration_seconds, Some(1800));
        // Only the one performed set contributes volume
        let chest = completed.muscle_volume[&crate::types::MuscleGroup::Chest];
        assert!((chest - 400.0).abs() < 1e-9);
        assert!(!completed
            .muscle_volume
            .contains_key(&crate::types::MuscleGroup::Back));
    }

    #[test]
    fn test_complete_strict_fails_with_remaining_count() {
        let catalog = build_default_catalog();
        let mut session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        session
            .mark_set_performed("bench_press", 0, performed(5, 80.0))
            .unwrap();

        let result = session.complete(
            &catalog,
            CompletionPolicy::RequireAllDone,
            None,
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(Error::IncompleteSession { remaining: 5 })
        ));
    }

    #[test]
    fn test_complete_sums_volume_per_muscle() {
        let catalog = build_default_catalog();
        let mut session = start_session(&test_routine(), 0, today(), Utc::now()).unwrap();

        for set_index in 0..3 {
            session
                .mark_set_performed("bench_press", set_index, performed(5, 80.0))
                .unwrap();
            session
                .mark_set_performed("barbell_row", set_index, performed(8, 60.0))
                .unwrap();
        }

        let completed = session
            .complete(&catalog, CompletionPolicy::RequireAllDone, None, Utc::now())
            .unwrap();

        let chest = completed.muscle_volume[&crate::types::MuscleGroup::Chest];
        let back = completed.muscle_volume[&crate::types::MuscleGroup::Back];
        assert!((chest - 1200.0).abs() < 1e-9); // 3 x 5 x 80
        assert!((back - 1440.0).abs() < 1e-9); // 3 x 8 x 60
    }

    #[test]
    fn test_unknown_exercise_excluded_from_totals() {
        let catalog = build_default_catalog();
        let mut routine = test_routine();
        routine.days[0].blocks.push(block("mystery_lift", 1, 5, 50.0));

        let mut session = start_session(&routine, 0, today(), Utc::now()).unwrap();
        session
            .mark_set_performed("mystery_lift", 0, performed(5, 50.0))
            .unwrap();

        let completed = session
            .complete(&catalog, CompletionPolicy::AllowPartial, None, Utc::now())
            .unwrap();
        assert!(completed.muscle_volume.is_empty());
    }
}
