//! Trust-boundary validation.
//!
//! Any JSON crossing into the domain (form submission, bulk import, API
//! payload) passes through here first. Each `parse_*` function deserializes
//! an untrusted `serde_json::Value` and then applies the entity's field
//! constraints, accumulating every violation so the caller gets the full
//! field-path -> message picture in one round trip instead of one opaque
//! string.

use crate::error::FieldIssue;
use crate::metrics::{self, OneRepMaxFormula};
use crate::types::{
    CardioLog, CompletedSession, EntryStatus, Exercise, Measurement, PersonalRecord, Profile,
    Routine,
};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

/// Relative tolerance for re-derived numeric fields
const DERIVED_TOLERANCE: f64 = 1e-6;

fn deserialize<T: DeserializeOwned>(value: &Value, entity: &str) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::Validation(vec![FieldIssue::new(entity, e.to_string())]))
}

fn finish<T>(parsed: T, issues: Vec<FieldIssue>) -> Result<T> {
    if issues.is_empty() {
        Ok(parsed)
    } else {
        Err(Error::Validation(issues))
    }
}

/// Parse and validate an exercise payload
pub fn parse_exercise(value: &Value) -> Result<Exercise> {
    let exercise: Exercise = deserialize(value, "exercise")?;
    finish_with(exercise, validate_exercise)
}

/// Parse and validate a routine payload
pub fn parse_routine(value: &Value) -> Result<Routine> {
    let routine: Routine = deserialize(value, "routine")?;
    finish_with(routine, validate_routine)
}

/// Parse and validate a completed-session payload
pub fn parse_completed_session(value: &Value) -> Result<CompletedSession> {
    let session: CompletedSession = deserialize(value, "session")?;
    finish_with(session, validate_completed_session)
}

/// Parse and validate a measurement payload
pub fn parse_measurement(value: &Value) -> Result<Measurement> {
    let measurement: Measurement = deserialize(value, "measurement")?;
    finish_with(measurement, validate_measurement)
}

/// Parse a cardio-log payload.
///
/// The pace field is derived state: whatever the payload claims, it is
/// recomputed from distance and duration here, so an edited pace can never
/// enter the domain.
pub fn parse_cardio_log(value: &Value) -> Result<CardioLog> {
    let mut log: CardioLog = deserialize(value, "cardio_log")?;

    let mut issues = Vec::new();
    if log.activity.is_empty() {
        issues.push(FieldIssue::new("activity", "must not be empty"));
    }
    match metrics::pace(log.distance_km, log.duration_seconds) {
        Ok(pace) => log.pace_seconds_per_km = pace,
        Err(e) => issues.push(FieldIssue::new("distance_km", e.to_string())),
    }

    finish(log, issues)
}

/// Parse and validate a profile payload
pub fn parse_profile(value: &Value) -> Result<Profile> {
    let profile: Profile = deserialize(value, "profile")?;
    finish_with(profile, validate_profile)
}

/// Parse and validate a personal-record payload.
///
/// Records are derived facts: the claimed estimate must match the metrics
/// engine's output for (weight, reps) under one of the supported formulas.
pub fn parse_personal_record(value: &Value) -> Result<PersonalRecord> {
    let record: PersonalRecord = deserialize(value, "personal_record")?;
    finish_with(record, validate_personal_record)
}

fn finish_with<T>(parsed: T, validate: impl Fn(&T) -> Vec<FieldIssue>) -> Result<T> {
    let issues = validate(&parsed);
    finish(parsed, issues)
}

/// Field constraints for an exercise
pub fn validate_exercise(exercise: &Exercise) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if exercise.id.is_empty() {
        issues.push(FieldIssue::new("id", "must not be empty"));
    }
    if exercise.slug.is_empty() {
        issues.push(FieldIssue::new("slug", "must not be empty"));
    }
    if exercise.name.is_empty() {
        issues.push(FieldIssue::new("name", "must not be empty"));
    }
    if let Some(url) = &exercise.media_url {
        if url.is_empty() {
            issues.push(FieldIssue::new("media_url", "must be absent or non-empty"));
        }
    }

    issues
}

/// Field constraints for a routine
pub fn validate_routine(routine: &Routine) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if routine.id.is_empty() {
        issues.push(FieldIssue::new("id", "must not be empty"));
    }
    if routine.name.is_empty() {
        issues.push(FieldIssue::new("name", "must not be empty"));
    }
    if routine.created_at > routine.updated_at {
        issues.push(FieldIssue::new(
            "updated_at",
            "must not precede created_at",
        ));
    }

    for (d, day) in routine.days.iter().enumerate() {
        if day.weekday > 6 {
            issues.push(FieldIssue::new(
                format!("days[{d}].weekday"),
                format!("must be 0-6, got {}", day.weekday),
            ));
        }
        for (b, block) in day.blocks.iter().enumerate() {
            let path = |field: &str| format!("days[{d}].blocks[{b}].{field}");
            if block.exercise_id.is_empty() {
                issues.push(FieldIssue::new(path("exercise_id"), "must not be empty"));
            }
            if block.target_sets == 0 {
                issues.push(FieldIssue::new(path("target_sets"), "must be at least 1"));
            }
            if let Some(weight) = block.target_weight {
                if weight < 0.0 || !weight.is_finite() {
                    issues.push(FieldIssue::new(
                        path("target_weight"),
                        "must be non-negative",
                    ));
                }
            }
        }
    }

    issues
}

/// Convention warnings for a routine that do not reject the payload.
///
/// Reusing a weekday is discouraged but structurally allowed; callers may
/// surface these to the user without refusing the routine.
pub fn routine_advisories(routine: &Routine) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (d, day) in routine.days.iter().enumerate() {
        if !seen.insert(day.weekday) {
            issues.push(FieldIssue::new(
                format!("days[{d}].weekday"),
                format!("weekday {} is used by more than one day", day.weekday),
            ));
        }
    }

    issues
}

/// Field constraints for a completed session
pub fn validate_completed_session(session: &CompletedSession) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if session.routine_id.is_empty() {
        issues.push(FieldIssue::new("routine_id", "must not be empty"));
    }
    if session.started_at > session.completed_at {
        issues.push(FieldIssue::new(
            "completed_at",
            "must not precede started_at",
        ));
    }

    let mut seen = HashSet::new();
    for (i, entry) in session.entries.iter().enumerate() {
        let path = |field: &str| format!("entries[{i}].{field}");

        if !seen.insert((entry.exercise_id.as_str(), entry.set_index)) {
            issues.push(FieldIssue::new(
                path("set_index"),
                format!(
                    "duplicate entry for exercise '{}' set {}",
                    entry.exercise_id, entry.set_index
                ),
            ));
        }
        if entry.planned.weight < 0.0 || !entry.planned.weight.is_finite() {
            issues.push(FieldIssue::new(path("planned.weight"), "must be non-negative"));
        }

        match (&entry.status, &entry.performed) {
            (EntryStatus::Done, None) => {
                issues.push(FieldIssue::new(
                    path("performed"),
                    "entry marked done must carry a performed record",
                ));
            }
            (EntryStatus::Pending, Some(_)) => {
                issues.push(FieldIssue::new(
                    path("status"),
                    "entry with a performed record must be marked done",
                ));
            }
            _ => {}
        }

        if let Some(performed) = &entry.performed {
            if performed.weight < 0.0 || !performed.weight.is_finite() {
                issues.push(FieldIssue::new(
                    path("performed.weight"),
                    "must be non-negative",
                ));
            }
            if let Some(effort) = performed.effort {
                if !(1..=10).contains(&effort) {
                    issues.push(FieldIssue::new(
                        path("performed.effort"),
                        format!("must be between 1 and 10, got {effort}"),
                    ));
                }
            }
        }
    }

    for (muscle, volume) in &session.muscle_volume {
        if *volume < 0.0 || !volume.is_finite() {
            issues.push(FieldIssue::new(
                format!("muscle_volume.{muscle}"),
                "must be non-negative",
            ));
        }
    }

    issues
}

/// Field constraints for a measurement
pub fn validate_measurement(measurement: &Measurement) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if measurement.body_weight_kg <= 0.0 || !measurement.body_weight_kg.is_finite() {
        issues.push(FieldIssue::new("body_weight_kg", "must be positive"));
    }
    if let Some(pct) = measurement.body_fat_pct {
        if !(0.0..=100.0).contains(&pct) {
            issues.push(FieldIssue::new(
                "body_fat_pct",
                format!("must be between 0 and 100, got {pct}"),
            ));
        }
    }

    issues
}

/// Field constraints for a profile
pub fn validate_profile(profile: &Profile) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if profile.id.is_empty() {
        issues.push(FieldIssue::new("id", "must not be empty"));
    }
    if profile.name.is_empty() {
        issues.push(FieldIssue::new("name", "must not be empty"));
    }

    issues
}

/// Field constraints for a personal record
pub fn validate_personal_record(record: &PersonalRecord) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    if record.exercise_id.is_empty() {
        issues.push(FieldIssue::new("exercise_id", "must not be empty"));
    }

    let matches_formula = [OneRepMaxFormula::Epley, OneRepMaxFormula::Brzycki]
        .iter()
        .any(|formula| {
            metrics::estimate_one_rep_max(record.weight, record.reps, *formula)
                .map(|estimate| {
                    let scale = estimate.abs().max(1.0);
                    (estimate - record.estimated_one_rep_max).abs() / scale < DERIVED_TOLERANCE
                })
                .unwrap_or(false)
        });
    if !matches_formula {
        issues.push(FieldIssue::new(
            "estimated_one_rep_max",
            "does not match any supported formula for (weight, reps)",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RoutineDay, RoutineDayBlock};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_parse_routine_accepts_valid_payload() {
        let payload = json!({
            "id": "push_pull",
            "name": "Push/Pull",
            "goal": "strength",
            "days": [{
                "weekday": 0,
                "blocks": [{
                    "exercise_id": "bench_press",
                    "target_sets": 3,
                    "target_reps": 5,
                    "target_weight": 80.0,
                    "rest_seconds": 120,
                    "notes": null
                }]
            }],
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-02T10:00:00Z"
        });

        let routine = parse_routine(&payload).unwrap();
        assert_eq!(routine.days.len(), 1);
    }

    #[test]
    fn test_parse_routine_collects_every_violation() {
        let payload = json!({
            "id": "",
            "name": "",
            "goal": null,
            "days": [{
                "weekday": 9,
                "blocks": [{
                    "exercise_id": "",
                    "target_sets": 0,
                    "target_reps": null,
                    "target_weight": null,
                    "rest_seconds": null,
                    "notes": null
                }]
            }],
            "created_at": "2024-03-02T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        });

        let err = parse_routine(&payload).unwrap_err();
        let issues = err.field_issues().unwrap();

        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"id"));
        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"updated_at"));
        assert!(paths.contains(&"days[0].weekday"));
        assert!(paths.contains(&"days[0].blocks[0].exercise_id"));
        assert!(paths.contains(&"days[0].blocks[0].target_sets"));
    }

    #[test]
    fn test_parse_routine_rejects_wrong_shape() {
        let err = parse_routine(&json!("not an object")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_duplicate_weekday_is_advisory_not_rejection() {
        let mut routine = Routine::new("r", "Doubled Monday", Utc::now());
        let day = RoutineDay {
            weekday: 0,
            blocks: vec![RoutineDayBlock {
                exercise_id: "bench_press".into(),
                target_sets: 3,
                target_reps: Some(5),
                target_weight: None,
                rest_seconds: None,
                notes: None,
            }],
        };
        routine.days.push(day.clone());
        routine.days.push(day);

        assert!(validate_routine(&routine).is_empty());
        let advisories = routine_advisories(&routine);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].path, "days[1].weekday");
    }

    #[test]
    fn test_parse_cardio_log_rederives_pace() {
        let payload = json!({
            "date": "2024-03-04",
            "activity": "run",
            "distance_km": 5.0,
            "duration_seconds": 1500.0,
            "pace_seconds_per_km": 42.0
        });

        let log = parse_cardio_log(&payload).unwrap();
        assert!((log.pace_seconds_per_km - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_cardio_log_rejects_zero_distance() {
        let payload = json!({
            "date": "2024-03-04",
            "activity": "run",
            "distance_km": 0.0,
            "duration_seconds": 1500.0,
            "pace_seconds_per_km": 0.0
        });

        let err = parse_cardio_log(&payload).unwrap_err();
        assert_eq!(err.field_issues().unwrap()[0].path, "distance_km");
    }

    #[test]
    fn test_parse_measurement_bounds() {
        let payload = json!({
            "date": "2024-03-04",
            "body_weight_kg": 0.0,
            "body_fat_pct": 140.0,
            "notes": null
        });

        let err = parse_measurement(&payload).unwrap_err();
        let paths: Vec<&str> = err
            .field_issues()
            .unwrap()
            .iter()
            .map(|i| i.path.as_str())
            .collect();
        assert!(paths.contains(&"body_weight_kg"));
        assert!(paths.contains(&"body_fat_pct"));
    }

    #[test]
    fn test_personal_record_must_match_engine() {
        let good = json!({
            "exercise_id": "bench_press",
            "date": "2024-03-04",
            "weight": 100.0,
            "reps": 10,
            "estimated_one_rep_max": 133.33333333333334
        });
        assert!(parse_personal_record(&good).is_ok());

        let tampered = json!({
            "exercise_id": "bench_press",
            "date": "2024-03-04",
            "weight": 100.0,
            "reps": 10,
            "estimated_one_rep_max": 150.0
        });
        let err = parse_personal_record(&tampered).unwrap_err();
        assert_eq!(
            err.field_issues().unwrap()[0].path,
            "estimated_one_rep_max"
        );
    }

    #[test]
    fn test_session_duplicate_entry_keys_rejected() {
        let entry = json!({
            "exercise_id": "bench_press",
            "set_index": 0,
            "planned": {"reps": 5, "weight": 80.0, "rest_seconds": 120},
            "performed": {"reps": 5, "weight": 80.0, "effort": 7, "notes": null},
            "status": "done"
        });
        let payload = json!({
            "id": "4fd2ac1e-58a5-4b4a-9a2f-0a4a3c9e7a01",
            "routine_id": "push_pull",
            "date": "2024-03-04",
            "entries": [entry.clone(), entry],
            "duration_seconds": 1800,
            "muscle_volume": {"chest": 400.0},
            "started_at": "2024-03-04T10:00:00Z",
            "completed_at": "2024-03-04T11:00:00Z"
        });

        let err = parse_completed_session(&payload).unwrap_err();
        assert!(err
            .field_issues()
            .unwrap()
            .iter()
            .any(|i| i.message.contains("duplicate entry")));
    }

    #[test]
    fn test_session_done_without_performed_rejected() {
        let payload = json!({
            "id": "4fd2ac1e-58a5-4b4a-9a2f-0a4a3c9e7a01",
            "routine_id": "push_pull",
            "date": "2024-03-04",
            "entries": [{
                "exercise_id": "bench_press",
                "set_index": 0,
                "planned": {"reps": 5, "weight": 80.0, "rest_seconds": 120},
                "performed": null,
                "status": "done"
            }],
            "duration_seconds": null,
            "muscle_volume": {},
            "started_at": "2024-03-04T10:00:00Z",
            "completed_at": "2024-03-04T11:00:00Z"
        });

        let err = parse_completed_session(&payload).unwrap_err();
        assert!(err
            .field_issues()
            .unwrap()
            .iter()
            .any(|i| i.path == "entries[0].performed"));
    }
}
