//! Read-side progress aggregation over completed sessions.
//!
//! Everything here is pure and total: functions take a slice of completed
//! sessions, mutate nothing, and yield zero/empty results for empty input.
//! Calling any of them twice on the same collection returns identical
//! results.

use crate::metrics::{self, OneRepMaxFormula};
use crate::types::{CompletedSession, MuscleGroup, PersonalRecord, WeekStart};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Calendar statistics for the week containing a reference date
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeekStats {
    /// One flag per day of the week, index 0 being the configured week start
    pub days: [bool; 7],
    pub trained_days: u32,
    /// Share of the week trained, 0-100
    pub percent: f64,
    /// Consecutive trained days counting backward from the reference date
    pub streak: u32,
    /// Longest historical run of consecutive trained days
    pub best_streak: u32,
}

/// How often an exercise shows up in the session history
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExerciseFrequency {
    pub exercise_id: String,
    pub count: usize,
    pub last_performed: NaiveDate,
}

/// Week/streak statistics for the week containing `reference`.
///
/// A day counts as trained when at least one completed session carries that
/// calendar date. A gap breaks the current streak but never erases
/// `best_streak`. Both Monday-start and Sunday-start weeks are supported.
pub fn week_stats(
    sessions: &[CompletedSession],
    reference: NaiveDate,
    week_starts_on: WeekStart,
) -> WeekStats {
    let trained: BTreeSet<NaiveDate> = sessions.iter().map(|s| s.date).collect();

    let offset = match week_starts_on {
        WeekStart::Monday => reference.weekday().num_days_from_monday(),
        WeekStart::Sunday => reference.weekday().num_days_from_sunday(),
    };
    let week_start = reference - Duration::days(offset as i64);

    let mut days = [false; 7];
    for (i, flag) in days.iter_mut().enumerate() {
        *flag = trained.contains(&(week_start + Duration::days(i as i64)));
    }
    let trained_days = days.iter().filter(|d| **d).count() as u32;

    // Current streak: walk backward from the reference date
    let mut streak = 0u32;
    let mut cursor = reference;
    while trained.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }

    // Best streak: longest consecutive run over the whole history
    let mut best_streak = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for date in &trained {
        run = match previous {
            Some(prev) if *date == prev + Duration::days(1) => run + 1,
            _ => 1,
        };
        best_streak = best_streak.max(run);
        previous = Some(*date);
    }

    WeekStats {
        days,
        trained_days,
        percent: trained_days as f64 / 7.0 * 100.0,
        streak,
        best_streak,
    }
}

/// Sum the frozen per-session muscle-volume totals across a collection.
///
/// Muscle groups absent from a given session contribute zero.
pub fn volume_by_muscle(sessions: &[CompletedSession]) -> BTreeMap<MuscleGroup, f64> {
    let mut totals = BTreeMap::new();
    for session in sessions {
        for (muscle, volume) in &session.muscle_volume {
            *totals.entry(*muscle).or_insert(0.0) += volume;
        }
    }
    totals
}

/// Count how often each exercise appears across all session entries.
///
/// Ordered by count descending, ties broken by most recent date first.
pub fn exercise_frequency(sessions: &[CompletedSession]) -> Vec<ExerciseFrequency> {
    let mut counts: HashMap<&str, (usize, NaiveDate)> = HashMap::new();

    for session in sessions {
        for entry in &session.entries {
            counts
                .entry(entry.exercise_id.as_str())
                .and_modify(|(count, last)| {
                    *count += 1;
                    *last = (*last).max(session.date);
                })
                .or_insert((1, session.date));
        }
    }

    let mut frequencies: Vec<ExerciseFrequency> = counts
        .into_iter()
        .map(|(exercise_id, (count, last_performed))| ExerciseFrequency {
            exercise_id: exercise_id.to_string(),
            count,
            last_performed,
        })
        .collect();

    frequencies.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(b.last_performed.cmp(&a.last_performed))
            .then(a.exercise_id.cmp(&b.exercise_id))
    });

    frequencies
}

/// Derive the best personal record per exercise from session history.
///
/// Scans every performed entry, estimating a one-rep max with the given
/// formula; sets outside the formula's domain (e.g. 37+ reps under Brzycki)
/// are skipped rather than failing the whole scan. A record only moves to a
/// later date when its estimate is strictly better. Results are ordered
/// heaviest estimate first.
pub fn personal_records(
    sessions: &[CompletedSession],
    formula: OneRepMaxFormula,
) -> Vec<PersonalRecord> {
    let mut best: HashMap<&str, PersonalRecord> = HashMap::new();

    for session in sessions {
        for entry in &session.entries {
            let Some(performed) = &entry.performed else {
                continue;
            };
            let Ok(estimate) = metrics::estimate_one_rep_max(performed.weight, performed.reps, formula)
            else {
                continue;
            };

            let candidate = PersonalRecord {
                exercise_id: entry.exercise_id.clone(),
                date: session.date,
                weight: performed.weight,
                reps: performed.reps,
                estimated_one_rep_max: estimate,
            };

            best.entry(entry.exercise_id.as_str())
                .and_modify(|current| {
                    if candidate.estimated_one_rep_max > current.estimated_one_rep_max {
                        *current = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }
    }

    let mut records: Vec<PersonalRecord> = best.into_values().collect();
    records.sort_by(|a, b| {
        b.estimated_one_rep_max
            .partial_cmp(&a.estimated_one_rep_max)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.exercise_id.cmp(&b.exercise_id))
    });
    records
}
