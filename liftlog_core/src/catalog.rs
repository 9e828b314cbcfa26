//! Built-in exercise catalog.
//!
//! This module provides the default exercises shipped with the system and
//! the structural checks every catalog must pass (unique ids and slugs,
//! non-empty names).

use crate::error::FieldIssue;
use crate::types::{Difficulty, Equipment, Exercise, MuscleGroup};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

/// A catalog of exercises keyed by id
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    pub exercises: HashMap<String, Exercise>,
}

impl ExerciseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an exercise keyed by its own id
    pub fn insert(&mut self, exercise: Exercise) {
        self.exercises.insert(exercise.id.clone(), exercise);
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    /// Look up an exercise by its slug
    pub fn get_by_slug(&self, slug: &str) -> Option<&Exercise> {
        self.exercises.values().find(|e| e.slug == slug)
    }

    /// Validate catalog structure, returning every problem found.
    ///
    /// Checks: map key matches the exercise id, names are non-empty, slugs
    /// are non-empty lowercase identifiers, and slugs are unique across the
    /// catalog (ids are unique by construction of the map).
    pub fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        let mut seen_slugs: HashSet<&str> = HashSet::new();

        for (key, exercise) in &self.exercises {
            let path = |field: &str| format!("exercises.{key}.{field}");

            if key != &exercise.id {
                issues.push(FieldIssue::new(
                    path("id"),
                    format!("catalog key '{key}' does not match id '{}'", exercise.id),
                ));
            }
            if exercise.name.is_empty() {
                issues.push(FieldIssue::new(path("name"), "must not be empty"));
            }
            if exercise.slug.is_empty() {
                issues.push(FieldIssue::new(path("slug"), "must not be empty"));
            } else if !exercise
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
            {
                issues.push(FieldIssue::new(
                    path("slug"),
                    "must contain only lowercase ascii, digits, '_' and '-'",
                ));
            }

            if !exercise.slug.is_empty() && !seen_slugs.insert(exercise.slug.as_str()) {
                issues.push(FieldIssue::new(
                    path("slug"),
                    format!("slug '{}' appears more than once", exercise.slug),
                ));
            }
        }

        issues
    }
}

/// Builds the default catalog with the built-in exercises.
///
/// Prefer [`get_default_catalog`] which returns a cached reference; this
/// function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> ExerciseCatalog {
    let mut catalog = ExerciseCatalog::new();

    catalog.insert(Exercise {
        id: "back_squat".into(),
        slug: "back-squat".into(),
        name: "Barbell Back Squat".into(),
        primary_muscle: MuscleGroup::Quads,
        secondary_muscles: vec![MuscleGroup::Glutes, MuscleGroup::Hamstrings, MuscleGroup::Core],
        equipment: Equipment::Barbell,
        difficulty: Difficulty::Intermediate,
        media_url: Some("https://www.youtube.com/watch?v=ultWZbUMPL8".into()),
        instructions: vec![
            "Set the bar on your upper back and unrack it".into(),
            "Squat down until your hips break parallel".into(),
            "Drive back up through the whole foot".into(),
        ],
    });

    catalog.insert(Exercise {
        id: "bench_press".into(),
        slug: "bench-press".into(),
        name: "Barbell Bench Press".into(),
        primary_muscle: MuscleGroup::Chest,
        secondary_muscles: vec![MuscleGroup::Triceps, MuscleGroup::Shoulders],
        equipment: Equipment::Barbell,
        difficulty: Difficulty::Beginner,
        media_url: Some("https://www.youtube.com/watch?v=rT7DgCr-3pg".into()),
        instructions: vec![
            "Lie on the bench with your eyes under the bar".into(),
            "Lower the bar to your mid chest".into(),
            "Press back up to lockout".into(),
        ],
    });

    catalog.insert(Exercise {
        id: "deadlift".into(),
        slug: "deadlift".into(),
        name: "Conventional Deadlift".into(),
        primary_muscle: MuscleGroup::Hamstrings,
        secondary_muscles: vec![MuscleGroup::Glutes, MuscleGroup::Back, MuscleGroup::Forearms],
        equipment: Equipment::Barbell,
        difficulty: Difficulty::Intermediate,
        media_url: Some("https://www.youtube.com/watch?v=op9kVnSso6Q".into()),
        instructions: vec![
            "Stand with the bar over mid-foot".into(),
            "Hinge down and grip just outside your legs".into(),
            "Stand up by pushing the floor away, bar close to your shins".into(),
        ],
    });

    catalog.insert(Exercise {
        id: "overhead_press".into(),
        slug: "overhead-press".into(),
        name: "Standing Overhead Press".into(),
        primary_muscle: MuscleGroup::Shoulders,
        secondary_muscles: vec![MuscleGroup::Triceps, MuscleGroup::Core],
        equipment: Equipment::Barbell,
        difficulty: Difficulty::Intermediate,
        media_url: None,
        instructions: vec![
            "Grip the bar just outside shoulder width".into(),
            "Press overhead until your elbows lock out".into(),
        ],
    });

    catalog.insert(Exercise {
        id: "barbell_row".into(),
        slug: "barbell-row".into(),
        name: "Barbell Row".into(),
        primary_muscle: MuscleGroup::Back,
        secondary_muscles: vec![MuscleGroup::Biceps, MuscleGroup::Forearms],
        equipment: Equipment::Barbell,
        difficulty: Difficulty::Intermediate,
        media_url: None,
        instructions: vec![
            "Hinge forward with a flat back".into(),
            "Pull the bar to your lower ribs".into(),
        ],
    });

    catalog.insert(Exercise {
        id: "pull_up".into(),
        slug: "pull-up".into(),
        name: "Pull-up".into(),
        primary_muscle: MuscleGroup::Back,
        secondary_muscles: vec![MuscleGroup::Biceps],
        equipment: Equipment::Bodyweight,
        difficulty: Difficulty::Advanced,
        media_url: Some("https://www.youtube.com/watch?v=eGo4IYlbE5g".into()),
        instructions: vec![
            "Hang from the bar with an overhand grip".into(),
            "Pull until your chin clears the bar".into(),
        ],
    });

    catalog.insert(Exercise {
        id: "dumbbell_curl".into(),
        slug: "dumbbell-curl".into(),
        name: "Dumbbell Curl".into(),
        primary_muscle: MuscleGroup::Biceps,
        secondary_muscles: vec![MuscleGroup::Forearms],
        equipment: Equipment::Dumbbell,
        difficulty: Difficulty::Beginner,
        media_url: None,
        instructions: vec!["Curl the dumbbells without swinging your torso".into()],
    });

    catalog.insert(Exercise {
        id: "romanian_deadlift".into(),
        slug: "romanian-deadlift".into(),
        name: "Romanian Deadlift".into(),
        primary_muscle: MuscleGroup::Hamstrings,
        secondary_muscles: vec![MuscleGroup::Glutes, MuscleGroup::Back],
        equipment: Equipment::Barbell,
        difficulty: Difficulty::Intermediate,
        media_url: None,
        instructions: vec![
            "Start standing with the bar at your hips".into(),
            "Push your hips back, lowering the bar along your legs".into(),
            "Stop when your hamstrings reach their stretch, then stand".into(),
        ],
    });

    catalog.insert(Exercise {
        id: "plank".into(),
        slug: "plank".into(),
        name: "Plank".into(),
        primary_muscle: MuscleGroup::Core,
        secondary_muscles: vec![],
        equipment: Equipment::Bodyweight,
        difficulty: Difficulty::Beginner,
        media_url: None,
        instructions: vec!["Hold a straight line from head to heels".into()],
    });

    catalog.insert(Exercise {
        id: "calf_raise".into(),
        slug: "calf-raise".into(),
        name: "Standing Calf Raise".into(),
        primary_muscle: MuscleGroup::Calves,
        secondary_muscles: vec![],
        equipment: Equipment::Machine,
        difficulty: Difficulty::Beginner,
        media_url: None,
        instructions: vec!["Rise onto your toes, pause, lower under control".into()],
    });

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.exercises.len(), 10);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let issues = catalog.validate();
        assert!(
            issues.is_empty(),
            "Default catalog has validation issues: {issues:?}"
        );
    }

    #[test]
    fn test_lookup_by_id_and_slug() {
        let catalog = get_default_catalog();

        let by_id = catalog.get("back_squat").unwrap();
        let by_slug = catalog.get_by_slug("back-squat").unwrap();
        assert_eq!(by_id.id, by_slug.id);

        assert!(catalog.get("does_not_exist").is_none());
    }

    #[test]
    fn test_duplicate_slug_is_reported() {
        let mut catalog = build_default_catalog();
        let mut dupe = catalog.get("plank").unwrap().clone();
        dupe.id = "plank_copy".into();
        catalog.insert(dupe);

        let issues = catalog.validate();
        assert!(issues
            .iter()
            .any(|i| i.message.contains("appears more than once")));
    }

    #[test]
    fn test_mismatched_key_is_reported() {
        let mut catalog = build_default_catalog();
        let mut exercise = catalog.get("plank").unwrap().clone();
        exercise.id = "renamed".into();
        catalog.exercises.insert("plank2".into(), exercise);

        let issues = catalog.validate();
        assert!(issues.iter().any(|i| i.path == "exercises.plank2.id"));
    }

    #[test]
    fn test_every_exercise_has_instructions() {
        let catalog = build_default_catalog();
        for exercise in catalog.exercises.values() {
            assert!(
                !exercise.instructions.is_empty(),
                "{} has no instructions",
                exercise.id
            );
        }
    }
}
