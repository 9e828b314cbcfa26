//! Bulk import/export of an owner's data.
//!
//! The wire shape is `{ "profile": {...}, "routines": [...],
//! "sessionLogs": [...] }`. Import is best-effort per section AND per
//! element: a malformed profile never blocks valid routines or session
//! logs, and one bad array element is reported while its neighbours are
//! absorbed. The storage contract has no transaction primitive, so
//! all-or-nothing semantics are deliberately not offered; callers read the
//! [`ImportReport`] to see exactly what was taken and what was rejected.

use crate::error::FieldIssue;
use crate::history;
use crate::storage::{entity_key, save_json, Store};
use crate::types::{CompletedSession, Profile, Routine};
use crate::{validate, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The bulk-transfer bundle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportBundle {
    pub profile: Option<Profile>,
    pub routines: Vec<Routine>,
    #[serde(rename = "sessionLogs")]
    pub session_logs: Vec<CompletedSession>,
}

/// What an import actually absorbed, plus every rejection
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub profile_imported: bool,
    pub routines_imported: usize,
    pub sessions_imported: usize,
    pub issues: Vec<FieldIssue>,
}

impl ImportReport {
    /// True when nothing was rejected
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Import a bundle for `owner`, best-effort.
///
/// The profile section, when valid, is stored into the owner's profile
/// slot. Only a payload that is not a JSON object at the top level is
/// rejected outright.
pub async fn import_bundle(store: &dyn Store, owner: &str, value: &Value) -> Result<ImportReport> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::validation("$", "bundle must be a JSON object"))?;

    let mut report = ImportReport::default();

    if let Some(profile_value) = object.get("profile") {
        match validate::parse_profile(profile_value) {
            Ok(profile) => {
                let key = entity_key("profile", owner, "self");
                save_json(store, &key, &profile).await?;
                report.profile_imported = true;
            }
            Err(e) => push_section_issues(&mut report.issues, "profile", &e),
        }
    }

    if let Some(routines_value) = object.get("routines") {
        match routines_value.as_array() {
            Some(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    match validate::parse_routine(element) {
                        Ok(routine) => {
                            history::save_routine(store, owner, &routine).await?;
                            report.routines_imported += 1;
                        }
                        Err(e) => {
                            push_section_issues(&mut report.issues, &format!("routines[{i}]"), &e)
                        }
                    }
                }
            }
            None => report
                .issues
                .push(FieldIssue::new("routines", "must be an array")),
        }
    }

    if let Some(sessions_value) = object.get("sessionLogs") {
        match sessions_value.as_array() {
            Some(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    match validate::parse_completed_session(element) {
                        Ok(session) => {
                            history::append_completed(store, owner, &session).await?;
                            report.sessions_imported += 1;
                        }
                        Err(e) => push_section_issues(
                            &mut report.issues,
                            &format!("sessionLogs[{i}]"),
                            &e,
                        ),
                    }
                }
            }
            None => report
                .issues
                .push(FieldIssue::new("sessionLogs", "must be an array")),
        }
    }

    tracing::info!(
        owner,
        profile = report.profile_imported,
        routines = report.routines_imported,
        sessions = report.sessions_imported,
        rejected = report.issues.len(),
        "bundle import finished"
    );

    Ok(report)
}

/// Export everything stored for `owner` as a bundle
pub async fn export_bundle(store: &dyn Store, owner: &str) -> Result<ExportBundle> {
    Ok(ExportBundle {
        profile: history::load_profile(store, owner).await?,
        routines: history::load_routines(store, owner).await?,
        session_logs: history::load_completed(store, owner).await?,
    })
}

fn push_section_issues(issues: &mut Vec<FieldIssue>, section: &str, error: &Error) {
    match error.field_issues() {
        Some(field_issues) => {
            for issue in field_issues {
                issues.push(FieldIssue::new(
                    format!("{section}.{}", issue.path),
                    issue.message.clone(),
                ));
            }
        }
        None => issues.push(FieldIssue::new(section, error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{DistanceUnit, WeekStart, WeightUnit};
    use chrono::Utc;
    use serde_json::json;

    fn profile_value() -> Value {
        json!({
            "id": "ana",
            "name": "Ana",
            "weight_unit": "kg",
            "distance_unit": "km",
            "week_starts_on": "monday"
        })
    }

    fn routine_value(id: &str) -> Value {
        json!({
            "id": id,
            "name": "Push/Pull",
            "goal": null,
            "days": [],
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_import_then_export_round_trip() {
        let store = MemoryStore::new();

        let bundle = json!({
            "profile": profile_value(),
            "routines": [routine_value("r1"), routine_value("r2")],
            "sessionLogs": []
        });

        let report = import_bundle(&store, "ana", &bundle).await.unwrap();
        assert!(report.is_clean());
        assert!(report.profile_imported);
        assert_eq!(report.routines_imported, 2);

        let exported = export_bundle(&store, "ana").await.unwrap();
        assert_eq!(exported.profile.unwrap().name, "Ana");
        assert_eq!(exported.routines.len(), 2);
        assert!(exported.session_logs.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_profile_does_not_block_routines() {
        let store = MemoryStore::new();

        let bundle = json!({
            "profile": {"id": "", "name": ""},
            "routines": [routine_value("r1")],
            "sessionLogs": []
        });

        let report = import_bundle(&store, "ana", &bundle).await.unwrap();
        assert!(!report.profile_imported);
        assert_eq!(report.routines_imported, 1);
        assert!(report.issues.iter().any(|i| i.path.starts_with("profile")));

        assert!(history::load_routine(&store, "ana", "r1").await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_element_skipped_good_elements_absorbed() {
        let store = MemoryStore::new();

        let bundle = json!({
            "routines": [
                routine_value("good_one"),
                {"id": "", "name": ""},
                routine_value("good_two"),
            ]
        });

        let report = import_bundle(&store, "ana", &bundle).await.unwrap();
        assert_eq!(report.routines_imported, 2);
        assert!(report
            .issues
            .iter()
            .all(|i| i.path.starts_with("routines[1]")));
    }

    #[tokio::test]
    async fn test_non_array_section_is_one_issue() {
        let store = MemoryStore::new();

        let bundle = json!({
            "routines": "not an array",
            "sessionLogs": []
        });

        let report = import_bundle(&store, "ana", &bundle).await.unwrap();
        assert_eq!(report.routines_imported, 0);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].path, "routines");
    }

    #[tokio::test]
    async fn test_missing_sections_are_fine() {
        let store = MemoryStore::new();

        let report = import_bundle(&store, "ana", &json!({})).await.unwrap();
        assert!(report.is_clean());
        assert!(!report.profile_imported);
    }

    #[tokio::test]
    async fn test_non_object_bundle_rejected() {
        let store = MemoryStore::new();

        let result = import_bundle(&store, "ana", &json!([1, 2, 3])).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_bundle_wire_field_names() {
        let bundle = ExportBundle {
            profile: Some(Profile {
                id: "ana".into(),
                name: "Ana".into(),
                weight_unit: WeightUnit::Kg,
                distance_unit: DistanceUnit::Km,
                week_starts_on: WeekStart::Monday,
            }),
            routines: vec![Routine::new("r1", "Push/Pull", Utc::now())],
            session_logs: vec![],
        };

        let value = serde_json::to_value(&bundle).unwrap();
        assert!(value.get("sessionLogs").is_some());
        assert!(value.get("session_logs").is_none());
    }
}
