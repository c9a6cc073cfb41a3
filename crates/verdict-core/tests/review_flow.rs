//! End-to-end review scenarios for verdict-core: normalization, resolution,
//! and accepted-change reconstruction through the `ReviewSession` facade.

use serde_json::json;
use verdict_core::model::entity::{Initiative, Snapshots, Task};
use verdict_core::model::improvement::{Action, Improvements};
use verdict_core::resolve::{Resolution, ResolvedValue};
use verdict_core::suggest::{
    FieldName, OriginalValue, PathError, SuggestionPath, resolve_original,
};
use verdict_core::{ErrorCode, ReviewSession, SuggestionError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn initiative(id: u64, identifier: &str, title: &str, description: Option<&str>) -> Initiative {
    Initiative {
        id: Some(id),
        identifier: identifier.into(),
        title: title.into(),
        description: description.map(Into::into),
        kind: None,
        status: Some("IN_PROGRESS".into()),
        workspace_identifier: Some("WS-1".into()),
    }
}

fn task(id: u64, identifier: &str, title: &str, initiative_id: u64) -> Task {
    Task {
        id: Some(id),
        identifier: identifier.into(),
        title: title.into(),
        description: Some(format!("{title} details")),
        initiative_identifier: None,
        initiative_id: Some(initiative_id),
    }
}

fn snapshots() -> Snapshots {
    Snapshots::new(
        vec![
            initiative(123, "INIT-123", "Checkout revamp", Some("Rework checkout")),
            initiative(200, "INIT-200", "Search", None),
        ],
        vec![
            task(456, "TASK-456", "Old task title", 123),
            task(457, "TASK-457", "Payment form", 123),
            task(501, "TASK-501", "Indexing", 200),
        ],
    )
}

fn improvements(value: serde_json::Value) -> Improvements {
    serde_json::from_value(value).expect("improvements fixture must parse")
}

fn paths(session: &ReviewSession) -> Vec<String> {
    session
        .suggestions()
        .iter()
        .map(|s| s.path.to_string())
        .collect()
}

fn path(raw: &str) -> SuggestionPath {
    raw.parse().expect("fixture path must parse")
}

fn mixed_batch() -> Improvements {
    improvements(json!({
        "initiative_improvements": {
            "INIT-123": {
                "action": "UPDATE",
                "identifier": "INIT-123",
                "title": "Checkout v2",
                "description": "Faster checkout",
                "tasks": [
                    {"action": "CREATE", "title": "Add wallet", "description": "Apple Pay"},
                    {"action": "DELETE", "identifier": "TASK-457"}
                ]
            },
            "new-0": {
                "action": "CREATE",
                "title": "Onboarding",
                "description": "First-run flow",
                "workspace_identifier": "WS-1",
                "tasks": [
                    {"action": "CREATE", "title": "Welcome screen", "description": "Copy"}
                ]
            }
        },
        "task_improvements": {
            "TASK-501": {"action": "UPDATE", "identifier": "TASK-501", "description": "Incremental"},
            "TASK-456": {"action": "UPDATE", "identifier": "TASK-456", "title": "Renamed"}
        }
    }))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn suggestions_follow_declaration_order() {
    let session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    assert_eq!(
        paths(&session),
        [
            "initiative.INIT-123",
            "initiative.INIT-123.title",
            "initiative.INIT-123.description",
            "initiative.INIT-123.tasks.new-task-0",
            "initiative.INIT-123.tasks.new-task-0.title",
            "initiative.INIT-123.tasks.new-task-0.description",
            "initiative.INIT-123.tasks.TASK-457",
            "initiative.INIT-123.tasks.TASK-456",
            "initiative.INIT-123.tasks.TASK-456.title",
            "initiative.new-0",
            "initiative.new-0.title",
            "initiative.new-0.description",
            "initiative.new-0.tasks.new-task-0",
            "initiative.new-0.tasks.new-task-0.title",
            "initiative.new-0.tasks.new-task-0.description",
            "initiative.INIT-200",
            "initiative.INIT-200.tasks.TASK-501",
            "initiative.INIT-200.tasks.TASK-501.description",
        ]
    );
}

#[test]
fn normalizing_twice_is_identical() {
    let batch = mixed_batch();
    let first = ReviewSession::new(&batch, snapshots()).expect("normalize");
    let second = ReviewSession::new(&batch, snapshots()).expect("normalize");
    assert_eq!(first.suggestions(), second.suggestions());
    assert_eq!(
        serde_json::to_string(first.suggestions()).expect("serialize"),
        serde_json::to_string(second.suggestions()).expect("serialize")
    );
}

#[test]
fn standalone_task_is_reparented_onto_its_initiative() {
    let batch = improvements(json!({
        "task_improvements": {
            "TASK-456": {"action": "UPDATE", "identifier": "TASK-456", "title": "New title"}
        }
    }));
    let mut session = ReviewSession::new(&batch, snapshots()).expect("normalize");
    assert_eq!(
        paths(&session),
        [
            "initiative.INIT-123",
            "initiative.INIT-123.tasks.TASK-456",
            "initiative.INIT-123.tasks.TASK-456.title",
        ]
    );

    session.accept_all();
    assert_eq!(
        serde_json::to_value(session.accepted_changes()).expect("serialize"),
        json!([{
            "action": "UPDATE",
            "identifier": "INIT-123",
            "tasks": [{"action": "UPDATE", "identifier": "TASK-456", "title": "New title"}]
        }])
    );
}

#[test]
fn tasks_for_one_initiative_share_one_synthesized_update() {
    let batch = improvements(json!({
        "task_improvements": {
            "TASK-457": {"action": "DELETE", "identifier": "TASK-457"},
            "TASK-501": {"action": "DELETE", "identifier": "TASK-501"},
            "new-0": {
                "action": "CREATE",
                "title": "Receipt email",
                "description": "Send it",
                "initiative_identifier": "INIT-123"
            }
        }
    }));
    let session = ReviewSession::new(&batch, snapshots()).expect("normalize");
    let entity_paths: Vec<String> = session
        .entity_suggestions()
        .map(|s| s.path.to_string())
        .collect();
    assert_eq!(
        entity_paths,
        [
            "initiative.INIT-123",
            "initiative.INIT-123.tasks.TASK-457",
            "initiative.INIT-123.tasks.new-task-1",
            "initiative.INIT-200",
            "initiative.INIT-200.tasks.TASK-501",
        ]
    );

    let owner = session
        .suggestion(&path("initiative.INIT-123"))
        .expect("synthesized initiative");
    let value = serde_json::to_value(owner).expect("serialize");
    assert_eq!(value["action"], "UPDATE");
    assert_eq!(value["suggested_value"]["tasks"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["original_value"]["identifier"], "INIT-123");
}

#[test]
fn missing_task_aborts_normalization() {
    let batch = improvements(json!({
        "initiative_improvements": {
            "INIT-200": {"action": "UPDATE", "identifier": "INIT-200", "title": "Search v2"}
        },
        "task_improvements": {
            "TASK-999": {"action": "UPDATE", "identifier": "TASK-999", "title": "Ghost"}
        }
    }));
    let err = ReviewSession::new(&batch, snapshots()).expect_err("unknown task");
    assert_eq!(
        err,
        SuggestionError::TaskNotFound {
            identifier: "TASK-999".into()
        }
    );
    assert_eq!(err.to_string(), "Task TASK-999 not found in TasksContext");
}

#[test]
fn standalone_update_merges_into_nested_update_of_same_task() {
    let batch = improvements(json!({
        "initiative_improvements": {
            "INIT-123": {
                "action": "UPDATE",
                "identifier": "INIT-123",
                "title": "Checkout v2",
                "tasks": [
                    {"action": "UPDATE", "identifier": "TASK-456", "title": "Nested title"}
                ]
            }
        },
        "task_improvements": {
            "TASK-456": {
                "action": "UPDATE",
                "identifier": "TASK-456",
                "title": "Standalone title",
                "description": "Standalone description"
            }
        }
    }));
    let mut session = ReviewSession::new(&batch, snapshots()).expect("normalize");
    assert_eq!(
        paths(&session),
        [
            "initiative.INIT-123",
            "initiative.INIT-123.title",
            "initiative.INIT-123.tasks.TASK-456",
            "initiative.INIT-123.tasks.TASK-456.title",
            "initiative.INIT-123.tasks.TASK-456.description",
        ]
    );

    session.accept_all();
    assert_eq!(
        serde_json::to_value(session.accepted_changes()).expect("serialize"),
        json!([{
            "action": "UPDATE",
            "identifier": "INIT-123",
            "title": "Checkout v2",
            "tasks": [{
                "action": "UPDATE",
                "identifier": "TASK-456",
                "title": "Nested title",
                "description": "Standalone description"
            }]
        }])
    );
}

#[test]
fn standalone_delete_does_not_override_nested_update() {
    let batch = improvements(json!({
        "initiative_improvements": {
            "INIT-123": {
                "action": "UPDATE",
                "identifier": "INIT-123",
                "tasks": [{"action": "UPDATE", "identifier": "TASK-456", "title": "Kept"}]
            }
        },
        "task_improvements": {
            "TASK-456": {"action": "DELETE", "identifier": "TASK-456"}
        }
    }));
    let session = ReviewSession::new(&batch, snapshots()).expect("normalize");
    let task = session
        .suggestion(&path("initiative.INIT-123.tasks.TASK-456"))
        .expect("task suggestion");
    assert_eq!(task.action(), Action::Update);
    assert_eq!(session.suggestions().len(), 3);
}

#[test]
fn dotted_identifiers_are_refused() {
    let batch = improvements(json!({
        "initiative_improvements": {
            "INIT-123": {
                "action": "UPDATE",
                "identifier": "INIT-123",
                "tasks": [{"action": "DELETE", "identifier": "TASK.1"}]
            }
        }
    }));
    let err = ReviewSession::new(&batch, snapshots()).expect_err("dotted task key");
    assert!(matches!(
        err,
        SuggestionError::InvalidPath(PathError::SeparatorInIdentifier { ref identifier })
            if identifier == "TASK.1"
    ));
    assert_eq!(err.code(), ErrorCode::InvalidPath);

    let batch = improvements(json!({
        "initiative_improvements": {
            "A.tasks.B": {"action": "DELETE", "identifier": "A.tasks.B"}
        }
    }));
    assert!(ReviewSession::new(&batch, snapshots()).is_err());
}

#[test]
fn zero_initiative_id_does_not_match_unnumbered_initiative() {
    let mut unnumbered = initiative(0, "INIT-X", "No id", None);
    unnumbered.id = None;
    let snapshots = Snapshots::new(vec![unnumbered], vec![task(9, "TASK-9", "Orphan", 0)]);
    let batch = improvements(json!({
        "task_improvements": {
            "TASK-9": {"action": "DELETE", "identifier": "TASK-9"}
        }
    }));
    assert_eq!(
        ReviewSession::new(&batch, snapshots).expect_err("no owner"),
        SuggestionError::InitiativeUnresolved {
            identifier: "TASK-9".into()
        }
    );
}

#[test]
fn task_without_resolvable_initiative_is_an_error() {
    let snapshots = Snapshots::new(vec![], vec![task(1, "TASK-1", "Lost", 77)]);
    let batch = improvements(json!({
        "task_improvements": {
            "TASK-1": {"action": "DELETE", "identifier": "TASK-1"}
        }
    }));
    assert!(matches!(
        ReviewSession::new(&batch, snapshots),
        Err(SuggestionError::InitiativeUnresolved { .. })
    ));
}

#[test]
fn originals_come_from_snapshots() {
    let session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    let snaps = session.snapshots();

    let title = session
        .suggestion(&path("initiative.INIT-123.title"))
        .expect("title suggestion");
    assert_eq!(
        resolve_original(title, snaps),
        Some(OriginalValue::Text("Checkout revamp".into()))
    );

    let created = session
        .suggestion(&path("initiative.new-0"))
        .expect("create suggestion");
    assert_eq!(resolve_original(created, snaps), None);

    let deleted = session
        .suggestion(&path("initiative.INIT-123.tasks.TASK-457"))
        .expect("delete suggestion");
    assert!(matches!(
        resolve_original(deleted, snaps),
        Some(OriginalValue::Entity(_))
    ));
}

#[test]
fn update_of_unknown_initiative_has_no_original() {
    let batch = improvements(json!({
        "initiative_improvements": {
            "INIT-404": {"action": "UPDATE", "identifier": "INIT-404", "title": "Ghost"}
        }
    }));
    let mut session = ReviewSession::new(&batch, snapshots()).expect("normalize");
    let value = serde_json::to_value(session.suggestions()).expect("serialize");
    assert!(value[0].get("original_value").is_none());
    assert!(value[1].get("original_value").is_none());

    let title = path("initiative.INIT-404.title");
    let state = session.resolve(&title, false, None).expect("resolve");
    assert!(state.resolved_value.is_absent());
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn resolve_then_rollback_restores_default() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    for suggestion in session.suggestions().to_vec() {
        session
            .resolve(&suggestion.path, true, None)
            .expect("resolve");
        session.rollback(&suggestion.path);
        assert_eq!(
            session.resolution_state(&suggestion.path),
            &Resolution::unresolved()
        );
    }
    assert!(session.resolutions().is_empty());
}

#[test]
fn rejecting_create_field_leaves_value_absent() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    for raw in [
        "initiative.INIT-123.tasks.new-task-0.title",
        "initiative.new-0.description",
    ] {
        let state = session
            .resolve(&path(raw), false, None)
            .expect("resolve")
            .clone();
        assert!(state.is_rejected());
        assert_eq!(state.resolved_value, ResolvedValue::Absent);
    }
}

#[test]
fn rejecting_update_entity_does_not_fall_back_to_snapshot() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    let state = session
        .resolve(&path("initiative.INIT-123"), false, None)
        .expect("resolve");
    assert_eq!(state.resolved_value, ResolvedValue::Absent);

    let state = session
        .resolve(&path("initiative.INIT-123.title"), false, None)
        .expect("resolve");
    assert_eq!(state.resolved_value.as_text(), Some("Checkout revamp"));
}

#[test]
fn accept_all_then_rollback_all_empties_the_store() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    session.accept_all();
    assert!(session.all_resolved());
    session.rollback_all();
    assert!(session.resolutions().is_empty());
    assert!(!session.all_resolved());

    let mut empty = ReviewSession::new(&Improvements::default(), snapshots()).expect("normalize");
    empty.accept_all();
    empty.rollback_all();
    assert!(empty.resolutions().is_empty());
    assert!(empty.all_resolved());
}

#[test]
fn fully_resolved_scopes_to_one_initiative() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    let prefix = path("initiative.INIT-200");
    for raw in [
        "initiative.INIT-200",
        "initiative.INIT-200.tasks.TASK-501",
        "initiative.INIT-200.tasks.TASK-501.description",
    ] {
        session.resolve(&path(raw), true, None).expect("resolve");
    }
    assert!(session.is_fully_resolved(Some(&prefix)));
    assert!(!session.all_resolved());
    assert_eq!(session.is_fully_resolved_str(Some("initiative.INIT-2")), Ok(true));
}

// ---------------------------------------------------------------------------
// Accepted changes
// ---------------------------------------------------------------------------

#[test]
fn rejected_initiative_drops_all_children() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    session.accept_all();
    session
        .resolve(&path("initiative.INIT-123"), false, None)
        .expect("resolve");

    let changes = session.accepted_changes();
    let identifiers: Vec<Option<&str>> = changes.iter().map(|c| c.identifier()).collect();
    assert_eq!(identifiers, [None, Some("INIT-200")]);
}

#[test]
fn unresolved_initiative_drops_all_children() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    session.accept_all();
    assert!(session.rollback(&path("initiative.new-0")));
    assert_eq!(session.accepted_changes().len(), 2);
}

#[test]
fn field_overlay_keeps_accepted_fields_only() {
    let batch = improvements(json!({
        "initiative_improvements": {
            "INIT-123": {
                "action": "UPDATE",
                "identifier": "INIT-123",
                "title": "Checkout v2",
                "description": "Faster checkout",
                "status": "DONE"
            }
        }
    }));
    let mut session = ReviewSession::new(&batch, snapshots()).expect("normalize");
    session.resolve_str("initiative.INIT-123", true, None).expect("resolve");
    session
        .resolve_str("initiative.INIT-123.title", true, None)
        .expect("resolve");
    session
        .resolve_str("initiative.INIT-123.description", false, None)
        .expect("resolve");

    assert_eq!(
        serde_json::to_value(session.accepted_changes()).expect("serialize"),
        json!([{
            "action": "UPDATE",
            "identifier": "INIT-123",
            "title": "Checkout v2",
            "status": "DONE"
        }])
    );
}

#[test]
fn accepted_create_reports_missing_required_fields() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    session.accept_all();
    session
        .resolve_str("initiative.new-0.title", false, None)
        .expect("resolve");
    session
        .resolve_str("initiative.new-0.tasks.new-task-0.description", false, None)
        .expect("resolve");

    let changes = session.accepted_changes();
    let created = changes
        .iter()
        .find(|c| c.identifier().is_none())
        .expect("created initiative");
    let missing: Vec<String> = created
        .missing_required_fields()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(missing, ["initiative.title", "tasks[0].description"]);
    assert_eq!(created.field(FieldName::Description), Some("First-run flow"));
}

#[test]
fn custom_task_values_flow_into_accepted_changes() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    session.accept_all();
    session
        .resolve_str(
            "initiative.INIT-200.tasks.TASK-501.description",
            true,
            Some(verdict_core::suggest::SuggestionValue::Text("Edited".into())),
        )
        .expect("resolve");

    let changes = session.accepted_changes();
    let search = changes
        .iter()
        .find(|c| c.identifier() == Some("INIT-200"))
        .expect("search initiative");
    assert_eq!(search.tasks().len(), 1);
    assert_eq!(search.tasks()[0].field(FieldName::Description), Some("Edited"));
}

#[test]
fn reject_all_yields_no_changes() {
    let mut session = ReviewSession::new(&mixed_batch(), snapshots()).expect("normalize");
    session.reject_all();
    assert!(session.all_resolved());
    assert!(session.accepted_changes().is_empty());
}
