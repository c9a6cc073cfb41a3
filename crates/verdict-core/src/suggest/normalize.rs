//! Improvement normalization.
//!
//! Turns the two improvement maps into one ordered list of [`Suggestion`]s.
//!
//! Task improvements proposed on their own are re-parented in two passes:
//!
//! 1. group them by owning initiative, in first-encountered order;
//! 2. merge each group into the initiative's declared improvement, or into a
//!    synthesized tasks-only UPDATE when the initiative has none.
//!
//! Output order, per initiative: the entity suggestion, its field
//! suggestions (title, description), then each task's entity suggestion
//! followed by that task's fields. Declared initiatives come first, in
//! declaration order, then synthesized ones.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::SuggestionError;
use crate::model::entity::Snapshots;
use crate::model::improvement::{
    Action, Improvements, ImprovementMap, InitiativeImprovement, TaskImprovement,
    UpdateInitiative, UpdateTask,
};

use super::original::attach_originals;
use super::path::{FieldName, NEW_TASK_PREFIX, PathError, SuggestionPath};
use super::suggestion::{
    EntityAction, EntitySuggestion, FieldSuggestion, Suggestion, SuggestionDetail,
};

/// A task improvement with its key inside the owning initiative.
#[derive(Debug, Clone)]
struct KeyedTask {
    key: String,
    improvement: TaskImprovement,
}

/// Everything proposed for one initiative after re-parenting.
#[derive(Debug, Clone)]
struct InitiativeGroup {
    key: String,
    improvement: InitiativeImprovement,
    tasks: Vec<KeyedTask>,
}

/// Key of a task within its initiative: the identifier for UPDATE/DELETE,
/// `new-task-<position>` for CREATE.
fn task_key(position: usize, task: &TaskImprovement) -> String {
    task.identifier()
        .map_or_else(|| format!("{NEW_TASK_PREFIX}{position}"), ToOwned::to_owned)
}

/// Normalize improvements into an ordered suggestion list.
///
/// Deterministic: the same inputs always produce the same paths in the same
/// order.
///
/// # Errors
///
/// - [`SuggestionError::TaskNotFound`]: a standalone task UPDATE/DELETE
///   names a task missing from the snapshots.
/// - [`SuggestionError::InitiativeUnresolved`]: the task exists but its
///   owning initiative cannot be determined.
/// - [`SuggestionError::OrphanTaskCreate`]: a standalone task CREATE has no
///   `initiative_identifier`.
/// - [`SuggestionError::InvalidPath`]: an initiative or task key contains
///   `.`.
///
/// No partial list is produced on error.
pub fn normalize(
    improvements: &Improvements,
    snapshots: &Snapshots,
) -> Result<Vec<Suggestion>, SuggestionError> {
    let mut groups = declared_groups(&improvements.initiative_improvements)?;
    let pending = group_task_improvements(&improvements.task_improvements, snapshots)?;
    merge_pending(&mut groups, pending)?;

    let mut suggestions = Vec::new();
    for group in &groups {
        emit_group(group, &mut suggestions);
    }
    attach_originals(&mut suggestions, snapshots);

    debug!(
        initiatives = groups.len(),
        suggestions = suggestions.len(),
        "normalized improvements"
    );
    Ok(suggestions)
}

/// Groups for the declared initiative improvements, nested tasks keyed.
///
/// Nested tasks repeating an earlier key are folded by [`push_tasks`], and
/// the payload's task list is rewritten to match, so `new-task-<n>` keys stay
/// positions in that list.
fn declared_groups(
    initiatives: &ImprovementMap<InitiativeImprovement>,
) -> Result<Vec<InitiativeGroup>, SuggestionError> {
    initiatives
        .iter()
        .map(|(key, improvement)| {
            check_segment(key)?;
            let mut group = InitiativeGroup {
                key: key.to_string(),
                improvement: improvement.clone(),
                tasks: Vec::with_capacity(improvement.tasks().len()),
            };
            if push_tasks(&mut group, improvement.tasks().iter().cloned())? {
                sync_payload_tasks(&mut group);
            }
            Ok(group)
        })
        .collect()
}

/// Append tasks to `group`. Returns whether any task was folded into an
/// existing entry instead of appended.
///
/// A task whose key is already present is folded into the kept entry: two
/// UPDATEs merge field by field, the kept value winning where both set one.
/// Any other pair keeps the first and drops the second with a warning.
fn push_tasks(
    group: &mut InitiativeGroup,
    tasks: impl IntoIterator<Item = TaskImprovement>,
) -> Result<bool, SuggestionError> {
    let mut folded = false;
    for improvement in tasks {
        let key = task_key(group.tasks.len(), &improvement);
        check_segment(&key)?;
        let Some(existing) = group.tasks.iter_mut().find(|t| t.key == key) else {
            group.tasks.push(KeyedTask { key, improvement });
            continue;
        };
        folded = true;
        match (&mut existing.improvement, improvement) {
            (TaskImprovement::Update(kept), TaskImprovement::Update(extra)) => {
                debug!(initiative = %group.key, task = %key, "merging repeated task update");
                merge_update(kept, extra);
            }
            (kept, extra) => {
                warn!(
                    initiative = %group.key,
                    task = %key,
                    kept = %kept.action(),
                    dropped = %extra.action(),
                    "conflicting task improvements; keeping the first"
                );
            }
        }
    }
    Ok(folded)
}

fn merge_update(kept: &mut UpdateTask, extra: UpdateTask) {
    if kept.title.is_none() {
        kept.title = extra.title;
    }
    if kept.description.is_none() {
        kept.description = extra.description;
    }
}

/// Keys become path segments; a `.` inside one would make two paths render
/// the same.
fn check_segment(key: &str) -> Result<(), SuggestionError> {
    if key.contains('.') {
        return Err(PathError::SeparatorInIdentifier {
            identifier: key.to_string(),
        }
        .into());
    }
    Ok(())
}

fn sync_payload_tasks(group: &mut InitiativeGroup) {
    let tasks = group.tasks.iter().map(|t| t.improvement.clone()).collect();
    group.improvement.set_tasks(tasks);
}

/// Pass 1: group standalone task improvements by owning initiative.
fn group_task_improvements(
    tasks: &ImprovementMap<TaskImprovement>,
    snapshots: &Snapshots,
) -> Result<Vec<(String, Vec<TaskImprovement>)>, SuggestionError> {
    let mut grouped: Vec<(String, Vec<TaskImprovement>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (key, improvement) in tasks.iter() {
        let owner = owning_initiative(key, improvement, snapshots)?;
        let slot = *index.entry(owner.clone()).or_insert_with(|| {
            grouped.push((owner, Vec::new()));
            grouped.len() - 1
        });
        grouped[slot].1.push(improvement.clone());
    }

    Ok(grouped)
}

fn owning_initiative(
    key: &str,
    improvement: &TaskImprovement,
    snapshots: &Snapshots,
) -> Result<String, SuggestionError> {
    let identifier = match improvement {
        TaskImprovement::Create(create) => {
            return create.initiative_identifier.clone().ok_or_else(|| {
                SuggestionError::OrphanTaskCreate {
                    key: key.to_string(),
                }
            });
        }
        TaskImprovement::Update(update) => &update.identifier,
        TaskImprovement::Delete(delete) => &delete.identifier,
    };

    let task = snapshots
        .task(identifier)
        .ok_or_else(|| SuggestionError::TaskNotFound {
            identifier: identifier.clone(),
        })?;
    snapshots
        .owning_initiative(task)
        .map(ToOwned::to_owned)
        .ok_or_else(|| SuggestionError::InitiativeUnresolved {
            identifier: identifier.clone(),
        })
}

/// Pass 2: fold grouped task improvements into initiative groups.
fn merge_pending(
    groups: &mut Vec<InitiativeGroup>,
    pending: Vec<(String, Vec<TaskImprovement>)>,
) -> Result<(), SuggestionError> {
    let mut by_key: HashMap<String, usize> = groups
        .iter()
        .enumerate()
        .map(|(idx, group)| (group.key.clone(), idx))
        .collect();

    for (owner, tasks) in pending {
        let existing = by_key.get(&owner).copied();
        let idx = match existing {
            Some(idx) => idx,
            None => {
                check_segment(&owner)?;
                groups.push(InitiativeGroup {
                    key: owner.clone(),
                    improvement: InitiativeImprovement::Update(UpdateInitiative::tasks_only(
                        owner.clone(),
                        Vec::new(),
                    )),
                    tasks: Vec::new(),
                });
                by_key.insert(owner.clone(), groups.len() - 1);
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        if group.improvement.action() == Action::Delete {
            warn!(
                initiative = %owner,
                tasks = tasks.len(),
                "task improvements target an initiative proposed for deletion"
            );
        }

        if !tasks.is_empty() {
            push_tasks(group, tasks)?;
            sync_payload_tasks(group);
        }
    }
    Ok(())
}

fn emit_group(group: &InitiativeGroup, out: &mut Vec<Suggestion>) {
    let action = group.improvement.action();
    let identifier = group.improvement.identifier().unwrap_or(group.key.as_str());

    out.push(Suggestion {
        path: SuggestionPath::initiative(group.key.as_str()),
        entity_identifier: identifier.to_string(),
        detail: SuggestionDetail::Entity(EntitySuggestion {
            action,
            suggested_value: EntityAction::Initiative(group.improvement.clone()),
            original_value: None,
        }),
    });

    for field in FieldName::ALL {
        if let Some(value) = group.improvement.field(field) {
            out.push(field_suggestion(
                SuggestionPath::initiative_field(group.key.as_str(), field),
                identifier,
                action,
                field,
                value,
            ));
        }
    }

    for task in &group.tasks {
        let task_action = task.improvement.action();
        let task_identifier = task.improvement.identifier().unwrap_or(task.key.as_str());

        out.push(Suggestion {
            path: SuggestionPath::task(group.key.as_str(), task.key.as_str()),
            entity_identifier: task_identifier.to_string(),
            detail: SuggestionDetail::Entity(EntitySuggestion {
                action: task_action,
                suggested_value: EntityAction::Task(task.improvement.clone()),
                original_value: None,
            }),
        });

        for field in FieldName::ALL {
            if let Some(value) = task.improvement.field(field) {
                out.push(field_suggestion(
                    SuggestionPath::task_field(group.key.as_str(), task.key.as_str(), field),
                    task_identifier,
                    task_action,
                    field,
                    value,
                ));
            }
        }
    }
}

fn field_suggestion(
    path: SuggestionPath,
    entity_identifier: &str,
    entity_action: Action,
    field: FieldName,
    value: &str,
) -> Suggestion {
    Suggestion {
        path,
        entity_identifier: entity_identifier.to_string(),
        detail: SuggestionDetail::Field(FieldSuggestion {
            field_name: field,
            entity_action,
            suggested_value: value.to_string(),
            original_value: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::Task;
    use crate::model::improvement::{CreateTask, DeleteTask, UpdateTask};

    fn task_snapshot(identifier: &str, initiative: &str) -> Task {
        Task {
            id: None,
            identifier: identifier.into(),
            title: format!("{identifier} title"),
            description: None,
            initiative_identifier: Some(initiative.into()),
            initiative_id: None,
        }
    }

    #[test]
    fn create_task_keys_use_list_position() {
        let update = TaskImprovement::Update(UpdateTask {
            identifier: "TASK-1".into(),
            title: None,
            description: None,
        });
        let create = TaskImprovement::Create(CreateTask {
            title: "t".into(),
            description: "d".into(),
            initiative_identifier: None,
        });
        assert_eq!(task_key(0, &update), "TASK-1");
        assert_eq!(task_key(1, &create), "new-task-1");
    }

    #[test]
    fn grouping_keeps_first_encountered_owner_order() {
        let snapshots = Snapshots::new(
            vec![],
            vec![
                task_snapshot("TASK-1", "INIT-B"),
                task_snapshot("TASK-2", "INIT-A"),
                task_snapshot("TASK-3", "INIT-B"),
            ],
        );
        let tasks: ImprovementMap<TaskImprovement> = ["TASK-1", "TASK-2", "TASK-3"]
            .into_iter()
            .map(|id| {
                (
                    id,
                    TaskImprovement::Delete(DeleteTask {
                        identifier: id.into(),
                    }),
                )
            })
            .collect();

        let grouped = group_task_improvements(&tasks, &snapshots).expect("all tasks known");
        let owners: Vec<(&str, usize)> = grouped
            .iter()
            .map(|(owner, tasks)| (owner.as_str(), tasks.len()))
            .collect();
        assert_eq!(owners, [("INIT-B", 2), ("INIT-A", 1)]);
    }

    #[test]
    fn repeated_nested_update_folds_into_first_and_positions_follow_kept_list() {
        let update = |title: &str, description: Option<&str>| {
            TaskImprovement::Update(UpdateTask {
                identifier: "TASK-1".into(),
                title: Some(title.into()),
                description: description.map(Into::into),
            })
        };
        let mut initiatives = ImprovementMap::new();
        initiatives.insert(
            "INIT-1",
            InitiativeImprovement::Update(UpdateInitiative::tasks_only(
                "INIT-1".into(),
                vec![
                    update("first", None),
                    update("second", Some("from second")),
                    TaskImprovement::Create(CreateTask {
                        title: "t".into(),
                        description: "d".into(),
                        initiative_identifier: None,
                    }),
                ],
            )),
        );

        let groups = declared_groups(&initiatives).expect("keys are valid");
        let keys: Vec<&str> = groups[0].tasks.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, ["TASK-1", "new-task-1"]);
        let kept = &groups[0].improvement.tasks()[0];
        assert_eq!(groups[0].improvement.tasks().len(), 2);
        assert_eq!(kept.field(FieldName::Title), Some("first"));
        assert_eq!(kept.field(FieldName::Description), Some("from second"));
    }

    #[test]
    fn conflicting_actions_keep_the_first() {
        let mut initiatives = ImprovementMap::new();
        initiatives.insert(
            "INIT-1",
            InitiativeImprovement::Update(UpdateInitiative::tasks_only(
                "INIT-1".into(),
                vec![
                    TaskImprovement::Delete(DeleteTask {
                        identifier: "TASK-1".into(),
                    }),
                    TaskImprovement::Update(UpdateTask {
                        identifier: "TASK-1".into(),
                        title: Some("ignored".into()),
                        description: None,
                    }),
                ],
            )),
        );

        let groups = declared_groups(&initiatives).expect("keys are valid");
        assert_eq!(groups[0].tasks.len(), 1);
        assert_eq!(groups[0].tasks[0].improvement.action(), Action::Delete);
    }

    #[test]
    fn dotted_keys_are_rejected() {
        let mut initiatives = ImprovementMap::new();
        initiatives.insert(
            "INIT.1",
            InitiativeImprovement::Update(UpdateInitiative::tasks_only("INIT.1".into(), vec![])),
        );
        assert!(matches!(
            declared_groups(&initiatives),
            Err(SuggestionError::InvalidPath(PathError::SeparatorInIdentifier { .. }))
        ));
    }

    #[test]
    fn orphan_create_is_an_error() {
        let mut tasks = ImprovementMap::new();
        tasks.insert(
            "new-0",
            TaskImprovement::Create(CreateTask {
                title: "t".into(),
                description: "d".into(),
                initiative_identifier: None,
            }),
        );
        let err = group_task_improvements(&tasks, &Snapshots::default())
            .expect_err("create without initiative");
        assert_eq!(
            err,
            SuggestionError::OrphanTaskCreate {
                key: "new-0".into()
            }
        );
    }
}
