//! Status transition rules: the decision logic between user gestures and the
//! store. Kept as free functions over `TaskStore` plus the injected
//! `UserPrompt` capability so every rule is testable without a UI.

use anyhow::Result;
use taskmate_core::{
    prompt::UserPrompt,
    storage::StateStore,
    tasks::{TaskId, TaskStatus},
};

use crate::TaskStore;

/// Question asked when a focus session ends with a task attached.
pub const MARK_DONE_QUESTION: &str = "Mark focused task as done?";

/// List-view checkbox: flips the task between done and todo.
pub fn toggle_checkbox<S: StateStore>(store: &mut TaskStore<S>, id: &TaskId) -> Result<()> {
    store.toggle_done(id)
}

/// Kanban drop: the card takes exactly the status of the column it landed
/// on, regardless of where it came from. Dropping a card on its own column
/// is a legal idempotent write.
pub fn drop_on_column<S: StateStore>(
    store: &mut TaskStore<S>,
    id: &TaskId,
    column: TaskStatus,
) -> Result<()> {
    store.set_status(id, column)
}

/// Handles a finished focus session: surfaces the completion message and,
/// if a task is focused and still exists, asks whether to mark it done.
/// Declining, having no focused task, or holding a stale id all leave the
/// collection untouched.
pub fn complete_focus_session<S: StateStore>(
    store: &mut TaskStore<S>,
    prompt: &dyn UserPrompt,
    focused: Option<&TaskId>,
    message: &str,
) -> Result<()> {
    prompt.notify(message);
    if let Some(id) = focused {
        if store.find_by_id(id).is_some() && prompt.confirm(MARK_DONE_QUESTION) {
            store.set_status(id, TaskStatus::Done)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmate_core::{
        prompt::ScriptedPrompt,
        storage::InMemoryStateStore,
        tasks::TaskDraft,
    };

    fn store_with(titles: &[&str]) -> TaskStore<InMemoryStateStore> {
        let mut store = TaskStore::open(InMemoryStateStore::new());
        for title in titles {
            store.create(TaskDraft::titled(*title)).expect("create");
        }
        store
    }

    #[test]
    fn drop_is_absolute_not_relative() {
        let mut store = store_with(&["card"]);
        let id = store.all()[0].id.clone();
        store.set_status(&id, TaskStatus::Done).expect("seed");

        drop_on_column(&mut store, &id, TaskStatus::Todo).expect("drop");
        assert_eq!(store.all()[0].status, TaskStatus::Todo);
    }

    #[test]
    fn drop_on_own_column_is_idempotent() {
        let mut store = store_with(&["card"]);
        let id = store.all()[0].id.clone();
        let before = store.all().to_vec();

        drop_on_column(&mut store, &id, TaskStatus::Todo).expect("drop");
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn accepted_completion_marks_the_focused_task_done() {
        let mut store = store_with(&["focus target"]);
        let id = store.all()[0].id.clone();
        let prompt = ScriptedPrompt::answering(true);

        complete_focus_session(&mut store, &prompt, Some(&id), "Take a break.")
            .expect("complete");

        assert_eq!(store.all()[0].status, TaskStatus::Done);
        assert_eq!(prompt.notifications(), vec!["Take a break."]);
        assert_eq!(prompt.questions(), vec![MARK_DONE_QUESTION]);
    }

    #[test]
    fn declined_completion_changes_nothing() {
        let mut store = store_with(&["focus target"]);
        let id = store.all()[0].id.clone();
        let prompt = ScriptedPrompt::answering(false);

        complete_focus_session(&mut store, &prompt, Some(&id), "Take a break.")
            .expect("complete");

        assert_eq!(store.all()[0].status, TaskStatus::Todo);
    }

    #[test]
    fn completion_without_focus_only_notifies() {
        let mut store = store_with(&["bystander"]);
        let prompt = ScriptedPrompt::answering(true);

        complete_focus_session(&mut store, &prompt, None, "Take a break.").expect("complete");

        assert_eq!(store.all()[0].status, TaskStatus::Todo);
        assert_eq!(prompt.notifications().len(), 1);
        assert!(prompt.questions().is_empty());
    }

    #[test]
    fn stale_focused_id_skips_the_confirmation() {
        let mut store = store_with(&["bystander"]);
        let stale = taskmate_core::tasks::TaskId::from("deleted-elsewhere");
        let prompt = ScriptedPrompt::answering(true);

        complete_focus_session(&mut store, &prompt, Some(&stale), "Take a break.")
            .expect("complete");

        assert!(prompt.questions().is_empty());
        assert_eq!(store.all()[0].status, TaskStatus::Todo);
    }
}
