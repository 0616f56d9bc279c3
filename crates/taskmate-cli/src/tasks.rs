use color_eyre::Result;
use taskmate_core::{
    tasks::{Task, TaskDraft, TaskId, TaskStatus},
    views,
};
use taskmate_storage::json_file_store::JsonFileStore;
use taskmate_task::{rules, TaskStore};

use crate::{cli::TaskCommand, config, storage};

/// Execute a task subcommand against the durable store.
pub fn handle(cmd: TaskCommand, config: &config::Config) -> Result<()> {
    let mut store = TaskStore::open(storage::store_from_config(config)?);

    match cmd {
        TaskCommand::List { search, filter } => {
            let visible = views::filter_list(store.all(), &search, filter.into());
            if visible.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }
            for task in visible {
                print_task(task);
            }
        }
        TaskCommand::Add {
            title,
            id,
            priority,
            notes,
            due,
            steps,
        } => {
            let draft = TaskDraft {
                id: id.map(TaskId::from),
                title,
                priority: priority.into(),
                notes,
                due_date: due,
                subtasks: steps
                    .into_iter()
                    .map(taskmate_core::tasks::Subtask::new)
                    .collect(),
            };
            let replacing = draft
                .id
                .as_ref()
                .is_some_and(|id| store.find_by_id(id).is_some());
            let task = store
                .create(draft)
                .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
            if replacing {
                println!("Updated task {}: {}", task.id, task.title);
            } else {
                println!("Created task {}: {}", task.id, task.title);
            }
        }
        TaskCommand::Toggle { id } => {
            let id = resolve_id(&store, &id)?;
            rules::toggle_checkbox(&mut store, &id)
                .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
            if let Some(task) = store.find_by_id(&id) {
                println!("{}: {}", task.status.label(), task.title);
            }
        }
        TaskCommand::Move { id, column } => {
            let id = resolve_id(&store, &id)?;
            let column: TaskStatus = column.into();
            rules::drop_on_column(&mut store, &id, column)
                .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
            if let Some(task) = store.find_by_id(&id) {
                println!("Moved to {}: {}", column.label(), task.title);
            }
        }
        TaskCommand::Check { id, step } => {
            let id = resolve_id(&store, &id)?;
            if step == 0 {
                color_eyre::eyre::bail!("steps are numbered from 1");
            }
            store
                .toggle_subtask(&id, step - 1)
                .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
            if let Some(task) = store.find_by_id(&id) {
                if let Some((done, total)) = task.progress() {
                    println!("{}: {done}/{total} steps", task.title);
                }
            }
        }
        TaskCommand::Delete { id } => {
            // Deleting a stale id is a silent no-op.
            let id = match resolve_id(&store, &id) {
                Ok(id) => id,
                Err(_) => return Ok(()),
            };
            store
                .delete(&id)
                .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}

/// `board` subcommand: print the three kanban columns.
pub fn print_board(config: &config::Config) -> Result<()> {
    let store = TaskStore::open(storage::store_from_config(config)?);
    let buckets = views::kanban_buckets(store.all());

    for status in [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done] {
        let column = buckets.column(status);
        println!("{} ({})", status.heading(), column.len());
        for task in column {
            println!("  {} [{}]", task.title, task.priority.label());
        }
    }
    Ok(())
}

/// `stats` subcommand: print per-status counts.
pub fn print_stats(config: &config::Config) -> Result<()> {
    let store = TaskStore::open(storage::store_from_config(config)?);
    let counts = views::status_counts(store.all());
    println!("todo: {}", counts.todo);
    println!("doing: {}", counts.doing);
    println!("done: {}", counts.done);
    println!("total: {}", counts.total());
    Ok(())
}

fn print_task(task: &Task) {
    let marker = if task.status == TaskStatus::Done {
        "x"
    } else {
        " "
    };
    println!(
        "[{marker}] {} [{}] ({})",
        task.title,
        task.priority.label(),
        task.id
    );
    if let Some(notes) = &task.notes {
        println!("    {notes}");
    }
    if let Some(due) = &task.due_date {
        println!("    due: {due}");
    }
    if let Some((done, total)) = task.progress() {
        println!("    {done}/{total} steps");
    }
}

/// Resolves a full id or any unique prefix of one.
fn resolve_id(store: &TaskStore<JsonFileStore>, input: &str) -> Result<TaskId> {
    let exact = TaskId::from(input);
    if store.find_by_id(&exact).is_some() {
        return Ok(exact);
    }

    let matches: Vec<&Task> = store
        .all()
        .iter()
        .filter(|t| t.id.as_str().starts_with(input))
        .collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(color_eyre::eyre::eyre!("no task matches id '{input}'")),
        _ => Err(color_eyre::eyre::eyre!(
            "id '{input}' is ambiguous ({} matches)",
            matches.len()
        )),
    }
}
