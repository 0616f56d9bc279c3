//! Pure, side-effect-free projections over a snapshot of the task
//! collection: the filtered list, the kanban column grouping, and the
//! per-status tallies behind the analytics view. None of these own state;
//! they recompute from `&[Task]` every time.

use crate::tasks::{Task, TaskStatus};

/// Status predicate applied by the list view, alongside the search term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Everything not yet done.
    Active,
    /// Done tasks only.
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status != TaskStatus::Done,
            StatusFilter::Completed => status == TaskStatus::Done,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }

    /// Next filter in the all → active → completed cycle.
    pub fn cycled(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }
}

/// List-view filter: case-insensitive substring match on the title combined
/// with the status predicate. Preserves store order; an empty result is a
/// valid state, not an error.
pub fn filter_list<'a>(tasks: &'a [Task], search: &str, filter: StatusFilter) -> Vec<&'a Task> {
    let needle = search.to_lowercase();
    tasks
        .iter()
        .filter(|task| task.title.to_lowercase().contains(&needle) && filter.matches(task.status))
        .collect()
}

/// The three kanban columns, each preserving store order.
#[derive(Debug, Default)]
pub struct KanbanBuckets<'a> {
    pub todo: Vec<&'a Task>,
    pub doing: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> KanbanBuckets<'a> {
    pub fn column(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::Doing => &self.doing,
            TaskStatus::Done => &self.done,
        }
    }
}

/// Partitions tasks into the three status columns in a single pass.
pub fn kanban_buckets(tasks: &[Task]) -> KanbanBuckets<'_> {
    let mut buckets = KanbanBuckets::default();
    for task in tasks {
        match task.status {
            TaskStatus::Todo => buckets.todo.push(task),
            TaskStatus::Doing => buckets.doing.push(task),
            TaskStatus::Done => buckets.done.push(task),
        }
    }
    buckets
}

/// Fixed-size tally backing the analytics chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub todo: usize,
    pub doing: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.todo + self.doing + self.done
    }
}

/// Counts tasks per status; every task lands in exactly one bucket.
pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Todo => counts.todo += 1,
            TaskStatus::Doing => counts.doing += 1,
            TaskStatus::Done => counts.done += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Priority, TaskId};
    use chrono::Utc;

    fn task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: TaskId::generate(),
            title: title.into(),
            priority: Priority::default(),
            notes: None,
            due_date: None,
            status,
            subtasks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("Write report", TaskStatus::Todo),
            task("Review report", TaskStatus::Doing),
            task("File report", TaskStatus::Done),
            task("Water plants", TaskStatus::Todo),
        ]
    }

    #[test]
    fn active_filter_excludes_done() {
        let tasks = sample();
        let active = filter_list(&tasks, "", StatusFilter::Active);
        assert_eq!(active.len(), 3);
        assert!(active.iter().all(|t| t.status != TaskStatus::Done));
    }

    #[test]
    fn completed_filter_keeps_only_done() {
        let tasks = sample();
        let completed = filter_list(&tasks, "", StatusFilter::Completed);
        assert_eq!(completed.len(), 1);
        assert!(completed.iter().all(|t| t.status == TaskStatus::Done));
    }

    #[test]
    fn search_is_case_insensitive_and_composes_with_status() {
        let tasks = sample();
        let hits = filter_list(&tasks, "REPORT", StatusFilter::All);
        assert_eq!(hits.len(), 3);

        let active_hits = filter_list(&tasks, "report", StatusFilter::Active);
        assert_eq!(active_hits.len(), 2);
    }

    #[test]
    fn empty_result_is_a_valid_state() {
        let tasks = sample();
        assert!(filter_list(&tasks, "no such task", StatusFilter::All).is_empty());
    }

    #[test]
    fn filter_preserves_store_order() {
        let tasks = sample();
        let todos = filter_list(&tasks, "", StatusFilter::Active);
        assert_eq!(todos[0].title, "Write report");
        assert_eq!(todos[1].title, "Review report");
        assert_eq!(todos[2].title, "Water plants");
    }

    #[test]
    fn buckets_partition_every_task_exactly_once() {
        let tasks = sample();
        let buckets = kanban_buckets(&tasks);
        assert_eq!(buckets.todo.len(), 2);
        assert_eq!(buckets.doing.len(), 1);
        assert_eq!(buckets.done.len(), 1);
        let total = buckets.todo.len() + buckets.doing.len() + buckets.done.len();
        assert_eq!(total, tasks.len());
    }

    #[test]
    fn counts_match_statuses_and_sum_to_total() {
        let tasks = vec![
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Todo),
            task("c", TaskStatus::Doing),
            task("d", TaskStatus::Done),
        ];
        let counts = status_counts(&tasks);
        assert_eq!(
            counts,
            StatusCounts {
                todo: 2,
                doing: 1,
                done: 1
            }
        );
        assert_eq!(counts.total(), tasks.len());
    }

    #[test]
    fn filter_cycle_wraps_around() {
        let mut filter = StatusFilter::All;
        filter = filter.cycled();
        assert_eq!(filter, StatusFilter::Active);
        filter = filter.cycled();
        assert_eq!(filter, StatusFilter::Completed);
        filter = filter.cycled();
        assert_eq!(filter, StatusFilter::All);
    }
}
