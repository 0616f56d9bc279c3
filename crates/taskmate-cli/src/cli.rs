use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskmate_core::{
    tasks::{Priority, TaskStatus},
    views::StatusFilter,
};

/// CLI surface definition. The TUI is the default when no subcommand is
/// given; everything it can do is also reachable from the command line.
#[derive(Parser, Debug)]
#[command(
    name = "taskmate",
    about = "Local-first personal task manager with a kanban board and focus timer",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch the interactive TUI (press q to exit).
    Tui,
    /// Print version and exit.
    Version,
    /// Manage tasks from the command line.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Print the kanban board grouping.
    Board,
    /// Print per-status task counts.
    Stats,
    /// Export the full task collection as a JSON snapshot.
    Export {
        /// Destination file.
        #[arg(default_value = "mytasks.json")]
        path: PathBuf,
    },
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// List tasks, optionally filtered by search term and status.
    List {
        /// Case-insensitive substring match on the title.
        #[arg(long, default_value = "")]
        search: String,
        /// Status predicate.
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
    },
    /// Add a task; with --id of an existing task, replace it (edit).
    Add {
        title: String,
        /// Explicit id (import/edit path); generated when absent.
        #[arg(long)]
        id: Option<String>,
        #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        #[arg(long)]
        notes: Option<String>,
        /// Due date, stored verbatim.
        #[arg(long)]
        due: Option<String>,
        /// Checklist step; repeat for several.
        #[arg(long = "step")]
        steps: Vec<String>,
    },
    /// Flip a task between done and todo.
    Toggle { id: String },
    /// Move a task to a kanban column.
    Move {
        id: String,
        #[arg(value_enum)]
        column: ColumnArg,
    },
    /// Toggle a checklist step by its 1-based position.
    Check { id: String, step: usize },
    /// Delete a task (unknown ids are ignored).
    Delete { id: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for StatusFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => StatusFilter::All,
            FilterArg::Active => StatusFilter::Active,
            FilterArg::Completed => StatusFilter::Completed,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnArg {
    Todo,
    Doing,
    Done,
}

impl From<ColumnArg> for TaskStatus {
    fn from(arg: ColumnArg) -> Self {
        match arg {
            ColumnArg::Todo => TaskStatus::Todo,
            ColumnArg::Doing => TaskStatus::Doing,
            ColumnArg::Done => TaskStatus::Done,
        }
    }
}
