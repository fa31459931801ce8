use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskdeck add "Buy milk" --priority high
    /// Example: taskdeck add "Buy milk" --deadline 2026-09-01T10:00:00Z
    Add {
        text: Option<String>,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,
        /// RFC3339 timestamp or YYYY-MM-DD (local midnight)
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List tasks, most recent first
    ///
    /// Example: taskdeck list
    /// Example: taskdeck list --pending
    List {
        /// Only open tasks
        #[arg(long, conflicts_with = "completed")]
        pending: bool,
        /// Only completed tasks
        #[arg(long)]
        completed: bool,
    },
    /// Show details of a task
    ///
    /// Example: taskdeck show 1756380000000
    Show {
        id: i64,
    },
    /// Mark a task as completed (cancels its deadline alert)
    ///
    /// Example: taskdeck done 1756380000000
    Done {
        id: i64,
    },
    /// Reopen a completed task
    ///
    /// Example: taskdeck reopen 1756380000000
    Reopen {
        id: i64,
    },
    /// Delete a task (cancels its deadline alert)
    ///
    /// Example: taskdeck delete 1756380000000
    Delete {
        id: i64,
    },
    /// Handle a notification action event (invoked by a fired alert)
    #[command(hide = true)]
    NotifyAction {
        action: String,
        id: i64,
    },
}
