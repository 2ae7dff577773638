use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use eyre::{Result, WrapErr};

use tasklist::commands::*;
use tasklist::config::Config;
use tasklist::query::{Filter, PriorityFilter, SortKey, StatusFilter};
use tasklist::tui::run_tui;
use tasklist::{logging, FileStorage, Priority, TaskStore};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Personal task list", long_about = None)]
struct Cli {
    /// Directory holding the task file (overrides TASKLIST_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD or "YYYY-MM-DD HH:MM" (local time)
        #[arg(long)]
        due: Option<String>,
        /// Priority: 0-3 or low, medium, high, urgent
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// List tasks
    List {
        /// all, pending or completed
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        /// all, or a priority
        #[arg(short, long, default_value = "all")]
        priority: PriorityFilter,
        /// created, priority, duedate or title
        #[arg(long, default_value = "created")]
        sort: SortKey,
    },
    /// Toggle a task between pending and completed
    Toggle {
        id: String,
    },
    /// Remove a task
    Remove {
        id: String,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New due date
        #[arg(long, conflicts_with = "no_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        no_due: bool,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Remove all completed tasks
    ClearCompleted,
    /// Show task counts
    Stats,
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir);
    config
        .ensure_data_dir()
        .wrap_err_with(|| format!("Failed to create {}", config.data_dir.display()))?;

    let interactive = matches!(cli.command, None | Some(Commands::Ui));
    if interactive {
        logging::init_file(&config.log_path())?;
    } else {
        logging::init_stderr()?;
    }

    let mut store = TaskStore::open(FileStorage::new(&config.data_dir));

    match cli.command {
        Some(Commands::Add { title, description, due, priority }) => {
            cmd_add(&mut store, title, description, due, priority)?
        }
        Some(Commands::List { status, priority, sort }) => {
            cmd_list(&store, Filter { status, priority }, sort)
        }
        Some(Commands::Toggle { id }) => cmd_toggle(&mut store, &id)?,
        Some(Commands::Remove { id }) => cmd_remove(&mut store, &id)?,
        Some(Commands::Edit { id, title, description, due, no_due, priority }) => {
            cmd_edit(&mut store, &id, title, description, due, no_due, priority)?
        }
        Some(Commands::ClearCompleted) => cmd_clear_completed(&mut store)?,
        Some(Commands::Stats) => cmd_stats(&store),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tasklist", &mut io::stdout());
        }
        Some(Commands::Ui) | None => run_tui(store)?,
    }
    Ok(())
}
