use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, WrapErr};
use taskdeck::config::{self, Backend, Config};
use taskdeck::kv::{FileKv, KvStore, SqliteKv};
use taskdeck::model::{Completion, Task, TaskStatus};
use taskdeck::store::TaskStore;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Track tasks through scheduled, in-progress and completed")]
#[command(version)]
struct Cli {
    /// Directory holding the task data (default: platform data dir)
    #[arg(short = 's', long)]
    store_path: Option<PathBuf>,

    /// Storage backend: sqlite or file
    #[arg(short, long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task in the scheduled stage
    Add {
        title: String,

        /// Longer description
        #[arg(short, long)]
        desc: Option<String>,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
    },

    /// Move a scheduled task to in-progress
    Start { id: String },

    /// Move an in-progress task to completed
    Complete { id: String },

    /// Remove a task permanently
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks, all buckets or one
    List {
        /// scheduled, in-progress or completed
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one task in full
    Show { id: String },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load()?;
    let mut store = open_store(&cli, &cfg)?;

    match cli.command {
        Commands::Add { title, desc, due } => {
            let task = store.create_task(&title, desc.as_deref(), &due)?;
            println!("Added task {}", task.id);
            render_task(&task)?;
        }
        Commands::Start { id } => {
            let task = store.advance_status(&id, TaskStatus::InProgress)?;
            println!("Started {}", task.title.bold());
        }
        Commands::Complete { id } => {
            let task = store.advance_status(&id, TaskStatus::Completed)?;
            let badge = completion_badge(store.classify_completion(&task.id)?);
            println!("Completed {} [{badge}]", task.title.bold());
        }
        Commands::Delete { id, yes } => {
            if !yes && !confirm_delete(&store, &id)? {
                println!("Aborted");
                return Ok(());
            }
            store.delete_task(&id)?;
            println!("Deleted {id}");
        }
        Commands::List { status } => match status {
            Some(status) => render_bucket(&store, status.parse()?)?,
            None => {
                for status in [TaskStatus::Scheduled, TaskStatus::InProgress, TaskStatus::Completed] {
                    render_bucket(&store, status)?;
                    println!();
                }
            }
        },
        Commands::Show { id } => {
            let task = store
                .get(&id)
                .cloned()
                .ok_or(taskdeck::Error::NotFound(id))?;
            render_task(&task)?;
            println!("    created {}", task.created_at.to_rfc3339());
            if let Some(completed_at) = task.completed_at {
                println!("    completed {}", completed_at.to_rfc3339());
            }
        }
    }

    Ok(())
}

fn open_store(cli: &Cli, cfg: &Config) -> Result<TaskStore<Box<dyn KvStore>>> {
    let data_dir = cli
        .store_path
        .clone()
        .or_else(|| cfg.data_dir.clone())
        .unwrap_or_else(config::default_data_dir);

    let backend = match cli.backend.as_deref() {
        Some(name) => name.parse::<Backend>()?,
        None => cfg.backend.unwrap_or_default(),
    };

    let kv: Box<dyn KvStore> = match backend {
        Backend::Sqlite => Box::new(SqliteKv::open(data_dir.join("taskdeck.db"))?),
        Backend::File => Box::new(FileKv::open(&data_dir)?),
    };

    TaskStore::open(kv).wrap_err("failed to open task store")
}

fn confirm_delete(store: &TaskStore<Box<dyn KvStore>>, id: &str) -> Result<bool> {
    let name = store.get(id).map(|t| t.title.clone()).unwrap_or_else(|| id.to_string());
    print!("Delete task \"{name}\"? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn render_bucket(store: &TaskStore<Box<dyn KvStore>>, status: TaskStatus) -> Result<()> {
    let tasks = store.list_by_status(status);
    println!("{} ({})", bucket_title(status).bold(), tasks.len());

    if tasks.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for task in tasks {
        render_task(task)?;
    }
    Ok(())
}

fn bucket_title(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Scheduled => "Scheduled",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Completed => "Completed",
    }
}

fn render_task(task: &Task) -> Result<()> {
    let mut line = format!("  {}", task.title.bold());
    if task.status == TaskStatus::Completed {
        let badge = completion_badge(task.classify_completion()?);
        line.push_str(&format!(" [{badge}]"));
    }
    println!("{line}");

    let desc = if task.description.is_empty() {
        "No description provided."
    } else {
        &task.description
    };
    println!("    {}", desc.dimmed());
    println!("    due {}  id {}", task.due_date, task.id.dimmed());

    Ok(())
}

fn completion_badge(completion: Completion) -> colored::ColoredString {
    match completion {
        Completion::OnTime => "On Time".green(),
        Completion::Late => "Late".red(),
    }
}
