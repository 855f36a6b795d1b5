//! Notemind - personal idea journal with background AI enrichment
//!
//! Headless front end: notes and questions come in through subcommands,
//! the background daemon enriches and synthesizes on a schedule.

use anyhow::Result;
use clap::{Parser, Subcommand};
use notemind::{
    assistant::QueryAssistant,
    config::NotemindConfig,
    gateway::{LanguageModel, OpenAiGateway},
    memory::MemoryStore,
    notes::{FileNoteStore, Note, NoteRepository},
    pipeline::{CycleOutcome, Processor},
    scheduler::ProcessingScheduler,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "notemind")]
#[command(version)]
#[command(about = "Personal idea journal with background AI enrichment")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "NOTEMIND_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the background daemon (scheduled enrichment + synthesis)
    Run,

    /// Run one enrichment + synthesis cycle now
    Analyze,

    /// Ask a question about your note history
    Ask {
        /// The question
        question: String,
    },

    /// Add a new note
    Add {
        /// Note content
        content: String,
    },

    /// Replace the content of a note
    Edit {
        /// Note ID
        id: u64,

        /// New note content
        content: String,
    },

    /// List notes, optionally filtered by a search term
    List {
        /// Case-insensitive substring filter
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Delete a note
    Delete {
        /// Note ID
        id: u64,
    },

    /// Show synthesized insights
    Insights,

    /// Show upcoming reminders
    Reminders,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

struct Engine {
    notes: Arc<FileNoteStore>,
    memory: Arc<MemoryStore>,
    gateway: Arc<dyn LanguageModel>,
    configured: bool,
}

async fn build_engine(config: &NotemindConfig) -> Result<Engine> {
    let data_dir = config.storage.resolve_data_dir();
    let notes = Arc::new(FileNoteStore::open(&data_dir).await?);
    let memory = Arc::new(MemoryStore::open(&data_dir).await?);
    let gateway: Arc<dyn LanguageModel> = Arc::new(OpenAiGateway::new(&config.ai)?);
    Ok(Engine {
        notes,
        memory,
        gateway,
        configured: config.ai.is_configured(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("notemind={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = cli.config.unwrap_or_else(NotemindConfig::default_path);
    let config = if config_path.exists() {
        NotemindConfig::load(&config_path)?
    } else {
        NotemindConfig::default()
    };

    match cli.command {
        Commands::Run => run_daemon(config).await?,
        Commands::Analyze => run_analyze(config).await?,
        Commands::Ask { question } => run_ask(config, &question).await?,
        Commands::Add { content } => {
            let engine = build_engine(&config).await?;
            let note = engine.notes.create(&content).await?;
            println!("Added note {}", note.id);
        }
        Commands::Edit { id, content } => {
            let engine = build_engine(&config).await?;
            if engine.notes.update_content(id, &content).await? {
                println!("Updated note {}", id);
            } else {
                println!("No note with ID {}", id);
            }
        }
        Commands::List { query } => {
            let engine = build_engine(&config).await?;
            let notes = match query {
                Some(q) => engine.notes.search(&q).await?,
                None => engine.notes.list_all().await?,
            };
            print_notes(&notes);
        }
        Commands::Delete { id } => {
            let engine = build_engine(&config).await?;
            if engine.notes.delete(id).await? {
                println!("Deleted note {}", id);
            } else {
                println!("No note with ID {}", id);
            }
        }
        Commands::Insights => {
            let engine = build_engine(&config).await?;
            let memory = engine.memory.load().await;
            if memory.insights.is_empty() {
                println!("No insights yet. Run `notemind analyze` first.");
            }
            for insight in &memory.insights {
                println!(
                    "[{}] {}\n    {}",
                    insight.timestamp.format("%Y-%m-%d %H:%M"),
                    insight.title,
                    insight.content
                );
            }
        }
        Commands::Reminders => {
            let engine = build_engine(&config).await?;
            let memory = engine.memory.load().await;
            let today = chrono::Utc::now().date_naive();
            let upcoming = memory.upcoming_reminders(today);
            if upcoming.is_empty() {
                println!("No upcoming reminders.");
            }
            for reminder in upcoming {
                println!("{}  {}", reminder.due_date, reminder.content);
            }
        }
        Commands::Config { default } => {
            let shown = if default {
                NotemindConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

async fn run_daemon(config: NotemindConfig) -> Result<()> {
    tracing::info!("Starting Notemind daemon");

    let engine = build_engine(&config).await?;
    if !engine.configured {
        tracing::warn!("No API key configured, AI features are disabled");
    }

    let processor = Arc::new(Processor::new(
        engine.gateway,
        engine.notes,
        engine.memory,
        engine.configured,
    ));
    let scheduler = ProcessingScheduler::new(processor);

    if config.scheduler.enabled {
        scheduler.start(Duration::from_secs(config.scheduler.interval_secs));
    } else {
        tracing::info!("Automatic analysis disabled by configuration");
    }

    tracing::info!("Notemind daemon is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    Ok(())
}

async fn run_analyze(config: NotemindConfig) -> Result<()> {
    let engine = build_engine(&config).await?;
    let processor = Processor::new(
        engine.gateway,
        engine.notes,
        engine.memory,
        engine.configured,
    );

    match processor.run_cycle().await {
        CycleOutcome::Completed(report) => {
            println!(
                "Cycle complete: {} tagged, {} summarized, {} failed",
                report.tagged, report.summarized, report.failed
            );
        }
        CycleOutcome::AlreadyRunning => println!("A processing cycle is already running."),
        CycleOutcome::Disabled => {
            println!("No API key configured; set one in the configuration file first.")
        }
        CycleOutcome::Failed => println!("Cycle failed; see the log for details."),
    }
    Ok(())
}

async fn run_ask(config: NotemindConfig, question: &str) -> Result<()> {
    let engine = build_engine(&config).await?;
    let assistant = QueryAssistant::new(engine.gateway, engine.configured);
    let memory = engine.memory.load().await;
    println!("{}", assistant.answer(question, &memory).await);
    Ok(())
}

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes.");
        return;
    }
    for note in notes {
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", note.tags.join(", "))
        };
        println!(
            "{:>4}  {}  {}{}",
            note.id,
            note.timestamp.format("%Y-%m-%d %H:%M"),
            note.content,
            tags
        );
        if let Some(summary) = note.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            println!("      ↳ {}", summary);
        }
    }
}
