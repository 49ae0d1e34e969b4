//! Subtran - Chunked Subtitle Translation
//!
//! Command-line host for the translation core: picks subtitle files and
//! target languages, renders job progress and saves the translated files.

use anyhow::Result;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subtran::cli::{Args, Commands};
use subtran::config::Config;
use subtran::error::SubtranError;
use subtran::store::{JobStatus, ProgressStore};
use subtran::translate::{parse_language_list, LANGUAGES};
use subtran::workflow::{CancelFlag, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Subtran - Chunked Subtitle Translation");

    let config = Config::load(args.config.as_ref())?;

    match args.command {
        Commands::Languages => {
            println!("\nAvailable Languages:");
            println!("{:<8} {:<20}", "Code", "Name");
            println!("{}", "-".repeat(28));
            for (code, name) in LANGUAGES {
                println!("{:<8} {:<20}", code, name);
            }
        }
        Commands::InitConfig { output } => {
            if output.exists() {
                return Err(SubtranError::Config(format!(
                    "{} already exists, refusing to overwrite",
                    output.display()
                ))
                .into());
            }
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
        Commands::Translate { input, target_langs, output_dir } => {
            let languages = require_languages(&target_langs)?;
            let (workflow, cancel) = start_workflow(config)?;
            let progress = spawn_progress_display(workflow.store().clone());

            let written = workflow
                .process_files(input.as_slice(), &languages, output_dir.as_deref(), &cancel)
                .await?;

            finish(&workflow, progress, written).await;
        }
        Commands::Batch { input_dir, target_langs, output_dir } => {
            let languages = require_languages(&target_langs)?;
            let (workflow, cancel) = start_workflow(config)?;
            let progress = spawn_progress_display(workflow.store().clone());

            let written = workflow
                .process_directory(&input_dir, &languages, output_dir.as_deref(), &cancel)
                .await?;

            finish(&workflow, progress, written).await;
        }
    }

    info!("Subtran completed successfully");
    Ok(())
}

fn require_languages(target_langs: &str) -> Result<Vec<String>> {
    let languages = parse_language_list(target_langs);
    if languages.is_empty() {
        return Err(SubtranError::Config("No target languages given".to_string()).into());
    }
    Ok(languages)
}

/// Build the workflow (a missing endpoint is fatal here) and wire Ctrl-C
/// to cancellation
fn start_workflow(config: Config) -> Result<(Workflow, CancelFlag)> {
    let workflow = Workflow::new(config, Arc::new(ProgressStore::new()))?;

    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current chunk");
            on_signal.cancel();
        }
    });

    Ok((workflow, cancel))
}

/// Draw one bar per file × language from store events
fn spawn_progress_display(store: Arc<ProgressStore>) -> JoinHandle<()> {
    let mut events = store.subscribe();
    tokio::spawn(async move {
        let multi = MultiProgress::new();
        let style = ProgressStyle::with_template("{prefix:>32} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let mut bars: HashMap<(String, String), ProgressBar> = HashMap::new();

        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Progress display skipped {} updates", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let bar = bars
                .entry((event.file.clone(), event.language.clone()))
                .or_insert_with(|| {
                    let bar = multi.add(ProgressBar::new(100));
                    bar.set_style(style.clone());
                    bar.set_prefix(format!("{} [{}]", event.file, event.language));
                    bar
                });
            bar.set_position(event.progress as u64);
            match event.status {
                JobStatus::Completed => bar.finish_with_message("done"),
                JobStatus::Partial { failed_chunks } => {
                    bar.finish_with_message(format!("done, {} chunks untranslated", failed_chunks))
                }
                _ => {}
            }
        }
    })
}

async fn finish(workflow: &Workflow, progress: JoinHandle<()>, written: Vec<PathBuf>) {
    progress.abort();
    let _ = progress.await;

    let store = workflow.store();
    println!("\nTranslation Summary:");
    println!("{:<40} {:<10} {:<10} {:<30}", "File", "Language", "Progress", "Status");
    println!("{}", "-".repeat(90));
    for file in store.files() {
        for job in store.snapshot(&file) {
            let status = match job.status {
                JobStatus::Partial { failed_chunks } => format!("Partial ({} chunks untranslated)", failed_chunks),
                other => format!("{:?}", other),
            };
            println!("{:<40} {:<10} {:<10} {:<30}", file, job.language, format!("{}%", job.progress), status);
        }
    }

    println!("\nWrote {} file(s):", written.len());
    for path in written {
        println!("  {}", path.display());
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".subtran").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subtran.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subtran.log").display());

    Ok(())
}
