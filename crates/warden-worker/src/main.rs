//! `warden-worker`: the process that pulls analysis jobs off the queue
//! and drives them through retrieval and agent orchestration.

#![warn(missing_docs)]

mod wiring;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use warden_domain::entities::{JobMessage, JobPriority, JobType, Project, ProjectStatus, SourceKind};
use warden_infrastructure::config::AppConfig;

#[derive(Parser)]
#[command(name = "warden-worker", about = "Durable code-review analysis worker")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "warden.toml", env = "WARDEN_CONFIG_PATH")]
    config: String,

    /// Root directory under which each project's working tree is
    /// materialized (`<root>/<project-id>`).
    #[arg(long, default_value = "./warden-data/projects", env = "WARDEN_WORKING_DIR")]
    working_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Registers a project from a local source directory, enqueues one
    /// analysis job, and drives the consumer loop until it completes.
    Analyze {
        /// Directory containing the project's source files.
        source: PathBuf,
        /// Human-facing project name; defaults to the directory's name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Runs the consumer loop indefinitely, processing whatever jobs are
    /// enqueued, until interrupted.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("warden-worker: {e}, falling back to defaults");
        AppConfig::default()
    });

    let _logging_guard = warden_infrastructure::logging::init(&config.logging)?;
    let ctx = wiring::build(&config, cli.working_dir).await?;

    spawn_background_loops(&ctx, &config);

    match cli.command {
        Command::Analyze { source, name } => run_analyze(&ctx, source, name).await?,
        Command::Serve => run_serve(&ctx, &config).await?,
    }

    Ok(())
}

fn spawn_background_loops(ctx: &wiring::AppContext, config: &AppConfig) {
    let memory = ctx.memory.clone();
    let memory_interval = Duration::from_secs(config.memory_management.check_interval_seconds.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(memory_interval);
        loop {
            ticker.tick().await;
            memory.refresh();
        }
    });

    if config.watchdog.enabled {
        let watchdog = ctx.watchdog.clone();
        let watchdog_interval = Duration::from_secs(config.watchdog.check_interval_seconds.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(watchdog_interval);
            loop {
                ticker.tick().await;
                watchdog.scan_once();
            }
        });
    }
}

async fn run_analyze(ctx: &wiring::AppContext, source: PathBuf, name: Option<String>) -> anyhow::Result<()> {
    let name = name.unwrap_or_else(|| {
        source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed-project".to_string())
    });

    let mut project = Project::new(name, SourceKind::Archive);
    let destination = ctx.working_directory_root.join(project.id.to_string());
    copy_dir_recursive(&source, &destination)?;

    project.transition_to(ProjectStatus::FilesReady)?;
    warden_domain::ports::ProjectRepository::save(ctx.repositories.as_ref(), &project).await?;

    project.transition_to(ProjectStatus::Queued)?;
    warden_domain::ports::ProjectRepository::save(ctx.repositories.as_ref(), &project).await?;

    ctx.queue.enqueue(JobMessage {
        job_id: uuid::Uuid::new_v4(),
        project_id: project.id,
        job_type: JobType::Analysis,
        priority: JobPriority::Normal,
        delivery_count: 0,
        enqueued_at: chrono::Utc::now(),
        scheduled_for: None,
        correlation_id: None,
        metadata: std::collections::HashMap::new(),
    });

    info!(project_id = %project.id, "submitted project for analysis");

    let processed = ctx
        .consumer
        .process_next(&ctx.working_directory_root, ctx.visibility_timeout_secs)
        .await?;
    if !processed {
        error!("job was enqueued but the consumer found nothing to process");
    }

    if let Some(report) = warden_domain::ports::ReportRepository::get_for_project(ctx.repositories.as_ref(), project.id).await? {
        println!("health_score={:.1}", report.health_score);
        println!("{}", report.summary);
    } else {
        println!("analysis did not produce a report; check logs for failure detail");
    }

    Ok(())
}

async fn run_serve(ctx: &wiring::AppContext, config: &AppConfig) -> anyhow::Result<()> {
    info!("worker entering serve loop");
    let mut shutdown = Box::pin(tokio::signal::ctrl_c());
    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("shutdown signal received, draining in-flight work");
                break;
            }
            result = ctx.consumer.process_next(&ctx.working_directory_root, ctx.visibility_timeout_secs) => {
                match result {
                    Ok(true) => {}
                    Ok(false) => tokio::time::sleep(Duration::from_secs(config.worker.retry_delay_seconds.max(1))).await,
                    Err(e) => {
                        error!(error = %e, "consumer loop error");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }
    }
    Ok(())
}

fn copy_dir_recursive(source: &std::path::Path, destination: &std::path::Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(destination)?;
    for entry in walkdir::WalkDir::new(source).into_iter().filter_map(std::result::Result::ok) {
        let relative = entry.path().strip_prefix(source)?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
