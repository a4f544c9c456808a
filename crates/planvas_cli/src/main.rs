//! Command-line probe over a stored planner session.
//!
//! # Responsibility
//! - Verify `planvas_core` linkage without the Flutter runtime.
//! - Print ranks, schedules and CSV exports of the active project.

use clap::{Args as ClapArgs, Parser, Subcommand};
use planvas_core::db::open_db;
use planvas_core::{PlannerSession, SessionStore, SqliteStateRepository};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "planvas", version, about = "Inspect a Planvas planner database")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database holding the planner state.
    #[arg(long, default_value = "planvas.sqlite3", global = true)]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging stays off without it.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print core ping and version.
    Ping,
    /// List projects; `*` marks the active one.
    Projects,
    /// Print the rank of every task in the active project.
    Ranks,
    /// Print the schedule of the active project.
    Schedule(ScheduleArgs),
    /// Write the schedule as CSV (stdout unless `--out` is given).
    Export(ExportArgs),
}

#[derive(ClapArgs, Debug, Clone)]
struct ScheduleArgs {
    /// Count only Monday to Friday as working days.
    #[arg(long)]
    exclude_weekends: bool,
}

#[derive(ClapArgs, Debug, Clone)]
struct ExportArgs {
    #[arg(long)]
    exclude_weekends: bool,

    /// Target file; a directory gets the default export file name.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    if let Commands::Ping = args.command {
        println!("planvas_core ping={}", planvas_core::ping());
        println!("planvas_core version={}", planvas_core::core_version());
        return Ok(());
    }

    if let Some(log_dir) = &args.log_dir {
        planvas_core::init_logging(
            planvas_core::default_log_level(),
            &log_dir.to_string_lossy(),
        )?;
    }

    let session = load_session(&args.db)?;
    match args.command {
        Commands::Ping => {}
        Commands::Projects => {
            for project in session.projects() {
                let marker = if session.current_project_id() == Some(project.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {} {} ({} tasks)", project.id, project.name, project.tasks.len());
            }
        }
        Commands::Ranks => {
            let ranks = session.ranks();
            for task in session.tasks() {
                let rank = ranks.get(&task.id).copied().unwrap_or(0);
                println!("{rank}\t{}\t{}\t{}", task.id, task.status, task.name);
            }
        }
        Commands::Schedule(schedule) => {
            for row in session.schedule(schedule.exclude_weekends) {
                println!(
                    "{}\t{}\t{}\t{}%\t{}\t[{}]",
                    row.task_id,
                    row.start_date(),
                    row.end_date(),
                    row.percent_complete,
                    row.name,
                    row.predecessor_ids
                );
            }
        }
        Commands::Export(export) => {
            let csv = session
                .export_csv(export.exclude_weekends)
                .map_err(|err| format!("export failed: {err}"))?;
            match export.out {
                Some(out) => {
                    let target = if out.is_dir() { out.join(&csv.file_name) } else { out };
                    std::fs::write(&target, csv.content)
                        .map_err(|err| format!("failed to write `{}`: {err}", target.display()))?;
                    println!("exported {}", target.display());
                }
                None => println!("{}", csv.content),
            }
        }
    }
    Ok(())
}

fn load_session(db: &Path) -> Result<PlannerSession, String> {
    let conn = open_db(db).map_err(|err| err.to_string())?;
    SessionStore::new(SqliteStateRepository::new(&conn))
        .load()
        .map_err(|err| format!("failed to load planner state: {err}"))
}
