use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use liftlog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Workout tracking and progress engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Profile that owns the data
    #[arg(long, global = true, default_value = "default")]
    owner: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session from one day of a stored routine
    Start {
        /// Routine id
        #[arg(long)]
        routine: String,

        /// Day index within the routine
        #[arg(long, default_value_t = 0)]
        day: usize,

        /// Session date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record a performed set on the current session
    Log {
        exercise_id: String,
        set_index: u32,

        #[arg(long)]
        reps: u32,

        #[arg(long)]
        weight: f64,

        /// Perceived effort, 1-10
        #[arg(long)]
        effort: Option<u8>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Complete the current session and append it to the log
    Finish {
        /// Session duration in minutes
        #[arg(long)]
        duration_min: Option<u32>,
    },

    /// Show the current session's progress
    Status,

    /// List stored routines
    Routines,

    /// Week overview with streaks
    Week {
        /// Reference date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Total training volume per muscle group
    Volume,

    /// Exercise frequency across the session history
    Freq,

    /// Personal records derived from the session history
    Prs,

    /// Estimate a one-rep max
    Onerm {
        weight: f64,
        reps: u32,

        /// Formula (epley or brzycki)
        #[arg(long)]
        formula: Option<String>,
    },

    /// Suggest a per-side plate loadout for a target weight
    Plates {
        target: f64,

        /// Bar weight override
        #[arg(long)]
        bar: Option<f64>,
    },

    /// Log a cardio activity
    Cardio {
        activity: String,
        distance_km: f64,
        duration_min: f64,

        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record a body measurement
    Measure {
        body_weight_kg: f64,

        /// Body fat percentage
        #[arg(long)]
        fat: Option<f64>,

        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Import a JSON bundle (profile, routines, session logs)
    Import { file: PathBuf },

    /// Export everything as a JSON bundle
    Export { file: PathBuf },

    /// Export the session history as CSV
    ExportCsv { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    liftlog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = FileStore::new(data_dir.join("store"));
    let owner = cli.owner;

    tracing::debug!(data_dir = %data_dir.display(), owner = %owner, "liftlog starting");

    match cli.command {
        Commands::Start { routine, day, date } => {
            cmd_start(&store, &owner, &routine, day, date).await
        }
        Commands::Log {
            exercise_id,
            set_index,
            reps,
            weight,
            effort,
            notes,
        } => {
            let performed = PerformedSet {
                reps,
                weight,
                effort,
                notes,
            };
            cmd_log(&store, &owner, &exercise_id, set_index, performed).await
        }
        Commands::Finish { duration_min } => {
            cmd_finish(&store, &owner, &config, duration_min).await
        }
        Commands::Status => cmd_status(&store, &owner).await,
        Commands::Routines => cmd_routines(&store, &owner).await,
        Commands::Week { date } => cmd_week(&store, &owner, &config, date).await,
        Commands::Volume => cmd_volume(&store, &owner).await,
        Commands::Freq => cmd_freq(&store, &owner).await,
        Commands::Prs => cmd_prs(&store, &owner, &config).await,
        Commands::Onerm {
            weight,
            reps,
            formula,
        } => cmd_onerm(&config, weight, reps, formula),
        Commands::Plates { target, bar } => cmd_plates(&config, target, bar),
        Commands::Cardio {
            activity,
            distance_km,
            duration_min,
            date,
        } => cmd_cardio(&store, &owner, activity, distance_km, duration_min, date).await,
        Commands::Measure {
            body_weight_kg,
            fat,
            date,
        } => cmd_measure(&store, &owner, body_weight_kg, fat, date).await,
        Commands::Import { file } => cmd_import(&store, &owner, &file).await,
        Commands::Export { file } => cmd_export(&store, &owner, &file).await,
        Commands::ExportCsv { file } => cmd_export_csv(&store, &owner, &file).await,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn cmd_start(
    store: &FileStore,
    owner: &str,
    routine_id: &str,
    day: usize,
    date: Option<NaiveDate>,
) -> Result<()> {
    if let Some(existing) = history::load_active(store, owner).await? {
        println!(
            "A session started {} is already in progress ({} sets pending).",
            existing.started_at.format("%Y-%m-%d %H:%M"),
            existing.pending_count()
        );
        println!("Finish it first: liftlog finish");
        return Ok(());
    }

    let routine = history::load_routine(store, owner, routine_id).await?;
    let session = start_session(&routine, day, date.unwrap_or_else(today), Utc::now())?;

    println!("✓ Started '{}' day {}", routine.name, day);
    println!("  {} sets planned", session.entries.len());

    history::save_active(store, owner, &session).await
}

async fn cmd_log(
    store: &FileStore,
    owner: &str,
    exercise_id: &str,
    set_index: u32,
    performed: PerformedSet,
) -> Result<()> {
    let mut session = history::load_active(store, owner)
        .await?
        .ok_or_else(|| Error::NotFound("no session in progress".into()))?;

    session.mark_set_performed(exercise_id, set_index, performed)?;

    println!(
        "✓ {} set {} logged ({} pending)",
        exercise_id,
        set_index,
        session.pending_count()
    );

    history::save_active(store, owner, &session).await
}

async fn cmd_finish(
    store: &FileStore,
    owner: &str,
    config: &Config,
    duration_min: Option<u32>,
) -> Result<()> {
    let session = history::load_active(store, owner)
        .await?
        .ok_or_else(|| Error::NotFound("no session in progress".into()))?;

    let completed = session.complete(
        get_default_catalog(),
        config.session.completion,
        duration_min.map(|m| m * 60),
        Utc::now(),
    )?;

    let total: f64 = completed.muscle_volume.values().sum();
    println!("✓ Session completed, total volume {total:.0} kg");
    for (muscle, volume) in &completed.muscle_volume {
        println!("  {muscle}: {volume:.0} kg");
    }

    history::append_completed(store, owner, &completed).await?;
    history::clear_active(store, owner).await
}

async fn cmd_status(store: &FileStore, owner: &str) -> Result<()> {
    match history::load_active(store, owner).await? {
        Some(session) => {
            println!("Session for routine '{}' on {}", session.routine_id, session.date);
            for entry in &session.entries {
                let marker = match entry.status {
                    EntryStatus::Done => "✓",
                    EntryStatus::Pending => "·",
                };
                match &entry.performed {
                    Some(p) => println!(
                        "  {marker} {} set {}: {} x {:.1} kg",
                        entry.exercise_id, entry.set_index, p.reps, p.weight
                    ),
                    None => println!(
                        "  {marker} {} set {}: planned {} x {:.1} kg",
                        entry.exercise_id,
                        entry.set_index,
                        entry.planned.reps,
                        entry.planned.weight
                    ),
                }
            }
        }
        None => println!("No session in progress."),
    }
    Ok(())
}

async fn cmd_routines(store: &FileStore, owner: &str) -> Result<()> {
    let routines = history::load_routines(store, owner).await?;
    if routines.is_empty() {
        println!("No routines stored. Import some: liftlog import <file>");
        return Ok(());
    }

    for routine in routines {
        println!("{} — {} ({} days)", routine.id, routine.name, routine.days.len());
    }
    Ok(())
}

async fn cmd_week(
    store: &FileStore,
    owner: &str,
    config: &Config,
    date: Option<NaiveDate>,
) -> Result<()> {
    let sessions = history::load_completed(store, owner).await?;
    let reference = date.unwrap_or_else(today);
    let stats = week_stats(&sessions, reference, config.week.starts_on);

    let labels = match config.week.starts_on {
        WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    };

    println!("╭─────────────────────────────────────────╮");
    println!("│  WEEK OF {reference}");
    println!("╰─────────────────────────────────────────╯");
    for (label, trained) in labels.iter().zip(stats.days.iter()) {
        println!("  {label}  {}", if *trained { "■" } else { "·" });
    }
    println!();
    println!(
        "  Trained {} of 7 days ({:.0}%)",
        stats.trained_days, stats.percent
    );
    println!("  Streak: {} day(s)", stats.streak);
    println!("  Best streak: {} day(s)", stats.best_streak);
    Ok(())
}

async fn cmd_volume(store: &FileStore, owner: &str) -> Result<()> {
    let sessions = history::load_completed(store, owner).await?;
    let totals = volume_by_muscle(&sessions);

    if totals.is_empty() {
        println!("No completed sessions yet.");
        return Ok(());
    }

    for (muscle, volume) in totals {
        println!("{muscle}: {volume:.0} kg");
    }
    Ok(())
}

async fn cmd_freq(store: &FileStore, owner: &str) -> Result<()> {
    let sessions = history::load_completed(store, owner).await?;

    for freq in exercise_frequency(&sessions) {
        println!(
            "{}: {} sets (last {})",
            freq.exercise_id, freq.count, freq.last_performed
        );
    }
    Ok(())
}

async fn cmd_prs(store: &FileStore, owner: &str, config: &Config) -> Result<()> {
    let sessions = history::load_completed(store, owner).await?;
    let records = personal_records(&sessions, config.session.one_rep_max_formula);

    if records.is_empty() {
        println!("No personal records yet.");
        return Ok(());
    }

    for pr in records {
        println!(
            "{}: est. 1RM {:.1} kg ({} x {:.1} kg on {})",
            pr.exercise_id, pr.estimated_one_rep_max, pr.reps, pr.weight, pr.date
        );
    }
    Ok(())
}

fn cmd_onerm(config: &Config, weight: f64, reps: u32, formula: Option<String>) -> Result<()> {
    let formula = match formula.as_deref() {
        Some("epley") => OneRepMaxFormula::Epley,
        Some("brzycki") => OneRepMaxFormula::Brzycki,
        Some(other) => {
            eprintln!("Unknown formula: {other}. Using configured default.");
            config.session.one_rep_max_formula
        }
        None => config.session.one_rep_max_formula,
    };

    let estimate = metrics::estimate_one_rep_max(weight, reps, formula)?;
    println!("Estimated 1RM ({formula:?}): {estimate:.1} kg");
    Ok(())
}

fn cmd_plates(config: &Config, target: f64, bar: Option<f64>) -> Result<()> {
    let bar_weight = bar.unwrap_or(config.barbell.bar_weight_kg);
    let loadout = metrics::plate_loadout(target, bar_weight, &config.barbell.plates_kg);

    if loadout.is_empty() {
        println!("Nothing to load: target {target:.1} kg is at or below the {bar_weight:.1} kg bar.");
        return Ok(());
    }

    let per_side: f64 = loadout
        .iter()
        .map(|p| p.plate_weight * p.count as f64)
        .sum();

    println!("Per side for {target:.1} kg (bar {bar_weight:.1} kg):");
    for plate in &loadout {
        println!("  {} x {:.2} kg", plate.count, plate.plate_weight);
    }
    println!("Reaches {:.1} kg total", bar_weight + 2.0 * per_side);
    Ok(())
}

async fn cmd_cardio(
    store: &FileStore,
    owner: &str,
    activity: String,
    distance_km: f64,
    duration_min: f64,
    date: Option<NaiveDate>,
) -> Result<()> {
    let log = CardioLog::new(
        date.unwrap_or_else(today),
        activity,
        distance_km,
        duration_min * 60.0,
    )?;

    let pace_min = log.pace_seconds_per_km / 60.0;
    println!(
        "✓ {} logged: {:.2} km in {:.1} min ({:.2} min/km)",
        log.activity, log.distance_km, duration_min, pace_min
    );

    history::append_cardio(store, owner, &log).await
}

async fn cmd_measure(
    store: &FileStore,
    owner: &str,
    body_weight_kg: f64,
    fat: Option<f64>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let measurement = Measurement {
        date: date.unwrap_or_else(today),
        body_weight_kg,
        body_fat_pct: fat,
        notes: None,
    };

    let issues = validate::validate_measurement(&measurement);
    if !issues.is_empty() {
        return Err(Error::Validation(issues));
    }

    println!("✓ Measurement recorded: {body_weight_kg:.1} kg");
    history::save_measurement(store, owner, &measurement).await
}

async fn cmd_import(store: &FileStore, owner: &str, file: &PathBuf) -> Result<()> {
    let contents = std::fs::read_to_string(file)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;

    let report = import_bundle(store, owner, &value).await?;

    println!(
        "✓ Imported {} routine(s), {} session(s){}",
        report.routines_imported,
        report.sessions_imported,
        if report.profile_imported {
            ", profile"
        } else {
            ""
        }
    );
    if !report.issues.is_empty() {
        println!("Rejected:");
        for issue in &report.issues {
            println!("  {issue}");
        }
    }
    Ok(())
}

async fn cmd_export(store: &FileStore, owner: &str, file: &PathBuf) -> Result<()> {
    let bundle = export_bundle(store, owner).await?;

    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, serde_json::to_string_pretty(&bundle)?)?;

    println!(
        "✓ Exported {} routine(s) and {} session(s) to {}",
        bundle.routines.len(),
        bundle.session_logs.len(),
        file.display()
    );
    Ok(())
}

async fn cmd_export_csv(store: &FileStore, owner: &str, file: &PathBuf) -> Result<()> {
    let sessions = history::load_completed(store, owner).await?;
    let count = history::export_sessions_csv(&sessions, file)?;

    println!("✓ Wrote {count} session row(s) to {}", file.display());
    Ok(())
}
