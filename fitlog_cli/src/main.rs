use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use fitlog_core::calculations::{format_bmi, format_body_fat};
use fitlog_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Personal body composition and workout log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the data file location
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily body composition measurements
    #[command(subcommand)]
    Body(BodyCommand),

    /// Exercise library
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Workout logs
    #[command(subcommand)]
    Workout(WorkoutCommand),

    /// Weight trend and workout frequency
    Summary {
        /// Number of days to look back
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Export body composition history as CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum BodyCommand {
    /// Record (or overwrite) the measurements for a date
    Add(BodyArgs),
    /// Show one date's entry
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List entries in a date range
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Delete one date's entry
    Delete {
        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Args)]
struct BodyArgs {
    /// Date of the measurement (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Weight in pounds
    #[arg(long)]
    weight: f64,
    /// Waist circumference in inches
    #[arg(long)]
    waist: f64,
    /// Neck circumference in inches
    #[arg(long)]
    neck: f64,
    /// Height in inches (defaults to the profile height)
    #[arg(long)]
    height: Option<f64>,
    /// Record as female (defaults to the profile setting)
    #[arg(long, conflicts_with = "male")]
    female: bool,
    /// Record as male (defaults to the profile setting)
    #[arg(long)]
    male: bool,
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add an exercise to the library
    Add {
        #[arg(long)]
        name: String,
        /// strength, cardio or flexibility
        #[arg(long, default_value = "strength")]
        category: String,
    },
    /// List exercises, optionally only the active ones in a category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Mark an exercise inactive so it no longer appears in category lists
    Retire {
        #[arg(long)]
        id: u32,
    },
    /// Remove an exercise from the library (history is kept)
    Delete {
        #[arg(long)]
        id: u32,
    },
}

#[derive(Subcommand)]
enum WorkoutCommand {
    /// Start a new workout
    New {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Log sets for an exercise in a workout
    Log {
        /// Workout id
        #[arg(long)]
        id: u32,
        /// Exercise id from the library
        #[arg(long)]
        exercise: u32,
        /// WEIGHTxREPS or WEIGHTxREPSxSETS, e.g. 135x5x3
        #[arg(long = "set", required = true, value_parser = parse_set)]
        sets: Vec<SetEntry>,
    },
    /// Change a workout's status (in_progress, completed, cancelled)
    Status {
        #[arg(long)]
        id: u32,
        status: String,
    },
    /// Show a workout in detail
    Show {
        #[arg(long)]
        id: u32,
    },
    /// List workouts, optionally for a single date
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a workout
    Delete {
        #[arg(long)]
        id: u32,
    },
}

fn parse_set(s: &str) -> std::result::Result<SetEntry, String> {
    let parts: Vec<_> = s.split(['x', 'X']).map(str::trim).collect();
    let (weight, reps, sets) = match parts.as_slice() {
        [w, r] => (*w, *r, "1"),
        [w, r, n] => (*w, *r, *n),
        _ => return Err(format!("expected WEIGHTxREPS[xSETS], got '{}'", s)),
    };

    let weight = weight
        .parse::<f64>()
        .map_err(|e| format!("invalid weight '{}': {}", weight, e))?;
    let reps = reps
        .parse::<u32>()
        .map_err(|e| format!("invalid reps '{}': {}", reps, e))?;
    let sets = sets
        .parse::<u32>()
        .map_err(|e| format!("invalid sets '{}': {}", sets, e))?;

    Ok(SetEntry::new(weight, reps, sets))
}

fn main() -> Result<()> {
    fitlog_core::logging::init_with_level("warn");

    let cli = Cli::parse();
    let config = Config::load()?;
    let data_file = cli
        .data_file
        .unwrap_or_else(|| config.data.resolve_data_file());
    tracing::debug!("Using data file {:?}", data_file);

    let mut store = RecordStore::open(&data_file);
    if let LoadStatus::Failed(reason) = store.load_status() {
        eprintln!(
            "Warning: could not read {} ({}). Starting with an empty log.",
            data_file.display(),
            reason
        );
    }

    match cli.command {
        Commands::Body(cmd) => cmd_body(&mut store, cmd, &config),
        Commands::Exercise(cmd) => cmd_exercise(&mut store, cmd),
        Commands::Workout(cmd) => cmd_workout(&mut store, cmd),
        Commands::Summary { days } => cmd_summary(&store, days),
        Commands::Export { out } => cmd_export(&store, out),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn cmd_body(store: &mut RecordStore, cmd: BodyCommand, config: &Config) -> Result<()> {
    match cmd {
        BodyCommand::Add(args) => {
            let date = args.date.unwrap_or_else(today);
            let sex = if args.female {
                Sex::Female
            } else if args.male {
                Sex::Male
            } else {
                config.profile.sex
            };
            let height = args.height.unwrap_or(config.profile.height);

            let mut entry = BodyComposition::new(
                date,
                Measurements {
                    weight: args.weight,
                    waist: args.waist,
                    height,
                    neck: args.neck,
                },
                sex,
            );
            entry.set_notes(args.notes);

            store.save_body_composition(entry)?;
            println!("✓ Saved body composition for {}", date);
            if let Some(saved) = store.load_body_composition(date) {
                print_body(&saved);
            }
        }
        BodyCommand::Show { date } => {
            let date = date.unwrap_or_else(today);
            match store.load_body_composition(date) {
                Some(entry) => print_body(&entry),
                None => println!("No entry for {}", date),
            }
        }
        BodyCommand::List { from, to } => {
            let entries = match (from, to) {
                (None, None) => store.all_body_composition_sorted(),
                (from, to) => store.body_composition_range(
                    from.unwrap_or(NaiveDate::MIN),
                    to.unwrap_or(NaiveDate::MAX),
                ),
            };
            if entries.is_empty() {
                println!("No entries.");
            }
            for entry in &entries {
                println!(
                    "{}  {:>6.1} lbs  BMI {:<20}  BF {}",
                    entry.date(),
                    entry.weight(),
                    format_bmi(entry.bmi()),
                    format_body_fat(entry.body_fat_percentage(), entry.sex())
                );
            }
        }
        BodyCommand::Delete { date } => {
            if store.delete_body_composition(date)? {
                println!("✓ Deleted entry for {}", date);
            } else {
                println!("No entry for {}", date);
            }
        }
    }
    Ok(())
}

fn print_body(entry: &BodyComposition) {
    println!("  Date:     {}", entry.date());
    println!("  Weight:   {:.1} lbs", entry.weight());
    println!("  Waist:    {:.1} in", entry.waist());
    println!("  Neck:     {:.1} in", entry.neck());
    println!("  Height:   {:.1} in", entry.height());
    println!("  BMI:      {}", format_bmi(entry.bmi()));
    println!(
        "  Body fat: {}",
        format_body_fat(entry.body_fat_percentage(), entry.sex())
    );
    if !entry.notes().is_empty() {
        println!("  Notes:    {}", entry.notes());
    }
}

fn cmd_exercise(store: &mut RecordStore, cmd: ExerciseCommand) -> Result<()> {
    match cmd {
        ExerciseCommand::Add { name, category } => {
            let id = store.save_exercise(Exercise::new(name, ExerciseCategory::parse(&category)))?;
            println!("✓ Added exercise #{}", id);
        }
        ExerciseCommand::List { category } => {
            let exercises = match category {
                Some(c) => store.exercises_by_category(&ExerciseCategory::parse(&c)),
                None => store.all_exercises(),
            };
            if exercises.is_empty() {
                println!("No exercises.");
            }
            for ex in exercises {
                let status = if ex.is_active { "" } else { " (retired)" };
                println!("#{:<4} {:<30} {}{}", ex.id, ex.name, ex.category, status);
            }
        }
        ExerciseCommand::Retire { id } => {
            let mut exercise = store
                .load_exercise(id)
                .ok_or_else(|| Error::NotFound(format!("exercise #{}", id)))?;
            exercise.is_active = false;
            store.save_exercise(exercise)?;
            println!("✓ Retired exercise #{}", id);
        }
        ExerciseCommand::Delete { id } => {
            if store.delete_exercise(id)? {
                println!("✓ Deleted exercise #{}", id);
            } else {
                println!("No exercise #{}", id);
            }
        }
    }
    Ok(())
}

fn cmd_workout(store: &mut RecordStore, cmd: WorkoutCommand) -> Result<()> {
    match cmd {
        WorkoutCommand::New { date, notes } => {
            let mut workout = Workout::new(date.unwrap_or_else(today));
            workout.notes = notes;
            let id = store.save_workout(workout)?;
            println!("✓ Started workout #{}", id);
        }
        WorkoutCommand::Log {
            id,
            exercise,
            sets,
        } => {
            let mut workout = store
                .load_workout(id)
                .ok_or_else(|| Error::NotFound(format!("workout #{}", id)))?;
            let exercise = store
                .load_exercise(exercise)
                .ok_or_else(|| Error::NotFound(format!("exercise #{}", exercise)))?;

            workout.add_exercise(WorkoutExercise::from_exercise(&exercise, sets));
            store.save_workout(workout)?;
            println!("✓ Logged {} in workout #{}", exercise.name, id);
        }
        WorkoutCommand::Status { id, status } => {
            let mut workout = store
                .load_workout(id)
                .ok_or_else(|| Error::NotFound(format!("workout #{}", id)))?;
            workout.set_status(WorkoutStatus::parse(&status));
            store.save_workout(workout)?;
            println!("✓ Workout #{} is now {}", id, WorkoutStatus::parse(&status));
        }
        WorkoutCommand::Show { id } => match store.load_workout(id) {
            Some(workout) => print_workout(&workout),
            None => println!("No workout #{}", id),
        },
        WorkoutCommand::List { date } => {
            let workouts = match date {
                Some(d) => store.workouts_by_date(d),
                None => store.all_workouts(),
            };
            if workouts.is_empty() {
                println!("No workouts.");
            }
            for w in workouts {
                println!(
                    "#{:<4} {}  {:<12} {} exercises, {} sets",
                    w.id,
                    w.date,
                    w.status,
                    w.exercises.len(),
                    w.total_sets()
                );
            }
        }
        WorkoutCommand::Delete { id } => {
            if store.delete_workout(id)? {
                println!("✓ Deleted workout #{}", id);
            } else {
                println!("No workout #{}", id);
            }
        }
    }
    Ok(())
}

fn print_workout(workout: &Workout) {
    println!("Workout #{} on {} ({})", workout.id, workout.date, workout.status);
    if !workout.notes.is_empty() {
        println!("  {}", workout.notes);
    }
    for entry in &workout.exercises {
        println!("  {}", entry.exercise_name);
        for set in &entry.sets {
            println!("    {} lbs × {} reps × {} sets", set.weight, set.reps, set.sets);
        }
    }
    println!("  Total volume: {:.0} lbs", workout.total_volume());
}

fn cmd_summary(store: &RecordStore, days: i64) -> Result<()> {
    let end = today();
    let start = window_start(end, days);

    match summary::weight_trend(&store.body_composition_range(start, end)) {
        Some(trend) => println!(
            "Weight: {:.1} → {:.1} lbs ({:+.1}) over {} entries",
            trend.start_weight,
            trend.end_weight,
            trend.change(),
            trend.entries
        ),
        None => println!("Weight: no entries in the last {} days", days),
    }

    if let Some(latest) = summary::latest_measurement(store) {
        println!(
            "Latest:  {}  BMI {}",
            latest.date(),
            format_bmi(latest.bmi())
        );
    }

    let freq = summary::workout_frequency(&store.all_workouts(), start, end);
    println!(
        "Workouts: {} on {} days ({:.1} per week)",
        freq.total_workouts, freq.workout_days, freq.per_week
    );
    Ok(())
}

/// First day of a `days`-long window ending on `end`, clamped to the calendar
fn window_start(end: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days.max(1) - 1)
        .and_then(|span| end.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

fn cmd_export(store: &RecordStore, out: PathBuf) -> Result<()> {
    let count = export_body_composition_csv(&store.all_body_composition_sorted(), &out)?;
    println!("✓ Exported {} entries to {}", count, out.display());
    Ok(())
}
