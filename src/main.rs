use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use paceplan::export::{self, format_distance, format_elevation, format_pace, ExportFormat};
use paceplan::import::{markers::read_markers_file, ImportManager};
use paceplan::logging::init_logging;
use paceplan::{
    CoursePlanner, DistanceUnit, LogFormat, LogLevel, PlannedCourse, PlannerConfig, PlannerError,
    Units,
};

/// paceplan - GPX race pace planner
///
/// Expands loop courses, places kilometer markers and models split times
/// with optional fatigue decay and hill adjustment.
#[derive(Parser)]
#[command(name = "paceplan")]
#[command(version)]
#[command(about = "GPX race pace planner", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan pace and split times for a GPX course
    Plan {
        /// GPX track file
        #[arg(short, long)]
        file: PathBuf,

        /// Number of loops of the track
        #[arg(short, long)]
        loops: Option<u32>,

        /// Base pace in minutes per pace unit
        #[arg(short, long)]
        pace: Option<f64>,

        /// Unit of the base pace (km, mile)
        #[arg(long)]
        pace_unit: Option<DistanceUnit>,

        /// Disable fatigue decay
        #[arg(long)]
        no_decay: bool,

        /// Disable hill adjustment
        #[arg(long)]
        no_hills: bool,

        /// Race start time (HH:MM or HH:MM:SS)
        #[arg(short, long)]
        start: Option<String>,

        /// Plan without clock times if the start time is invalid
        #[arg(long)]
        lenient_start: bool,

        /// CSV of custom markers (distance,nickname,cutoff)
        #[arg(short, long)]
        markers: Option<PathBuf>,

        /// Unit of the custom marker distances (km, mile)
        #[arg(long)]
        marker_unit: Option<DistanceUnit>,

        /// Display units (metric, imperial)
        #[arg(short, long)]
        units: Option<Units>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (csv, samples, json, text)
        #[arg(short = 'F', long, default_value = "csv")]
        format: ExportFormat,
    },

    /// Check that a track file loads
    Validate {
        /// GPX track file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List saved routes
    Routes {
        /// Directory of saved routes
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

/// Kilometer split row as shown in the terminal
#[derive(Tabled)]
struct SplitDisplay {
    #[tabled(rename = "KM")]
    km: u32,
    #[tabled(rename = "Lap")]
    lap: u32,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Pace")]
    pace: String,
    #[tabled(rename = "Grade (%)")]
    grade: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Clock")]
    clock: String,
    #[tabled(rename = "Marker")]
    marker: String,
    #[tabled(rename = "Buffer")]
    buffer: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load_from_file(path)?,
        None => PlannerConfig::load_or_default()?,
    };

    if cli.verbose > 0 {
        config.logging.level = LogLevel::from_verbosity(cli.verbose);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Plan {
            file,
            loops,
            pace,
            pace_unit,
            no_decay,
            no_hills,
            start,
            lenient_start,
            markers,
            marker_unit,
            units,
            output,
            format,
        } => {
            if let Some(loops) = loops {
                config.course.loops = loops;
            }
            if let Some(pace) = pace {
                config.course.base_pace = pace;
            }
            if let Some(unit) = pace_unit {
                config.course.pace_unit = unit;
            }
            config.course.decay &= !no_decay;
            config.course.hills &= !no_hills;
            if start.is_some() {
                config.course.race_start = start;
            }
            if let Some(unit) = marker_unit {
                config.markers.distance_unit = unit;
            }
            if let Some(path) = markers {
                config.markers.entries = read_markers_file(&path)
                    .with_context(|| format!("Failed to read markers: {}", path.display()))?;
            }
            if let Some(units) = units {
                config.report.units = units;
            }

            println!("{}", "Planning course...".green().bold());
            let course = run_plan(&config, &file, lenient_start)?;
            print_course(&course, config.report.units);

            if let Some(output) = output {
                export::export_course(&course, format, config.report.units, &output)
                    .with_context(|| format!("Failed to export to {}", output.display()))?;
                println!("{} {}", "✓ Exported".green(), output.display());
            }
        }

        Commands::Validate { file } => {
            println!("{}", "Validating track...".blue().bold());
            match ImportManager::new().import_file(&file) {
                Ok(track) => {
                    println!("  Points: {}", track.samples.len());
                    println!(
                        "  Elevation data: {}",
                        if track.has_elevation { "yes" } else { "no (flat course)" }
                    );
                    println!("{}", "✓ Track is valid".blue());
                }
                Err(e) => {
                    eprintln!("{} {}", "✗".red(), e.user_message());
                    return Err(e.into());
                }
            }
        }

        Commands::Routes { dir } => {
            let dir = dir
                .or_else(|| config.report.saved_routes_dir.clone())
                .unwrap_or_else(|| PathBuf::from("saved_routes"));
            let routes = ImportManager::new()
                .saved_routes(&dir)
                .with_context(|| format!("Saved routes directory not found: {}", dir.display()))?;

            if routes.is_empty() {
                println!("No saved routes found in {}", dir.display());
            }
            for route in routes {
                println!("  {}", route.display());
            }
        }

        Commands::Config { init, show } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(PlannerConfig::default_config_path);
            if init {
                PlannerConfig::default().save_to_file(&path)?;
                println!("{} {}", "✓ Wrote default configuration to".white(), path.display());
            }
            if show || !init {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Plan the course, retrying without clock times when allowed
fn run_plan(config: &PlannerConfig, file: &Path, lenient_start: bool) -> Result<PlannedCourse> {
    let plan_config = config.to_plan_config()?;
    let planner = CoursePlanner::new(plan_config.clone());

    match planner.plan_file(file) {
        Ok(course) => Ok(course),
        Err(PlannerError::InvalidStartTime(err)) if lenient_start => {
            tracing::warn!(%err, "Ignoring race start, clock times omitted");
            eprintln!("{} {}", "!".yellow(), err);
            let planner = CoursePlanner::new(paceplan::PlanConfig {
                race_start: None,
                ..plan_config
            });
            Ok(planner.plan_file(file)?)
        }
        Err(e) => {
            tracing::event!(tracing::Level::ERROR, severity = ?e.severity(), "Planning failed");
            eprintln!("{} {}", "✗".red(), e.user_message());
            Err(e.into())
        }
    }
}

fn print_course(course: &PlannedCourse, units: Units) {
    let summary = &course.summary;

    println!();
    if let Some(name) = &course.name {
        println!("  Route: {}", name.bold());
    }
    println!("  Total distance: {}", format_distance(summary.total_distance, units));
    println!("  Average pace:   {}", format_pace(summary.average_pace, units));
    println!("  Finish time:    {}", summary.total_time_hms.bold());
    println!(
        "  Elevation:      +{} / -{}",
        format_elevation(summary.elevation_gain, units),
        format_elevation(summary.elevation_loss, units)
    );
    if let Some(finish) = summary.finish_clock_time {
        println!("  Finish clock:   {}", finish.format("%H:%M:%S"));
    }
    for (marker, reason) in course.discarded_markers() {
        println!("  {} skipped marker {:?}: {}", "!".yellow(), marker.nickname, reason);
    }
    println!();

    let rows: Vec<SplitDisplay> = course
        .splits
        .iter()
        .map(|split| SplitDisplay {
            km: split.km,
            lap: split.lap,
            distance: format_distance(split.distance, units),
            pace: format_pace(split.pace, units),
            grade: format!("{:.1}", split.grade),
            time: split.cumulative_time_hms.clone(),
            clock: split.clock_time.clone().unwrap_or_default(),
            marker: split.nickname.clone().unwrap_or_default(),
            buffer: split
                .cutoff_buffer_minutes
                .map(|b| format!("{:+.1} min", b))
                .unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}
