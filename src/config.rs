use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::logging::LogConfig;
use crate::models::{CustomMarker, DistanceUnit, Units};
use crate::planner::PlanConfig;

/// Loop counts above this are allowed but unusual
pub const MAX_TYPICAL_LOOPS: u32 = 5;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Course and pace settings
    pub course: CourseSettings,

    /// Custom waypoints
    pub markers: MarkerSettings,

    /// Report settings
    pub report: ReportSettings,

    /// Logging settings
    pub logging: LogConfig,
}

/// Course and pace settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseSettings {
    /// Number of laps of the track
    pub loops: u32,

    /// Base pace in minutes per `pace_unit`
    pub base_pace: f64,

    pub pace_unit: DistanceUnit,

    /// Fatigue decay
    pub decay: bool,

    /// Uphill adjustment
    pub hills: bool,

    /// Race start as HH:MM or HH:MM:SS
    pub race_start: Option<String>,
}

/// Custom waypoint settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSettings {
    /// Unit of the marker distances
    pub distance_unit: DistanceUnit,

    pub entries: Vec<CustomMarker>,
}

/// Report settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Display units for tables and exports
    pub units: Units,

    /// Directory of saved routes
    pub saved_routes_dir: Option<PathBuf>,
}

impl Default for CourseSettings {
    fn default() -> Self {
        CourseSettings {
            loops: 1,
            base_pace: 6.2,
            pace_unit: DistanceUnit::Km,
            decay: true,
            hills: true,
            race_start: None,
        }
    }
}

/// Configuration management implementation
impl PlannerConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: PlannerConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".paceplan")
            .join("config.toml")
    }

    /// Load the default configuration file, or defaults when it does not exist
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(Self::default_config_path())
    }

    /// Load `path`, falling back to defaults only when the file is missing
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Build validated planning inputs
    pub fn to_plan_config(&self) -> std::result::Result<PlanConfig, ValidationError> {
        if self.course.loops > MAX_TYPICAL_LOOPS {
            tracing::warn!(loops = self.course.loops, "Unusually high loop count");
        }

        let plan = PlanConfig {
            loops: self.course.loops,
            base_pace: self.course.base_pace,
            pace_unit: self.course.pace_unit,
            decay: self.course.decay,
            hills: self.course.hills,
            race_start: self.course.race_start.clone(),
            markers: self.markers.entries.clone(),
            marker_unit: self.markers.distance_unit,
        };
        plan.validate()?;
        Ok(plan)
    }
}
