// Library interface for paceplan modules
// The binary and the integration tests both go through this crate root

pub mod config;
pub mod course;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod markers;
pub mod models;
pub mod pace;
pub mod planner;
pub mod timing;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::PlannerConfig;
pub use error::{LoadError, PlannerError, Result, ValidationError};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use markers::CustomMarkerMerger;
pub use pace::PaceModel;
pub use planner::{plan_course, CoursePlanner, CourseSummary, PlanConfig, PlannedCourse, SplitRow};
pub use timing::TimeIntegrator;
