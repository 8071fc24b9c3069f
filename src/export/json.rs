use super::ExportError;
use std::io::Write;
use std::path::Path;

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sample, Track};
    use crate::planner::{plan_course, PlanConfig};
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_planned_course() {
        let track = Track {
            name: Some("Park".to_string()),
            samples: vec![Sample::new(0.0, 0.0, 5.0), Sample::new(0.0, 0.02, 8.0)],
            has_elevation: true,
        };
        let course = plan_course(&track, &PlanConfig::default()).unwrap();

        let temp_file = NamedTempFile::new().unwrap();
        export_json(&course, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["name"], "Park");
        assert_eq!(value["summary"]["laps"], 1);
        assert_eq!(value["table"]["samples"].as_array().unwrap().len(), 2);
        assert!(value["splits"].is_array());
    }
}
