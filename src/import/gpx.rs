//! GPX track loading

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{LoadError, Result};
use crate::import::TrackImporter;
use crate::models::{Sample, Track};

/// GPX importer for GPS track data
pub struct GpxImporter;

impl GpxImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse GPX content from any reader
    ///
    /// Points from every track and segment are concatenated in file order.
    /// Missing elevations become 0 m, so a file without any elevation data
    /// yields a flat course.
    pub fn read_track<R: Read>(&self, reader: R) -> Result<Track> {
        let parsed = gpx::read(reader).map_err(|e| LoadError::Parse {
            reason: e.to_string(),
        })?;

        let mut samples = Vec::new();
        let mut has_elevation = false;

        for track in &parsed.tracks {
            for segment in &track.segments {
                for waypoint in &segment.points {
                    let point = waypoint.point();
                    has_elevation |= waypoint.elevation.is_some();
                    samples.push(Sample::new(
                        point.y(),
                        point.x(),
                        waypoint.elevation.unwrap_or(0.0),
                    ));
                }
            }
        }

        if samples.is_empty() {
            return Err(LoadError::EmptyTrack.into());
        }

        if !has_elevation {
            tracing::debug!("Track has no elevation data, treating course as flat");
        }

        let name = parsed.tracks.iter().find_map(|t| t.name.clone());

        Ok(Track {
            name,
            samples,
            has_elevation,
        })
    }
}

impl Default for GpxImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackImporter for GpxImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase() == "gpx")
            .unwrap_or(false)
    }

    fn import_file(&self, file_path: &Path) -> Result<Track> {
        let file = File::open(file_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::FileNotFound {
                path: file_path.to_path_buf(),
            },
            _ => LoadError::Parse {
                reason: e.to_string(),
            },
        })?;

        self.read_track(BufReader::new(file))
    }

    fn get_format_name(&self) -> &'static str {
        "GPX"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Harbour Loop</name>
    <trkseg>
      <trkpt lat="47.6000" lon="-122.3000"><ele>10.0</ele></trkpt>
      <trkpt lat="47.6010" lon="-122.3000"><ele>12.5</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="47.6020" lon="-122.3000"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    const NO_ELEVATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="0.0" lon="0.0"></trkpt>
    <trkpt lat="0.0" lon="0.01"></trkpt>
  </trkseg></trk>
</gpx>"#;

    const EMPTY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg></trkseg></trk>
</gpx>"#;

    #[test]
    fn test_segments_concatenated_in_order() {
        let track = GpxImporter::new().read_track(TWO_SEGMENTS.as_bytes()).unwrap();

        assert_eq!(track.name.as_deref(), Some("Harbour Loop"));
        assert_eq!(track.samples.len(), 3);
        assert!(track.has_elevation);
        assert!((track.samples[1].latitude - 47.601).abs() < 1e-9);
        assert!((track.samples[1].longitude + 122.3).abs() < 1e-9);
        assert_eq!(track.samples[1].elevation, 12.5);
        assert_eq!(track.samples[2].elevation, 0.0);
        assert!(track.samples.iter().all(|s| s.lap == 1));
    }

    #[test]
    fn test_missing_elevation_is_zero() {
        let track = GpxImporter::new().read_track(NO_ELEVATION.as_bytes()).unwrap();
        assert!(!track.has_elevation);
        assert!(track.samples.iter().all(|s| s.elevation == 0.0));
    }

    #[test]
    fn test_empty_track_fails() {
        let result = GpxImporter::new().read_track(EMPTY.as_bytes());
        assert!(matches!(result, Err(PlannerError::Load(LoadError::EmptyTrack))));
    }

    #[test]
    fn test_corrupt_file_fails() {
        let result = GpxImporter::new().read_track("not a gpx file".as_bytes());
        assert!(matches!(result, Err(PlannerError::Load(LoadError::Parse { .. }))));
    }

    #[test]
    fn test_missing_file() {
        let result = GpxImporter::new().import_file(Path::new("/definitely/not/here.gpx"));
        assert!(matches!(
            result,
            Err(PlannerError::Load(LoadError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_can_import() {
        let importer = GpxImporter::new();
        assert!(importer.can_import(Path::new("route.GPX")));
        assert!(!importer.can_import(Path::new("route.fit")));
    }
}
