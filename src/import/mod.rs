//! Track import
//!
//! Importers sit behind [`TrackImporter`] and are picked by file extension.

use crate::error::{LoadError, Result};
use crate::models::Track;
use std::path::{Path, PathBuf};

pub mod gpx;
pub mod markers;

/// Trait for loading tracks from different file formats
pub trait TrackImporter {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Load the track from the file
    fn import_file(&self, file_path: &Path) -> Result<Track>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Manager for coordinating different track formats
pub struct ImportManager {
    importers: Vec<Box<dyn TrackImporter>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn TrackImporter>> = vec![Box::new(gpx::GpxImporter::new())];

        Self { importers }
    }

    /// Load a single track, auto-detecting the format
    #[tracing::instrument(skip(self), fields(path = %file_path.display()))]
    pub fn import_file(&self, file_path: &Path) -> Result<Track> {
        for importer in &self.importers {
            if importer.can_import(file_path) {
                tracing::debug!(format = importer.get_format_name(), "Loading track");
                let track = importer.import_file(file_path)?;
                tracing::info!(
                    points = track.samples.len(),
                    has_elevation = track.has_elevation,
                    "Track loaded"
                );
                return Ok(track);
            }
        }

        Err(LoadError::UnsupportedFormat {
            path: file_path.to_path_buf(),
        }
        .into())
    }

    /// List saved routes in a directory that some importer can load
    pub fn saved_routes(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !dir_path.is_dir() {
            return Err(LoadError::FileNotFound {
                path: dir_path.to_path_buf(),
            }
            .into());
        }

        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();

            if path.is_file() && self.can_import_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if this manager can import a given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}
