use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Language identifier -> unique facts collected so far
pub type Dataset = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// JSON file holding the master dataset between runs
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the dataset, starting fresh if the file is absent or unreadable
    pub fn load(&self) -> Dataset {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No dataset at {}, starting empty", self.path.display());
                return Dataset::new();
            }
            Err(e) => {
                warn!("Could not read {}, starting empty: {}", self.path.display(), e);
                return Dataset::new();
            }
        };

        // Null facts are tolerated and dropped rather than failing the whole file
        match serde_json::from_str::<BTreeMap<String, Vec<Option<String>>>>(&text) {
            Ok(raw) => raw
                .into_iter()
                .map(|(lang, facts)| (lang, facts.into_iter().flatten().collect()))
                .collect(),
            Err(e) => {
                warn!("Discarding corrupt dataset {}: {}", self.path.display(), e);
                Dataset::new()
            }
        }
    }

    /// Write the whole dataset, replacing the previous file in one step
    pub fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let temp_file = NamedTempFile::new_in(parent).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
            dataset.serialize(&mut serializer)?;
            writer.flush().map_err(io_err)?;
        }
        if let Some(permissions) = self.target_permissions() {
            temp_file.as_file().set_permissions(permissions).map_err(io_err)?;
        }
        temp_file.as_file().sync_all().map_err(io_err)?;

        temp_file.persist(&self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        debug!("Saved {} languages to {}", dataset.len(), self.path.display());
        Ok(())
    }

    /// Mode the replacement file should carry: the existing file's, else 0644
    fn target_permissions(&self) -> Option<fs::Permissions> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => Some(meta.permissions()),
            _ => default_permissions(),
        }
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
