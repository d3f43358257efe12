use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CircleMapError;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding `<circuit key>.json` track maps
    #[serde(default)]
    pub track_maps_dir: Option<PathBuf>,
    /// Write frames while the outline is not ready yet
    #[serde(default = "default_emit_not_ready_frames")]
    pub emit_not_ready_frames: bool,
}

fn default_emit_not_ready_frames() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            track_maps_dir: None,
            emit_not_ready_frames: default_emit_not_ready_frames(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf, CircleMapError> {
        Ok(dirs::config_dir()
            .ok_or(CircleMapError::NoConfigDir)?
            .join("circlemap")
            .join(CONFIG_FILE_NAME))
    }

    pub fn from_local_file() -> Result<Option<Self>, CircleMapError> {
        Self::from_path(&Self::config_path()?)
    }

    pub fn from_path(config_path: &Path) -> Result<Option<Self>, CircleMapError> {
        if !config_path.exists() {
            return Ok(None);
        }

        let file =
            File::open(config_path).map_err(|e| CircleMapError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| CircleMapError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), CircleMapError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), CircleMapError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CircleMapError::ConfigIOError { source: e })?;
        }

        let file =
            File::create(config_path).map_err(|e| CircleMapError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| CircleMapError::ConfigSerializeError { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::from_path(&temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();

        assert!(config.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            track_maps_dir: Some(PathBuf::from("/tmp/maps")),
            emit_not_ready_frames: false,
        };

        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::from_path(&path).unwrap(), Some(config));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{}").unwrap();

        assert_eq!(AppConfig::from_path(&path).unwrap(), Some(AppConfig::default()));
    }

    #[test]
    fn test_corrupt_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            AppConfig::from_path(&path),
            Err(CircleMapError::ConfigSerializeError { .. })
        ));
    }
}
