use std::net::IpAddr;
use std::path::{Path, PathBuf};

use frame::MediaClass;
use serde::Deserialize;

use crate::ConfigError;

/// A worker's startup configuration (§4.4, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Coordinator address this worker registers against.
    pub coordinator_ip: IpAddr,
    /// Coordinator port this worker registers against.
    pub coordinator_port: u16,
    /// Address this worker advertises (and binds) for client connections.
    pub bind_ip: IpAddr,
    /// Port this worker advertises (and binds) for client connections.
    pub bind_port: u16,
    /// Directory received files are written to.
    pub save_folder: PathBuf,
    /// The media class this worker serves.
    #[serde(rename = "class", deserialize_with = "crate::media_class_serde::deserialize")]
    pub class: MediaClass,
}

impl WorkerConfig {
    /// Loads, parses, and validates a worker config from a TOML file.
    ///
    /// Validation checks that `save_folder` exists and is a directory
    /// (§6); an unparseable `class` is already rejected by `toml::from_str`
    /// before validation runs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.save_folder.is_dir() {
            return Err(ConfigError::MissingFolder(self.save_folder.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toml_with_folder(folder: &std::path::Path) -> String {
        format!(
            r#"
            coordinator_ip = "127.0.0.1"
            coordinator_port = 9000
            bind_ip = "127.0.0.1"
            bind_port = 9100
            save_folder = "{}"
            class = "Media"
            "#,
            folder.display()
        )
    }

    #[test]
    fn loads_a_well_formed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.toml");
        std::fs::write(&path, toml_with_folder(dir.path())).unwrap();

        let config = WorkerConfig::load(&path).unwrap();
        assert_eq!(config.class, MediaClass::Media);
    }

    #[test]
    fn missing_save_folder_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.toml");
        let missing = dir.path().join("does-not-exist");
        std::fs::write(&path, toml_with_folder(&missing)).unwrap();

        let err = WorkerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFolder(_)));
    }

    #[test]
    fn unknown_class_is_rejected_at_parse_time() {
        let dir = tempfile::tempdir().unwrap();
        let text = toml_with_folder(dir.path()).replace("Media", "Audio");
        let result: Result<WorkerConfig, _> = toml::from_str(&text);
        assert!(result.is_err());
    }
}
