use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ConfigError;

/// A client's startup configuration (§4.5, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// The username declared in `CONNECT_REQ`.
    pub username: String,
    /// Local directory files are read from and resumed downloads are
    /// written to.
    pub local_folder: PathBuf,
    /// Coordinator address this client connects to.
    pub coordinator_ip: IpAddr,
    /// Coordinator port this client connects to.
    pub coordinator_port: u16,
}

impl ClientConfig {
    /// Loads, parses, and validates a client config from a TOML file.
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
        if !self.local_folder.is_dir() {
            return Err(ConfigError::MissingFolder(self.local_folder.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_well_formed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            format!(
                r#"
                username = "alice"
                local_folder = "{}"
                coordinator_ip = "127.0.0.1"
                coordinator_port = 9000
                "#,
                dir.path().display()
            ),
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.username, "alice");
    }

    #[test]
    fn missing_local_folder_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            r#"
            username = "alice"
            local_folder = "/no/such/directory"
            coordinator_ip = "127.0.0.1"
            coordinator_port = 9000
            "#,
        )
        .unwrap();

        let err = ClientConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFolder(p) if p == PathBuf::from("/no/such/directory")));
    }
}
