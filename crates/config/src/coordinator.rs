use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// The coordinator's startup configuration (§4.3, §6).
///
/// The original implementation binds a single socket and classifies peers
/// by their first frame; this crate preserves that by defaulting
/// `worker_bind_port` to `client_bind_port` when the config omits it, while
/// still allowing a deployment to split the two onto distinct ports.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    /// Address clients dial to issue `CONNECT_REQ`.
    pub client_bind_ip: IpAddr,
    /// Port clients dial.
    pub client_bind_port: u16,
    /// Address workers dial to issue `WORKER_REG`.
    pub worker_bind_ip: IpAddr,
    /// Port workers dial. Defaults to `client_bind_port` if omitted.
    #[serde(default)]
    pub worker_bind_port: Option<u16>,
    /// Per-link read/write deadline and heartbeat cadence, in seconds.
    /// Defaults to 10 (§4.2).
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,
}

fn default_heartbeat_timeout_secs() -> u64 {
    10
}

impl CoordinatorConfig {
    /// Loads and validates a coordinator config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    /// The worker-facing port, falling back to the client-facing one.
    #[must_use]
    pub fn effective_worker_bind_port(&self) -> u16 {
        self.worker_bind_port.unwrap_or(self.client_bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_port_defaults_to_client_port() {
        let config: CoordinatorConfig = toml::from_str(
            r#"
            client_bind_ip = "0.0.0.0"
            client_bind_port = 9000
            worker_bind_ip = "0.0.0.0"
            "#,
        )
        .unwrap();
        assert_eq!(config.effective_worker_bind_port(), 9000);
        assert_eq!(config.heartbeat_timeout_secs, 10);
    }

    #[test]
    fn explicit_worker_port_is_honored() {
        let config: CoordinatorConfig = toml::from_str(
            r#"
            client_bind_ip = "0.0.0.0"
            client_bind_port = 9000
            worker_bind_ip = "0.0.0.0"
            worker_bind_port = 9100
            heartbeat_timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.effective_worker_bind_port(), 9100);
        assert_eq!(config.heartbeat_timeout_secs, 30);
    }
}
