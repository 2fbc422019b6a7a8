//! Process configuration for the API binary.

use std::net::SocketAddr;

use stockroom_infra::{ConfigError, StoreConfig};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub listen_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `STOCKROOM_LISTEN_ADDR` plus the store settings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = lookup("STOCKROOM_LISTEN_ADDR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw.parse().map_err(|e| ConfigError::Invalid {
            key: "STOCKROOM_LISTEN_ADDR",
            message: format!("{raw:?}: {e}"),
        })?;

        Ok(Self {
            listen_addr,
            store: StoreConfig::from_lookup(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_infra::StoreBackend;

    #[test]
    fn defaults_listen_on_8080_with_memory_store() {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(config.store.backend, StoreBackend::InMemory);
    }

    #[test]
    fn invalid_listen_addr_is_rejected() {
        let err = ApiConfig::from_lookup(|key| {
            (key == "STOCKROOM_LISTEN_ADDR").then(|| "not-an-addr".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STOCKROOM_LISTEN_ADDR", .. }));
    }
}
