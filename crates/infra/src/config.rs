//! Store configuration loaded from the environment.
//!
//! | variable | meaning |
//! |---|---|
//! | `STOCKROOM_STORE` | `memory` (default), `firestore`, or `postgres` |
//! | `STOCKROOM_FIRESTORE_PROJECT` | Firestore project id (required for `firestore`) |
//! | `STOCKROOM_FIRESTORE_API_KEY` | optional API key sent as `key=` |
//! | `STOCKROOM_FIRESTORE_TOKEN` | optional OAuth bearer token |
//! | `STOCKROOM_FIRESTORE_ENDPOINT` | REST endpoint, e.g. an emulator |
//! | `DATABASE_URL` | Postgres URL (required for `postgres`) |

use thiserror::Error;

pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Connection settings for the Firestore REST backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Firestore(FirestoreConfig),
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::InMemory,
        }
    }
}

impl StoreConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let kind = get("STOCKROOM_STORE").unwrap_or_else(|| "memory".to_string());
        let backend = match kind.to_lowercase().as_str() {
            "memory" => StoreBackend::InMemory,
            "firestore" => {
                let project_id = get("STOCKROOM_FIRESTORE_PROJECT")
                    .ok_or(ConfigError::Missing("STOCKROOM_FIRESTORE_PROJECT"))?;
                let endpoint = get("STOCKROOM_FIRESTORE_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_FIRESTORE_ENDPOINT.to_string());
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        key: "STOCKROOM_FIRESTORE_ENDPOINT",
                        message: format!("expected an http(s) URL, got {endpoint:?}"),
                    });
                }
                StoreBackend::Firestore(FirestoreConfig {
                    project_id,
                    api_key: get("STOCKROOM_FIRESTORE_API_KEY"),
                    bearer_token: get("STOCKROOM_FIRESTORE_TOKEN"),
                    endpoint,
                })
            }
            "postgres" => StoreBackend::Postgres {
                database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "STOCKROOM_STORE",
                    message: format!("expected memory, firestore, or postgres, got {other:?}"),
                });
            }
        };

        Ok(Self { backend })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_in_memory() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn firestore_requires_project_and_defaults_endpoint() {
        let err = StoreConfig::from_lookup(lookup(&[("STOCKROOM_STORE", "firestore")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("STOCKROOM_FIRESTORE_PROJECT"));

        let config = StoreConfig::from_lookup(lookup(&[
            ("STOCKROOM_STORE", "Firestore"),
            ("STOCKROOM_FIRESTORE_PROJECT", "pantry"),
            ("STOCKROOM_FIRESTORE_API_KEY", "abc"),
            ("STOCKROOM_FIRESTORE_TOKEN", ""),
        ]))
        .unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::Firestore(FirestoreConfig {
                project_id: "pantry".to_string(),
                api_key: Some("abc".to_string()),
                bearer_token: None,
                endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            })
        );
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = StoreConfig::from_lookup(lookup(&[("STOCKROOM_STORE", "postgres")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let config = StoreConfig::from_lookup(lookup(&[
            ("STOCKROOM_STORE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/stockroom"),
        ]))
        .unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/stockroom".to_string()
            }
        );
    }

    #[test]
    fn unknown_backend_and_bad_endpoint_are_rejected() {
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[("STOCKROOM_STORE", "redis")])),
            Err(ConfigError::Invalid { key: "STOCKROOM_STORE", .. })
        ));
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[
                ("STOCKROOM_STORE", "firestore"),
                ("STOCKROOM_FIRESTORE_PROJECT", "p"),
                ("STOCKROOM_FIRESTORE_ENDPOINT", "localhost:8080"),
            ])),
            Err(ConfigError::Invalid { key: "STOCKROOM_FIRESTORE_ENDPOINT", .. })
        ));
    }
}
