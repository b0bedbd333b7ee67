//! Storage configuration
//!
//! Identifies the storage namespace (service name and optional access group)
//! and selects the data provider. Accessibility is chosen per call and is not
//! part of configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mocks::InMemoryDataProvider;
use crate::production::{self, DevFileDataProvider, KeyringDataProvider};
use crate::storage::SecuredStorage;
use crate::traits::SecuredDataProvider;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which data provider backs the storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderKind {
    /// Host secure credential service
    #[default]
    Platform,
    /// `keyring` crate, on any host with a native backend
    Keyring,
    /// Plain JSON file (development only, not secure)
    DevFile { path: PathBuf },
    /// Process memory, lost on exit
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group: Option<String>,
    #[serde(default)]
    pub provider: ProviderKind,
}

impl StorageConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            access_group: None,
            provider: ProviderKind::default(),
        }
    }

    pub fn with_access_group(mut self, access_group: impl Into<String>) -> Self {
        self.access_group = Some(access_group.into());
        self
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), service = %config.service_name, "Loaded storage config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid("service_name must not be empty".to_string()));
        }
        if matches!(self.access_group.as_deref(), Some(group) if group.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "access_group must be omitted rather than empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and construct the storage facade
    pub fn build(&self) -> Result<SecuredStorage, ConfigError> {
        self.validate()?;

        let provider: Arc<dyn SecuredDataProvider> = match &self.provider {
            ProviderKind::Platform => production::platform_provider(),
            ProviderKind::Keyring => Arc::new(KeyringDataProvider::new()),
            ProviderKind::DevFile { path } => {
                tracing::warn!(path = %path.display(), "Using unencrypted dev file provider");
                Arc::new(DevFileDataProvider::new(path.clone()))
            }
            ProviderKind::InMemory => Arc::new(InMemoryDataProvider::new()),
        };

        tracing::info!(
            service = %self.service_name,
            access_group = ?self.access_group,
            provider = ?self.provider,
            "Secured storage configured"
        );
        Ok(SecuredStorage::with_provider(
            self.service_name.clone(),
            self.access_group.clone(),
            provider,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::Accessibility;
    use crate::result::{AddingResult, SearchResult};
    use std::io::Write;

    #[test]
    fn test_parse_minimal() {
        let config = StorageConfig::from_json_str(r#"{"service_name": "com.example.app"}"#).unwrap();

        assert_eq!(config.service_name, "com.example.app");
        assert_eq!(config.access_group, None);
        assert_eq!(config.provider, ProviderKind::Platform);
    }

    #[test]
    fn test_parse_full() {
        let config = StorageConfig::from_json_str(
            r#"{
                "service_name": "com.example.app",
                "access_group": "TEAMID.com.example.shared",
                "provider": {"kind": "dev_file", "path": "/tmp/items.json"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.access_group.as_deref(), Some("TEAMID.com.example.shared"));
        assert_eq!(
            config.provider,
            ProviderKind::DevFile { path: PathBuf::from("/tmp/items.json") }
        );
    }

    #[test]
    fn test_rejects_empty_service_name() {
        let err = StorageConfig::from_json_str(r#"{"service_name": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_empty_access_group() {
        let config = StorageConfig::new("svc").with_access_group("");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(config.build().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = StorageConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"service_name": "svc", "provider": {{"kind": "in_memory"}}}}"#).unwrap();
        file.flush().unwrap();

        let config = StorageConfig::from_path(file.path()).unwrap();
        assert_eq!(config.provider, ProviderKind::InMemory);

        let missing = StorageConfig::from_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_build_in_memory_storage() {
        let storage = StorageConfig::new("svc")
            .with_access_group("grp")
            .with_provider(ProviderKind::InMemory)
            .build()
            .unwrap();

        assert_eq!(storage.name(), "svc");
        assert_eq!(storage.access_group(), Some("grp"));

        let accessibility = Accessibility::WhenUnlocked { should_be_migrated: false };
        assert_eq!(storage.add_value("k", b"v", accessibility), AddingResult::Success);
        assert_eq!(
            storage.search_value("k", accessibility),
            SearchResult::Success(Some(b"v".to_vec()))
        );
    }

    #[test]
    fn test_serialize_omits_absent_group() {
        let json = serde_json::to_string(&StorageConfig::new("svc")).unwrap();
        assert!(!json.contains("access_group"));
        assert!(json.contains(r#""kind":"platform""#));
    }
}
