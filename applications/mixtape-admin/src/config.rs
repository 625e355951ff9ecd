/// Admin tool configuration
use crate::error::{AdminError, Result};
use mixtape_storage::StorageSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub storage: StorageSettings,
}

impl AdminConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `mixtape.toml` in the working directory; a missing
    /// default file is fine, a missing explicit one is not. Environment
    /// variables override the file, e.g. `MIXTAPE_STORAGE__DATABASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AdminError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("mixtape.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("MIXTAPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| AdminError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AdminError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.storage.database_url.starts_with("sqlite:") {
            return Err(AdminError::Config(format!(
                "unsupported database URL '{}' (expected sqlite:...)",
                self.storage.database_url
            )));
        }

        if self.storage.max_connections == 0 {
            return Err(AdminError::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AdminConfig::default();
        assert_eq!(config.storage.max_connections, 5);
        assert!(!config.storage.reject_cycles);
        config.validate().unwrap();
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[storage]\ndatabase_url = \"sqlite://elsewhere.db\"\nreject_cycles = true"
        )
        .unwrap();

        let config = AdminConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.storage.database_url, "sqlite://elsewhere.db");
        assert!(config.storage.reject_cycles);
        assert_eq!(config.storage.busy_timeout_secs, 30);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AdminConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(AdminError::Config(_))));
    }

    #[test]
    fn rejects_foreign_database() {
        let mut config = AdminConfig::default();
        config.storage.database_url = "postgres://localhost/mixtape".to_string();
        assert!(config.validate().is_err());
    }
}
