//! Profile management for the hangouts CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the profile inside the data directory.
pub const PROFILE_FILE: &str = "hangouts.toml";

/// Local user profile stored as TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Local username.
    pub username: String,
    /// Local user's email.
    pub email: String,
    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path, relative to the data directory unless absolute.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("hangouts.db")
}

impl Profile {
    /// Create a profile with default storage settings.
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            log_filter: None,
            storage: StorageConfig::default(),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, username: Option<&str>, email: Option<&str>) -> Self {
        if let Some(username) = username {
            self.username = username.to_string();
        }
        if let Some(email) = email {
            self.email = email.to_string();
        }
        self
    }

    /// Resolve the database path against the data directory.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        if self.storage.database.is_absolute() {
            self.storage.database.clone()
        } else {
            data_dir.join(&self.storage.database)
        }
    }

    /// Load the profile from a data directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(PROFILE_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Profile not initialized. Run 'hangouts init' first.")?;
        toml::from_str(&contents)
            .with_context(|| format!("Invalid profile {}", path.display()))
    }

    /// Save the profile to a data directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(PROFILE_FILE);
        let contents = toml::to_string_pretty(self).context("Failed to encode profile")?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save profile")?;
        Ok(())
    }

    /// Check if a profile exists.
    pub fn exists(data_dir: &Path) -> bool {
        data_dir.join(PROFILE_FILE).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn profile_roundtrip() {
        let dir = tempdir().unwrap();
        let profile = Profile {
            log_filter: Some("hangouts_client=debug".into()),
            ..Profile::new("alice", "alice@x.io")
        };
        profile.save(dir.path()).await.unwrap();

        assert!(Profile::exists(dir.path()));
        let loaded = Profile::load(dir.path()).await.unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn minimal_profile_uses_defaults() {
        let profile: Profile = toml::from_str(
            r#"
            username = "alice"
            email = "alice@x.io"
            "#,
        )
        .unwrap();

        assert!(profile.log_filter.is_none());
        assert_eq!(profile.storage.database, PathBuf::from("hangouts.db"));
    }

    #[test]
    fn database_path_resolution() {
        let data_dir = Path::new("/var/lib/hangouts");
        let profile = Profile::new("alice", "");
        assert_eq!(
            profile.database_path(data_dir),
            PathBuf::from("/var/lib/hangouts/hangouts.db")
        );

        let mut absolute = profile.clone();
        absolute.storage.database = PathBuf::from("/tmp/other.db");
        assert_eq!(absolute.database_path(data_dir), PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn overrides_replace_fields() {
        let profile = Profile::new("alice", "alice@x.io").with_overrides(Some("bob"), None);
        assert_eq!(profile.username, "bob");
        assert_eq!(profile.email, "alice@x.io");
    }

    #[tokio::test]
    async fn load_without_profile_fails() {
        let dir = tempdir().unwrap();
        assert!(Profile::load(dir.path()).await.is_err());
    }
}
