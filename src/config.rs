//! Application configuration persistence
//!
//! Stores user preferences in `~/.config/delimit/config.yaml`

use serde::{Deserialize, Serialize};

use crate::table::SavePolicy;

/// Preferences that persist across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// When edits are written back to the source file
    #[serde(default)]
    pub save_policy: SavePolicy,
    /// Reopen the last file on startup when no path is given
    #[serde(default = "default_reopen")]
    pub reopen_last_file: bool,
}

fn default_reopen() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_policy: SavePolicy::default(),
            reopen_last_file: default_reopen(),
        }
    }
}

impl AppConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(&path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.save_policy, SavePolicy::OnEdit);
        assert!(config.reopen_last_file);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AppConfig {
            save_policy: SavePolicy::OnDemand,
            reopen_last_file: false,
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let parsed: AppConfig = serde_yaml::from_str("save_policy: on_demand\n").unwrap();
        assert_eq!(parsed.save_policy, SavePolicy::OnDemand);
        assert!(parsed.reopen_last_file);
    }

    #[test]
    fn test_policy_spelling() {
        let yaml = serde_yaml::to_string(&AppConfig::default()).unwrap();
        assert!(yaml.contains("on_edit"));
    }
}
