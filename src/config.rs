//! Router configuration file and environment overrides.
//!
//! ```toml
//! cache_dir = "var/cache"
//! controller_dir = "src/controllers"
//! watch = false
//! ```
//!
//! YAML files (`.yaml`/`.yml`) use the same keys. After loading,
//! `ROUTEFORGE_CACHE_DIR`, `ROUTEFORGE_CONTROLLER_DIR` and `ROUTEFORGE_WATCH`
//! override the file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub cache_dir: PathBuf,
    pub controller_dir: PathBuf,
    /// Keep `routeforge build` running and rebuild on controller changes.
    pub watch: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("var/cache"),
            controller_dir: PathBuf::from("src/controllers"),
            watch: false,
        }
    }
}

impl RouterConfig {
    /// Load `path` as TOML or YAML depending on its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read router config: {}", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse router config: {}", path.display()))?
        } else {
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse router config: {}", path.display()))?
        };
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("ROUTEFORGE_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("ROUTEFORGE_CONTROLLER_DIR") {
            self.controller_dir = PathBuf::from(dir);
        }
        if let Some(watch) = lookup("ROUTEFORGE_WATCH") {
            self.watch = parse_flag(&watch)
                .with_context(|| format!("ROUTEFORGE_WATCH must be a boolean, got {watch:?}"))?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routeforge.toml");
        std::fs::write(&path, "controller_dir = \"app/controllers\"\nwatch = true\n").unwrap();
        let config = RouterConfig::load(&path).unwrap();
        assert_eq!(config.controller_dir, PathBuf::from("app/controllers"));
        assert_eq!(config.cache_dir, PathBuf::from("var/cache"));
        assert!(config.watch);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routeforge.yaml");
        std::fs::write(&path, "cache_dir: /tmp/rf\n").unwrap();
        let config = RouterConfig::load(&path).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/rf"));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "watch = maybe").unwrap();
        let err = RouterConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ROUTEFORGE_CACHE_DIR", "/c"),
            ("ROUTEFORGE_WATCH", "yes"),
        ]
        .into_iter()
        .collect();
        let mut config = RouterConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/c"));
        assert_eq!(config.controller_dir, PathBuf::from("src/controllers"));
        assert!(config.watch);

        let mut config = RouterConfig::default();
        assert!(config
            .apply_overrides(|k| (k == "ROUTEFORGE_WATCH").then(|| "sometimes".to_string()))
            .is_err());
    }
}
