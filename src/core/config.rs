use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::paths;

/// Environment variables consulted for the CI bearer token, in order.
/// The token never lives in the config file or in source.
pub const TOKEN_ENV_VARS: [&str; 2] = ["MODKIT_CI_TOKEN", "GITHUB_TOKEN"];

/// Everything the workflow needs, passed in explicitly instead of read from
/// a global constants module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub minecraft_version: String,
    pub fabric_version: String,
    /// Registry slugs, installed in order.
    pub mods: Vec<String>,
    pub registry_url: String,
    pub installer_url: String,
    /// Binary used to run the Fabric installer jar.
    pub java_bin: PathBuf,
    /// Game versions declared interchangeable for mod-build purposes.
    pub compatible_versions: HashMap<String, Vec<String>>,
    /// Override for the launcher directory; resolved per platform when unset.
    pub minecraft_dir: Option<PathBuf>,
    pub ci: CiConfig,
}

/// Settings for the one mod acquired from CI build artifacts instead of the
/// registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub workflow: String,
    pub artifact_name: String,
    /// The reserved slug routed through CI instead of the registry.
    pub mod_slug: String,
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        let mut compatible_versions = HashMap::new();
        compatible_versions.insert("1.21".to_string(), vec!["1.21.1".to_string()]);
        compatible_versions.insert("1.21.1".to_string(), vec!["1.21".to_string()]);

        Self {
            minecraft_version: "1.21".to_string(),
            fabric_version: "0.15.11".to_string(),
            mods: vec![
                "sodium".to_string(),
                "lithium".to_string(),
                "iris".to_string(),
                "moonrise".to_string(),
            ],
            registry_url: "https://api.modrinth.com/v2".to_string(),
            installer_url:
                "https://maven.fabricmc.net/net/fabricmc/fabric-installer/1.0.1/fabric-installer-1.0.1.jar"
                    .to_string(),
            java_bin: PathBuf::from("java"),
            compatible_versions,
            minecraft_dir: None,
            ci: CiConfig::default(),
        }
    }
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            owner: "Tuinity".to_string(),
            repo: "Moonrise".to_string(),
            workflow: "build.yml".to_string(),
            artifact_name: "build-artifacts".to_string(),
            mod_slug: "moonrise".to_string(),
            token: None,
        }
    }
}

impl InstallerConfig {
    /// Load a config file, then pick up the CI token from the environment.
    pub fn load(path: &Path) -> InstallerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| InstallerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: InstallerConfig = serde_json::from_str(&raw)?;
        config.ci.token = token_from_env();
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> InstallerResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let mut config = Self::default();
                config.ci.token = token_from_env();
                Ok(config)
            }
        }
    }

    /// The configured override, or the platform default.
    pub fn resolved_minecraft_dir(&self) -> InstallerResult<PathBuf> {
        match &self.minecraft_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::minecraft_dir(),
        }
    }
}

fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .filter(|token| !token.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_the_original_mod_list() {
        let config = InstallerConfig::default();
        assert!(config.mods.iter().any(|slug| slug == "sodium"));
        assert!(config.mods.iter().any(|slug| slug == "lithium"));
        assert!(config.mods.iter().any(|slug| slug == "iris"));
        assert_eq!(config.ci.mod_slug, "moonrise");
    }

    #[test]
    fn partial_config_file_falls_back_to_defaults() {
        let config: InstallerConfig =
            serde_json::from_str(r#"{"minecraft_version": "1.20.4", "mods": ["sodium"]}"#)
                .unwrap();
        assert_eq!(config.minecraft_version, "1.20.4");
        assert_eq!(config.mods, vec!["sodium".to_string()]);
        assert_eq!(config.fabric_version, "0.15.11");
        assert_eq!(config.registry_url, "https://api.modrinth.com/v2");
    }

    #[test]
    fn token_is_never_serialized() {
        let mut config = InstallerConfig::default();
        config.ci.token = Some("secret".to_string());
        let raw = serde_json::to_string(&config).unwrap();
        assert!(!raw.contains("secret"));
    }
}
