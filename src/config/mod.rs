use crate::core::path::{config_file, ensure_dir, expand_home};
use crate::core::{BalerError, BalerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Site-wide settings, passed explicitly into every archive run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory the dependency manager installs packages into while
    /// packaging (defaults to `~/.gems`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gem_install_dir: Option<String>,

    /// Extension of the final artifact (`<name>-<version>.<ext>`)
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,

    /// Extra top-level directories excluded from every archive
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Version-control metadata directory names stripped at any depth
    #[serde(default = "default_metadata_dirs")]
    pub metadata_dirs: Vec<String>,

    /// Vendor directory, relative to the target tree
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,

    /// Sentinel file marking a tree as vendored
    #[serde(default = "default_sentinel_file")]
    pub sentinel_file: String,

    /// Pattern the boot marker (`lbin/<app>`) must match
    #[serde(default = "default_marker_text")]
    pub marker_text: String,

    #[serde(default)]
    pub dependency_manager: DependencyManagerConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

/// How the external dependency manager is driven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyManagerConfig {
    /// Executable name or path
    pub program: String,
    /// Lock/config state directory inside the target tree
    pub state_dir: String,
    /// "Package for offline use, all platforms"
    pub package_args: Vec<String>,
    /// "Install from lockfile"
    pub install_args: Vec<String>,
    /// Variable overriding the install directory while packaging
    pub install_dir_env: String,
    /// Variable pointing the boot setup at the vendor directory
    pub vendor_path_env: String,
    /// Arguments passed to the application's entry point for the boot setup
    pub setup_args: Vec<String>,
    /// Variables removed from the environment of every isolated invocation
    pub isolated_env: Vec<String>,
}

impl Default for DependencyManagerConfig {
    fn default() -> Self {
        Self {
            program: "bundle".to_string(),
            state_dir: ".bundle".to_string(),
            package_args: vec![
                "package".to_string(),
                "--all".to_string(),
                "--all-platforms".to_string(),
                "--no-install".to_string(),
            ],
            install_args: vec!["install".to_string()],
            install_dir_env: "GEM_HOME".to_string(),
            vendor_path_env: "BUNDLE_PATH".to_string(),
            setup_args: vec!["-v".to_string()],
            isolated_env: [
                "BUNDLE_GEMFILE",
                "BUNDLE_BIN_PATH",
                "BUNDLE_PATH",
                "BUNDLE_APP_CONFIG",
                "BUNDLER_VERSION",
                "BUNDLER_SETUP",
                "GEM_HOME",
                "GEM_PATH",
                "RUBYOPT",
                "RUBYLIB",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Mail server settings for the mailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_alias: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 25,
            from: None,
            from_alias: None,
        }
    }
}

fn default_archive_extension() -> String {
    "tar.gz".to_string()
}

fn default_metadata_dirs() -> Vec<String> {
    [".svn", ".SYNC", ".git", ".hg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_vendor_dir() -> String {
    "vendor/gems".to_string()
}

fn default_sentinel_file() -> String {
    ".baler_archive".to_string()
}

fn default_marker_text() -> String {
    "This file was generated by".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gem_install_dir: None,
            archive_extension: default_archive_extension(),
            exclude: Vec::new(),
            metadata_dirs: default_metadata_dirs(),
            vendor_dir: default_vendor_dir(),
            sentinel_file: default_sentinel_file(),
            marker_text: default_marker_text(),
            dependency_manager: DependencyManagerConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform-specific config directory
    ///
    /// A missing file yields the defaults; nothing is written.
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\baler\config.yaml
    /// - Linux: ~/.config/baler/config.yaml
    /// - macOS: ~/Library/Application Support/baler/config.yaml
    pub fn load() -> BalerResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_yaml(&content)
    }

    /// Parse config from YAML text
    pub fn from_yaml(content: &str) -> BalerResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| BalerError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save config to the platform-specific config directory
    pub fn save(&self) -> BalerResult<()> {
        let config_path = config_file()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| BalerError::Path("Invalid config path".to_string()))?;

        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| BalerError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Resolved dependency install directory (`~` expanded)
    pub fn gem_install_dir(&self) -> BalerResult<PathBuf> {
        if let Some(ref dir) = self.gem_install_dir {
            return Ok(expand_home(dir));
        }
        dirs::home_dir()
            .map(|home| home.join(".gems"))
            .ok_or_else(|| BalerError::Path("Could not determine home directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.archive_extension, "tar.gz");
        assert_eq!(config.vendor_dir, "vendor/gems");
        assert_eq!(config.dependency_manager.program, "bundle");
        assert!(config.metadata_dirs.contains(&".svn".to_string()));
        assert_eq!(config.mail.port, 25);
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config = Config::from_yaml("archive_extension: bale\n").unwrap();
        assert_eq!(config.archive_extension, "bale");
        assert_eq!(config.sentinel_file, ".baler_archive");
        assert_eq!(config.dependency_manager, DependencyManagerConfig::default());
    }

    #[test]
    fn test_config_partial_nested_sections() {
        let yaml = r#"
exclude: [simulation]
dependency_manager:
  program: /opt/bin/bundle
mail:
  server: smtp.example.com
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.exclude, vec!["simulation"]);
        assert_eq!(config.dependency_manager.program, "/opt/bin/bundle");
        assert_eq!(config.dependency_manager.state_dir, ".bundle");
        assert_eq!(config.mail.server, "smtp.example.com");
        assert_eq!(config.mail.port, 25);
    }

    #[test]
    fn test_config_round_trip_through_yaml() {
        let config = Config {
            gem_install_dir: Some("/opt/gems".to_string()),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("gem_install_dir: /opt/gems"));
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_config_invalid_yaml() {
        let err = Config::from_yaml("exclude: [unterminated").unwrap_err();
        assert!(matches!(err, BalerError::Config(_)));
    }

    #[test]
    fn test_gem_install_dir_custom() {
        let config = Config {
            gem_install_dir: Some("/custom/gems".to_string()),
            ..Default::default()
        };
        assert_eq!(config.gem_install_dir().unwrap(), PathBuf::from("/custom/gems"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    #[serial_test::serial]
    fn test_load_missing_then_save() {
        let temp = tempfile::TempDir::new().unwrap();
        let previous = std::env::var_os("XDG_CONFIG_HOME");
        std::env::set_var("XDG_CONFIG_HOME", temp.path());

        let loaded = Config::load().unwrap();
        assert_eq!(loaded, Config::default());
        assert!(!temp.path().join("baler/config.yaml").exists());

        let config = Config {
            exclude: vec!["simulation".to_string()],
            ..Default::default()
        };
        config.save().unwrap();
        assert!(temp.path().join("baler/config.yaml").exists());
        assert_eq!(Config::load().unwrap(), config);

        match previous {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}
