//! Configuration management for repoprobe
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REPOPROBE_*)
//! 3. Config file (~/.config/repoprobe/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Remote repository exercised by the scenarios
pub const DEFAULT_HTTPS_URL: &str = "https://github.com/hylak123/gh_testing.git";

/// SSH address of the same remote
pub const DEFAULT_SSH_URL: &str = "git@github.com:hylak123/gh_testing.git";

/// Where scenario working directories are created
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Root directory holding one working directory per scenario
    pub root: PathBuf,

    /// Keep working directories after each scenario
    pub keep: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_work_root(),
            keep: false,
        }
    }
}

/// Remote endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// HTTPS clone URL
    pub https_url: String,

    /// SSH clone address
    pub ssh_url: String,

    /// Branch expected to exist on the remote
    pub existing_branch: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            https_url: DEFAULT_HTTPS_URL.to_string(),
            ssh_url: DEFAULT_SSH_URL.to_string(),
            existing_branch: "main".to_string(),
        }
    }
}

/// Settings handed to the git engine at construction
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log every engine command at INFO
    pub trace: bool,

    /// Private key used for SSH transport
    pub ssh_identity: Option<PathBuf>,

    /// Token used as the password for HTTPS transport
    pub https_token: Option<String>,

    /// Commit author used when git config has none
    pub author_name: String,

    /// Commit author email used when git config has none
    pub author_email: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trace: false,
            ssh_identity: None,
            https_token: None,
            author_name: "repoprobe".to_string(),
            author_email: "repoprobe@localhost".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Workspace configuration
    pub workspace: WorkspaceConfig,

    /// Remote configuration
    pub remote: RemoteConfig,

    /// Engine configuration
    pub engine: EngineConfig,
}

/// Overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub keep: bool,
    pub https_url: Option<String>,
    pub ssh_url: Option<String>,
    pub ssh_identity: Option<PathBuf>,
    pub trace: bool,
}

/// Default root for scenario working directories
///
/// Returns `~/.local/share/repoprobe/work` on Linux, falling back to the
/// system temp directory when no data directory is known.
pub fn default_work_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("repoprobe")
        .join("work")
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/repoprobe/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repoprobe").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REPOPROBE_ROOT: Root for scenario working directories
    /// - REPOPROBE_HTTPS_URL / REPOPROBE_SSH_URL: Remote endpoints
    /// - REPOPROBE_SSH_IDENTITY: Private key for SSH transport
    /// - REPOPROBE_HTTPS_TOKEN: Token for HTTPS transport
    /// - REPOPROBE_TRACE: Any value other than "0" or "false" enables tracing
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = var("REPOPROBE_ROOT") {
            self.workspace.root = PathBuf::from(root);
        }

        if let Some(url) = var("REPOPROBE_HTTPS_URL") {
            self.remote.https_url = url;
        }

        if let Some(url) = var("REPOPROBE_SSH_URL") {
            self.remote.ssh_url = url;
        }

        if let Some(identity) = var("REPOPROBE_SSH_IDENTITY") {
            self.engine.ssh_identity = Some(PathBuf::from(identity));
        }

        if let Some(token) = var("REPOPROBE_HTTPS_TOKEN") {
            self.engine.https_token = Some(token);
        }

        if let Some(trace) = var("REPOPROBE_TRACE") {
            self.engine.trace = !matches!(trace.as_str(), "" | "0" | "false");
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(root) = overrides.root {
            self.workspace.root = root;
        }

        if overrides.keep {
            self.workspace.keep = true;
        }

        if let Some(url) = overrides.https_url {
            self.remote.https_url = url;
        }

        if let Some(url) = overrides.ssh_url {
            self.remote.ssh_url = url;
        }

        if let Some(identity) = overrides.ssh_identity {
            self.engine.ssh_identity = Some(identity);
        }

        if overrides.trace {
            self.engine.trace = true;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.remote.https_url, DEFAULT_HTTPS_URL);
        assert_eq!(config.remote.existing_branch, "main");
        assert!(!config.engine.trace);
        assert!(config.engine.ssh_identity.is_none());
        assert!(config.workspace.root.ends_with("repoprobe/work"));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            root: Some(PathBuf::from("/tmp/probe")),
            https_url: Some("https://example.com/x.git".to_string()),
            trace: true,
            ..Default::default()
        });

        assert_eq!(config.workspace.root, PathBuf::from("/tmp/probe"));
        assert_eq!(config.remote.https_url, "https://example.com/x.git");
        assert_eq!(config.remote.ssh_url, DEFAULT_SSH_URL);
        assert!(config.engine.trace);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_overrides_from(|key| match key {
            "REPOPROBE_SSH_IDENTITY" => Some("/home/me/.ssh/id_ed25519".to_string()),
            "REPOPROBE_TRACE" => Some("0".to_string()),
            _ => None,
        });

        assert_eq!(
            config.engine.ssh_identity,
            Some(PathBuf::from("/home/me/.ssh/id_ed25519"))
        );
        assert!(!config.engine.trace);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[workspace]
root = "/srv/probe"
keep = true

[remote]
https_url = "https://example.com/x.git"
existing_branch = "trunk"

[engine]
trace = true
ssh_identity = "/keys/id_rsa"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.workspace.root, PathBuf::from("/srv/probe"));
        assert!(config.workspace.keep);
        assert_eq!(config.remote.https_url, "https://example.com/x.git");
        assert_eq!(config.remote.existing_branch, "trunk");
        assert!(config.engine.trace);
        assert_eq!(config.engine.ssh_identity, Some(PathBuf::from("/keys/id_rsa")));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[remote]
ssh_url = "git@example.com:x.git"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // everything else uses defaults
        assert_eq!(config.remote.ssh_url, "git@example.com:x.git");
        assert_eq!(config.remote.https_url, DEFAULT_HTTPS_URL);
        assert_eq!(config.engine.author_name, "repoprobe");
    }
}
