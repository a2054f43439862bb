use std::{env, fs, path::PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, ContextCompat},
};
use directories::ProjectDirs;
use serde::Deserialize;

/// Repository whose releases are synchronized when none is configured
pub const DEFAULT_REPOSITORY: &str = "kjarosh/ruffle";
/// File name of the metainfo releases document at its deployment location
pub const METAINFO_FILE_NAME: &str = "rs.ruffle.Ruffle.releases.xml";
/// Number of releases fetched from the listing when no limit is configured
const DEFAULT_LIMIT: u32 = 60;

/// Main configuration struct for the application
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[serde(default)]
pub struct Config {
    /// Directory where the data must be stored
    pub data_dir: PathBuf,
    /// Repository whose releases are synchronized, in `owner/name` form
    pub repository: String,
    /// Maximum number of releases to fetch from the listing
    pub limit: u32,
    /// Path of the metainfo releases document, overriding the deployment-relative default
    pub metainfo: Option<PathBuf>,
    /// Configuration settings for application logging
    pub logs: LogsConfig,
}

/// Configuration settings for application logging
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[serde(default)]
pub struct LogsConfig {
    /// Whether application logging is enabled
    pub enabled: bool,
    /// The log filter to apply, controlling which logs are recorded.
    ///
    /// This string supports the `tracing-subscriber`'s environment filter syntax.
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            repository: String::from(DEFAULT_REPOSITORY),
            limit: DEFAULT_LIMIT,
            metainfo: None,
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: String::from("info"),
        }
    }
}

impl Config {
    /// Initializes the application configuration.
    ///
    /// Attempts to load the configuration from the given file, the `METAINFO_SYNC_CONFIG` env var or the user's
    /// config directory (`config.toml`). If the file does not exist or has missing fields, it falls back to default
    /// values.
    pub fn init(config_file: Option<PathBuf>) -> Result<Self> {
        // Initialize directories
        let proj_dirs =
            ProjectDirs::from("rs", "ruffle", "metainfo-sync").wrap_err("Couldn't initialize project directory")?;
        let config_dir = proj_dirs.config_dir().to_path_buf();

        // Initialize the config
        let config_path = config_file
            .or_else(|| env::var("METAINFO_SYNC_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| config_dir.join("config.toml"));
        let mut config = if config_path.exists() {
            // Read from the config file, if found
            let config_str = fs::read_to_string(&config_path)
                .wrap_err_with(|| format!("Couldn't read config file {}", config_path.display()))?;
            toml::from_str(&config_str)
                .wrap_err_with(|| format!("Couldn't parse config file {}", config_path.display()))?
        } else {
            // Use default values if not found
            Config::default()
        };
        // If no data dir is provided, use the default
        if config.data_dir.as_os_str().is_empty() {
            config.data_dir = proj_dirs.data_dir().to_path_buf();
        }

        // Create the data directory if not found
        fs::create_dir_all(&config.data_dir)
            .wrap_err_with(|| format!("Couldn't create data dir {}", config.data_dir.display()))?;

        Ok(config)
    }

    /// Resolves the path of the metainfo releases document.
    ///
    /// An explicit `path` wins over the configured one; when neither is given the document is expected at its
    /// deployment location, two directories above the executable.
    pub fn metainfo_path(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = path.or_else(|| self.metainfo.clone()) {
            return Ok(path);
        }
        let exe = env::current_exe().wrap_err("Couldn't determine the executable path")?;
        let exe = fs::canonicalize(&exe).unwrap_or(exe);
        let deployment_root = exe
            .parent()
            .and_then(|dir| dir.parent())
            .wrap_err_with(|| format!("Couldn't resolve the deployment directory of {}", exe.display()))?;
        Ok(deployment_root.join(METAINFO_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.repository, DEFAULT_REPOSITORY);
        assert_eq!(config.limit, 60);
        assert_eq!(config.metainfo, None);
        assert!(!config.logs.enabled);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            repository = "owner/name"
            limit = 10

            [logs]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.repository, "owner/name");
        assert_eq!(config.limit, 10);
        assert!(config.logs.enabled);
        assert_eq!(config.logs.filter, "info");
    }

    #[test]
    fn test_metainfo_path_prefers_explicit_path() {
        let config = Config {
            metainfo: Some(PathBuf::from("configured.xml")),
            ..Config::default()
        };
        let path = config.metainfo_path(Some(PathBuf::from("explicit.xml"))).unwrap();
        assert_eq!(path, PathBuf::from("explicit.xml"));
        let path = config.metainfo_path(None).unwrap();
        assert_eq!(path, PathBuf::from("configured.xml"));
    }
}
