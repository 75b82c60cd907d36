use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::MediaKind;

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Names of the folders under the media root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaLayout {
    /// Drop folder the photo team fills with fresh shots
    pub staging: String,

    /// Accepted source of truth
    pub sources: String,

    /// Canonically named output
    pub renamed: String,
}

impl Default for MediaLayout {
    fn default() -> Self {
        Self {
            staging: "PHOTO_TEAM".to_string(),
            sources: "SOURCES".to_string(),
            renamed: "RENAMED".to_string(),
        }
    }
}

/// Connection settings for the product catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Endpoint that resolves barcodes
    pub url: String,

    /// Basic auth user
    pub login: String,

    /// Basic auth password
    pub password: String,

    /// Optional request timeout in seconds (no timeout when absent)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Configuration for the media intake pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root holding the staging, sources and renamed folders
    pub media_root: PathBuf,

    /// Folder names under the media root
    #[serde(default)]
    pub layout: MediaLayout,

    /// Catalog connection
    pub catalog: CatalogConfig,

    /// Where validation and duplicate reports are written
    pub report_dir: PathBuf,

    /// Directory for rolling log files (console logging when absent)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            layout: MediaLayout::default(),
            catalog: CatalogConfig::default(),
            report_dir: PathBuf::from("reports"),
            log_dir: None,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from the environment, reading a `.env` file first if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            var(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Configuration(format!("{} is not set", key)))
        };

        let media_root = PathBuf::from(required("MEDIA_SOURCES_PATH")?);

        Ok(Self {
            report_dir: media_root.join("REPORTS"),
            media_root,
            catalog: CatalogConfig {
                url: required("PHOTO_RENAMING_URL")?,
                login: required("LOGIN_1C")?,
                password: required("PASSWORD_1C")?,
                timeout_secs: None,
            },
            log_dir: var("MEDIA_INTAKE_LOG_DIR").map(PathBuf::from),
            ..Default::default()
        })
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.catalog.url.trim();
        if url.is_empty() {
            return Err(Error::Configuration("Catalog URL must be specified".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "Catalog URL must be http(s): {}",
                url
            )));
        }

        if self.catalog.login.is_empty() {
            return Err(Error::Configuration("Catalog login must be specified".to_string()));
        }

        let layout = &self.layout;
        if layout.staging == layout.sources
            || layout.sources == layout.renamed
            || layout.staging == layout.renamed
        {
            return Err(Error::Configuration(
                "Staging, sources and renamed folders must be distinct".to_string(),
            ));
        }

        Ok(())
    }

    /// Folder fresh shots are accepted from
    pub fn staging_dir(&self, kind: MediaKind) -> PathBuf {
        self.media_root.join(&self.layout.staging).join(kind.folder_name())
    }

    /// Accepted source folder
    pub fn sources_dir(&self, kind: MediaKind) -> PathBuf {
        self.media_root.join(&self.layout.sources).join(kind.folder_name())
    }

    /// Canonical output folder
    pub fn renamed_dir(&self, kind: MediaKind) -> PathBuf {
        self.media_root.join(&self.layout.renamed).join(kind.folder_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn valid_config() -> Config {
        Config {
            catalog: CatalogConfig {
                url: "https://erp.example.com/hs/photo_renaming".to_string(),
                login: "bot".to_string(),
                password: "secret".to_string(),
                timeout_secs: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_needs_catalog() {
        assert!(matches!(Config::default().validate(), Err(Error::Configuration(_))));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url_and_layout() {
        let mut config = valid_config();
        config.catalog.url = "ftp://erp.example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.layout.renamed = config.layout.sources.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_paths() {
        let config = Config {
            media_root: PathBuf::from("/media"),
            ..valid_config()
        };
        assert_eq!(config.staging_dir(MediaKind::Photo), PathBuf::from("/media/PHOTO_TEAM/PHOTO"));
        assert_eq!(config.sources_dir(MediaKind::Video), PathBuf::from("/media/SOURCES/VIDEO"));
        assert_eq!(config.renamed_dir(MediaKind::Photo), PathBuf::from("/media/RENAMED/PHOTO"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("media-intake.json");

        let config = valid_config();
        config.save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();

        assert_eq!(loaded.catalog.url, config.catalog.url);
        assert_eq!(loaded.layout, config.layout);
        assert_eq!(loaded.log_level, LogLevel::Info);
    }

    #[test]
    fn test_from_vars() {
        let vars: HashMap<&str, &str> = [
            ("MEDIA_SOURCES_PATH", "/srv/media"),
            ("PHOTO_RENAMING_URL", "http://erp.local/renaming"),
            ("LOGIN_1C", "bot"),
            ("PASSWORD_1C", "secret"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_vars(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.report_dir, PathBuf::from("/srv/media/REPORTS"));
        assert_eq!(config.catalog.login, "bot");
        assert!(config.log_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_vars_missing_variable() {
        let result = Config::from_vars(|key| match key {
            "MEDIA_SOURCES_PATH" => Some("/srv/media".to_string()),
            _ => None,
        });

        match result {
            Err(Error::Configuration(msg)) => assert!(msg.contains("PHOTO_RENAMING_URL")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
