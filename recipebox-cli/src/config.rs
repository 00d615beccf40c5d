use recipebox_core::catalog::DEFAULT_BASE_URL;
use recipebox_core::remote::FirebaseConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Hosted backend project settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FirebaseSection {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    /// Realtime Database URL (e.g., "https://my-app-default-rtdb.firebaseio.com")
    pub database_url: Option<String>,
    /// Storage bucket (e.g., "my-app.appspot.com")
    pub storage_bucket: Option<String>,
}

impl FirebaseSection {
    /// Returns true if every project setting is present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
            && self.project_id.is_some()
            && self.database_url.is_some()
            && self.storage_bucket.is_some()
    }
}

/// Recipe API settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogSection {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl CatalogSection {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the local key-value store
    pub data_dir: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub firebase: FirebaseSection,
    pub catalog: CatalogSection,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    firebase: Option<FirebaseSection>,
    catalog: Option<CatalogSection>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut config_file = None;
        let mut firebase = FirebaseSection::default();
        let mut catalog = CatalogSection::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Relative to the config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(section) = file_config.firebase {
                firebase = section;
            }
            if let Some(section) = file_config.catalog {
                catalog = section;
            }
        }

        if let Ok(dir) = std::env::var("RECIPEBOX_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("RECIPEBOX_FIREBASE_API_KEY") {
            firebase.api_key = Some(key);
        }
        if let Ok(project) = std::env::var("RECIPEBOX_FIREBASE_PROJECT_ID") {
            firebase.project_id = Some(project);
        }
        if let Ok(url) = std::env::var("RECIPEBOX_FIREBASE_DATABASE_URL") {
            firebase.database_url = Some(url);
        }
        if let Ok(bucket) = std::env::var("RECIPEBOX_FIREBASE_STORAGE_BUCKET") {
            firebase.storage_bucket = Some(bucket);
        }
        if let Ok(url) = std::env::var("RECIPEBOX_CATALOG_URL") {
            catalog.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("RECIPEBOX_CATALOG_API_KEY") {
            catalog.api_key = Some(key);
        }

        Ok(Self {
            data_dir,
            config_file,
            firebase,
            catalog,
        })
    }

    /// Backend settings, or the name of the first missing one.
    pub fn firebase_config(&self) -> Result<FirebaseConfig, ConfigError> {
        let section = &self.firebase;
        let require = |value: &Option<String>, key: &'static str| {
            value.clone().ok_or(ConfigError::MissingValue(key))
        };

        Ok(FirebaseConfig::new(
            require(&section.api_key, "api_key")?,
            require(&section.project_id, "project_id")?,
            require(&section.database_url, "database_url")?,
            require(&section.storage_bucket, "storage_bucket")?,
        ))
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/recipebox/
    /// - macOS: ~/Library/Application Support/recipebox/
    /// - Windows: %APPDATA%/recipebox/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recipebox")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/recipebox/
    /// - macOS: ~/Library/Application Support/recipebox/
    /// - Windows: %APPDATA%/recipebox/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recipebox")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    MissingValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::MissingValue(key) => write!(
                f,
                "Backend not configured. Set firebase.{} in config or RECIPEBOX_FIREBASE_{}.",
                key,
                key.to_uppercase()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.data_dir.value.ends_with("recipebox"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert!(config.config_file.is_none());
        assert_eq!(config.catalog.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/recipebox").unwrap();
        writeln!(file, "firebase:").unwrap();
        writeln!(file, "  api_key: abc").unwrap();
        writeln!(file, "  project_id: recipes-123").unwrap();
        writeln!(file, "  database_url: https://recipes-123.firebaseio.com/").unwrap();
        writeln!(file, "  storage_bucket: recipes-123.appspot.com").unwrap();
        writeln!(file, "catalog:").unwrap();
        writeln!(file, "  api_key: xyz").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/recipebox"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
        assert!(config.firebase.is_configured());
        assert_eq!(config.catalog.api_key.as_deref(), Some("xyz"));

        let firebase = config.firebase_config().unwrap();
        assert_eq!(firebase.project_id, "recipes-123");
        assert_eq!(firebase.database_url, "https://recipes-123.firebaseio.com");
    }

    #[test]
    fn test_relative_data_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: data\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("data"));
    }

    #[test]
    fn test_missing_firebase_value() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "firebase:\n  api_key: abc\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert!(!config.firebase.is_configured());
        let err = config.firebase_config().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Backend not configured. Set firebase.project_id in config or RECIPEBOX_FIREBASE_PROJECT_ID."
        );
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: /from/file\n").unwrap();

        std::env::set_var("RECIPEBOX_DATA_DIR", "/from/env");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, PathBuf::from("/from/env"));
        assert_eq!(config.data_dir.source, ConfigSource::Environment);

        std::env::remove_var("RECIPEBOX_DATA_DIR");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
