use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::notifications::StoreConfig;

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!("Loaded {} configuration sections from {}", config.len(), path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    /// Path of the file this configuration came from, if any
    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get boolean value with type conversion
    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!("Invalid boolean value for {}.{}: {}", section, key, value)),
            },
            None => Ok(None),
        }
    }

    /// Get unsigned integer value with type conversion
    pub fn get_u64(&self, section: &str, key: &str) -> Result<Option<u64>> {
        match self.get_value(section, key) {
            Some(value) => value
                .parse::<u64>()
                .map(Some)
                .with_context(|| format!("Invalid {}.{} value in config: {}", section, key, value)),
            None => Ok(None),
        }
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Get notification store configuration from the `[store]` section
    pub fn get_store_config(&self) -> Result<StoreConfig> {
        let mut builder = StoreConfig::builder();

        if let Some(capacity) = self.get_u64("store", "capacity")? {
            let capacity = usize::try_from(capacity)
                .with_context(|| format!("store.capacity {} does not fit this platform", capacity))?;
            builder = builder.with_capacity(capacity);
        }

        if let Some(delay_ms) = self.get_u64("store", "remove-delay-ms")? {
            builder = builder.with_remove_delay_ms(delay_ms);
        }

        builder.build().context("Store configuration validation failed")
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $TOASTSTORE_CONFIG
    if let Ok(env_path) = env::var("TOASTSTORE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("toaststore").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".toaststore.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.toaststore.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let table: toml::Table = content.parse().context("Failed to parse TOML content")?;

    let mut config = Configuration::new();
    flatten_toml_table(&table, String::new(), &mut config);

    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) => {
                // Scalars in this table form a section; nested tables recurse
                let section = config.entry(section_name.clone()).or_default();
                for (subkey, subvalue) in subtable {
                    if !matches!(subvalue, Value::Table(_)) {
                        section.insert(subkey.clone(), toml_value_to_string(subvalue));
                    }
                }
                if section.is_empty() {
                    config.remove(&section_name);
                }
                flatten_toml_table(subtable, section_name, config);
            }
            _ => {
                // Top-level keys belong to [base]
                if prefix.is_empty() {
                    config
                        .entry("base".to_string())
                        .or_default()
                        .insert(key.clone(), toml_value_to_string(value));
                }
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(dt) => dt.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_toml_value_to_string_conversion() {
        assert_eq!(toml_value_to_string(&Value::String("json".to_string())), "json");
        assert_eq!(toml_value_to_string(&Value::Integer(5)), "5");
        assert_eq!(toml_value_to_string(&Value::Boolean(false)), "false");
    }

    #[test]
    fn test_parse_toml_config_sections() {
        let toml_content = r#"
output = "json"

[base]
log-format = "json"
console-level = "debug"

[store]
capacity = 3
remove-delay-ms = 250

[profile.demo]
capacity = 1

[profile.demo.store]
remove-delay-ms = 10
"#;

        let config = parse_toml_config(toml_content).unwrap();

        assert_eq!(config["base"]["output"], "json");
        assert_eq!(config["base"]["log-format"], "json");
        assert_eq!(config["store"]["capacity"], "3");
        assert_eq!(config["store"]["remove-delay-ms"], "250");
        assert_eq!(config["profile.demo"]["capacity"], "1");
        assert_eq!(config["profile.demo.store"]["remove-delay-ms"], "10");
        assert!(!config.contains_key("profile"));
    }

    #[test]
    fn test_config_manager_value_fallback() {
        let mut config = Configuration::new();
        config.insert(
            "base".to_string(),
            HashMap::from([("capacity".to_string(), "9".to_string())]),
        );
        config.insert(
            "store".to_string(),
            HashMap::from([("remove-delay-ms".to_string(), "50".to_string())]),
        );
        config.insert(
            "quick".to_string(),
            HashMap::from([("remove-delay-ms".to_string(), "1".to_string())]),
        );

        let mut manager = ConfigManager::from_config(config);
        assert_eq!(manager.get_value("store", "remove-delay-ms").unwrap(), "50");
        assert_eq!(manager.get_value("store", "capacity").unwrap(), "9");
        assert!(manager.get_value("store", "missing").is_none());

        manager.select_section("quick".to_string());
        assert_eq!(manager.get_value("store", "remove-delay-ms").unwrap(), "1");
    }

    #[test]
    fn test_config_manager_type_conversion() {
        let mut base = HashMap::new();
        base.insert("quiet".to_string(), "true".to_string());
        base.insert("invalid-bool".to_string(), "maybe".to_string());
        base.insert("console-level".to_string(), "warn".to_string());
        base.insert("log-file".to_string(), "/tmp/toaststore.log".to_string());
        let manager = ConfigManager::from_config(Configuration::from([("base".to_string(), base)]));

        assert_eq!(manager.get_bool("base", "quiet").unwrap(), Some(true));
        assert!(manager.get_bool("base", "invalid-bool").is_err());
        assert_eq!(manager.get_bool("base", "missing").unwrap(), None);
        assert_eq!(
            manager.get_log_level("base", "console-level").unwrap(),
            Some(log::LevelFilter::Warn)
        );
        assert_eq!(
            manager.get_path("base", "log-file"),
            Some(PathBuf::from("/tmp/toaststore.log"))
        );
    }

    #[test]
    fn test_store_config_defaults_without_section() {
        let manager = ConfigManager::from_config(Configuration::new());
        assert_eq!(manager.get_store_config().unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_store_config_from_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[store]\ncapacity = 2\nremove-delay-ms = 40\n").unwrap();

        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        let store_config = manager.get_store_config().unwrap();

        assert_eq!(store_config.capacity, 2);
        assert_eq!(store_config.remove_delay, Duration::from_millis(40));
        assert_eq!(manager.config_file_path().unwrap(), temp_file.path());
    }

    #[test]
    fn test_store_config_rejects_invalid_values() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[store]\ncapacity = 0\n").unwrap();
        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        assert!(manager.get_store_config().is_err());

        fs::write(&temp_file, "[store]\nremove-delay-ms = \"soon\"\n").unwrap();
        let manager = ConfigManager::load_from_file(temp_file.path().to_path_buf()).unwrap();
        assert!(manager.get_store_config().is_err());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_store_capacity_keeps_full_width() {
        let manager = ConfigManager::from_config(Configuration::from([(
            "store".to_string(),
            HashMap::from([("capacity".to_string(), u64::MAX.to_string())]),
        )]));
        assert_eq!(manager.get_store_config().unwrap().capacity, usize::MAX);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_store_capacity_too_wide_is_rejected() {
        let manager = ConfigManager::from_config(Configuration::from([(
            "store".to_string(),
            HashMap::from([("capacity".to_string(), u64::MAX.to_string())]),
        )]));
        let error = manager.get_store_config().unwrap_err();
        assert!(format!("{:#}", error).contains("does not fit"));
    }
}
