//! Application initialization and configuration

use anyhow::{Context, Result};
use log::{debug, error};
use std::str::FromStr;
use std::time::Duration;
use crate::notifications::StoreConfig;
use crate::{cli, config, display, logging};

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    use log::LevelFilter;

    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        match config.get_log_level("base", "console-level") {
            Ok(Some(level)) => level,
            Ok(None) => LevelFilter::Warn,
            Err(e) => {
                debug!("Invalid console-level in config, using default: {}", e);
                LevelFilter::Warn
            }
        }
    };

    let format = if args.log_format != "text" {
        logging::LogFormat::from_str(&args.log_format).map_err(|e| anyhow::anyhow!(e))?
    } else {
        match config.get_value("base", "log-format") {
            Some(format_str) => {
                debug!("Using log format from config: {}", format_str);
                logging::LogFormat::from_str(format_str).unwrap_or(logging::LogFormat::Text)
            }
            None => logging::LogFormat::Text,
        }
    };

    let log_file_path = args.log_file.clone()
        .or_else(|| config.get_path("base", "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => match config.get_log_level("base", "file-log-level") {
            Ok(level) => level,
            Err(e) => {
                debug!("Invalid file-log-level in config, using None: {}", e);
                None
            }
        },
    };

    let (destination, file_level) = match (log_file_path, file_log_level) {
        (Some(file_path), Some(level)) => (logging::LogDestination::Both(file_path), Some(level)),
        (Some(file_path), None) => (logging::LogDestination::Both(file_path), Some(console_level)),
        (None, None) => (logging::LogDestination::Console, None),
        (None, Some(_)) => {
            error!("Log file level specified without log file");
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Store settings from the config file, overridden by CLI flags
pub fn configure_store(args: &cli::Args, config: &config::ConfigManager) -> Result<StoreConfig> {
    let mut store_config = config.get_store_config()?;

    if let Some(capacity) = args.capacity {
        store_config.capacity = capacity;
    }
    if let Some(delay_ms) = args.remove_delay_ms {
        store_config.remove_delay = Duration::from_millis(delay_ms);
    }

    store_config.validate().context("Store configuration validation failed")?;
    debug!(
        "Store configured: capacity {}, remove delay {}ms",
        store_config.capacity,
        store_config.remove_delay_ms()
    );
    Ok(store_config)
}

/// Create a ColourManager from the `--no-color` flag and the `no-color` config key
pub fn create_colour_manager(args: &cli::Args, config: &config::ConfigManager) -> Result<display::ColourManager> {
    let no_color = args.no_color || config.get_bool("base", "no-color")?.unwrap_or(false);
    let colours = display::ColourManager::from_args(no_color);
    debug!("Coloured output enabled: {}", colours.colours_enabled());
    Ok(colours)
}

/// Create a snapshot renderer from CLI arguments and configuration
pub fn create_renderer(
    args: &cli::Args,
    config: &config::ConfigManager,
    store_config: &StoreConfig,
) -> Result<display::SnapshotRenderer> {
    let format = display::OutputFormat::from_str(&args.output).map_err(|e| anyhow::anyhow!(e))?;
    let colours = create_colour_manager(args, config)?;
    Ok(display::SnapshotRenderer::new(format, colours, store_config.capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::tests::create_test_args;
    use crate::config::{ConfigManager, Configuration};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_with(section: &str, pairs: &[(&str, &str)]) -> ConfigManager {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigManager::from_config(Configuration::from([(section.to_string(), values)]))
    }

    #[test]
    fn test_store_flags_override_config() {
        let config = config_with("store", &[("capacity", "2"), ("remove-delay-ms", "40")]);

        let store = configure_store(&create_test_args(), &config).unwrap();
        assert_eq!(store.capacity, 2);
        assert_eq!(store.remove_delay, Duration::from_millis(40));

        let args = cli::Args {
            capacity: Some(7),
            ..create_test_args()
        };
        let store = configure_store(&args, &config).unwrap();
        assert_eq!(store.capacity, 7);
        assert_eq!(store.remove_delay, Duration::from_millis(40));
    }

    #[test]
    fn test_store_reads_store_section_through_config_manager() {
        let mut config = config_with("store", &[("capacity", "2")]);
        config.select_section("tiny".to_string());
        assert_eq!(configure_store(&create_test_args(), &config).unwrap().capacity, 2);

        let values = HashMap::from([
            ("capacity".to_string(), "2".to_string()),
            ("remove-delay-ms".to_string(), "not-a-number".to_string()),
        ]);
        let config = ConfigManager::from_config(Configuration::from([("store".to_string(), values)]));
        let args = cli::Args {
            capacity: Some(4),
            ..create_test_args()
        };
        assert!(configure_store(&args, &config).is_err());
    }

    #[test]
    fn test_store_defaults() {
        let config = ConfigManager::from_config(Configuration::new());
        assert_eq!(configure_store(&create_test_args(), &config).unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_logging_flags() {
        let config = ConfigManager::from_config(Configuration::new());

        let args = cli::Args {
            verbose: true,
            ..create_test_args()
        };
        let log_config = configure_logging(&args, &config).unwrap();
        assert_eq!(log_config.console_level, log::LevelFilter::Debug);
        assert_eq!(log_config.destination, logging::LogDestination::Console);

        let args = cli::Args {
            log_file: Some(PathBuf::from("run.log")),
            log_file_level: Some("trace".to_string()),
            log_format: "json".to_string(),
            ..create_test_args()
        };
        let log_config = configure_logging(&args, &config).unwrap();
        assert_eq!(log_config.format, logging::LogFormat::Json);
        assert_eq!(log_config.file_level, Some(log::LevelFilter::Trace));
        assert_eq!(
            log_config.destination,
            logging::LogDestination::Both(PathBuf::from("run.log"))
        );
    }

    #[test]
    fn test_logging_from_config() {
        let config = config_with("base", &[("console-level", "info"), ("log-format", "json")]);
        let log_config = configure_logging(&create_test_args(), &config).unwrap();
        assert_eq!(log_config.console_level, log::LevelFilter::Info);
        assert_eq!(log_config.format, logging::LogFormat::Json);
    }

    #[test]
    fn test_create_renderer_uses_output_flag() {
        let args = cli::Args {
            output: "json".to_string(),
            ..create_test_args()
        };
        let config = ConfigManager::from_config(Configuration::new());
        let renderer = create_renderer(&args, &config, &StoreConfig::default()).unwrap();

        let rendered = renderer.render(1, &crate::notifications::NotificationState::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["sequence"], 1);
        assert_eq!(value["capacity"], 5);
    }

    #[test]
    fn test_colour_manager_honours_config_and_flag() {
        let config = config_with("base", &[("no-color", "true")]);
        assert!(!create_colour_manager(&create_test_args(), &config).unwrap().colours_enabled());

        let args = cli::Args {
            no_color: true,
            ..create_test_args()
        };
        let empty = ConfigManager::from_config(Configuration::new());
        assert!(!create_colour_manager(&args, &empty).unwrap().colours_enabled());

        let config = config_with("base", &[("no-color", "sometimes")]);
        assert!(create_colour_manager(&create_test_args(), &config).is_err());
    }
}
