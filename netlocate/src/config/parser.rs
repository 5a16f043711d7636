//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [sources] section
    if let Some(section) = ini.section(Some("sources")) {
        if let Some(v) = section.get("use_wifi") {
            config.sources.use_wifi = parse_bool("sources", "use_wifi", v)?;
        }
        if let Some(v) = section.get("use_cells") {
            config.sources.use_cells = parse_bool("sources", "use_cells", v)?;
        }
    }

    // [lookup] section
    if let Some(section) = ini.section(Some("lookup")) {
        if let Some(v) = section.get("wifi_url") {
            config.lookup.wifi_url = parse_url("lookup", "wifi_url", v)?;
        }
        if let Some(v) = section.get("cell_url") {
            config.lookup.cell_url = parse_url("lookup", "cell_url", v)?;
        }
        if let Some(v) = section.get("min_interval_ms") {
            config.lookup.min_interval_ms =
                v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "lookup".to_string(),
                    key: "min_interval_ms".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative integer (milliseconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("timeout") {
            config.lookup.timeout = match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigFileError::InvalidValue {
                        section: "lookup".to_string(),
                        key: "timeout".to_string(),
                        value: v.to_string(),
                        reason: "must be a positive integer (seconds)".to_string(),
                    });
                }
            };
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be 'true' or 'false'".to_string(),
        }),
    }
}

fn parse_url(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let value = value.trim();
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value.to_string()),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be an absolute http or https URL".to_string(),
        }),
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_sources() {
        let config = parse("[sources]\nuse_wifi = false\nuse_cells = YES\n").unwrap();
        assert!(!config.sources.use_wifi);
        assert!(config.sources.use_cells);
    }

    #[test]
    fn test_parse_lookup() {
        let config = parse(
            "[lookup]\nwifi_url = http://127.0.0.1:9000/wifi\nmin_interval_ms = 250\ntimeout = 5\n",
        )
        .unwrap();
        assert_eq!(config.lookup.wifi_url, "http://127.0.0.1:9000/wifi");
        assert_eq!(config.lookup.min_interval_ms, 250);
        assert_eq!(config.lookup.timeout, 5);
        assert_eq!(config.lookup.cell_url, ConfigFile::default().lookup.cell_url);
    }

    #[test]
    fn test_invalid_bool_names_key() {
        let err = parse("[sources]\nuse_wifi = maybe\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue {
                section,
                key,
                value,
                ..
            } => {
                assert_eq!(section, "sources");
                assert_eq!(key, "use_wifi");
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_interval_rejected() {
        assert!(matches!(
            parse("[lookup]\nmin_interval_ms = soon\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("[lookup]\nmin_interval_ms = -5\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            parse("[lookup]\ntimeout = 0\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            parse("[lookup]\ncell_url = not a url\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse("[lookup]\ncell_url = ftp://example.com/cell\n"),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_logging_directory_expands_tilde() {
        let config = parse("[logging]\ndirectory = ~/netlocate-logs\n").unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.logging.directory, home.join("netlocate-logs"));
        }
    }
}
