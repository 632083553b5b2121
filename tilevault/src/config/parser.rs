//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{MAX_ZOOM, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::provider::TileUrlTemplate;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [region] section
    if let Some(section) = ini.section(Some("region")) {
        if let Some(v) = section.get("top_left_lat") {
            config.region.top_left_lat = parse_lat("region", "top_left_lat", v)?;
        }
        if let Some(v) = section.get("top_left_lon") {
            config.region.top_left_lon = parse_lon("region", "top_left_lon", v)?;
        }
        if let Some(v) = section.get("bottom_right_lat") {
            config.region.bottom_right_lat = parse_lat("region", "bottom_right_lat", v)?;
        }
        if let Some(v) = section.get("bottom_right_lon") {
            config.region.bottom_right_lon = parse_lon("region", "bottom_right_lon", v)?;
        }
    }

    // [view] section
    if let Some(section) = ini.section(Some("view")) {
        if let Some(v) = section.get("lat") {
            config.view.lat = parse_lat("view", "lat", v)?;
        }
        if let Some(v) = section.get("lon") {
            config.view.lon = parse_lon("view", "lon", v)?;
        }
        if let Some(v) = section.get("zoom") {
            config.view.zoom = parse_zoom("view", "zoom", v)?;
        }
    }

    // [prefetch] section
    if let Some(section) = ini.section(Some("prefetch")) {
        if let Some(v) = section.get("layers_to_load") {
            config.prefetch.layers_to_load = parse_zoom("prefetch", "layers_to_load", v)?;
        }
        if let Some(v) = section.get("ms_throttle") {
            config.prefetch.ms_throttle = parse_number(
                "prefetch",
                "ms_throttle",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
    }

    // [store] section
    if let Some(section) = ini.section(Some("store")) {
        if let Some(v) = section.get("database_name") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) || v == "." || v == ".." {
                return Err(invalid(
                    "store",
                    "database_name",
                    v,
                    "must be a non-empty name without path separators",
                ));
            }
            config.store.database_name = v.to_string();
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.store.directory = expand_tilde(v);
            }
        }
    }

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("url_template") {
            config.provider.url_template = v.trim().to_string();
        }
        if let Some(v) = section.get("subdomains") {
            config.provider.subdomains = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = section.get("tms") {
            config.provider.tms = parse_bool(v);
        }
        if let Some(v) = section.get("timeout_secs") {
            config.provider.timeout_secs = parse_number(
                "provider",
                "timeout_secs",
                v,
                "must be a non-negative integer (seconds, 0 = no timeout)",
            )?;
        }

        // Template and subdomains are validated together
        TileUrlTemplate::new(
            config.provider.url_template.clone(),
            config.provider.subdomains.clone(),
            config.provider.tms,
        )
        .map_err(|e| invalid("provider", "url_template", &config.provider.url_template, &e.to_string()))?;
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_lat(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let reason = format!("must be a latitude between {} and {}", MIN_LAT, MAX_LAT);
    let lat: f64 = parse_number(section, key, value, &reason)?;
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(invalid(section, key, value, &reason));
    }
    Ok(lat)
}

fn parse_lon(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let reason = format!("must be a longitude between {} and {}", MIN_LON, MAX_LON);
    let lon: f64 = parse_number(section, key, value, &reason)?;
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(invalid(section, key, value, &reason));
    }
    Ok(lon)
}

fn parse_zoom(section: &str, key: &str, value: &str) -> Result<u8, ConfigFileError> {
    let reason = format!("must be a zoom level between 0 and {}", MAX_ZOOM);
    let zoom: u8 = parse_number(section, key, value, &reason)?;
    if zoom > MAX_ZOOM {
        return Err(invalid(section, key, value, &reason));
    }
    Ok(zoom)
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[prefetch]
layers_to_load = 10

[view]
zoom = 5
"#,
        )
        .unwrap();

        assert_eq!(config.prefetch.layers_to_load, 10);
        assert_eq!(config.prefetch.ms_throttle, 100);
        assert_eq!(config.view.zoom, 5);
        assert_eq!(config.store.database_name, "tile");
    }

    #[test]
    fn test_region_overrides() {
        let config = load(
            r#"
[region]
top_left_lat = 40.9
top_left_lon = -74.3
bottom_right_lat = 40.5
bottom_right_lon = -73.7
"#,
        )
        .unwrap();

        let region = config.region.region();
        assert_eq!(region.top_left.lat, 40.9);
        assert_eq!(region.bottom_right.lon, -73.7);
    }

    #[test]
    fn test_invalid_latitude() {
        let err = load("[region]\ntop_left_lat = 91\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue {
                section, key, value, ..
            } => {
                assert_eq!(section, "region");
                assert_eq!(key, "top_left_lat");
                assert_eq!(value, "91");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_throttle() {
        let err = load("[prefetch]\nms_throttle = fast\n").unwrap_err();
        assert!(err.to_string().contains("ms_throttle"));
        assert!(err.to_string().contains("milliseconds"));
    }

    #[test]
    fn test_zoom_out_of_range() {
        let err = load("[prefetch]\nlayers_to_load = 40\n").unwrap_err();
        assert!(err.to_string().contains("layers_to_load"));
    }

    #[test]
    fn test_database_name_rejects_paths() {
        let err = load("[store]\ndatabase_name = ../escape\n").unwrap_err();
        assert!(err.to_string().contains("database_name"));
    }

    #[test]
    fn test_provider_settings() {
        let config = load(
            r#"
[provider]
url_template = https://{s}.tiles.example/{z}/{x}/{y}.png
subdomains = t1, t2
tms = yes
timeout_secs = 15
"#,
        )
        .unwrap();

        assert_eq!(config.provider.subdomains, vec!["t1", "t2"]);
        assert!(config.provider.tms);
        assert_eq!(config.provider.timeout(), Some(std::time::Duration::from_secs(15)));
        assert!(config.provider.url_template().unwrap().is_tms());
    }

    #[test]
    fn test_template_without_placeholders_rejected() {
        let err = load("[provider]\nurl_template = https://tiles.example/tile.png\n").unwrap_err();
        assert!(err.to_string().contains("url_template"));
    }

    #[test]
    fn test_subdomain_template_without_subdomains_rejected() {
        let err = load("[provider]\nsubdomains =\n").unwrap_err();
        assert!(err.to_string().contains("{s}"));
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_parse_bool_values() {
        for v in ["true", "TRUE", "1", "yes", "on", " on "] {
            assert!(parse_bool(v), "{v} should be true");
        }
        for v in ["false", "0", "no", "off", "maybe"] {
            assert!(!parse_bool(v), "{v} should be false");
        }
    }
}
