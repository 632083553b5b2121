//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let tms = if config.provider.tms { "true" } else { "false" };

    format!(
        r#"[region]
; Area downloaded by `tilevault populate`, as two corners in degrees
top_left_lat = {}
top_left_lon = {}
bottom_right_lat = {}
bottom_right_lon = {}

[view]
; Initial map position and zoom level
lat = {}
lon = {}
zoom = {}

[prefetch]
; Deepest zoom level to download, inclusive (default: 14)
; Tile count grows roughly 4x per level
layers_to_load = {}
; Milliseconds between two tile downloads (default: 100)
ms_throttle = {}

[store]
; Name of the tile database
database_name = {}
; Directory holding tile databases
directory = {}

[provider]
; Tile URL with {{z}}, {{x}}, {{y}} and optional {{s}} placeholders
url_template = {}
; Comma-separated values for {{s}}
subdomains = {}
; Set to true for TMS servers (row 0 at the south)
tms = {}
; HTTP request timeout in seconds, 0 for none
timeout_secs = {}

[logging]
; Log file location
file = {}
"#,
        config.region.top_left_lat,
        config.region.top_left_lon,
        config.region.bottom_right_lat,
        config.region.bottom_right_lon,
        config.view.lat,
        config.view.lon,
        config.view.zoom,
        config.prefetch.layers_to_load,
        config.prefetch.ms_throttle,
        config.store.database_name,
        path_to_string(&config.store.directory),
        config.provider.url_template,
        config.provider.subdomains.join(","),
        tms,
        config.provider.timeout_secs,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_contains_all_sections() {
        let output = to_config_string(&ConfigFile::default());

        for section in [
            "[region]",
            "[view]",
            "[prefetch]",
            "[store]",
            "[provider]",
            "[logging]",
        ] {
            assert!(output.contains(section), "missing {section}");
        }
        assert!(output.contains("layers_to_load = 14"));
        assert!(output.contains("ms_throttle = 100"));
        assert!(output.contains("subdomains = a,b,c"));
        assert!(output.contains("url_template = http://{s}.tile.osm.org/{z}/{x}/{y}.png"));
    }

    #[test]
    fn test_writer_output_parses_back() {
        let output = to_config_string(&ConfigFile::default());
        let ini = ini::Ini::load_from_str(&output).unwrap();
        let parsed = super::super::parser::parse_ini(&ini).unwrap();
        assert_eq!(parsed, ConfigFile::default());
    }
}
