//! Service configuration read from the environment.
//!
//! # Environment Variables
//!
//! - `CITYMAP_GRAPH_PATH`: road graph JSON document (default: `/data/graph.json`)
//! - `CITYMAP_TILE_DIR`: directory holding `root.png` and `<id>.png` tiles (default: `/data/img`)
//! - `CITYMAP_MAX_DEPTH`: deepest tile level to index (default: 7)
//! - `CITYMAP_TILE_SIZE`: tile edge length in pixels (default: 256)
//! - `SERVICE_PORT`: HTTP port (default: 8080)
//!
//! Unparseable values fall back to the default with a warning, as does a tile
//! size outside `1..=MAX_TILE_SIZE`.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use citymap_lib::{DEFAULT_MAX_DEPTH, MAX_TILE_SIZE, TILE_SIZE};

pub const DEFAULT_GRAPH_PATH: &str = "/data/graph.json";
pub const DEFAULT_TILE_DIR: &str = "/data/img";
pub const DEFAULT_PORT: u16 = 8080;

/// Everything the service needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub graph_path: PathBuf,
    pub tile_dir: PathBuf,
    pub port: u16,
    pub max_depth: u8,
    pub tile_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from(DEFAULT_GRAPH_PATH),
            tile_dir: PathBuf::from(DEFAULT_TILE_DIR),
            port: DEFAULT_PORT,
            max_depth: DEFAULT_MAX_DEPTH,
            tile_size: TILE_SIZE,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            graph_path: lookup("CITYMAP_GRAPH_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.graph_path),
            tile_dir: lookup("CITYMAP_TILE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.tile_dir),
            port: parse_or(&lookup, "SERVICE_PORT", defaults.port),
            max_depth: parse_or(&lookup, "CITYMAP_MAX_DEPTH", defaults.max_depth),
            tile_size: tile_size_or(&lookup, defaults.tile_size),
        }
    }
}

fn tile_size_or(lookup: &impl Fn(&str) -> Option<String>, default: u32) -> u32 {
    let size = parse_or(lookup, "CITYMAP_TILE_SIZE", default);
    if (1..=MAX_TILE_SIZE).contains(&size) {
        size
    } else {
        tracing::warn!(size, max = MAX_TILE_SIZE, "ignoring out-of-range tile size");
        default
    }
}

fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable configuration value");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_depth, 7);
        assert_eq!(config.tile_size, 256);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("CITYMAP_GRAPH_PATH", "/srv/berkeley.json"),
            ("CITYMAP_TILE_DIR", "/srv/tiles"),
            ("SERVICE_PORT", "9000"),
            ("CITYMAP_MAX_DEPTH", "5"),
            ("CITYMAP_TILE_SIZE", "512"),
        ]));
        assert_eq!(config.graph_path, PathBuf::from("/srv/berkeley.json"));
        assert_eq!(config.tile_dir, PathBuf::from("/srv/tiles"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.tile_size, 512);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("SERVICE_PORT", "eighty"),
            ("CITYMAP_MAX_DEPTH", "-1"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_out_of_range_tile_size_falls_back() {
        for raw in ["0", "1073741824"] {
            let config = ServiceConfig::from_lookup(lookup_from(&[("CITYMAP_TILE_SIZE", raw)]));
            assert_eq!(config.tile_size, TILE_SIZE, "tile size {raw}");
        }
        let config = ServiceConfig::from_lookup(lookup_from(&[("CITYMAP_TILE_SIZE", "4096")]));
        assert_eq!(config.tile_size, MAX_TILE_SIZE);
    }
}
