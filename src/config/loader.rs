use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{ServicemapConfig, CONFIG_FILE_NAME};
use crate::core::errors::{Error, Result};

const MAX_TRAVERSAL_DEPTH: usize = 5;

/// Parse a TOML document into a configuration
pub fn parse_config(contents: &str) -> Result<ServicemapConfig> {
    let config: ServicemapConfig = toml::from_str(contents)?;

    if !(0.0..=1.0).contains(&config.analysis.api_dependency_strength) {
        return Err(Error::Configuration(format!(
            "api_dependency_strength must be within [0, 1], got {}",
            config.analysis.api_dependency_strength
        )));
    }

    Ok(config)
}

/// Load an explicitly named configuration file. Unlike the directory search,
/// a missing or invalid file is an error here.
pub fn load_config_from(path: &Path) -> Result<ServicemapConfig> {
    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<ServicemapConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            // absence is the normal case
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            warn!(
                "Invalid config file {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            None
        }
    }
}

/// `start` followed by its ancestors, at most `max_depth` directories in total
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.servicemap.toml`, falling back to
/// defaults when none is found or the first one found is unusable.
pub fn load_config(start: &Path) -> ServicemapConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH + 1)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.exists())
        .and_then(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            debug!(
                "No usable {} within {} ancestors of {}. Using default config.",
                CONFIG_FILE_NAME,
                MAX_TRAVERSAL_DEPTH,
                start.display()
            );
            ServicemapConfig::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SafetyLevel, TargetArchitecture};
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config(indoc! {r#"
            [analysis]
            god_service_endpoints = 30

            [planning]
            target_architecture = "event-driven"
            safety_level = "medium"
            priorities = ["security", "split"]

            [[extraction.endpoint_idioms]]
            tag = "bottle"
            pattern = "@route\\(['\"](?P<path>[^'\"]+)['\"]"
        "#})
        .unwrap();

        assert_eq!(config.analysis.god_service_endpoints, 30);
        assert_eq!(config.analysis.complexity_per_file, 10.0);
        assert_eq!(config.planning.target_architecture, TargetArchitecture::EventDriven);
        assert_eq!(config.planning.safety_level, SafetyLevel::Medium);
        assert_eq!(config.extraction.endpoint_idioms[0].tag, "bottle");
        assert_eq!(config.parallel.jobs, 0);
    }

    #[test]
    fn test_parse_rejects_out_of_range_strength() {
        let err = parse_config("[analysis]\napi_dependency_strength = 1.5\n").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_load_config_searches_ancestors() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[parallel]\njobs = 2\n",
        )
        .unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested);
        assert_eq!(config.parallel.jobs, 2);
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "[analysis\n").unwrap();

        let config = load_config(temp.path());
        assert_eq!(config, ServicemapConfig::default());
    }

    #[test]
    fn test_explicit_path_errors_when_missing() {
        let temp = TempDir::new().unwrap();
        let result = load_config_from(&temp.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_directory_ancestors_limit() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 3).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/a/b/c/d"),
                PathBuf::from("/a/b/c"),
                PathBuf::from("/a/b")
            ]
        );
    }
}
