//! Service auto-detection from conventional directory layouts.

use crate::core::errors::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const CODE_EXTENSIONS: &[&str] = &["py", "js"];

/// Directories under `root` matching any of `patterns` that hold code.
///
/// Hidden directories are ignored. A trailing `-service` or `-api` is removed
/// from the directory name; when two directories map to the same name the
/// first match wins.
pub fn discover_services(root: &Path, patterns: &[String]) -> Result<BTreeMap<String, PathBuf>> {
    let mut services = BTreeMap::new();

    for pattern in patterns {
        let full = root.join(pattern);
        let mut matches: Vec<PathBuf> = glob::glob(&full.to_string_lossy())?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_dir())
            .collect();
        matches.sort();

        for path in matches {
            let Some(dir_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if dir_name.starts_with('.') || !contains_code(&path) {
                continue;
            }
            let name = service_name(dir_name);
            debug!("Discovered service {} at {}", name, path.display());
            services.entry(name).or_insert(path);
        }
    }

    Ok(services)
}

pub fn service_name(dir_name: &str) -> String {
    dir_name
        .strip_suffix("-service")
        .or_else(|| dir_name.strip_suffix("-api"))
        .unwrap_or(dir_name)
        .to_string()
}

fn contains_code(dir: &Path) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
        })
}
