//! Service profiling: extract every file of one service and fold the facts.

use crate::core::{ServiceProfile, SourceFacts};
use crate::extraction::Extractor;
use crate::io::walker::SourceTree;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, debug_span, warn};

/// A profiled service plus the facts only the analyzer needs.
#[derive(Debug, Clone, Default)]
pub struct ServiceScan {
    pub profile: ServiceProfile,
    /// Path-like literals across the service's files, minus the paths the
    /// service declares as its own endpoints
    pub path_literals: BTreeSet<String>,
    /// Module-private functions (`_name`) never referenced in the service
    pub unused_private_functions: Vec<String>,
    /// Files left out because they could not be read or parsed
    pub skipped_files: usize,
}

/// Profile one service. Unreadable and unparsable files are logged and
/// skipped; a missing service root yields an empty profile.
pub fn profile_service(
    name: &str,
    root: &Path,
    tree: &dyn SourceTree,
    extractor: &Extractor,
) -> ServiceScan {
    let _span = debug_span!("profile_service", service = name).entered();

    let files = match tree.source_files(root) {
        Ok(files) => files,
        Err(e) => {
            warn!("Cannot list files of service {} at {}: {}", name, root.display(), e);
            return ServiceScan {
                profile: ServiceProfile::new(name, root),
                ..ServiceScan::default()
            };
        }
    };

    // Extraction is per file and independent; collect keeps file order so the
    // fold below is deterministic.
    let results: Vec<Option<SourceFacts>> = files
        .par_iter()
        .map(|path| {
            let content = match tree.read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                    return None;
                }
            };
            match extractor.extract(path, &content) {
                Ok(facts) => Some(facts),
                Err(e) => {
                    warn!("Skipping {}", e);
                    None
                }
            }
        })
        .collect();

    let skipped_files = results.iter().filter(|r| r.is_none()).count();
    let facts: Vec<SourceFacts> = results.into_iter().flatten().collect();
    let scan = fold_facts(name, root, &facts, skipped_files);

    debug!(
        service = name,
        files = scan.profile.file_count(),
        skipped = skipped_files,
        complexity = scan.profile.total_complexity,
        endpoints = scan.profile.endpoint_count(),
        "profiled service"
    );

    scan
}

/// Fold per-file facts into a scan. Only sums and set unions are involved,
/// so the totals do not depend on the order files were extracted in.
pub fn fold_facts(
    name: &str,
    root: &Path,
    facts: &[SourceFacts],
    skipped_files: usize,
) -> ServiceScan {
    let mut profile = ServiceProfile::new(name, root);
    let mut path_literals = BTreeSet::new();
    let mut referenced = BTreeSet::new();

    for file in facts {
        profile.absorb(file);
        path_literals.extend(file.path_literals.iter().cloned());
        referenced.extend(file.referenced_names.iter().map(String::as_str));
    }
    // route decorators are declarations, not outbound calls
    for endpoint in &profile.endpoints {
        path_literals.remove(&endpoint.path);
    }

    let unused_private_functions = facts
        .iter()
        .flat_map(|file| file.functions.iter())
        .filter(|func| is_private(&func.name) && !referenced.contains(func.name.as_str()))
        .map(|func| func.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    ServiceScan {
        profile,
        path_literals,
        unused_private_functions,
        skipped_files,
    }
}

fn is_private(name: &str) -> bool {
    name.starts_with('_') && !name.starts_with("__")
}
