//! JSON persistence of analyses, plans and risk lists
//!
//! Layout under the output directory:
//!
//! ```text
//! analysis/analysis-<YYYYmmdd-HHMMSS>.json
//! plans/plan-<id>.json
//! risks/risks-<YYYYmmdd-HHMMSS>.json
//! ```

use crate::core::errors::{Result, ResultExt};
use crate::core::{ArchitectureAnalysis, RefactorPlan, RegressionRisk};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn save_analysis(&self, analysis: &ArchitectureAnalysis) -> Result<PathBuf> {
        self.save_analysis_at(analysis, Utc::now())
    }

    pub fn save_analysis_at(
        &self,
        analysis: &ArchitectureAnalysis,
        at: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let name = format!("analysis-{}.json", at.format(TIMESTAMP_FORMAT));
        self.write_json("analysis", &name, analysis)
    }

    pub fn save_plan(&self, plan: &RefactorPlan) -> Result<PathBuf> {
        self.write_json("plans", &format!("plan-{}.json", plan.id), plan)
    }

    pub fn save_risks(&self, risks: &[RegressionRisk]) -> Result<PathBuf> {
        let name = format!("risks-{}.json", Utc::now().format(TIMESTAMP_FORMAT));
        self.write_json("risks", &name, risks)
    }

    pub fn load_analysis(&self, path: &Path) -> Result<ArchitectureAnalysis> {
        read_json(path)
    }

    pub fn load_plan(&self, id: &str) -> Result<RefactorPlan> {
        read_json(&self.root.join("plans").join(format!("plan-{id}.json")))
    }

    /// Most recent analysis by file name, if any was saved
    pub fn latest_analysis(&self) -> Result<Option<PathBuf>> {
        let dir = self.root.join("analysis");
        if !dir.is_dir() {
            return Ok(None);
        }
        let mut newest: Option<PathBuf> = None;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_analysis = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("analysis-") && n.ends_with(".json"));
            if is_analysis && newest.as_ref().is_none_or(|current| path > *current) {
                newest = Some(path);
            }
        }
        Ok(newest)
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        subdir: &str,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf> {
        let dir = self.root.join(subdir);
        fs::create_dir_all(&dir).context(format!("creating {}", dir.display()))?;
        let path = dir.join(file_name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).context(format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Saved");
        Ok(path)
    }
}

/// Read any JSON record written by the store
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).context(format!("reading {}", path.display()))?;
    serde_json::from_str::<T>(&content).context(format!("parsing {}", path.display()))
}
