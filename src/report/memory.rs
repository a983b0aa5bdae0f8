//! In-memory report store backed by JSON documents.
//!
//! # Document layout
//! ```text
//! {
//!   "id": "2024-05-01-android",
//!   "summary": { ... },
//!   "steps": [ ... ],
//!   "assets": [ {"name", "size", "children": [...]} ],
//!   "files": [ ... ],
//!   "appendices": { "<type>": [ <any JSON>, ... ] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

use crate::report::tree::{self, TreeNode};
use crate::report::{Appendix, BuildReport, ReportStore};
use crate::routing::ReportHandle;

/// Error loading report documents.
#[derive(Debug, Error)]
pub enum ReportLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid report document {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// An appendix holding arbitrary JSON.
///
/// Supported methods:
/// - `get`: input is a JSON pointer, returns the value it addresses
/// - `keys`: names of an object's fields
/// - `len`: element count of an array or object
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct JsonAppendix(pub Value);

impl Appendix for JsonAppendix {
    fn to_json(&self) -> Value {
        self.0.clone()
    }

    fn invoke(&self, method: &str, input: Option<&str>) -> Option<Value> {
        match method {
            "get" => {
                let pointer = input.unwrap_or_default().trim();
                self.0.pointer(pointer).cloned()
            }
            "keys" => self
                .0
                .as_object()
                .map(|map| Value::from(map.keys().cloned().collect::<Vec<_>>())),
            "len" => match &self.0 {
                Value::Array(items) => Some(items.len().into()),
                Value::Object(map) => Some(map.len().into()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// One report document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MemoryReport {
    pub id: String,
    #[serde(default)]
    pub summary: Value,
    #[serde(default)]
    pub steps: Vec<Value>,
    #[serde(default)]
    pub assets: Vec<TreeNode>,
    #[serde(default)]
    pub files: Vec<TreeNode>,
    #[serde(default)]
    pub appendices: BTreeMap<String, Vec<JsonAppendix>>,
}

impl MemoryReport {
    pub fn new(id: impl Into<String>, summary: Value) -> Self {
        Self {
            id: id.into(),
            summary,
            steps: Vec::new(),
            assets: Vec::new(),
            files: Vec::new(),
            appendices: BTreeMap::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl BuildReport for MemoryReport {
    fn report(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }

    fn summary(&self) -> Value {
        self.summary.clone()
    }

    fn steps(&self) -> Value {
        Value::Array(self.steps.clone())
    }

    fn assets(&self, path: &[&str], depth: u32) -> Option<Value> {
        tree::render_path(&self.assets, path, depth)
    }

    fn files(&self, path: &[&str], depth: u32) -> Option<Value> {
        tree::render_path(&self.files, path, depth)
    }

    fn appendices(&self, kind: &str) -> Vec<&dyn Appendix> {
        self.appendices
            .get(kind)
            .map(|list| list.iter().map(|a| a as &dyn Appendix).collect())
            .unwrap_or_default()
    }
}

/// Reports kept in insertion order; the last one inserted is `latest`.
#[derive(Debug, Clone, Default)]
pub struct MemoryReportStore {
    reports: Vec<MemoryReport>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a report, making it the latest. A report with the same id is
    /// replaced.
    pub fn insert(&mut self, report: MemoryReport) {
        self.reports.retain(|r| r.id != report.id);
        self.reports.push(report);
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.reports.iter().map(|r| r.id.as_str())
    }

    /// Load one report document.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ReportLoadError> {
        let text = fs::read_to_string(path).map_err(|source| ReportLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let report = MemoryReport::from_json(&text).map_err(|source| ReportLoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(report_id = %report.id, path = %path.display(), "Report loaded");
        self.insert(report);
        Ok(())
    }

    /// Load every `*.json` file in `dir`, oldest first so the newest file
    /// becomes `latest`.
    pub fn load_dir(dir: &Path) -> Result<Self, ReportLoadError> {
        let io_err = |source| ReportLoadError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((modified, path));
        }
        entries.sort();

        let mut store = Self::new();
        for (_, path) in entries {
            store.load_file(&path)?;
        }
        tracing::info!(directory = %dir.display(), reports = store.len(), "Report store loaded");
        Ok(store)
    }
}

impl ReportStore for MemoryReportStore {
    fn resolve(&self, handle: &ReportHandle) -> Option<&dyn BuildReport> {
        let report = match handle {
            ReportHandle::Latest => self.reports.last(),
            ReportHandle::Id(id) => self.reports.iter().find(|r| &r.id == id),
        };
        report.map(|r| r as &dyn BuildReport)
    }
}
