//! Report store interface.
//!
//! The service never owns report data. It asks a [`ReportStore`] to resolve a
//! handle and a [`BuildReport`] to produce JSON values, and it does so only on
//! the owner thread, so implementations need not be `Send` or `Sync`.
//!
//! [`memory`] provides an implementation backed by JSON documents.

pub mod memory;
pub mod tree;

use serde_json::Value;

use crate::routing::ReportHandle;

pub use memory::{JsonAppendix, MemoryReport, MemoryReportStore, ReportLoadError};
pub use tree::TreeNode;

/// Resolves report handles to reports.
pub trait ReportStore {
    /// Look up a report; `Latest` resolves to the most recent one.
    fn resolve(&self, handle: &ReportHandle) -> Option<&dyn BuildReport>;
}

/// One completed build report.
pub trait BuildReport {
    /// The complete report.
    fn report(&self) -> Value;

    /// Summary fields only.
    fn summary(&self) -> Value;

    /// Build steps in execution order.
    fn steps(&self) -> Value;

    /// Packed-asset breakdown at `path`, expanded `depth` levels below it.
    /// `None` when `path` does not exist.
    fn assets(&self, path: &[&str], depth: u32) -> Option<Value>;

    /// Build output files at `path`, expanded `depth` levels below it.
    fn files(&self, path: &[&str], depth: u32) -> Option<Value>;

    /// Appendices of one type, in list order.
    fn appendices(&self, kind: &str) -> Vec<&dyn Appendix>;
}

/// A typed auxiliary object attached to a report.
pub trait Appendix {
    fn to_json(&self) -> Value;

    /// Run `method` with the raw request body as input. `None` when the
    /// method is unknown or produces nothing.
    fn invoke(&self, method: &str, input: Option<&str>) -> Option<Value>;
}
