//! Parsed route types.

use std::fmt;

/// Which report a request addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReportHandle {
    /// The most recent report in the store.
    Latest,
    /// An explicit report identifier.
    Id(String),
}

impl ReportHandle {
    /// Interpret a path segment: the literal `latest` or an identifier.
    pub fn from_segment(segment: &str) -> Self {
        if segment == "latest" {
            Self::Latest
        } else {
            Self::Id(segment.to_string())
        }
    }
}

impl fmt::Display for ReportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Id(id) => f.write_str(id),
        }
    }
}

/// The `<request>` segment of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Report,
    Summary,
    Steps,
    Assets,
    Files,
    Appendices,
}

impl RequestKind {
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "report" => Some(Self::Report),
            "summary" => Some(Self::Summary),
            "steps" => Some(Self::Steps),
            "assets" => Some(Self::Assets),
            "files" => Some(Self::Files),
            "appendices" => Some(Self::Appendices),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Summary => "summary",
            Self::Steps => "steps",
            Self::Assets => "assets",
            Self::Files => "files",
            Self::Appendices => "appendices",
        }
    }

    /// Whether the `depth` query parameter applies.
    pub fn is_depth_bounded(&self) -> bool {
        matches!(self, Self::Assets | Self::Files)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-route of an `appendices` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendixArgs {
    /// `/<type>`: every appendix of the type.
    List { kind: String },
    /// `/<type>/<index>`: one appendix instance.
    Instance { kind: String, index: usize },
    /// `/<type>/<index>/<method>`: invoke a method on one instance.
    Invoke {
        kind: String,
        index: usize,
        method: String,
    },
}

impl AppendixArgs {
    pub fn kind(&self) -> &str {
        match self {
            Self::List { kind } | Self::Instance { kind, .. } | Self::Invoke { kind, .. } => kind,
        }
    }
}

/// A fully parsed request path. Immutable once built by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub report: ReportHandle,
    pub kind: RequestKind,
    /// Everything after `<request>`, including the leading `/`; empty if absent.
    pub args: String,
    /// Traversal bound for `assets`/`files`; always 0 for other kinds.
    pub depth: u32,
}

impl Route {
    /// Segments of `args` for tree navigation (`assets`/`files`).
    pub fn arg_segments(&self) -> Vec<&str> {
        self.args.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// Why a path did not produce a route. Every miss renders as `{}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMiss {
    /// The path does not start with `/unity/build-report/`.
    Prefix,
    /// No `<reportId>` segment.
    MissingReportId,
    /// No `<request>` segment.
    MissingRequest,
    /// `<request>` is outside the known set.
    UnknownRequest(String),
    /// `appendices` args do not fit any of the three shapes.
    AppendixArgs(String),
}

impl fmt::Display for RouteMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => f.write_str("path outside /unity/build-report/"),
            Self::MissingReportId => f.write_str("missing report id"),
            Self::MissingRequest => f.write_str("missing request"),
            Self::UnknownRequest(r) => write!(f, "unknown request '{r}'"),
            Self::AppendixArgs(a) => write!(f, "invalid appendix args '{a}'"),
        }
    }
}
