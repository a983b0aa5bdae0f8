//! Response formatting.
//!
//! # Responsibilities
//! - Map a resolved route to a JSON payload via the report store
//! - Build HTTP responses for payloads and for the empty `{}` payload
//!
//! # Design Decisions
//! - Every outcome that is not a security drop is `200 OK` with JSON
//! - Anything that resolves to nothing renders as `{}`

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::report::{BuildReport, ReportStore};
use crate::routing::{parse_appendix_args, AppendixArgs, RequestKind, Route};

/// Payload for route misses and unresolved objects.
pub const EMPTY_PAYLOAD: &str = "{}";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Render `route` against `store`. `None` when the report, tree path,
/// appendix or method does not exist.
pub fn render<S: ReportStore + ?Sized>(
    store: &S,
    route: &Route,
    input: Option<&str>,
) -> Option<String> {
    let report = store.resolve(&route.report)?;
    let value = match route.kind {
        RequestKind::Report => report.report(),
        RequestKind::Summary => report.summary(),
        RequestKind::Steps => report.steps(),
        RequestKind::Assets => report.assets(&route.arg_segments(), route.depth)?,
        RequestKind::Files => report.files(&route.arg_segments(), route.depth)?,
        RequestKind::Appendices => {
            let args = parse_appendix_args(&route.args).ok()?;
            render_appendix(report, &args, input)?
        }
    };

    match serde_json::to_string(&value) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report payload");
            None
        }
    }
}

fn render_appendix(
    report: &dyn BuildReport,
    args: &AppendixArgs,
    input: Option<&str>,
) -> Option<Value> {
    let appendices = report.appendices(args.kind());
    match args {
        AppendixArgs::List { .. } => Some(Value::Array(
            appendices.iter().map(|a| a.to_json()).collect(),
        )),
        AppendixArgs::Instance { index, .. } => appendices.get(*index).map(|a| a.to_json()),
        AppendixArgs::Invoke { index, method, .. } => appendices.get(*index)?.invoke(method, input),
    }
}

/// A `200 OK` JSON response.
pub fn json_response(payload: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
        payload,
    )
        .into_response()
}

/// The `{}` response.
pub fn empty_response() -> Response {
    json_response(EMPTY_PAYLOAD.to_string())
}
