//! Request path parsing.
//!
//! # Responsibilities
//! - Split `/unity/build-report/<reportId>/<request>[/<args>]`
//! - Parse `appendices` args into one of three shapes
//! - Read the `depth` query parameter for tree requests
//!
//! # Design Decisions
//! - Two stages, no regex: top-level segments first, then appendix args
//! - Every failure is an explicit `RouteMiss`, never a fallthrough
//! - Segments are taken verbatim (no percent-decoding)

use crate::routing::route::{AppendixArgs, ReportHandle, RequestKind, Route, RouteMiss};

/// Path prefix shared by every route.
pub const ROUTE_PREFIX: &str = "/unity/build-report/";

/// Parse a request path and optional query string into a route.
pub fn parse_route(path: &str, query: Option<&str>) -> Result<Route, RouteMiss> {
    let rest = path.strip_prefix(ROUTE_PREFIX).ok_or(RouteMiss::Prefix)?;

    let (report_id, rest) = split_segment(rest);
    if report_id.is_empty() {
        return Err(RouteMiss::MissingReportId);
    }

    let (request, args) = split_segment(rest.unwrap_or_default());
    if request.is_empty() {
        return Err(RouteMiss::MissingRequest);
    }
    let kind =
        RequestKind::parse(request).ok_or_else(|| RouteMiss::UnknownRequest(request.to_string()))?;

    let args = args.map(|a| format!("/{a}")).unwrap_or_default();
    if kind == RequestKind::Appendices {
        parse_appendix_args(&args)?;
    }

    let depth = if kind.is_depth_bounded() {
        query.map(parse_depth).unwrap_or(0)
    } else {
        0
    };

    Ok(Route {
        report: ReportHandle::from_segment(report_id),
        kind,
        args,
        depth,
    })
}

/// Parse `/<type>[/<index>[/<method>]]`.
pub fn parse_appendix_args(args: &str) -> Result<AppendixArgs, RouteMiss> {
    let miss = || RouteMiss::AppendixArgs(args.to_string());

    let body = args.strip_prefix('/').ok_or_else(miss)?;
    let segments: Vec<&str> = body.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(miss());
    }

    match segments.as_slice() {
        [kind] => Ok(AppendixArgs::List {
            kind: kind.to_string(),
        }),
        [kind, index] => Ok(AppendixArgs::Instance {
            kind: kind.to_string(),
            index: parse_index(index).ok_or_else(miss)?,
        }),
        [kind, index, method] => Ok(AppendixArgs::Invoke {
            kind: kind.to_string(),
            index: parse_index(index).ok_or_else(miss)?,
            method: method.to_string(),
        }),
        _ => Err(miss()),
    }
}

/// Read `depth` from a query string; anything unusable means 0.
pub fn parse_depth(query: &str) -> u32 {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "depth")
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

fn split_segment(input: &str) -> (&str, Option<&str>) {
    match input.split_once('/') {
        Some((head, tail)) => (head, Some(tail)),
        None => (input, None),
    }
}

fn parse_index(segment: &str) -> Option<usize> {
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}
