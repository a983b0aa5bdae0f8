//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, query)
//!     → router.rs (split prefix / reportId / request / args)
//!     → router.rs (appendix args → List | Instance | Invoke)
//!     → Return: Route or RouteMiss
//! ```
//!
//! # Design Decisions
//! - Immutable after parsing: a Route is built once per request
//! - No regex: explicit tokenizing keeps each failure enumerable
//! - Deterministic: same input always yields the same Route or miss

pub mod route;
pub mod router;

pub use route::{AppendixArgs, ReportHandle, RequestKind, Route, RouteMiss};
pub use router::{parse_appendix_args, parse_depth, parse_route, ROUTE_PREFIX};
