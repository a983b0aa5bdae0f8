//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → ServiceConfig handed to ReportServer, the rest to the binary
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - The listening port and Host allow-list are fixed, never read from files

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BindConfig, DispatchConfig, LimitsConfig, ObservabilityConfig, OwnerConfig, ReportsConfig,
    ServerConfig, ServiceConfig, DEFAULT_PORT,
};
pub use validation::ValidationError;
