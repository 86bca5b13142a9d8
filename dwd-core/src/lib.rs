//! Core library for the `dwd` CLI.
//!
//! This crate defines:
//! - The station catalog, loaded once from the local reference file
//! - A session for the warnwetter `stationOverview` endpoint
//! - Decoding of scaled forecast records into physical units
//! - Configuration and error types
//!
//! It is used by `dwd-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod session;
pub mod station;

pub use config::{Config, EndpointConfig};
pub use error::{DwdError, ErrorKind};
pub use model::{Direction, Forecast, Station};
pub use session::{Session, SessionConfig};
pub use station::StationCatalog;
