//! Persistence core for conference records.
//! Owns the `confs` table layout, the property bag column codec and the
//! raw-to-public projection.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::conf::{ConfId, PublicConf, RawConf};
pub use model::property_bag::{PropertyBag, PropertyError};
pub use repo::conf_repo::{ConfRepository, RepoError, RepoResult, SqliteConfRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
