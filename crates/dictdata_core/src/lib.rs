//! Core domain logic for administrative dictionary data.
//! This crate is the single source of truth for dictionary entry invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DeleteMissingPolicy, ServiceConfig};
pub use logging::{init_logging, logging_status, LogLevel};
pub use model::dict_data::{DictData, DictDataId, DictDataInput, DictDataValidationError};
pub use model::page::{PageData, PageWindow};
pub use repo::dict_data_repo::{
    DictDataQuery, DictDataRepository, RepoError, RepoResult, SqliteDictDataRepository,
};
pub use service::dict_data_service::{
    DictDataFilter, DictDataService, ServiceError, ServiceResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
