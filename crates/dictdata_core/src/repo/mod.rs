//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for dictionary entries.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must validate payloads before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateValue`)
//!   in addition to DB transport errors.

pub mod dict_data_repo;
