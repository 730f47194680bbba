//! Dictionary data domain model.
//!
//! # Responsibility
//! - Define the persisted dictionary entry and its write payload.
//! - Define the paging envelope returned by list use-cases.
//!
//! # Invariants
//! - Every persisted entry is identified by a storage-assigned `DictDataId`.
//! - `dict_value` is unique within one `dict_type_id`.

pub mod dict_data;
pub mod page;
