//! Dictionary data use-case service.
//!
//! # Responsibility
//! - Provide page/get/save/update/delete entry points over dictionary data.
//! - Resolve paging defaults and the delete policy from `ServiceConfig`.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - A page never holds more items than its effective page size.
//! - Logged events carry ids and counts only, never labels or values.

use crate::config::{ConfigError, ServiceConfig};
use crate::model::dict_data::{DictData, DictDataId, DictDataInput, DictDataValidationError};
use crate::model::page::{PageData, PageWindow};
use crate::repo::dict_data_repo::{DictDataQuery, DictDataRepository, RepoError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for dictionary data use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target entry does not exist.
    NotFound(DictDataId),
    /// Payload rejected before persistence.
    Validation(DictDataValidationError),
    /// Value already used within the same dictionary type.
    DuplicateValue { dict_type_id: i64, dict_value: String },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back did not return the row.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "dictionary entry not found: {id}"),
            Self::Validation(err) => write!(f, "invalid dictionary entry: {err}"),
            Self::DuplicateValue {
                dict_type_id,
                dict_value,
            } => write!(
                f,
                "dictionary value `{dict_value}` already exists for type {dict_type_id}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent dictionary state: {details}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::DuplicateValue {
                dict_type_id,
                dict_value,
            } => Self::DuplicateValue {
                dict_type_id,
                dict_value,
            },
            other => Self::Repo(other),
        }
    }
}

impl From<DictDataValidationError> for ServiceError {
    fn from(value: DictDataValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Recognized filter and paging keys for [`DictDataService::page`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DictDataFilter {
    /// Exact match on owning dictionary type.
    pub dict_type_id: Option<i64>,
    /// Substring match, case-insensitive for any script; blank means no
    /// filter.
    pub dict_label: Option<String>,
    /// Substring match, case-insensitive for any script; blank means no
    /// filter.
    pub dict_value: Option<String>,
    /// 1-based page number. `None`/`0` selects the first page.
    pub page: Option<u32>,
    /// `None`/`0` uses the configured default; clamped to the configured max.
    pub page_size: Option<u32>,
}

/// Dictionary data service facade over repository implementations.
pub struct DictDataService<R: DictDataRepository> {
    repo: R,
    config: ServiceConfig,
}

impl<R: DictDataRepository> DictDataService<R> {
    /// Creates a service with default configuration.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            config: ServiceConfig::default(),
        }
    }

    /// Creates a service with explicit configuration.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` when the paging bounds are inconsistent.
    pub fn with_config(repo: R, config: ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { repo, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns one page of entries matching `filter`.
    ///
    /// Items are ordered by `sort ASC, id ASC`; `total` counts every match.
    pub fn page(&self, filter: &DictDataFilter) -> ServiceResult<PageData<DictData>> {
        let window = PageWindow::resolve(
            filter.page,
            filter.page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        let query = DictDataQuery {
            dict_type_id: filter.dict_type_id,
            label_contains: filter.dict_label.clone(),
            value_contains: filter.dict_value.clone(),
            limit: Some(window.limit()),
            offset: window.offset(),
        };

        let total = self.repo.count(&query)?;
        let items = self.repo.list(&query)?;
        info!(
            "event=dict_data_page module=service status=ok page={} page_size={} total={} returned={}",
            window.page,
            window.page_size,
            total,
            items.len()
        );
        Ok(PageData::new(window, total, items))
    }

    /// Gets one entry by id.
    ///
    /// # Errors
    /// - `NotFound` when no entry has this id.
    pub fn get(&self, id: DictDataId) -> ServiceResult<DictData> {
        self.repo.get(id)?.ok_or(ServiceError::NotFound(id))
    }

    /// Inserts a new entry and returns it as stored.
    ///
    /// # Errors
    /// - `Validation` for malformed payloads, including one carrying an id.
    /// - `DuplicateValue` when the value exists for the same type.
    pub fn save(&self, input: &DictDataInput) -> ServiceResult<DictData> {
        input.validate_for_insert()?;

        let id = match self.repo.insert(input) {
            Ok(id) => id,
            Err(err) => {
                warn!(
                    "event=dict_data_save module=service status=error dict_type_id={} error={}",
                    input.dict_type_id,
                    error_code(&err)
                );
                return Err(err.into());
            }
        };
        info!(
            "event=dict_data_save module=service status=ok id={} dict_type_id={}",
            id, input.dict_type_id
        );

        self.repo
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "saved entry not found in read-back",
            ))
    }

    /// Replaces every settable field of an existing entry.
    ///
    /// # Errors
    /// - `Validation` when `id` is missing or fields are malformed.
    /// - `NotFound` when the id does not exist.
    /// - `DuplicateValue` when the new value collides within its type.
    pub fn update(&self, input: &DictDataInput) -> ServiceResult<DictData> {
        let id = input.validate_for_update()?;

        if let Err(err) = self.repo.update(input) {
            warn!(
                "event=dict_data_update module=service status=error id={} error={}",
                id,
                error_code(&err)
            );
            return Err(err.into());
        }
        info!("event=dict_data_update module=service status=ok id={id}");

        self.repo
            .get(id)?
            .ok_or(ServiceError::InconsistentState(
                "updated entry not found in read-back",
            ))
    }

    /// Deletes every entry whose id is listed and returns the removed count.
    ///
    /// Missing ids follow `ServiceConfig::delete_missing`: ignored, or the
    /// whole batch is rejected with `NotFound` and nothing is removed.
    pub fn delete(&self, ids: &[DictDataId]) -> ServiceResult<usize> {
        let policy = self.config.delete_missing;
        match self.repo.delete_by_ids(ids, policy) {
            Ok(removed) => {
                info!(
                    "event=dict_data_delete module=service status=ok policy={} requested={} removed={}",
                    policy.as_str(),
                    ids.len(),
                    removed
                );
                Ok(removed)
            }
            Err(err) => {
                warn!(
                    "event=dict_data_delete module=service status=error policy={} requested={} error={}",
                    policy.as_str(),
                    ids.len(),
                    error_code(&err)
                );
                Err(err.into())
            }
        }
    }

    /// Lists every entry of one dictionary type, unpaged.
    pub fn list_by_type(&self, dict_type_id: i64) -> ServiceResult<Vec<DictData>> {
        let query = DictDataQuery {
            dict_type_id: Some(dict_type_id),
            ..DictDataQuery::default()
        };
        Ok(self.repo.list(&query)?)
    }
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation_failed",
        RepoError::Db(_) => "db_error",
        RepoError::NotFound(_) => "not_found",
        RepoError::DuplicateValue { .. } => "duplicate_value",
        RepoError::InvalidData(_) => "invalid_data",
        RepoError::MissingRequiredTable(_) | RepoError::MissingRequiredColumn { .. } => {
            "schema_mismatch"
        }
    }
}
