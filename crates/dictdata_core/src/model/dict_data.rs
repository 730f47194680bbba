//! Dictionary entry model and write-payload validation.
//!
//! # Invariants
//! - `id` is assigned by storage on insert and never reused.
//! - Label and value are non-blank and at most `MAX_FIELD_CHARS` characters.
//! - `dict_type_id` is strictly positive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Numeric identifier assigned by storage at creation.
pub type DictDataId = i64;

/// Maximum length in characters for label, value and remark.
pub const MAX_FIELD_CHARS: usize = 255;

/// Persisted dictionary entry as returned by reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictData {
    pub id: DictDataId,
    /// Owning dictionary type.
    pub dict_type_id: i64,
    /// Human-readable label shown in admin UIs.
    pub dict_label: String,
    /// Machine value; unique within `dict_type_id`.
    pub dict_value: String,
    pub remark: Option<String>,
    /// Display order, ascending.
    pub sort: i32,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every update.
    pub updated_at: i64,
}

impl DictData {
    /// Projects the settable fields back into a write payload.
    ///
    /// Useful for read-modify-write update flows.
    pub fn to_input(&self) -> DictDataInput {
        DictDataInput {
            id: Some(self.id),
            dict_type_id: self.dict_type_id,
            dict_label: self.dict_label.clone(),
            dict_value: self.dict_value.clone(),
            remark: self.remark.clone(),
            sort: self.sort,
        }
    }
}

/// Write payload for save/update use-cases.
///
/// `id` must be `None` for inserts and `Some` for full-replace updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictDataInput {
    #[serde(default)]
    pub id: Option<DictDataId>,
    pub dict_type_id: i64,
    pub dict_label: String,
    pub dict_value: String,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub sort: i32,
}

impl DictDataInput {
    /// Creates an insert payload with `sort = 0` and no remark.
    pub fn new(
        dict_type_id: i64,
        dict_label: impl Into<String>,
        dict_value: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            dict_type_id,
            dict_label: dict_label.into(),
            dict_value: dict_value.into(),
            remark: None,
            sort: 0,
        }
    }

    /// Validates field-level invariants shared by insert and update.
    ///
    /// Does not look at `id`; see [`Self::validate_for_insert`] and
    /// [`Self::validate_for_update`].
    pub fn validate(&self) -> Result<(), DictDataValidationError> {
        if self.dict_type_id <= 0 {
            return Err(DictDataValidationError::InvalidTypeId(self.dict_type_id));
        }
        if self.dict_label.trim().is_empty() {
            return Err(DictDataValidationError::EmptyLabel);
        }
        if self.dict_value.trim().is_empty() {
            return Err(DictDataValidationError::EmptyValue);
        }
        check_length("dict_label", &self.dict_label)?;
        check_length("dict_value", &self.dict_value)?;
        if let Some(remark) = self.remark.as_deref() {
            check_length("remark", remark)?;
        }
        Ok(())
    }

    /// Validates an insert payload; storage assigns the id.
    pub fn validate_for_insert(&self) -> Result<(), DictDataValidationError> {
        if let Some(id) = self.id {
            return Err(DictDataValidationError::UnexpectedId(id));
        }
        self.validate()
    }

    /// Validates an update payload and returns the target id.
    pub fn validate_for_update(&self) -> Result<DictDataId, DictDataValidationError> {
        let id = self.id.ok_or(DictDataValidationError::MissingId)?;
        self.validate()?;
        Ok(id)
    }
}

fn check_length(field: &'static str, value: &str) -> Result<(), DictDataValidationError> {
    let chars = value.chars().count();
    if chars > MAX_FIELD_CHARS {
        return Err(DictDataValidationError::FieldTooLong {
            field,
            max_chars: MAX_FIELD_CHARS,
            actual_chars: chars,
        });
    }
    Ok(())
}

/// Rejection reasons for malformed dictionary payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictDataValidationError {
    InvalidTypeId(i64),
    EmptyLabel,
    EmptyValue,
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Update payload without target id.
    MissingId,
    /// Insert payload carrying an id.
    UnexpectedId(DictDataId),
}

impl Display for DictDataValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTypeId(value) => {
                write!(f, "dict_type_id must be positive, got {value}")
            }
            Self::EmptyLabel => write!(f, "dict_label cannot be empty"),
            Self::EmptyValue => write!(f, "dict_value cannot be empty"),
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} exceeds {max_chars} characters (got {actual_chars})"
            ),
            Self::MissingId => write!(f, "update payload requires an id"),
            Self::UnexpectedId(id) => {
                write!(f, "insert payload must not carry an id, got {id}")
            }
        }
    }
}

impl Error for DictDataValidationError {}
