//! Dictionary data repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered listing over `sys_dict_data`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate the payload before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - List order is always `sort ASC, id ASC`.
//! - Batch delete is atomic: the whole batch commits or nothing does.

use crate::config::DeleteMissingPolicy;
use crate::db::DbError;
use crate::model::dict_data::{DictData, DictDataId, DictDataInput, DictDataValidationError};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DICT_DATA_TABLE: &str = "sys_dict_data";
const DICT_DATA_COLUMNS: &[&str] = &[
    "id",
    "dict_type_id",
    "dict_label",
    "dict_value",
    "remark",
    "sort",
    "created_at",
    "updated_at",
];

const FOLD_FUNCTION_NAME: &str = "dict_fold";

const DICT_DATA_SELECT_SQL: &str = "SELECT
    id,
    dict_type_id,
    dict_label,
    dict_value,
    remark,
    sort,
    created_at,
    updated_at
FROM sys_dict_data";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for dictionary persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(DictDataValidationError),
    Db(DbError),
    NotFound(DictDataId),
    /// `dict_value` already exists for the given type.
    DuplicateValue {
        dict_type_id: i64,
        dict_value: String,
    },
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "dictionary entry not found: {id}"),
            Self::DuplicateValue {
                dict_type_id,
                dict_value,
            } => write!(
                f,
                "dictionary value `{dict_value}` already exists for type {dict_type_id}"
            ),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted dictionary data: {message}")
            }
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DictDataValidationError> for RepoError {
    fn from(value: DictDataValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage-level list query. Paging is already resolved by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictDataQuery {
    /// Exact match on owning type.
    pub dict_type_id: Option<i64>,
    /// Substring match on `dict_label`, case-folded with Unicode rules.
    pub label_contains: Option<String>,
    /// Substring match on `dict_value`, case-folded with Unicode rules.
    pub value_contains: Option<String>,
    /// `None` returns all matching rows.
    pub limit: Option<u32>,
    pub offset: u64,
}

/// Repository interface for dictionary entry CRUD operations.
pub trait DictDataRepository {
    /// Inserts a new entry and returns the storage-assigned id.
    fn insert(&self, input: &DictDataInput) -> RepoResult<DictDataId>;
    /// Replaces all settable fields of the entry identified by `input.id`.
    fn update(&self, input: &DictDataInput) -> RepoResult<()>;
    fn get(&self, id: DictDataId) -> RepoResult<Option<DictData>>;
    /// Counts rows matching the query filters; paging fields are ignored.
    fn count(&self, query: &DictDataQuery) -> RepoResult<u64>;
    fn list(&self, query: &DictDataQuery) -> RepoResult<Vec<DictData>>;
    /// Deletes the given ids and returns the number of removed rows.
    fn delete_by_ids(
        &self,
        ids: &[DictDataId],
        policy: DeleteMissingPolicy,
    ) -> RepoResult<usize>;
}

/// SQLite-backed dictionary data repository.
pub struct SqliteDictDataRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDictDataRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Registers the `dict_fold` SQL function on `conn`. Fails when the
    /// dictionary table or one of its columns is missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        register_fold_function(conn)?;
        Ok(Self { conn })
    }
}

impl DictDataRepository for SqliteDictDataRepository<'_> {
    fn insert(&self, input: &DictDataInput) -> RepoResult<DictDataId> {
        input.validate_for_insert()?;

        self.conn
            .execute(
                "INSERT INTO sys_dict_data (
                    dict_type_id,
                    dict_label,
                    dict_value,
                    remark,
                    sort
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    input.dict_type_id,
                    input.dict_label.as_str(),
                    input.dict_value.as_str(),
                    input.remark.as_deref(),
                    input.sort,
                ],
            )
            .map_err(|err| map_write_error(err, input))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, input: &DictDataInput) -> RepoResult<()> {
        let id = input.validate_for_update()?;

        let changed = self
            .conn
            .execute(
                "UPDATE sys_dict_data
                 SET
                    dict_type_id = ?1,
                    dict_label = ?2,
                    dict_value = ?3,
                    remark = ?4,
                    sort = ?5,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?6;",
                params![
                    input.dict_type_id,
                    input.dict_label.as_str(),
                    input.dict_value.as_str(),
                    input.remark.as_deref(),
                    input.sort,
                    id,
                ],
            )
            .map_err(|err| map_write_error(err, input))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get(&self, id: DictDataId) -> RepoResult<Option<DictData>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DICT_DATA_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_dict_data_row(row)?));
        }

        Ok(None)
    }

    fn count(&self, query: &DictDataQuery) -> RepoResult<u64> {
        let (where_sql, bind_values) = build_filter(query);
        let sql = format!("SELECT COUNT(*) FROM sys_dict_data{where_sql};");
        let total: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{total}`")))
    }

    fn list(&self, query: &DictDataQuery) -> RepoResult<Vec<DictData>> {
        let (where_sql, mut bind_values) = build_filter(query);
        let mut sql = format!("{DICT_DATA_SELECT_SQL}{where_sql}");
        sql.push_str(" ORDER BY sort ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(offset_to_sql(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(offset_to_sql(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_dict_data_row(row)?);
        }

        Ok(entries)
    }

    fn delete_by_ids(
        &self,
        ids: &[DictDataId],
        policy: DeleteMissingPolicy,
    ) -> RepoResult<usize> {
        let unique: BTreeSet<DictDataId> = ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(0);
        }

        // The repository only borrows the connection, so the transaction is
        // opened through the shared reference.
        let tx = self.conn.unchecked_transaction()?;

        if policy == DeleteMissingPolicy::Reject {
            for id in &unique {
                let exists: i64 = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sys_dict_data WHERE id = ?1);",
                    [id],
                    |row| row.get(0),
                )?;
                if exists == 0 {
                    return Err(RepoError::NotFound(*id));
                }
            }
        }

        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM sys_dict_data WHERE id = ?1;")?;
            for id in &unique {
                removed += stmt.execute([id])?;
            }
        }

        tx.commit()?;
        Ok(removed)
    }
}

fn build_filter(query: &DictDataQuery) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(dict_type_id) = query.dict_type_id {
        sql.push_str(" AND dict_type_id = ?");
        bind_values.push(Value::Integer(dict_type_id));
    }

    if let Some(label) = non_blank(query.label_contains.as_deref()) {
        sql.push_str(" AND dict_fold(dict_label) LIKE ? ESCAPE '\\'");
        bind_values.push(Value::Text(like_pattern(&fold_case(label))));
    }

    if let Some(value) = non_blank(query.value_contains.as_deref()) {
        sql.push_str(" AND dict_fold(dict_value) LIKE ? ESCAPE '\\'");
        bind_values.push(Value::Text(like_pattern(&fold_case(value))));
    }

    (sql, bind_values)
}

/// SQLite `LIKE` and `lower()` only fold ASCII; both sides of a text filter
/// go through this instead.
fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

fn register_fold_function(conn: &Connection) -> RepoResult<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION_NAME,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| fold_case(&text)))
        },
    )?;
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Wraps `value` in `%...%` with LIKE wildcards escaped.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn offset_to_sql(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

fn map_write_error(err: rusqlite::Error, input: &DictDataInput) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateValue {
                dict_type_id: input.dict_type_id,
                dict_value: input.dict_value.clone(),
            }
        }
        _ => err.into(),
    }
}

fn parse_dict_data_row(row: &Row<'_>) -> RepoResult<DictData> {
    let id: DictDataId = row.get("id")?;
    let raw_sort: i64 = row.get("sort")?;
    let sort = i32::try_from(raw_sort).map_err(|_| {
        RepoError::InvalidData(format!(
            "row {id} in sys_dict_data: sort `{raw_sort}` is out of range"
        ))
    })?;

    let entry = DictData {
        id,
        dict_type_id: row.get("dict_type_id")?,
        dict_label: row.get("dict_label")?,
        dict_value: row.get("dict_value")?,
        remark: row.get("remark")?,
        sort,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };

    entry.to_input().validate().map_err(|err| {
        RepoError::InvalidData(format!("row {} in sys_dict_data: {err}", entry.id))
    })?;
    Ok(entry)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, DICT_DATA_TABLE)? {
        return Err(RepoError::MissingRequiredTable(DICT_DATA_TABLE));
    }

    for &column in DICT_DATA_COLUMNS {
        if !table_has_column(conn, DICT_DATA_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: DICT_DATA_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{fold_case, like_pattern};

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn fold_case_handles_non_ascii_letters() {
        assert_eq!(fold_case("Élevé"), "élevé");
        assert_eq!(fold_case("ÄÖÜ Straße"), "äöü straße");
        assert_eq!(fold_case("启用"), "启用");
    }
}
