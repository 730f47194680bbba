use dictdata_core::db::open_db_in_memory;
use dictdata_core::{
    DeleteMissingPolicy, DictDataInput, DictDataQuery, DictDataRepository,
    DictDataValidationError, RepoError, SqliteDictDataRepository,
};

fn input(dict_type_id: i64, label: &str, value: &str, sort: i32) -> DictDataInput {
    let mut input = DictDataInput::new(dict_type_id, label, value);
    input.sort = sort;
    input
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let mut payload = input(3, "Enabled", "1", 2);
    payload.remark = Some("default state".to_string());
    let id = repo.insert(&payload).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.dict_type_id, 3);
    assert_eq!(loaded.dict_label, "Enabled");
    assert_eq!(loaded.dict_value, "1");
    assert_eq!(loaded.remark.as_deref(), Some("default state"));
    assert_eq!(loaded.sort, 2);
    assert!(loaded.created_at > 0);
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn inserted_ids_are_unique_and_increasing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let first = repo.insert(&input(1, "A", "a", 0)).unwrap();
    let second = repo.insert(&input(1, "B", "b", 0)).unwrap();
    assert!(second > first);
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    assert!(repo.get(42).unwrap().is_none());
}

#[test]
fn update_replaces_all_settable_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let mut payload = input(1, "Draft", "draft", 0);
    payload.remark = Some("old".to_string());
    let id = repo.insert(&payload).unwrap();

    let replacement = DictDataInput {
        id: Some(id),
        dict_type_id: 2,
        dict_label: "Published".to_string(),
        dict_value: "published".to_string(),
        remark: None,
        sort: 9,
    };
    repo.update(&replacement).unwrap();

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded.to_input(), replacement);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let mut payload = input(1, "Ghost", "ghost", 0);
    payload.id = Some(77);
    let err = repo.update(&payload).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(77)));
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let err = repo.insert(&input(1, "", "x", 0)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(DictDataValidationError::EmptyLabel)
    ));

    let id = repo.insert(&input(1, "Valid", "x", 0)).unwrap();
    let mut payload = repo.get(id).unwrap().unwrap().to_input();
    payload.dict_type_id = -1;
    let err = repo.update(&payload).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(DictDataValidationError::InvalidTypeId(-1))
    ));
}

#[test]
fn duplicate_value_within_type_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    repo.insert(&input(1, "Yes", "y", 0)).unwrap();
    let err = repo.insert(&input(1, "Yes again", "y", 1)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::DuplicateValue { dict_type_id: 1, ref dict_value } if dict_value == "y"
    ));

    repo.insert(&input(2, "Yes", "y", 0)).unwrap();

    let other = repo.insert(&input(1, "No", "n", 0)).unwrap();
    let mut payload = repo.get(other).unwrap().unwrap().to_input();
    payload.dict_value = "y".to_string();
    let err = repo.update(&payload).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateValue { .. }));
}

#[test]
fn list_orders_by_sort_then_id_and_applies_paging() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let c = repo.insert(&input(1, "C", "c", 3)).unwrap();
    let a = repo.insert(&input(1, "A", "a", 1)).unwrap();
    let b1 = repo.insert(&input(1, "B1", "b1", 2)).unwrap();
    let b2 = repo.insert(&input(1, "B2", "b2", 2)).unwrap();

    let all = repo.list(&DictDataQuery::default()).unwrap();
    let ids: Vec<_> = all.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![a, b1, b2, c]);

    let second_page = repo
        .list(&DictDataQuery {
            limit: Some(2),
            offset: 2,
            ..DictDataQuery::default()
        })
        .unwrap();
    let ids: Vec<_> = second_page.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![b2, c]);

    let tail = repo
        .list(&DictDataQuery {
            offset: 3,
            ..DictDataQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].id, c);
}

#[test]
fn filters_narrow_list_and_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    repo.insert(&input(1, "Active", "active", 0)).unwrap();
    repo.insert(&input(1, "Inactive", "inactive", 1)).unwrap();
    repo.insert(&input(2, "Active user", "user_active", 0)).unwrap();
    repo.insert(&input(2, "100% done", "done", 1)).unwrap();

    let by_type = DictDataQuery {
        dict_type_id: Some(1),
        ..DictDataQuery::default()
    };
    assert_eq!(repo.count(&by_type).unwrap(), 2);

    let by_label = DictDataQuery {
        label_contains: Some("ACTIVE".to_string()),
        ..DictDataQuery::default()
    };
    assert_eq!(repo.count(&by_label).unwrap(), 3);

    let combined = DictDataQuery {
        dict_type_id: Some(2),
        value_contains: Some("active".to_string()),
        ..DictDataQuery::default()
    };
    let rows = repo.list(&combined).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].dict_value, "user_active");

    let literal_percent = DictDataQuery {
        label_contains: Some("0%".to_string()),
        ..DictDataQuery::default()
    };
    assert_eq!(repo.count(&literal_percent).unwrap(), 1);

    let blank = DictDataQuery {
        label_contains: Some("   ".to_string()),
        ..DictDataQuery::default()
    };
    assert_eq!(repo.count(&blank).unwrap(), 4);
}

#[test]
fn count_ignores_paging_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    for index in 0..5 {
        repo.insert(&input(1, "Item", &format!("v{index}"), index))
            .unwrap();
    }

    let query = DictDataQuery {
        limit: Some(2),
        offset: 4,
        ..DictDataQuery::default()
    };
    assert_eq!(repo.count(&query).unwrap(), 5);
    assert_eq!(repo.list(&query).unwrap().len(), 1);
}

#[test]
fn delete_ignore_policy_skips_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let keep = repo.insert(&input(1, "Keep", "keep", 0)).unwrap();
    let gone = repo.insert(&input(1, "Drop", "drop", 0)).unwrap();

    let removed = repo
        .delete_by_ids(&[gone, 9_999, gone], DeleteMissingPolicy::Ignore)
        .unwrap();
    assert_eq!(removed, 1);
    assert!(repo.get(gone).unwrap().is_none());
    assert!(repo.get(keep).unwrap().is_some());
}

#[test]
fn delete_reject_policy_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let first = repo.insert(&input(1, "First", "first", 0)).unwrap();
    let second = repo.insert(&input(1, "Second", "second", 0)).unwrap();

    let err = repo
        .delete_by_ids(&[first, 9_999], DeleteMissingPolicy::Reject)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(9_999)));
    assert!(repo.get(first).unwrap().is_some());

    let removed = repo
        .delete_by_ids(&[first, second], DeleteMissingPolicy::Reject)
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repo.count(&DictDataQuery::default()).unwrap(), 0);
}

#[test]
fn delete_empty_batch_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    repo.insert(&input(1, "Only", "only", 0)).unwrap();
    assert_eq!(
        repo.delete_by_ids(&[], DeleteMissingPolicy::Reject).unwrap(),
        0
    );
    assert_eq!(repo.count(&DictDataQuery::default()).unwrap(), 1);
}

#[test]
fn invalid_persisted_row_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO sys_dict_data (dict_type_id, dict_label, dict_value) VALUES (1, '  ', 'v');",
        [],
    )
    .unwrap();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let err = repo.list(&DictDataQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn out_of_range_persisted_sort_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO sys_dict_data (dict_type_id, dict_label, dict_value, sort)
         VALUES (1, 'Huge', 'huge', 1099511627776);",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    let repo = SqliteDictDataRepository::try_new(&conn).unwrap();

    let err = repo.get(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("sort")));

    let err = repo.list(&DictDataQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
