use std::cmp::Ordering;
use tabledb::*;
use uuid::Uuid;

fn users_schema() -> Schema {
    Schema::new(
        "users",
        vec![
            ColumnSchema::new("name", ColumnType::Text),
            ColumnSchema::new("age", ColumnType::Int),
        ],
    )
}

#[test]
fn convert_type_keywords() {
    assert_eq!(convert_type("int"), Some(ColumnType::Int));
    assert_eq!(convert_type("text"), Some(ColumnType::Text));
    assert_eq!(convert_type("float"), Some(ColumnType::Float));
    // keywords are case-sensitive
    assert_eq!(convert_type("INT"), None);
    assert_eq!(convert_type("Text"), None);
    assert_eq!(convert_type("string"), None);
    assert_eq!(convert_type(""), None);
}

#[test]
fn parse_create_table_keeps_column_order() {
    let schema = parse_create_table("users [name text] [age int] [score float]").unwrap();
    assert_eq!(schema.name, "users");
    let cols: Vec<_> = schema
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.col_type))
        .collect();
    assert_eq!(
        cols,
        vec![
            ("name", ColumnType::Text),
            ("age", ColumnType::Int),
            ("score", ColumnType::Float),
        ]
    );
}

#[test]
fn parse_create_table_ignores_empty_brackets_and_spacing() {
    let schema = parse_create_table("users   [] [ name   text ]  [  ]\t[age int][]").unwrap();
    assert_eq!(schema, users_schema());
}

#[test]
fn parse_create_table_allows_duplicate_column_names() {
    let schema = parse_create_table("t [a int] [a text]").unwrap();
    assert_eq!(schema.columns.len(), 2);
    assert_eq!(schema.column_index("a"), Some(0));
}

#[test]
fn parse_create_table_column_limit() {
    let mut body = String::from("wide");
    for i in 0..MAX_COLUMNS {
        body.push_str(&format!(" [c{} int]", i));
    }
    assert_eq!(parse_create_table(&body).unwrap().columns.len(), MAX_COLUMNS);

    body.push_str(" [one_more int]");
    assert_eq!(parse_create_table(&body), Err(ParseError::TooManyColumns));
}

#[test]
fn parse_name_length_bounds() {
    let ok_name = "t".repeat(MAX_TABLE_NAME_LENGTH - 1);
    assert!(parse_create_table(&format!("{} [a int]", ok_name)).is_ok());

    let long_name = "t".repeat(MAX_TABLE_NAME_LENGTH);
    assert_eq!(
        parse_create_table(&format!("{} [a int]", long_name)),
        Err(ParseError::TableNameTooLong)
    );

    let long_col = "c".repeat(MAX_COLUMN_NAME_LENGTH);
    assert_eq!(
        parse_create_table(&format!("t [{} int]", long_col)),
        Err(ParseError::ColumnNameTooLong(long_col.clone()))
    );
}

#[test]
fn parse_add_record_keeps_rest_of_line() {
    let args = parse_add_record("users   Alice  Smith 30\nignored").unwrap();
    assert_eq!(args.table, "users");
    assert_eq!(args.values, "Alice  Smith 30");

    assert_eq!(parse_add_record("users"), Err(ParseError::AddRecordFormat));
    assert_eq!(parse_add_record("users   "), Err(ParseError::AddRecordFormat));
    assert_eq!(parse_add_record(""), Err(ParseError::AddRecordFormat));
}

#[test]
fn parse_add_record_skips_newline_after_table() {
    let args = parse_add_record("users\nAlice 30").unwrap();
    assert_eq!(args.table, "users");
    assert_eq!(args.values, "Alice 30");

    let args = parse_add_record("users \r\n  Bob 25\nCarl 1").unwrap();
    assert_eq!(args.values, "Bob 25");

    assert_eq!(parse_add_record("users\n"), Err(ParseError::AddRecordFormat));
}

#[test]
fn parse_delete_record_requires_table_and_integer() {
    assert_eq!(
        parse_delete_record("users 3").unwrap(),
        DeleteRecord {
            table: "users",
            index: 3
        }
    );
    // non-positive indices parse; the store rejects them
    assert_eq!(parse_delete_record("users -1").unwrap().index, -1);
    assert_eq!(parse_delete_record("users 0").unwrap().index, 0);

    for bad in ["users", "users x", "users 1 2", "", "users 1.5"] {
        assert_eq!(
            parse_delete_record(bad),
            Err(ParseError::DeleteRecordFormat),
            "{bad:?}"
        );
    }
}

#[test]
fn parse_list_records_one_or_two_tokens() {
    assert_eq!(
        parse_list_records("users").unwrap(),
        ListRecords {
            table: "users",
            filter: None
        }
    );
    assert_eq!(
        parse_list_records("  users  Ali ").unwrap(),
        ListRecords {
            table: "users",
            filter: Some("Ali")
        }
    );
    assert_eq!(parse_list_records(" "), Err(ParseError::ListRecordsFormat));
    assert_eq!(parse_list_records("users a b"), Err(ParseError::FilterFormat));
}

#[test]
fn parse_sort_table_two_tokens() {
    assert_eq!(
        parse_sort_table("users age").unwrap(),
        SortTable {
            table: "users",
            column: "age"
        }
    );
    assert_eq!(parse_sort_table("users"), Err(ParseError::SortTableFormat));
    assert_eq!(
        parse_sort_table("users age name"),
        Err(ParseError::SortTableFormat)
    );
}

#[test]
fn row_fields_and_rendering() {
    let schema = users_schema();
    let row = Row::new("Alice   30");
    assert_eq!(row.render(), "Alice   30");
    assert_eq!(row.get_values(), vec!["Alice", "30"]);
    assert_eq!(row.get_by_name("age", &schema), Some("30"));
    assert_eq!(row.get_by_name("email", &schema), None);
    assert!(row.contains("ice "));
    assert!(!row.contains("alice"));
}

#[test]
fn delete_row_shifts_later_rows() {
    let n = 5;
    for k in 1..=n {
        let mut table = Table::new(1, users_schema());
        for i in 1..=n {
            table.add_row(&format!("user{} {}", i, i), false).unwrap();
        }
        table.delete_row(k).unwrap();

        let rows = table.select_rows(None);
        assert_eq!(rows.len(), n as usize - 1);
        for (pos, row) in rows.iter().enumerate() {
            let position = pos as i64 + 1;
            let original = if position < k { position } else { position + 1 };
            assert_eq!(row, &format!("user{} {}", original, original));
        }
    }
}

#[test]
fn delete_row_out_of_range() {
    let mut table = Table::new(1, users_schema());
    table.add_row("Alice 30", false).unwrap();
    for index in [0, -3, 2] {
        assert!(matches!(
            table.delete_row(index),
            Err(StoreError::RowOutOfRange { .. })
        ));
    }
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn sort_is_numeric_for_int_columns_and_stable() {
    let mut table = Table::new(1, users_schema());
    for raw in ["Carl 100", "Alice 30", "Bob 9", "Dora 30", "Eve 30"] {
        table.add_row(raw, false).unwrap();
    }
    let sorted = table.sort_by_column("age").unwrap();
    assert_eq!(
        sorted,
        vec!["Bob 9", "Alice 30", "Dora 30", "Eve 30", "Carl 100"]
    );

    // sorting again changes nothing
    let before = table.clone();
    assert_eq!(table.sort_by_column("age").unwrap(), sorted);
    assert_eq!(table, before);
}

#[test]
fn sort_is_lexicographic_for_text_columns() {
    let mut table = Table::new(1, users_schema());
    for raw in ["bob 1", "Alice 2", "alice 3", "Bob 4"] {
        table.add_row(raw, false).unwrap();
    }
    assert_eq!(
        table.sort_by_column("name").unwrap(),
        vec!["Alice 2", "Bob 4", "alice 3", "bob 1"]
    );
}

#[test]
fn sort_places_unparsable_numbers_last() {
    let mut table = Table::new(1, users_schema());
    for raw in ["A x", "B 5", "C", "D -2"] {
        table.add_row(raw, false).unwrap();
    }
    assert_eq!(
        table.sort_by_column("age").unwrap(),
        vec!["D -2", "B 5", "C", "A x"]
    );
}

#[test]
fn sort_unknown_column_leaves_rows() {
    let mut table = Table::new(1, users_schema());
    table.add_row("b 2", false).unwrap();
    table.add_row("a 1", false).unwrap();
    let before = table.clone();
    assert!(matches!(
        table.sort_by_column("email"),
        Err(StoreError::ColumnNotFound(_))
    ));
    assert_eq!(table, before);
}

#[test]
fn sort_keys_by_column_type() {
    let key = SortKey::new;
    assert_eq!(
        key(ColumnType::Int, Some("10")).cmp_key(&key(ColumnType::Int, Some("9"))),
        Ordering::Greater
    );
    assert_eq!(
        key(ColumnType::Text, Some("10")).cmp_key(&key(ColumnType::Text, Some("9"))),
        Ordering::Less
    );
    assert_eq!(
        key(ColumnType::Float, Some("2.5")).cmp_key(&key(ColumnType::Float, Some("10"))),
        Ordering::Less
    );
    assert_eq!(
        key(ColumnType::Int, None).cmp_key(&key(ColumnType::Int, Some("1"))),
        Ordering::Greater
    );
    assert_eq!(key(ColumnType::Float, Some("1e2")), SortKey::Float(100.0));
    assert_eq!(key(ColumnType::Int, Some("x")), SortKey::Raw("x".to_string()));
}

#[test]
fn sort_float_column_with_exponents_and_short_rows() {
    let schema = parse_create_table("vals [v float] [tag text]").unwrap();
    let mut table = Table::new(1, schema);
    for raw in ["1e2 a", "-0.5 b", "x c", "3 d", "", "2.5"] {
        table.add_row(raw, false).unwrap();
    }
    assert_eq!(
        table.sort_by_column("v").unwrap(),
        vec!["-0.5 b", "2.5", "3 d", "1e2 a", "", "x c"]
    );
    // a missing text field compares as the empty string
    assert_eq!(
        table.sort_by_column("tag").unwrap(),
        vec!["2.5", "", "1e2 a", "-0.5 b", "x c", "3 d"]
    );
}

#[test]
fn filter_returns_exact_containing_rows() {
    let mut table = Table::new(1, users_schema());
    let raws = ["Alice 30", "Bob 25", "Malice 41", "alice 2"];
    for raw in raws {
        table.add_row(raw, false).unwrap();
    }
    for filter in ["lice", "Bob", "4", "zzz", " "] {
        let expected: Vec<String> = raws
            .iter()
            .filter(|r| r.contains(filter))
            .map(|r| r.to_string())
            .collect();
        assert_eq!(table.select_rows(Some(filter)), expected, "{filter:?}");
    }
}

#[test]
fn user_registry_sign_up_and_verify() {
    let mut users = UserRegistry::default();
    assert!(users.is_empty());
    let alice = users.sign_up("alice", "secret").unwrap();
    let bob = users.sign_up("bob", "hunter2").unwrap();
    assert_eq!((alice, bob), (1, 2));
    assert_eq!(
        users.sign_up("alice", "other"),
        Err(SessionError::UserAlreadyExists("alice".to_string()))
    );
    assert_eq!(users.sign_up("", "pw"), Err(SessionError::EmptyCredentials));
    assert_eq!(users.sign_up("carol", ""), Err(SessionError::EmptyCredentials));
    assert_eq!(users.len(), 2);

    assert_eq!(users.verify("alice", "secret"), Ok(alice));
    assert_eq!(
        users.verify("alice", "wrong"),
        Err(SessionError::AuthenticationFailed)
    );
    assert_eq!(
        users.verify("nobody", "secret"),
        Err(SessionError::AuthenticationFailed)
    );
}

#[test]
fn reserved_user_ids_are_skipped() {
    let mut users = UserRegistry::default();
    users.reserve_through(5);
    assert_eq!(users.sign_up("alice", "pw").unwrap(), 6);
    // reserving below the counter never rewinds it
    users.reserve_through(2);
    assert_eq!(users.sign_up("bob", "pw").unwrap(), 7);
}

#[test]
fn session_lifecycle() {
    let mut sessions = SessionManager::new(std::time::Duration::from_secs(60));
    let session = sessions.open_at(1, 1_000);
    assert_eq!(session.user_id, 1);
    assert_eq!(session.expiration_time, 1_060);
    assert_eq!(sessions.resolve_at(session.session_id, 1_059), Some(session));
    assert_eq!(sessions.resolve_at(session.session_id, 1_060), None);

    assert_eq!(sessions.sweep_expired(1_060), 1);
    assert_eq!(sessions.resolve_at(session.session_id, 1_000), None);
    assert_eq!(
        sessions.sign_out(session.session_id),
        Err(SessionError::SessionNotFound(session.session_id))
    );
}

#[test]
fn refresh_renews_only_expired_sessions() {
    let mut sessions = SessionManager::new(std::time::Duration::from_secs(60));
    let session = sessions.open_at(4, 1_000);
    assert_eq!(sessions.refresh_at(session, 1_059), session);

    let renewed = sessions.refresh_at(session, 1_060);
    assert_ne!(renewed.session_id, session.session_id);
    assert_eq!(renewed.user_id, 4);
    assert_eq!(renewed.expiration_time, 1_120);
    assert_eq!(sessions.resolve_at(session.session_id, 1_000), None);
    assert_eq!(sessions.resolve_at(renewed.session_id, 1_100), Some(renewed));
}

#[test]
fn session_ids_are_not_guessable() {
    let mut sessions = SessionManager::default();
    let first = sessions.open(1);
    let second = sessions.open(1);
    assert_ne!(first.session_id, second.session_id);
    assert!(sessions.resolve(first.session_id).is_some());

    // ids that were never issued resolve to nothing
    assert_eq!(sessions.resolve(Uuid::nil()), None);
    assert_eq!(sessions.resolve(Uuid::new_v4()), None);

    assert_eq!(sessions.sign_out(first.session_id), Ok(()));
    assert_eq!(sessions.resolve(first.session_id), None);
    assert_eq!(sessions.resolve(second.session_id).map(|s| s.user_id), Some(1));
}

#[test]
fn password_is_stored_hashed() {
    let hash = User::hash_password("secret");
    assert_eq!(hash.len(), 64);
    assert_ne!(hash, "secret");
}
