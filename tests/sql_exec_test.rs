use heapdb::catalog::Catalog;
use heapdb::executor::{self, QueryResult};
use heapdb::sql::parser;
use heapdb::types::error::{DbError, Result};
use heapdb::types::row::{row_of, Row};
use heapdb::types::value::Value;
use tempfile::tempdir;

fn exec(catalog: &mut Catalog, sql: &str) -> Result<QueryResult> {
    let statements = parser::parse(sql)?;
    let mut last = None;
    for statement in &statements {
        last = Some(executor::execute(catalog, statement)?);
    }
    Ok(last.expect("no statement in input"))
}

fn rows(result: &QueryResult) -> &[Row] {
    result.rows.as_deref().unwrap_or(&[])
}

fn text(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::Text(s)) => s.clone(),
        other => panic!("expected text in '{}', got {:?}", column, other),
    }
}

#[test]
fn create_table_then_show() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();

    let result = exec(&mut catalog, "CREATE TABLE foo (x INT, y TEXT)").unwrap();
    assert_eq!(result.message, "created foo");
    assert!(dir.path().join("foo.db").exists());

    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    assert_eq!(rows(&shown).len(), 1);
    assert_eq!(text(&rows(&shown)[0], "table_name"), "foo");

    let columns = exec(&mut catalog, "SHOW COLUMNS FROM foo").unwrap();
    assert_eq!(
        columns.column_names.as_deref(),
        Some(&["table_name".to_string(), "column_name".to_string(), "data_type".to_string()][..])
    );
    let column_rows = rows(&columns);
    assert_eq!(column_rows.len(), 2);
    assert_eq!(text(&column_rows[0], "column_name"), "x");
    assert_eq!(text(&column_rows[0], "data_type"), "INT");
    assert_eq!(text(&column_rows[1], "column_name"), "y");
    assert_eq!(text(&column_rows[1], "data_type"), "TEXT");
}

#[test]
fn create_index_then_show() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT, y TEXT)").unwrap();

    let result = exec(&mut catalog, "CREATE INDEX i1 ON foo USING BTREE (x)").unwrap();
    assert_eq!(result.message, "created index i1");
    assert!(dir.path().join("i1.db").exists());

    let shown = exec(&mut catalog, "SHOW INDEX FROM foo").unwrap();
    let index_rows = rows(&shown);
    assert_eq!(index_rows.len(), 1);
    let row = &index_rows[0];
    assert_eq!(text(row, "table_name"), "foo");
    assert_eq!(text(row, "index_name"), "i1");
    assert_eq!(text(row, "column_name"), "x");
    assert_eq!(text(row, "index_type"), "BTREE");
    assert_eq!(row.get("seq_in_index"), Some(&Value::Int(1)));
    assert_eq!(row.get("is_unique"), Some(&Value::Boolean(true)));
}

#[test]
fn multi_column_index_orders_by_sequence() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT, y TEXT, z BOOLEAN)").unwrap();
    exec(&mut catalog, "CREATE INDEX i2 ON foo USING HASH (y, x)").unwrap();

    let shown = exec(&mut catalog, "SHOW INDEX FROM foo").unwrap();
    let index_rows = rows(&shown);
    assert_eq!(index_rows.len(), 2);
    assert_eq!(text(&index_rows[0], "column_name"), "y");
    assert_eq!(index_rows[0].get("seq_in_index"), Some(&Value::Int(1)));
    assert_eq!(index_rows[0].get("is_unique"), Some(&Value::Boolean(false)));
    assert_eq!(text(&index_rows[1], "column_name"), "x");
    assert_eq!(index_rows[1].get("seq_in_index"), Some(&Value::Int(2)));
}

#[test]
fn get_index_exposes_the_definition_in_key_order() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT, y TEXT)").unwrap();
    exec(&mut catalog, "CREATE INDEX i2 ON foo USING HASH (y, x)").unwrap();

    let index = catalog.get_index("foo", "i2").unwrap();
    assert_eq!(index.table_name(), "foo");
    assert_eq!(index.index_name(), "i2");
    assert_eq!(index.index_type(), "HASH");
    assert!(!index.is_unique());
    assert_eq!(index.columns(), &["y".to_string(), "x".to_string()]);

    assert!(catalog.get_index("foo", "missing").is_err());
}

#[test]
fn create_index_requires_table_and_columns() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT)").unwrap();

    assert!(matches!(
        exec(&mut catalog, "CREATE INDEX i1 ON missing (x)"),
        Err(DbError::TableNotFound { .. })
    ));
    assert!(matches!(
        exec(&mut catalog, "CREATE INDEX i1 ON foo (nope)"),
        Err(DbError::ColumnNotFound { .. })
    ));
}

#[test]
fn drop_table_removes_columns_and_indices() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT, y TEXT)").unwrap();
    exec(&mut catalog, "CREATE INDEX i1 ON foo (x)").unwrap();

    let result = exec(&mut catalog, "DROP TABLE foo").unwrap();
    assert_eq!(result.message, "dropped foo");
    assert!(!dir.path().join("foo.db").exists());
    assert!(!dir.path().join("i1.db").exists());

    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    assert!(rows(&shown).is_empty());
    let columns = exec(&mut catalog, "SHOW COLUMNS FROM foo").unwrap();
    assert!(rows(&columns).is_empty());
    assert!(exec(&mut catalog, "SHOW INDEX FROM foo").is_err());
}

#[test]
fn drop_table_created_in_an_earlier_session() {
    let dir = tempdir().unwrap();
    {
        let mut catalog = Catalog::new(dir.path()).unwrap();
        exec(&mut catalog, "CREATE TABLE foo (x INT, y TEXT)").unwrap();
        exec(&mut catalog, "CREATE INDEX i1 ON foo (x)").unwrap();
    }

    // a fresh catalog has no cached table object for foo
    let mut catalog = Catalog::new(dir.path()).unwrap();
    let result = exec(&mut catalog, "DROP TABLE foo").unwrap();
    assert_eq!(result.message, "dropped foo");
    assert!(!dir.path().join("foo.db").exists());
    assert!(!dir.path().join("i1.db").exists());

    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    assert!(rows(&shown).is_empty());
    let columns = exec(&mut catalog, "SHOW COLUMNS FROM foo").unwrap();
    assert!(rows(&columns).is_empty());
}

#[test]
fn duplicate_create_index_leaves_the_original_intact() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT, y TEXT)").unwrap();
    exec(&mut catalog, "CREATE INDEX i1 ON foo (x)").unwrap();

    assert!(matches!(
        exec(&mut catalog, "CREATE INDEX i1 ON foo (y)"),
        Err(DbError::Relation { .. })
    ));
    assert!(dir.path().join("i1.db").exists());

    let shown = exec(&mut catalog, "SHOW INDEX FROM foo").unwrap();
    let index_rows = rows(&shown);
    assert_eq!(index_rows.len(), 1);
    assert_eq!(text(&index_rows[0], "column_name"), "x");

    exec(&mut catalog, "DROP INDEX i1 ON foo").unwrap();
    assert!(!dir.path().join("i1.db").exists());
}

#[test]
fn drop_then_recreate_is_empty() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT)").unwrap();
    catalog
        .get_table("foo")
        .unwrap()
        .insert(&row_of([("x", Value::Int(1))]))
        .unwrap();

    exec(&mut catalog, "DROP TABLE foo").unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT)").unwrap();
    assert!(catalog.get_table("foo").unwrap().select().unwrap().is_empty());
}

#[test]
fn drop_index_keeps_the_table() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT)").unwrap();
    exec(&mut catalog, "CREATE INDEX i1 ON foo (x)").unwrap();

    let result = exec(&mut catalog, "DROP INDEX i1 ON foo").unwrap();
    assert_eq!(result.message, "dropped index i1");
    assert!(!dir.path().join("i1.db").exists());
    assert!(dir.path().join("foo.db").exists());

    let shown = exec(&mut catalog, "SHOW INDEX FROM foo").unwrap();
    assert!(rows(&shown).is_empty());
}

#[test]
fn schema_tables_cannot_be_dropped() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    for table in ["_tables", "_columns", "_indices"] {
        let err = exec(&mut catalog, &format!("DROP TABLE {}", table));
        assert!(matches!(err, Err(DbError::Relation { .. })));
    }
    assert!(matches!(
        exec(&mut catalog, "DROP TABLE missing"),
        Err(DbError::TableNotFound { .. })
    ));
}

#[test]
fn failed_create_rolls_back_catalog_rows() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();

    // an orphaned file makes the heap file creation fail after the catalog
    // rows went in
    std::fs::File::create(dir.path().join("t.db")).unwrap();
    let err = exec(&mut catalog, "CREATE TABLE t (x INT, y TEXT)");
    assert!(matches!(err, Err(DbError::Relation { .. })));

    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    assert!(rows(&shown).is_empty());
    let columns = exec(&mut catalog, "SHOW COLUMNS FROM t").unwrap();
    assert!(rows(&columns).is_empty());
}

#[test]
fn create_if_not_exists_tolerates_an_existing_table() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE t (x INT)").unwrap();

    let result = exec(&mut catalog, "CREATE TABLE IF NOT EXISTS t (x INT)").unwrap();
    assert_eq!(result.message, "t already exists");

    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    assert_eq!(rows(&shown).len(), 1);
}

#[test]
fn duplicate_create_fails_and_leaves_one_table() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE t (x INT)").unwrap();

    assert!(exec(&mut catalog, "CREATE TABLE t (x INT)").is_err());
    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    assert_eq!(rows(&shown).len(), 1);
}

#[test]
fn catalog_describes_itself() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();

    let columns = exec(&mut catalog, "SHOW COLUMNS FROM _tables").unwrap();
    let column_rows = rows(&columns);
    assert_eq!(column_rows.len(), 1);
    assert_eq!(text(&column_rows[0], "column_name"), "table_name");

    let columns = exec(&mut catalog, "SHOW COLUMNS FROM _indices").unwrap();
    assert_eq!(rows(&columns).len(), 6);
}

#[test]
fn catalog_persists_across_reopen() {
    let dir = tempdir().unwrap();
    {
        let mut catalog = Catalog::new(dir.path()).unwrap();
        exec(&mut catalog, "CREATE TABLE bar (x INT, y TEXT)").unwrap();
        catalog
            .get_table("bar")
            .unwrap()
            .insert(&row_of([("x", Value::Int(1)), ("y", Value::from("one"))]))
            .unwrap();
    }

    let mut catalog = Catalog::new(dir.path()).unwrap();
    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    assert_eq!(rows(&shown).len(), 1);
    assert_eq!(text(&rows(&shown)[0], "table_name"), "bar");

    let table = catalog.get_table("bar").unwrap();
    let handles = table.select().unwrap();
    assert_eq!(handles.len(), 1);
    let row = table.project(handles[0]).unwrap();
    assert_eq!(row.get("y"), Some(&Value::Text("one".to_string())));
}

#[test]
fn several_statements_on_one_line() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(
        &mut catalog,
        "CREATE TABLE a (x INT); CREATE TABLE b (y TEXT);",
    )
    .unwrap();

    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    let mut names: Vec<String> = rows(&shown).iter().map(|r| text(r, "table_name")).collect();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn result_display_prints_rows_and_message() {
    let dir = tempdir().unwrap();
    let mut catalog = Catalog::new(dir.path()).unwrap();
    exec(&mut catalog, "CREATE TABLE foo (x INT)").unwrap();

    let shown = exec(&mut catalog, "SHOW TABLES").unwrap();
    let printed = format!("{}", shown);
    assert!(printed.contains("table_name"));
    assert!(printed.contains("\"foo\""));
    assert!(printed.contains("successfully returned 1 rows"));
}
