use anyhow::Result;
use tabuladb::{frame, Column, ConflictPolicy, DataType, DataValue, QueryError, Session, SessionConfig};

#[path = "../common/mod.rs"]
mod common;

use common::{bird_session, column_values, ints, sales_session, text};

#[test]
fn test_register_and_list_tables() -> Result<()> {
    let mut session = bird_session()?;
    session.register("data", tabuladb::demo::sales_data()?)?;

    assert_eq!(session.tables(), vec!["bird_sightings", "migration_data", "data"]);

    // Lookups ignore case
    let birds = session.table("BIRD_SIGHTINGS")?;
    assert_eq!(birds.columns(), vec!["species", "count"]);
    assert_eq!(birds.num_rows(), 4);
    Ok(())
}

#[test]
fn test_register_conflicts() -> Result<()> {
    let mut session = sales_session()?;
    let replacement = frame! { "category" => vec!["Z"], "value" => vec![1i64] }?;

    assert!(matches!(
        session.register("data", replacement.clone()),
        Err(QueryError::TableAlreadyExists(_))
    ));
    assert!(matches!(
        session.register("DATA", replacement.clone()),
        Err(QueryError::TableAlreadyExists(_))
    ));
    assert!(matches!(
        session.register("", replacement.clone()),
        Err(QueryError::InvalidOperation(_))
    ));

    // The failed registrations left the original in place
    assert_eq!(session.table("data")?.num_rows(), 9);
    Ok(())
}

#[test]
fn test_replace_policy() -> Result<()> {
    let mut session = Session::with_config(SessionConfig::default().with_conflict_policy(ConflictPolicy::Replace));
    assert_eq!(session.config().conflict_policy, ConflictPolicy::Replace);

    session.register("data", tabuladb::demo::sales_data()?)?;
    session.register("data", frame! { "category" => vec!["Z"], "value" => vec![1i64] }?)?;

    let result = session.execute("SELECT category, value FROM data")?;
    assert_eq!(column_values(&result, "category"), text(&["Z"]));

    // Created tables are never replaced by a registration
    session.create_table("notes", vec![Column::nullable("body", DataType::Text)])?;
    assert!(matches!(
        session.register("notes", frame! { "body" => vec!["x"] }?),
        Err(QueryError::TableAlreadyExists(_))
    ));
    Ok(())
}

#[test]
fn test_unregister_returns_frame() -> Result<()> {
    let mut session = bird_session()?;

    let birds = session.unregister("bird_sightings")?;
    assert_eq!(column_values(&birds, "count"), ints(&[42, 17, 9, 31]));
    assert_eq!(session.tables(), vec!["migration_data"]);

    assert!(matches!(
        session.execute("SELECT species FROM bird_sightings"),
        Err(QueryError::TableNotFound(_))
    ));
    assert!(matches!(session.unregister("bird_sightings"), Err(QueryError::TableNotFound(_))));
    // Tables made with SQL are dropped with SQL
    assert!(matches!(session.unregister("migration_data"), Err(QueryError::InvalidOperation(_))));
    Ok(())
}

#[test]
fn test_registered_frame_is_a_snapshot() -> Result<()> {
    let mut session = Session::new();
    let frame = frame! { "n" => vec![1i64, 2, 3] }?;
    session.register("numbers", frame.clone())?;

    // Registered tables are read-only to SQL
    assert!(matches!(
        session.execute("INSERT INTO numbers VALUES (4)"),
        Err(QueryError::InvalidOperation(_))
    ));
    assert!(matches!(
        session.execute("DROP TABLE numbers"),
        Err(QueryError::InvalidOperation(_))
    ));

    // The copy handed back equals what was registered
    assert_eq!(session.table("numbers")?, frame);
    Ok(())
}

#[test]
fn test_create_insert_and_drop() -> Result<()> {
    let mut session = Session::new();
    session.create_table(
        "readings",
        vec![
            Column::new("id", DataType::Integer, false, true),
            Column::nullable("temp", DataType::Float),
        ],
    )?;

    let inserted = session.insert_rows(
        "readings",
        vec![
            vec![DataValue::Integer(1), DataValue::Float(3.5)],
            vec![DataValue::Integer(2), DataValue::Integer(4)],
        ],
    )?;
    assert_eq!(inserted, 2);

    let table = session.table("readings")?;
    assert_eq!(column_values(&table, "temp"), vec![DataValue::Float(3.5), DataValue::Float(4.0)]);

    session.execute("DROP TABLE readings")?;
    assert!(session.tables().is_empty());
    session.execute("DROP TABLE IF EXISTS readings")?;
    assert!(matches!(session.execute("DROP TABLE readings"), Err(QueryError::TableNotFound(_))));
    Ok(())
}

#[test]
fn test_execute_script_returns_last_result() -> Result<()> {
    let mut session = sales_session()?;

    let result = session.execute_script(
        "CREATE TABLE categories (category STRING, description STRING);
         INSERT INTO categories VALUES ('A', 'Category A'), ('B', 'Category B'), ('C', 'Category C');
         SELECT c.description, SUM(d.value) AS total
         FROM data d JOIN categories c ON d.category = c.category
         GROUP BY c.description
         ORDER BY total DESC;",
    )?;

    assert_eq!(column_values(&result, "description"), text(&["Category C", "Category B", "Category A"]));
    assert_eq!(column_values(&result, "total"), ints(&[180, 150, 120]));
    Ok(())
}

#[test]
fn test_script_stops_at_first_failure() -> Result<()> {
    let mut session = Session::new();

    let outcome = session.execute_script(
        "CREATE TABLE t (a INTEGER);
         INSERT INTO t VALUES (1);
         INSERT INTO t VALUES ('oops');
         INSERT INTO t VALUES (3);",
    );
    assert!(matches!(outcome, Err(QueryError::TypeMismatch(_))));

    // Statements before the failure took effect, later ones did not
    let rows = session.execute("SELECT a FROM t")?;
    assert_eq!(column_values(&rows, "a"), ints(&[1]));
    Ok(())
}

#[test]
fn test_dml_results_as_frames() -> Result<()> {
    let mut session = Session::new();

    let created = session.execute("CREATE TABLE t (a INTEGER)")?;
    assert!(created.is_empty());
    assert_eq!(created.num_columns(), 0);

    let inserted = session.execute("INSERT INTO t VALUES (1), (2)")?;
    assert_eq!(inserted.num_rows(), 1);
    assert_eq!(inserted.row(0), Some(vec![DataValue::Integer(2)]));
    Ok(())
}
