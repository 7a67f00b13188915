// Schema Validation Integration Tests
//
// Rows entering a created table are checked against its schema, both
// through SQL INSERT and through `Session::insert_rows`.

use anyhow::Result;
use tabuladb::catalog::{Table, TableSource, TypeValidator};
use tabuladb::{Column, DataType, DataValue, QueryError, Session};

#[path = "../common/mod.rs"]
mod common;

use common::{column_values, ints, text};

fn species_session() -> Result<Session> {
    let mut session = Session::new();
    session.execute(
        "CREATE TABLE species (id INTEGER PRIMARY KEY, name VARCHAR(40) NOT NULL, wingspan FLOAT, protected BOOLEAN)",
    )?;
    Ok(session)
}

#[test]
fn test_valid_rows_are_coerced() -> Result<()> {
    let mut session = species_session()?;

    session.execute("INSERT INTO species VALUES (1, 'Mallard', 89, FALSE), (2, 'Gadwall', 84.5, NULL)")?;
    session.execute("INSERT INTO species (name, id) VALUES ('Pintail', 3)")?;

    let table = session.table("species")?;
    assert_eq!(column_values(&table, "id"), ints(&[1, 2, 3]));
    // Integer literals widen into the FLOAT column
    assert_eq!(
        column_values(&table, "wingspan"),
        vec![DataValue::Float(89.0), DataValue::Float(84.5), DataValue::Null]
    );
    assert_eq!(
        column_values(&table, "protected"),
        vec![DataValue::Boolean(false), DataValue::Null, DataValue::Null]
    );
    Ok(())
}

#[test]
fn test_type_mismatch() -> Result<()> {
    let mut session = species_session()?;

    assert!(matches!(
        session.execute("INSERT INTO species VALUES ('one', 'Mallard', 89.0, FALSE)"),
        Err(QueryError::TypeMismatch(_))
    ));
    // Floats never narrow into INTEGER columns
    assert!(matches!(
        session.execute("INSERT INTO species VALUES (1.5, 'Mallard', 89.0, FALSE)"),
        Err(QueryError::TypeMismatch(_))
    ));
    assert!(matches!(
        session.execute("INSERT INTO species VALUES (1, 'Mallard', 'wide', FALSE)"),
        Err(QueryError::TypeMismatch(_))
    ));
    Ok(())
}

#[test]
fn test_arity_and_unknown_columns() -> Result<()> {
    let mut session = species_session()?;

    assert!(matches!(
        session.execute("INSERT INTO species VALUES (1, 'Mallard')"),
        Err(QueryError::ArityMismatch(_))
    ));
    assert!(matches!(
        session.insert_rows("species", vec![vec![DataValue::Integer(1)]]),
        Err(QueryError::ArityMismatch(_))
    ));
    assert!(matches!(
        session.execute("INSERT INTO species (id, colour) VALUES (1, 'green')"),
        Err(QueryError::ColumnNotFound(_))
    ));
    assert!(matches!(
        session.execute("INSERT INTO species (id, id) VALUES (1, 2)"),
        Err(QueryError::DuplicateColumn(_))
    ));
    Ok(())
}

#[test]
fn test_null_and_primary_key_constraints() -> Result<()> {
    let mut session = species_session()?;

    assert!(matches!(
        session.execute("INSERT INTO species VALUES (1, NULL, 89.0, FALSE)"),
        Err(QueryError::NullViolation(_))
    ));
    // Primary keys are implicitly NOT NULL
    assert!(matches!(
        session.execute("INSERT INTO species (name) VALUES ('Mallard')"),
        Err(QueryError::NullViolation(_))
    ));

    session.execute("INSERT INTO species (id, name) VALUES (1, 'Mallard')")?;
    assert!(matches!(
        session.execute("INSERT INTO species (id, name) VALUES (1, 'Teal')"),
        Err(QueryError::PrimaryKeyViolation(_))
    ));
    assert!(matches!(
        session.execute("INSERT INTO species (id, name) VALUES (2, 'Teal'), (2, 'Wigeon')"),
        Err(QueryError::PrimaryKeyViolation(_))
    ));
    Ok(())
}

#[test]
fn test_failed_batch_inserts_nothing() -> Result<()> {
    let mut session = species_session()?;
    session.execute("INSERT INTO species (id, name) VALUES (1, 'Mallard')")?;

    let outcome = session.insert_rows(
        "species",
        vec![
            vec![DataValue::Integer(2), DataValue::from("Teal"), DataValue::Null, DataValue::Null],
            vec![DataValue::Integer(3), DataValue::Null, DataValue::Null, DataValue::Null],
        ],
    );
    assert!(matches!(outcome, Err(QueryError::NullViolation(_))));

    let table = session.table("species")?;
    assert_eq!(column_values(&table, "name"), text(&["Mallard"]));
    Ok(())
}

#[test]
fn test_create_table_rejects_bad_schemas() -> Result<()> {
    let mut session = Session::new();

    assert!(matches!(
        session.execute("CREATE TABLE t (a INTEGER, A TEXT)"),
        Err(QueryError::DuplicateColumn(_))
    ));
    assert!(matches!(
        session.create_table("", vec![Column::nullable("a", DataType::Integer)]),
        Err(QueryError::InvalidOperation(_))
    ));
    assert!(session.execute("CREATE TABLE t (a BLOB)").is_err());

    session.execute("CREATE TABLE t (a INTEGER)")?;
    assert!(matches!(
        session.execute("CREATE TABLE t (b INTEGER)"),
        Err(QueryError::TableAlreadyExists(_))
    ));
    session.execute("CREATE TABLE IF NOT EXISTS t (b INTEGER)")?;
    assert_eq!(session.table("t")?.columns(), vec!["a"]);
    Ok(())
}

#[test]
fn test_validator_directly() {
    let table = Table::new(
        "flags",
        vec![
            Column::new("id", DataType::Integer, false, true),
            Column::nullable("enabled", DataType::Boolean),
        ],
        TableSource::Created,
    );

    let rows = TypeValidator::validate_batch(
        vec![vec![DataValue::Integer(1), DataValue::Boolean(true)]],
        &table,
    )
    .unwrap();
    assert_eq!(rows.len(), 1);

    let err = TypeValidator::validate_row(vec![DataValue::Integer(1), DataValue::Integer(1)], &table).unwrap_err();
    assert!(err.to_string().contains("enabled"));
}
