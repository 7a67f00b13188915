use anyhow::Result;
use tabuladb::{frame, DataValue, QueryError, Session};

#[path = "../common/mod.rs"]
mod common;

use common::{bird_session, column_values, ints, text};

#[test]
fn test_inner_join_with_filter_and_order() -> Result<()> {
    let mut session = bird_session()?;

    let result = session.execute(
        "SELECT b.species, b.count, m.distance_km
         FROM bird_sightings b
         JOIN migration_data m ON b.species = m.species
         WHERE m.distance_km > 1000
         ORDER BY m.distance_km DESC",
    )?;

    assert_eq!(result.columns(), vec!["species", "count", "distance_km"]);
    assert_eq!(column_values(&result, "species"), text(&["Pintail", "Gadwall", "Mallard"]));
    assert_eq!(column_values(&result, "count"), ints(&[31, 9, 42]));
    assert_eq!(column_values(&result, "distance_km"), ints(&[2500, 2000, 1500]));
    Ok(())
}

#[test]
fn test_join_condition_order_does_not_matter() -> Result<()> {
    let mut session = bird_session()?;

    let forward = session.execute(
        "SELECT b.species, m.distance_km FROM bird_sightings b JOIN migration_data m ON b.species = m.species",
    )?;
    let reversed = session.execute(
        "SELECT b.species, m.distance_km FROM bird_sightings b JOIN migration_data m ON m.species = b.species",
    )?;

    assert_eq!(forward, reversed);
    // Left input order is preserved
    assert_eq!(
        column_values(&forward, "species"),
        text(&["Mallard", "Wood Duck", "Gadwall", "Pintail"])
    );
    Ok(())
}

#[test]
fn test_left_join_pads_missing_matches() -> Result<()> {
    let mut session = Session::new();
    session.register(
        "birds",
        frame! {
            "species" => vec!["Mallard", "Heron", "Pintail"],
        }?,
    )?;
    session.register(
        "routes",
        frame! {
            "species" => vec!["Pintail", "Mallard", "Mallard"],
            "route" => vec!["Pacific", "Central", "Atlantic"],
        }?,
    )?;

    let result = session.execute(
        "SELECT b.species, r.route FROM birds b LEFT JOIN routes r ON b.species = r.species",
    )?;

    assert_eq!(
        column_values(&result, "species"),
        text(&["Mallard", "Mallard", "Heron", "Pintail"])
    );
    assert_eq!(
        column_values(&result, "route"),
        vec![
            DataValue::from("Central"),
            DataValue::from("Atlantic"),
            DataValue::Null,
            DataValue::from("Pacific"),
        ]
    );

    // Inner join drops the unmatched row
    let inner = session.execute("SELECT b.species FROM birds b JOIN routes r ON b.species = r.species")?;
    assert_eq!(inner.num_rows(), 3);
    Ok(())
}

#[test]
fn test_cross_join_and_comma_join() -> Result<()> {
    let mut session = bird_session()?;

    let cross = session.execute("SELECT b.species, m.species AS other FROM bird_sightings b CROSS JOIN migration_data m")?;
    assert_eq!(cross.num_rows(), 16);
    assert_eq!(cross.columns(), vec!["species", "other"]);

    let comma = session.execute(
        "SELECT b.species, m.distance_km FROM bird_sightings b, migration_data m WHERE b.species = m.species AND m.distance_km < 1000",
    )?;
    assert_eq!(column_values(&comma, "species"), text(&["Wood Duck"]));
    assert_eq!(column_values(&comma, "distance_km"), ints(&[800]));
    Ok(())
}

#[test]
fn test_join_with_non_equi_condition() -> Result<()> {
    let mut session = bird_session()?;

    // No usable equality key, so the join falls back to a nested loop
    let result = session.execute(
        "SELECT b.species, m.species AS longer FROM bird_sightings b JOIN migration_data m ON m.distance_km > b.count * 60 ORDER BY b.species, m.species",
    )?;
    assert_eq!(
        column_values(&result, "species"),
        text(&["Gadwall", "Gadwall", "Gadwall", "Gadwall", "Pintail", "Pintail", "Wood Duck", "Wood Duck", "Wood Duck"])
    );
    assert_eq!(
        column_values(&result, "longer"),
        text(&["Gadwall", "Mallard", "Pintail", "Wood Duck", "Gadwall", "Pintail", "Gadwall", "Mallard", "Pintail"])
    );
    assert!(session.explain(
        "SELECT b.species FROM bird_sightings b JOIN migration_data m ON m.distance_km > b.count"
    )?.contains("NestedLoopJoin (Inner)"));
    Ok(())
}

#[test]
fn test_join_then_aggregate() -> Result<()> {
    let mut session = bird_session()?;

    let result = session.execute(
        "SELECT COUNT(*) AS pairs, SUM(m.distance_km) AS total
         FROM bird_sightings b JOIN migration_data m ON b.species = m.species
         WHERE b.count > 10",
    )?;
    assert_eq!(column_values(&result, "pairs"), ints(&[3]));
    assert_eq!(column_values(&result, "total"), ints(&[4800]));
    Ok(())
}

#[test]
fn test_ambiguous_and_unknown_join_columns() -> Result<()> {
    let mut session = bird_session()?;

    assert!(matches!(
        session.execute("SELECT species FROM bird_sightings b JOIN migration_data m ON b.species = m.species"),
        Err(QueryError::AmbiguousColumn(_))
    ));
    assert!(matches!(
        session.execute("SELECT b.species FROM bird_sightings b JOIN migration_data m ON b.species = x.species"),
        Err(QueryError::ColumnNotFound(_))
    ));
    assert!(matches!(
        session.execute("SELECT b.species FROM bird_sightings b JOIN nowhere n ON b.species = n.species"),
        Err(QueryError::TableNotFound(_))
    ));
    Ok(())
}

fn site_session() -> Result<Session> {
    let mut session = Session::new();
    session.register(
        "visits",
        frame! {
            "site" => vec!["marsh", "lake", "marsh", "river"],
            "visit_id" => vec![1, 2, 3, 4],
        }?,
    )?;
    session.register(
        "feeders",
        frame! {
            "site" => vec!["marsh", "coast", "marsh", "lake"],
            "feeder_id" => vec![10, 20, 30, 40],
        }?,
    )?;
    Ok(session)
}

#[test]
fn test_many_to_many_join_pairs_every_match() -> Result<()> {
    let mut session = site_session()?;

    // marsh: 2 visits x 2 feeders, lake: 1 x 1
    let inner = session.execute(
        "SELECT v.visit_id, f.feeder_id FROM visits v JOIN feeders f ON v.site = f.site",
    )?;
    assert_eq!(inner.num_rows(), 5);
    assert_eq!(column_values(&inner, "visit_id"), ints(&[1, 1, 2, 3, 3]));
    assert_eq!(column_values(&inner, "feeder_id"), ints(&[10, 30, 40, 10, 30]));

    let left = session.execute(
        "SELECT v.visit_id, f.feeder_id FROM visits v LEFT JOIN feeders f ON v.site = f.site",
    )?;
    assert_eq!(column_values(&left, "visit_id"), ints(&[1, 1, 2, 3, 3, 4]));
    assert_eq!(
        column_values(&left, "feeder_id"),
        vec![
            DataValue::Integer(10),
            DataValue::Integer(30),
            DataValue::Integer(40),
            DataValue::Integer(10),
            DataValue::Integer(30),
            DataValue::Null,
        ]
    );
    Ok(())
}

#[test]
fn test_self_join_row_count() -> Result<()> {
    let mut session = Session::new();
    session.register("data", tabuladb::demo::sales_data()?)?;

    // Three categories with three rows each
    let result = session.execute("SELECT COUNT(*) AS n FROM data d JOIN data e ON d.category = e.category")?;
    assert_eq!(column_values(&result, "n"), ints(&[27]));

    let first = session.execute(
        "SELECT d.value, e.value AS other FROM data d JOIN data e ON d.category = e.category LIMIT 3",
    )?;
    assert_eq!(column_values(&first, "value"), ints(&[10, 10, 10]));
    assert_eq!(column_values(&first, "other"), ints(&[10, 40, 70]));
    Ok(())
}
