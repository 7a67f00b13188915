use anyhow::Result;
use tabuladb::frame::IntoSeries;
use tabuladb::{frame, DataFrame, DataType, DataValue, FrameError, QueryError, Series};

#[path = "../common/mod.rs"]
mod common;

use common::{bird_session, sales_session};

#[test]
fn test_grouped_query_renders_as_frame() -> Result<()> {
    let mut session = sales_session()?;

    let result = session.execute(
        "SELECT category, SUM(value) AS sum_value, AVG(value) AS avg_value FROM data GROUP BY category",
    )?;

    let expected = [
        "   category  sum_value  avg_value",
        "0         A        120       40.0",
        "1         B        150       50.0",
        "2         C        180       60.0",
    ]
    .join("\n");
    assert_eq!(result.to_string(), expected);
    assert_eq!(
        result.dtypes(),
        vec![
            ("category", DataType::Text),
            ("sum_value", DataType::Integer),
            ("avg_value", DataType::Float),
        ]
    );
    Ok(())
}

#[test]
fn test_join_result_renders_as_frame() -> Result<()> {
    let mut session = bird_session()?;

    let result = session.execute(
        "SELECT b.species, b.count, m.distance_km
         FROM bird_sightings b JOIN migration_data m ON b.species = m.species
         WHERE m.distance_km > 1000
         ORDER BY m.distance_km DESC",
    )?;

    let expected = [
        "   species  count  distance_km",
        "0  Pintail     31         2500",
        "1  Gadwall      9         2000",
        "2  Mallard     42         1500",
    ]
    .join("\n");
    assert_eq!(result.to_string(), expected);
    Ok(())
}

#[test]
fn test_empty_result_keeps_columns() -> Result<()> {
    let mut session = bird_session()?;

    let result = session.execute("SELECT species, count FROM bird_sightings WHERE count > 100")?;
    assert!(result.is_empty());
    assert_eq!(result.columns(), vec!["species", "count"]);
    assert_eq!(
        result.to_string(),
        "Empty DataFrame\nColumns: [species, count]\nIndex: []"
    );
    assert_eq!(result.to_json()?, "[]");
    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let mut session = bird_session()?;

    let result = session.execute("SELECT species, count FROM bird_sightings WHERE count < 20 ORDER BY count")?;
    assert_eq!(
        result.to_json()?,
        r#"[{"species":"Gadwall","count":9},{"species":"Wood Duck","count":17}]"#
    );

    let parsed: serde_json::Value = serde_json::from_str(&result.to_json_pretty()?)?;
    assert_eq!(parsed[1]["species"], "Wood Duck");
    Ok(())
}

#[test]
fn test_frames_built_from_series() -> Result<()> {
    let frame = DataFrame::new(vec![
        ("id", Series::from(vec![1i64, 2, 3])),
        ("score", Series::new(DataType::Float, vec![DataValue::Integer(7), DataValue::Null, DataValue::Float(2.5)])?),
        ("label", vec![DataValue::from("x"), DataValue::Null, DataValue::from("z")].into_series()?),
    ])?;

    assert_eq!(frame.num_rows(), 3);
    assert_eq!(frame.column("score").map(|s| s.null_count()), Some(1));
    assert_eq!(frame.value(0, "score"), Some(&DataValue::Float(7.0)));
    assert_eq!(
        frame.rows()[2],
        vec![DataValue::Integer(3), DataValue::Float(2.5), DataValue::from("z")]
    );
    assert_eq!(frame.column("missing"), None);

    let empty = frame!()?;
    assert_eq!(empty.num_columns(), 0);
    assert_eq!(empty, DataFrame::empty());
    assert_eq!(empty.to_string(), "Empty DataFrame\nColumns: []\nIndex: []");
    Ok(())
}

#[test]
fn test_frame_errors() {
    assert!(matches!(
        frame! { "a" => vec![1, 2, 3], "b" => vec!["x"] },
        Err(FrameError::LengthMismatch { expected: 3, actual: 1, .. })
    ));
    assert!(matches!(
        frame! { "a" => vec![1], "a" => vec![2] },
        Err(FrameError::DuplicateColumn(_))
    ));
    assert!(matches!(
        Series::try_from(vec![DataValue::Boolean(true), DataValue::Float(1.0)]),
        Err(FrameError::MixedTypes { .. })
    ));
}

#[test]
fn test_result_with_mixed_column_types_is_reported() -> Result<()> {
    let mut session = sales_session()?;

    // A CASE that yields text for some rows and numbers for others cannot
    // become a typed frame, but the raw result set is still available
    let sql = "SELECT CASE WHEN value > 50 THEN 'big' ELSE value END AS v FROM data";
    assert!(matches!(session.execute(sql), Err(QueryError::Frame(FrameError::MixedTypes { .. }))));

    let raw = session.execute_result_set(sql)?;
    assert_eq!(raw.row_count(), 9);
    Ok(())
}
