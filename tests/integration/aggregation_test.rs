use anyhow::Result;
use tabuladb::{frame, DataValue, QueryError, Session};

#[path = "../common/mod.rs"]
mod common;

use common::{column_values, floats, ints, sales_session, text};

#[test]
fn test_group_by_sum_and_average() -> Result<()> {
    let mut session = sales_session()?;

    let result = session.execute(
        "SELECT category, SUM(value) AS sum_value, AVG(value) AS avg_value FROM data GROUP BY category",
    )?;

    assert_eq!(result.columns(), vec!["category", "sum_value", "avg_value"]);
    // Groups come out in first-appearance order
    assert_eq!(column_values(&result, "category"), text(&["A", "B", "C"]));
    assert_eq!(column_values(&result, "sum_value"), ints(&[120, 150, 180]));
    assert_eq!(column_values(&result, "avg_value"), floats(&[40.0, 50.0, 60.0]));
    Ok(())
}

#[test]
fn test_count_min_max_and_order_by_aggregate() -> Result<()> {
    let mut session = sales_session()?;

    let result = session.execute(
        "SELECT category, COUNT(*) AS n, MIN(value) AS lo, MAX(value) AS hi
         FROM data
         WHERE value > 20
         GROUP BY category
         ORDER BY MAX(value) - MIN(value) DESC, category",
    )?;

    // A: 40,70  B: 50,80  C: 30,60,90
    assert_eq!(column_values(&result, "category"), text(&["C", "A", "B"]));
    assert_eq!(column_values(&result, "n"), ints(&[3, 2, 2]));
    assert_eq!(column_values(&result, "lo"), ints(&[30, 40, 50]));
    assert_eq!(column_values(&result, "hi"), ints(&[90, 70, 80]));
    Ok(())
}

#[test]
fn test_having_filters_groups() -> Result<()> {
    let mut session = sales_session()?;

    let result = session.execute(
        "SELECT category, SUM(value) AS total FROM data GROUP BY category HAVING SUM(value) >= 150 ORDER BY total DESC",
    )?;
    assert_eq!(column_values(&result, "category"), text(&["C", "B"]));
    assert_eq!(column_values(&result, "total"), ints(&[180, 150]));

    // HAVING may use an aggregate that is not selected
    let counted = session.execute("SELECT category FROM data GROUP BY category HAVING COUNT(*) > 3")?;
    assert_eq!(counted.num_rows(), 0);
    assert_eq!(counted.columns(), vec!["category"]);
    Ok(())
}

#[test]
fn test_group_by_expression() -> Result<()> {
    let mut session = sales_session()?;

    let result = session.execute(
        "SELECT value > 50 AS big, COUNT(*) AS n FROM data GROUP BY value > 50 ORDER BY big",
    )?;
    assert_eq!(
        column_values(&result, "big"),
        vec![DataValue::Boolean(false), DataValue::Boolean(true)]
    );
    assert_eq!(column_values(&result, "n"), ints(&[5, 4]));
    Ok(())
}

#[test]
fn test_ungrouped_aggregate_over_empty_input() -> Result<()> {
    let mut session = sales_session()?;

    let result = session.execute(
        "SELECT COUNT(*) AS n, COUNT(value) AS c, SUM(value) AS s, AVG(value) AS a FROM data WHERE value > 1000",
    )?;
    assert_eq!(result.num_rows(), 1);
    assert_eq!(column_values(&result, "n"), ints(&[0]));
    assert_eq!(column_values(&result, "c"), ints(&[0]));
    assert_eq!(column_values(&result, "s"), vec![DataValue::Null]);
    assert_eq!(column_values(&result, "a"), vec![DataValue::Null]);

    // A grouped query over no rows has no groups
    let grouped = session.execute("SELECT category, COUNT(*) AS n FROM data WHERE value > 1000 GROUP BY category")?;
    assert_eq!(grouped.num_rows(), 0);
    Ok(())
}

#[test]
fn test_aggregates_skip_nulls() -> Result<()> {
    let mut session = Session::new();
    session.register(
        "scores",
        frame! {
            "team" => vec![Some("red"), Some("red"), None, Some("blue"), None],
            // Integers and floats in one column widen to float
            "points" => vec![
                DataValue::Integer(4),
                DataValue::Null,
                DataValue::Integer(5),
                DataValue::Float(1.5),
                DataValue::Integer(2),
            ],
        }?,
    )?;

    let result = session.execute(
        "SELECT team, COUNT(*) AS rows_in_group, COUNT(points) AS scored, SUM(points) AS total
         FROM scores GROUP BY team",
    )?;

    // NULL keys form one group of their own
    assert_eq!(
        column_values(&result, "team"),
        vec![DataValue::from("red"), DataValue::Null, DataValue::from("blue")]
    );
    assert_eq!(column_values(&result, "rows_in_group"), ints(&[2, 2, 1]));
    assert_eq!(column_values(&result, "scored"), ints(&[1, 2, 1]));
    assert_eq!(column_values(&result, "total"), floats(&[4.0, 7.0, 1.5]));
    Ok(())
}

#[test]
fn test_aggregate_errors() -> Result<()> {
    let mut session = sales_session()?;

    assert!(matches!(
        session.execute("SELECT SUM(category) FROM data"),
        Err(QueryError::TypeError(_))
    ));
    assert!(matches!(
        session.execute("SELECT category, value FROM data GROUP BY category"),
        Err(QueryError::PlanningError(_))
    ));
    assert!(matches!(
        session.execute("SELECT SUM(MAX(value)) FROM data"),
        Err(QueryError::PlanningError(_))
    ));
    assert!(matches!(
        session.execute("SELECT category FROM data GROUP BY SUM(value)"),
        Err(QueryError::PlanningError(_))
    ));

    // MIN and MAX work on text
    let names = session.execute("SELECT MIN(category) AS first, MAX(category) AS last FROM data")?;
    assert_eq!(column_values(&names, "first"), text(&["A"]));
    assert_eq!(column_values(&names, "last"), text(&["C"]));
    Ok(())
}

fn signed_zero_and_nan_session() -> Result<Session> {
    let mut session = Session::new();
    session.register(
        "readings",
        frame! {
            "f" => vec![0.0, -0.0, f64::NAN, f64::NAN],
            "v" => vec![1, 2, 3, 4],
        }?,
    )?;
    Ok(session)
}

#[test]
fn test_group_by_float_folds_signed_zero_and_nan() -> Result<()> {
    let mut session = signed_zero_and_nan_session()?;

    let result = session.execute("SELECT f, COUNT(*) AS n, SUM(v) AS total FROM readings GROUP BY f")?;

    assert_eq!(result.num_rows(), 2);
    assert_eq!(column_values(&result, "f"), floats(&[0.0, f64::NAN]));
    assert_eq!(column_values(&result, "n"), ints(&[2, 2]));
    assert_eq!(column_values(&result, "total"), ints(&[3, 7]));
    assert_eq!(result.to_string().lines().nth(1), Some("0  0.0  2      3"));
    Ok(())
}

#[test]
fn test_nan_sorts_above_numbers() -> Result<()> {
    let mut session = signed_zero_and_nan_session()?;

    let extremes = session.execute("SELECT MIN(f) AS lo, MAX(f) AS hi FROM readings")?;
    assert_eq!(column_values(&extremes, "lo"), floats(&[0.0]));
    assert_eq!(column_values(&extremes, "hi"), floats(&[f64::NAN]));

    let ascending = session.execute("SELECT v FROM readings ORDER BY f")?;
    assert_eq!(column_values(&ascending, "v"), ints(&[1, 2, 3, 4]));
    let descending = session.execute("SELECT v FROM readings ORDER BY f DESC, v")?;
    assert_eq!(column_values(&descending, "v"), ints(&[3, 4, 1, 2]));

    // Both zeros match; NaN only equals NaN
    let zeros = session.execute("SELECT COUNT(*) AS n FROM readings WHERE f = 0.0")?;
    assert_eq!(column_values(&zeros, "n"), ints(&[2]));
    let below = session.execute("SELECT COUNT(*) AS n FROM readings WHERE f < 1.0")?;
    assert_eq!(column_values(&below, "n"), ints(&[2]));
    Ok(())
}
