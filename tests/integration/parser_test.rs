use anyhow::{anyhow, Result};
use tabuladb::catalog::DataType;
use tabuladb::query::parser::ast::{
    AggregateFunction, Expression, JoinType, SelectColumn, SelectStatement, Statement, Value,
};
use tabuladb::query::parser::{parse_script, parse_sql, ParseError};

fn parse_select(sql: &str) -> Result<SelectStatement> {
    match parse_sql(sql).map_err(|e| anyhow!("Parse error: {}", e))? {
        Statement::Select(select) => Ok(select),
        other => Err(anyhow!("Expected SELECT, got {}", other)),
    }
}

#[test]
fn test_grouped_aggregate_query() -> Result<()> {
    let select = parse_select("SELECT category, SUM(value) AS sum_value FROM data GROUP BY category")?;

    assert_eq!(select.columns.len(), 2);
    match &select.columns[1] {
        SelectColumn::Expression { expr, alias } => {
            assert_eq!(alias.as_deref(), Some("sum_value"));
            match expr.as_ref() {
                Expression::Aggregate { function, arg } => {
                    assert_eq!(*function, AggregateFunction::Sum);
                    assert!(arg.is_some());
                }
                other => panic!("Expected aggregate, got {:?}", other),
            }
        }
        other => panic!("Expected aliased expression, got {:?}", other),
    }
    assert_eq!(select.group_by.len(), 1);
    Ok(())
}

#[test]
fn test_aliased_join_with_filter_and_order() -> Result<()> {
    let select = parse_select(
        "SELECT b.species, b.count, m.distance_km
         FROM bird_sightings b
         JOIN migration_data m ON b.species = m.species
         WHERE m.distance_km > 1000
         ORDER BY m.distance_km DESC",
    )?;

    assert_eq!(select.from[0].name, "bird_sightings");
    assert_eq!(select.from[0].alias.as_deref(), Some("b"));
    assert_eq!(select.joins.len(), 1);
    assert_eq!(select.joins[0].join_type, JoinType::Inner);
    assert_eq!(select.joins[0].table.qualifier(), "m");
    assert!(select.where_clause.is_some());
    assert_eq!(select.order_by.len(), 1);
    assert!(select.order_by[0].descending);
    Ok(())
}

#[test]
fn test_create_and_insert_statements() -> Result<()> {
    match parse_sql("CREATE TABLE categories (category STRING, description VARCHAR(40))")? {
        Statement::Create(create) => {
            assert_eq!(create.table_name, "categories");
            assert!(create.columns.iter().all(|c| c.data_type == DataType::Text));
        }
        other => panic!("Expected CREATE, got {}", other),
    }

    match parse_sql("INSERT INTO categories VALUES ('A', 'Category A'), ('B', 'Category B');")? {
        Statement::Insert(insert) => {
            assert_eq!(insert.values.len(), 2);
            assert_eq!(insert.values[1][0], Expression::Literal(Value::String("B".to_string())));
        }
        other => panic!("Expected INSERT, got {}", other),
    }
    Ok(())
}

#[test]
fn test_script_splits_statements() -> Result<()> {
    let statements = parse_script(
        "CREATE TABLE t (a INT);
         -- comments and empty statements are skipped
         ;
         INSERT INTO t VALUES (1);
         SELECT a FROM t",
    )?;
    assert_eq!(statements.len(), 3);
    assert!(matches!(statements[2], Statement::Select(_)));
    Ok(())
}

#[test]
fn test_syntax_errors() {
    assert!(parse_sql("SELECT FROM data").is_err());
    assert!(parse_sql("SELECT a FROM t JOIN u").is_err());
    assert!(matches!(parse_sql(""), Err(ParseError::EndOfInput)));
    assert!(parse_sql("SELECT a FROM t; SELECT b FROM t").is_err());
    assert!(parse_sql("UPDATE t SET a = 1").is_err());
}
