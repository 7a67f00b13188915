use anyhow::{anyhow, Result};
use tabuladb::catalog::{Catalog, Column, DataType, Table, TableSource};
use tabuladb::query::parser::ast::{JoinType, Statement};
use tabuladb::query::parser::parse_sql;
use tabuladb::query::planner::{build_logical_plan, create_physical_plan, LogicalPlan, PhysicalPlan};
use tabuladb::QueryError;

fn catalog() -> Result<Catalog> {
    let mut catalog = Catalog::new();
    catalog.create_table(Table::new(
        "bird_sightings",
        vec![
            Column::nullable("species", DataType::Text),
            Column::nullable("count", DataType::Integer),
        ],
        TableSource::Registered,
    ))?;
    catalog.create_table(Table::new(
        "migration_data",
        vec![
            Column::nullable("species", DataType::Text),
            Column::nullable("distance_km", DataType::Integer),
        ],
        TableSource::Created,
    ))?;
    Ok(catalog)
}

fn plan(sql: &str) -> Result<LogicalPlan, QueryError> {
    let catalog = catalog().map_err(|e| QueryError::ExecutionError(e.to_string()))?;
    match parse_sql(sql)? {
        Statement::Select(select) => build_logical_plan(&select, &catalog),
        other => Err(QueryError::UnsupportedStatement(other.to_string())),
    }
}

#[test]
fn test_join_filter_sort_plan_shape() -> Result<()> {
    let logical = plan(
        "SELECT b.species, b.count, m.distance_km
         FROM bird_sightings b JOIN migration_data m ON b.species = m.species
         WHERE m.distance_km > 1000
         ORDER BY m.distance_km DESC",
    )?;

    // Hidden sort key is stripped by a final projection
    let LogicalPlan::Projection { columns, input } = &logical else {
        return Err(anyhow!("Expected final projection, got:\n{}", logical));
    };
    let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["species", "count", "distance_km"]);
    assert!(matches!(input.as_ref(), LogicalPlan::Sort { .. }));

    let text = logical.to_string();
    assert!(text.contains("Filter: m.distance_km > 1000"), "{}", text);
    assert!(text.contains("Inner Join: b.species = m.species"), "{}", text);

    let physical = create_physical_plan(&logical);
    assert!(physical.to_string().contains("HashJoin (Inner): b.species = m.species"));
    assert_eq!(physical.output_columns(), vec!["species", "count", "distance_km"]);
    Ok(())
}

#[test]
fn test_left_join_keeps_join_type() -> Result<()> {
    let logical = plan(
        "SELECT b.species, m.distance_km FROM bird_sightings b LEFT JOIN migration_data m ON m.species = b.species",
    )?;
    let physical = create_physical_plan(&logical);

    fn find_join(plan: &PhysicalPlan) -> Option<&PhysicalPlan> {
        match plan {
            PhysicalPlan::HashJoin { .. } | PhysicalPlan::NestedLoopJoin { .. } => Some(plan),
            PhysicalPlan::Filter { input, .. }
            | PhysicalPlan::Project { input, .. }
            | PhysicalPlan::HashAggregate { input, .. }
            | PhysicalPlan::Sort { input, .. }
            | PhysicalPlan::Limit { input, .. } => find_join(input),
            PhysicalPlan::SeqScan { .. } => None,
        }
    }

    match find_join(&physical) {
        Some(PhysicalPlan::HashJoin { keys, join_type, residual, .. }) => {
            assert_eq!(*join_type, JoinType::LeftOuter);
            assert_eq!(keys.len(), 1);
            assert!(residual.is_none());
        }
        other => return Err(anyhow!("Expected hash join, got {:?}", other)),
    }
    Ok(())
}

#[test]
fn test_grouped_plan_has_aggregate() -> Result<()> {
    let logical = plan(
        "SELECT species, SUM(count) AS total FROM bird_sightings GROUP BY species HAVING SUM(count) > 10",
    )?;
    let text = logical.to_string();
    assert!(text.contains("Aggregate: group=[bird_sightings.species AS #group0]"), "{}", text);
    // HAVING reuses the select list's SUM
    assert!(text.contains("aggs=[SUM(bird_sightings.count) AS #agg0]"), "{}", text);
    assert!(text.contains("Filter: #agg0 > 10"), "{}", text);
    Ok(())
}

#[test]
fn test_planning_errors() {
    assert!(matches!(plan("SELECT * FROM nowhere"), Err(QueryError::TableNotFound(_))));
    assert!(matches!(plan("SELECT wingspan FROM bird_sightings"), Err(QueryError::ColumnNotFound(_))));
    assert!(matches!(
        plan("SELECT species FROM bird_sightings b JOIN migration_data m ON b.species = m.species"),
        Err(QueryError::AmbiguousColumn(_))
    ));
    assert!(matches!(
        plan("SELECT species, count FROM bird_sightings GROUP BY species"),
        Err(QueryError::PlanningError(_))
    ));
    assert!(matches!(
        plan("SELECT species FROM bird_sightings WHERE SUM(count) > 1"),
        Err(QueryError::PlanningError(_))
    ));
    assert!(matches!(
        plan("SELECT species FROM bird_sightings ORDER BY 2"),
        Err(QueryError::PlanningError(_))
    ));
}
