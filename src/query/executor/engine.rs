// Query Execution Engine Implementation
//
// This module implements the engine for executing SQL statements against
// an in-memory catalog. SELECT goes through the planner and an operator
// tree; DDL and DML are delegated to their executors.

use log::debug;

use crate::catalog::{Catalog, Column, ConflictPolicy, Table};
use crate::query::executor::ddl_executor::DdlExecutor;
use crate::query::executor::dml_executor::DmlExecutor;
use crate::query::executor::operators::collect_rows;
use crate::query::executor::result::{DataValue, QueryError, QueryResult, QueryResultSet};
use crate::query::parser::ast::{SelectStatement, Statement};
use crate::query::parser::{parse_script, parse_sql};
use crate::query::planner::{build_logical_plan, create_physical_plan, OperatorBuilder, PhysicalPlan};

/// Executes statements against the catalog it owns
#[derive(Debug, Default)]
pub struct ExecutionEngine {
    catalog: Catalog,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        ExecutionEngine {
            catalog: Catalog::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parse and execute a single statement
    pub fn execute_query(&mut self, query: &str) -> QueryResult<QueryResultSet> {
        debug!("Executing query: {}", query);
        let statement = parse_sql(query)?;
        self.execute_statement(statement)
    }

    /// Execute `;`-separated statements in order, stopping at the first
    /// failure. Returns the result of the last statement.
    pub fn execute_script(&mut self, script: &str) -> QueryResult<QueryResultSet> {
        let statements = parse_script(script)?;
        debug!("Executing script of {} statements", statements.len());

        let mut last = QueryResultSet::empty();
        for statement in statements {
            last = self.execute_statement(statement)?;
        }
        Ok(last)
    }

    pub fn execute_statement(&mut self, statement: Statement) -> QueryResult<QueryResultSet> {
        match statement {
            Statement::Select(select) => self.execute_select(&select),
            Statement::Insert(insert) => DmlExecutor::new(&mut self.catalog).execute_insert(insert),
            Statement::Create(create) => DdlExecutor::new(&mut self.catalog).execute_create(create),
            Statement::Drop(drop) => DdlExecutor::new(&mut self.catalog).execute_drop(drop),
        }
    }

    fn plan_select(&self, select: &SelectStatement) -> QueryResult<PhysicalPlan> {
        let logical_plan = build_logical_plan(select, &self.catalog)?;
        debug!("Logical plan:\n{}", logical_plan);
        let physical_plan = create_physical_plan(&logical_plan);
        debug!("Physical plan:\n{}", physical_plan);
        Ok(physical_plan)
    }

    fn execute_select(&self, select: &SelectStatement) -> QueryResult<QueryResultSet> {
        let plan = self.plan_select(select)?;
        let mut root = OperatorBuilder::new(&self.catalog).build_operator_tree(&plan)?;
        let rows = collect_rows(root.as_mut())?;

        let mut result = QueryResultSet::new(plan.output_columns());
        for row in rows {
            result.add_row(row);
        }
        debug!("SELECT produced {} rows", result.row_count());
        Ok(result)
    }

    /// Render the logical and physical plans of a SELECT statement
    pub fn explain(&self, query: &str) -> QueryResult<String> {
        match parse_sql(query)? {
            Statement::Select(select) => {
                let logical_plan = build_logical_plan(&select, &self.catalog)?;
                let physical_plan = create_physical_plan(&logical_plan);
                Ok(format!("Logical plan:\n{}\nPhysical plan:\n{}", logical_plan, physical_plan))
            }
            other => Err(QueryError::UnsupportedStatement(format!("EXPLAIN {}", other))),
        }
    }

    /// Define a new empty table
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> QueryResult<()> {
        DdlExecutor::new(&mut self.catalog).create_table(name, columns)
    }

    /// Append rows to a created table, returning the number of rows appended
    pub fn insert_rows(&mut self, name: &str, rows: Vec<Vec<DataValue>>) -> QueryResult<usize> {
        DmlExecutor::new(&mut self.catalog).insert_rows(name, rows)
    }

    /// Add a registered table. Returns the table it replaced, if any.
    pub fn register_table(&mut self, table: Table, policy: ConflictPolicy) -> QueryResult<Option<Table>> {
        crate::query::executor::ddl_executor::check_unique_columns(table.columns())?;
        self.catalog.register_table(table, policy)
    }

    /// Remove a registered table
    pub fn unregister_table(&mut self, name: &str) -> QueryResult<Table> {
        let table = self.catalog.table(name)?;
        if !table.is_registered() {
            return Err(QueryError::InvalidOperation(format!(
                "Table '{}' was created with CREATE TABLE; use DROP TABLE",
                table.name()
            )));
        }
        self.catalog.drop_table(name)
    }
}
