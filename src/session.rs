//! Query Session
//!
//! A `Session` is the entry point of the crate: it owns the table registry,
//! accepts frames and SQL, and hands results back as frames. It lives as
//! long as the caller keeps it; nothing is persisted.

use log::info;

use crate::catalog::{Column, ConflictPolicy};
use crate::frame::DataFrame;
use crate::query::executor::engine::ExecutionEngine;
use crate::query::executor::result::{DataValue, QueryError, QueryResult, QueryResultSet};

/// Session configuration
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// How `register` treats a name that is already taken
    pub conflict_policy: ConflictPolicy,
}

impl SessionConfig {
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}

/// An in-memory query session
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    engine: ExecutionEngine,
}

impl Session {
    /// Create an empty session with the default configuration
    pub fn new() -> Self {
        Session::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Session {
            config,
            engine: ExecutionEngine::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Make a frame queryable under `name`
    pub fn register(&mut self, name: &str, frame: DataFrame) -> QueryResult<()> {
        if name.is_empty() {
            return Err(QueryError::InvalidOperation("Table name must not be empty".to_string()));
        }
        let replaced = self
            .engine
            .register_table(frame.into_table(name), self.config.conflict_policy)?;
        if replaced.is_some() {
            info!("Replaced registered table {}", name);
        }
        Ok(())
    }

    /// Remove a registered frame and return its contents
    pub fn unregister(&mut self, name: &str) -> QueryResult<DataFrame> {
        let table = self.engine.unregister_table(name)?;
        Ok(DataFrame::from_table(&table)?)
    }

    /// Run one SQL statement and return its result as a frame
    pub fn execute(&mut self, sql: &str) -> QueryResult<DataFrame> {
        let result = self.execute_result_set(sql)?;
        Ok(DataFrame::from_result_set(&result)?)
    }

    /// Run one SQL statement and return the raw result set
    pub fn execute_result_set(&mut self, sql: &str) -> QueryResult<QueryResultSet> {
        self.engine.execute_query(sql)
    }

    /// Run `;`-separated statements, stopping at the first failure.
    /// Returns the result of the last statement.
    pub fn execute_script(&mut self, script: &str) -> QueryResult<DataFrame> {
        let result = self.execute_script_result_set(script)?;
        Ok(DataFrame::from_result_set(&result)?)
    }

    pub fn execute_script_result_set(&mut self, script: &str) -> QueryResult<QueryResultSet> {
        self.engine.execute_script(script)
    }

    /// Logical and physical plans of a SELECT statement
    pub fn explain(&self, sql: &str) -> QueryResult<String> {
        self.engine.explain(sql)
    }

    /// Define a new empty table
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> QueryResult<()> {
        self.engine.create_table(name, columns)
    }

    /// Append rows (one value per column, in schema order) to a created table.
    /// The whole batch is rejected if any row does not fit the schema.
    pub fn insert_rows(&mut self, name: &str, rows: Vec<Vec<DataValue>>) -> QueryResult<usize> {
        self.engine.insert_rows(name, rows)
    }

    /// Table names in the order they were added
    pub fn tables(&self) -> Vec<String> {
        self.engine.catalog().table_names()
    }

    /// A copy of a table's contents
    pub fn table(&self, name: &str) -> QueryResult<DataFrame> {
        let table = self.engine.catalog().table(name)?;
        Ok(DataFrame::from_table(table)?)
    }
}
