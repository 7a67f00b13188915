// Logical Query Plan Implementation
//
// This module defines the logical plan representation for query processing
// and builds it from a SELECT statement. Building binds every column
// reference, rewrites aggregates into references to aggregation output
// keys and resolves ORDER BY items against the output columns.

use std::fmt;

use crate::catalog::Catalog;
use crate::query::executor::operators::agg::AggregateCall;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::parser::ast::{
    AggregateFunction, ColumnReference, Expression, JoinType, OrderByItem, SelectColumn, SelectStatement, TableReference, Value,
};
use crate::query::planner::binder::Scope;

/// Represents a node in the logical query plan
#[derive(Debug, Clone)]
pub enum LogicalPlan {
    /// Scan a table
    Scan {
        /// Table name
        table_name: String,
        /// Alias, or the table name as written
        qualifier: String,
        /// Keys of the produced rows
        columns: Vec<String>,
    },
    /// Filter rows based on a predicate
    Filter {
        /// Predicate expression
        predicate: Expression,
        /// Input plan
        input: Box<LogicalPlan>,
    },
    /// Join two relations
    Join {
        /// Left input plan
        left: Box<LogicalPlan>,
        /// Right input plan
        right: Box<LogicalPlan>,
        /// Join condition; None for a cross join
        condition: Option<Expression>,
        /// Join type
        join_type: JoinType,
    },
    /// Group rows and compute aggregates
    Aggregate {
        /// Group keys: output key and expression
        group_by: Vec<(String, Expression)>,
        /// Aggregates to compute
        aggregates: Vec<AggregateCall>,
        /// Input plan
        input: Box<LogicalPlan>,
    },
    /// Project columns
    Projection {
        /// Output name and expression per column
        columns: Vec<(String, Expression)>,
        /// Input plan
        input: Box<LogicalPlan>,
    },
    /// Order rows
    Sort {
        /// Sort keys and whether each is descending
        order_by: Vec<(Expression, bool)>,
        /// Input plan
        input: Box<LogicalPlan>,
    },
    /// Skip and cap rows
    Limit {
        limit: Option<u64>,
        offset: u64,
        /// Input plan
        input: Box<LogicalPlan>,
    },
}

impl LogicalPlan {
    /// Keys of the rows produced by this plan node
    pub fn output_columns(&self) -> Vec<String> {
        match self {
            LogicalPlan::Scan { columns, .. } => columns.clone(),
            LogicalPlan::Filter { input, .. }
            | LogicalPlan::Sort { input, .. }
            | LogicalPlan::Limit { input, .. } => input.output_columns(),
            LogicalPlan::Join { left, right, .. } => {
                let mut columns = left.output_columns();
                columns.extend(right.output_columns());
                columns
            }
            LogicalPlan::Aggregate { group_by, aggregates, .. } => group_by
                .iter()
                .map(|(key, _)| key.clone())
                .chain(aggregates.iter().map(|agg| agg.output_key.clone()))
                .collect(),
            LogicalPlan::Projection { columns, .. } => columns.iter().map(|(name, _)| name.clone()).collect(),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            LogicalPlan::Scan { table_name, qualifier, .. } => {
                if table_name == qualifier {
                    writeln!(f, "{}Scan: {}", indent, table_name)
                } else {
                    writeln!(f, "{}Scan: {} as {}", indent, table_name, qualifier)
                }
            }
            LogicalPlan::Filter { predicate, input } => {
                writeln!(f, "{}Filter: {}", indent, predicate)?;
                input.fmt_indented(f, depth + 1)
            }
            LogicalPlan::Join { left, right, condition, join_type } => {
                match condition {
                    Some(condition) => writeln!(f, "{}{:?} Join: {}", indent, join_type, condition)?,
                    None => writeln!(f, "{}{:?} Join", indent, join_type)?,
                }
                left.fmt_indented(f, depth + 1)?;
                right.fmt_indented(f, depth + 1)
            }
            LogicalPlan::Aggregate { group_by, aggregates, input } => {
                let groups: Vec<String> = group_by.iter().map(|(k, e)| format!("{} AS {}", e, k)).collect();
                let aggs: Vec<String> = aggregates.iter().map(|a| a.to_string()).collect();
                writeln!(f, "{}Aggregate: group=[{}] aggs=[{}]", indent, groups.join(", "), aggs.join(", "))?;
                input.fmt_indented(f, depth + 1)
            }
            LogicalPlan::Projection { columns, input } => {
                let cols: Vec<String> = columns.iter().map(|(n, e)| format!("{} AS {}", e, n)).collect();
                writeln!(f, "{}Projection: {}", indent, cols.join(", "))?;
                input.fmt_indented(f, depth + 1)
            }
            LogicalPlan::Sort { order_by, input } => {
                let keys: Vec<String> = order_by
                    .iter()
                    .map(|(e, desc)| format!("{} {}", e, if *desc { "DESC" } else { "ASC" }))
                    .collect();
                writeln!(f, "{}Sort: {}", indent, keys.join(", "))?;
                input.fmt_indented(f, depth + 1)
            }
            LogicalPlan::Limit { limit, offset, input } => {
                match limit {
                    Some(limit) => writeln!(f, "{}Limit: {} offset {}", indent, limit, offset)?,
                    None => writeln!(f, "{}Limit: all offset {}", indent, offset)?,
                }
                input.fmt_indented(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Column reference to an already computed row key
fn key_ref(key: &str) -> Expression {
    Expression::Column(ColumnReference {
        table: None,
        name: key.to_string(),
    })
}

/// Output name for an unaliased select item
fn default_output_name(column: &SelectColumn) -> String {
    match column {
        SelectColumn::Column(col_ref) => col_ref.name.clone(),
        SelectColumn::Expression { expr, .. } => match expr.as_ref() {
            Expression::Column(col_ref) => col_ref.name.clone(),
            other => other.to_string(),
        },
        SelectColumn::Wildcard => "*".to_string(),
        SelectColumn::QualifiedWildcard(t) => format!("{}.*", t),
    }
}

/// Give duplicate names `_1`, `_2`, ... suffixes
fn deduplicate_names(names: Vec<String>) -> Vec<String> {
    let mut used: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        used.push(candidate);
    }
    used
}

/// Rewrites post-aggregation expressions in terms of the aggregate output
struct AggregateRewriter {
    group_exprs: Vec<Expression>,
    aggregates: Vec<AggregateCall>,
}

impl AggregateRewriter {
    fn group_key(i: usize) -> String {
        format!("#group{}", i)
    }

    /// Register an aggregate, reusing an identical earlier one
    fn aggregate_key(&mut self, function: AggregateFunction, arg: Option<&Expression>) -> QueryResult<String> {
        if arg.is_some_and(|a| a.contains_aggregate()) {
            return Err(QueryError::PlanningError(
                "Aggregate function calls cannot be nested".to_string(),
            ));
        }

        if let Some(existing) = self
            .aggregates
            .iter()
            .find(|agg| agg.function == function && agg.arg.as_ref() == arg)
        {
            return Ok(existing.output_key.clone());
        }

        let output_key = format!("#agg{}", self.aggregates.len());
        self.aggregates.push(AggregateCall {
            function,
            arg: arg.cloned(),
            output_key: output_key.clone(),
        });
        Ok(output_key)
    }

    fn rewrite(&mut self, expr: &Expression) -> QueryResult<Expression> {
        if let Some(i) = self.group_exprs.iter().position(|g| g == expr) {
            return Ok(key_ref(&Self::group_key(i)));
        }

        Ok(match expr {
            Expression::Aggregate { function, arg } => key_ref(&self.aggregate_key(*function, arg.as_deref())?),
            Expression::Literal(_) => expr.clone(),
            Expression::Column(col_ref) => {
                return Err(QueryError::PlanningError(format!(
                    "Column {} must appear in the GROUP BY clause or be used in an aggregate function",
                    col_ref.key()
                )))
            }
            Expression::BinaryOp { left, op, right } => Expression::BinaryOp {
                left: Box::new(self.rewrite(left)?),
                op: *op,
                right: Box::new(self.rewrite(right)?),
            },
            Expression::UnaryOp { op, expr } => Expression::UnaryOp {
                op: *op,
                expr: Box::new(self.rewrite(expr)?),
            },
            Expression::IsNull { expr, not } => Expression::IsNull {
                expr: Box::new(self.rewrite(expr)?),
                not: *not,
            },
            Expression::Case { operand, when_then_clauses, else_clause } => {
                let operand = match operand {
                    Some(operand) => Some(Box::new(self.rewrite(operand)?)),
                    None => None,
                };
                let mut clauses = Vec::with_capacity(when_then_clauses.len());
                for (when, then) in when_then_clauses {
                    clauses.push((Box::new(self.rewrite(when)?), Box::new(self.rewrite(then)?)));
                }
                let else_clause = match else_clause {
                    Some(e) => Some(Box::new(self.rewrite(e)?)),
                    None => None,
                };
                Expression::Case {
                    operand,
                    when_then_clauses: clauses,
                    else_clause,
                }
            }
        })
    }
}

fn reject_aggregate(expr: &Expression, clause: &str) -> QueryResult<()> {
    if expr.contains_aggregate() {
        return Err(QueryError::PlanningError(format!(
            "Aggregate functions are not allowed in {}",
            clause
        )));
    }
    Ok(())
}

/// Bind the FROM clause and build the scan/join tree
fn build_from_clause(stmt: &SelectStatement, catalog: &Catalog, scope: &mut Scope) -> QueryResult<LogicalPlan> {
    let scan = |reference: &TableReference, scope: &mut Scope| -> QueryResult<LogicalPlan> {
        let table = catalog.table(&reference.name)?;
        let entry = scope.add_table(table, reference)?;
        Ok(LogicalPlan::Scan {
            table_name: entry.table_name.clone(),
            qualifier: entry.qualifier.clone(),
            columns: entry.keys(),
        })
    };

    let mut references = stmt.from.iter();
    let first = references
        .next()
        .ok_or_else(|| QueryError::PlanningError("SELECT requires a FROM clause".to_string()))?;
    let mut plan = scan(first, scope)?;

    // FROM a, b is a cross join
    for reference in references {
        plan = LogicalPlan::Join {
            left: Box::new(plan),
            right: Box::new(scan(reference, scope)?),
            condition: None,
            join_type: JoinType::Cross,
        };
    }

    for join in &stmt.joins {
        let right = scan(&join.table, scope)?;
        let condition = match &join.condition {
            Some(condition) => {
                reject_aggregate(condition, "JOIN conditions")?;
                Some(scope.bind_expression(condition)?)
            }
            None => None,
        };
        plan = LogicalPlan::Join {
            left: Box::new(plan),
            right: Box::new(right),
            condition,
            join_type: join.join_type,
        };
    }

    Ok(plan)
}

/// Build a logical plan from a SELECT statement
pub fn build_logical_plan(stmt: &SelectStatement, catalog: &Catalog) -> QueryResult<LogicalPlan> {
    let mut scope = Scope::new();
    let mut plan = build_from_clause(stmt, catalog, &mut scope)?;

    if let Some(where_clause) = &stmt.where_clause {
        reject_aggregate(where_clause, "WHERE")?;
        plan = LogicalPlan::Filter {
            predicate: scope.bind_expression(where_clause)?,
            input: Box::new(plan),
        };
    }

    // Expand the select list into (name, bound expression) pairs
    let mut names = Vec::new();
    let mut exprs = Vec::new();
    for column in &stmt.columns {
        match column {
            SelectColumn::Wildcard | SelectColumn::QualifiedWildcard(_) => {
                let qualifier = match column {
                    SelectColumn::QualifiedWildcard(q) => Some(q.as_str()),
                    _ => None,
                };
                for (name, col_ref) in scope.expand_wildcard(qualifier)? {
                    names.push(name);
                    exprs.push(Expression::Column(col_ref));
                }
            }
            SelectColumn::Column(col_ref) => {
                let bound = scope.resolve(col_ref)?;
                names.push(bound.name.clone());
                exprs.push(Expression::Column(bound));
            }
            SelectColumn::Expression { expr, alias } => {
                let bound = scope.bind_expression(expr)?;
                names.push(match (alias, &bound) {
                    (Some(alias), _) => alias.clone(),
                    (None, Expression::Column(col_ref)) => col_ref.name.clone(),
                    (None, _) => default_output_name(column),
                });
                exprs.push(bound);
            }
        }
    }
    let names = deduplicate_names(names);

    let is_aggregate = !stmt.group_by.is_empty()
        || stmt.having.is_some()
        || exprs.iter().any(|e| e.contains_aggregate())
        || stmt.order_by.iter().any(|item| item.expr.contains_aggregate());

    let mut rewriter = if is_aggregate {
        let mut group_exprs = Vec::with_capacity(stmt.group_by.len());
        for expr in &stmt.group_by {
            reject_aggregate(expr, "GROUP BY")?;
            group_exprs.push(scope.bind_expression(expr)?);
        }
        Some(AggregateRewriter {
            group_exprs,
            aggregates: Vec::new(),
        })
    } else {
        None
    };

    // Rewrite outputs (and HAVING) in terms of the aggregate row
    let mut having = None;
    if let Some(rewriter) = rewriter.as_mut() {
        exprs = exprs
            .iter()
            .map(|e| rewriter.rewrite(e))
            .collect::<QueryResult<Vec<_>>>()?;
        if let Some(having_expr) = &stmt.having {
            having = Some(rewriter.rewrite(&scope.bind_expression(having_expr)?)?);
        }
    }

    // Resolve ORDER BY items; anything that is not an output column is
    // computed as a hidden projection column
    let mut order_by = Vec::with_capacity(stmt.order_by.len());
    let mut hidden = Vec::new();
    for OrderByItem { expr, descending } in &stmt.order_by {
        let key = match expr {
            Expression::Literal(Value::Integer(position)) => {
                let index = usize::try_from(*position)
                    .ok()
                    .filter(|p| (1..=names.len()).contains(p))
                    .ok_or_else(|| {
                        QueryError::PlanningError(format!("ORDER BY position {} is not in select list", position))
                    })?;
                key_ref(&names[index - 1])
            }
            Expression::Column(ColumnReference { table: None, name })
                if names.iter().any(|n| n.eq_ignore_ascii_case(name)) =>
            {
                let output = names
                    .iter()
                    .find(|n| *n == name)
                    .or_else(|| names.iter().find(|n| n.eq_ignore_ascii_case(name)))
                    .ok_or_else(|| QueryError::ColumnNotFound(name.clone()))?;
                key_ref(output)
            }
            other => {
                let bound = scope.bind_expression(other)?;
                let computed = match rewriter.as_mut() {
                    Some(rewriter) => rewriter.rewrite(&bound)?,
                    None => bound,
                };
                let hidden_key = format!("#sort{}", hidden.len());
                hidden.push((hidden_key.clone(), computed));
                key_ref(&hidden_key)
            }
        };
        order_by.push((key, *descending));
    }

    if let Some(rewriter) = rewriter {
        let group_by = rewriter
            .group_exprs
            .into_iter()
            .enumerate()
            .map(|(i, e)| (AggregateRewriter::group_key(i), e))
            .collect();
        plan = LogicalPlan::Aggregate {
            group_by,
            aggregates: rewriter.aggregates,
            input: Box::new(plan),
        };
        if let Some(predicate) = having {
            plan = LogicalPlan::Filter {
                predicate,
                input: Box::new(plan),
            };
        }
    }

    let has_hidden = !hidden.is_empty();
    let mut columns: Vec<(String, Expression)> = names.iter().cloned().zip(exprs).collect();
    columns.extend(hidden);
    plan = LogicalPlan::Projection {
        columns,
        input: Box::new(plan),
    };

    if !order_by.is_empty() {
        plan = LogicalPlan::Sort {
            order_by,
            input: Box::new(plan),
        };
    }

    if stmt.limit.is_some() || stmt.offset.is_some() {
        plan = LogicalPlan::Limit {
            limit: stmt.limit,
            offset: stmt.offset.unwrap_or(0),
            input: Box::new(plan),
        };
    }

    // Drop the hidden sort keys from the final rows
    if has_hidden {
        plan = LogicalPlan::Projection {
            columns: names.iter().map(|n| (n.clone(), key_ref(n))).collect(),
            input: Box::new(plan),
        };
    }

    Ok(plan)
}
