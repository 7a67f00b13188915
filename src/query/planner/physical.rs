// Physical Query Plan Implementation
//
// This module defines the physical plan representation for query execution.
// The only physical choice is the join algorithm: joins whose condition
// contains equalities between the two sides run as hash joins, everything
// else as nested loops.

use std::fmt;

use log::debug;

use crate::query::executor::operators::agg::AggregateCall;
use crate::query::parser::ast::{Expression, JoinType, Operator as AstOperator};
use crate::query::planner::logical::LogicalPlan;

/// Represents a node in the physical query plan
#[derive(Debug, Clone)]
pub enum PhysicalPlan {
    /// Table scan operator (sequential scan)
    SeqScan {
        table_name: String,
        qualifier: String,
        columns: Vec<String>,
    },
    /// Filter operator (selection)
    Filter {
        input: Box<PhysicalPlan>,
        predicate: Expression,
    },
    /// Projection operator
    Project {
        input: Box<PhysicalPlan>,
        columns: Vec<(String, Expression)>,
    },
    /// Nested Loop Join operator
    NestedLoopJoin {
        left: Box<PhysicalPlan>,
        right: Box<PhysicalPlan>,
        condition: Option<Expression>,
        join_type: JoinType,
    },
    /// Hash Join operator
    HashJoin {
        /// Left input plan (probe side)
        left: Box<PhysicalPlan>,
        /// Right input plan (build side)
        right: Box<PhysicalPlan>,
        /// Equality key pairs (left expression, right expression)
        keys: Vec<(Expression, Expression)>,
        /// Rest of the join condition
        residual: Option<Expression>,
        join_type: JoinType,
    },
    /// Hash Aggregate operator
    HashAggregate {
        input: Box<PhysicalPlan>,
        group_by: Vec<(String, Expression)>,
        aggregates: Vec<AggregateCall>,
    },
    /// Sort operator
    Sort {
        input: Box<PhysicalPlan>,
        order_by: Vec<(Expression, bool)>,
    },
    /// Limit operator
    Limit {
        input: Box<PhysicalPlan>,
        limit: Option<u64>,
        offset: u64,
    },
}

impl PhysicalPlan {
    /// Keys of the rows produced by this plan node
    pub fn output_columns(&self) -> Vec<String> {
        match self {
            PhysicalPlan::SeqScan { columns, .. } => columns.clone(),
            PhysicalPlan::Filter { input, .. }
            | PhysicalPlan::Sort { input, .. }
            | PhysicalPlan::Limit { input, .. } => input.output_columns(),
            PhysicalPlan::Project { columns, .. } => columns.iter().map(|(name, _)| name.clone()).collect(),
            PhysicalPlan::NestedLoopJoin { left, right, .. } | PhysicalPlan::HashJoin { left, right, .. } => {
                let mut columns = left.output_columns();
                columns.extend(right.output_columns());
                columns
            }
            PhysicalPlan::HashAggregate { group_by, aggregates, .. } => group_by
                .iter()
                .map(|(key, _)| key.clone())
                .chain(aggregates.iter().map(|agg| agg.output_key.clone()))
                .collect(),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            PhysicalPlan::SeqScan { table_name, qualifier, .. } if table_name == qualifier => {
                writeln!(f, "{}SeqScan: {}", indent, table_name)
            }
            PhysicalPlan::SeqScan { table_name, qualifier, .. } => {
                writeln!(f, "{}SeqScan: {} as {}", indent, table_name, qualifier)
            }
            PhysicalPlan::Filter { input, predicate } => {
                writeln!(f, "{}Filter: {}", indent, predicate)?;
                input.fmt_indented(f, depth + 1)
            }
            PhysicalPlan::Project { input, columns } => {
                let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
                writeln!(f, "{}Project: {}", indent, names.join(", "))?;
                input.fmt_indented(f, depth + 1)
            }
            PhysicalPlan::NestedLoopJoin { left, right, condition, join_type } => {
                match condition {
                    Some(c) => writeln!(f, "{}NestedLoopJoin ({:?}): {}", indent, join_type, c)?,
                    None => writeln!(f, "{}NestedLoopJoin ({:?})", indent, join_type)?,
                }
                left.fmt_indented(f, depth + 1)?;
                right.fmt_indented(f, depth + 1)
            }
            PhysicalPlan::HashJoin { left, right, keys, residual, join_type } => {
                let keys: Vec<String> = keys.iter().map(|(l, r)| format!("{} = {}", l, r)).collect();
                write!(f, "{}HashJoin ({:?}): {}", indent, join_type, keys.join(", "))?;
                if let Some(residual) = residual {
                    write!(f, " residual {}", residual)?;
                }
                writeln!(f)?;
                left.fmt_indented(f, depth + 1)?;
                right.fmt_indented(f, depth + 1)
            }
            PhysicalPlan::HashAggregate { input, group_by, aggregates } => {
                let groups: Vec<String> = group_by.iter().map(|(_, e)| e.to_string()).collect();
                let aggs: Vec<String> = aggregates.iter().map(|a| a.to_string()).collect();
                writeln!(f, "{}HashAggregate: [{}] GROUP BY [{}]", indent, aggs.join(", "), groups.join(", "))?;
                input.fmt_indented(f, depth + 1)
            }
            PhysicalPlan::Sort { input, order_by } => {
                let keys: Vec<String> = order_by
                    .iter()
                    .map(|(e, desc)| format!("{} {}", e, if *desc { "DESC" } else { "ASC" }))
                    .collect();
                writeln!(f, "{}Sort: {}", indent, keys.join(", "))?;
                input.fmt_indented(f, depth + 1)
            }
            PhysicalPlan::Limit { input, limit, offset } => {
                match limit {
                    Some(limit) => writeln!(f, "{}Limit: {} offset {}", indent, limit, offset)?,
                    None => writeln!(f, "{}Limit: all offset {}", indent, offset)?,
                }
                input.fmt_indented(f, depth + 1)
            }
        }
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Convert a logical plan into a physical plan
pub fn create_physical_plan(logical_plan: &LogicalPlan) -> PhysicalPlan {
    match logical_plan {
        LogicalPlan::Scan { table_name, qualifier, columns } => PhysicalPlan::SeqScan {
            table_name: table_name.clone(),
            qualifier: qualifier.clone(),
            columns: columns.clone(),
        },
        LogicalPlan::Filter { predicate, input } => PhysicalPlan::Filter {
            input: Box::new(create_physical_plan(input)),
            predicate: predicate.clone(),
        },
        LogicalPlan::Projection { columns, input } => PhysicalPlan::Project {
            input: Box::new(create_physical_plan(input)),
            columns: columns.clone(),
        },
        LogicalPlan::Join { left, right, condition, join_type } => {
            let left = create_physical_plan(left);
            let right = create_physical_plan(right);
            create_join(left, right, condition.as_ref(), *join_type)
        }
        LogicalPlan::Aggregate { group_by, aggregates, input } => PhysicalPlan::HashAggregate {
            input: Box::new(create_physical_plan(input)),
            group_by: group_by.clone(),
            aggregates: aggregates.clone(),
        },
        LogicalPlan::Sort { order_by, input } => PhysicalPlan::Sort {
            input: Box::new(create_physical_plan(input)),
            order_by: order_by.clone(),
        },
        LogicalPlan::Limit { limit, offset, input } => PhysicalPlan::Limit {
            input: Box::new(create_physical_plan(input)),
            limit: *limit,
            offset: *offset,
        },
    }
}

/// Pick the join algorithm for a join condition
fn create_join(
    left: PhysicalPlan,
    right: PhysicalPlan,
    condition: Option<&Expression>,
    join_type: JoinType,
) -> PhysicalPlan {
    let Some(condition) = condition else {
        return PhysicalPlan::NestedLoopJoin {
            left: Box::new(left),
            right: Box::new(right),
            condition: None,
            join_type,
        };
    };

    let left_columns = left.output_columns();
    let right_columns = right.output_columns();

    let mut keys = Vec::new();
    let mut residual = Vec::new();
    for conjunct in split_conjuncts(condition) {
        match equi_key(&conjunct, &left_columns, &right_columns) {
            Some(key) => keys.push(key),
            None => residual.push(conjunct),
        }
    }

    if keys.is_empty() {
        debug!("No equality keys in join condition {}, using nested loop join", condition);
        return PhysicalPlan::NestedLoopJoin {
            left: Box::new(left),
            right: Box::new(right),
            condition: Some(condition.clone()),
            join_type,
        };
    }

    PhysicalPlan::HashJoin {
        left: Box::new(left),
        right: Box::new(right),
        keys,
        residual: combine_conjuncts(residual),
        join_type,
    }
}

/// Split an expression on top-level ANDs
pub fn split_conjuncts(expr: &Expression) -> Vec<Expression> {
    match expr {
        Expression::BinaryOp { left, op: AstOperator::And, right } => {
            let mut conjuncts = split_conjuncts(left);
            conjuncts.extend(split_conjuncts(right));
            conjuncts
        }
        other => vec![other.clone()],
    }
}

/// Join conjuncts back together with AND
pub fn combine_conjuncts(conjuncts: Vec<Expression>) -> Option<Expression> {
    conjuncts.into_iter().reduce(|left, right| Expression::BinaryOp {
        left: Box::new(left),
        op: AstOperator::And,
        right: Box::new(right),
    })
}

/// Row keys referenced by an expression
pub fn referenced_columns(expr: &Expression) -> Vec<String> {
    let mut keys = Vec::new();
    collect_columns(expr, &mut keys);
    keys
}

fn collect_columns(expr: &Expression, keys: &mut Vec<String>) {
    match expr {
        Expression::Column(col_ref) => keys.push(col_ref.key()),
        Expression::Literal(_) => {}
        Expression::BinaryOp { left, right, .. } => {
            collect_columns(left, keys);
            collect_columns(right, keys);
        }
        Expression::UnaryOp { expr, .. } | Expression::IsNull { expr, .. } => collect_columns(expr, keys),
        Expression::Aggregate { arg, .. } => {
            if let Some(arg) = arg {
                collect_columns(arg, keys);
            }
        }
        Expression::Case { operand, when_then_clauses, else_clause } => {
            if let Some(operand) = operand {
                collect_columns(operand, keys);
            }
            for (when, then) in when_then_clauses {
                collect_columns(when, keys);
                collect_columns(then, keys);
            }
            if let Some(else_clause) = else_clause {
                collect_columns(else_clause, keys);
            }
        }
    }
}

/// If a conjunct is `l = r` with one side drawn only from the left input
/// and the other only from the right input, return it as a key pair
fn equi_key(conjunct: &Expression, left_columns: &[String], right_columns: &[String]) -> Option<(Expression, Expression)> {
    let Expression::BinaryOp { left, op: AstOperator::Equals, right } = conjunct else {
        return None;
    };

    let only_from = |expr: &Expression, columns: &[String]| {
        let keys = referenced_columns(expr);
        !keys.is_empty() && keys.iter().all(|k| columns.contains(k))
    };

    if only_from(left, left_columns) && only_from(right, right_columns) {
        Some((left.as_ref().clone(), right.as_ref().clone()))
    } else if only_from(right, left_columns) && only_from(left, right_columns) {
        Some((right.as_ref().clone(), left.as_ref().clone()))
    } else {
        None
    }
}
