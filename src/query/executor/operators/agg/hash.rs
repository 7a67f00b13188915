// Hash-based Aggregation Operator
//
// This operator implements aggregation using a hash table to group rows.
// Groups are emitted in the order their first row was seen.

use linked_hash_map::LinkedHashMap;
use log::debug;

use super::{Accumulator, AggregateCall};
use crate::query::executor::expression_eval::evaluate_expression;
use crate::query::executor::operators::{BoxedOperator, Operator};
use crate::query::executor::result::{DataValue, QueryResult, Row};
use crate::query::parser::ast::Expression;

/// Hash aggregate operator that groups rows and computes aggregates
pub struct HashAggregateOperator<'a> {
    /// Input operator
    input: BoxedOperator<'a>,
    /// Group by expressions with the keys their values are emitted under
    group_by: Vec<(String, Expression)>,
    /// Aggregates to compute per group
    aggregates: Vec<AggregateCall>,
    /// Result rows, produced on the first call to next()
    output_iter: Option<std::vec::IntoIter<Row>>,
}

impl<'a> HashAggregateOperator<'a> {
    /// Create a new hash aggregate operator
    pub fn new(
        input: BoxedOperator<'a>,
        group_by: Vec<(String, Expression)>,
        aggregates: Vec<AggregateCall>,
    ) -> Self {
        HashAggregateOperator {
            input,
            group_by,
            aggregates,
            output_iter: None,
        }
    }

    fn new_accumulators(&self) -> Vec<Accumulator> {
        self.aggregates.iter().map(|agg| Accumulator::new(agg.function)).collect()
    }

    /// Consume the input and compute one output row per group
    fn aggregate_input(&mut self) -> QueryResult<Vec<Row>> {
        let mut groups: LinkedHashMap<Vec<DataValue>, Vec<Accumulator>> = LinkedHashMap::new();

        while let Some(row) = self.input.next()? {
            let key = self
                .group_by
                .iter()
                .map(|(_, expr)| evaluate_expression(expr, &row).map(DataValue::canonicalized))
                .collect::<QueryResult<Vec<_>>>()?;

            let accumulators = groups.entry(key).or_insert_with(|| self.new_accumulators());

            for (agg, acc) in self.aggregates.iter().zip(accumulators.iter_mut()) {
                match &agg.arg {
                    Some(arg) => acc.update(Some(&evaluate_expression(arg, &row)?))?,
                    None => acc.update(None)?,
                }
            }
        }

        // Without GROUP BY an empty input still yields one row
        if groups.is_empty() && self.group_by.is_empty() {
            groups.insert(Vec::new(), self.new_accumulators());
        }

        debug!("Hash aggregate produced {} groups", groups.len());

        let rows = groups
            .into_iter()
            .map(|(key, accumulators)| {
                let mut row = Row::new();
                for ((name, _), value) in self.group_by.iter().zip(key) {
                    row.set(name.clone(), value);
                }
                for (agg, acc) in self.aggregates.iter().zip(&accumulators) {
                    row.set(agg.output_key.clone(), acc.finish());
                }
                row
            })
            .collect();

        Ok(rows)
    }
}

impl Operator for HashAggregateOperator<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.output_iter = None;
        self.input.init()
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        if self.output_iter.is_none() {
            let rows = self.aggregate_input()?;
            self.output_iter = Some(rows.into_iter());
        }

        Ok(self.output_iter.as_mut().and_then(|iter| iter.next()))
    }

    fn close(&mut self) -> QueryResult<()> {
        self.output_iter = None;
        self.input.close()
    }
}

/// Create a hash aggregate operator
pub fn create_hash_aggregate<'a>(
    input: BoxedOperator<'a>,
    group_by: Vec<(String, Expression)>,
    aggregates: Vec<AggregateCall>,
) -> BoxedOperator<'a> {
    Box::new(HashAggregateOperator::new(input, group_by, aggregates))
}
