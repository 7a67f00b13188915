// Sort Operator Implementation
//
// Materializes its input and emits it ordered by a list of sort keys.
// The sort is stable, NULLs sort first ascending and last descending.

use std::cmp::Ordering;

use crate::query::executor::expression_eval::evaluate_expression;
use crate::query::executor::operators::{BoxedOperator, Operator};
use crate::query::executor::result::{DataValue, QueryError, QueryResult, Row};
use crate::query::parser::ast::Expression;

pub struct SortOperator<'a> {
    input: BoxedOperator<'a>,
    // Each tuple: (expression_to_extract_sort_key, is_descending)
    order_by: Vec<(Expression, bool)>,
    output_iter: Option<std::vec::IntoIter<Row>>,
}

impl<'a> SortOperator<'a> {
    pub fn new(input: BoxedOperator<'a>, order_by: Vec<(Expression, bool)>) -> Self {
        SortOperator {
            input,
            order_by,
            output_iter: None,
        }
    }

    /// Drain the input and sort it
    fn sort_input(&mut self) -> QueryResult<Vec<Row>> {
        let mut keyed: Vec<(Vec<DataValue>, Row)> = Vec::new();
        while let Some(row) = self.input.next()? {
            let keys = self
                .order_by
                .iter()
                .map(|(expr, _)| evaluate_expression(expr, &row))
                .collect::<QueryResult<Vec<_>>>()?;
            keyed.push((keys, row));
        }

        let mut first_error: Option<QueryError> = None;
        keyed.sort_by(|(a, _), (b, _)| {
            for (i, (_, is_desc)) in self.order_by.iter().enumerate() {
                match a[i].compare(&b[i]) {
                    Ok(Ordering::Equal) => continue,
                    Ok(ord) => return if *is_desc { ord.reverse() } else { ord },
                    Err(e) => {
                        first_error.get_or_insert(e);
                        return Ordering::Equal;
                    }
                }
            }
            Ordering::Equal
        });

        match first_error {
            Some(e) => Err(e),
            None => Ok(keyed.into_iter().map(|(_, row)| row).collect()),
        }
    }
}

impl Operator for SortOperator<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.output_iter = None;
        self.input.init()
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        if self.output_iter.is_none() {
            let sorted = self.sort_input()?;
            self.output_iter = Some(sorted.into_iter());
        }

        Ok(self.output_iter.as_mut().and_then(|iter| iter.next()))
    }

    fn close(&mut self) -> QueryResult<()> {
        self.output_iter = None;
        self.input.close()
    }
}
