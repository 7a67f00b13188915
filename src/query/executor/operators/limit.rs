// Limit Operator Implementation
//
// Skips `offset` rows and then emits at most `limit` rows.

use crate::query::executor::operators::{BoxedOperator, Operator};
use crate::query::executor::result::{QueryResult, Row};

pub struct LimitOperator<'a> {
    input: BoxedOperator<'a>,
    limit: Option<u64>,
    offset: u64,
    skipped: u64,
    emitted: u64,
}

impl<'a> LimitOperator<'a> {
    pub fn new(input: BoxedOperator<'a>, limit: Option<u64>, offset: u64) -> Self {
        LimitOperator {
            input,
            limit,
            offset,
            skipped: 0,
            emitted: 0,
        }
    }
}

impl Operator for LimitOperator<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.skipped = 0;
        self.emitted = 0;
        self.input.init()
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        if self.limit.is_some_and(|limit| self.emitted >= limit) {
            return Ok(None);
        }

        while self.skipped < self.offset {
            if self.input.next()?.is_none() {
                return Ok(None);
            }
            self.skipped += 1;
        }

        let row = self.input.next()?;
        if row.is_some() {
            self.emitted += 1;
        }
        Ok(row)
    }

    fn close(&mut self) -> QueryResult<()> {
        self.input.close()
    }
}
