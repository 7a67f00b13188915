//! Demonstration Data
//!
//! The sample frames used by the demo programs and by `tabula --demo`.

use crate::frame::{DataFrame, FrameResult};
use crate::query::executor::result::QueryResult;
use crate::session::Session;

/// Nine sales values spread over categories A, B and C
pub fn sales_data() -> FrameResult<DataFrame> {
    crate::frame! {
        "category" => vec!["A", "B", "C", "A", "B", "C", "A", "B", "C"],
        "value" => vec![10_i64, 20, 30, 40, 50, 60, 70, 80, 90],
    }
}

/// Duck sightings per species
pub fn bird_sightings() -> FrameResult<DataFrame> {
    crate::frame! {
        "species" => vec!["Mallard", "Wood Duck", "Gadwall", "Pintail"],
        "count" => vec![42_i64, 17, 9, 31],
    }
}

/// Register `data` and `bird_sightings` with a session
pub fn load_demo_tables(session: &mut Session) -> QueryResult<()> {
    session.register("data", sales_data()?)?;
    session.register("bird_sightings", bird_sightings()?)?;
    Ok(())
}
