// Frame Rendering
//
// Frames print the way dataframe libraries print them: a left-aligned row
// index, then every column right-aligned under its header, two spaces apart.

use std::fmt;

use super::DataFrame;

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.num_rows() == 0 {
            writeln!(f, "Empty DataFrame")?;
            writeln!(f, "Columns: [{}]", self.columns().join(", "))?;
            return write!(f, "Index: []");
        }

        let num_rows = self.num_rows();
        let index_width = (num_rows - 1).to_string().len();

        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|(_, series)| series.iter().map(|v| v.to_string()).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|((name, _), column)| {
                column.iter().map(|c| c.chars().count()).max().unwrap_or(0).max(name.chars().count())
            })
            .collect();

        write!(f, "{:width$}", "", width = index_width)?;
        for ((name, _), width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = width)?;
        }

        for row in 0..num_rows {
            writeln!(f)?;
            write!(f, "{:<width$}", row, width = index_width)?;
            for (column, width) in cells.iter().zip(&widths) {
                write!(f, "  {:>width$}", column[row], width = width)?;
            }
        }
        Ok(())
    }
}
