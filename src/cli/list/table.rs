//! Column-aligned plain text tables.
//!
//! Header cells never contain whitespace so that the output can be split with
//! `awk` or `cut`. Body cells may, at the cost of that property.

use std::fmt::{self, Write};

pub(crate) struct Row {
    cells: Vec<String>,
}

impl Row {
    fn is_awk_safe(&self) -> bool {
        !self
            .cells
            .iter()
            .any(|cell| cell.contains(char::is_whitespace))
    }

    fn columns(&self) -> usize {
        self.cells.len()
    }
}

impl From<Vec<String>> for Row {
    fn from(cells: Vec<String>) -> Self {
        Row { cells }
    }
}

impl From<Vec<&str>> for Row {
    fn from(cells: Vec<&str>) -> Self {
        Row {
            cells: cells.into_iter().map(str::to_owned).collect(),
        }
    }
}

pub(crate) struct Table {
    header: Option<Row>,
    body: Vec<Row>,
    print_header: bool,
}

impl Table {
    pub(crate) fn new() -> Table {
        Table {
            header: None,
            body: Vec::new(),
            print_header: true,
        }
    }

    fn num_columns(&self) -> Option<usize> {
        self.header
            .iter()
            .chain(self.body.iter())
            .next()
            .map(Row::columns)
    }

    fn check_columns(&self, row: &Row) {
        if let Some(n) = self.num_columns() {
            assert_eq!(n, row.columns(), "table rows must have the same number of columns");
        }
    }

    pub(crate) fn print_header(&mut self, print_header: bool) {
        self.print_header = print_header;
    }

    pub(crate) fn add_row<R: Into<Row>>(&mut self, row: R) {
        let row = row.into();

        self.check_columns(&row);

        self.body.push(row);
    }

    pub(crate) fn set_header<R: Into<Row>>(&mut self, header: R) {
        let header = header.into();

        self.check_columns(&header);
        assert!(header.is_awk_safe(), "table header contains whitespace");

        self.header = Some(header);
    }

    fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        let header = match self.print_header {
            true => self.header.as_ref(),
            false => None,
        };

        header.into_iter().chain(self.body.iter())
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0usize; self.num_columns().unwrap_or(0)];

        for row in self.visible_rows() {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        for row in self.visible_rows() {
            let last = row.cells.len().saturating_sub(1);

            for (i, cell) in row.cells.iter().enumerate() {
                if i == last {
                    f.write_str(cell)?;
                } else {
                    write!(f, "{:<width$}  ", cell, width = widths[i])?;
                }
            }

            f.write_char('\n')?;
        }

        Ok(())
    }
}

pub(crate) trait IntoTable: Into<Table> + Sized {
    fn into_table(self) -> Table {
        self.into()
    }
}

impl<T> IntoTable for T where T: Into<Table> + Sized {}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut tab = Table::new();

        tab.set_header(vec!["SOURCE", "STATUS"]);
        tab.add_row(vec!["catalog", "ok"]);
        tab.add_row(vec!["ollama", "failed"]);

        tab
    }

    #[test]
    fn test_aligned_columns() {
        assert_eq!(
            table().to_string(),
            "SOURCE   STATUS\ncatalog  ok\nollama   failed\n"
        );
    }

    #[test]
    fn test_headerless() {
        let mut tab = table();
        tab.print_header(false);

        assert_eq!(tab.to_string(), "catalog  ok\nollama   failed\n");
    }

    #[test]
    #[should_panic]
    fn test_header_with_whitespace() {
        Table::new().set_header(vec!["MODEL ID"]);
    }

    #[test]
    #[should_panic]
    fn test_mismatched_columns() {
        let mut tab = table();
        tab.add_row(vec!["openai"]);
    }
}
