//! Bookkeeping for tab-delimited tables.
//!
//! Rows of a tab table have as many cells as their line has TABs, so the
//! widest row is only known once the table closes. Each row remembers where
//! its last `<td` tag was written; on close every shorter row gets a
//! `colspan` spliced into that tag so all rows reach the widest column.

/// Last cell of one table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowInfo {
    /// Column index of the last cell
    pub last_column: usize,
    /// Byte offset in the output where the attribute is inserted
    pub last_cell_offset: usize,
}

/// State of the open tab table.
#[derive(Debug, Default)]
pub(crate) struct TabTable {
    column: usize,
    max_column: usize,
    rows: Vec<RowInfo>,
    current: Option<RowInfo>,
}

impl TabTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a row whose first `<td` ends at `offset`.
    pub fn start_row(&mut self, offset: usize) {
        if let Some(row) = self.current.take() {
            self.rows.push(row);
        }
        self.current = Some(RowInfo {
            last_column: 0,
            last_cell_offset: offset,
        });
        self.column = 0;
    }

    /// Move to the next cell, whose tag ends at `offset`. Returns its column.
    pub fn next_cell(&mut self, offset: usize) -> usize {
        self.column += 1;
        let row = self.current.get_or_insert(RowInfo {
            last_column: 0,
            last_cell_offset: offset,
        });
        row.last_column = self.column;
        row.last_cell_offset = offset;
        self.max_column = self.max_column.max(self.column);
        self.column
    }

    /// Close the table, inserting colspans into `out`.
    pub fn finish(mut self, out: &mut String) {
        if let Some(row) = self.current.take() {
            self.rows.push(row);
        }
        correct_colspans(out, &self.rows, self.max_column);
    }
}

/// Insert ` colspan=N` for every row narrower than `max_column`.
///
/// Rows are handled last to first so earlier offsets stay valid.
pub(crate) fn correct_colspans(out: &mut String, rows: &[RowInfo], max_column: usize) {
    for row in rows.iter().rev() {
        if max_column > row.last_column && out.is_char_boundary(row.last_cell_offset) {
            let span = max_column - row.last_column + 1;
            out.insert_str(row.last_cell_offset, &format!(" colspan={}", span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_rows_widened() {
        // Row 0: two cells, row 1: three cells, row 2: one cell
        let mut out = String::from("<td>a</td><td>b\n<td>c</td><td>d</td><td>e\n<td>f");
        let rows = [
            RowInfo { last_column: 1, last_cell_offset: 13 },
            RowInfo { last_column: 2, last_cell_offset: 39 },
            RowInfo { last_column: 0, last_cell_offset: 45 },
        ];
        correct_colspans(&mut out, &rows, 2);
        assert_eq!(
            out,
            "<td>a</td><td colspan=2>b\n<td>c</td><td>d</td><td>e\n<td colspan=3>f"
        );
    }

    #[test]
    fn test_single_row_untouched() {
        let mut table = TabTable::new();
        let mut out = String::from("<td");
        table.start_row(out.len());
        out.push_str(">Hello</td><td>");
        let column = table.next_cell(out.len() - 1);
        assert_eq!(column, 1);
        out.push_str("World");
        let before = out.clone();
        table.finish(&mut out);
        assert_eq!(out, before);
    }

    #[test]
    fn test_rows_recorded_across_start_row() {
        let mut table = TabTable::new();
        let mut out = String::from("<td");
        table.start_row(3);
        out.push_str(">a</td><td>b</td></tr><tr><td");
        table.next_cell(13);
        table.start_row(out.len());
        out.push_str(">c");
        table.finish(&mut out);
        assert!(out.ends_with("<td colspan=2>c"));
    }
}
