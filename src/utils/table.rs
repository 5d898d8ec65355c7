//! Fixed-layout text tables for the `records` view.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub header: String,
    /// Minimum width; grows to fit the widest cell.
    pub width: usize,
    pub align: Align,
}

impl Column {
    pub fn left(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
            align: Align::Left,
        }
    }

    /// Numeric column.
    pub fn right(header: &str, width: usize) -> Self {
        Self {
            header: header.to_string(),
            width,
            align: Align::Right,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain([col.width, col.header.chars().count()])
                    .max()
                    .unwrap_or(col.width)
            })
            .collect()
    }

    fn push_line<'a>(&self, out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
        let mut line = String::from("  ");
        for ((col, width), cell) in self.columns.iter().zip(widths).zip(cells) {
            match col.align {
                Align::Left => line.push_str(&format!("{:<w$}  ", cell, w = width)),
                Align::Right => line.push_str(&format!("{:>w$}  ", cell, w = width)),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    /// Header, a dashed rule, then one line per row. Missing cells render empty.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        self.push_line(&mut out, &widths, self.columns.iter().map(|c| c.header.as_str()));

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.push_line(&mut out, &widths, rule.iter().map(String::as_str));

        for row in &self.rows {
            let cells = (0..self.columns.len()).map(|i| row.get(i).map(String::as_str).unwrap_or(""));
            self.push_line(&mut out, &widths, cells);
        }

        out
    }
}
