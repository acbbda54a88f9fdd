//! Plain-text rendering of search results.
//!
//! The results area holds the rows of the most recent search or list call
//! and is fully replaced on each one. Columns are sized from content so the
//! table stays aligned for any record, including wide characters.

use suppliers_types::Supplier;
use unicode_width::UnicodeWidthStr;

const HEADERS: [&str; 5] = ["ID", "Name", "Address", "Email", "Products"];

/// Shown when the table has no rows.
pub const EMPTY_TABLE_PLACEHOLDER: &str = "No results to display";

#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    rows: Vec<Supplier>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table contents wholesale.
    pub fn replace(&mut self, rows: Vec<Supplier>) {
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn rows(&self) -> &[Supplier] {
        &self.rows
    }

    pub fn first(&self) -> Option<&Supplier> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as aligned text: a header line, a separator, one line per row.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_TABLE_PLACEHOLDER.to_string();
        }

        let cells: Vec<[String; 5]> = self
            .rows
            .iter()
            .map(|s| {
                [
                    s.id.to_string(),
                    s.name.clone(),
                    s.address.clone(),
                    s.email.clone(),
                    s.products_display(),
                ]
            })
            .collect();

        let mut widths: [usize; 5] = HEADERS.map(UnicodeWidthStr::width);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.width());
            }
        }

        let mut out = String::new();
        push_row(&mut out, &HEADERS.map(str::to_string), &widths);
        let rule_width = widths.iter().sum::<usize>() + (widths.len() - 1) * 2;
        out.push_str(&"-".repeat(rule_width));
        out.push('\n');
        for row in &cells {
            push_row(&mut out, row, &widths);
        }
        out.pop(); // no trailing newline
        out
    }
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    for (index, (cell, width)) in cells.iter().zip(widths.iter()).enumerate() {
        out.push_str(cell);
        if index + 1 < cells.len() {
            let pad = width.saturating_sub(cell.width()) + 2;
            out.push_str(&" ".repeat(pad));
        }
    }
    out.push('\n');
}
