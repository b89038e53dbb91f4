//! Terminal UI utilities.
//!
//! A responsive table with Unicode box-drawing characters, sized to the
//! stderr terminal since that is where status output goes.
//!
//! ## Example
//!
//! ```rust
//! use modtree::ui::Table;
//!
//! let mut table = Table::new(&["Name", "Value"]);
//! table.add_row(vec!["key".to_string(), "value".to_string()]);
//! eprint!("{}", table.render());
//! ```

use colored::*;
use std::cmp;
use std::fmt::Write;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    max_width: usize,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        let (_term_height, term_width) = console::Term::stderr().size();
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
            max_width: term_width as usize,
        }
    }

    /// Override the width the table is fitted into.
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.headers.is_empty() {
            return out;
        }

        let col_widths = self.column_widths();

        let make_sep = |left: &str, mid: &str, right: &str| -> String {
            let mut s = String::from("  ");
            s.push_str(left);
            for (i, width) in col_widths.iter().enumerate() {
                s.push_str(&"─".repeat(width + 2));
                if i < col_widths.len() - 1 {
                    s.push_str(mid);
                }
            }
            s.push_str(right);
            s
        };

        let _ = writeln!(out, "{}", make_sep("┌", "┬", "┐"));

        out.push_str("  │");
        for (header, &width) in self.headers.iter().zip(&col_widths) {
            let truncated = console::truncate_str(header, width, "...");
            let padding = width.saturating_sub(console::measure_text_width(&truncated));
            let _ = write!(out, " {} {}│", truncated.bold(), " ".repeat(padding));
        }
        out.push('\n');

        let _ = writeln!(out, "{}", make_sep("├", "┼", "┤"));

        for row in &self.rows {
            out.push_str("  │");
            for (cell, &width) in row.iter().zip(&col_widths) {
                let clean = sanitize_content(cell);
                let truncated = console::truncate_str(&clean, width, "...");
                let padding = width.saturating_sub(console::measure_text_width(&truncated));
                let _ = write!(out, " {} {}│", truncated, " ".repeat(padding));
            }
            out.push('\n');
        }

        let _ = writeln!(out, "{}", make_sep("└", "┴", "┘"));
        out
    }

    /// Widest cell per column, shrunk (widest first, never below 8) until
    /// the table fits the terminal.
    fn column_widths(&self) -> Vec<usize> {
        let mut col_widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let clean_len = console::measure_text_width(&sanitize_content(cell));
                col_widths[i] = cmp::max(col_widths[i], clean_len);
            }
        }

        let overhead = 3 + 3 * self.headers.len();
        let available = self.max_width.saturating_sub(overhead);
        let mut current: usize = col_widths.iter().sum();

        while current > available {
            let Some((idx, &widest)) = col_widths.iter().enumerate().max_by_key(|(_, w)| **w)
            else {
                break;
            };
            if widest <= 8 {
                break;
            }
            col_widths[idx] -= 1;
            current -= 1;
        }

        col_widths
    }
}

fn sanitize_content(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
