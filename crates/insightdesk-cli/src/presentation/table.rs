use insightdesk_engine::{DisplayValue, EMPTY_MARKER, UnlockPlaceholder, resolve};
use insightdesk_types::Record;
use owo_colors::OwoColorize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Plain,
    Muted,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: CellStyle::Plain,
        }
    }

    fn with_style(text: impl Into<String>, style: CellStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// What one record shows under `column`. Absent fields read as missing.
    pub fn for_field(record: &Record, column: &str) -> Self {
        let Some(field) = record.field(column) else {
            return Self::with_style(EMPTY_MARKER, CellStyle::Muted);
        };
        match resolve(field, || {}, None) {
            DisplayValue::Text(text) => Self::plain(text.replace('\n', " ")),
            DisplayValue::Empty => Self::with_style(EMPTY_MARKER, CellStyle::Muted),
            DisplayValue::Locked(_) => Self::with_style(UnlockPlaceholder::LABEL, CellStyle::Locked),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.style == CellStyle::Locked
    }

    pub fn to_json(&self) -> Value {
        match self.style {
            CellStyle::Plain => Value::String(self.text.clone()),
            CellStyle::Muted => Value::Null,
            CellStyle::Locked => json!({ "locked": true }),
        }
    }
}

/// Left-aligned columns separated by two spaces.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let width = cell.text.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    pub fn render(&self, color: bool) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(text, width)| {
                let padded = format!("{:<width$}", text, width = width);
                if color {
                    padded.bold().to_string()
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');

        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let padded = format!("{:<width$}", cell.text, width = width);
                    match (color, cell.style) {
                        (false, _) | (true, CellStyle::Plain) => padded,
                        (true, CellStyle::Muted) => padded.dimmed().to_string(),
                        (true, CellStyle::Locked) => padded.yellow().to_string(),
                    }
                })
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}
