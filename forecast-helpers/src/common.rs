use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// A single spreadsheet cell, as delivered by whatever parsed the file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Returns the numeric value of the cell.
    ///
    /// Text is accepted when its trimmed content parses as a number.
    /// Empty cells and non-finite values are never numeric.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(x) => *x,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Returns the cell rendered as a period label (`1.0` becomes `"1"`).
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Number(x) => Some(x.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Empty => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(x) => write!(f, "{}", x),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Number(x)
    }
}

impl From<i32> for Cell {
    fn from(x: i32) -> Self {
        Cell::Number(x.into())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

/// One row of the raw table: column name to cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    cells: HashMap<String, Cell>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literal rows.
    pub fn with(mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.insert(column, cell);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        self.cells.insert(column.into(), cell.into());
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, C: Into<Cell>> FromIterator<(K, C)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, cell) in iter {
            record.insert(column, cell);
        }
        record
    }
}

/// The table exactly as it was read, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    rows: Vec<Record>,
}

impl RawDataset {
    pub fn new(rows: Vec<Record>) -> Self {
        RawDataset { rows }
    }

    pub fn push(&mut self, row: Record) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Record> for RawDataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        RawDataset::new(iter.into_iter().collect())
    }
}
