//! Control/test group tables loaded from a workbook or CSV files
//!
//! Each group is one table with the columns Impression, Click, Purchase and
//! Earning. Headers are matched case-insensitively; any other columns (for
//! example an unnamed index column) are ignored. Empty cells load as NaN and
//! are dropped later, per metric, when a sample is drawn.

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a group table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to open workbook {path}: {reason}")]
    Workbook { path: PathBuf, reason: String },

    #[error("Sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("'{0}' has no header row")]
    Empty(String),

    #[error("'{source_name}' is missing required column '{column}'")]
    MissingColumn { source_name: String, column: Column },

    #[error("'{source_name}' row {row}, column '{column}': '{value}' is not numeric")]
    InvalidCell {
        source_name: String,
        row: usize,
        column: Column,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for loading operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Experiment arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    /// Maximum bidding (current system)
    Control,
    /// Average bidding (new system)
    Test,
}

impl Group {
    pub fn label(&self) -> &'static str {
        match self {
            Group::Control => "control",
            Group::Test => "test",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw numeric columns shared by both groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Impression,
    Click,
    Purchase,
    Earning,
}

impl Column {
    /// All columns, in the order they are reported
    pub const ALL: [Column; 4] = [
        Column::Impression,
        Column::Click,
        Column::Purchase,
        Column::Earning,
    ];

    /// Header name as it appears in the source table
    pub fn header(&self) -> &'static str {
        match self {
            Column::Impression => "Impression",
            Column::Click => "Click",
            Column::Purchase => "Purchase",
            Column::Earning => "Earning",
        }
    }

    fn matches(&self, header: &str) -> bool {
        header.trim().eq_ignore_ascii_case(self.header())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One independent observation (a day or a campaign run)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub impression: f64,
    pub click: f64,
    pub purchase: f64,
    pub earning: f64,
}

impl Observation {
    pub fn new(impression: f64, click: f64, purchase: f64, earning: f64) -> Self {
        Self {
            impression,
            click,
            purchase,
            earning,
        }
    }

    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::Impression => self.impression,
            Column::Click => self.click,
            Column::Purchase => self.purchase,
            Column::Earning => self.earning,
        }
    }

    fn from_values(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

/// A loaded group table
#[derive(Debug, Clone)]
pub struct Dataset {
    group: Group,
    source: String,
    rows: Vec<Observation>,
}

impl Dataset {
    pub fn new(group: Group, source: impl Into<String>, rows: Vec<Observation>) -> Self {
        Self {
            group,
            source: source.into(),
            rows,
        }
    }

    /// Load one sheet of a spreadsheet (`.xlsx`, `.xls`, `.ods`)
    pub fn from_workbook<P: AsRef<Path>>(path: P, sheet: &str, group: Group) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Workbook {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let names = workbook.sheet_names();
        if !names.iter().any(|name| name == sheet) {
            return Err(LoadError::SheetNotFound {
                sheet: sheet.to_string(),
                available: names.join(", "),
            });
        }

        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| LoadError::Workbook {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| LoadError::Empty(sheet.to_string()))?
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        let indices = column_indices(&header, sheet)?;

        let mut observations = Vec::with_capacity(range.height().saturating_sub(1));
        for (offset, row) in rows.enumerate() {
            // Spreadsheet rows are 1-based and the header occupies row 1
            let row_number = offset + 2;
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }

            let mut values = [f64::NAN; 4];
            for (slot, (column, index)) in values.iter_mut().zip(indices) {
                *slot = match row.get(index) {
                    Some(cell) => cell_value(cell, sheet, row_number, column)?,
                    None => f64::NAN,
                };
            }
            observations.push(Observation::from_values(values));
        }

        tracing::debug!(
            sheet,
            rows = observations.len(),
            "Loaded {} group from workbook",
            group
        );

        Ok(Self::new(group, sheet, observations))
    }

    /// Load a comma-separated file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P, group: Group) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let source = path.display().to_string();
        let dataset = Self::parse_csv(&contents, &source, group)?;

        tracing::debug!(
            path = %path.display(),
            rows = dataset.len(),
            "Loaded {} group from CSV",
            group
        );

        Ok(dataset)
    }

    /// Parse CSV text; `source` names the input in error messages
    pub fn parse_csv(contents: &str, source: &str, group: Group) -> Result<Self> {
        let mut lines = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| LoadError::Empty(source.to_string()))?;
        let header: Vec<String> = split_csv_line(header_line);
        let indices = column_indices(&header, source)?;

        let mut observations = Vec::new();
        for (line_index, line) in lines {
            let fields = split_csv_line(line);
            let mut values = [f64::NAN; 4];
            for (slot, (column, index)) in values.iter_mut().zip(indices) {
                let raw = fields.get(index).map(|s| s.trim()).unwrap_or("");
                *slot = parse_number(raw).ok_or_else(|| LoadError::InvalidCell {
                    source_name: source.to_string(),
                    row: line_index + 1,
                    column,
                    value: raw.to_string(),
                })?;
            }
            observations.push(Observation::from_values(values));
        }

        Ok(Self::new(group, source, observations))
    }

    pub fn group(&self) -> Group {
        self.group
    }

    /// Sheet name or file path this table was read from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw column values, missing cells included as NaN
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows.iter().map(|row| row.get(column)).collect()
    }

    /// Number of missing (empty) cells per column
    pub fn missing_counts(&self) -> Vec<(Column, usize)> {
        Column::ALL
            .iter()
            .map(|&column| {
                let missing = self
                    .rows
                    .iter()
                    .filter(|row| row.get(column).is_nan())
                    .count();
                (column, missing)
            })
            .collect()
    }
}

/// Locate the four required columns in a header row
fn column_indices(header: &[String], source: &str) -> Result<[(Column, usize); 4]> {
    let mut indices = [(Column::Impression, 0); 4];
    for (slot, column) in indices.iter_mut().zip(Column::ALL) {
        let index = header
            .iter()
            .position(|name| column.matches(name))
            .ok_or_else(|| LoadError::MissingColumn {
                source_name: source.to_string(),
                column,
            })?;
        *slot = (column, index);
    }
    Ok(indices)
}

fn cell_value(cell: &Data, sheet: &str, row: usize, column: Column) -> Result<f64> {
    let invalid = |value: String| LoadError::InvalidCell {
        source_name: sheet.to_string(),
        row,
        column,
        value,
    };

    match cell {
        Data::Float(value) => Ok(*value),
        Data::Int(value) => Ok(*value as f64),
        Data::Empty => Ok(f64::NAN),
        Data::String(text) => parse_number(text.trim()).ok_or_else(|| invalid(text.clone())),
        other => Err(invalid(other.to_string())),
    }
}

/// Parse a numeric field; an empty field is a missing value
fn parse_number(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}

/// Split one CSV record, honoring double-quoted fields
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
