use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_SHEET: &str = "TA Roster";

pub const COL_INSTRUCTOR_ID: &str = "Instructor #";
pub const COL_FIRST_NAME: &str = "First name";
pub const COL_LAST_NAME: &str = "Last name";
pub const COL_EMAIL: &str = "Email";
pub const COL_STATUS: &str = "Status";

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("sheet {sheet:?} is empty")]
    EmptySheet { sheet: String },

    #[error("sheet {sheet:?} has no {column:?} column")]
    MissingColumn { sheet: String, column: &'static str },

    #[error("row {row}: cannot read instructor id from {value}")]
    BadInstructorId { row: usize, value: String },
}

/// Spreadsheet cell, reduced to the shapes the roster cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
    Error(String),
}

impl Cell {
    fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Cell::Empty => "an empty cell".to_string(),
            Cell::Int(v) => format!("integer {}", v),
            Cell::Float(v) => format!("number {}", v),
            Cell::Bool(v) => format!("boolean {}", v),
            Cell::Text(s) => format!("text {:?}", s),
            Cell::DateTime(dt) => format!("date {}", dt),
            Cell::Error(e) => format!("cell error {}", e),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Bool(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::DateTime(dt) => dt.to_string(),
            Cell::Error(e) => e.clone(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(d: &Data) -> Self {
        match d {
            Data::Empty => Cell::Empty,
            Data::Int(v) => Cell::Int(*v),
            Data::Float(v) => Cell::Float(*v),
            Data::Bool(v) => Cell::Bool(*v),
            Data::String(s) => Cell::Text(s.clone()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(v) => Cell::DateTime(v),
                None => Cell::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) => match parse_iso_datetime(s) {
                Some(v) => Cell::DateTime(v),
                None => Cell::Text(s.clone()),
            },
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    if let Ok(v) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(v);
    }
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub instructor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: String,
}

pub fn load_roster(path: &Path, sheet: &str) -> anyhow::Result<Vec<RosterRow>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open roster {}", path.to_string_lossy()))?;
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("failed to read sheet {:?}", sheet))?;

    // Sheet row number of the first row in the used range.
    let first_row = range.start().map(|(r, _)| r as usize + 1).unwrap_or(1);
    let grid: Vec<Vec<Cell>> = range
        .rows()
        .map(|r| r.iter().map(Cell::from).collect())
        .collect();
    let rows = rows_from_grid(sheet, first_row, &grid)?;
    Ok(rows)
}

/// Projects a header-first grid onto roster rows, dropping rows without an
/// instructor id. `first_row` is the 1-based sheet row of `grid[0]`.
pub fn rows_from_grid(
    sheet: &str,
    first_row: usize,
    grid: &[Vec<Cell>],
) -> Result<Vec<RosterRow>, RosterError> {
    let Some(header) = grid.first() else {
        return Err(RosterError::EmptySheet {
            sheet: sheet.to_string(),
        });
    };

    let col = |name: &'static str| -> Result<usize, RosterError> {
        header
            .iter()
            .position(|c| matches!(c, Cell::Text(s) if s == name))
            .ok_or(RosterError::MissingColumn {
                sheet: sheet.to_string(),
                column: name,
            })
    };
    let id_col = col(COL_INSTRUCTOR_ID)?;
    let first_col = col(COL_FIRST_NAME)?;
    let last_col = col(COL_LAST_NAME)?;
    let email_col = col(COL_EMAIL)?;
    let status_col = col(COL_STATUS)?;

    let empty = Cell::Empty;
    let mut out = Vec::new();
    for (i, row) in grid.iter().enumerate().skip(1) {
        let get = |c: usize| row.get(c).unwrap_or(&empty);

        let id_cell = get(id_col);
        if id_cell.is_missing() {
            continue;
        }
        let instructor_id = normalize_instructor_id(id_cell).ok_or_else(|| {
            RosterError::BadInstructorId {
                row: first_row + i,
                value: id_cell.describe(),
            }
        })?;

        out.push(RosterRow {
            instructor_id,
            first_name: get(first_col).text(),
            last_name: get(last_col).text(),
            email: get(email_col).text(),
            status: get(status_col).text(),
        });
    }
    Ok(out)
}

/// Some rosters carry a date in the id column; its day-of-month is the id.
pub fn normalize_instructor_id(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::DateTime(dt) => Some(i64::from(dt.day())),
        Cell::Int(v) => Some(*v),
        Cell::Float(v) if v.is_finite() => Some(v.trunc() as i64),
        Cell::Float(_) => None,
        Cell::Bool(v) => Some(i64::from(*v)),
        Cell::Text(s) => s.trim().parse::<i64>().ok(),
        Cell::Empty | Cell::Error(_) => None,
    }
}
