use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::affinity::{AffinityMatrix, CharacterUniverse, MatrixError};

/// Anchor cell preceding the columns of the global compatibility table
pub const GLOBAL_ANCHOR: &str = "列クリックでソート→";
/// Anchor cell preceding the columns of a child's ancestor table
pub const CHILD_ANCHOR: &str = "親相性";
/// Header cell closing the data columns
pub const TOTAL_MARKER: &str = "合計";

/// Errors that can occur while loading affinity tables
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Matrix file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Anchor cell '{0}' not found")]
    MissingAnchor(String),

    #[error("Total column '{0}' not found after the anchor")]
    MissingTotal(String),

    #[error("Invalid value at row {row}, column {col}: '{value}'")]
    BadCell { row: usize, col: usize, value: String },

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// Square table cut out of a CSV export, rows and columns in `names` order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedMatrix {
    pub names: Vec<String>,
    pub rows: Vec<Vec<i64>>,
}

/// Loads the global and per-child affinity tables from CSV exports
#[derive(Debug, Clone)]
pub struct MatrixLoader {
    global_anchor: String,
    child_anchor: String,
    total_marker: String,
}

impl Default for MatrixLoader {
    fn default() -> Self {
        Self::new(GLOBAL_ANCHOR, CHILD_ANCHOR, TOTAL_MARKER)
    }
}

impl MatrixLoader {
    pub fn new(
        global_anchor: impl Into<String>,
        child_anchor: impl Into<String>,
        total_marker: impl Into<String>,
    ) -> Self {
        Self {
            global_anchor: global_anchor.into(),
            child_anchor: child_anchor.into(),
            total_marker: total_marker.into(),
        }
    }

    /// Load the character universe and global matrix
    pub fn load_global<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(CharacterUniverse, AffinityMatrix), LoaderError> {
        let text = read_text(path.as_ref())?;
        self.parse_global(&text)
    }

    pub fn parse_global(
        &self,
        text: &str,
    ) -> Result<(CharacterUniverse, AffinityMatrix), LoaderError> {
        let grid = read_grid(text)?;
        let trimmed = trim_matrix(&grid, &self.global_anchor, &self.total_marker)?;
        let universe = CharacterUniverse::new(trimmed.names)?;
        let matrix = AffinityMatrix::from_rows(trimmed.rows)?;
        Ok((universe, matrix))
    }

    /// Path of a child's table inside the child matrix directory
    pub fn child_path(dir: &Path, child: &str) -> PathBuf {
        dir.join(format!("{}.csv", child))
    }

    /// Load a child's ancestor matrix, reindexed onto `universe`
    pub fn load_child(
        &self,
        dir: &Path,
        child: &str,
        universe: &CharacterUniverse,
    ) -> Result<AffinityMatrix, LoaderError> {
        let path = Self::child_path(dir, child);
        let text = read_text(&path)?;
        self.parse_child(&text, universe)
    }

    pub fn parse_child(
        &self,
        text: &str,
        universe: &CharacterUniverse,
    ) -> Result<AffinityMatrix, LoaderError> {
        let grid = read_grid(text)?;
        let trimmed = trim_matrix(&grid, &self.child_anchor, &self.total_marker)?;
        reindex(&trimmed, universe)
    }
}

fn read_text(path: &Path) -> Result<String, LoaderError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoaderError::NotFound(path.to_path_buf())
        } else {
            LoaderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(decode_bytes(&bytes).into_owned())
}

/// Decode UTF-8 (BOM stripped) or, failing that, Shift_JIS / CP932
pub fn decode_bytes(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
            if had_errors {
                tracing::warn!("Table is neither UTF-8 nor clean Shift_JIS; replaced undecodable bytes");
            }
            text
        }
    }
}

/// Parse CSV text into trimmed cells, rows may differ in width
pub fn read_grid(text: &str) -> Result<Vec<Vec<String>>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    Ok(grid)
}

/// Cut the square data block out of an exported table
///
/// The header row is the first row holding `anchor`. Data columns run from
/// the cell after the anchor up to the `total_marker` cell. Data rows run
/// from below the header to the last row with a name in the second column.
/// Rows and columns are then aligned on the row names; a name without a
/// matching header column reads as zeros.
pub fn trim_matrix(
    grid: &[Vec<String>],
    anchor: &str,
    total_marker: &str,
) -> Result<TrimmedMatrix, LoaderError> {
    let (header_row, anchor_col) = grid
        .iter()
        .enumerate()
        .find_map(|(r, row)| row.iter().position(|c| c == anchor).map(|c| (r, c)))
        .ok_or_else(|| LoaderError::MissingAnchor(anchor.to_string()))?;

    let header = &grid[header_row];
    let start_col = anchor_col + 1;
    let end_col = header
        .iter()
        .skip(start_col)
        .position(|c| c == total_marker)
        .map(|offset| start_col + offset)
        .ok_or_else(|| LoaderError::MissingTotal(total_marker.to_string()))?;

    let last_row = grid
        .iter()
        .rposition(|row| row.get(1).is_some_and(|c| !c.is_empty()))
        .unwrap_or(header_row);

    // Column label -> grid column, first occurrence wins
    let mut columns: HashMap<&str, usize> = HashMap::new();
    for (col, label) in header.iter().enumerate().take(end_col).skip(start_col) {
        columns.entry(label.as_str()).or_insert(col);
    }

    let body: Vec<(usize, &Vec<String>)> = grid
        .iter()
        .enumerate()
        .take(last_row + 1)
        .skip(header_row + 1)
        .filter(|(_, row)| row.get(1).is_some_and(|c| !c.is_empty()))
        .collect();

    let names: Vec<String> = body.iter().map(|(_, row)| row[1].clone()).collect();
    let mut rows = Vec::with_capacity(body.len());
    for (r, row) in &body {
        let mut values = Vec::with_capacity(names.len());
        for name in &names {
            let value = match columns.get(name.as_str()) {
                Some(&col) => parse_cell(row.get(col).map(String::as_str), *r, col)?,
                None => 0,
            };
            values.push(value);
        }
        rows.push(values);
    }

    Ok(TrimmedMatrix { names, rows })
}

fn parse_cell(cell: Option<&str>, row: usize, col: usize) -> Result<i64, LoaderError> {
    let text = cell.unwrap_or("").trim();
    if text.is_empty() {
        return Ok(0);
    }
    if let Ok(value) = text.parse::<i64>() {
        return Ok(value);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(LoaderError::BadCell {
            row: row + 1,
            col: col + 1,
            value: text.to_string(),
        }),
    }
}

/// Place a trimmed table onto the universe's index space
fn reindex(
    trimmed: &TrimmedMatrix,
    universe: &CharacterUniverse,
) -> Result<AffinityMatrix, LoaderError> {
    let positions: Vec<Option<usize>> = trimmed
        .names
        .iter()
        .map(|name| universe.index_of(name))
        .collect();

    let unknown = positions.iter().filter(|p| p.is_none()).count();
    if unknown > 0 {
        tracing::debug!("{} names in child table are not in the universe", unknown);
    }

    // Duplicate names keep their first row and column
    let mut seen = HashSet::new();
    let first: Vec<bool> = trimmed.names.iter().map(|name| seen.insert(name)).collect();

    let mut matrix = AffinityMatrix::zeros(universe.len());
    for (r, row_pos) in positions.iter().enumerate() {
        let (Some(u_row), true) = (*row_pos, first[r]) else {
            continue;
        };
        for (c, col_pos) in positions.iter().enumerate() {
            if let (Some(u_col), true) = (*col_pos, first[c]) {
                matrix.set(u_row, u_col, trimmed.rows[r][c])?;
            }
        }
    }
    Ok(matrix)
}
