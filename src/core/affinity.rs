use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while assembling or querying affinity data
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Matrix is not square: row {row} has {len} cells, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[error("Matrix dimension {matrix} does not match universe size {universe}")]
    DimensionMismatch { matrix: usize, universe: usize },

    #[error("Duplicate character name in universe: {0}")]
    DuplicateName(String),

    #[error("Index out of range: ({row}, {col}) in a {size}x{size} matrix")]
    OutOfRange { row: usize, col: usize, size: usize },
}

/// Ordered set of character names shared by both matrices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterUniverse {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl CharacterUniverse {
    pub fn new(names: Vec<String>) -> Result<Self, MatrixError> {
        let mut lookup = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if lookup.insert(name.clone(), idx).is_some() {
                return Err(MatrixError::DuplicateName(name.clone()));
            }
        }
        Ok(Self { names, lookup })
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    #[inline]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Dense square matrix of integer affinities, stored row-major
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffinityMatrix {
    size: usize,
    cells: Vec<i64>,
}

impl AffinityMatrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build a matrix from rows; every row must be as long as the row count.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(MatrixError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            cells.extend(values);
        }
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: i64) -> Result<(), MatrixError> {
        if row >= self.size || col >= self.size {
            return Err(MatrixError::OutOfRange {
                row,
                col,
                size: self.size,
            });
        }
        self.cells[row * self.size + col] = value;
        Ok(())
    }
}

/// Which matrix a lookup reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    Global,
    Child,
}

/// Read-only view over the universe, the global matrix and one child's matrix
#[derive(Debug, Clone, Copy)]
pub struct AffinityModel<'a> {
    universe: &'a CharacterUniverse,
    global: &'a AffinityMatrix,
    child: &'a AffinityMatrix,
}

impl<'a> AffinityModel<'a> {
    pub fn new(
        universe: &'a CharacterUniverse,
        global: &'a AffinityMatrix,
        child: &'a AffinityMatrix,
    ) -> Result<Self, MatrixError> {
        for matrix in [global, child] {
            if matrix.size() != universe.len() {
                return Err(MatrixError::DimensionMismatch {
                    matrix: matrix.size(),
                    universe: universe.len(),
                });
            }
        }
        Ok(Self {
            universe,
            global,
            child,
        })
    }

    pub fn len(&self) -> usize {
        self.universe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universe.is_empty()
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.universe.index_of(name)
    }

    /// Name for an index that came out of this model.
    #[inline]
    pub fn name(&self, index: usize) -> &'a str {
        self.universe.names()[index].as_str()
    }

    /// Checked lookup into either matrix
    pub fn score(&self, kind: MatrixKind, row: usize, col: usize) -> Result<i64, MatrixError> {
        let matrix = match kind {
            MatrixKind::Global => self.global,
            MatrixKind::Child => self.child,
        };
        matrix.get(row, col).ok_or(MatrixError::OutOfRange {
            row,
            col,
            size: matrix.size(),
        })
    }

    // Indices reaching these two come from `index_of` or from iterating
    // `0..len()`, and both matrices are checked against the universe in `new`.

    #[inline]
    pub fn global(&self, row: usize, col: usize) -> i64 {
        self.global.cells[row * self.global.size + col]
    }

    #[inline]
    pub fn child(&self, row: usize, col: usize) -> i64 {
        self.child.cells[row * self.child.size + col]
    }
}
