//! Fixed-shape, heap-backed 2D arrays.
//!
//! Observation fields have shapes fixed at compile time (21x79, 24x80,
//! 55x80). `Grid` keeps the shape in the type and the storage on the heap,
//! so a full observation never has to live on a (possibly small) thread
//! stack.

use std::fmt;
use std::ops::{Index, IndexMut};

/// A `ROWS` x `COLS` array stored row-major in a single allocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid<T, const ROWS: usize, const COLS: usize> {
    cells: Box<[[T; COLS]; ROWS]>,
}

impl<T: Copy, const ROWS: usize, const COLS: usize> Grid<T, ROWS, COLS> {
    pub const ROWS: usize = ROWS;
    pub const COLS: usize = COLS;

    /// Create a grid with every cell set to `value`.
    pub fn filled(value: T) -> Self {
        let rows = vec![[value; COLS]; ROWS].into_boxed_slice();
        let cells: Box<[[T; COLS]; ROWS]> = match rows.try_into() {
            Ok(cells) => cells,
            Err(_) => unreachable!("vec was built with exactly ROWS rows"),
        };
        Self { cells }
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: T) {
        for row in self.cells.iter_mut() {
            row.fill(value);
        }
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Write a cell; out-of-bounds writes are ignored and return `false`.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn row(&self, row: usize) -> &[T; COLS] {
        &self.cells[row]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T; COLS] {
        &mut self.cells[row]
    }

    pub fn rows(&self) -> &[[T; COLS]] {
        self.cells.as_slice()
    }

    pub fn rows_mut(&mut self) -> &mut [[T; COLS]] {
        self.cells.as_mut_slice()
    }

    /// All cells in row-major order.
    pub fn as_flat(&self) -> &[T] {
        self.cells.as_slice().as_flattened()
    }

    /// Copy the top-left `R` x `C` corner of `src`, starting at
    /// `(row_offset, col_offset)`, into this grid.
    ///
    /// Cells that would fall outside `src` are left unchanged.
    pub fn copy_window<const R: usize, const C: usize>(
        &mut self,
        src: &Grid<T, R, C>,
        row_offset: usize,
        col_offset: usize,
    ) {
        for (row, dst) in self.cells.iter_mut().enumerate() {
            let Some(src_row) = src.cells.get(row + row_offset) else {
                break;
            };
            let avail = src_row.len().saturating_sub(col_offset).min(COLS);
            if avail > 0 {
                dst[..avail].copy_from_slice(&src_row[col_offset..col_offset + avail]);
            }
        }
    }
}

impl<T: Copy + Default, const ROWS: usize, const COLS: usize> Default for Grid<T, ROWS, COLS> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}

impl<T, const ROWS: usize, const COLS: usize> Index<(usize, usize)> for Grid<T, ROWS, COLS> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.cells[row][col]
    }
}

impl<T, const ROWS: usize, const COLS: usize> IndexMut<(usize, usize)> for Grid<T, ROWS, COLS> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.cells[row][col]
    }
}

impl<T, const ROWS: usize, const COLS: usize> fmt::Debug for Grid<T, ROWS, COLS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid<{}x{}>", ROWS, COLS)
    }
}
