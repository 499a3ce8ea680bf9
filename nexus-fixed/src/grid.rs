//! Fixed `rows x cols` grid built from bounded rows.
//!
//! Each row is a [`BoundedQueue`] with capacity `cols`. The grid fills in
//! row-major order: [`BoundedGrid::add`] writes into the cell right after the
//! last occupied one, moving to the next row when the current one is full.
//! A per-row occupancy counter tracks how many cells hold a value, which is
//! what [`BoundedGrid::count`] and [`BoundedGrid::is_empty`] report.
//!
//! # Example
//!
//! ```
//! use nexus_fixed::{BoundedGrid, DefragmentMode};
//!
//! let mut grid = BoundedGrid::new(2, 2).unwrap();
//! for pixel in [10u8, 20, 30] {
//!     grid.add(pixel).unwrap();
//! }
//! assert_eq!(grid.count(), 3);
//! assert_eq!(grid.final_data_location(), Some((1, 0)));
//!
//! grid.remove(0, 0).unwrap();
//! assert_eq!(grid.get(0, 0).unwrap(), Some(&20));
//! assert!(grid.is_null_element(0, 1).unwrap());
//!
//! grid.defragment(DefragmentMode::Serial).unwrap();
//! assert_eq!(grid.get(0, 1).unwrap(), Some(&30));
//! ```
//!
//! # Mutation and threads
//!
//! Mutating methods take `&mut self`, so a row's chain and its occupancy
//! counter always change together. Only [`BoundedGrid::count`] runs on
//! multiple threads.

#[cfg(feature = "parallel")]
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;
#[cfg(feature = "parallel")]
use tracing::trace;

use crate::{BoundedQueue, FixedError};

/// Strategy for [`BoundedGrid::defragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefragmentMode {
    /// Rebuild the whole grid, re-adding occupied cells in row-major order.
    Serial,
    /// Close the gaps inside each row independently.
    Row,
    /// Pack each column towards row 0. Not supported.
    Col,
}

/// A fixed-size grid of bounded rows.
#[derive(Debug, Clone)]
pub struct BoundedGrid<T> {
    rows: usize,
    cols: usize,
    occupancy: Vec<usize>,
    containers: Vec<BoundedQueue<T>>,
}

impl<T> BoundedGrid<T> {
    /// Creates an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::Configuration`] if `rows` or `cols` is 0.
    pub fn new(rows: usize, cols: usize) -> Result<Self, FixedError> {
        if rows == 0 {
            return Err(FixedError::Configuration {
                what: "rows",
                value: rows,
            });
        }
        if cols == 0 {
            return Err(FixedError::Configuration {
                what: "cols",
                value: cols,
            });
        }

        let containers = (0..rows)
            .map(|_| BoundedQueue::new(cols))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rows,
            cols,
            occupancy: vec![0; rows],
            containers,
        })
    }

    /// Returns the number of rows.
    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    #[inline]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the queue backing `row`.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if `row >= rows`.
    pub fn row(&self, row: usize) -> Result<&BoundedQueue<T>, FixedError> {
        self.containers
            .get(row)
            .ok_or(FixedError::out_of_range(row, self.rows))
    }

    /// Returns the number of occupied cells in `row`.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if `row >= rows`.
    pub fn row_occupancy(&self, row: usize) -> Result<usize, FixedError> {
        self.occupancy
            .get(row)
            .copied()
            .ok_or(FixedError::out_of_range(row, self.rows))
    }

    /// Returns the element at `(row, col)`, `None` if the cell is unset.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if the coordinate is outside
    /// the grid.
    pub fn get(&self, row: usize, col: usize) -> Result<Option<&T>, FixedError> {
        self.check(row, col)?;

        let queue = &self.containers[row];
        if col >= queue.len() {
            return Ok(None);
        }
        queue.get(col)
    }

    /// Returns `true` if the cell at `(row, col)` holds no value.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if the coordinate is outside
    /// the grid.
    #[inline]
    pub fn is_null_element(&self, row: usize, col: usize) -> Result<bool, FixedError> {
        self.get(row, col).map(|cell| cell.is_none())
    }

    /// Returns `true` if no cell is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupancy.iter().all(|&n| n == 0)
    }

    /// Returns the coordinate of the last occupied cell in row-major order.
    ///
    /// Returns `None` if the grid is empty.
    pub fn final_data_location(&self) -> Option<(usize, usize)> {
        let row = self.occupancy.iter().rposition(|&n| n > 0)?;
        let col = self.containers[row]
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .last()
            .map(|(col, _)| col)?;
        Some((row, col))
    }

    /// Returns an iterator over occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        self.containers.iter().enumerate().flat_map(|(row, queue)| {
            queue
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|value| ((row, col), value)))
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Stores `element` in the cell after the last occupied one.
    ///
    /// When that row is full the element goes to column 0 of the next row.
    /// Returns the coordinate written.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::CapacityExceeded`] if the last occupied cell is
    /// the bottom-right corner.
    pub fn add(&mut self, element: T) -> Result<(usize, usize), FixedError> {
        let (row, col) = self.next_free()?;

        let queue = &mut self.containers[row];
        if col < queue.len() {
            // A gap left by `clear_cell`.
            queue.node_mut(col)?.set_element(element);
        } else {
            queue.add(element);
        }

        self.occupancy[row] += 1;
        Ok((row, col))
    }

    /// Removes the cell at `(row, col)` through the row's
    /// [`remove_at`](BoundedQueue::remove_at).
    ///
    /// Later cells in the same row shift one column left. The removed node
    /// is parked in the row's undo slot; see [`recover_row`](Self::recover_row).
    ///
    /// # Errors
    ///
    /// - [`FixedError::IndexOutOfRange`] if the coordinate is outside the grid.
    /// - [`FixedError::InvalidOperation`] if the cell is unset.
    pub fn remove(&mut self, row: usize, col: usize) -> Result<(), FixedError> {
        if self.is_null_element(row, col)? {
            return Err(FixedError::InvalidOperation("cell is empty"));
        }

        self.containers[row].remove_at(col)?;
        self.occupancy[row] -= 1;
        Ok(())
    }

    /// Same as [`remove`](Self::remove), taking a `(row, col)` pair.
    ///
    /// # Errors
    ///
    /// See [`remove`](Self::remove).
    #[inline]
    pub fn remove_at(&mut self, (row, col): (usize, usize)) -> Result<(), FixedError> {
        self.remove(row, col)
    }

    /// Takes the value out of `(row, col)`, leaving a gap in place.
    ///
    /// Other cells keep their coordinates. Gaps are closed by
    /// [`defragment`](Self::defragment).
    ///
    /// # Errors
    ///
    /// - [`FixedError::IndexOutOfRange`] if the coordinate is outside the grid.
    /// - [`FixedError::InvalidOperation`] if the cell is unset.
    pub fn clear_cell(&mut self, row: usize, col: usize) -> Result<T, FixedError> {
        const EMPTY: FixedError = FixedError::InvalidOperation("cell is empty");

        self.check(row, col)?;

        let queue = &mut self.containers[row];
        if col >= queue.len() {
            return Err(EMPTY);
        }
        let element = queue.node_mut(col)?.take_element().ok_or(EMPTY)?;

        self.occupancy[row] -= 1;
        Ok(element)
    }

    /// Undoes the last eviction or removal in `row`.
    ///
    /// Returns `false` if the row had nothing parked.
    ///
    /// # Errors
    ///
    /// - [`FixedError::IndexOutOfRange`] if `row >= rows`.
    /// - [`FixedError::InvalidOperation`] if a node is parked but the row is
    ///   full. Splicing it back would push the row's last cell out.
    pub fn recover_row(&mut self, row: usize) -> Result<bool, FixedError> {
        let queue = self
            .containers
            .get_mut(row)
            .ok_or(FixedError::out_of_range(row, self.rows))?;

        if queue.is_full() && queue.recycled().is_some() {
            return Err(FixedError::InvalidOperation("row is full"));
        }

        let recovered = queue.recover();
        if recovered {
            self.occupancy[row] = queue.iter().filter(Option::is_some).count();
        }
        Ok(recovered)
    }

    /// Mirrors the grid: every row is reversed, then the row order.
    pub fn reverse(&mut self) {
        for queue in &mut self.containers {
            queue.reverse();
        }
        self.containers.reverse();
        self.occupancy.reverse();

        debug!(rows = self.rows, cols = self.cols, "reversed grid");
    }

    /// Reverses a single row in place.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::IndexOutOfRange`] if `row >= rows`.
    pub fn reverse_row(&mut self, row: usize) -> Result<(), FixedError> {
        self.containers
            .get_mut(row)
            .ok_or(FixedError::out_of_range(row, self.rows))?
            .reverse();
        Ok(())
    }

    /// Closes the gaps left by removals and cleared cells.
    ///
    /// [`Serial`](DefragmentMode::Serial) swaps in a fresh grid of the same
    /// dimensions holding the occupied cells in row-major order; row undo
    /// slots are discarded. [`Row`](DefragmentMode::Row) compacts each row
    /// on its own and keeps the undo slots.
    ///
    /// # Errors
    ///
    /// Returns [`FixedError::Unsupported`] for
    /// [`Col`](DefragmentMode::Col).
    pub fn defragment(&mut self, mode: DefragmentMode) -> Result<(), FixedError> {
        match mode {
            DefragmentMode::Serial => {
                let fresh = Self::new(self.rows, self.cols)?;
                let old = core::mem::replace(self, fresh);
                for element in old.containers.into_iter().flatten().flatten() {
                    self.add(element)?;
                }
            }
            DefragmentMode::Row => {
                for queue in &mut self.containers {
                    queue.defragment();
                }
            }
            DefragmentMode::Col => return Err(FixedError::Unsupported(mode)),
        }

        debug!(?mode, occupied = self.occupancy.iter().sum::<usize>(), "defragmented grid");
        Ok(())
    }

    /// Empties every row.
    pub fn clear(&mut self) {
        for queue in &mut self.containers {
            queue.clear();
        }
        self.occupancy.fill(0);
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn check(&self, row: usize, col: usize) -> Result<(), FixedError> {
        if row >= self.rows {
            return Err(FixedError::out_of_range(row, self.rows));
        }
        if col >= self.cols {
            return Err(FixedError::out_of_range(col, self.cols));
        }
        Ok(())
    }

    /// The cell `add` writes to next.
    fn next_free(&self) -> Result<(usize, usize), FixedError> {
        match self.final_data_location() {
            None => Ok((0, 0)),
            Some((row, col)) if col + 1 < self.cols => Ok((row, col + 1)),
            Some((row, _)) if row + 1 < self.rows => Ok((row + 1, 0)),
            Some(_) => Err(FixedError::CapacityExceeded {
                rows: self.rows,
                cols: self.cols,
            }),
        }
    }
}

// =============================================================================
// Occupancy count
// =============================================================================

impl<T: Sync> BoundedGrid<T> {
    /// Returns the number of occupied cells.
    ///
    /// Rows with nonzero occupancy are scanned in parallel on the rayon
    /// pool. Each row's chain is bridged onto the pool as well, so its
    /// columns are checked in parallel without collecting them first. A row's scan
    /// stops as soon as its known occupancy has been counted.
    #[cfg(feature = "parallel")]
    pub fn count(&self) -> usize {
        let total = AtomicUsize::new(0);

        self.containers
            .par_iter()
            .zip(self.occupancy.par_iter())
            .enumerate()
            .filter(|(_, (_, occupied))| **occupied > 0)
            .for_each(|(row, (queue, &occupied))| {
                let tallied = AtomicUsize::new(0);

                // `Err` ends the row's scan early.
                let _ = queue.iter().par_bridge().try_for_each(|cell| {
                    if cell.is_none() {
                        return Ok(());
                    }
                    total.fetch_add(1, Ordering::Relaxed);
                    if tallied.fetch_add(1, Ordering::Relaxed) + 1 >= occupied {
                        Err(())
                    } else {
                        Ok(())
                    }
                });

                trace!(row, occupied, "row tallied");
            });

        total.into_inner()
    }

    /// Returns the number of occupied cells.
    ///
    /// Each row's scan stops as soon as its known occupancy has been
    /// counted.
    #[cfg(not(feature = "parallel"))]
    pub fn count(&self) -> usize {
        self.containers
            .iter()
            .zip(&self.occupancy)
            .filter(|(_, occupied)| **occupied > 0)
            .map(|(queue, &occupied)| queue.iter().flatten().take(occupied).count())
            .sum()
    }
}
