use crate::error::{EngineError, Result};

/// Static occupancy grid. Cells are addressed `(x, y)` with `x` selecting the
/// outer row of the source matrix, so `rows[x][y]` is the cell at `(x, y)`.
///
/// The outer ring must be fully occupied: ray marching stops only on an
/// occupied cell, and the ring is what guarantees every ray finds one.
#[derive(Debug, Clone)]
pub struct Level {
    cells: Vec<bool>,
    size_x: usize,
    size_y: usize,
}

impl Level {
    /// Builds a level from a matrix where any non-zero entry is a wall.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let size_x = rows.len();
        let size_y = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if size_x == 0 || size_y == 0 {
            return Err(EngineError::InvalidLevel("level is empty".into()));
        }

        let mut cells = Vec::with_capacity(size_x * size_y);
        for (x, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size_y {
                return Err(EngineError::InvalidLevel(format!(
                    "row {x} has {} cells, expected {size_y}",
                    row.len()
                )));
            }
            cells.extend(row.iter().map(|&c| c != 0));
        }

        let level = Self {
            cells,
            size_x,
            size_y,
        };
        level.check_boundary()?;
        Ok(level)
    }

    fn check_boundary(&self) -> Result<()> {
        for x in 0..self.size_x {
            for y in 0..self.size_y {
                let on_ring = x == 0 || y == 0 || x == self.size_x - 1 || y == self.size_y - 1;
                if on_ring && !self.cells[x * self.size_y + y] {
                    return Err(EngineError::InvalidLevel(format!(
                        "boundary cell ({x}, {y}) is open"
                    )));
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    /// Collision test: floors both coordinates and reports whether that cell is a wall.
    #[inline]
    pub fn is_occupied(&self, x: f64, y: f64) -> Result<bool> {
        let (cx, cy) = self.cell_of(x, y)?;
        Ok(self.cells[cx * self.size_y + cy])
    }

    /// Floored cell indices of a world point, validated against the grid extents.
    pub fn cell_of(&self, x: f64, y: f64) -> Result<(usize, usize)> {
        let fx = x.floor();
        let fy = y.floor();
        // NaN fails both comparisons and is rejected with the rest
        let inside = fx >= 0.0
            && fy >= 0.0
            && fx < self.size_x as f64
            && fy < self.size_y as f64;
        if !inside {
            return Err(EngineError::OutOfBounds {
                x: fx as i64,
                y: fy as i64,
            });
        }
        Ok((fx as usize, fy as usize))
    }
}
