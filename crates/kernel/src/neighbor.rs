//! Uniform bucket grid for neighbor search over the planar domain.
//!
//! Cells are square with edge equal to the smoothing distance, so every
//! particle that can influence another lives in the same cell or one of its
//! eight neighbors. Membership is id-based: each cell keeps an unordered
//! list of particle ids and each particle remembers its slot in that list,
//! which makes moving a particle between cells O(1).

use crate::config::{cells_along, check_tiling, Axis};
use crate::error::ConfigError;

/// The cells making up one 3x3 neighborhood, center included.
///
/// Cells outside the grid are omitted rather than wrapped, so a corner cell
/// has 4 entries and an edge cell 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    cells: [usize; 9],
    len: u8,
}

impl Neighborhood {
    /// The valid cell ids, row-major from the lowest row.
    pub fn as_slice(&self) -> &[usize] {
        &self.cells[..self.len as usize]
    }

    /// Number of valid cells (4, 6 or 9 on grids at least 2 cells wide).
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always `false`; a neighborhood contains at least its center.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Uniform grid covering `[-half_width, half_width] x [-half_height, half_height]`.
///
/// Cell ids are row-major: `col + cols * row`, with row 0 at `y = -half_height`.
#[derive(Debug, Clone)]
pub struct NeighborGrid {
    cell_size: f32,
    half_extents: [f32; 2],
    /// `[cols, rows]`
    dims: [usize; 2],
    /// Particle ids in each cell, unordered.
    members: Vec<Vec<usize>>,
    /// Cell id of each particle.
    cell_of: Vec<usize>,
    /// Index of each particle inside `members[cell_of[id]]`.
    slot: Vec<usize>,
    /// 3x3 neighborhood of each cell, fixed at construction.
    neighborhoods: Vec<Neighborhood>,
}

impl NeighborGrid {
    /// Create an empty grid.
    ///
    /// Fails unless `2 * half_width` and `2 * half_height` are whole multiples
    /// of `cell_size`.
    pub fn new(half_width: f32, half_height: f32, cell_size: f32) -> Result<Self, ConfigError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "smoothing_distance",
                value: cell_size,
            });
        }
        check_tiling(Axis::X, half_width, cell_size)?;
        check_tiling(Axis::Y, half_height, cell_size)?;

        let dims = [
            cells_along(half_width, cell_size),
            cells_along(half_height, cell_size),
        ];
        let total_cells = dims[0] * dims[1];
        let neighborhoods = (0..total_cells)
            .map(|cell| Self::build_neighborhood(dims, cell))
            .collect();

        Ok(Self {
            cell_size,
            half_extents: [half_width, half_height],
            dims,
            members: vec![Vec::new(); total_cells],
            cell_of: Vec::new(),
            slot: Vec::new(),
            neighborhoods,
        })
    }

    /// Explicit row/column range checks; out-of-grid neighbors are dropped.
    fn build_neighborhood(dims: [usize; 2], cell: usize) -> Neighborhood {
        let [cols, rows] = dims;
        let col = cell % cols;
        let row = cell / cols;

        let row_lo = row.saturating_sub(1);
        let row_hi = (row + 1).min(rows - 1);
        let col_lo = col.saturating_sub(1);
        let col_hi = (col + 1).min(cols - 1);

        let mut cells = [0usize; 9];
        let mut len = 0u8;
        for r in row_lo..=row_hi {
            for c in col_lo..=col_hi {
                cells[len as usize] = c + cols * r;
                len += 1;
            }
        }
        Neighborhood { cells, len }
    }

    /// Grid dimensions `[cols, rows]`.
    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    /// Edge length of a cell.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.members.len()
    }

    /// Number of particles registered in the grid.
    pub fn particle_count(&self) -> usize {
        self.cell_of.len()
    }

    /// Map a world position to `(col, row)`, clamped to the grid.
    ///
    /// `floor` returns `cols` exactly on the upper wall; the clamp folds that
    /// back into the last column (likewise for rows).
    #[inline]
    pub fn cell_coords(&self, position: [f32; 2]) -> (usize, usize) {
        let col = ((position[0] + self.half_extents[0]) / self.cell_size)
            .floor()
            .max(0.0)
            .min((self.dims[0] - 1) as f32) as usize;
        let row = ((position[1] + self.half_extents[1]) / self.cell_size)
            .floor()
            .max(0.0)
            .min((self.dims[1] - 1) as f32) as usize;
        (col, row)
    }

    /// Flat cell id containing `position`.
    #[inline]
    pub fn cell_index_of(&self, position: [f32; 2]) -> usize {
        let (col, row) = self.cell_coords(position);
        col + self.dims[0] * row
    }

    /// The cell itself plus its in-grid neighbors.
    #[inline]
    pub fn neighbor_cells(&self, cell: usize) -> &[usize] {
        self.neighborhoods[cell].as_slice()
    }

    /// Particle ids currently in `cell`, in no particular order.
    #[inline]
    pub fn members(&self, cell: usize) -> &[usize] {
        &self.members[cell]
    }

    /// Cell the particle is registered in.
    #[inline]
    pub fn cell_of(&self, id: usize) -> usize {
        self.cell_of[id]
    }

    /// Register a new particle. Ids must be handed out densely from zero.
    pub fn insert(&mut self, id: usize, cell: usize) {
        debug_assert_eq!(id, self.cell_of.len(), "particle ids must be dense");
        self.cell_of.push(cell);
        self.slot.push(self.members[cell].len());
        self.members[cell].push(id);
    }

    /// Move particle `id` from `old_cell` to `new_cell` in O(1).
    pub fn move_particle(&mut self, id: usize, old_cell: usize, new_cell: usize) {
        debug_assert_eq!(self.cell_of[id], old_cell, "stale old cell for particle {id}");
        if old_cell == new_cell {
            return;
        }

        let slot = self.slot[id];
        let list = &mut self.members[old_cell];
        list.swap_remove(slot);
        if let Some(&moved) = list.get(slot) {
            self.slot[moved] = slot;
        }

        self.slot[id] = self.members[new_cell].len();
        self.members[new_cell].push(id);
        self.cell_of[id] = new_cell;
    }

    /// Particle count in each cell.
    pub fn occupancy(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    /// Invoke `f` for every particle in the 3x3 neighborhood of `cell`,
    /// including particles in `cell` itself. No distance filtering.
    #[inline]
    pub fn for_each_candidate<F>(&self, cell: usize, mut f: F)
    where
        F: FnMut(usize),
    {
        for &c in self.neighbor_cells(cell) {
            for &j in &self.members[c] {
                f(j);
            }
        }
    }

    /// Iterate over all neighbors of `particle_idx` strictly within `radius`.
    ///
    /// Candidates come from the particle's registered cell; distances are
    /// measured on the supplied coordinate arrays. The particle itself is
    /// skipped.
    pub fn for_each_neighbor<F>(
        &self,
        particle_idx: usize,
        x: &[f32],
        y: &[f32],
        radius: f32,
        mut f: F,
    ) where
        F: FnMut(usize),
    {
        let px = x[particle_idx];
        let py = y[particle_idx];
        let radius_sq = radius * radius;

        self.for_each_candidate(self.cell_of[particle_idx], |j| {
            if j == particle_idx {
                return;
            }
            let dx = px - x[j];
            let dy = py - y[j];
            if dx * dx + dy * dy < radius_sq {
                f(j);
            }
        });
    }

    /// Check that every particle sits in exactly one cell and that its slot
    /// bookkeeping agrees with the member lists.
    pub fn is_consistent(&self) -> bool {
        let listed: usize = self.members.iter().map(Vec::len).sum();
        if listed != self.cell_of.len() {
            return false;
        }
        self.cell_of.iter().enumerate().all(|(id, &cell)| {
            self.members[cell].get(self.slot[id]) == Some(&id)
        })
    }
}
