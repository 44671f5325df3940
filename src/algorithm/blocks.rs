//! Chunked generation of large maps from independently solved blocks
//!
//! The map is cut into `blocks_x × blocks_y` blocks. Blocks are solved in four
//! passes keyed by `(block_x % 2, block_y % 2)`; no two blocks of one pass
//! touch, so each pass runs its solvers in parallel and commits them after a
//! join. A block sees its committed neighbours through the one-cell halo ring
//! around it, handed to its solver as border vectors.

use crate::algorithm::executor::{
    Borders, SolveStatus, SolverConfig, WaveSolver, validate_dimension,
};
use crate::io::configuration::MAX_GRID_DIMENSION;
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::grid::TileMap;
use crate::spatial::tiles::{Direction, ModuleTable};
use bitvec::prelude::*;
use ndarray::Array2;
use rayon::prelude::*;
use std::time::Instant;

/// Block parities in the order their passes run
pub const PASS_ORDER: [[usize; 2]; 4] = [[0, 0], [1, 0], [0, 1], [1, 1]];

/// Shape of a chunked generation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    /// Number of block columns
    pub blocks_x: usize,
    /// Number of block rows
    pub blocks_y: usize,
    /// Width of one block in cells
    pub block_width: usize,
    /// Height of one block in cells
    pub block_height: usize,
    /// External tile id assumed outside the map and next to ungenerated blocks
    pub default_tile: i32,
    /// Seed from which every block seed is derived
    pub seed: u64,
}

impl BlockLayout {
    /// Create a validated layout
    ///
    /// # Errors
    ///
    /// Returns an error if a count or block dimension is zero, or the full map
    /// would exceed `MAX_GRID_DIMENSION` on either axis.
    pub fn new(
        blocks_x: usize,
        blocks_y: usize,
        block_width: usize,
        block_height: usize,
        default_tile: i32,
        seed: u64,
    ) -> Result<Self> {
        let layout = Self {
            blocks_x,
            blocks_y,
            block_width,
            block_height,
            default_tile,
            seed,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check counts and dimensions
    ///
    /// # Errors
    ///
    /// Returns an error if a count or block dimension is zero, or the full map
    /// would exceed `MAX_GRID_DIMENSION` on either axis.
    pub fn validate(&self) -> Result<()> {
        validate_dimension("blocks_x", self.blocks_x)?;
        validate_dimension("blocks_y", self.blocks_y)?;
        validate_dimension("block_width", self.block_width)?;
        validate_dimension("block_height", self.block_height)?;
        let sizes = [("map width", self.map_width()), ("map height", self.map_height())];
        for (parameter, size) in sizes {
            if size.is_none_or(|size| size > MAX_GRID_DIMENSION) {
                let value = size.map_or_else(|| "overflow".to_owned(), |size| size.to_string());
                return Err(invalid_parameter(
                    parameter,
                    &value,
                    &format!("must not exceed {MAX_GRID_DIMENSION}"),
                ));
            }
        }
        Ok(())
    }

    /// Full map width, `None` on overflow
    pub const fn map_width(&self) -> Option<usize> {
        self.blocks_x.checked_mul(self.block_width)
    }

    /// Full map height, `None` on overflow
    pub const fn map_height(&self) -> Option<usize> {
        self.blocks_y.checked_mul(self.block_height)
    }

    /// Number of blocks
    pub const fn block_count(&self) -> usize {
        self.blocks_x * self.blocks_y
    }

    /// Pass in which a block is solved
    pub const fn pass_of(block: [usize; 2]) -> usize {
        block[0] % 2 + 2 * (block[1] % 2)
    }

    /// Blocks solved in `pass`, row by row
    pub fn blocks_in_pass(&self, pass: usize) -> Vec<[usize; 2]> {
        let mut blocks = Vec::new();
        for by in 0..self.blocks_y {
            for bx in 0..self.blocks_x {
                if PASS_ORDER.get(pass) == Some(&[bx % 2, by % 2]) {
                    blocks.push([bx, by]);
                }
            }
        }
        blocks
    }
}

/// Deterministic seed of one block
///
/// Mixes the layout seed with the block position so that every block draws
/// from its own stream regardless of scheduling order.
pub const fn block_seed(seed: u64, block: [usize; 2]) -> u64 {
    let mut h = seed
        ^ (block[0] as u64).wrapping_mul(374_761_393)
        ^ (block[1] as u64).wrapping_mul(668_265_263);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

/// Outcome of one solved block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockReport {
    /// `[block_x, block_y]`
    pub block: [usize; 2],
    /// Pass in which the block ran
    pub pass: usize,
    /// Soft status of the block's solve
    pub status: SolveStatus,
    /// Cells of the block left unresolved
    pub unresolved: usize,
    /// Weighted collapses performed
    pub collapses: usize,
}

#[derive(Clone, Debug)]
struct BlockJob {
    block: [usize; 2],
    pass: usize,
    borders: Borders,
    seed: u64,
}

#[derive(Clone, Debug)]
struct BlockSolution {
    report: BlockReport,
    cells: Vec<Option<usize>>,
}

fn solve_block(
    table: &ModuleTable,
    layout: &BlockLayout,
    job: &BlockJob,
) -> Result<BlockSolution> {
    let config = SolverConfig::new(layout.block_width, layout.block_height, job.seed)?;
    let mut solver = WaveSolver::with_borders(table, config, &job.borders)?;
    let status = solver.run();
    Ok(BlockSolution {
        report: BlockReport {
            block: job.block,
            pass: job.pass,
            status,
            unresolved: solver.unresolved_count(),
            collapses: solver.collapses(),
        },
        cells: solver.dense_output(),
    })
}

/// Finished chunked map
#[derive(Clone, Debug)]
pub struct BlockedGeneration {
    /// External tile ids; unresolved cells hold the default tile
    pub map: TileMap,
    /// Most severe status over all blocks
    pub status: SolveStatus,
    /// One report per block in commit order
    pub reports: Vec<BlockReport>,
    /// `[x, y]` positions that were filled with the default tile
    pub unresolved: Vec<[usize; 2]>,
}

/// Runs the four checkerboard passes over a shared dense output buffer
#[derive(Clone, Debug)]
pub struct BlockScheduler<'a> {
    table: &'a ModuleTable,
    layout: BlockLayout,
    default_index: usize,
    output: Array2<Option<usize>>,
    committed: BitVec,
}

impl<'a> BlockScheduler<'a> {
    /// Create a scheduler with nothing committed
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is invalid or its default tile is not
    /// part of the table.
    pub fn new(table: &'a ModuleTable, layout: BlockLayout) -> Result<Self> {
        layout.validate()?;
        let default_index = table.index_map().to_index(layout.default_tile).ok_or_else(|| {
            invalid_parameter("default_tile", &layout.default_tile, &"not part of the rule set")
        })?;
        let width = layout.map_width().unwrap_or_default();
        let height = layout.map_height().unwrap_or_default();
        Ok(Self {
            table,
            layout,
            default_index,
            output: Array2::from_elem((height, width), None),
            committed: bitvec![0; layout.block_count()],
        })
    }

    /// Layout being generated
    pub const fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Dense output buffer indexed `[y, x]`
    pub const fn output(&self) -> &Array2<Option<usize>> {
        &self.output
    }

    /// Test if a block's interior has been written
    pub fn is_committed(&self, block: [usize; 2]) -> bool {
        self.block_slot(block)
            .and_then(|slot| self.committed.get(slot).as_deref().copied())
            .unwrap_or(false)
    }

    fn block_slot(&self, block: [usize; 2]) -> Option<usize> {
        (block[0] < self.layout.blocks_x && block[1] < self.layout.blocks_y)
            .then_some(block[1] * self.layout.blocks_x + block[0])
    }

    /// Tile constraint carried by one halo position
    ///
    /// Outside the map or inside an uncommitted block this is the default
    /// tile; inside a committed block it is whatever that block resolved to.
    fn halo_slot(&self, x: Option<usize>, y: Option<usize>) -> Option<usize> {
        let (Some(x), Some(y)) = (x, y) else {
            return Some(self.default_index);
        };
        let block = [x / self.layout.block_width, y / self.layout.block_height];
        if !self.is_committed(block) {
            return Some(self.default_index);
        }
        self.output.get([y, x]).copied().unwrap_or(Some(self.default_index))
    }

    /// Border vectors of a block read from its halo ring
    pub fn extract_borders(&self, block: [usize; 2]) -> Borders {
        let x0 = block[0] * self.layout.block_width;
        let y0 = block[1] * self.layout.block_height;
        let xs = x0..x0 + self.layout.block_width;
        let ys = y0..y0 + self.layout.block_height;

        let above = Some(y0 + self.layout.block_height);
        let beyond = Some(x0 + self.layout.block_width);

        let down = xs.clone().map(|x| self.halo_slot(Some(x), y0.checked_sub(1))).collect();
        let up = xs.map(|x| self.halo_slot(Some(x), above)).collect();
        let left = ys.clone().map(|y| self.halo_slot(x0.checked_sub(1), Some(y))).collect();
        let right = ys.map(|y| self.halo_slot(beyond, Some(y))).collect();

        Borders::none()
            .with_edge(Direction::Down, down)
            .with_edge(Direction::Up, up)
            .with_edge(Direction::Left, left)
            .with_edge(Direction::Right, right)
    }

    fn commit(&mut self, solution: &BlockSolution) {
        let block = solution.report.block;
        let x0 = block[0] * self.layout.block_width;
        let y0 = block[1] * self.layout.block_height;
        for (index, &tile) in solution.cells.iter().enumerate() {
            let x = x0 + index % self.layout.block_width;
            let y = y0 + index / self.layout.block_width;
            if let Some(slot) = self.output.get_mut([y, x]) {
                *slot = tile;
            }
        }
        if let Some(slot) = self.block_slot(block) {
            self.committed.set(slot, true);
        }
    }

    /// Solve and commit every block of one pass
    ///
    /// Blocks of the pass are solved in parallel against the buffer as it was
    /// before the pass, then committed in row order.
    ///
    /// # Errors
    ///
    /// Returns an error if a block solver cannot be constructed.
    pub fn run_pass<F>(&mut self, pass: usize, on_block: &mut F) -> Result<Vec<BlockReport>>
    where
        F: FnMut(&BlockReport),
    {
        let started = Instant::now();
        let jobs: Vec<BlockJob> = self
            .layout
            .blocks_in_pass(pass)
            .into_iter()
            .map(|block| BlockJob {
                block,
                pass,
                borders: self.extract_borders(block),
                seed: block_seed(self.layout.seed, block),
            })
            .collect();

        let table = self.table;
        let layout = self.layout;
        let solutions: Vec<Result<BlockSolution>> =
            jobs.par_iter().map(|job| solve_block(table, &layout, job)).collect();

        let mut reports = Vec::with_capacity(solutions.len());
        for solution in solutions {
            let solution = solution?;
            if solution.report.status == SolveStatus::Error {
                log::warn!(
                    "Block ({}, {}) finished with {} unresolved cells",
                    solution.report.block[0],
                    solution.report.block[1],
                    solution.report.unresolved
                );
            }
            self.commit(&solution);
            on_block(&solution.report);
            reports.push(solution.report);
        }

        log::info!(
            "Pass {pass} solved {} blocks in {:.2?}",
            reports.len(),
            started.elapsed()
        );
        Ok(reports)
    }

    /// Run all four passes
    ///
    /// # Errors
    ///
    /// Returns an error if a block solver cannot be constructed.
    pub fn generate(&mut self) -> Result<BlockedGeneration> {
        self.generate_with(|_| {})
    }

    /// Run all four passes, reporting each block as it is committed
    ///
    /// # Errors
    ///
    /// Returns an error if a block solver cannot be constructed.
    pub fn generate_with<F>(&mut self, mut on_block: F) -> Result<BlockedGeneration>
    where
        F: FnMut(&BlockReport),
    {
        self.output.fill(None);
        self.committed.fill(false);

        let mut reports = Vec::with_capacity(self.layout.block_count());
        for pass in 0..PASS_ORDER.len() {
            reports.extend(self.run_pass(pass, &mut on_block)?);
        }

        let status = reports
            .iter()
            .fold(SolveStatus::Ok, |status, report| status.max_with(report.status));
        let (map, unresolved) = self.final_map();
        Ok(BlockedGeneration {
            map,
            status,
            reports,
            unresolved,
        })
    }

    fn final_map(&self) -> (TileMap, Vec<[usize; 2]>) {
        let index_map = self.table.index_map();
        let mut unresolved = Vec::new();
        let tiles = Array2::from_shape_fn(self.output.dim(), |(y, x)| {
            match self.output.get([y, x]).copied().flatten() {
                Some(tile) => index_map.to_external_or_unresolved(Some(tile)),
                None => {
                    unresolved.push([x, y]);
                    self.layout.default_tile
                }
            }
        });
        (TileMap::from_array(tiles), unresolved)
    }
}
