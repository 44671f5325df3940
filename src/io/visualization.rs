//! Frame capture and GIF generation for step-wise solving

use crate::algorithm::executor::SolverObserver;
use crate::io::configuration::{EXPORT_CELL_SCALE, VIEWER_MIN_FRAME_DELAY_MS};
use crate::io::error::{AlgorithmError, Result};
use crate::io::image::ensure_parent_dir;
use image::{Frame, Rgba, RgbaImage};

const DEAD_COLOR: [u8; 4] = [0, 0, 0, 255];

/// One cell reaching a final state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEvent {
    /// `[x, y]` position
    pub position: [usize; 2],
    /// Resolved tile index, `None` for a dead cell
    pub tile: Option<usize>,
    /// Cycle in which the cell reached this state
    pub cycle: usize,
}

/// Records resolved and dead cells while a solver runs
///
/// Attach it with `WaveSolver::run_observed`; cells still holding several
/// candidates are not recorded.
pub struct VisualizationCapture {
    pub(crate) events: Vec<CellEvent>,
    width: usize,
    height: usize,
    color_mapping: Vec<[u8; 4]>,
    empty_color: [u8; 4],
    cycle: usize,
}

impl VisualizationCapture {
    /// Create a capture for a `width × height` grid
    ///
    /// `color_mapping` is indexed by dense tile index. The average of all tile
    /// colours is used for cells not yet resolved.
    pub fn new(width: usize, height: usize, color_mapping: Vec<[u8; 4]>) -> Self {
        let empty_color = if color_mapping.is_empty() {
            [128, 128, 128, 255]
        } else {
            let mut sums = [0u32; 4];
            for color in &color_mapping {
                for (sum, &channel) in sums.iter_mut().zip(color) {
                    *sum += u32::from(channel);
                }
            }
            let count = color_mapping.len() as u32;
            sums.map(|sum| (sum / count) as u8)
        };

        Self {
            events: Vec::with_capacity(width * height),
            width,
            height,
            color_mapping,
            empty_color,
            cycle: 1,
        }
    }

    /// Returns all recorded events
    pub fn events(&self) -> &[CellEvent] {
        &self.events
    }

    /// Returns the total number of recorded events
    pub const fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Export the captured cycles as a GIF with automatic frame skipping
    ///
    /// One frame is rendered per cycle. If `frame_delay_ms` is below what
    /// viewers reliably support, frames are skipped to keep the apparent speed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No events were captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(&self, output_path: &str, frame_delay_ms: u32) -> Result<()> {
        if self.events.is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "No cell events captured for visualization".to_string(),
            });
        }

        let frame_delay_ms = frame_delay_ms.max(1);
        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms)
        } else {
            1
        };

        let frames = self.generate_frames(effective_delay_ms, skip_factor as usize);

        ensure_parent_dir(output_path)?;
        let file = std::fs::File::create(output_path).map_err(|e| AlgorithmError::FileSystem {
            path: output_path.into(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| AlgorithmError::ImageExport {
                path: output_path.into(),
                source: e,
            })?;

        Ok(())
    }

    fn generate_frames(&self, delay_ms: u32, skip_factor: usize) -> Vec<Frame> {
        let mut grid: Vec<Option<Option<usize>>> = vec![None; self.width * self.height];
        let mut frames = vec![self.render_frame(&grid, delay_ms)];

        let mut rendered_cycles = 0;
        let mut pending = false;
        let mut events = self.events.iter().peekable();
        while let Some(event) = events.next() {
            let [x, y] = event.position;
            if x < self.width && y < self.height {
                if let Some(cell) = grid.get_mut(y * self.width + x) {
                    *cell = Some(event.tile);
                }
                pending = true;
            }

            let cycle_ends = events.peek().is_none_or(|next| next.cycle != event.cycle);
            if cycle_ends && pending {
                rendered_cycles += 1;
                pending = false;
                if rendered_cycles % skip_factor == 0 {
                    frames.push(self.render_frame(&grid, delay_ms));
                }
            }
        }

        if rendered_cycles % skip_factor != 0 {
            frames.push(self.render_frame(&grid, delay_ms));
        }

        // Final frame displays longer for better visibility
        frames.push(self.render_frame(&grid, delay_ms * 25));
        frames
    }

    fn render_frame(&self, grid: &[Option<Option<usize>>], delay_ms: u32) -> Frame {
        let scale = EXPORT_CELL_SCALE.max(1);
        let img = RgbaImage::from_fn(
            self.width as u32 * scale,
            self.height as u32 * scale,
            |px, py| {
                let x = (px / scale) as usize;
                let y = self.height.saturating_sub((py / scale) as usize + 1);
                let color = match grid.get(y * self.width + x).copied().flatten() {
                    None => self.empty_color,
                    Some(None) => DEAD_COLOR,
                    Some(Some(tile)) => self
                        .color_mapping
                        .get(tile)
                        .copied()
                        .unwrap_or(self.empty_color),
                };
                Rgba(color)
            },
        );

        Frame::from_parts(img, 0, 0, image::Delay::from_numer_denom_ms(delay_ms, 1))
    }
}

impl SolverObserver for VisualizationCapture {
    fn cell_changed(&mut self, position: [usize; 2], domain_size: usize, selected: Option<usize>) {
        if domain_size > 1 {
            return;
        }
        self.events.push(CellEvent {
            position,
            tile: selected,
            cycle: self.cycle,
        });
    }

    fn cycle_completed(&mut self, cycle: usize) {
        self.cycle = cycle + 1;
    }
}
