//! Command-line interface for generating tile maps from rule files or samples

use crate::algorithm::blocks::{BlockLayout, BlockScheduler};
use crate::algorithm::executor::{SolveStatus, SolverConfig, WaveSolver};
use crate::analysis::patterns::SampleProcessor;
use crate::analysis::statistics::MapStatistics;
use crate::io::configuration::{
    DEFAULT_FILLER_TILE, DEFAULT_HEIGHT, DEFAULT_SEED, DEFAULT_WIDTH, GIF_FRAME_DELAY_MS,
    OUTPUT_SUFFIX, RULES_SUFFIX,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{export_map_as_png, tile_color};
use crate::io::progress::ProgressManager;
use crate::io::rules::{load_rules, save_rules};
use crate::io::visualization::VisualizationCapture;
use crate::spatial::grid::TileMap;
use crate::spatial::tiles::{ModuleTable, RuleSet};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "tilecollapse")]
#[command(
    author,
    version,
    about = "Generate tile maps with wave function collapse"
)]
/// Command-line arguments for the map generation tool
pub struct Cli {
    /// Rule set (.json) or sample image (.png) to learn rules from
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Map width in cells, or block width when generating in blocks
    #[arg(short = 'w', long, default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// Map height in cells, or block height when generating in blocks
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    pub height: usize,

    /// Number of block columns; enables chunked generation
    #[arg(long)]
    pub blocks_x: Option<usize>,

    /// Number of block rows; enables chunked generation
    #[arg(long)]
    pub blocks_y: Option<usize>,

    /// Tile id assumed around the map and filled into unresolved block cells
    #[arg(short, long, default_value_t = DEFAULT_FILLER_TILE, allow_hyphen_values = true)]
    pub default_tile: i32,

    /// Output PNG path (defaults to <target>_result.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the rule set in use as JSON (defaults to <target>_rules.json)
    #[arg(short, long, num_args = 0..=1, value_name = "PATH")]
    pub rules_out: Option<Option<PathBuf>>,

    /// Enable visualization output as animated GIF
    #[arg(short, long)]
    pub visualize: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Block layout when chunked generation was requested
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting layout is invalid.
    pub fn block_layout(&self) -> Result<Option<BlockLayout>> {
        if self.blocks_x.is_none() && self.blocks_y.is_none() {
            return Ok(None);
        }
        BlockLayout::new(
            self.blocks_x.unwrap_or(1),
            self.blocks_y.unwrap_or(1),
            self.width,
            self.height,
            self.default_tile,
            self.seed,
        )
        .map(Some)
    }

    /// Path of the generated PNG
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.target, &format!("{OUTPUT_SUFFIX}.png")))
    }

    /// Path for the rule set export, if requested
    pub fn rules_path(&self) -> Option<PathBuf> {
        self.rules_out
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(|| rules_path_for(&self.target)))
    }

    /// Path of the visualization GIF
    pub fn visualization_path(&self) -> PathBuf {
        sibling_path(&self.output_path(), "_visualization.gif")
    }
}

/// Path next to `input` named `<stem><suffix>`
pub fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let name = format!("{}{suffix}", stem.to_string_lossy());
    input
        .parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

/// Default path for rules learned from `sample`
pub fn rules_path_for(sample: &Path) -> PathBuf {
    sibling_path(sample, &format!("{RULES_SUFFIX}.json"))
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| invalid_parameter("path", &path.display(), &"not valid UTF-8"))
}

/// Result of one command-line run
#[derive(Debug)]
pub struct RunSummary {
    /// Where the PNG was written
    pub output: PathBuf,
    /// Soft status of the solve
    pub status: SolveStatus,
    /// Statistics of the generated map
    pub statistics: MapStatistics,
}

/// Loads the target, runs the solver and writes the outputs
pub struct MapGenerator {
    cli: Cli,
}

impl MapGenerator {
    /// Create a generator for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Read the rule set and sample colours from the target
    ///
    /// # Errors
    ///
    /// Returns an error if the target is neither a `.json` nor a `.png` file
    /// or cannot be loaded.
    pub fn load_target(&self) -> Result<(RuleSet, Vec<[u8; 4]>)> {
        let target = &self.cli.target;
        match target.extension().and_then(|s| s.to_str()) {
            Some("png") => {
                let sample = SampleProcessor::from_png_file(target)?;
                let rules = sample.learn_rules();
                log::info!(
                    "Learned {} tiles from sample {}",
                    rules.len(),
                    target.display()
                );
                Ok((rules, sample.color_mapping().to_vec()))
            }
            Some("json") => Ok((load_rules(target)?, Vec::new())),
            _ => Err(invalid_parameter(
                "target",
                &target.display(),
                &"must be a .json rule set or a .png sample",
            )),
        }
    }

    /// Run generation end to end
    ///
    /// # Errors
    ///
    /// Returns an error if loading, table construction, solver setup or any
    /// export fails. Unresolved cells are not an error.
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let (rules, colors) = self.load_target()?;
        if let Some(rules_path) = self.cli.rules_path() {
            save_rules(&rules, path_str(&rules_path)?)?;
        }

        let table = ModuleTable::build(&rules)?;
        let (map, status) = match self.cli.block_layout()? {
            Some(layout) => self.generate_blocks(&table, layout)?,
            None => self.generate_single(&table, &colors)?,
        };

        let statistics = MapStatistics::compute(&map, &table);
        log::info!("{statistics} in {:.2?}", started.elapsed());
        if status != SolveStatus::Ok {
            log::warn!("Generation finished with status {status}; try another seed");
        }

        let output = self.cli.output_path();
        export_map_as_png(&map, &colors, path_str(&output)?)?;

        Ok(RunSummary {
            output,
            status,
            statistics,
        })
    }

    fn generate_single(
        &self,
        table: &ModuleTable,
        colors: &[[u8; 4]],
    ) -> Result<(TileMap, SolveStatus)> {
        let config = SolverConfig::new(self.cli.width, self.cli.height, self.cli.seed)?;
        let mut solver = WaveSolver::new(table, config)?;
        let quiet = !self.cli.should_show_progress();
        let progress = ProgressManager::new("cycles", config.cell_count(), quiet);

        let mut capture = self.cli.visualize.then(|| {
            let dense_colors = table
                .index_map()
                .external_ids()
                .iter()
                .map(|&id| tile_color(id, colors))
                .collect();
            VisualizationCapture::new(config.width, config.height, dense_colors)
        });

        loop {
            let step = match capture.as_mut() {
                Some(observer) => solver.step_observed(observer),
                None => solver.step_once(),
            };
            progress.tick();
            if step.done {
                break;
            }
        }
        progress.finish(&solver.status().to_string());

        if let Some(capture) = &capture {
            let gif_path = self.cli.visualization_path();
            capture.export_gif(path_str(&gif_path)?, GIF_FRAME_DELAY_MS)?;
        }

        Ok((solver.tile_map(), solver.status()))
    }

    fn generate_blocks(
        &self,
        table: &ModuleTable,
        layout: BlockLayout,
    ) -> Result<(TileMap, SolveStatus)> {
        if self.cli.visualize {
            log::warn!("Visualization is only available for single-grid generation");
        }
        let mut scheduler = BlockScheduler::new(table, layout)?;
        let quiet = !self.cli.should_show_progress();
        let progress = ProgressManager::new("blocks", layout.block_count(), quiet);
        let generation = scheduler.generate_with(|_| progress.tick())?;
        progress.finish(&generation.status.to_string());
        if !generation.unresolved.is_empty() {
            log::warn!(
                "{} unresolved cells filled with tile {}",
                generation.unresolved.len(),
                layout.default_tile
            );
        }
        Ok((generation.map, generation.status))
    }
}
