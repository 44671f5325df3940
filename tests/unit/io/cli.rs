//! Tests for argument parsing, output paths and end-to-end runs

#[cfg(test)]
mod tests {
    use clap::Parser;
    use image::{Rgba, RgbaImage};
    use std::path::{Path, PathBuf};
    use tilecollapse::SolveStatus;
    use tilecollapse::io::cli::{Cli, MapGenerator, rules_path_for, sibling_path};
    use tilecollapse::io::configuration::{DEFAULT_SEED, DEFAULT_WIDTH};
    use tilecollapse::io::rules::{load_rules, save_rules};
    use tilecollapse::spatial::tiles::{Direction, RuleSet, TileRule};

    fn band_rules() -> RuleSet {
        let rule = |id: i32, neighbors: &[i32]| {
            let mut rule = TileRule::new(id, 1.0);
            for direction in Direction::ALL {
                rule = rule.allow(direction, neighbors);
            }
            rule
        };
        RuleSet::new(vec![
            rule(10, &[10, 20]),
            rule(20, &[10, 20, 30]),
            rule(30, &[20, 30]),
        ])
    }

    fn write_rules(dir: &Path) -> PathBuf {
        let path = dir.join("band.json");
        save_rules(&band_rules(), path.to_str().unwrap()).unwrap();
        path
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("tilecollapse").chain(args.iter().copied()))
    }

    // Tests defaults apply when only the target is given
    // Verified by changing the default seed
    #[test]
    fn test_defaults() {
        let cli = parse(&["rules.json"]);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.width, DEFAULT_WIDTH);
        assert!(cli.should_show_progress());
        assert!(cli.rules_path().is_none());
        assert!(cli.block_layout().unwrap().is_none());
        assert_eq!(cli.output_path(), PathBuf::from("rules_result.png"));
    }

    // Tests block options build a layout and accept negative defaults
    // Verified by removing allow_hyphen_values from the default tile
    #[test]
    fn test_block_layout_options() {
        let cli = parse(&["rules.json", "-w", "8", "-H", "4", "--blocks-x", "3", "-d", "-3"]);
        let layout = cli.block_layout().unwrap().unwrap();
        assert_eq!(layout.blocks_x, 3);
        assert_eq!(layout.blocks_y, 1);
        assert_eq!(layout.map_width(), Some(24));
        assert_eq!(layout.default_tile, -3);

        let cli = parse(&["rules.json", "--blocks-y", "0"]);
        assert!(cli.block_layout().is_err());
    }

    // Tests derived file names sit next to their input
    #[test]
    fn test_derived_paths() {
        assert_eq!(
            sibling_path(Path::new("maps/forest.png"), "_result.png"),
            PathBuf::from("maps/forest_result.png")
        );
        assert_eq!(
            rules_path_for(Path::new("maps/forest.png")),
            PathBuf::from("maps/forest_rules.json")
        );

        let cli = parse(&["maps/forest.png", "-o", "out/map.png", "-r"]);
        assert_eq!(cli.output_path(), PathBuf::from("out/map.png"));
        assert_eq!(cli.rules_path(), Some(PathBuf::from("maps/forest_rules.json")));
        assert_eq!(cli.visualization_path(), PathBuf::from("out/map_visualization.gif"));

        let cli = parse(&["maps/forest.png", "--rules-out", "learned.json"]);
        assert_eq!(cli.rules_path(), Some(PathBuf::from("learned.json")));
    }

    // Tests unsupported targets are rejected before any work
    // Verified by treating unknown extensions as rule files
    #[test]
    fn test_invalid_target_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("rules.txt");
        std::fs::write(&target, "{}").unwrap();

        let cli = parse(&[target.to_str().unwrap(), "-q"]);
        assert!(MapGenerator::new(cli).run().is_err());
        assert!(MapGenerator::new(parse(&["missing.json", "-q"])).run().is_err());
    }

    // Tests a rule file run writes a fully resolved PNG and GIF
    // Verified by skipping the PNG export
    #[test]
    fn test_run_from_rule_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = write_rules(temp_dir.path());
        let output = temp_dir.path().join("map.png");

        let cli = parse(&[
            target.to_str().unwrap(),
            "-w",
            "12",
            "-H",
            "7",
            "-o",
            output.to_str().unwrap(),
            "-v",
            "-q",
        ]);
        let gif = cli.visualization_path();
        let summary = MapGenerator::new(cli).run().unwrap();

        assert_eq!(summary.status, SolveStatus::Ok);
        assert_eq!(summary.output, output);
        assert_eq!(summary.statistics.width, 12);
        assert_eq!(summary.statistics.height, 7);
        assert_eq!(summary.statistics.unresolved, 0);
        assert!(summary.statistics.is_valid());
        assert!(output.exists());
        assert!(gif.exists());
    }

    // Tests chunked generation through the command line
    #[test]
    fn test_run_in_blocks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = write_rules(temp_dir.path());

        let cli = parse(&[
            target.to_str().unwrap(),
            "-w",
            "5",
            "-H",
            "4",
            "--blocks-x",
            "2",
            "--blocks-y",
            "3",
            "-d",
            "20",
            "-q",
        ]);
        let summary = MapGenerator::new(cli).run().unwrap();

        assert_eq!(summary.output, temp_dir.path().join("band_result.png"));
        assert_eq!(summary.statistics.width, 10);
        assert_eq!(summary.statistics.height, 12);
        assert!(summary.statistics.is_valid());
        assert!(summary.output.exists());
    }

    // Tests rules learned from a PNG sample are exported
    // Verified by writing rules before learning them
    #[test]
    fn test_run_from_sample_exports_rules() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sample_path = temp_dir.path().join("stripes.png");
        let sample = RgbaImage::from_fn(4, 4, |x, _| {
            if x < 2 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        sample.save(&sample_path).unwrap();

        let cli = parse(&[sample_path.to_str().unwrap(), "-w", "6", "-H", "6", "-q", "-r"]);
        let rules_path = cli.rules_path().unwrap();
        let summary = MapGenerator::new(cli).run().unwrap();

        let rules = load_rules(&rules_path).unwrap();
        assert_eq!(rules.len(), 2);
        let right = rules.get(0).map(|tile| tile.neighbors.get(Direction::Right).to_vec());
        assert_eq!(right, Some(vec![0, 1]));
        assert_eq!(summary.statistics.width, 6);
        assert!(summary.statistics.is_valid());
    }
}
