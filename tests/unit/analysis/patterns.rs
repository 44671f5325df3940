//! Tests for learning rule sets from sample maps and images

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use ndarray::{Array2, array};
    use tilecollapse::analysis::patterns::SampleProcessor;
    use tilecollapse::spatial::tiles::{Direction, ModuleTable, UNRESOLVED_TILE};

    // Tests empty and all-unresolved samples are rejected
    #[test]
    fn test_rejects_empty_samples() {
        assert!(SampleProcessor::from_grid(Array2::zeros((0, 3))).is_err());
        assert!(SampleProcessor::from_grid(Array2::from_elem((2, 2), UNRESOLVED_TILE)).is_err());
    }

    // Tests weights count occurrences of each id
    // Verified by counting unresolved cells as a tile
    #[test]
    fn test_weights_are_counts() {
        let sample = array![[4, 4, 7], [UNRESOLVED_TILE, 4, 7]];
        let processor = SampleProcessor::from_grid(sample).expect("valid sample");
        let rules = processor.learn_rules();

        assert_eq!(processor.tile_counts().into_iter().collect::<Vec<_>>(), vec![(4, 3), (7, 2)]);
        assert_eq!(rules.tiles.iter().map(|tile| tile.id).collect::<Vec<_>>(), vec![4, 7]);
        assert!(rules.get(4).is_some_and(|tile| (tile.weight - 3.0).abs() < f64::EPSILON));
    }

    // Tests adjacencies are recorded per direction with y pointing up
    // Verified by swapping up and down offsets
    #[test]
    fn test_learns_directional_adjacency() {
        // y = 0 is the first row: 1 sits above 0, 2 sits right of 0
        let sample = array![[0, 2], [1, 1]];
        let rules = SampleProcessor::from_grid(sample).expect("valid sample").learn_rules();

        let zero = rules.get(0).expect("tile 0");
        assert_eq!(zero.neighbors.get(Direction::Up), &[1]);
        assert!(zero.neighbors.get(Direction::Down).is_empty());
        assert_eq!(zero.neighbors.get(Direction::Right), &[2]);
        assert!(zero.neighbors.get(Direction::Left).is_empty());

        let one = rules.get(1).expect("tile 1");
        assert_eq!(one.neighbors.get(Direction::Down), &[0, 2]);
        assert_eq!(one.neighbors.get(Direction::Left), &[1]);
        assert_eq!(one.neighbors.get(Direction::Right), &[1]);

        let two = rules.get(2).expect("tile 2");
        assert_eq!(two.neighbors.get(Direction::Left), &[0]);
        assert_eq!(two.neighbors.get(Direction::Up), &[1]);
    }

    // Tests empty cells do not create adjacencies
    #[test]
    fn test_skips_unresolved_neighbors() {
        let sample = array![[3, UNRESOLVED_TILE, 3]];
        let rules = SampleProcessor::from_grid(sample).expect("valid sample").learn_rules();
        let three = rules.get(3).expect("tile 3");
        for direction in Direction::ALL {
            assert!(three.neighbors.get(direction).is_empty());
        }
    }

    // Tests learned rules always compile into a table
    #[test]
    fn test_learned_rules_build() {
        let sample = array![[0, 1, 2, 1], [1, 1, 2, 0], [2, 0, 0, 1]];
        let rules = SampleProcessor::from_grid(sample).expect("valid sample").learn_rules();
        let table = ModuleTable::build(&rules).expect("valid table");
        assert_eq!(table.len(), 3);
    }

    // Tests PNG colours become sorted ids and rows are flipped
    // Verified by numbering colours in pixel order
    #[test]
    fn test_from_png_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("sample.png");
        let white = [255, 255, 255, 255];
        let black = [0, 0, 0, 255];
        let image = RgbaImage::from_fn(3, 2, |x, y| match (x, y) {
            (0, 0) => Rgba(white),
            (2, 1) => Rgba([9, 9, 9, 0]),
            _ => Rgba(black),
        });
        image.save(&path).expect("save sample");

        let processor = SampleProcessor::from_png_file(&path).expect("load sample");
        assert_eq!(processor.color_mapping(), &[black, white]);
        assert_eq!(processor.sample(), &array![[0, 0, UNRESOLVED_TILE], [1, 0, 0]]);
    }

    // Tests unreadable images are reported
    #[test]
    fn test_from_png_file_missing() {
        assert!(SampleProcessor::from_png_file("/nonexistent/sample.png").is_err());
    }
}
