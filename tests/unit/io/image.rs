//! Tests for tile colours, map rendering and PNG export

#[cfg(test)]
mod tests {
    use ndarray::array;
    use tilecollapse::analysis::patterns::SampleProcessor;
    use tilecollapse::io::image::{export_map_as_png, palette_color, render_map, tile_color};
    use tilecollapse::spatial::grid::TileMap;
    use tilecollapse::spatial::tiles::UNRESOLVED_TILE;

    const DARK: [u8; 4] = [10, 10, 10, 255];
    const RED: [u8; 4] = [200, 0, 0, 255];

    // Tests mapped ids use their colour and others use the palette
    // Verified by ignoring the colour mapping
    #[test]
    fn test_tile_color_lookup() {
        let mapping = [DARK, RED];
        assert_eq!(tile_color(1, &mapping), RED);
        assert_eq!(tile_color(5, &mapping), palette_color(5));
        assert_eq!(tile_color(UNRESOLVED_TILE, &mapping), [0, 0, 0, 0]);
        assert_eq!(tile_color(-7, &[]), palette_color(-7));
    }

    // Tests palette colours are opaque and distinguish nearby ids
    #[test]
    fn test_palette_is_opaque() {
        for tile in 0..16 {
            assert_eq!(palette_color(tile)[3], 255);
            assert_eq!(palette_color(tile), palette_color(tile));
        }
        assert_ne!(palette_color(0), palette_color(1));
    }

    // Tests the highest y lands on the top image row
    // Verified by rendering rows without flipping
    #[test]
    fn test_render_flips_rows() {
        let map = TileMap::from_array(array![[0, 0], [1, 1]]);
        let image = render_map(&map, &[DARK, RED], 2);
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(0, 0).0, RED);
        assert_eq!(image.get_pixel(3, 3).0, DARK);
    }

    // Tests an exported map reads back as the same sample
    // Verified by exporting without flipping rows
    #[test]
    fn test_export_reads_back() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("nested").join("map.png");
        let map = TileMap::from_array(array![[0, 1, 1], [1, 0, UNRESOLVED_TILE]]);

        export_map_as_png(&map, &[DARK, RED], path.to_str().expect("utf-8 path"))
            .expect("export");
        let sample = SampleProcessor::from_png_file(&path).expect("reload");

        assert_eq!(sample.sample(), map.as_array());
        assert_eq!(sample.color_mapping(), &[DARK, RED]);
    }

    // Tests empty maps are not exported
    #[test]
    fn test_export_empty_map_fails() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("empty.png");
        let map = TileMap::filled(0, 3, 0);
        assert!(export_map_as_png(&map, &[], path.to_str().expect("utf-8 path")).is_err());
        assert!(!path.exists());
    }
}
