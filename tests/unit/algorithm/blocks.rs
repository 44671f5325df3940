//! Tests for block layouts, pass partitioning and border stitching

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use tilecollapse::algorithm::blocks::{BlockLayout, BlockScheduler, PASS_ORDER, block_seed};
    use tilecollapse::algorithm::executor::SolveStatus;
    use tilecollapse::analysis::statistics::validate_adjacency;
    use tilecollapse::io::configuration::MAX_GRID_DIMENSION;
    use tilecollapse::spatial::tiles::{Direction, ModuleTable, RuleSet, TileRule};

    fn rule(id: i32, neighbors: &[i32]) -> TileRule {
        let mut rule = TileRule::new(id, 1.0);
        for direction in Direction::ALL {
            rule = rule.allow(direction, neighbors);
        }
        rule
    }

    fn band_table() -> ModuleTable {
        ModuleTable::build(&RuleSet::new(vec![
            rule(0, &[0, 1]),
            rule(1, &[0, 1, 2]),
            rule(2, &[1, 2]),
        ]))
        .expect("valid table")
    }

    // Tests layout validation of counts and total size
    // Verified by removing the map size check
    #[test]
    fn test_layout_validation() {
        assert!(BlockLayout::new(0, 2, 4, 4, 0, 1).is_err());
        assert!(BlockLayout::new(2, 2, 0, 4, 0, 1).is_err());
        assert!(BlockLayout::new(3, 1, MAX_GRID_DIMENSION / 2, 4, 0, 1).is_err());
        let layout = BlockLayout::new(3, 2, 5, 4, 0, 1).expect("valid layout");
        assert_eq!(layout.map_width(), Some(15));
        assert_eq!(layout.map_height(), Some(8));
        assert_eq!(layout.block_count(), 6);
    }

    // Tests the four passes partition all blocks with no touching pair
    // Verified by keying passes on block_x alone
    #[test]
    fn test_passes_partition_blocks() {
        let layout = BlockLayout::new(5, 4, 2, 2, 0, 1).expect("valid layout");
        let mut seen = HashSet::new();
        for pass in 0..PASS_ORDER.len() {
            let blocks = layout.blocks_in_pass(pass);
            for block in &blocks {
                assert_eq!(BlockLayout::pass_of(*block), pass);
                assert!(seen.insert(*block));
            }
            for a in &blocks {
                for b in &blocks {
                    let dx = a[0].abs_diff(b[0]);
                    let dy = a[1].abs_diff(b[1]);
                    assert!(a == b || dx > 1 || dy > 1, "{a:?} touches {b:?}");
                }
            }
        }
        assert_eq!(seen.len(), layout.block_count());
    }

    // Tests block seeds differ by position and are stable
    #[test]
    fn test_block_seed_varies() {
        assert_eq!(block_seed(7, [1, 2]), block_seed(7, [1, 2]));
        assert_ne!(block_seed(7, [1, 2]), block_seed(7, [2, 1]));
        assert_ne!(block_seed(7, [0, 0]), block_seed(8, [0, 0]));
    }

    // Tests the default tile must be part of the table
    // Verified by defaulting to index 0 for unknown ids
    #[test]
    fn test_unknown_default_tile_rejected() {
        let table = band_table();
        let layout = BlockLayout::new(2, 2, 3, 3, 9, 1).expect("valid layout");
        assert!(BlockScheduler::new(&table, layout).is_err());
    }

    // Tests borders read the default tile until a neighbour is committed
    // Verified by reading the buffer without checking the committed flag
    #[test]
    fn test_borders_follow_committed_blocks() {
        let table = band_table();
        let layout = BlockLayout::new(2, 1, 3, 2, 2, 5).expect("valid layout");
        let mut scheduler = BlockScheduler::new(&table, layout).expect("scheduler");
        let default_index = table.index_map().to_index(2);

        let before = scheduler.extract_borders([1, 0]);
        let left = before.edge(Direction::Left).expect("left edge");
        assert!(left.iter().all(|slot| *slot == default_index));

        let reports = scheduler.run_pass(0, &mut |_| {}).expect("pass");
        assert_eq!(reports.len(), 1);
        assert!(scheduler.is_committed([0, 0]));
        assert!(!scheduler.is_committed([1, 0]));

        let after = scheduler.extract_borders([1, 0]);
        let left = after.edge(Direction::Left).expect("left edge");
        for (y, slot) in left.iter().enumerate() {
            assert_eq!(*slot, scheduler.output().get([y, 2]).copied().flatten());
        }
        let down = after.edge(Direction::Down).expect("down edge");
        assert!(down.iter().all(|slot| *slot == default_index));
    }

    // Tests a full generation covers the map with valid seams
    // Verified by writing halo tiles into the interior
    #[test]
    fn test_generate_valid_map() {
        let table = band_table();
        let layout = BlockLayout::new(3, 3, 4, 3, 0, 21).expect("valid layout");
        let mut scheduler = BlockScheduler::new(&table, layout).expect("scheduler");

        let mut seen = Vec::new();
        let generation = scheduler
            .generate_with(|report| seen.push(report.block))
            .expect("generation");

        assert_eq!(generation.map.width(), 12);
        assert_eq!(generation.map.height(), 9);
        assert_eq!(generation.status, SolveStatus::Ok);
        assert!(generation.unresolved.is_empty());
        assert_eq!(seen.len(), 9);
        assert_eq!(seen.first(), Some(&[0, 0]));
        assert!(generation
            .reports
            .iter()
            .all(|report| report.pass == BlockLayout::pass_of(report.block)));
        assert!(validate_adjacency(&generation.map, &table).is_empty());
    }

    // Tests identical layouts produce identical maps
    #[test]
    fn test_generation_deterministic() {
        let table = band_table();
        let layout = BlockLayout::new(2, 2, 5, 5, 1, 77).expect("valid layout");
        let first = BlockScheduler::new(&table, layout)
            .and_then(|mut scheduler| scheduler.generate())
            .expect("generation");
        let second = BlockScheduler::new(&table, layout)
            .and_then(|mut scheduler| scheduler.generate())
            .expect("generation");
        assert_eq!(first.map, second.map);
    }
}
