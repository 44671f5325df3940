//! Tests for error messages and source chaining

#[cfg(test)]
mod tests {
    use std::error::Error;
    use tilecollapse::AlgorithmError;
    use tilecollapse::io::error::invalid_parameter;
    use tilecollapse::spatial::tiles::Direction;

    // Tests wrapped errors expose their source
    // Verified by returning None for file system errors
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = AlgorithmError::FileSystem {
            path: "/tmp/rules.json".into(),
            operation: "read rule file",
            source: io_error,
        };
        assert!(error.source().is_some());
        assert!(error.to_string().contains("/tmp/rules.json"));

        let json_error = serde_json::from_str::<u8>("{").expect_err("invalid json");
        let error = AlgorithmError::RuleFormat {
            path: "rules.json".into(),
            source: json_error,
        };
        assert!(error.source().is_some());
        assert!(AlgorithmError::EmptyRuleSet.source().is_none());
    }

    // Tests rule errors name the offending tile
    // Verified by omitting the neighbour from the message
    #[test]
    fn test_rule_error_messages() {
        let error = AlgorithmError::UnknownNeighbor {
            tile: 3,
            neighbor: 8,
            direction: Direction::Left,
        };
        let message = error.to_string();
        assert!(message.contains("Tile 3"));
        assert!(message.contains('8'));
        assert!(message.contains("left"));

        let error = AlgorithmError::TooManyTiles { count: 200, max: 128 };
        assert!(error.to_string().contains("at most 127"));

        let error = AlgorithmError::InvalidWeight { tile: 2, weight: -1.0 };
        assert!(error.to_string().contains("-1"));
    }

    // Tests the helper fills every field
    #[test]
    fn test_invalid_parameter_helper() {
        let error = invalid_parameter("width", &0, &"must be positive");
        match &error {
            AlgorithmError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                assert_eq!(*parameter, "width");
                assert_eq!(value, "0");
                assert_eq!(reason, "must be positive");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(error.to_string().contains("'width' = '0'"));
    }

    // Tests io errors convert through the question mark operator
    #[test]
    fn test_from_io_error() {
        fn read() -> tilecollapse::Result<String> {
            Ok(std::fs::read_to_string("/nonexistent/tilecollapse/rules.json")?)
        }
        assert!(matches!(read(), Err(AlgorithmError::FileSystem { .. })));
    }
}
