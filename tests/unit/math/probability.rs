//! Tests for weighted entropy and cumulative selection

#[cfg(test)]
mod tests {
    use tilecollapse::math::probability::{cumulative_choice, shannon_entropy};

    // Tests uniform weights give log2 of the count
    // Verified by dropping the normalisation step
    #[test]
    fn test_entropy_of_uniform_weights() {
        assert!((shannon_entropy([3.0, 3.0]) - 1.0).abs() < 1e-12);
        assert!((shannon_entropy(vec![0.5; 8]) - 3.0).abs() < 1e-12);
    }

    // Tests degenerate weight sets have zero entropy
    #[test]
    fn test_entropy_of_degenerate_weights() {
        assert_eq!(shannon_entropy([4.0]), 0.0);
        assert_eq!(shannon_entropy(Vec::<f64>::new()), 0.0);
        assert_eq!(shannon_entropy([0.0, 0.0]), 0.0);
        assert!((shannon_entropy([0.0, 1.0, 1.0]) - 1.0).abs() < 1e-12);
    }

    // Tests draws map onto weight intervals
    // Verified by comparing with <= instead of <
    #[test]
    fn test_cumulative_choice_intervals() {
        let weights = [1.0, 2.0, 1.0];
        assert_eq!(cumulative_choice(&weights, 0.0), Some(0));
        assert_eq!(cumulative_choice(&weights, 0.24), Some(0));
        assert_eq!(cumulative_choice(&weights, 0.25), Some(1));
        assert_eq!(cumulative_choice(&weights, 0.74), Some(1));
        assert_eq!(cumulative_choice(&weights, 0.75), Some(2));
    }

    // Tests zero weights are never chosen and rounding falls back
    #[test]
    fn test_cumulative_choice_edges() {
        assert_eq!(cumulative_choice(&[], 0.5), None);
        assert_eq!(cumulative_choice(&[0.0, 0.0], 0.5), None);
        assert_eq!(cumulative_choice(&[0.0, 1.0, 0.0], 0.0), Some(1));
        assert_eq!(cumulative_choice(&[1.0, 1.0, 0.0], 1.0), Some(1));
    }
}
