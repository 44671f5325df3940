/// Shannon entropy in bits of a weighted candidate set
///
/// Weights are normalised by their sum before computing `-Σ p·log2(p)`.
/// A non-positive sum yields 0 so that such a set is skipped by minimum
/// entropy selection instead of being starved at infinity.
pub fn shannon_entropy<I>(weights: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let weights = weights.into_iter();
    let total: f64 = weights.clone().sum();
    if total <= 0.0 {
        return 0.0;
    }

    weights
        .map(|weight| weight / total)
        .filter(|&probability| probability > 0.0)
        .map(|probability| -probability * probability.log2())
        .sum()
}

/// Index of the first weight whose running total exceeds `draw * Σweights`
///
/// `draw` is expected in `[0, 1)`. Ties resolve to the earliest entry; a
/// draw lost to rounding falls back to the last positive weight.
pub fn cumulative_choice(weights: &[f64], draw: f64) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let target = draw * total;
    let mut cumulative = 0.0;
    for (i, &weight) in weights.iter().enumerate() {
        cumulative += weight;
        if target < cumulative {
            return Some(i);
        }
    }
    weights.iter().rposition(|&weight| weight > 0.0)
}
