//! Tie-aware fractional ranks.
//!
//! Ranks are 1-based mid-ranks divided by the number of ranked values, so they
//! fall in `(0, 1]`. Every member of a run of tied values gets the average
//! position of the run.

/// Compute normalized mid-ranks of `values`.
///
/// Non-finite values are not ranked: they get a `NaN` rank and do not count
/// towards `n`. Ties are exact equality.
///
/// # Examples
///
/// ```
/// use macrocorr_eval::rank::rank01;
///
/// let ranks = rank01(&[10.0, 20.0, 20.0, 30.0]);
/// assert_eq!(ranks, vec![0.25, 0.625, 0.625, 1.0]);
/// ```
pub fn rank01(values: &[f64]) -> Vec<f64> {
    let n_total = values.len();
    let mut indexed: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();

    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = indexed.len();
    let mut ranks = vec![f64::NAN; n_total];
    let mut i = 0;

    while i < n {
        let mut j = i;
        // Find ties
        while j + 1 < n && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }

        // 1-based average position of the run
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &(pos, _) in &indexed[i..=j] {
            ranks[pos] = avg_rank / n as f64;
        }

        i = j + 1;
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unnormalized_sum(values: &[f64]) -> f64 {
        let n = values.iter().filter(|v| v.is_finite()).count() as f64;
        rank01(values).iter().filter(|r| r.is_finite()).map(|r| r * n).sum()
    }

    #[test]
    fn test_rank_distinct() {
        let ranks = rank01(&[3.0, 1.0, 2.0, 5.0, 4.0]);
        assert_eq!(ranks, vec![0.6, 0.2, 0.4, 1.0, 0.8]);
    }

    #[test]
    fn test_rank_ties_share_mid_rank() {
        let ranks = rank01(&[1.0, 2.0, 2.0, 3.0]);
        assert_abs_diff_eq!(ranks[0], 0.25);
        assert_abs_diff_eq!(ranks[1], 0.625);
        assert_abs_diff_eq!(ranks[2], 0.625);
        assert_abs_diff_eq!(ranks[3], 1.0);
    }

    #[test]
    fn test_rank_sum_invariant_under_permutation() {
        let base = [4.0, 1.0, 4.0, 2.0, 2.0, 2.0, 9.0];
        let n = base.len() as f64;
        let expected = n * (n + 1.0) / 2.0;

        let mut rotated = base.to_vec();
        for _ in 0..base.len() {
            rotated.rotate_left(1);
            assert_abs_diff_eq!(unnormalized_sum(&rotated), expected, epsilon = 1e-9);
        }
        let mut reversed = base.to_vec();
        reversed.reverse();
        assert_abs_diff_eq!(unnormalized_sum(&reversed), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_rank_all_equal() {
        let ranks = rank01(&[7.0; 4]);
        assert!(ranks.iter().all(|&r| (r - 0.625).abs() < 1e-12));
    }

    #[test]
    fn test_rank_skips_non_finite() {
        let ranks = rank01(&[f64::NAN, 5.0, 1.0]);
        assert!(ranks[0].is_nan());
        assert_abs_diff_eq!(ranks[1], 1.0);
        assert_abs_diff_eq!(ranks[2], 0.5);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank01(&[]).is_empty());
    }
}
