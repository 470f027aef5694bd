//! Core trait definition for series combiners.

use macrocorr_traits::Sparse;

/// One input to a combination: a nullable series and the sign it enters with.
///
/// The sign encodes the expected direction of the factor's correlation with
/// the tracked asset, so that a group average points the same way for every
/// member.
#[derive(Debug, Clone, Copy)]
pub struct SignedSeries<'a> {
    /// Member name (for logging)
    pub name: &'a str,

    /// `+1.0` or `-1.0`
    pub sign: f64,

    /// Values aligned to the shared date axis
    pub values: &'a [Sparse],
}

/// Combines several aligned nullable series into one.
///
/// Implementors decide how missing members are treated. All implementations
/// must be thread-safe (Send + Sync) so one combiner can serve concurrent
/// requests.
///
/// # Examples
///
/// ```rust
/// use macrocorr_combine::{Combiner, SignedSeries};
/// use macrocorr_traits::Sparse;
///
/// struct FirstMember;
///
/// impl Combiner for FirstMember {
///     fn combine(&self, inputs: &[SignedSeries<'_>]) -> Vec<Sparse> {
///         inputs
///             .first()
///             .map(|s| s.values.iter().map(|v| v.map(|x| x * s.sign)).collect())
///             .unwrap_or_default()
///     }
///
///     fn name(&self) -> &str {
///         "first_member"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Combine `inputs` into a series as long as the longest input.
    fn combine(&self, inputs: &[SignedSeries<'_>]) -> Vec<Sparse>;

    /// Name of this combination strategy.
    fn name(&self) -> &str;
}

/// Signed mean over whichever members are present at each index.
///
/// A position is `None` only when every member is missing there; a member
/// shorter than the longest input counts as missing past its end.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialMeanCombiner;

impl Combiner for PartialMeanCombiner {
    fn combine(&self, inputs: &[SignedSeries<'_>]) -> Vec<Sparse> {
        let len = inputs.iter().map(|s| s.values.len()).max().unwrap_or(0);
        (0..len)
            .map(|i| {
                let (sum, count) = inputs
                    .iter()
                    .filter_map(|s| {
                        s.values
                            .get(i)
                            .copied()
                            .flatten()
                            .filter(|v| v.is_finite())
                            .map(|v| v * s.sign)
                    })
                    .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
                (count > 0).then(|| sum / count as f64)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "partial_mean"
    }
}
