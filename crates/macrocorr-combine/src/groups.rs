//! Factor groups built from per-factor correlation series.

use std::collections::BTreeMap;

use derive_more::Display;
use macrocorr_eval::has_finite;
use macrocorr_series::FactorKey;
use macrocorr_traits::Sparse;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combiner::{Combiner, PartialMeanCombiner, SignedSeries};

/// Named composite of macro factors.
///
/// The last two groups have no registered members; they only appear as
/// dimensions of the composite factor index and in server-computed views.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FactorGroup {
    /// Equities, volatility, dollar and gold
    #[display("macro")]
    Macro,
    /// Financial conditions
    #[display("policy")]
    Policy,
    /// ETF flows and funding
    #[display("capital")]
    Capital,
    /// Geopolitical risk
    #[display("geopolitics")]
    Geopolitics,
    /// On-chain activity
    #[display("onchain")]
    Onchain,
    /// Crowd sentiment
    #[display("sentiment")]
    Sentiment,
}

impl FactorGroup {
    /// Every group, in declaration (and therefore `Ord`) order.
    pub const ALL: [Self; 6] = [
        Self::Macro,
        Self::Policy,
        Self::Capital,
        Self::Geopolitics,
        Self::Onchain,
        Self::Sentiment,
    ];

    /// Member factors and the sign each enters the group average with.
    #[must_use]
    pub const fn members(&self) -> &'static [(FactorKey, f64)] {
        match self {
            Self::Macro => &[
                (FactorKey::Spx, 1.0),
                (FactorKey::Vix, -1.0),
                (FactorKey::Dxy, -1.0),
                (FactorKey::Xau, 1.0),
            ],
            // looser conditions (falling NFCI) are risk-on
            Self::Policy => &[(FactorKey::Nfci, -1.0)],
            Self::Capital => &[(FactorKey::EtfFlows, 1.0), (FactorKey::Funding, 1.0)],
            Self::Sentiment => &[(FactorKey::Fng, 1.0)],
            Self::Geopolitics | Self::Onchain => &[],
        }
    }

    /// Lower-case wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Macro => "macro",
            Self::Policy => "policy",
            Self::Capital => "capital",
            Self::Sentiment => "sentiment",
            Self::Geopolitics => "geopolitics",
            Self::Onchain => "onchain",
        }
    }

    /// Parse a wire name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        let needle = name.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(needle))
    }
}

/// Group per-factor correlation series into signed group averages.
///
/// A group is present in the output only if at least one of its members is a
/// key of `factors`. Each group series is as long as its longest member.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use macrocorr_combine::{FactorGroup, compose_groups};
/// use macrocorr_series::FactorKey;
///
/// let mut factors = BTreeMap::new();
/// factors.insert(FactorKey::Nfci, vec![Some(-30.0), None]);
///
/// let groups = compose_groups(&factors);
/// assert_eq!(groups[&FactorGroup::Policy], vec![Some(30.0), None]);
/// assert!(!groups.contains_key(&FactorGroup::Macro));
/// ```
pub fn compose_groups(
    factors: &BTreeMap<FactorKey, Vec<Sparse>>,
) -> BTreeMap<FactorGroup, Vec<Sparse>> {
    compose_groups_with(factors, &PartialMeanCombiner)
}

/// Group composition with an explicit combiner.
pub fn compose_groups_with<C: Combiner>(
    factors: &BTreeMap<FactorKey, Vec<Sparse>>,
    combiner: &C,
) -> BTreeMap<FactorGroup, Vec<Sparse>> {
    let mut groups = BTreeMap::new();
    for group in FactorGroup::ALL {
        let present: Vec<(String, f64, &[Sparse])> = group
            .members()
            .iter()
            .filter_map(|(key, sign)| factors.get(key).map(|v| (key.to_string(), *sign, v.as_slice())))
            .collect();
        if present.is_empty() {
            continue;
        }

        let inputs: Vec<SignedSeries<'_>> = present
            .iter()
            .map(|(name, sign, values)| SignedSeries {
                name: name.as_str(),
                sign: *sign,
                values,
            })
            .collect();
        debug!(group = %group, members = inputs.len(), combiner = combiner.name(), "composing group");
        groups.insert(group, combiner.combine(&inputs));
    }
    groups
}

/// Number of groups with at least one finite value anywhere in their series.
pub fn count_qualifying_groups(groups: &BTreeMap<FactorGroup, Vec<Sparse>>) -> usize {
    groups.values().filter(|series| has_finite(series)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn factors(entries: &[(FactorKey, Vec<Sparse>)]) -> BTreeMap<FactorKey, Vec<Sparse>> {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_macro_group_signs() {
        let input = factors(&[
            (FactorKey::Spx, vec![Some(50.0)]),
            (FactorKey::Vix, vec![Some(-30.0)]),
            (FactorKey::Dxy, vec![Some(-20.0)]),
            (FactorKey::Xau, vec![Some(0.0)]),
        ]);
        let groups = compose_groups(&input);
        assert_abs_diff_eq!(groups[&FactorGroup::Macro][0].unwrap(), 25.0);
    }

    #[test]
    fn test_sign_flip_is_linear() {
        let base = factors(&[(FactorKey::Dxy, vec![Some(10.0), Some(-40.0)])]);
        let flipped = factors(&[(FactorKey::Dxy, vec![Some(-10.0), Some(40.0)])]);
        let a = &compose_groups(&base)[&FactorGroup::Macro];
        let b = &compose_groups(&flipped)[&FactorGroup::Macro];
        for (x, y) in a.iter().zip(b) {
            assert_abs_diff_eq!(x.unwrap(), -y.unwrap());
        }
    }

    #[test]
    fn test_groups_omitted_without_members() {
        let input = factors(&[(FactorKey::Fng, vec![None, Some(12.0)])]);
        let groups = compose_groups(&input);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&FactorGroup::Sentiment], vec![None, Some(12.0)]);
    }

    #[test]
    fn test_group_null_only_when_all_members_null() {
        let input = factors(&[
            (FactorKey::EtfFlows, vec![None, Some(20.0), None]),
            (FactorKey::Funding, vec![Some(10.0), Some(40.0), None]),
        ]);
        let capital = &compose_groups(&input)[&FactorGroup::Capital];
        assert_abs_diff_eq!(capital[0].unwrap(), 10.0);
        assert_abs_diff_eq!(capital[1].unwrap(), 30.0);
        assert!(capital[2].is_none());
    }

    #[test]
    fn test_count_qualifying_groups() {
        let input = factors(&[
            (FactorKey::Nfci, vec![None, None]),
            (FactorKey::Fng, vec![None, Some(5.0)]),
            (FactorKey::Spx, vec![Some(1.0), Some(2.0)]),
        ]);
        let groups = compose_groups(&input);
        assert_eq!(groups.len(), 3);
        assert_eq!(count_qualifying_groups(&groups), 2);
    }

    #[test]
    fn test_group_names() {
        assert_eq!(FactorGroup::parse("MACRO"), Some(FactorGroup::Macro));
        assert_eq!(FactorGroup::parse("onchain"), Some(FactorGroup::Onchain));
        assert_eq!(FactorGroup::parse("rates"), None);
        assert_eq!(FactorGroup::Capital.to_string(), "capital");
        assert_eq!(serde_json::to_string(&FactorGroup::Geopolitics).unwrap(), "\"geopolitics\"");
    }
}
