//! Events published by the orchestrator.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Which computation produced a correlation view.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Correlations computed locally from raw history
    #[display("front_only")]
    FrontOnly,
    /// Correlations precomputed by the backend
    #[display("server")]
    Server,
    /// Synthetic flat series; no real data
    #[display("placeholder")]
    Placeholder,
}

impl Tier {
    /// The tier tried after this one fails.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::FrontOnly => Some(Self::Server),
            Self::Server => Some(Self::Placeholder),
            Self::Placeholder => None,
        }
    }
}

/// Progress of a correlation request, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A cached view was served.
    CacheHit {
        /// Asset the view is for
        asset: String,
        /// Correlation window
        window: usize,
    },
    /// A tier could not produce a usable view.
    TierFailed {
        /// Tier that failed
        tier: Tier,
        /// Failure or degeneracy description
        reason: String,
    },
    /// The request moved on to the next tier.
    Escalated {
        /// Tier given up on
        from: Tier,
        /// Tier tried next
        to: Tier,
    },
    /// A view was handed back to the caller.
    ViewReady {
        /// Tier that produced it
        source: Tier,
        /// Number of groups in the view
        groups: usize,
    },
}
