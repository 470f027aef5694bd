//! Tiered correlation pipeline.
//!
//! A correlation view is produced by the first tier that yields a usable
//! result:
//!
//! 1. [`Tier::FrontOnly`]: raw factor history correlated locally
//! 2. [`Tier::Server`]: correlations precomputed by the backend
//! 3. [`Tier::Placeholder`]: flat synthetic series, no I/O
//!
//! Each tier reports a [`TierOutcome`]; degenerate and failed outcomes move
//! the request on to the next tier. [`Orchestrator::correlation_view`]
//! therefore always returns a view.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, TimeDelta, Utc};
use macrocorr_api::{FactorIndexData, HistoryData, WirePoint};
use macrocorr_combine::{
    Contribution, DimensionSnapshot, DriverIndexRecord, DriverRange, FactorGroup, FactorIndex,
    INDEX_BASELINE, IndexPoint, compose_groups, compute_factor_index, count_qualifying_groups,
    process_driver_index,
};
use macrocorr_eval::{negative_energy, quantile};
use macrocorr_series::{FactorKey, normalize_factors, resolve_alias};
use macrocorr_traits::types::{daily_range, parse_date};
use macrocorr_traits::{Date, Sparse};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::events::{PipelineEvent, Tier};
use crate::frontonly::compute_front_only;
use crate::source::FactorSource;

/// Capacity of the event channel.
const EVENT_CAPACITY: usize = 64;

/// Result of running one tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome<T> {
    /// Usable result.
    Ok(T),
    /// The tier ran but produced too few groups with data.
    Degenerate {
        /// Groups with at least one finite value
        qualifying: usize,
    },
    /// The tier could not run to completion.
    Failed(String),
}

/// Group correlations on a date axis, tagged with the tier that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationView {
    /// Date axis.
    pub dates: Vec<Date>,
    /// Correlation per group, aligned with `dates`.
    pub rho: BTreeMap<FactorGroup, Vec<Sparse>>,
    /// Correlation per factor, when the tier reports them.
    pub factors: BTreeMap<FactorKey, Vec<Sparse>>,
    /// Tier that produced the view.
    pub source: Tier,
    /// When the view was computed.
    pub generated_at: DateTime<Utc>,
}

/// Distribution summary of one group's correlation series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Most recent value.
    pub latest: Option<f64>,
    /// 10th percentile.
    pub p10: Option<f64>,
    /// Median.
    pub p50: Option<f64>,
    /// 90th percentile.
    pub p90: Option<f64>,
}

impl CorrelationView {
    /// Whether the view holds synthetic rather than real data.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.source == Tier::Placeholder
    }

    /// Per-date strength of negative correlation across the groups.
    pub fn energy(&self) -> Vec<f64> {
        let series: Vec<&[Sparse]> = self.rho.values().map(Vec::as_slice).collect();
        negative_energy(&series)
    }

    /// Distribution summary of one group, if the view contains it.
    pub fn summary(&self, group: FactorGroup) -> Option<GroupSummary> {
        let values = self.rho.get(&group)?;
        Some(GroupSummary {
            latest: values.iter().rev().find_map(|v| *v),
            p10: quantile(values, 0.1),
            p50: quantile(values, 0.5),
            p90: quantile(values, 0.9),
        })
    }
}

/// Where a factor index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOrigin {
    /// Computed by the backend
    Server,
    /// Derived locally from dimension history
    History,
    /// Neither source was available; the index is empty
    Unavailable,
}

/// A factor index with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorIndexReport {
    /// The index and its contributions.
    pub index: FactorIndex,
    /// Provenance.
    pub origin: IndexOrigin,
    /// Source timestamp, when reported.
    pub as_of: Option<String>,
}

/// Time source for cache expiry and view timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs the tiered correlation pipeline and the composite index services.
pub struct Orchestrator<S> {
    source: S,
    config: PipelineConfig,
    cache: Mutex<TtlCache<(String, usize), CorrelationView>>,
    events: broadcast::Sender<PipelineEvent>,
    clock: Clock,
}

impl<S> fmt::Debug for Orchestrator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl<S: FactorSource> Orchestrator<S> {
    /// Create an orchestrator over `source` using the system clock.
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self::with_clock(source, config, Arc::new(Utc::now))
    }

    /// Create an orchestrator with an explicit clock.
    pub fn with_clock(source: S, config: PipelineConfig, clock: Clock) -> Self {
        let ttl = TimeDelta::seconds(i64::try_from(config.cache_ttl_secs).unwrap_or(i64::MAX));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            source,
            config,
            cache: Mutex::new(TtlCache::new(ttl)),
            events,
            clock,
        }
    }

    /// Subscribe to pipeline events.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Active configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Drop every cached view.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn emit(&self, event: PipelineEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Group correlations for the configured asset and window.
    ///
    /// Never fails: when neither data tier yields a usable result the view is
    /// a placeholder (see [`CorrelationView::is_placeholder`]). Real views are
    /// cached for `cache_ttl_secs`.
    pub async fn correlation_view(&self) -> CorrelationView {
        let now = (self.clock)();
        let key = (self.config.asset.to_uppercase(), self.config.window);

        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key, now)
            .cloned();
        if let Some(view) = cached {
            debug!(asset = %key.0, window = key.1, "serving cached correlation view");
            self.emit(PipelineEvent::CacheHit {
                asset: key.0,
                window: key.1,
            });
            return view;
        }

        let mut tier = Tier::FrontOnly;
        let view = loop {
            let outcome = match tier {
                Tier::FrontOnly => self.front_only(now).await,
                Tier::Server => self.server(now).await,
                Tier::Placeholder => TierOutcome::Ok(self.placeholder(now)),
            };
            let reason = match outcome {
                TierOutcome::Ok(view) => break view,
                TierOutcome::Degenerate { qualifying } => format!(
                    "{qualifying} qualifying groups, {} required",
                    self.config.min_groups
                ),
                TierOutcome::Failed(reason) => reason,
            };
            let Some(next) = tier.next() else {
                // the placeholder tier always succeeds
                break self.placeholder(now);
            };
            warn!(%tier, %reason, "correlation tier failed, escalating to {next}");
            self.emit(PipelineEvent::TierFailed { tier, reason });
            self.emit(PipelineEvent::Escalated { from: tier, to: next });
            tier = next;
        };

        info!(source = %view.source, groups = view.rho.len(), "correlation view ready");
        self.emit(PipelineEvent::ViewReady {
            source: view.source,
            groups: view.rho.len(),
        });
        if !view.is_placeholder() {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.purge_expired(now);
            cache.insert(key, view.clone(), now);
        }
        view
    }

    async fn front_only(&self, now: DateTime<Utc>) -> TierOutcome<CorrelationView> {
        let payload = match self
            .source
            .factor_table(&self.config.asset, self.config.history_days)
            .await
        {
            Ok(payload) => payload,
            Err(e) => return TierOutcome::Failed(e.to_string()),
        };
        let result = match normalize_factors(&payload)
            .and_then(|factors| compute_front_only(&factors, &self.config))
        {
            Ok(result) => result,
            Err(e) => return TierOutcome::Failed(e.to_string()),
        };

        let qualifying = count_qualifying_groups(&result.groups);
        if qualifying < self.config.min_groups {
            return TierOutcome::Degenerate { qualifying };
        }
        TierOutcome::Ok(CorrelationView {
            dates: result.dates,
            rho: result.groups,
            factors: result.factors,
            source: Tier::FrontOnly,
            generated_at: now,
        })
    }

    async fn server(&self, now: DateTime<Utc>) -> TierOutcome<CorrelationView> {
        let response = match self
            .source
            .corr_lines(&self.config.asset, self.config.window)
            .await
        {
            Ok(response) => response,
            Err(e) => return TierOutcome::Failed(e.to_string()),
        };
        if response.dates.is_empty() || response.rho.is_empty() {
            return TierOutcome::Failed("server returned no dates or no factors".into());
        }

        let dates = match response
            .dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<std::result::Result<Vec<_>, _>>()
        {
            Ok(dates) => dates,
            Err(e) => return TierOutcome::Failed(e.to_string()),
        };

        let mut factors = BTreeMap::new();
        for (name, mut values) in response.rho_values() {
            let Some(key) = resolve_alias(&name) else {
                debug!(%name, "skipping unregistered server factor");
                continue;
            };
            if factors.contains_key(&key) {
                continue;
            }
            values.resize(dates.len(), None);
            factors.insert(key, values);
        }

        let groups = compose_groups(&factors);
        if groups.is_empty() {
            return TierOutcome::Degenerate { qualifying: 0 };
        }
        TierOutcome::Ok(CorrelationView {
            dates,
            rho: groups,
            factors,
            source: Tier::Server,
            generated_at: now,
        })
    }

    /// Flat zero series over the last `placeholder_days` days for every group
    /// with members.
    fn placeholder(&self, now: DateTime<Utc>) -> CorrelationView {
        let end = now.date_naive();
        let days = self.config.placeholder_days.max(1);
        let start = end - Duration::days(i64::try_from(days - 1).unwrap_or(0));
        let dates = daily_range(start, end);
        let rho = FactorGroup::ALL
            .into_iter()
            .filter(|g| !g.members().is_empty())
            .map(|g| (g, vec![Some(0.0); dates.len()]))
            .collect();
        CorrelationView {
            dates,
            rho,
            factors: BTreeMap::new(),
            source: Tier::Placeholder,
            generated_at: now,
        }
    }

    /// Driver Index records for `range`.
    ///
    /// # Errors
    ///
    /// Returns the source's error when the inputs cannot be fetched.
    pub async fn driver_index(&self, range: DriverRange) -> Result<Vec<DriverIndexRecord>> {
        let days = range.days();
        let sources = self.source.driver_sources(days).await?;
        let records = process_driver_index(&sources, days);
        info!(%range, records = records.len(), "driver index computed");
        Ok(records)
    }

    /// Composite factor index over the last `days` periods.
    ///
    /// Uses the backend's index when available, otherwise derives it from
    /// dimension history. If both fail the report is empty and its origin is
    /// [`IndexOrigin::Unavailable`].
    pub async fn factor_index(&self, days: usize, alpha: f64) -> FactorIndexReport {
        let asset = &self.config.asset;
        match self.source.factor_index(asset, days, alpha).await {
            Ok(data) if !data.index.is_empty() => {
                return FactorIndexReport {
                    as_of: data.as_of.clone(),
                    index: index_from_wire(&data, alpha),
                    origin: IndexOrigin::Server,
                };
            }
            Ok(_) => warn!("server factor index is empty, deriving from history"),
            Err(e) => warn!(error = %e, "server factor index failed, deriving from history"),
        }

        match self.source.factor_history(asset, days).await {
            Ok(history) if !history.series.is_empty() => FactorIndexReport {
                index: compute_factor_index(&snapshots(&history), alpha),
                origin: IndexOrigin::History,
                as_of: history.as_of,
            },
            outcome => {
                if let Err(e) = outcome {
                    warn!(error = %e, "factor history failed");
                }
                FactorIndexReport {
                    index: compute_factor_index(&[], alpha),
                    origin: IndexOrigin::Unavailable,
                    as_of: None,
                }
            }
        }
    }
}

fn index_points(points: &[WirePoint]) -> Vec<IndexPoint> {
    points
        .iter()
        .map(|p| IndexPoint {
            ts: p.ts.clone(),
            raw: p.raw.filter(|v| v.is_finite()),
            smoothed: p.smoothed.filter(|v| v.is_finite()),
        })
        .collect()
}

/// Convert the backend's index payload, dropping unknown dimensions.
fn index_from_wire(data: &FactorIndexData, alpha: f64) -> FactorIndex {
    let contrib = data
        .contrib
        .iter()
        .filter_map(|c| {
            FactorGroup::parse(&c.key).map(|key| Contribution {
                key,
                points: index_points(&c.points),
            })
        })
        .collect();
    FactorIndex {
        index: index_points(&data.index),
        contrib,
        alpha,
        baseline: INDEX_BASELINE,
    }
}

/// Dimension snapshots from history, keeping finite scores of known dimensions.
fn snapshots(history: &HistoryData) -> Vec<DimensionSnapshot> {
    history
        .series
        .iter()
        .map(|point| DimensionSnapshot {
            ts: point.ts.clone(),
            dimensions: point
                .dimensions
                .iter()
                .filter_map(|(name, score)| {
                    let group = FactorGroup::parse(name)?;
                    score.filter(|s| s.is_finite()).map(|s| (group, s))
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use approx::assert_abs_diff_eq;
    use macrocorr_api::{CorrLinesResponse, HistoryPoint, WireContribution};
    use macrocorr_combine::DriverSources;
    use macrocorr_traits::types::format_date;
    use serde_json::{Value, json};

    use crate::error::PipelineError;

    #[derive(Default)]
    struct StubSource {
        table: Option<Value>,
        lines: Option<CorrLinesResponse>,
        index: Option<FactorIndexData>,
        history: Option<HistoryData>,
        table_calls: AtomicUsize,
    }

    fn missing<T>(what: &str) -> Result<T> {
        Err(PipelineError::NoData(what.to_string()))
    }

    impl FactorSource for StubSource {
        async fn factor_table(&self, _asset: &str, _days: usize) -> Result<Value> {
            self.table_calls.fetch_add(1, Ordering::SeqCst);
            self.table.clone().map_or_else(|| missing("table"), Ok)
        }

        async fn corr_lines(&self, _asset: &str, _window: usize) -> Result<CorrLinesResponse> {
            self.lines.clone().map_or_else(|| missing("corr lines"), Ok)
        }

        async fn driver_sources(&self, days: usize) -> Result<DriverSources> {
            let start = Date::from_ymd_opt(2024, 3, 1).unwrap();
            Ok(DriverSources {
                rate: (0..days + 30)
                    .map(|i| (start + Duration::days(i as i64), 5.0 + i as f64 * 0.01))
                    .collect(),
                ..DriverSources::default()
            })
        }

        async fn factor_index(
            &self,
            _asset: &str,
            _days: usize,
            _alpha: f64,
        ) -> Result<FactorIndexData> {
            self.index.clone().map_or_else(|| missing("index"), Ok)
        }

        async fn factor_history(&self, _asset: &str, _days: usize) -> Result<HistoryData> {
            self.history.clone().map_or_else(|| missing("history"), Ok)
        }
    }

    fn fixed_clock() -> Clock {
        Arc::new(|| DateTime::parse_from_rfc3339("2024-06-30T12:00:00Z").unwrap().to_utc())
    }

    fn orchestrator(source: StubSource) -> Orchestrator<StubSource> {
        Orchestrator::with_clock(source, PipelineConfig::default(), fixed_clock())
    }

    fn day(i: usize) -> String {
        format_date(Date::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64))
    }

    /// A table whose only factor is flat: one group, never qualifying.
    fn flat_table() -> Value {
        let rows: Vec<Value> = (0..60)
            .map(|i| json!({ "date": day(i), "btc_close": 40_000.0 + (i * i % 17) as f64, "fng": 50 }))
            .collect();
        json!(rows)
    }

    /// Two varying factors in two different groups.
    fn live_table() -> Value {
        let rows: Vec<Value> = (0..90)
            .map(|i| {
                let x = i as f64;
                json!({
                    "date": day(i),
                    "btc_close": 40_000.0 + 500.0 * (x * 0.9).sin() + 10.0 * x,
                    "gspc": 4_800.0 + 30.0 * (x * 0.4).cos() + 2.0 * x,
                    "fng": 50.0 + 20.0 * (x * 1.7).sin(),
                })
            })
            .collect();
        json!(rows)
    }

    fn server_lines() -> CorrLinesResponse {
        serde_json::from_value(json!({
            "dates": ["2024-06-01", "2024-06-02", "2024-06-03"],
            "rho": {
                "usd_i": [10.0, null, -20.0],
                "Funding": [5.0, 15.0],
                "hashrate": [1.0, 2.0, 3.0]
            }
        }))
        .unwrap()
    }

    fn drain(rx: &mut broadcast::Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_front_only_view() {
        let orch = orchestrator(StubSource {
            table: Some(live_table()),
            ..StubSource::default()
        });
        let view = orch.correlation_view().await;
        assert_eq!(view.source, Tier::FrontOnly);
        assert_eq!(view.dates.len(), 90);
        assert!(view.rho.contains_key(&FactorGroup::Macro));
        assert!(view.rho.contains_key(&FactorGroup::Sentiment));
        assert_eq!(view.energy().len(), 90);
        let summary = view.summary(FactorGroup::Macro).unwrap();
        assert!(summary.p10 <= summary.p90);
    }

    #[tokio::test]
    async fn test_degenerate_front_only_escalates_to_server() {
        let orch = orchestrator(StubSource {
            table: Some(flat_table()),
            lines: Some(server_lines()),
            ..StubSource::default()
        });
        let mut rx = orch.subscribe();
        let view = orch.correlation_view().await;

        assert_eq!(view.source, Tier::Server);
        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            PipelineEvent::TierFailed { tier: Tier::FrontOnly, reason } if reason.contains("0 qualifying")
        ));
        assert_eq!(
            events[1],
            PipelineEvent::Escalated {
                from: Tier::FrontOnly,
                to: Tier::Server
            }
        );
        assert_eq!(
            events[2],
            PipelineEvent::ViewReady {
                source: Tier::Server,
                groups: 2
            }
        );
    }

    #[tokio::test]
    async fn test_server_keys_are_canonicalized() {
        let orch = orchestrator(StubSource {
            lines: Some(server_lines()),
            ..StubSource::default()
        });
        let view = orch.correlation_view().await;

        assert_eq!(view.dates.len(), 3);
        assert_eq!(view.factors.len(), 2);
        assert_eq!(view.factors[&FactorKey::Funding], vec![Some(5.0), Some(15.0), None]);
        // DXY enters macro with a negative sign
        assert_eq!(view.rho[&FactorGroup::Macro], vec![Some(-10.0), None, Some(20.0)]);
        assert_eq!(view.rho[&FactorGroup::Capital][2], None);
    }

    #[tokio::test]
    async fn test_unknown_server_keys_fall_through_to_placeholder() {
        let lines: CorrLinesResponse = serde_json::from_value(json!({
            "dates": ["2024-06-01"],
            "rho": { "hashrate": [1.0] }
        }))
        .unwrap();
        let orch = orchestrator(StubSource {
            lines: Some(lines),
            ..StubSource::default()
        });
        let view = orch.correlation_view().await;
        assert!(view.is_placeholder());
    }

    #[tokio::test]
    async fn test_placeholder_when_everything_fails() {
        let orch = orchestrator(StubSource::default());
        let mut rx = orch.subscribe();
        let view = orch.correlation_view().await;

        assert!(view.is_placeholder());
        assert_eq!(view.dates.len(), 30);
        assert_eq!(view.dates.last(), Some(&Date::from_ymd_opt(2024, 6, 30).unwrap()));
        assert_eq!(view.rho.len(), 4);
        assert!(view.rho.values().all(|s| s.len() == 30));

        let events = drain(&mut rx);
        let escalations = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::Escalated { .. }))
            .count();
        assert_eq!(escalations, 2);

        // placeholders are not cached
        orch.correlation_view().await;
        assert_eq!(orch.source.table_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_hit() {
        let orch = orchestrator(StubSource {
            lines: Some(server_lines()),
            ..StubSource::default()
        });
        let first = orch.correlation_view().await;
        let mut rx = orch.subscribe();
        let second = orch.correlation_view().await;

        assert_eq!(first, second);
        assert_eq!(orch.source.table_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            drain(&mut rx),
            vec![PipelineEvent::CacheHit {
                asset: "BTC".into(),
                window: 30
            }]
        );

        orch.clear_cache();
        orch.correlation_view().await;
        assert_eq!(orch.source.table_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_driver_index() {
        let orch = orchestrator(StubSource::default());
        let records = orch.driver_index(DriverRange::Week).await.unwrap();
        assert_eq!(records.len(), 7);
        // steadily rising rates are bearish
        assert!(records.last().unwrap().driver_index < 0.0);
    }

    #[tokio::test]
    async fn test_factor_index_prefers_server() {
        let index: FactorIndexData = serde_json::from_value(json!({
            "index": [{"ts": "2024-06-01", "raw": 61.0, "smoothed": 58.0}],
            "contrib": [
                {"key": "macro", "points": [{"ts": "2024-06-01", "raw": 11.0, "smoothed": 8.0}]},
                {"key": "rates", "points": []}
            ],
            "as_of": "2024-06-01T00:00:00Z"
        }))
        .unwrap();
        let orch = orchestrator(StubSource {
            index: Some(index),
            ..StubSource::default()
        });
        let report = orch.factor_index(30, 0.3).await;
        assert_eq!(report.origin, IndexOrigin::Server);
        assert_eq!(report.index.latest(), Some(58.0));
        assert_eq!(report.index.contrib.len(), 1);
        assert_eq!(report.as_of.as_deref(), Some("2024-06-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_factor_index_from_history() {
        let history = HistoryData {
            series: vec![
                HistoryPoint {
                    ts: "2024-06-01T00:00:00Z".into(),
                    dimensions: [
                        ("macro".to_string(), Some(80.0)),
                        ("policy".to_string(), None),
                        ("weather".to_string(), Some(0.0)),
                    ]
                    .into(),
                },
                HistoryPoint {
                    ts: "2024-06-02T00:00:00Z".into(),
                    dimensions: BTreeMap::new(),
                },
            ],
            as_of: None,
        };
        let orch = orchestrator(StubSource {
            history: Some(history),
            ..StubSource::default()
        });
        let report = orch.factor_index(30, 0.3).await;
        assert_eq!(report.origin, IndexOrigin::History);
        assert_abs_diff_eq!(report.index.index[0].raw.unwrap(), 80.0);
        assert_eq!(report.index.index[1].raw, None);
        assert_eq!(report.index.latest(), Some(80.0));
    }

    #[tokio::test]
    async fn test_factor_index_unavailable() {
        let orch = orchestrator(StubSource::default());
        let report = orch.factor_index(30, 0.3).await;
        assert_eq!(report.origin, IndexOrigin::Unavailable);
        assert!(report.index.index.is_empty());
        assert_eq!(report.index.contrib.len(), FactorGroup::ALL.len());
    }

    #[test]
    fn test_wire_conversion_drops_non_finite() {
        let data = FactorIndexData {
            index: vec![WirePoint {
                ts: "t".into(),
                raw: Some(f64::NAN),
                smoothed: Some(50.0),
            }],
            contrib: vec![WireContribution {
                key: "Sentiment".into(),
                points: Vec::new(),
            }],
            as_of: None,
        };
        let index = index_from_wire(&data, 0.3);
        assert_eq!(index.index[0].raw, None);
        assert_eq!(index.contrib[0].key, FactorGroup::Sentiment);
    }
}
