//! Batch pipeline: assess raw observations, cache the usable ones and
//! summarize each field's window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use analytics::{compare_to_historical_mean, HistoricalComparison, NdviSummary};
use ndvi_common::{ConfidenceGrade, DateRange, NdviResult, Observation, RawObservation};
use quality::{assess_observation, QualityPolicy};
use storage::{
    calculate_ttl_at, CacheBackend, CacheStats, CachedWindow, KeyExtras, ObservationCache,
    WindowQuery,
};

use crate::config::EngineConfig;

/// Historical `(mean, std)` for a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    pub std: f64,
}

/// A batch of raw observations with optional per-field baselines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchInput {
    pub observations: Vec<RawObservation>,
    #[serde(default)]
    pub baselines: BTreeMap<String, Baseline>,
}

impl BatchInput {
    /// Parse either a bare JSON array of observations or an object with
    /// `observations` and `baselines`.
    pub fn from_json(text: &str) -> NdviResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        if value.is_array() {
            Ok(Self {
                observations: serde_json::from_value(value)?,
                baselines: BTreeMap::new(),
            })
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Too cloudy, or too few usable pixels.
    SceneUnusable,
    /// Usable scene scored below the confidence threshold.
    LowConfidence,
}

/// An observation left out of the aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub field_id: String,
    pub observation_date: NaiveDate,
    pub source: String,
    pub cloud_fraction: f64,
    pub confidence: f64,
    pub grade: ConfidenceGrade,
    pub reason: RejectionReason,
}

/// Summary of one `(field, source)` window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub field_id: String,
    pub source: String,
    pub summary: NdviSummary,
    /// The summary was served from the window cache.
    pub from_cache: bool,
    pub comparison: Option<HistoricalComparison>,
    pub comparison_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub assessed: usize,
    pub included: usize,
    /// Included observations replaced by a later one with the same identity.
    pub superseded: usize,
    pub rejected: Vec<Rejection>,
    pub fields: Vec<FieldReport>,
    pub backend: String,
    pub cache: CacheStats,
}

type WindowKey = (String, String);

pub struct Pipeline<B: CacheBackend> {
    cache: ObservationCache<B>,
    policy: QualityPolicy,
    trend_threshold: f64,
}

impl<B: CacheBackend> Pipeline<B> {
    pub fn new(backend: B, config: &EngineConfig) -> NdviResult<Self> {
        Ok(Self {
            cache: ObservationCache::new(backend, config.cache.ttl)?,
            policy: config.quality,
            trend_threshold: config.analytics.trend_threshold,
        })
    }

    pub fn cache(&self) -> &ObservationCache<B> {
        &self.cache
    }

    /// Process a batch as of `today`.
    ///
    /// `default_baseline` applies to fields without their own baseline.
    #[instrument(skip_all, fields(observations = input.observations.len()))]
    pub async fn run(
        &self,
        input: BatchInput,
        today: NaiveDate,
        default_baseline: Option<Baseline>,
    ) -> NdviResult<BatchReport> {
        let assessed = input.observations.len();
        let mut rejected = Vec::new();
        let mut included = 0usize;
        let mut superseded = 0usize;
        let mut windows: BTreeMap<WindowKey, BTreeMap<NaiveDate, Observation>> = BTreeMap::new();

        for raw in input.observations {
            let assessment = assess_observation(raw, today, &self.policy);
            let observation = assessment.observation;

            if !assessment.include {
                let reason = if assessment.scene_usable {
                    RejectionReason::LowConfidence
                } else {
                    RejectionReason::SceneUnusable
                };
                rejected.push(Rejection {
                    field_id: observation.field_id,
                    observation_date: observation.observation_date,
                    source: observation.source,
                    cloud_fraction: observation.cloud_coverage,
                    confidence: observation.confidence,
                    grade: assessment.grade,
                    reason,
                });
                continue;
            }

            self.cache.put_observation_at(&observation, today).await?;
            included += 1;

            let window = windows
                .entry((observation.field_id.clone(), observation.source.clone()))
                .or_default();
            if window
                .insert(observation.observation_date, observation)
                .is_some()
            {
                superseded += 1;
                debug!("Observation superseded by a later one in the same batch");
            }
        }

        let mut fields = Vec::with_capacity(windows.len());
        for ((field_id, source), window) in windows {
            let observations: Vec<Observation> = window.into_values().collect();
            let Some((summary, from_cache)) = self
                .summarize(&field_id, &source, &observations, today)
                .await?
            else {
                continue;
            };

            let baseline = input.baselines.get(&field_id).copied().or(default_baseline);
            let (comparison, comparison_error) = match baseline {
                Some(baseline) => {
                    let current = summary.weighted_mean_ndvi.unwrap_or(summary.mean_ndvi);
                    match compare_to_historical_mean(current, baseline.mean, baseline.std) {
                        Ok(comparison) => (Some(comparison), None),
                        Err(e) => {
                            warn!(field_id = %field_id, error = %e, "Historical comparison failed");
                            (None, Some(format!("{}: {}", e.error_code(), e)))
                        }
                    }
                }
                None => (None, None),
            };

            fields.push(FieldReport {
                field_id,
                source,
                summary,
                from_cache,
                comparison,
                comparison_error,
            });
        }

        info!(
            assessed,
            included,
            rejected = rejected.len(),
            fields = fields.len(),
            "Batch processed"
        );

        Ok(BatchReport {
            assessed,
            included,
            superseded,
            rejected,
            fields,
            backend: self.cache.backend().name().to_string(),
            cache: self.cache.stats().await?,
        })
    }

    /// Summary for a window, reusing a cached one for the same query.
    async fn summarize(
        &self,
        field_id: &str,
        source: &str,
        observations: &[Observation],
        today: NaiveDate,
    ) -> NdviResult<Option<(NdviSummary, bool)>> {
        let Some(range) = DateRange::covering(observations.iter().map(|o| o.observation_date))
        else {
            return Ok(None);
        };

        // Content the summary depends on, so a re-ingested scene yields a new key
        let content: Vec<Value> = observations
            .iter()
            .map(|o| json!([o.observation_date.to_string(), o.ndvi.mean, o.confidence]))
            .collect();

        let mut extra = KeyExtras::new();
        extra.insert("count".to_string(), Value::from(observations.len()));
        extra.insert("trend_threshold".to_string(), Value::from(self.trend_threshold));
        extra.insert("observations".to_string(), Value::Array(content));
        let query = WindowQuery::new(field_id, range.start, range.end, source).with_extra(extra);

        match self.cache.get_window::<NdviSummary>(&query).await? {
            Some(CachedWindow::Value { data }) => {
                debug!(field_id, source, "Window summary served from cache");
                return Ok(Some((data, true)));
            }
            Some(CachedWindow::Failed { message }) => {
                debug!(field_id, source, message = %message, "Ignoring cached window failure");
            }
            None => {}
        }

        let Some(summary) = NdviSummary::from_observations(observations, self.trend_threshold)
        else {
            return Ok(None);
        };
        let ttl = Duration::from_secs(calculate_ttl_at(range.end, today, self.cache.ttl_config()));
        self.cache.put_window(&query, &summary, ttl).await?;
        Ok(Some((summary, false)))
    }
}
