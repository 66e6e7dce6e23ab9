//! NDVI observation model.
//!
//! A [`RawObservation`] arrives from the ingestion source once per satellite
//! pass. Quality assessment turns it into an immutable [`Observation`]
//! carrying a computed confidence score.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-scene NDVI statistics over a field polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NdviStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub std: Option<f64>,
    #[serde(default)]
    pub p10: Option<f64>,
    #[serde(default)]
    pub p90: Option<f64>,
}

impl NdviStats {
    /// Stats with only mean/min/max populated.
    pub fn basic(mean: f64, min: f64, max: f64) -> Self {
        Self {
            mean,
            min,
            max,
            std: None,
            p10: None,
            p90: None,
        }
    }

    pub fn with_std(mut self, std: f64) -> Self {
        self.std = Some(std);
        self
    }

    pub fn with_percentiles(mut self, p10: f64, p90: f64) -> Self {
        self.p10 = Some(p10);
        self.p90 = Some(p90);
        self
    }

    /// Both P10 and P90 are present.
    pub fn has_percentiles(&self) -> bool {
        self.p10.is_some() && self.p90.is_some()
    }

    pub fn has_std(&self) -> bool {
        self.std.is_some()
    }
}

/// Cloud classification payload as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CloudEncoding {
    /// One value per pixel; pixels equal to `cloud_value` are cloud.
    BinaryMask {
        values: Vec<u8>,
        #[serde(default = "default_cloud_value")]
        cloud_value: u8,
    },
    /// Sentinel-2 Scene Classification Layer codes (0-11).
    SceneClassification { values: Vec<u8> },
    /// Integer QA band where individual bits flag cloud and cirrus.
    QaBitmask {
        values: Vec<u32>,
        #[serde(default = "default_cloud_bit")]
        cloud_bit: u8,
        #[serde(default = "default_cirrus_bit")]
        cirrus_bit: u8,
    },
    /// Scene-level cloud fraction already computed by the provider.
    Reported { fraction: f64 },
}

fn default_cloud_value() -> u8 {
    1
}

fn default_cloud_bit() -> u8 {
    10
}

fn default_cirrus_bit() -> u8 {
    11
}

impl CloudEncoding {
    /// Number of per-pixel values carried, if the encoding is per-pixel.
    pub fn pixel_len(&self) -> Option<usize> {
        match self {
            CloudEncoding::BinaryMask { values, .. } => Some(values.len()),
            CloudEncoding::SceneClassification { values } => Some(values.len()),
            CloudEncoding::QaBitmask { values, .. } => Some(values.len()),
            CloudEncoding::Reported { .. } => None,
        }
    }
}

/// Observation as supplied by the ingestion source, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub field_id: String,
    pub observation_date: NaiveDate,
    pub ndvi: NdviStats,
    pub cloud: CloudEncoding,
    #[serde(default)]
    pub pixel_count: Option<u64>,
    pub source: String,
}

/// A confidence-scored observation. Immutable once built; re-ingestion
/// with the same `(field_id, observation_date, source)` supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub field_id: String,
    pub observation_date: NaiveDate,
    pub ndvi: NdviStats,
    pub cloud_coverage: f64,
    pub pixel_count: Option<u64>,
    pub source: String,
    pub confidence: f64,
}

impl Observation {
    /// The `(value, confidence)` pair used for weighted aggregation.
    pub fn weighted_value(&self) -> (f64, f64) {
        (self.ndvi.mean, self.confidence)
    }

    /// Identity triple shared by all versions of this observation.
    pub fn identity(&self) -> (&str, NaiveDate, &str) {
        (&self.field_id, self.observation_date, &self.source)
    }
}
