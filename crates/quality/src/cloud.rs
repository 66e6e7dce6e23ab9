//! Cloud cover estimation from provider pixel classifications.
//!
//! Three encodings are supported:
//! - Binary cloud masks (one flag value per pixel)
//! - Sentinel-2 Scene Classification Layer (12 classes)
//! - Integer QA bitmasks with cloud and cirrus bits
//!
//! Every estimator returns a fraction in `[0, 1]`. A scene with no pixel
//! data is treated as clear; the pixel-count penalty in confidence scoring
//! is what discounts it.

use ndvi_common::{CloudEncoding, CloudGrade, GradeLabel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default maximum cloud fraction for a usable scene.
pub const DEFAULT_MAX_CLOUD: f64 = 0.3;

/// Default minimum usable-pixel fraction for a usable scene.
pub const DEFAULT_MIN_USABLE: f64 = 0.5;

/// Default QA bit flagging cloud.
pub const DEFAULT_CLOUD_BIT: u8 = 10;

/// Default QA bit flagging cirrus.
pub const DEFAULT_CIRRUS_BIT: u8 = 11;

/// Sentinel-2 Scene Classification Layer classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SclClass {
    NoData = 0,
    SaturatedOrDefective = 1,
    DarkAreaPixels = 2,
    CloudShadows = 3,
    Vegetation = 4,
    NotVegetated = 5,
    Water = 6,
    Unclassified = 7,
    CloudMediumProbability = 8,
    CloudHighProbability = 9,
    ThinCirrus = 10,
    SnowIce = 11,
}

impl SclClass {
    /// Map a raw SCL code. Codes outside 0-11 return `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SclClass::NoData),
            1 => Some(SclClass::SaturatedOrDefective),
            2 => Some(SclClass::DarkAreaPixels),
            3 => Some(SclClass::CloudShadows),
            4 => Some(SclClass::Vegetation),
            5 => Some(SclClass::NotVegetated),
            6 => Some(SclClass::Water),
            7 => Some(SclClass::Unclassified),
            8 => Some(SclClass::CloudMediumProbability),
            9 => Some(SclClass::CloudHighProbability),
            10 => Some(SclClass::ThinCirrus),
            11 => Some(SclClass::SnowIce),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Cloud or cloud shadow.
    pub fn is_cloud(&self) -> bool {
        matches!(
            self,
            SclClass::CloudShadows
                | SclClass::CloudMediumProbability
                | SclClass::CloudHighProbability
                | SclClass::ThinCirrus
        )
    }

    /// Cloud, missing data, sensor defects, or snow/ice.
    pub fn is_unusable(&self) -> bool {
        self.is_cloud()
            || matches!(
                self,
                SclClass::NoData | SclClass::SaturatedOrDefective | SclClass::SnowIce
            )
    }
}

/// Result of classifying an SCL band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudCoverResult {
    pub cloud_fraction: f64,
    pub usable_fraction: f64,
    pub total_pixels: usize,
    pub cloud_pixels: usize,
    pub usable_pixels: usize,
}

/// Uniform estimate across all encodings.
///
/// `usable_fraction` is only known for encodings that classify more than
/// cloud/not-cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudEstimate {
    pub cloud_fraction: f64,
    pub usable_fraction: Option<f64>,
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Fraction of pixels equal to `cloud_value`. Empty input is clear.
pub fn from_binary_mask(values: &[u8], cloud_value: u8) -> f64 {
    let cloud = values.iter().filter(|&&v| v == cloud_value).count();
    fraction(cloud, values.len())
}

/// Classify an SCL band into cloud and usable fractions.
///
/// Codes outside the 12 known classes count toward the total but are
/// neither cloud nor unusable.
pub fn from_scene_classification(values: &[u8]) -> CloudCoverResult {
    let total = values.len();
    let mut cloud = 0usize;
    let mut unusable = 0usize;

    for class in values.iter().filter_map(|&code| SclClass::from_code(code)) {
        if class.is_cloud() {
            cloud += 1;
        }
        if class.is_unusable() {
            unusable += 1;
        }
    }

    CloudCoverResult {
        cloud_fraction: fraction(cloud, total),
        usable_fraction: 1.0 - fraction(unusable, total),
        total_pixels: total,
        cloud_pixels: cloud,
        usable_pixels: total - unusable,
    }
}

/// Fraction of QA values with the cloud or cirrus bit set.
///
/// A bit position beyond the integer width is never set.
pub fn from_qa_bitmask(values: &[u32], cloud_bit: u8, cirrus_bit: u8) -> f64 {
    let mask = bit(cloud_bit) | bit(cirrus_bit);
    let cloud = values.iter().filter(|&&v| v & mask != 0).count();
    fraction(cloud, values.len())
}

fn bit(position: u8) -> u32 {
    1u32.checked_shl(position as u32).unwrap_or(0)
}

/// Reduce any provider encoding to a cloud estimate.
///
/// Reported fractions are clamped into `[0, 1]`; non-finite reports are
/// treated as fully cloudy.
pub fn estimate(encoding: &CloudEncoding) -> CloudEstimate {
    match encoding {
        CloudEncoding::BinaryMask {
            values,
            cloud_value,
        } => CloudEstimate {
            cloud_fraction: from_binary_mask(values, *cloud_value),
            usable_fraction: None,
        },
        CloudEncoding::SceneClassification { values } => {
            let result = from_scene_classification(values);
            CloudEstimate {
                cloud_fraction: result.cloud_fraction,
                usable_fraction: Some(result.usable_fraction),
            }
        }
        CloudEncoding::QaBitmask {
            values,
            cloud_bit,
            cirrus_bit,
        } => CloudEstimate {
            cloud_fraction: from_qa_bitmask(values, *cloud_bit, *cirrus_bit),
            usable_fraction: None,
        },
        CloudEncoding::Reported { fraction } => CloudEstimate {
            cloud_fraction: if fraction.is_finite() {
                fraction.clamp(0.0, 1.0)
            } else {
                1.0
            },
            usable_fraction: None,
        },
    }
}

/// Whether a scene passes both the cloud and the usable-pixel checks.
///
/// Either check failing rejects the scene.
pub fn is_scene_usable(
    cloud_coverage: f64,
    max_cloud: f64,
    min_usable: f64,
    usable_fraction: Option<f64>,
) -> bool {
    if cloud_coverage > max_cloud {
        debug!(cloud_coverage, max_cloud, "Scene rejected: too cloudy");
        return false;
    }
    if let Some(usable) = usable_fraction {
        if usable < min_usable {
            debug!(usable, min_usable, "Scene rejected: too few usable pixels");
            return false;
        }
    }
    true
}

/// `(en, ar)` label pair for a cloud fraction.
pub fn cloud_coverage_grade(coverage: f64) -> (&'static str, &'static str) {
    CloudGrade::from_coverage(coverage).labels()
}
