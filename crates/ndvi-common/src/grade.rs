//! Bilingual grade bands for cloud coverage and observation confidence.

use serde::{Deserialize, Serialize};

/// A closed set of grades with English and Arabic display labels.
pub trait GradeLabel {
    /// English label (snake_case identifier).
    fn label_en(&self) -> &'static str;

    /// Arabic label for farmer-facing displays.
    fn label_ar(&self) -> &'static str;

    /// Both labels as an `(en, ar)` pair.
    fn labels(&self) -> (&'static str, &'static str) {
        (self.label_en(), self.label_ar())
    }
}

/// Cloud coverage band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudGrade {
    Clear,
    MostlyClear,
    PartlyCloudy,
    MostlyCloudy,
    Cloudy,
}

impl CloudGrade {
    /// Band a cloud fraction. Upper bounds are inclusive.
    pub fn from_coverage(coverage: f64) -> Self {
        if coverage <= 0.1 {
            CloudGrade::Clear
        } else if coverage <= 0.3 {
            CloudGrade::MostlyClear
        } else if coverage <= 0.5 {
            CloudGrade::PartlyCloudy
        } else if coverage <= 0.7 {
            CloudGrade::MostlyCloudy
        } else {
            CloudGrade::Cloudy
        }
    }
}

impl GradeLabel for CloudGrade {
    fn label_en(&self) -> &'static str {
        match self {
            CloudGrade::Clear => "clear",
            CloudGrade::MostlyClear => "mostly_clear",
            CloudGrade::PartlyCloudy => "partly_cloudy",
            CloudGrade::MostlyCloudy => "mostly_cloudy",
            CloudGrade::Cloudy => "cloudy",
        }
    }

    fn label_ar(&self) -> &'static str {
        match self {
            CloudGrade::Clear => "صافٍ",
            CloudGrade::MostlyClear => "صافٍ غالباً",
            CloudGrade::PartlyCloudy => "غائم جزئياً",
            CloudGrade::MostlyCloudy => "غائم غالباً",
            CloudGrade::Cloudy => "غائم",
        }
    }
}

/// Confidence band for a scored observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceGrade {
    Excellent,
    Good,
    Moderate,
    Low,
    Poor,
}

impl ConfidenceGrade {
    /// Band a confidence score. Lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ConfidenceGrade::Excellent
        } else if score >= 0.75 {
            ConfidenceGrade::Good
        } else if score >= 0.5 {
            ConfidenceGrade::Moderate
        } else if score >= 0.25 {
            ConfidenceGrade::Low
        } else {
            ConfidenceGrade::Poor
        }
    }
}

impl GradeLabel for ConfidenceGrade {
    fn label_en(&self) -> &'static str {
        match self {
            ConfidenceGrade::Excellent => "excellent",
            ConfidenceGrade::Good => "good",
            ConfidenceGrade::Moderate => "moderate",
            ConfidenceGrade::Low => "low",
            ConfidenceGrade::Poor => "poor",
        }
    }

    fn label_ar(&self) -> &'static str {
        match self {
            ConfidenceGrade::Excellent => "ممتاز",
            ConfidenceGrade::Good => "جيد",
            ConfidenceGrade::Moderate => "متوسط",
            ConfidenceGrade::Low => "منخفض",
            ConfidenceGrade::Poor => "ضعيف",
        }
    }
}
