//! Observation quality for satellite NDVI readings.
//!
//! - [`cloud`]: cloud fractions from binary masks, SCL bands and QA bitmasks
//! - [`confidence`]: multi-factor `[0, 1]` reliability scores and grades
//! - [`assess`]: both of the above applied to a raw ingestion record

pub mod assess;
pub mod cloud;
pub mod confidence;

pub use assess::{assess_observation, Assessment, QualityPolicy};
pub use cloud::{
    cloud_coverage_grade, estimate, from_binary_mask, from_qa_bitmask,
    from_scene_classification, is_scene_usable, CloudCoverResult, CloudEstimate, SclClass,
};
pub use confidence::{
    confidence_breakdown, confidence_grade, confidence_score, should_use_observation,
    ConfidenceBreakdown, ConfidenceWeights,
};
