//! Batch NDVI engine: configuration and the assess / cache / summarize
//! pipeline used by the `ndvi-engine` binary.

pub mod config;
pub mod pipeline;

pub use config::{AnalyticsConfig, CacheConfig, EngineConfig};
pub use pipeline::{
    Baseline, BatchInput, BatchReport, FieldReport, Pipeline, Rejection, RejectionReason,
};
