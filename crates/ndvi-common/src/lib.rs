//! Common types and utilities shared across the NDVI engine crates.

pub mod error;
pub mod grade;
pub mod observation;
pub mod time;

pub use error::{NdviError, NdviResult};
pub use grade::{CloudGrade, ConfidenceGrade, GradeLabel};
pub use observation::{CloudEncoding, NdviStats, Observation, RawObservation};
pub use time::{age_in_days, today_utc, DateRange};
