pub mod insights;
pub mod repository;
pub mod stats;
pub mod tracker;

pub use crate::domain::model::{AssessmentType, InsightData, NewScore, NewSubject, Score, Subject};
pub use crate::domain::ports::{ConfigProvider, InsightProvider, Storage};
pub use crate::utils::error::Result;
