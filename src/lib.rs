pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use app::commands::TrackerApp;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::gemini::GeminiClient;
pub use config::{cli::LocalStorage, Settings};
pub use crate::core::{insights::InsightService, repository::SubjectRepository, tracker::SubjectTracker};
pub use domain::model::{AssessmentType, InsightData, NewScore, NewSubject, Score, Subject};
pub use utils::error::{Result, TrackerError};
