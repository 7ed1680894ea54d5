use crate::domain::model::{AssessmentType, Score, Subject};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::NaiveDate;

/// The single slot the whole subject list lives under.
pub const STORAGE_KEY: &str = "scholartrack_data_v1";

pub struct SubjectRepository<S: Storage> {
    storage: S,
}

impl<S: Storage> SubjectRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Loads the stored list. A missing slot, a read failure or a document that
    /// does not parse all yield the default dataset; nothing is surfaced.
    pub async fn load(&self) -> Vec<Subject> {
        let bytes = match self.storage.read_file(STORAGE_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!("No stored subjects under '{}', using defaults", STORAGE_KEY);
                return default_subjects();
            }
            Err(e) => {
                tracing::warn!("Failed to read stored subjects: {}", e);
                return default_subjects();
            }
        };

        match serde_json::from_slice::<Vec<Subject>>(&bytes) {
            Ok(subjects) => {
                tracing::debug!("Loaded {} subjects", subjects.len());
                subjects
            }
            Err(e) => {
                tracing::warn!("Stored subjects are not valid, using defaults: {}", e);
                default_subjects()
            }
        }
    }

    /// Overwrites the slot with the full list.
    pub async fn save(&self, subjects: &[Subject]) -> Result<()> {
        let data = serde_json::to_vec(subjects)?;
        tracing::debug!("Saving {} subjects ({} bytes)", subjects.len(), data.len());
        self.storage.write_file(STORAGE_KEY, &data).await
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Seed data shown on first run or when the stored document is unreadable.
pub fn default_subjects() -> Vec<Subject> {
    vec![
        Subject {
            id: "sub_1".to_string(),
            name: "Mathematics".to_string(),
            code: Some("MATH101".to_string()),
            color: "#4F46E5".to_string(),
            target_score: 90.0,
            credits: 4,
            scores: vec![
                Score {
                    id: "s1".to_string(),
                    title: "Midterm Exam".to_string(),
                    obtained: 85.0,
                    total: 100.0,
                    date: date(2023, 10, 15),
                    kind: AssessmentType::Exam,
                    notes: None,
                },
                Score {
                    id: "s2".to_string(),
                    title: "Calculus Quiz".to_string(),
                    obtained: 18.0,
                    total: 20.0,
                    date: date(2023, 11, 2),
                    kind: AssessmentType::Quiz,
                    notes: None,
                },
            ],
        },
        Subject {
            id: "sub_2".to_string(),
            name: "Computer Science".to_string(),
            code: Some("CS202".to_string()),
            color: "#10B981".to_string(),
            target_score: 95.0,
            credits: 3,
            scores: vec![Score {
                id: "s3".to_string(),
                title: "Algorithm Project".to_string(),
                obtained: 98.0,
                total: 100.0,
                date: date(2023, 11, 20),
                kind: AssessmentType::Project,
                notes: None,
            }],
        },
    ]
}
