use crate::core::repository::SubjectRepository;
use crate::domain::model::{NewScore, NewSubject, Score, Subject};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::{
    validate_above, validate_hex_color, validate_non_empty_string, validate_positive_number,
    validate_range, Validate,
};

const ID_LEN: usize = 9;

/// In-memory subject list backed by a repository. Every mutation replaces the
/// affected collection and writes the whole list back before returning.
pub struct SubjectTracker<S: Storage> {
    repository: SubjectRepository<S>,
    subjects: Vec<Subject>,
}

impl<S: Storage> SubjectTracker<S> {
    pub async fn load(storage: S) -> Self {
        let repository = SubjectRepository::new(storage);
        let subjects = repository.load().await;
        Self {
            repository,
            subjects,
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn get(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Looks a subject up by id, then by case-insensitive name.
    pub fn find(&self, query: &str) -> Result<&Subject> {
        let query = query.trim();
        self.get(query)
            .or_else(|| {
                self.subjects
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(query))
            })
            .ok_or_else(|| TrackerError::SubjectNotFound {
                query: query.to_string(),
            })
    }

    pub async fn add_subject(&mut self, input: NewSubject) -> Result<&Subject> {
        input.validate()?;

        let id = unique_id(self.subjects.iter().map(|s| s.id.as_str()));
        let subject = Subject {
            id,
            name: input.name.trim().to_string(),
            code: input
                .code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            color: input.color,
            target_score: input.target_score,
            credits: input.credits,
            scores: Vec::new(),
        };
        tracing::info!("Adding subject '{}' ({})", subject.name, subject.id);

        let mut next = self.subjects.clone();
        next.push(subject);
        self.commit(next).await?;

        Ok(&self.subjects[self.subjects.len() - 1])
    }

    /// Removes a subject together with all of its scores.
    pub async fn remove_subject(&mut self, id: &str) -> Result<Subject> {
        let removed = self.get(id).cloned().ok_or_else(|| TrackerError::SubjectNotFound {
            query: id.to_string(),
        })?;
        tracing::info!(
            "Removing subject '{}' and its {} scores",
            removed.name,
            removed.scores.len()
        );

        let next = self.subjects.iter().filter(|s| s.id != id).cloned().collect();
        self.commit(next).await?;
        Ok(removed)
    }

    pub async fn add_score(&mut self, subject_id: &str, input: NewScore) -> Result<&Score> {
        input.validate()?;

        let subject = self.get(subject_id).ok_or_else(|| TrackerError::SubjectNotFound {
            query: subject_id.to_string(),
        })?;
        let score = Score {
            id: unique_id(subject.scores.iter().map(|s| s.id.as_str())),
            title: input.title.trim().to_string(),
            obtained: input.obtained,
            total: input.total,
            date: input.date,
            kind: input.kind,
            notes: input
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };
        tracing::info!(
            "Adding score '{}' ({}/{}) to '{}'",
            score.title,
            score.obtained,
            score.total,
            subject.name
        );

        let next = self
            .subjects
            .iter()
            .map(|s| {
                if s.id == subject_id {
                    let mut updated = s.clone();
                    updated.scores.push(score.clone());
                    updated
                } else {
                    s.clone()
                }
            })
            .collect();
        self.commit(next).await?;

        // The subject exists; commit only replaced the list.
        let subject = self.get(subject_id).ok_or_else(|| TrackerError::SubjectNotFound {
            query: subject_id.to_string(),
        })?;
        subject
            .scores
            .last()
            .ok_or_else(|| TrackerError::StorageError {
                message: "score missing after commit".to_string(),
            })
    }

    pub async fn remove_score(&mut self, subject_id: &str, score_id: &str) -> Result<Score> {
        let subject = self.get(subject_id).ok_or_else(|| TrackerError::SubjectNotFound {
            query: subject_id.to_string(),
        })?;
        let removed = subject
            .scores
            .iter()
            .find(|sc| sc.id == score_id)
            .cloned()
            .ok_or_else(|| TrackerError::ScoreNotFound {
                subject: subject.name.clone(),
                score_id: score_id.to_string(),
            })?;
        tracing::info!("Removing score '{}' from '{}'", removed.title, subject.name);

        let next = self
            .subjects
            .iter()
            .map(|s| {
                if s.id == subject_id {
                    let mut updated = s.clone();
                    updated.scores.retain(|sc| sc.id != score_id);
                    updated
                } else {
                    s.clone()
                }
            })
            .collect();
        self.commit(next).await?;
        Ok(removed)
    }

    /// Persists `next` and only then makes it the current list.
    async fn commit(&mut self, next: Vec<Subject>) -> Result<()> {
        self.repository.save(&next).await?;
        self.subjects = next;
        Ok(())
    }
}

impl Validate for NewSubject {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_hex_color("color", &self.color)?;
        // 任何百分比都可作為目標，不限於 50 以上
        validate_range("target_score", self.target_score, 0.0, 100.0)?;
        validate_positive_number("credits", self.credits, 1)?;
        Ok(())
    }
}

impl Validate for NewScore {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        if !self.obtained.is_finite() || self.obtained < 0.0 {
            return Err(TrackerError::InvalidConfigValueError {
                field: "obtained".to_string(),
                value: self.obtained.to_string(),
                reason: "Value must be zero or more".to_string(),
            });
        }
        validate_above("total", self.total, 0.0)?;
        Ok(())
    }
}

/// Short lowercase alphanumeric id, regenerated until it does not collide.
fn unique_id<'a>(existing: impl Iterator<Item = &'a str> + Clone) -> String {
    loop {
        let candidate: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(ID_LEN)
            .collect();
        if !existing.clone().any(|id| id == candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repository::{default_subjects, STORAGE_KEY};
    use crate::domain::model::AssessmentType;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        writes: Arc<Mutex<usize>>,
    }

    impl MockStorage {
        async fn stored(&self) -> Vec<Subject> {
            let files = self.files.lock().await;
            serde_json::from_slice(files.get(STORAGE_KEY).unwrap()).unwrap()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.files.lock().await.get(key).cloned())
        }

        async fn write_file(&self, key: &str, data: &[u8]) -> Result<()> {
            *self.writes.lock().await += 1;
            self.files.lock().await.insert(key.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn new_score(title: &str, obtained: f64, total: f64) -> NewScore {
        NewScore {
            title: title.to_string(),
            obtained,
            total,
            date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            kind: AssessmentType::Assignment,
            notes: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_subject_persists_immediately() {
        let storage = MockStorage::default();
        let mut tracker = SubjectTracker::load(storage.clone()).await;

        let mut input = NewSubject::named("  Physics ");
        input.code = Some(String::new());
        let added = tracker.add_subject(input).await.unwrap().clone();

        assert_eq!(added.name, "Physics");
        assert_eq!(added.code, None);
        assert_eq!(added.id.len(), 9);
        assert!(added.scores.is_empty());
        assert_eq!(tracker.subjects().len(), 3);
        assert_eq!(storage.stored().await, tracker.subjects());
        assert_eq!(*storage.writes.lock().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_input_does_not_write() {
        let storage = MockStorage::default();
        let mut tracker = SubjectTracker::load(storage.clone()).await;

        let mut input = NewSubject::named("Chemistry");
        input.credits = 0;
        assert!(tracker.add_subject(input).await.is_err());
        assert!(tracker.add_subject(NewSubject::named("   ")).await.is_err());
        assert!(tracker
            .add_score("sub_1", new_score("Lab", 5.0, 0.0))
            .await
            .is_err());
        assert!(tracker
            .add_score("sub_1", new_score("Lab", -1.0, 10.0))
            .await
            .is_err());

        assert_eq!(*storage.writes.lock().await, 0);
        assert_eq!(tracker.subjects(), default_subjects().as_slice());
    }

    #[test]
    fn test_target_accepts_any_percentage() {
        for target in [0.0, 40.0, 50.0, 100.0] {
            let mut input = NewSubject::named("Art");
            input.target_score = target;
            assert!(input.validate().is_ok(), "target {} rejected", target);
        }
        for target in [-1.0, 100.5, f64::NAN] {
            let mut input = NewSubject::named("Art");
            input.target_score = target;
            assert!(input.validate().is_err(), "target {} accepted", target);
        }
    }

    #[tokio::test]
    async fn test_add_score_appends_in_entry_order() {
        let storage = MockStorage::default();
        let mut tracker = SubjectTracker::load(storage.clone()).await;

        let score = tracker
            .add_score("sub_1", new_score("Homework 1", 9.0, 10.0))
            .await
            .unwrap()
            .clone();

        assert_eq!(score.notes, None);
        let math = tracker.get("sub_1").unwrap();
        assert_eq!(math.scores.len(), 3);
        assert_eq!(math.scores.last().unwrap().id, score.id);
        assert_eq!(tracker.get("sub_2").unwrap(), &default_subjects()[1]);
        assert_eq!(storage.stored().await, tracker.subjects());
    }

    #[tokio::test]
    async fn test_remove_subject_drops_its_scores() {
        let storage = MockStorage::default();
        let mut tracker = SubjectTracker::load(storage.clone()).await;

        let removed = tracker.remove_subject("sub_1").await.unwrap();
        assert_eq!(removed.scores.len(), 2);
        assert!(tracker.get("sub_1").is_none());
        assert_eq!(tracker.subjects(), &default_subjects()[1..]);
        assert_eq!(storage.stored().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_score_leaves_everything_else() {
        let storage = MockStorage::default();
        let mut tracker = SubjectTracker::load(storage.clone()).await;

        let removed = tracker.remove_score("sub_1", "s1").await.unwrap();
        assert_eq!(removed.title, "Midterm Exam");

        let defaults = default_subjects();
        let math = tracker.get("sub_1").unwrap();
        assert_eq!(math.scores, vec![defaults[0].scores[1].clone()]);
        assert_eq!(math.name, defaults[0].name);
        assert_eq!(tracker.get("sub_2").unwrap(), &defaults[1]);
    }

    #[tokio::test]
    async fn test_missing_targets_are_reported() {
        let mut tracker = SubjectTracker::load(MockStorage::default()).await;

        assert!(matches!(
            tracker.remove_subject("nope").await,
            Err(TrackerError::SubjectNotFound { .. })
        ));
        assert!(matches!(
            tracker.remove_score("sub_1", "s3").await,
            Err(TrackerError::ScoreNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_by_id_or_name() {
        let tracker = SubjectTracker::load(MockStorage::default()).await;
        assert_eq!(tracker.find("sub_2").unwrap().name, "Computer Science");
        assert_eq!(tracker.find("computer science").unwrap().id, "sub_2");
        assert!(tracker.find("History").is_err());
    }

    #[test]
    fn test_unique_id_avoids_existing() {
        let existing = ["abc".to_string()];
        let id = unique_id(existing.iter().map(|s| s.as_str()));
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(id, "abc");
    }
}
