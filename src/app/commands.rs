use crate::adapters::gemini::GeminiClient;
use crate::app::render;
use crate::app::views::{DashboardView, SubjectDetailView};
use crate::config::{Command, Settings};
use crate::core::insights::InsightService;
use crate::core::stats;
use crate::core::tracker::SubjectTracker;
use crate::core::{ConfigProvider, InsightProvider, Storage};
use crate::utils::error::{Result, TrackerError};
use chrono::{Local, NaiveDate};

/// Runs one CLI command against the loaded subject list and returns the text to print.
pub struct TrackerApp<S: Storage> {
    tracker: SubjectTracker<S>,
    settings: Settings,
}

impl<S: Storage> TrackerApp<S> {
    pub async fn load(storage: S, settings: Settings) -> Self {
        Self {
            tracker: SubjectTracker::load(storage).await,
            settings,
        }
    }

    pub fn tracker(&self) -> &SubjectTracker<S> {
        &self.tracker
    }

    pub async fn run(&mut self, command: &Command) -> Result<String> {
        self.run_on(command, Local::now().date_naive()).await
    }

    /// Same as `run`, with "today" supplied for default score dates.
    pub async fn run_on(&mut self, command: &Command, today: NaiveDate) -> Result<String> {
        match command {
            Command::Dashboard => Ok(render::dashboard(&DashboardView::build(
                self.tracker.subjects(),
                self.settings.insights_enabled(),
            ))),
            Command::Show { subject } => {
                let subject = self.tracker.find(subject)?;
                Ok(render::subject_detail(&SubjectDetailView::build(subject)))
            }
            Command::AddSubject { .. } => {
                let input = command.new_subject().ok_or_else(|| TrackerError::ConfigError {
                    message: "add-subject arguments missing".to_string(),
                })?;
                let subject = self.tracker.add_subject(input).await?;
                Ok(format!("Created subject '{}' (id {})\n", subject.name, subject.id))
            }
            Command::RemoveSubject { subject } => {
                let id = self.tracker.find(subject)?.id.clone();
                let removed = self.tracker.remove_subject(&id).await?;
                Ok(format!(
                    "Deleted subject '{}' and {} scores\n",
                    removed.name,
                    removed.scores.len()
                ))
            }
            Command::AddScore { subject, .. } => {
                let input = command.new_score(today).ok_or_else(|| TrackerError::ConfigError {
                    message: "add-score arguments missing".to_string(),
                })?;
                let id = self.tracker.find(subject)?.id.clone();
                let score = self.tracker.add_score(&id, input).await?;
                Ok(format!(
                    "Recorded '{}' {} (id {})\n",
                    score.title,
                    stats::format_percent(stats::score_percentage(score)),
                    score.id
                ))
            }
            Command::RemoveScore { subject, score_id } => {
                let id = self.tracker.find(subject)?.id.clone();
                let removed = self.tracker.remove_score(&id, score_id).await?;
                Ok(format!("Deleted score '{}'\n", removed.title))
            }
            Command::Insights => {
                let client = GeminiClient::from_config(&self.settings)?;
                self.insights_with(client).await
            }
            Command::Palette => Ok(render::palette()),
        }
    }

    pub async fn insights_with<P: InsightProvider>(&self, provider: P) -> Result<String> {
        if !self.settings.insights_enabled() {
            return Err(TrackerError::MissingCredentialError);
        }
        let service = InsightService::new(provider);
        let data = service.generate(self.tracker.subjects()).await?;
        Ok(render::insights(&data))
    }
}
