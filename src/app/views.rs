use crate::core::stats::{self, SubjectStatus, TrendPoint};
use crate::domain::model::{AssessmentType, Subject};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCard {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub color: String,
    pub percentage: f64,
    pub target_score: f64,
    pub status: SubjectStatus,
    pub passing: bool,
    pub recent: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub overall_average: f64,
    pub subject_count: usize,
    pub total_assessments: usize,
    pub highest_performing: Option<String>,
    pub cards: Vec<SubjectCard>,
    pub insights_available: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub kind: AssessmentType,
    pub obtained: f64,
    pub total: f64,
    pub percentage: f64,
    pub meets_target: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectDetailView {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub color: String,
    pub credits: u32,
    pub target_score: f64,
    pub percentage: f64,
    pub status: SubjectStatus,
    pub trend: Vec<TrendPoint>,
    /// Newest entry first.
    pub history: Vec<HistoryEntry>,
}

impl SubjectCard {
    pub fn build(subject: &Subject) -> Self {
        Self {
            id: subject.id.clone(),
            name: subject.name.clone(),
            code: subject.code.clone(),
            color: subject.color.clone(),
            percentage: stats::subject_percentage(subject),
            target_score: subject.target_score,
            status: stats::status(subject),
            passing: stats::is_passing(subject),
            recent: stats::recent_trend(subject),
        }
    }

    /// Two-letter badge shown next to the name.
    pub fn initials(&self) -> String {
        self.name.chars().take(2).collect::<String>().to_uppercase()
    }
}

impl DashboardView {
    pub fn build(subjects: &[Subject], insights_available: bool) -> Self {
        Self {
            overall_average: stats::overall_average(subjects),
            subject_count: subjects.len(),
            total_assessments: stats::total_assessments(subjects),
            highest_performing: stats::highest_performing(subjects).map(|s| s.name.clone()),
            cards: subjects.iter().map(SubjectCard::build).collect(),
            insights_available,
        }
    }
}

impl SubjectDetailView {
    pub fn build(subject: &Subject) -> Self {
        let history = subject
            .scores
            .iter()
            .rev()
            .map(|s| HistoryEntry {
                id: s.id.clone(),
                title: s.title.clone(),
                date: s.date,
                kind: s.kind,
                obtained: s.obtained,
                total: s.total,
                percentage: stats::score_percentage(s),
                meets_target: stats::meets_target(s, subject),
                notes: s.notes.clone(),
            })
            .collect();

        Self {
            id: subject.id.clone(),
            name: subject.name.clone(),
            code: subject.code.clone(),
            color: subject.color.clone(),
            credits: subject.credits,
            target_score: subject.target_score,
            percentage: stats::subject_percentage(subject),
            status: stats::status(subject),
            trend: stats::trend(subject),
            history,
        }
    }
}
