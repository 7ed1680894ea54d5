//! Aggregations derived from subjects and scores. Nothing here is stored;
//! every figure is recomputed from the score lists on demand.

use crate::domain::model::{Score, Subject};
use chrono::NaiveDate;

/// How many of the latest scores the dashboard cards and the insight prompt use.
pub const RECENT_WINDOW: usize = 5;

/// Points below target that still count as passing.
pub const PASSING_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectStatus {
    OnTrack,
    NeedsFocus,
}

impl SubjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SubjectStatus::OnTrack => "On Track",
            SubjectStatus::NeedsFocus => "Needs Focus",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub title: String,
    /// Score percentage rounded to one decimal.
    pub percentage: f64,
}

pub fn score_percentage(score: &Score) -> f64 {
    if score.total > 0.0 {
        score.obtained / score.total * 100.0
    } else {
        0.0
    }
}

pub fn totals(scores: &[Score]) -> (f64, f64) {
    scores
        .iter()
        .fold((0.0, 0.0), |(obtained, total), s| (obtained + s.obtained, total + s.total))
}

/// sum(obtained) / sum(total) * 100, or 0 when nothing has been graded.
pub fn percentage_of(scores: &[Score]) -> f64 {
    let (obtained, total) = totals(scores);
    if total > 0.0 {
        obtained / total * 100.0
    } else {
        0.0
    }
}

pub fn subject_percentage(subject: &Subject) -> f64 {
    percentage_of(&subject.scores)
}

/// Unweighted mean of subject percentages; credits are ignored.
pub fn overall_average(subjects: &[Subject]) -> f64 {
    if subjects.is_empty() {
        return 0.0;
    }
    let sum: f64 = subjects.iter().map(subject_percentage).sum();
    sum / subjects.len() as f64
}

pub fn status(subject: &Subject) -> SubjectStatus {
    if subject_percentage(subject) >= subject.target_score {
        SubjectStatus::OnTrack
    } else {
        SubjectStatus::NeedsFocus
    }
}

pub fn is_on_track(subject: &Subject) -> bool {
    status(subject) == SubjectStatus::OnTrack
}

pub fn is_passing(subject: &Subject) -> bool {
    subject_percentage(subject) >= subject.target_score - PASSING_MARGIN
}

pub fn meets_target(score: &Score, subject: &Subject) -> bool {
    score_percentage(score) >= subject.target_score
}

pub fn total_assessments(subjects: &[Subject]) -> usize {
    subjects.iter().map(|s| s.scores.len()).sum()
}

pub fn trend(subject: &Subject) -> Vec<TrendPoint> {
    subject
        .scores
        .iter()
        .map(|s| TrendPoint {
            date: s.date,
            title: s.title.clone(),
            percentage: round1(score_percentage(s)),
        })
        .collect()
}

pub fn recent_trend(subject: &Subject) -> Vec<TrendPoint> {
    let mut points = trend(subject);
    let skip = points.len().saturating_sub(RECENT_WINDOW);
    points.drain(..skip);
    points
}

pub fn recent_scores(scores: &[Score]) -> &[Score] {
    &scores[scores.len().saturating_sub(RECENT_WINDOW)..]
}

/// Subject with the best obtained/total ratio. Ties go to the earlier subject.
pub fn highest_performing(subjects: &[Subject]) -> Option<&Subject> {
    let ratio = |s: &Subject| {
        let (obtained, total) = totals(&s.scores);
        obtained / total.max(1.0)
    };

    subjects.iter().fold(None, |best: Option<&Subject>, s| match best {
        Some(b) if ratio(b) >= ratio(s) => Some(b),
        _ => Some(s),
    })
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One decimal with ties rounded up, e.g. 12.25 -> "12.3%".
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", round1(value))
}
