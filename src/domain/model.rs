use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssessmentType {
    Exam,
    #[default]
    Quiz,
    Assignment,
    Project,
    Other,
}

impl AssessmentType {
    pub const ALL: [AssessmentType; 5] = [
        AssessmentType::Exam,
        AssessmentType::Quiz,
        AssessmentType::Assignment,
        AssessmentType::Project,
        AssessmentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Exam => "Exam",
            AssessmentType::Quiz => "Quiz",
            AssessmentType::Assignment => "Assignment",
            AssessmentType::Project => "Project",
            AssessmentType::Other => "Other",
        }
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AssessmentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown assessment type '{}' (expected one of: Exam, Quiz, Assignment, Project, Other)",
                    s
                )
            })
    }
}

/// One graded assessment. Never edited in place; replaced by deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub id: String,
    pub title: String,
    pub obtained: f64,
    pub total: f64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub code: Option<String>,
    pub color: String,
    pub target_score: f64,
    pub credits: u32,
    #[serde(default)]
    pub scores: Vec<Score>,
}

/// User input for a subject, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubject {
    pub name: String,
    pub code: Option<String>,
    pub color: String,
    pub target_score: f64,
    pub credits: u32,
}

impl NewSubject {
    pub const DEFAULT_COLOR: &'static str = "#4F46E5";
    pub const DEFAULT_TARGET: f64 = 90.0;
    pub const DEFAULT_CREDITS: u32 = 3;

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
            color: Self::DEFAULT_COLOR.to_string(),
            target_score: Self::DEFAULT_TARGET,
            credits: Self::DEFAULT_CREDITS,
        }
    }
}

/// User input for a score, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub title: String,
    pub obtained: f64,
    pub total: f64,
    pub date: NaiveDate,
    pub kind: AssessmentType,
    pub notes: Option<String>,
}

/// Colors offered when creating a subject.
pub const COLOR_PALETTE: [&str; 6] = [
    "#4F46E5", "#10B981", "#F59E0B", "#EF4444", "#EC4899", "#8B5CF6",
];

/// Structured reply from the insight model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightData {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub tips: Vec<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
