use crate::core::stats;
use crate::domain::model::{InsightData, Subject};
use crate::domain::ports::InsightProvider;
use crate::utils::error::{Result, TrackerError};
use serde::Serialize;

/// Condensed per-subject view sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub subject: String,
    pub current_grade: String,
    pub target: String,
    pub scores: Vec<String>,
}

pub fn summarize(subjects: &[Subject]) -> Vec<SubjectSummary> {
    subjects
        .iter()
        .map(|s| SubjectSummary {
            subject: s.name.clone(),
            current_grade: stats::format_percent(stats::subject_percentage(s)),
            target: format!("{}%", format_number(s.target_score)),
            scores: stats::recent_scores(&s.scores)
                .iter()
                .map(|sc| {
                    format!(
                        "{}: {}/{}",
                        sc.title,
                        format_number(sc.obtained),
                        format_number(sc.total)
                    )
                })
                .collect(),
        })
        .collect()
}

/// Prints integral values without a fractional part: 85 rather than 85.0.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn build_prompt(subjects: &[Subject]) -> Result<String> {
    let data = serde_json::to_string(&summarize(subjects))?;
    Ok(format!(
        r#"Analyze the student's academic performance in these subjects.

Provide:
1. A concise summary of their progress.
2. Key strengths (e.g., "Strong grasp of integrals").
3. Weaknesses to address.
4. 3 Actionable Study Tips, each naming a concrete technique, resource or tool.

Data: {}"#,
        data
    ))
}

/// Response schema requested from the model.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING", "description": "Overall summary" },
            "strengths": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of strengths"
            },
            "weaknesses": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of weaknesses"
            },
            "tips": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3 actionable study tips"
            }
        },
        "required": ["summary", "strengths", "weaknesses", "tips"]
    })
}

/// Parses the model's reply text. Anything that is not the requested shape fails.
pub fn parse_insight(text: &str) -> Result<InsightData> {
    if text.trim().is_empty() {
        return Err(TrackerError::InsightError {
            message: "No data returned from AI".to_string(),
        });
    }
    serde_json::from_str(text).map_err(|e| TrackerError::InsightError {
        message: format!("AI response did not match the expected format: {}", e),
    })
}

pub struct InsightService<P: InsightProvider> {
    provider: P,
}

impl<P: InsightProvider> InsightService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// One request, no retry; a failed call is reported and left to the user.
    pub async fn generate(&self, subjects: &[Subject]) -> Result<InsightData> {
        let prompt = build_prompt(subjects)?;
        tracing::info!("Requesting insights for {} subjects", subjects.len());
        tracing::debug!("Insight prompt: {}", prompt);

        match self.provider.generate(&prompt, &response_schema()).await {
            Ok(data) => {
                tracing::info!(
                    "Received insights: {} strengths, {} weaknesses, {} tips",
                    data.strengths.len(),
                    data.weaknesses.len(),
                    data.tips.len()
                );
                Ok(data)
            }
            Err(e) => {
                tracing::error!("Insight generation failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repository::default_subjects;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct RecordingProvider {
        reply: std::result::Result<InsightData, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl InsightProvider for RecordingProvider {
        async fn generate(
            &self,
            prompt: &str,
            schema: &serde_json::Value,
        ) -> Result<InsightData> {
            assert_eq!(schema["required"].as_array().unwrap().len(), 4);
            self.prompts.lock().await.push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|message| TrackerError::InsightError { message })
        }
    }

    fn sample_insight() -> InsightData {
        InsightData {
            summary: "Solid progress".to_string(),
            strengths: vec!["Projects".to_string()],
            weaknesses: vec!["Exams".to_string()],
            tips: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        }
    }

    #[test]
    fn test_summary_matches_wire_shape() {
        let summary = summarize(&default_subjects());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(
            json[0],
            serde_json::json!({
                "subject": "Mathematics",
                "currentGrade": "85.8%",
                "target": "90%",
                "scores": ["Midterm Exam: 85/100", "Calculus Quiz: 18/20"]
            })
        );
        assert_eq!(json[1]["currentGrade"], "98.0%");
    }

    #[test]
    fn test_summary_sends_only_last_five_scores() {
        let mut subjects = default_subjects();
        let template = subjects[0].scores[0].clone();
        for i in 0..6 {
            let mut s = template.clone();
            s.id = format!("x{}", i);
            s.title = format!("Quiz {}", i);
            s.obtained = 7.5;
            s.total = 10.0;
            subjects[0].scores.push(s);
        }

        let summary = summarize(&subjects);
        assert_eq!(summary[0].scores.len(), 5);
        assert_eq!(summary[0].scores[0], "Quiz 1: 7.5/10");
        assert_eq!(summary[0].scores[4], "Quiz 5: 7.5/10");
    }

    #[test]
    fn test_current_grade_rounds_ties_up() {
        let mut subjects = default_subjects();
        subjects[0].scores.truncate(1);
        subjects[0].scores[0].obtained = 49.0;
        subjects[0].scores[0].total = 400.0;

        let summary = summarize(&subjects);
        assert_eq!(summary[0].current_grade, "12.3%");
        assert_eq!(summary[0].scores, vec!["Midterm Exam: 49/400".to_string()]);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(85.0), "85");
        assert_eq!(format_number(18.5), "18.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_prompt_embeds_data() {
        let prompt = build_prompt(&default_subjects()).unwrap();
        assert!(prompt.contains("Data: [{\"subject\":\"Mathematics\""));
        assert!(prompt.contains("3 Actionable Study Tips"));
    }

    #[test]
    fn test_parse_insight_requires_every_field() {
        let ok = r#"{"summary":"s","strengths":["a"],"weaknesses":[],"tips":["t"]}"#;
        assert_eq!(parse_insight(ok).unwrap().summary, "s");

        let missing_tips = r#"{"summary":"s","strengths":[],"weaknesses":[]}"#;
        assert!(parse_insight(missing_tips).is_err());
        assert!(parse_insight("not json").is_err());

        let empty = parse_insight("  ").unwrap_err();
        assert_eq!(empty.user_friendly_message(), "No data returned from AI");
    }

    #[tokio::test]
    async fn test_service_sends_one_request() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let service = InsightService::new(RecordingProvider {
            reply: Ok(sample_insight()),
            prompts: prompts.clone(),
        });

        let data = service.generate(&default_subjects()).await.unwrap();
        assert_eq!(data, sample_insight());
        assert_eq!(prompts.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_service_does_not_retry_failures() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let service = InsightService::new(RecordingProvider {
            reply: Err("boom".to_string()),
            prompts: prompts.clone(),
        });

        let err = service.generate(&default_subjects()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(prompts.lock().await.len(), 1);
    }
}
