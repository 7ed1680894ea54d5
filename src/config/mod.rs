pub mod cli;
pub mod toml_config;

use crate::adapters::gemini::{DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::fmt;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::domain::model::{AssessmentType, NewScore, NewSubject};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

pub const DEFAULT_DATA_DIR: &str = ".scholartrack";
pub const DEFAULT_CONFIG_FILE: &str = "scholartrack.toml";

/// Environment variables checked for the API credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Stand-in for a credential in `Debug` output.
pub(crate) fn redacted(key: &Option<String>) -> Option<&'static str> {
    key.as_ref().map(|_| "***")
}

/// Values given explicitly on the command line; they win over everything else.
#[derive(Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub json_logs: bool,
}

/// Effective settings after merging flags, environment, settings file and defaults.
#[derive(Clone)]
pub struct Settings {
    pub data_dir: String,
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub json_logs: bool,
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("data_dir", &self.data_dir)
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("data_dir", &self.data_dir)
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("api_endpoint", &self.api_endpoint)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl Settings {
    pub fn resolve(overrides: &Overrides, file: Option<&TomlConfig>) -> Self {
        Self::resolve_with_env(overrides, file, |name| std::env::var(name).ok())
    }

    pub fn resolve_with_env<F>(overrides: &Overrides, file: Option<&TomlConfig>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |v: &String| !v.trim().is_empty();

        let api_key = overrides
            .api_key
            .clone()
            .filter(non_blank)
            .or_else(|| API_KEY_VARS.iter().find_map(|name| env(*name).filter(non_blank)))
            .or_else(|| file.and_then(|f| f.api_key()).map(str::to_string));

        Self {
            data_dir: overrides
                .data_dir
                .clone()
                .or_else(|| file.and_then(|f| f.storage.data_dir.clone()))
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            api_key,
            model: overrides
                .model
                .clone()
                .or_else(|| file.and_then(|f| f.insights.model.clone()))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_endpoint: file
                .and_then(|f| f.insights.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            json_logs: overrides.json_logs
                || file.and_then(|f| f.logging.json).unwrap_or(false),
        }
    }
}

impl ConfigProvider for Settings {
    fn data_dir(&self) -> &str {
        &self.data_dir
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data_dir", &self.data_dir)?;
        validation::validate_non_empty_string("model", &self.model)?;
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Clone, Parser)]
#[command(name = "scholartrack")]
#[command(about = "Track subjects, assessment scores and progress toward target grades")]
pub struct CliConfig {
    /// Directory holding the subject data
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Settings file (defaults to ./scholartrack.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// API key for the insight service
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model used for insights
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Overview of every subject (default)
    Dashboard,

    /// Trend and score history for one subject
    Show {
        /// Subject id or name
        subject: String,
    },

    /// Create a subject
    AddSubject {
        name: String,

        #[arg(long)]
        code: Option<String>,

        #[arg(long, default_value = NewSubject::DEFAULT_COLOR)]
        color: String,

        /// Target score in percent
        #[arg(long, default_value_t = NewSubject::DEFAULT_TARGET)]
        target: f64,

        #[arg(long, default_value_t = NewSubject::DEFAULT_CREDITS)]
        credits: u32,
    },

    /// Delete a subject and all of its scores
    RemoveSubject {
        /// Subject id or name
        subject: String,
    },

    /// Record a score for a subject
    AddScore {
        /// Subject id or name
        subject: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        obtained: f64,

        #[arg(long, default_value_t = 100.0)]
        total: f64,

        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Exam, Quiz, Assignment, Project or Other
        #[arg(long = "type", default_value = "Quiz")]
        kind: AssessmentType,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete one score from a subject
    RemoveScore {
        /// Subject id or name
        subject: String,
        score_id: String,
    },

    /// Ask the AI coach for a summary, strengths, weaknesses and study tips
    Insights,

    /// List the colors offered for subjects
    Palette,
}

#[cfg(feature = "cli")]
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("data_dir", &self.data_dir)
            .field("config", &self.config)
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("verbose", &self.verbose)
            .field("json_logs", &self.json_logs)
            .field("command", &self.command)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            data_dir: self.data_dir.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            json_logs: self.json_logs,
        }
    }

    /// Loads the settings file named by `--config`, or the default file if it exists.
    pub fn load_file(&self) -> Result<Option<TomlConfig>> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path).map(Some),
            None if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() => {
                TomlConfig::from_file(DEFAULT_CONFIG_FILE).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Dashboard)
    }
}

#[cfg(feature = "cli")]
impl Command {
    /// Builds the new-score input for `add-score`, filling the date with `today`.
    pub fn new_score(&self, today: NaiveDate) -> Option<NewScore> {
        match self {
            Command::AddScore {
                title,
                obtained,
                total,
                date,
                kind,
                notes,
                ..
            } => Some(NewScore {
                title: title.clone(),
                obtained: *obtained,
                total: *total,
                date: date.unwrap_or(today),
                kind: *kind,
                notes: notes.clone(),
            }),
            _ => None,
        }
    }

    pub fn new_subject(&self) -> Option<NewSubject> {
        match self {
            Command::AddSubject {
                name,
                code,
                color,
                target,
                credits,
            } => Some(NewSubject {
                name: name.clone(),
                code: code.clone(),
                color: color.clone(),
                target_score: *target,
                credits: *credits,
            }),
            _ => None,
        }
    }
}
