//! Configuration for the console bot
//!
//! Read from `robbot.toml`, then overridden from the environment. Snapshot
//! paths are resolved relative to the directory of the config file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveTime, TimeDelta, Weekday};
use miette::Diagnostic;
use robbot_core::{CommandError, DefaultResponses};
use robbot_features::{
    Event, JokeList, LessonList, ReminderBook, SourceError, Sources, StatsSnapshot, WeekMenu,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "robbot.toml";

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    #[diagnostic(
        code(robbot_cli::config_read),
        help("Pass --config or set ROBBOT_CONFIG to point at a readable file")
    )]
    Read {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    #[diagnostic(code(robbot_cli::config_parse))]
    Parse {
        path: PathBuf,
        #[source]
        cause: toml::de::Error,
    },

    #[error("The command prefix is empty")]
    #[diagnostic(
        code(robbot_cli::empty_prefix),
        help("Set `prefix` in the config or ROBBOT_PREFIX, for example \"rob\"")
    )]
    EmptyPrefix,

    #[error("Recurring event '{body}' has an invalid time '{time}'")]
    #[diagnostic(
        code(robbot_cli::invalid_event_time),
        help("Times are written as HH:MM")
    )]
    InvalidEventTime { body: String, time: String },

    #[error("Recurring event '{body}' has an invalid alarm of {minutes} minutes")]
    #[diagnostic(
        code(robbot_cli::invalid_alarm),
        help("alarm_minutes must be between 0 and 1439")
    )]
    InvalidAlarm { body: String, minutes: i64 },

    #[error("Recurring event '{body}' has no weekdays")]
    #[diagnostic(code(robbot_cli::no_weekdays))]
    NoWeekdays { body: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Responses(#[from] CommandError),
}

/// Offline data files backing the features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotFiles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jokes: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PathBuf>,
}

/// A weekly event announced without anyone asking for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringEventConfig {
    pub body: String,
    /// HH:MM
    pub time: String,
    pub weekdays: Vec<Weekday>,
    #[serde(default)]
    pub alarm_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl RecurringEventConfig {
    fn parsed_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(&self.time, "%H:%M").map_err(|_| {
            ConfigError::InvalidEventTime {
                body: self.body.clone(),
                time: self.time.clone(),
            }
        })
    }

    pub fn to_event(&self) -> Result<Event, ConfigError> {
        if self.weekdays.is_empty() {
            return Err(ConfigError::NoWeekdays {
                body: self.body.clone(),
            });
        }
        if !(0..MINUTES_PER_DAY).contains(&self.alarm_minutes) {
            return Err(ConfigError::InvalidAlarm {
                body: self.body.clone(),
                minutes: self.alarm_minutes,
            });
        }
        let mut event = Event::recurring(
            self.body.clone(),
            self.parsed_time()?,
            self.weekdays.iter().copied(),
        )
        .with_alarm(TimeDelta::minutes(self.alarm_minutes));
        if let Some(location) = &self.location {
            event = event.with_location(location.clone());
        }
        Ok(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobbotConfig {
    /// Word a message starts with to address the bot.
    pub prefix: String,
    /// Seconds between reminder checks.
    pub tick_seconds: u64,
    pub responses: DefaultResponses,
    pub snapshots: SnapshotFiles,
    #[serde(rename = "recurring", skip_serializing_if = "Vec::is_empty")]
    pub recurring_events: Vec<RecurringEventConfig>,
}

impl Default for RobbotConfig {
    fn default() -> Self {
        Self {
            prefix: "rob".to_string(),
            tick_seconds: 20,
            responses: DefaultResponses::default(),
            snapshots: SnapshotFiles::default(),
            recurring_events: vec![RecurringEventConfig {
                body: "Fredag, wohoo! :beers:".to_string(),
                time: "16:00".to_string(),
                weekdays: vec![Weekday::Fri],
                alarm_minutes: 30,
                location: None,
            }],
        }
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

impl RobbotConfig {
    /// Parse `content` as if it had been read from `path`.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|cause| ConfigError::Parse {
            path: path.to_path_buf(),
            cause,
        })?;

        let base_dir = path.parent().unwrap_or(Path::new("."));
        let snapshots = &mut config.snapshots;
        for file in [
            &mut snapshots.menu,
            &mut snapshots.schedule,
            &mut snapshots.jokes,
            &mut snapshots.stats,
        ] {
            if let Some(relative) = file.take() {
                *file = Some(resolve_path(base_dir, &relative));
            }
        }
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|cause| ConfigError::Read {
                path: path.to_path_buf(),
                cause,
            })?;
        Self::from_toml_str(&content, path)
    }

    /// Load `path` if given, else `robbot.toml` in the working directory if
    /// it exists, else the defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                info!("Loading config from: {:?}", path);
                Self::load(path).await
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                info!("Loading config from {}", DEFAULT_CONFIG_FILE);
                Self::load(Path::new(DEFAULT_CONFIG_FILE)).await
            }
            None => {
                info!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from `ROBBOT_*` variables looked up with `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(prefix) = lookup("ROBBOT_PREFIX") {
            debug!("Prefix overridden from environment");
            self.prefix = prefix;
        }
        let files = [
            ("ROBBOT_MENU_FILE", &mut self.snapshots.menu),
            ("ROBBOT_SCHEDULE_FILE", &mut self.snapshots.schedule),
            ("ROBBOT_JOKES_FILE", &mut self.snapshots.jokes),
            ("ROBBOT_STATS_FILE", &mut self.snapshots.stats),
        ];
        for (key, file) in files {
            if let Some(path) = lookup(key) {
                debug!("{} overridden from environment", key);
                *file = Some(PathBuf::from(path));
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        self.responses.validate()?;
        for event in &self.recurring_events {
            event.to_event()?;
        }
        Ok(())
    }

    /// Load every configured snapshot. Missing entries stay empty.
    pub fn sources(&self) -> Result<Sources, SourceError> {
        let mut sources = Sources::offline();
        if let Some(path) = &self.snapshots.menu {
            sources.menu = Arc::new(WeekMenu::load(path)?);
        }
        if let Some(path) = &self.snapshots.schedule {
            sources.schedule = Arc::new(LessonList::load(path)?);
        }
        if let Some(path) = &self.snapshots.jokes {
            sources.jokes = Arc::new(JokeList::load(path)?);
        }
        if let Some(path) = &self.snapshots.stats {
            sources.stats = Arc::new(StatsSnapshot::load(path)?);
        }
        Ok(sources)
    }

    /// Add the recurring events to `book`.
    pub fn register_recurring(&self, book: &ReminderBook) -> Result<(), ConfigError> {
        for event in &self.recurring_events {
            book.add_recurring(event.to_event()?);
        }
        Ok(())
    }
}
