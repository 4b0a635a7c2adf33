use std::path::PathBuf;

use chrono::NaiveDateTime;
use miette::Diagnostic;
use thiserror::Error;

/// Failures of the data sources behind the features.
#[derive(Error, Diagnostic, Debug)]
pub enum SourceError {
    #[error("Failed to read snapshot file {path}")]
    #[diagnostic(
        code(robbot_features::snapshot_read),
        help("Check that the file exists and is readable")
    )]
    Read {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("Failed to parse snapshot file {path}")]
    #[diagnostic(
        code(robbot_features::snapshot_parse),
        help("The file must be TOML matching the snapshot layout")
    )]
    Parse {
        path: PathBuf,
        #[source]
        cause: toml::de::Error,
    },

    #[error("The {source_name} source has no data")]
    #[diagnostic(code(robbot_features::source_empty))]
    Empty { source_name: &'static str },

    #[error("Unknown country: {country}")]
    #[diagnostic(
        code(robbot_features::unknown_country),
        help("Country names are matched in Swedish first, then in English")
    )]
    UnknownCountry { country: String },
}

/// Why a reminder request was refused.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ReminderError {
    #[error("Could not read a reminder from '{input}'")]
    #[diagnostic(
        code(robbot_features::reminder_format),
        help("Expected '<anything>; <what>, YYYY-MM-DD-HH:MM[, <where>]'")
    )]
    InvalidFormat { input: String },

    #[error("Reminder at {at} is less than {minimum_minutes} minutes ahead")]
    #[diagnostic(code(robbot_features::reminder_too_soon))]
    TooSoon {
        at: NaiveDateTime,
        minimum_minutes: i64,
    },
}
