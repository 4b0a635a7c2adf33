use miette::Diagnostic;
use thiserror::Error;

use crate::{CommandCategory, CommandSubcategory};

/// Error produced by a response callback.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// What every response callback returns.
pub type HandlerResult = std::result::Result<String, HandlerError>;

#[derive(Error, Diagnostic, Debug)]
pub enum CommandError {
    #[error("No callback wired for {subcategory} in {category}")]
    #[diagnostic(
        code(robbot_core::missing_implementation),
        help(
            "The parser for {category} maps a keyword to {subcategory}, but the feature registers no callback for it"
        )
    )]
    MissingImplementation {
        category: CommandCategory,
        subcategory: CommandSubcategory,
    },

    #[error("Callback for {subcategory} in {category} failed")]
    #[diagnostic(
        code(robbot_core::handler_failed),
        help("The feature's data source or callback returned an error; see the cause")
    )]
    HandlerFailed {
        category: CommandCategory,
        subcategory: CommandSubcategory,
        #[source]
        cause: HandlerError,
    },

    #[error("Phrase pool '{pool}' is empty")]
    #[diagnostic(
        code(robbot_core::empty_phrase_pool),
        help("Every default response pool needs at least one phrase")
    )]
    EmptyPhrasePool { pool: &'static str },

    #[error("Feature '{feature}' failed while classifying a message")]
    #[diagnostic(code(robbot_core::feature_failed))]
    FeatureFailed {
        feature: String,
        #[source]
        cause: HandlerError,
    },
}

impl CommandError {
    /// Whether this error marks a wiring gap rather than a runtime failure.
    pub fn is_missing_implementation(&self) -> bool {
        matches!(self, Self::MissingImplementation { .. })
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
