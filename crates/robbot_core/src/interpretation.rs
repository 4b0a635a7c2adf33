use std::fmt;

use crate::{CommandCategory, CommandError, CommandSubcategory, HandlerResult, Message, Pronoun};

type Thunk = dyn Fn() -> HandlerResult + Send + Sync;

/// What the processor hands back for the chat client to send.
pub enum Response {
    /// Text that is already computed.
    Ready(String),
    /// Text computed on demand, so classification can be logged first.
    Deferred(Box<Thunk>),
}

impl Response {
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        Self::Deferred(Box::new(f))
    }

    /// Produce the response text.
    pub fn evaluate(&self) -> HandlerResult {
        match self {
            Self::Ready(text) => Ok(text.clone()),
            Self::Deferred(f) => f(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(text) => f.debug_tuple("Ready").field(text).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// The result of classifying one message.
pub struct Interpretation {
    pub pronouns: Vec<Pronoun>,
    pub category: CommandCategory,
    pub subcategory: Option<CommandSubcategory>,
    /// Name of the feature that produced the response, if any.
    pub feature: Option<String>,
    pub original_message: Message,
    pub response: Response,
    /// Diagnostic for the caller to log. Never shown to the user.
    pub error: Option<CommandError>,
}

impl Interpretation {
    pub(crate) fn new(pronouns: Vec<Pronoun>, message: Message, response: Response) -> Self {
        Self {
            pronouns,
            category: CommandCategory::Unidentified,
            subcategory: None,
            feature: None,
            original_message: message,
            response,
            error: None,
        }
    }

    pub fn is_unidentified(&self) -> bool {
        self.category == CommandCategory::Unidentified
    }
}

impl fmt::Debug for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpretation")
            .field("pronouns", &self.pronouns)
            .field("category", &self.category)
            .field("subcategory", &self.subcategory)
            .field("feature", &self.feature)
            .field("original_message", &self.original_message.content)
            .field("response", &self.response)
            .field("error", &self.error.as_ref().map(ToString::to_string))
            .finish()
    }
}
