//! RobBot Core - Command Interpretation Framework
//!
//! This crate routes free-text chat messages to pluggable features.
//! A message is classified by the pronouns it contains, offered to every
//! feature whose pronoun affinity overlaps, and handed to the first
//! feature whose keyword parser recognizes it.

pub mod category;
pub mod error;
pub mod feature;
pub mod interpretation;
pub mod message;
pub mod parser;
pub mod poll;
pub mod processor;
pub mod pronoun;
pub mod responses;

pub use category::{CommandCategory, CommandSubcategory};
pub use error::{CommandError, HandlerError, HandlerResult, Result};
pub use feature::{Attempt, Callback, CallbackFeature, CallbackFeatureBuilder, Feature};
pub use interpretation::{Interpretation, Response};
pub use message::{Message, MessageContext};
pub use parser::{CommandParser, KeywordParser, SubcategoryKey, IGNORED_CHARS};
pub use poll::PollCache;
pub use processor::CommandProcessor;
pub use pronoun::{Pronoun, PronounLookupTable};
pub use responses::{DefaultResponses, ResponsePool};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        Attempt, Callback, CallbackFeature, CommandCategory, CommandError, CommandParser,
        CommandProcessor, CommandSubcategory, DefaultResponses, Feature, HandlerResult,
        Interpretation, KeywordParser, Message, MessageContext, Pronoun, PronounLookupTable,
        Response, Result, SubcategoryKey,
    };
}
