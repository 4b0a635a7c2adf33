//! Features: a parser, a pronoun affinity and a table of response callbacks

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::{
    CommandCategory, CommandError, CommandParser, CommandSubcategory, HandlerResult, Message,
    Pronoun, Response, Result,
};

type PlainFn = dyn Fn() -> HandlerResult + Send + Sync;
type InteractiveFn = dyn Fn(&Message) -> HandlerResult + Send + Sync;

/// A response producer bound to one subcategory.
#[derive(Clone)]
pub enum Callback {
    /// Takes no arguments.
    Plain(Arc<PlainFn>),
    /// Needs the raw message, e.g. to read a payload or mentions.
    Interactive(Arc<InteractiveFn>),
}

impl Callback {
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        Self::Plain(Arc::new(f))
    }

    pub fn interactive<F>(f: F) -> Self
    where
        F: Fn(&Message) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Interactive(Arc::new(f))
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive(_))
    }

    /// Turn the callback into a zero-argument deferred response.
    pub fn bind(&self, message: &Message) -> Response {
        match self {
            Self::Plain(f) => {
                let f = Arc::clone(f);
                Response::deferred(move || f())
            }
            Self::Interactive(f) => {
                let f = Arc::clone(f);
                let message = message.clone();
                Response::deferred(move || f(&message))
            }
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Callback::Plain"),
            Self::Interactive(_) => f.write_str("Callback::Interactive"),
        }
    }
}

/// Outcome of offering a message to a feature.
#[derive(Debug)]
pub enum Attempt {
    Matched {
        subcategory: CommandSubcategory,
        response: Response,
    },
    /// The feature was a candidate but no subcategory matched.
    NoMatch,
}

/// A self-contained domain handler.
pub trait Feature: Send + Sync {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    fn parser(&self) -> &dyn CommandParser;

    /// Pronoun classes that make this feature eligible.
    fn pronouns(&self) -> &BTreeSet<Pronoun>;

    fn category(&self) -> CommandCategory {
        self.parser().category()
    }

    fn recognizes(&self, message: &Message) -> bool {
        self.parser().recognizes(message)
    }

    /// Whether the found pronouns overlap this feature's affinity.
    ///
    /// [`Pronoun::Unidentified`] always counts as part of the affinity.
    fn is_pronoun_eligible(&self, found: &[Pronoun]) -> bool {
        found
            .iter()
            .any(|p| *p == Pronoun::Unidentified || self.pronouns().contains(p))
    }

    /// Resolve the message to a response producer.
    ///
    /// Returns [`CommandError::MissingImplementation`] when the parser picks
    /// a subcategory that has no callback.
    fn attempt(&self, message: &Message) -> Result<Attempt>;
}

/// The standard [`Feature`]: a parser plus a subcategory → callback table.
pub struct CallbackFeature {
    name: String,
    parser: Box<dyn CommandParser>,
    pronouns: BTreeSet<Pronoun>,
    callbacks: HashMap<CommandSubcategory, Callback>,
}

impl CallbackFeature {
    pub fn builder(
        name: impl Into<String>,
        parser: impl CommandParser + 'static,
    ) -> CallbackFeatureBuilder {
        CallbackFeatureBuilder {
            name: name.into(),
            parser: Box::new(parser),
            pronouns: BTreeSet::from([Pronoun::Unidentified]),
            callbacks: HashMap::new(),
        }
    }

    pub fn callback(&self, subcategory: CommandSubcategory) -> Option<&Callback> {
        self.callbacks.get(&subcategory)
    }
}

impl fmt::Debug for CallbackFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackFeature")
            .field("name", &self.name)
            .field("category", &self.parser.category())
            .field("pronouns", &self.pronouns)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Feature for CallbackFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn parser(&self) -> &dyn CommandParser {
        self.parser.as_ref()
    }

    fn pronouns(&self) -> &BTreeSet<Pronoun> {
        &self.pronouns
    }

    fn attempt(&self, message: &Message) -> Result<Attempt> {
        let subcategory = self.parser.resolve_subcategory(message);
        if subcategory.is_unidentified() {
            return Ok(Attempt::NoMatch);
        }

        let callback =
            self.callbacks
                .get(&subcategory)
                .ok_or(CommandError::MissingImplementation {
                    category: self.category(),
                    subcategory,
                })?;

        Ok(Attempt::Matched {
            subcategory,
            response: callback.bind(message),
        })
    }
}

/// Builder for [`CallbackFeature`]
pub struct CallbackFeatureBuilder {
    name: String,
    parser: Box<dyn CommandParser>,
    pronouns: BTreeSet<Pronoun>,
    callbacks: HashMap<CommandSubcategory, Callback>,
}

impl CallbackFeatureBuilder {
    pub fn pronouns<I>(mut self, pronouns: I) -> Self
    where
        I: IntoIterator<Item = Pronoun>,
    {
        self.pronouns.extend(pronouns);
        self
    }

    pub fn callback(mut self, subcategory: CommandSubcategory, callback: Callback) -> Self {
        self.callbacks.insert(subcategory, callback);
        self
    }

    pub fn on<F>(self, subcategory: CommandSubcategory, f: F) -> Self
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        self.callback(subcategory, Callback::plain(f))
    }

    pub fn on_message<F>(self, subcategory: CommandSubcategory, f: F) -> Self
    where
        F: Fn(&Message) -> HandlerResult + Send + Sync + 'static,
    {
        self.callback(subcategory, Callback::interactive(f))
    }

    pub fn build(self) -> CallbackFeature {
        CallbackFeature {
            name: self.name,
            parser: self.parser,
            pronouns: self.pronouns,
            callbacks: self.callbacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeywordParser;
    use pretty_assertions::assert_eq;

    fn reminder() -> CallbackFeature {
        let parser = KeywordParser::new(CommandCategory::Reminder)
            .keywords(["ihåg", "påminnelser"])
            .words(["ihåg"], CommandSubcategory::ReminderRememberEvent)
            .words(["påminnelser"], CommandSubcategory::ReminderShowEvents)
            .words(["event"], CommandSubcategory::TellJoke);

        CallbackFeature::builder("reminder", parser)
            .pronouns([Pronoun::Personal, Pronoun::Possessive])
            .on(CommandSubcategory::ReminderShowEvents, || {
                Ok("inga".to_string())
            })
            .on_message(CommandSubcategory::ReminderRememberEvent, |message| {
                Ok(message.text())
            })
            .build()
    }

    fn evaluate(attempt: Attempt) -> String {
        match attempt {
            Attempt::Matched { response, .. } => response.evaluate().unwrap(),
            Attempt::NoMatch => panic!("expected a match"),
        }
    }

    #[test]
    fn unidentified_is_always_eligible() {
        let feature = reminder();
        assert!(feature.is_pronoun_eligible(&[Pronoun::Unidentified]));
        assert!(feature.is_pronoun_eligible(&[Pronoun::Interrogative, Pronoun::Personal]));
        assert!(!feature.is_pronoun_eligible(&[Pronoun::Interrogative]));
    }

    #[test]
    fn interactive_callbacks_receive_the_message() {
        let feature = reminder();
        let message = Message::from_tokens(["kom", "ihåg;", "möte"]);
        let attempt = feature.attempt(&message).unwrap();
        assert_eq!(evaluate(attempt), "kom ihåg; möte");
    }

    #[test]
    fn plain_callbacks_ignore_the_message() {
        let feature = reminder();
        let attempt = feature
            .attempt(&Message::from_tokens(["påminnelser?"]))
            .unwrap();
        assert_eq!(evaluate(attempt), "inga");
    }

    #[test]
    fn unresolved_subcategory_is_no_match() {
        let feature = reminder();
        let attempt = feature.attempt(&Message::from_tokens(["hej"])).unwrap();
        assert!(matches!(attempt, Attempt::NoMatch));
    }

    #[test]
    fn unwired_subcategory_is_missing_implementation() {
        let feature = reminder();
        let err = feature
            .attempt(&Message::from_tokens(["event"]))
            .unwrap_err();
        match err {
            CommandError::MissingImplementation {
                category,
                subcategory,
            } => {
                assert_eq!(category, CommandCategory::Reminder);
                assert_eq!(subcategory, CommandSubcategory::TellJoke);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn callbacks_know_whether_they_are_interactive() {
        let feature = reminder();
        assert!(
            feature
                .callback(CommandSubcategory::ReminderRememberEvent)
                .unwrap()
                .is_interactive()
        );
        assert!(
            !feature
                .callback(CommandSubcategory::ReminderShowEvents)
                .unwrap()
                .is_interactive()
        );
    }
}
