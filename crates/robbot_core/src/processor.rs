//! Message routing
//!
//! The processor runs a single linear pass per message: tokenize, classify
//! pronouns, keep the features that are both pronoun-eligible and recognize a
//! keyword, then hand the message to those candidates in registration order.
//! The first candidate that resolves a subcategory wins. A candidate whose
//! subcategory has no callback stops the scan, since falling through would
//! hide the wiring gap behind another feature's guess.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{Span, debug, error, info, info_span, warn};

use crate::{
    Attempt, CommandCategory, CommandError, CommandSubcategory, DefaultResponses, Feature,
    Interpretation, Message, MessageContext, Pronoun, PronounLookupTable, Response,
    ResponsePool, Result,
};

pub struct CommandProcessor {
    pronoun_table: PronounLookupTable,
    responses: DefaultResponses,
    features: Vec<Box<dyn Feature>>,
    span: Span,
}

impl CommandProcessor {
    pub fn new(pronoun_table: PronounLookupTable, responses: DefaultResponses) -> Self {
        Self {
            pronoun_table,
            responses,
            features: Vec::new(),
            span: info_span!("command_processor"),
        }
    }

    /// Record all routing decisions under `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Add a feature. Features are tried in the order they were registered.
    pub fn register(&mut self, feature: impl Feature + 'static) {
        debug!(
            "Registered feature '{}' for {}",
            feature.name(),
            feature.category()
        );
        self.features.push(Box::new(feature));
    }

    pub fn with_feature(mut self, feature: impl Feature + 'static) -> Self {
        self.register(feature);
        self
    }

    pub fn features(&self) -> impl Iterator<Item = &dyn Feature> {
        self.features.iter().map(|f| f.as_ref())
    }

    pub fn responses(&self) -> &DefaultResponses {
        &self.responses
    }

    /// Classify raw chat text.
    pub fn process(&self, text: &str, context: MessageContext) -> Interpretation {
        self.process_message(Message::parse(text, context))
    }

    /// Classify an already tokenized message.
    ///
    /// Never fails: internal errors become the internal-error phrase with the
    /// cause attached to [`Interpretation::error`].
    pub fn process_message(&self, message: Message) -> Interpretation {
        let _entered = self.span.enter();
        let pronouns = self.pronoun_table.lookup(&message.content);
        debug!(?pronouns, message = %message.text(), "classified pronouns");

        match self.interpret(&pronouns, &message) {
            Ok(interpretation) => interpretation,
            Err(err) => {
                error!("Internal error while interpreting message: {}", err);
                let mut interpretation = Interpretation::new(
                    pronouns,
                    message,
                    Response::Ready(self.responses.internal_error.clone()),
                );
                interpretation.error = Some(err);
                interpretation
            }
        }
    }

    /// Produce the text for an interpretation.
    ///
    /// A failing callback is recorded on the interpretation and answered with
    /// a "no implementation" phrase. A panicking callback is recorded as
    /// [`CommandError::FeatureFailed`] and answered with the internal-error
    /// phrase.
    pub fn respond(&self, interpretation: &mut Interpretation) -> String {
        let _entered = self.span.enter();
        let evaluated = panic::catch_unwind(AssertUnwindSafe(|| interpretation.response.evaluate()));
        match evaluated {
            Ok(Ok(text)) => text,
            Err(payload) => {
                let feature = interpretation
                    .feature
                    .clone()
                    .unwrap_or_else(|| interpretation.category.to_string());
                let cause = panic_message(payload);
                error!("Callback of feature '{}' panicked: {}", feature, cause);
                interpretation.error = Some(CommandError::FeatureFailed {
                    feature,
                    cause: cause.into(),
                });
                self.responses.internal_error.clone()
            }
            Ok(Err(cause)) => {
                let category = interpretation.category;
                let subcategory = interpretation
                    .subcategory
                    .unwrap_or(CommandSubcategory::Unidentified);
                warn!(
                    "Callback for {} in {} failed: {}",
                    subcategory, category, cause
                );
                interpretation.error = Some(CommandError::HandlerFailed {
                    category,
                    subcategory,
                    cause,
                });
                self.responses
                    .pick(ResponsePool::NoImplementation)
                    .unwrap_or_else(|_| self.responses.internal_error.clone())
            }
        }
    }

    /// Classify and answer in one step.
    pub fn answer(&self, text: &str, context: MessageContext) -> (String, Interpretation) {
        let mut interpretation = self.process(text, context);
        let text = self.respond(&mut interpretation);
        (text, interpretation)
    }

    fn interpret(&self, pronouns: &[Pronoun], message: &Message) -> Result<Interpretation> {
        let candidates: Vec<&dyn Feature> = self
            .features()
            .filter(|f| f.is_pronoun_eligible(pronouns) && f.recognizes(message))
            .collect();

        if candidates.is_empty() {
            debug!("No feature recognized the message");
            let phrase = self.responses.pick(ResponsePool::NoResponse)?;
            return Ok(Interpretation::new(
                pronouns.to_vec(),
                message.clone(),
                Response::Ready(phrase),
            ));
        }

        let mut last_category = CommandCategory::Unidentified;
        for feature in candidates {
            last_category = feature.category();

            let attempt = panic::catch_unwind(AssertUnwindSafe(|| feature.attempt(message)))
                .unwrap_or_else(|payload| {
                    Err(CommandError::FeatureFailed {
                        feature: feature.name().to_string(),
                        cause: panic_message(payload).into(),
                    })
                });

            match attempt {
                Ok(Attempt::Matched {
                    subcategory,
                    response,
                }) => {
                    info!(
                        feature = feature.name(),
                        %subcategory,
                        "Matched {}",
                        feature.category()
                    );
                    return Ok(Interpretation {
                        pronouns: pronouns.to_vec(),
                        category: feature.category(),
                        subcategory: Some(subcategory),
                        feature: Some(feature.name().to_string()),
                        original_message: message.clone(),
                        response,
                        error: None,
                    });
                }
                Ok(Attempt::NoMatch) => {
                    debug!("Feature '{}' found no subcategory", feature.name());
                }
                Err(CommandError::MissingImplementation {
                    category,
                    subcategory,
                }) => {
                    warn!(
                        "Feature '{}' resolved {} but has no callback for it",
                        feature.name(),
                        subcategory
                    );
                    let phrase = self.responses.pick(ResponsePool::NoImplementation)?;
                    return Ok(Interpretation {
                        pronouns: pronouns.to_vec(),
                        category,
                        subcategory: Some(subcategory),
                        feature: Some(feature.name().to_string()),
                        original_message: message.clone(),
                        response: Response::Ready(phrase),
                        error: Some(CommandError::MissingImplementation {
                            category,
                            subcategory,
                        }),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let phrase = self.responses.pick(ResponsePool::NoSubcategory)?;
        let mut interpretation =
            Interpretation::new(pronouns.to_vec(), message.clone(), Response::Ready(phrase));
        interpretation.category = last_category;
        interpretation.subcategory = Some(CommandSubcategory::Unidentified);
        Ok(interpretation)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => format!("panicked: {message}"),
        Err(payload) => match payload.downcast_ref::<&str>() {
            Some(message) => format!("panicked: {message}"),
            None => "panicked".to_string(),
        },
    }
}

impl Default for CommandProcessor {
    fn default() -> Self {
        Self::new(PronounLookupTable::swedish(), DefaultResponses::default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{CallbackFeature, CommandParser, KeywordParser};
    use pretty_assertions::assert_eq;

    fn clock() -> CallbackFeature {
        let parser = KeywordParser::new(CommandCategory::TimeNow)
            .keywords(["klockan"])
            .words(["klockan"], CommandSubcategory::TimeNow);
        CallbackFeature::builder("clock", parser)
            .pronouns([Pronoun::Interrogative])
            .on(CommandSubcategory::TimeNow, || Ok("Den är 12:00!".into()))
            .build()
    }

    fn joke(category: CommandCategory) -> CallbackFeature {
        let parser = KeywordParser::new(category)
            .keywords(["klockan", "skämt"])
            .words(["skämt", "klockan"], CommandSubcategory::TellJoke);
        CallbackFeature::builder("joke", parser)
            .pronouns([Pronoun::Interrogative])
            .on(CommandSubcategory::TellJoke, || Ok("knock knock".into()))
            .build()
    }

    fn broken() -> CallbackFeature {
        let parser = KeywordParser::new(CommandCategory::Schedule)
            .keywords(["klockan"])
            .words(["klockan"], CommandSubcategory::ScheduleNextLesson);
        CallbackFeature::builder("broken", parser)
            .pronouns([Pronoun::Interrogative])
            .build()
    }

    #[test]
    fn unrecognized_message_draws_from_no_response_pool() {
        let processor = CommandProcessor::default().with_feature(clock());
        let (text, interpretation) = processor.answer("hej hopp", MessageContext::default());

        assert_eq!(interpretation.pronouns, vec![Pronoun::Unidentified]);
        assert_eq!(interpretation.category, CommandCategory::Unidentified);
        assert!(processor.responses().no_response.contains(&text));
    }

    #[test]
    fn pronoun_filter_applies_before_keywords() {
        let processor = CommandProcessor::default().with_feature(clock());
        // "du" is personal, and the clock only answers questions
        let interpretation = processor.process("du klockan", MessageContext::default());
        assert!(interpretation.is_unidentified());
    }

    #[test]
    fn first_registered_candidate_wins() {
        let processor = CommandProcessor::default()
            .with_feature(joke(CommandCategory::TellJoke))
            .with_feature(clock());
        let (text, interpretation) = processor.answer("vad är klockan", MessageContext::default());

        assert_eq!(interpretation.category, CommandCategory::TellJoke);
        assert_eq!(interpretation.feature.as_deref(), Some("joke"));
        assert_eq!(text, "knock knock");
    }

    #[test]
    fn missing_implementation_stops_the_scan() {
        let processor = CommandProcessor::default()
            .with_feature(broken())
            .with_feature(clock());
        let (text, interpretation) = processor.answer("vad är klockan", MessageContext::default());

        assert_eq!(interpretation.category, CommandCategory::Schedule);
        assert_eq!(
            interpretation.subcategory,
            Some(CommandSubcategory::ScheduleNextLesson)
        );
        assert!(processor.responses().no_implementation.contains(&text));
        assert!(
            interpretation
                .error
                .as_ref()
                .is_some_and(CommandError::is_missing_implementation)
        );
    }

    #[test]
    fn candidates_without_subcategory_fall_back_to_no_subcategory() {
        let parser = KeywordParser::new(CommandCategory::LunchMenu).keywords(["lunch"]);
        let lunch = CallbackFeature::builder("lunch", parser)
            .pronouns([Pronoun::Interrogative])
            .build();
        let processor = CommandProcessor::default().with_feature(lunch);
        let (text, interpretation) = processor.answer("vad blir det för lunch", MessageContext::default());

        assert_eq!(interpretation.category, CommandCategory::LunchMenu);
        assert_eq!(
            interpretation.subcategory,
            Some(CommandSubcategory::Unidentified)
        );
        assert!(processor.responses().no_subcategory.contains(&text));
    }

    #[test]
    fn failing_callback_is_reported_as_no_implementation() {
        let parser = KeywordParser::new(CommandCategory::TellJoke)
            .keywords(["skämt"])
            .words(["skämt"], CommandSubcategory::TellJoke);
        let feature = CallbackFeature::builder("joke", parser)
            .on(CommandSubcategory::TellJoke, || Err("reddit is down".into()))
            .build();
        let processor = CommandProcessor::default().with_feature(feature);
        let (text, interpretation) = processor.answer("skämt", MessageContext::default());

        assert!(processor.responses().no_implementation.contains(&text));
        assert!(matches!(
            interpretation.error,
            Some(CommandError::HandlerFailed {
                subcategory: CommandSubcategory::TellJoke,
                ..
            })
        ));
    }

    struct Exploding {
        parser: KeywordParser,
        pronouns: BTreeSet<Pronoun>,
    }

    impl Feature for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn parser(&self) -> &dyn CommandParser {
            &self.parser
        }

        fn pronouns(&self) -> &BTreeSet<Pronoun> {
            &self.pronouns
        }

        fn attempt(&self, _message: &Message) -> Result<Attempt> {
            Err(CommandError::FeatureFailed {
                feature: "exploding".into(),
                cause: "boom".into(),
            })
        }
    }

    #[test]
    fn internal_failures_become_the_internal_error_phrase() {
        let processor = CommandProcessor::default().with_feature(Exploding {
            parser: KeywordParser::new(CommandCategory::Ranking).keywords(["rank"]),
            pronouns: BTreeSet::from([Pronoun::Unidentified]),
        });
        let (text, interpretation) = processor.answer("rank", MessageContext::default());

        assert_eq!(text, "CommandProcessor: Internal error");
        assert!(matches!(
            interpretation.error,
            Some(CommandError::FeatureFailed { .. })
        ));
        assert_eq!(interpretation.original_message.content, vec!["rank"]);
    }

    #[test]
    fn panicking_callback_becomes_the_internal_error_phrase() {
        let parser = KeywordParser::new(CommandCategory::TellJoke)
            .keywords(["skämt"])
            .words(["skämt"], CommandSubcategory::TellJoke);
        let feature = CallbackFeature::builder("joke", parser)
            .on(CommandSubcategory::TellJoke, || panic!("index out of bounds"))
            .build();
        let processor = CommandProcessor::default().with_feature(feature);
        let (text, interpretation) = processor.answer("skämt", MessageContext::default());

        assert_eq!(text, "CommandProcessor: Internal error");
        match interpretation.error {
            Some(CommandError::FeatureFailed { feature, cause }) => {
                assert_eq!(feature, "joke");
                assert_eq!(cause.to_string(), "panicked: index out of bounds");
            }
            other => panic!("expected a feature failure, got {other:?}"),
        }
    }

    struct Panicking {
        parser: KeywordParser,
        pronouns: BTreeSet<Pronoun>,
    }

    impl Feature for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn parser(&self) -> &dyn CommandParser {
            &self.parser
        }

        fn pronouns(&self) -> &BTreeSet<Pronoun> {
            &self.pronouns
        }

        fn attempt(&self, _message: &Message) -> Result<Attempt> {
            panic!("table not loaded")
        }
    }

    #[test]
    fn panicking_feature_does_not_escape_classification() {
        let processor = CommandProcessor::default().with_feature(Panicking {
            parser: KeywordParser::new(CommandCategory::Ranking).keywords(["rank"]),
            pronouns: BTreeSet::from([Pronoun::Unidentified]),
        });
        let (text, interpretation) = processor.answer("rank", MessageContext::default());

        assert_eq!(text, "CommandProcessor: Internal error");
        assert!(matches!(
            interpretation.error,
            Some(CommandError::FeatureFailed { ref feature, .. }) if feature == "panicking"
        ));
    }

    #[test]
    fn empty_pool_is_an_internal_error() {
        let responses = DefaultResponses {
            no_response: vec![],
            ..Default::default()
        };
        let processor = CommandProcessor::new(PronounLookupTable::swedish(), responses);
        let (text, interpretation) = processor.answer("hej", MessageContext::default());

        assert_eq!(text, "CommandProcessor: Internal error");
        assert!(matches!(
            interpretation.error,
            Some(CommandError::EmptyPhrasePool { pool: "no_response" })
        ));
    }
}
