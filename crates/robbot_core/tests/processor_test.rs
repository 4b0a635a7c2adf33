//! Integration tests for message routing
//!
//! These tests drive the processor through its public API only, with small
//! closure-backed features standing in for the real ones.

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use robbot_core::prelude::*;
use robbot_core::{PollCache, ResponsePool};

fn clock_feature() -> CallbackFeature {
    let parser = KeywordParser::new(CommandCategory::TimeNow)
        .keywords(["klockan", "tid", "tiden"])
        .words(["klockan", "tid", "tiden"], CommandSubcategory::TimeNow);
    CallbackFeature::builder("clock", parser)
        .pronouns([Pronoun::Interrogative])
        .on(CommandSubcategory::TimeNow, || Ok("Den är 13:37!".to_string()))
        .build()
}

fn reminder_feature(saved: Arc<Mutex<Vec<String>>>) -> CallbackFeature {
    let parser = KeywordParser::new(CommandCategory::Reminder)
        .keywords(["ihåg", "påminnelser"])
        .ignore(';')
        .words(["ihåg"], CommandSubcategory::ReminderRememberEvent)
        .words(["påminnelser"], CommandSubcategory::ReminderShowEvents);
    CallbackFeature::builder("reminder", parser)
        .pronouns([Pronoun::Personal, Pronoun::Possessive])
        .on_message(CommandSubcategory::ReminderRememberEvent, move |message| {
            let text = message.text();
            let payload = text.split_once(';').map(|(_, p)| p).ok_or("no payload")?;
            saved.lock().push(payload.trim().to_string());
            Ok("Det är noterat! :slight_smile:".to_string())
        })
        .build()
}

#[test]
fn question_about_the_time_reaches_the_clock() {
    let processor = CommandProcessor::default().with_feature(clock_feature());
    let mut interpretation = processor.process_message(Message::from_tokens(["vad", "är", "klockan"]));

    assert_eq!(interpretation.pronouns, vec![Pronoun::Interrogative]);
    assert_eq!(interpretation.category, CommandCategory::TimeNow);
    assert_eq!(interpretation.subcategory, Some(CommandSubcategory::TimeNow));
    assert_eq!(processor.respond(&mut interpretation), "Den är 13:37!");
    assert!(interpretation.error.is_none());
}

#[test]
fn capitalized_tokens_are_routed_like_typed_text() {
    let processor = CommandProcessor::default().with_feature(clock_feature());
    let mut interpretation =
        processor.process_message(Message::from_tokens(["Vad", "är", "Klockan"]));

    assert_eq!(interpretation.pronouns, vec![Pronoun::Interrogative]);
    assert_eq!(interpretation.category, CommandCategory::TimeNow);
    assert_eq!(processor.respond(&mut interpretation), "Den är 13:37!");
}

#[test]
fn reminder_payload_survives_normalization() {
    let saved = Arc::new(Mutex::new(Vec::new()));
    let processor = CommandProcessor::default()
        .with_feature(clock_feature())
        .with_feature(reminder_feature(Arc::clone(&saved)));

    let message = Message::from_tokens([
        "kan", "du", "komma", "ihåg", ";", "möte", ",", "2024-01-01-10:00",
    ]);
    let mut interpretation = processor.process_message(message);

    assert_eq!(interpretation.category, CommandCategory::Reminder);
    assert_eq!(
        processor.respond(&mut interpretation),
        "Det är noterat! :slight_smile:"
    );
    assert_eq!(*saved.lock(), vec!["möte , 2024-01-01-10:00".to_string()]);
    assert_eq!(interpretation.original_message.content[4], ";");
}

#[test]
fn unrecognized_message_gets_a_no_response_phrase() {
    let processor = CommandProcessor::default()
        .with_feature(clock_feature())
        .with_feature(reminder_feature(Arc::default()));
    let (text, interpretation) = processor.answer("bra jobbat idag", MessageContext::default());

    assert_eq!(interpretation.pronouns, vec![Pronoun::Unidentified]);
    assert_eq!(interpretation.category, CommandCategory::Unidentified);
    assert!(
        processor
            .responses()
            .pool(ResponsePool::NoResponse)
            .contains(&text)
    );
}

#[test]
fn deferred_responses_run_only_when_responded_to() {
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let parser = KeywordParser::new(CommandCategory::TellJoke)
        .keywords(["skämt"])
        .words(["skämt"], CommandSubcategory::TellJoke);
    let feature = CallbackFeature::builder("joke", parser)
        .on(CommandSubcategory::TellJoke, move || {
            *counter.lock() += 1;
            Ok("ett skämt".to_string())
        })
        .build();
    let processor = CommandProcessor::default().with_feature(feature);

    let mut interpretation = processor.process("berätta ett skämt", MessageContext::default());
    assert!(!interpretation.response.is_ready());
    assert_eq!(*calls.lock(), 0);

    processor.respond(&mut interpretation);
    assert_eq!(*calls.lock(), 1);
}

#[test]
fn context_reaches_interactive_callbacks() {
    let parser = KeywordParser::new(CommandCategory::Ranking)
        .keywords(["rank"])
        .words(["rank"], CommandSubcategory::RankingForMember);
    let feature = CallbackFeature::builder("ranking", parser)
        .on_message(CommandSubcategory::RankingForMember, |message| {
            Ok(message.context.mentions.join(","))
        })
        .build();
    let processor = CommandProcessor::default().with_feature(feature);

    let context = MessageContext::from_author("anna").with_mentions(["olle", "stina"]);
    let (text, _) = processor.answer("rank @olle @stina", context);
    assert_eq!(text, "olle,stina");
}

#[test]
fn classification_is_repeatable() {
    let processor = CommandProcessor::default().with_feature(clock_feature());
    let first = processor.process("Vad är klockan?", MessageContext::default());
    let second = processor.process("Vad är klockan?", MessageContext::default());

    assert_eq!(first.pronouns, second.pronouns);
    assert_eq!(first.category, second.category);
    assert_eq!(first.subcategory, second.subcategory);
}

#[test]
fn poll_cache_announces_each_due_batch_once() {
    let mut cache = PollCache::new(false);
    let batches = [vec!["möte"], vec!["möte"], vec![], vec!["lunch"]];
    let announced: Vec<_> = batches
        .into_iter()
        .filter_map(|due| cache.poll("due", due))
        .collect();
    assert_eq!(announced, vec![vec!["möte"], vec![], vec!["lunch"]]);
}
