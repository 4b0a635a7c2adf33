//! "Vad är klockan?"

use std::sync::Arc;

use robbot_core::{CallbackFeature, CommandCategory, CommandSubcategory, KeywordParser, Pronoun};

use crate::Clock;

const KEYWORDS: [&str; 3] = ["klockan", "tid", "tiden"];

pub fn time_phrase(clock: &dyn Clock) -> String {
    format!("Den är {}!", clock.now().format("%H:%M"))
}

pub fn feature(clock: Arc<dyn Clock>) -> CallbackFeature {
    let parser = KeywordParser::new(CommandCategory::TimeNow)
        .keywords(KEYWORDS)
        .words(KEYWORDS, CommandSubcategory::TimeNow);

    CallbackFeature::builder("time_now", parser)
        .pronouns([Pronoun::Interrogative])
        .on(CommandSubcategory::TimeNow, move || {
            Ok(time_phrase(clock.as_ref()))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use robbot_core::{Attempt, Feature, Message};

    #[test]
    fn answers_with_hours_and_minutes() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(8, 4, 59))
            .unwrap();
        let feature = feature(Arc::new(FixedClock::new(now)));

        match feature
            .attempt(&Message::from_tokens(["vad", "är", "klockan?"]))
            .unwrap()
        {
            Attempt::Matched { response, .. } => {
                assert_eq!(response.evaluate().unwrap(), "Den är 08:04!")
            }
            Attempt::NoMatch => panic!("expected a match"),
        }
    }
}
