//! Keyword and subcategory matching for a single feature

use std::collections::{BTreeSet, HashSet};

use crate::{CommandCategory, CommandSubcategory, Message};

/// Characters trimmed from both ends of every token before comparison.
pub const IGNORED_CHARS: &str = "?=)(/&%¤#\"!,.-;:_^*`´><|";

/// A rule selecting a subcategory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubcategoryKey {
    /// Matches when any token equals the word.
    Plain(String),
    /// Matches when the anchor and at least one companion both occur.
    Composite {
        anchor: String,
        companions: BTreeSet<String>,
    },
}

impl SubcategoryKey {
    pub fn plain(word: impl Into<String>) -> Self {
        Self::Plain(word.into())
    }

    pub fn composite<I, S>(anchor: impl Into<String>, companions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Composite {
            anchor: anchor.into(),
            companions: companions.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, tokens: &[String]) -> bool {
        match self {
            Self::Plain(word) => tokens.iter().any(|t| t == word),
            Self::Composite { anchor, companions } => {
                tokens.iter().any(|t| t == anchor) && tokens.iter().any(|t| companions.contains(t))
            }
        }
    }

    fn is_composite(&self) -> bool {
        matches!(self, Self::Composite { .. })
    }
}

/// Decides whether a message belongs to a feature and which operation it asks for.
pub trait CommandParser: Send + Sync {
    /// The category this parser gates.
    fn category(&self) -> CommandCategory;

    /// True if any normalized token is one of the parser's keywords.
    fn recognizes(&self, message: &Message) -> bool;

    /// The subcategory the message selects, or the parser's fallback.
    fn resolve_subcategory(&self, message: &Message) -> CommandSubcategory;
}

/// Table-driven [`CommandParser`].
///
/// Keywords gate candidacy; the ordered subcategory table picks the
/// operation. Composite keys are tried before plain ones, and within each
/// kind the first entry in declaration order wins.
#[derive(Debug, Clone)]
pub struct KeywordParser {
    category: CommandCategory,
    keywords: HashSet<String>,
    subcategories: Vec<(SubcategoryKey, CommandSubcategory)>,
    substitutions: Vec<(char, String)>,
    fallback: CommandSubcategory,
}

impl KeywordParser {
    pub fn new(category: CommandCategory) -> Self {
        Self {
            category,
            keywords: HashSet::new(),
            subcategories: Vec::new(),
            substitutions: Vec::new(),
            fallback: CommandSubcategory::Unidentified,
        }
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn subcategory(mut self, key: SubcategoryKey, subcategory: CommandSubcategory) -> Self {
        self.subcategories.push((key, subcategory));
        self
    }

    /// Map several plain words to the same subcategory.
    pub fn words<I, S>(mut self, words: I, subcategory: CommandSubcategory) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for word in words {
            self.subcategories
                .push((SubcategoryKey::plain(word), subcategory));
        }
        self
    }

    pub fn composite<I, S>(
        self,
        anchor: impl Into<String>,
        companions: I,
        subcategory: CommandSubcategory,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcategory(SubcategoryKey::composite(anchor, companions), subcategory)
    }

    /// Drop `ch` from every token before matching.
    pub fn ignore(self, ch: char) -> Self {
        self.substitute(ch, "")
    }

    /// Replace `ch` with `replacement` in every token before matching.
    pub fn substitute(mut self, ch: char, replacement: impl Into<String>) -> Self {
        self.substitutions.push((ch, replacement.into()));
        self
    }

    /// Subcategory returned when no table entry matches.
    pub fn fallback(mut self, subcategory: CommandSubcategory) -> Self {
        self.fallback = subcategory;
        self
    }

    pub fn keyword_set(&self) -> &HashSet<String> {
        &self.keywords
    }

    /// Apply the substitution table, then trim [`IGNORED_CHARS`].
    pub fn normalize(&self, token: &str) -> String {
        let mut word = token.to_string();
        for (ch, replacement) in &self.substitutions {
            if word.contains(*ch) {
                word = word.replace(*ch, replacement);
            }
        }
        word.trim_matches(|c: char| IGNORED_CHARS.contains(c)).to_string()
    }

    fn normalized(&self, message: &Message) -> Vec<String> {
        message.content.iter().map(|t| self.normalize(t)).collect()
    }
}

impl CommandParser for KeywordParser {
    fn category(&self) -> CommandCategory {
        self.category
    }

    fn recognizes(&self, message: &Message) -> bool {
        message
            .content
            .iter()
            .any(|token| self.keywords.contains(&self.normalize(token)))
    }

    fn resolve_subcategory(&self, message: &Message) -> CommandSubcategory {
        let tokens = self.normalized(message);

        let composites = self.subcategories.iter().filter(|(k, _)| k.is_composite());
        let plains = self.subcategories.iter().filter(|(k, _)| !k.is_composite());

        composites
            .chain(plains)
            .find(|(key, _)| key.matches(&tokens))
            .map(|(_, subcategory)| *subcategory)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corona_parser() -> KeywordParser {
        KeywordParser::new(CommandCategory::CoronaSpread)
            .keywords(["corona", "land"])
            .composite(
                "totalt",
                ["dött", "omkommit", "döda"],
                CommandSubcategory::CoronaSpreadTotalDeaths,
            )
            .composite(
                "flest",
                ["döda", "dödsfall", "omkommit", "omkomna", "dött"],
                CommandSubcategory::CoronaSpreadMostDeaths,
            )
            .words(["är"], CommandSubcategory::CoronaInfectionsByQuery)
    }

    #[test]
    fn ignored_punctuation_does_not_affect_recognition() {
        let parser = KeywordParser::new(CommandCategory::Schedule).keywords(["schema"]);
        assert_eq!(
            parser.recognizes(&Message::from_tokens(["schema?"])),
            parser.recognizes(&Message::from_tokens(["schema"]))
        );
        assert!(parser.recognizes(&Message::from_tokens(["\"schema!\""])));
        assert!(!parser.recognizes(&Message::from_tokens(["schemat"])));
    }

    #[test]
    fn composite_keys_depend_on_anchor() {
        let parser = corona_parser();
        let total = Message::from_tokens(["hur", "många", "har", "totalt", "dött?"]);
        let most = Message::from_tokens(["var", "har", "flest", "dött", "i", "corona"]);
        assert_eq!(
            parser.resolve_subcategory(&total),
            CommandSubcategory::CoronaSpreadTotalDeaths
        );
        assert_eq!(
            parser.resolve_subcategory(&most),
            CommandSubcategory::CoronaSpreadMostDeaths
        );
    }

    #[test]
    fn composite_keys_win_over_plain_keys() {
        let parser = corona_parser();
        let message = Message::from_tokens(["vad", "är", "totalt", "döda"]);
        assert_eq!(
            parser.resolve_subcategory(&message),
            CommandSubcategory::CoronaSpreadTotalDeaths
        );
    }

    #[test]
    fn anchor_without_companion_falls_through() {
        let parser = corona_parser();
        let message = Message::from_tokens(["totalt", "corona"]);
        assert_eq!(
            parser.resolve_subcategory(&message),
            CommandSubcategory::Unidentified
        );
    }

    #[test]
    fn fallback_replaces_unidentified() {
        let parser = KeywordParser::new(CommandCategory::LunchMenu)
            .keywords(["lunch"])
            .words(["imorgon"], CommandSubcategory::LunchTomorrow)
            .fallback(CommandSubcategory::LunchToday);
        assert_eq!(
            parser.resolve_subcategory(&Message::from_tokens(["vad", "är", "det", "för", "lunch"])),
            CommandSubcategory::LunchToday
        );
        assert_eq!(
            parser.resolve_subcategory(&Message::from_tokens(["lunch", "imorgon?"])),
            CommandSubcategory::LunchTomorrow
        );
    }

    #[test]
    fn substitutions_apply_inside_tokens() {
        let parser = KeywordParser::new(CommandCategory::Reminder)
            .keywords(["ihåg"])
            .ignore(';')
            .substitute('@', "")
            .words(["ihåg"], CommandSubcategory::ReminderRememberEvent);
        assert_eq!(parser.normalize("ih;åg"), "ihåg");
        assert!(parser.recognizes(&Message::from_tokens(["komma", "ihåg;"])));
        assert_eq!(
            parser.resolve_subcategory(&Message::from_tokens(["@ihåg"])),
            CommandSubcategory::ReminderRememberEvent
        );
    }

    #[test]
    fn plain_keys_follow_table_order() {
        let parser = KeywordParser::new(CommandCategory::LunchMenu)
            .keywords(["lunch"])
            .words(["idag"], CommandSubcategory::LunchToday)
            .words(["vecka"], CommandSubcategory::LunchForWeek);
        let message = Message::from_tokens(["lunch", "vecka", "idag"]);
        assert_eq!(
            parser.resolve_subcategory(&message),
            CommandSubcategory::LunchToday
        );
    }

    #[test]
    fn recognition_is_repeatable() {
        let parser = corona_parser();
        let message = Message::from_tokens(["corona?"]);
        assert_eq!(parser.recognizes(&message), parser.recognizes(&message));
        assert_eq!(message.content, vec!["corona?"]);
    }
}
