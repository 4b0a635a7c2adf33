//! Grammatical pronoun classification

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Pronoun classes a message can contain.
///
/// The derived `Ord` follows declaration order, which is what makes
/// [`PronounLookupTable::lookup`] results comparable across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pronoun {
    Interrogative,
    Personal,
    Possessive,
    Unidentified,
}

/// Maps each pronoun class to the words that signal it.
#[derive(Debug, Clone)]
pub struct PronounLookupTable {
    table: HashMap<Pronoun, HashSet<&'static str>>,
}

impl PronounLookupTable {
    /// The Swedish table the bot ships with.
    pub fn swedish() -> Self {
        let mut table = HashMap::new();
        table.insert(
            Pronoun::Interrogative,
            HashSet::from([
                "vad", "vem", "hur", "varför", "vilken", "vilket", "hurdan", "hurudan", "undrar",
                "när",
            ]),
        );
        table.insert(
            Pronoun::Personal,
            HashSet::from(["jag", "vi", "du", "ni", "han", "hon", "den", "de", "dem"]),
        );
        table.insert(
            Pronoun::Possessive,
            HashSet::from([
                "mitt", "mina", "min", "vårt", "vår", "våra", "din", "ditt", "dina", "ert", "er",
                "era", "sin", "sitt", "sina",
            ]),
        );
        Self { table }
    }

    /// Classify the tokens of a message.
    ///
    /// Returns the matched classes sorted and without duplicates, or
    /// `[Pronoun::Unidentified]` if nothing matched. A token containing a
    /// question mark anywhere counts as interrogative.
    pub fn lookup(&self, tokens: &[String]) -> Vec<Pronoun> {
        let mut found = BTreeSet::new();

        for token in tokens {
            for (pronoun, words) in &self.table {
                if words.contains(token.as_str()) {
                    found.insert(*pronoun);
                }
            }
            if token.contains('?') {
                found.insert(Pronoun::Interrogative);
            }
        }

        if found.is_empty() {
            return vec![Pronoun::Unidentified];
        }
        found.into_iter().collect()
    }
}

impl Default for PronounLookupTable {
    fn default() -> Self {
        Self::swedish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn empty_message_is_unidentified() {
        let table = PronounLookupTable::swedish();
        assert_eq!(table.lookup(&[]), vec![Pronoun::Unidentified]);
    }

    #[test]
    fn glued_question_mark_is_interrogative() {
        let table = PronounLookupTable::swedish();
        assert_eq!(
            table.lookup(&tokens(&["lunch", "imorgon?"])),
            vec![Pronoun::Interrogative]
        );
        assert_eq!(
            table.lookup(&tokens(&["detta?är", "bra"])),
            vec![Pronoun::Interrogative]
        );
    }

    #[test]
    fn results_are_sorted_and_deduplicated() {
        let table = PronounLookupTable::swedish();
        let found = table.lookup(&tokens(&["min", "du", "vad", "är", "vad?", "jag"]));
        assert_eq!(
            found,
            vec![Pronoun::Interrogative, Pronoun::Personal, Pronoun::Possessive]
        );
    }

    #[test]
    fn punctuation_does_not_hide_question_mark_but_blocks_membership() {
        let table = PronounLookupTable::swedish();
        // "du," is not in the table verbatim
        assert_eq!(table.lookup(&tokens(&["du,"])), vec![Pronoun::Unidentified]);
    }

    #[test]
    fn lookup_is_repeatable() {
        let table = PronounLookupTable::swedish();
        let message = tokens(&["vad", "är", "klockan"]);
        assert_eq!(table.lookup(&message), table.lookup(&message));
    }
}
