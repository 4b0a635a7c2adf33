//! Random jokes

use std::path::Path;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use robbot_core::{CallbackFeature, CommandCategory, CommandSubcategory, KeywordParser, Pronoun};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{SourceError, schedule::MESSAGE_LIMIT, snapshot};

const ATTEMPTS: usize = 10;
const NOTHING_FUNNY: &str = "Jag kommer inte på något... :cry:";

pub trait JokeSource: Send + Sync {
    /// One joke, ready to post.
    fn random_joke(&self) -> Result<String, SourceError>;
}

/// A text joke with a spoiler-tagged punchline, or a link to an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punchline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Joke {
    pub fn render(&self) -> String {
        match (&self.punchline, &self.url) {
            (Some(punchline), _) => format!("{}\n||{}||", self.title, punchline),
            (None, Some(url)) => format!("{}\n{}", self.title, url),
            (None, None) => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeList {
    #[serde(default)]
    pub jokes: Vec<Joke>,
}

impl JokeList {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        snapshot::load_toml(path)
    }
}

impl JokeSource for JokeList {
    fn random_joke(&self) -> Result<String, SourceError> {
        self.jokes
            .choose(&mut rand::rng())
            .map(Joke::render)
            .ok_or(SourceError::Empty {
                source_name: "joke",
            })
    }
}

pub struct Jokes {
    source: Arc<dyn JokeSource>,
}

impl Jokes {
    pub fn new(source: Arc<dyn JokeSource>) -> Self {
        Self { source }
    }

    /// A joke short enough to post, or a shrug after ten tries.
    pub fn tell(&self) -> Result<String, SourceError> {
        for _ in 0..ATTEMPTS {
            let joke = self.source.random_joke()?;
            if joke.chars().count() < MESSAGE_LIMIT {
                return Ok(joke);
            }
        }
        warn!("No joke under {} characters in {} attempts", MESSAGE_LIMIT, ATTEMPTS);
        Ok(NOTHING_FUNNY.to_string())
    }

    pub fn feature(self: Arc<Self>) -> CallbackFeature {
        let words = [
            "skämt", "meme", "skoja", "skoj", "humor", "roligt", "skämta",
        ];
        let parser = KeywordParser::new(CommandCategory::TellJoke)
            .keywords(words)
            .words(words, CommandSubcategory::TellJoke);

        CallbackFeature::builder("joke", parser)
            .pronouns([Pronoun::Interrogative])
            .on(CommandSubcategory::TellJoke, move || Ok(self.tell()?))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    struct Scripted(Mutex<Vec<String>>);

    impl JokeSource for Scripted {
        fn random_joke(&self) -> Result<String, SourceError> {
            self.0.lock().pop().ok_or(SourceError::Empty {
                source_name: "scripted",
            })
        }
    }

    #[test]
    fn overlong_jokes_are_skipped() {
        let source = Scripted(Mutex::new(vec!["kort".into(), "x".repeat(2500)]));
        let jokes = Jokes::new(Arc::new(source));
        assert_eq!(jokes.tell().unwrap(), "kort");
    }

    #[test]
    fn gives_up_after_ten_attempts() {
        let source = Scripted(Mutex::new(vec!["x".repeat(2000); 12]));
        let jokes = Jokes::new(Arc::new(source));
        assert_eq!(jokes.tell().unwrap(), NOTHING_FUNNY);
    }

    #[test]
    fn empty_list_is_an_error() {
        let jokes = Jokes::new(Arc::new(JokeList::default()));
        assert!(matches!(jokes.tell(), Err(SourceError::Empty { .. })));
    }

    #[test]
    fn rendering_hides_the_punchline() {
        let list: JokeList = toml::from_str(
            r#"
            [[jokes]]
            title = "Varför korsade kycklingen vägen?"
            punchline = "För att komma till andra sidan."
            "#,
        )
        .unwrap();
        assert_eq!(
            list.random_joke().unwrap(),
            "Varför korsade kycklingen vägen?\n||För att komma till andra sidan.||"
        );
    }
}
