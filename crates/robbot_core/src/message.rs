use serde::{Deserialize, Serialize};

/// Where a message came from.
///
/// The core never inspects this; it exists for interactive callbacks that
/// need to know who spoke or who was mentioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
}

impl MessageContext {
    pub fn from_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..Default::default()
        }
    }

    pub fn with_mentions<I, S>(mut self, mentions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions = mentions.into_iter().map(Into::into).collect();
        self
    }
}

/// A chat message as an ordered sequence of lowercase tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: Vec<String>,
    #[serde(default)]
    pub context: MessageContext,
}

impl Message {
    /// Lowercase `text` and split it on whitespace.
    pub fn parse(text: &str, context: MessageContext) -> Self {
        let content = text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self { content, context }
    }

    /// Build a message from already tokenized words, lowercasing them.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: tokens
                .into_iter()
                .map(|token| token.into().to_lowercase())
                .collect(),
            context: MessageContext::default(),
        }
    }

    /// The tokens joined back with single spaces.
    pub fn text(&self) -> String {
        self.content.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
