//! Interactive test mode: typed lines go through the processor as if they
//! were chat messages

use std::time::{Duration, Instant};

use miette::{IntoDiagnostic, Result};
use robbot_core::{CommandProcessor, Interpretation, MessageContext};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

use crate::output::Output;

const CONSOLE_AUTHOR: &str = "@konsol";
const CONSOLE_CHANNEL: &str = "console";

/// One answered line.
pub struct Reply {
    pub text: String,
    pub interpretation: Interpretation,
    pub elapsed: Duration,
}

pub struct Console {
    processor: CommandProcessor,
    prefix: String,
    prefix_required: bool,
}

impl Console {
    pub fn new(processor: CommandProcessor, prefix: impl Into<String>, prefix_required: bool) -> Self {
        Self {
            processor,
            prefix: prefix.into().to_lowercase(),
            prefix_required,
        }
    }

    /// The text addressed to the bot, without the prefix. `None` when the
    /// prefix is required and missing.
    pub fn addressed<'a>(&self, line: &'a str) -> Option<&'a str> {
        let line = line.trim();
        let (first, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let first = first.trim_end_matches([',', ':', '!']);
        if first.to_lowercase() == self.prefix {
            Some(rest.trim_start())
        } else if self.prefix_required {
            None
        } else {
            Some(line)
        }
    }

    /// Answer one line, or `None` if it was not for the bot.
    pub fn handle_line(&self, line: &str) -> Option<Reply> {
        let text = self.addressed(line)?;
        if text.is_empty() {
            return None;
        }

        let context = MessageContext {
            channel: Some(CONSOLE_CHANNEL.to_string()),
            ..MessageContext::from_author(CONSOLE_AUTHOR)
        }
        .with_mentions(mentions(text));

        let started = Instant::now();
        let (text, interpretation) = self.processor.answer(text, context);
        let elapsed = started.elapsed();

        if let Some(err) = &interpretation.error {
            error!(
                error = %err,
                message = %interpretation.original_message.text(),
                "Answer fell back to a default phrase"
            );
        }
        debug!(?interpretation, ?elapsed, "answered");

        Some(Reply {
            text,
            interpretation,
            elapsed,
        })
    }

    /// Read lines from stdin until EOF or `exit`.
    pub async fn run(&self, output: Output) -> Result<()> {
        output.section("RobBot testläge");
        output.status(&format!(
            "Skriv ett meddelande{}. Avsluta med 'exit'.",
            if self.prefix_required {
                format!(" som börjar med '{}'", self.prefix)
            } else {
                String::new()
            }
        ));

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            output.prompt();
            let Some(line) = lines.next_line().await.into_diagnostic()? else {
                break;
            };
            if matches!(line.trim(), "exit" | "quit") {
                break;
            }
            match self.handle_line(&line) {
                Some(reply) => {
                    output.bot_message("RobBot", &reply.text);
                    output.info(
                        "Tolkning:",
                        &format!(
                            "{} / {} ({:?})",
                            reply.interpretation.category,
                            reply
                                .interpretation
                                .subcategory
                                .map(|s| s.to_string())
                                .unwrap_or_else(|| "-".to_string()),
                            reply.interpretation.pronouns
                        ),
                    );
                    output.status(&format!("Svarstid: {:?}", reply.elapsed));
                    if reply.interpretation.error.is_some() {
                        output.warning("Svaret byggde på ett fel, se loggen");
                    }
                }
                None => output.status("(inte till mig)"),
            }
        }
        output.status("Hej då!");
        Ok(())
    }
}

/// `@name` tokens in `text`, without trailing punctuation.
fn mentions(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| token.starts_with('@'))
        .map(|token| token.trim_end_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.len() > 1)
        .map(str::to_lowercase)
        .collect()
}
