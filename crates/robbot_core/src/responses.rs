//! Canned phrases the processor falls back to

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::{CommandError, Result};

/// Which pool to draw a phrase from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePool {
    /// No feature recognized the message.
    NoResponse,
    /// A feature recognized it but no subcategory matched.
    NoSubcategory,
    /// A subcategory matched but its handler is missing or failed.
    NoImplementation,
    /// Something went wrong inside the processor itself.
    InternalError,
}

impl ResponsePool {
    pub fn name(self) -> &'static str {
        match self {
            Self::NoResponse => "no_response",
            Self::NoSubcategory => "no_subcategory",
            Self::NoImplementation => "no_implementation",
            Self::InternalError => "internal_error",
        }
    }
}

/// Phrase pools, usually loaded from the `[responses]` table of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultResponses {
    pub no_response: Vec<String>,
    pub no_subcategory: Vec<String>,
    pub no_implementation: Vec<String>,
    pub internal_error: String,
}

impl Default for DefaultResponses {
    fn default() -> Self {
        let strings =
            |phrases: &[&str]| -> Vec<String> { phrases.iter().map(|p| p.to_string()).collect() };
        Self {
            no_response: strings(&[
                "Haha!",
                "Mjaa det låter bra!",
                "Ja visst!",
                "Jag håller med.",
                "Säger du det?",
                "Menar du det?",
            ]),
            no_subcategory: strings(&[
                "Jag förstår nästan vad du menar, kan du formulera om dig?",
                "Hmm, vad menar du mer exakt?",
                "Det där vet jag något om, men vad vill du veta?",
            ]),
            no_implementation: strings(&[
                "Det där kan jag inte svara på än.",
                "Oj, det har ingen lärt mig än :cry:",
            ]),
            internal_error: "CommandProcessor: Internal error".to_string(),
        }
    }
}

impl DefaultResponses {
    /// Reject configurations with an empty pool.
    pub fn validate(&self) -> Result<()> {
        for pool in [
            ResponsePool::NoResponse,
            ResponsePool::NoSubcategory,
            ResponsePool::NoImplementation,
        ] {
            if self.pool(pool).is_empty() {
                return Err(CommandError::EmptyPhrasePool { pool: pool.name() });
            }
        }
        Ok(())
    }

    pub fn pool(&self, pool: ResponsePool) -> &[String] {
        match pool {
            ResponsePool::NoResponse => &self.no_response,
            ResponsePool::NoSubcategory => &self.no_subcategory,
            ResponsePool::NoImplementation => &self.no_implementation,
            ResponsePool::InternalError => std::slice::from_ref(&self.internal_error),
        }
    }

    /// A uniformly random phrase from `pool`.
    pub fn pick(&self, pool: ResponsePool) -> Result<String> {
        self.pool(pool)
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(CommandError::EmptyPhrasePool { pool: pool.name() })
    }
}
