//! # Validation Variant
//!
//! A contract predicate requiring a passphrase in the message. Register it
//! with `ContractRules::with_predicate` on either or both sides.

use mx_01_contract::{require, TransitionPredicate};
use shared_types::Transition;

pub const DEFAULT_PASSPHRASE: &str = "I love Corda";
pub const ONE_OUTPUT: &str = "There must be only one output message";
pub const MISSING_PASSPHRASE: &str = "Message must contain the secret passphrase";

/// Produced message must contain `phrase`.
#[derive(Debug, Clone)]
pub struct RequiredPhrase {
    phrase: String,
}

impl RequiredPhrase {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }
}

impl Default for RequiredPhrase {
    fn default() -> Self {
        Self::new(DEFAULT_PASSPHRASE)
    }
}

impl TransitionPredicate for RequiredPhrase {
    fn name(&self) -> &str {
        "required-phrase"
    }

    fn check(&self, transition: &Transition) -> Result<(), String> {
        let record = transition
            .single_output()
            .ok_or_else(|| ONE_OUTPUT.to_string())?;
        require(record.contents().contains(&self.phrase), MISSING_PASSPHRASE)
    }
}
