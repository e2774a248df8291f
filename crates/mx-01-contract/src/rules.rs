//! Contract rules: structural verifier followed by registered predicates

use crate::error::{ContractError, ContractResult};
use crate::predicate::{PredicateFn, TransitionPredicate};
use crate::verifier::ContractVerifier;
use shared_types::Transition;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The full rule set one side of an exchange applies before signing.
///
/// Cloning is cheap; predicates are shared.
#[derive(Clone, Default)]
pub struct ContractRules {
    predicates: Vec<Arc<dyn TransitionPredicate>>,
}

impl ContractRules {
    /// Structural rules only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate. Predicates run in registration order.
    #[must_use]
    pub fn with_predicate(mut self, predicate: Arc<dyn TransitionPredicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append a closure predicate.
    #[must_use]
    pub fn with_check<F>(self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Transition) -> Result<(), String> + Send + Sync + 'static,
    {
        self.with_predicate(Arc::new(PredicateFn::new(name, check)))
    }

    pub fn predicate_names(&self) -> Vec<&str> {
        self.predicates.iter().map(|p| p.name()).collect()
    }

    pub fn has_predicates(&self) -> bool {
        !self.predicates.is_empty()
    }

    /// Run the structural contract, then each predicate once.
    ///
    /// The first failing predicate's reason is reported.
    pub fn verify(&self, transition: &Transition) -> ContractResult<()> {
        ContractVerifier::verify(transition)?;

        for predicate in &self.predicates {
            if let Err(reason) = predicate.check(transition) {
                debug!(predicate = predicate.name(), %reason, "Predicate rejected transition");
                return Err(ContractError::ExtraValidationRejected { reason });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ContractRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractRules")
            .field("predicates", &self.predicate_names())
            .finish()
    }
}
