//! Pluggable business predicates

use shared_types::Transition;
use std::fmt;

/// An extra business rule run after the structural contract.
///
/// A predicate returns `Err(reason)` to reject; the reason travels verbatim
/// to whoever observes the rejection.
pub trait TransitionPredicate: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn check(&self, transition: &Transition) -> Result<(), String>;
}

/// `Ok(())` when `condition` holds, otherwise `Err(reason)`.
pub fn require(condition: bool, reason: &str) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(reason.to_string())
    }
}

/// Adapts a closure into a [`TransitionPredicate`].
pub struct PredicateFn<F> {
    name: String,
    check: F,
}

impl<F> PredicateFn<F>
where
    F: Fn(&Transition) -> Result<(), String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> TransitionPredicate for PredicateFn<F>
where
    F: Fn(&Transition) -> Result<(), String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, transition: &Transition) -> Result<(), String> {
        (self.check)(transition)
    }
}

impl<F> fmt::Debug for PredicateFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFn").field("name", &self.name).finish()
    }
}
