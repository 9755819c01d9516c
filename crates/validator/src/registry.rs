//! Validator registry
//!
//! Maps constraint names to [`Evaluator`]s. Names are matched ASCII
//! case-insensitively. The map is shared copy-on-write, so cloning a
//! registry is cheap and a derived registry never sees later mutation of its
//! origin (or the other way round).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::evaluators;
use crate::value::Value;
use crate::violation::Violation;

/// A single constraint check.
///
/// Receives the field value and the literal argument strings from the
/// annotation; argument parsing is the evaluator's business.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, value: &Value<'_>, args: &[String]) -> Result<(), Violation>;
}

impl<F> Evaluator for F
where
    F: Fn(&Value<'_>, &[String]) -> Result<(), Violation> + Send + Sync,
{
    fn evaluate(&self, value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
        self(value, args)
    }
}

/// Shared handle to an evaluator.
pub type SharedEvaluator = Arc<dyn Evaluator>;

/// Wraps a closure as a [`SharedEvaluator`].
///
/// # Examples
///
/// ```rust,ignore
/// use fieldguard::{evaluator, Value, Violation};
///
/// let even = evaluator(|value, _args| match value {
///     Value::Integer(n) if n % 2 != 0 => Err(Violation::custom("even", "odd number")),
///     _ => Ok(()),
/// });
/// ```
pub fn evaluator<F>(f: F) -> SharedEvaluator
where
    F: Fn(&Value<'_>, &[String]) -> Result<(), Violation> + Send + Sync + 'static,
{
    Arc::new(f)
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Constraint name to evaluator map.
#[derive(Clone)]
pub struct Registry {
    evaluators: Arc<HashMap<String, SharedEvaluator>>,
}

impl Registry {
    /// A registry with no evaluators.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            evaluators: Arc::new(HashMap::new()),
        }
    }

    /// A registry holding every built-in evaluator.
    #[must_use]
    pub fn builtin() -> Self {
        let mut evaluators = HashMap::new();
        evaluators::install(&mut evaluators);
        Self {
            evaluators: Arc::new(evaluators),
        }
    }

    /// Inserts or replaces `name`; `None` removes it.
    pub fn register(&mut self, name: &str, evaluator: Option<SharedEvaluator>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyValidatorName);
        }
        let name = name.to_ascii_lowercase();
        let evaluators = Arc::make_mut(&mut self.evaluators);
        match evaluator {
            Some(evaluator) => {
                evaluators.insert(name, evaluator);
            }
            None => {
                evaluators.remove(&name);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<SharedEvaluator> {
        self.evaluators.get(&name.to_ascii_lowercase()).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// A copy of this registry with `overrides` applied.
    pub fn derive_with<N, I>(&self, overrides: I) -> Result<Self>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, Option<SharedEvaluator>)>,
    {
        let mut derived = self.clone();
        for (name, evaluator) in overrides {
            derived.register(name.as_ref(), evaluator)?;
        }
        Ok(derived)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}
