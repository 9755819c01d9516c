//! Built-in constraint evaluators
//!
//! Every evaluator shares the [`Evaluator`](crate::Evaluator) contract: it
//! receives the field [`Value`](crate::Value) and the literal argument strings
//! from the annotation, and reports at most one [`Violation`](crate::Violation).
//!
//! # Categories
//!
//! - **Presence**: `required`
//! - **Quantity**: `len` / `length`, `min`, `max`, `between`, `around`
//! - **Membership**: `include`, `exclude`
//! - **Pattern**: `regexp`, `alpha`, `alphanumeric`, `alphadash`,
//!   `alphadashdot`, `email`, `url`, `numeric`, `number`, `uuid`, `uuid3`,
//!   `uuid4`, `uuid5`, `base64`
//!
//! Quantity evaluators measure strings by character count, sequences and maps
//! by element count, and numbers by value. Argument parsing follows the
//! measured kind: signed for integers and lengths, unsigned for unsigned
//! integers, floating point for floats.

use std::collections::HashMap;
use std::sync::Arc;

use crate::registry::SharedEvaluator;

pub mod membership;
pub mod pattern;
pub mod presence;
pub mod quantity;

pub use membership::{exclude, include};
pub use pattern::{Pattern, RegexpEvaluator};
pub use presence::required;
pub use quantity::{around, between, length, max, min};

/// Registers every built-in evaluator into `map`.
pub(crate) fn install(map: &mut HashMap<String, SharedEvaluator>) {
    let mut put = |name: &str, evaluator: SharedEvaluator| {
        map.insert(name.to_owned(), evaluator);
    };

    put("required", Arc::new(required));
    put("len", Arc::new(length));
    put("length", Arc::new(length));
    put("min", Arc::new(min));
    put("max", Arc::new(max));
    put("between", Arc::new(between));
    put("around", Arc::new(around));
    put("include", Arc::new(include));
    put("exclude", Arc::new(exclude));
    put("regexp", Arc::new(RegexpEvaluator::new()));

    for pattern in Pattern::ALL {
        put(pattern.name(), Arc::new(pattern));
    }
}
