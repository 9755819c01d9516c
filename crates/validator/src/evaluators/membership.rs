//! Set membership evaluators
//!
//! Scalars are compared by their textual form against the literal
//! arguments, so `include(1, 2)` matches the integer `1` as well as the
//! string `"1"`. An absent optional never matches anything.

use std::borrow::Cow;

use crate::value::Value;
use crate::violation::{Violation, ViolationKind};

/// Textual form of a scalar, `None` for an absent optional.
fn render<'a>(value: &Value<'a>) -> Result<Option<Cow<'a, str>>, Violation> {
    let text = match value.resolve() {
        Value::Nil => return Ok(None),
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Integer(n) => Cow::Owned(n.to_string()),
        Value::Unsigned(n) => Cow::Owned(n.to_string()),
        Value::Float(x) => Cow::Owned(x.to_string()),
        other => return Err(Violation::unsupported(other.kind_name())),
    };
    Ok(Some(text))
}

fn matches_any(value: &Value<'_>, args: &[String]) -> Result<bool, Violation> {
    if args.is_empty() {
        return Err(Violation::invalid_parameter_count(1, 0));
    }
    Ok(render(value)?.is_some_and(|text| args.iter().any(|arg| *arg == text)))
}

/// `include(a, b, ...)`: the value must equal one of the arguments.
pub fn include(value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
    if matches_any(value, args)? {
        Ok(())
    } else {
        Err(Violation::of(ViolationKind::Include))
    }
}

/// `exclude(a, b, ...)`: the value must equal none of the arguments.
pub fn exclude(value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
    if matches_any(value, args)? {
        Err(Violation::of(ViolationKind::Exclude))
    } else {
        Ok(())
    }
}
