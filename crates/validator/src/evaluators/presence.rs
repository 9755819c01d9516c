//! Presence evaluator

use crate::value::Value;
use crate::violation::Violation;

/// Fails when the value is its kind's zero value.
///
/// Zero means: empty string, absent optional, empty sequence or map, numeric
/// zero, `false`. Records and present optionals (even `Some(0)`) are always
/// present. Arguments are ignored.
pub fn required(value: &Value<'_>, _args: &[String]) -> Result<(), Violation> {
    let present = match value {
        Value::Nil => false,
        Value::Present(_) => true,
        Value::Bool(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Unsigned(n) => *n != 0,
        Value::Float(x) => *x != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Map { len } => *len != 0,
        Value::Record(_) => true,
        Value::Unsupported(name) => return Err(Violation::unsupported(name)),
    };

    if present {
        Ok(())
    } else {
        Err(Violation::required())
    }
}
