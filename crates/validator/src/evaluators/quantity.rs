//! Length and numeric bound evaluators

use std::cmp::Ordering;

use crate::value::Value;
use crate::violation::{Violation, ViolationKind};

// ============================================================================
// QUANTITY
// ============================================================================

/// What a bound is compared against.
///
/// Bounds are always parsed into the same variant as the measured value, so
/// the derived ordering only ever compares like with like.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Quantity {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl Quantity {
    fn measure(value: &Value<'_>) -> Result<Self, Violation> {
        let quantity = match value.resolve() {
            Value::String(s) => Self::Signed(count(s.chars().count())),
            Value::Sequence(items) => Self::Signed(count(items.len())),
            Value::Map { len } => Self::Signed(count(len)),
            Value::Integer(n) => Self::Signed(n),
            Value::Unsigned(n) => Self::Unsigned(n),
            Value::Float(x) => Self::Float(x),
            other => return Err(Violation::unsupported(other.kind_name())),
        };
        Ok(quantity)
    }

    fn parse_bound(self, param: &str) -> Result<Self, Violation> {
        let bound = match self {
            Self::Signed(_) => parse_int(param).map(Self::Signed),
            Self::Unsigned(_) => parse_uint(param).map(Self::Unsigned),
            Self::Float(_) => parse_float(param).map(Self::Float),
        };
        bound.ok_or_else(|| Violation::bad_parameter(param))
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Measures `value` and parses exactly `N` bounds for it.
fn measure_with<const N: usize>(
    value: &Value<'_>,
    args: &[String],
) -> Result<(Quantity, [Quantity; N]), Violation> {
    let params: &[String; N] = args
        .try_into()
        .map_err(|_| Violation::invalid_parameter_count(N, args.len()))?;
    let quantity = Quantity::measure(value)?;

    let mut bounds = [quantity; N];
    for (bound, param) in bounds.iter_mut().zip(params) {
        *bound = quantity.parse_bound(param)?;
    }
    Ok((quantity, bounds))
}

fn ordered(a: Quantity, b: Quantity) -> (Quantity, Quantity) {
    if a > b { (b, a) } else { (a, b) }
}

fn fail(kind: ViolationKind, args: &[String]) -> Violation {
    args.iter()
        .fold(Violation::of(kind), |violation, arg| violation.with_arg(arg))
}

// ============================================================================
// EVALUATORS
// ============================================================================

/// `len(n)` / `length(n)`: exact length or exact numeric value.
pub fn length(value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
    let (quantity, [expected]) = measure_with::<1>(value, args)?;
    if quantity == expected {
        Ok(())
    } else {
        Err(fail(ViolationKind::Length, args))
    }
}

/// `min(n)`: fails when the quantity is below `n`.
pub fn min(value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
    let (quantity, [bound]) = measure_with::<1>(value, args)?;
    if quantity.partial_cmp(&bound) == Some(Ordering::Less) {
        Err(fail(ViolationKind::Min, args))
    } else {
        Ok(())
    }
}

/// `max(n)`: fails when the quantity is above `n`.
pub fn max(value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
    let (quantity, [bound]) = measure_with::<1>(value, args)?;
    if quantity.partial_cmp(&bound) == Some(Ordering::Greater) {
        Err(fail(ViolationKind::Max, args))
    } else {
        Ok(())
    }
}

/// `between(a, b)`: fails outside the inclusive span, in either bound order.
pub fn between(value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
    let (quantity, [a, b]) = measure_with::<2>(value, args)?;
    let (low, high) = ordered(a, b);
    if quantity < low || quantity > high {
        Err(fail(ViolationKind::Between, args))
    } else {
        Ok(())
    }
}

/// `around(a, b)`: fails strictly inside the span, in either bound order.
pub fn around(value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
    let (quantity, [a, b]) = measure_with::<2>(value, args)?;
    let (low, high) = ordered(a, b);
    if quantity > low && quantity < high {
        Err(fail(ViolationKind::Around, args))
    } else {
        Ok(())
    }
}

// ============================================================================
// PARAMETER PARSING
// ============================================================================

/// Splits an optional `0x` / `0o` / `0b` prefix off `digits`.
fn radix(digits: &str) -> (u32, &str) {
    let lower = digits.get(..2).map(str::to_ascii_lowercase);
    match lower.as_deref() {
        Some("0x") => (16, &digits[2..]),
        Some("0o") => (8, &digits[2..]),
        Some("0b") => (2, &digits[2..]),
        _ => (10, digits),
    }
}

fn parse_magnitude(digits: &str) -> Option<u64> {
    let (radix, digits) = radix(digits);
    let digits = digits.replace('_', "");
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(&digits, radix).ok()
}

/// Signed integer with optional sign, base prefix and `_` separators.
/// A leading `0` is decimal, not octal: `010` is ten.
pub(crate) fn parse_int(param: &str) -> Option<i64> {
    let param = param.trim();
    let (negative, digits) = match param.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, param.strip_prefix('+').unwrap_or(param)),
    };
    let magnitude = i128::from(parse_magnitude(digits)?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Unsigned integer with optional base prefix and `_` separators; no sign.
pub(crate) fn parse_uint(param: &str) -> Option<u64> {
    parse_magnitude(param.trim())
}

pub(crate) fn parse_float(param: &str) -> Option<f64> {
    param.trim().replace('_', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Inspect;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_owned()).collect()
    }

    fn kind(
        evaluator: fn(&Value<'_>, &[String]) -> Result<(), Violation>,
        value: &dyn Inspect,
        raw: &[&str],
    ) -> Option<ViolationKind> {
        evaluator(&value.inspect(), &args(raw))
            .err()
            .map(|violation| violation.kind().clone())
    }

    #[rstest]
    #[case("42", Some(42))]
    #[case("-7", Some(-7))]
    #[case("+7", Some(7))]
    #[case("0x1F", Some(31))]
    #[case("0o17", Some(15))]
    #[case("0b101", Some(5))]
    #[case("010", Some(10))]
    #[case("-007", Some(-7))]
    #[case("1_000", Some(1000))]
    #[case("-9223372036854775808", Some(i64::MIN))]
    #[case("9223372036854775808", None)]
    #[case("--1", None)]
    #[case("abc", None)]
    #[case("", None)]
    #[case("1.5", None)]
    fn int_parameters(#[case] raw: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_int(raw), expected);
    }

    #[rstest]
    #[case("10", Some(10))]
    #[case("0xff", Some(255))]
    #[case("-1", None)]
    #[case("+1", None)]
    fn uint_parameters(#[case] raw: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_uint(raw), expected);
    }

    #[test]
    fn string_length_counts_characters() {
        assert_eq!(kind(min, &"héllo", &["5"]), None);
        assert_eq!(kind(max, &"héllo", &["5"]), None);
        assert_eq!(kind(length, &"héllo", &["5"]), None);
        assert_eq!(kind(min, &"abc", &["4"]), Some(ViolationKind::Min));
        assert_eq!(kind(max, &"abcdef", &["5"]), Some(ViolationKind::Max));
    }

    #[rstest]
    #[case::below(&1_i32, Some(ViolationKind::Min))]
    #[case::equal(&2_i32, None)]
    #[case::unsigned(&1_u32, Some(ViolationKind::Min))]
    #[case::float(&1.5_f64, Some(ViolationKind::Min))]
    #[case::sequence(&vec![1, 2, 3], None)]
    #[case::present_optional(&Some(1_i64), Some(ViolationKind::Min))]
    fn min_bounds(#[case] value: &dyn Inspect, #[case] expected: Option<ViolationKind>) {
        assert_eq!(kind(min, value, &["2"]), expected);
    }

    #[rstest]
    #[case(&["1", "5"])]
    #[case(&["5", "1"])]
    fn between_is_order_insensitive(#[case] bounds: &[&str]) {
        assert_eq!(kind(between, &0_i32, bounds), Some(ViolationKind::Between));
        assert_eq!(kind(between, &1_i32, bounds), None);
        assert_eq!(kind(between, &3_i32, bounds), None);
        assert_eq!(kind(between, &5_i32, bounds), None);
        assert_eq!(kind(between, &6_i32, bounds), Some(ViolationKind::Between));
    }

    #[rstest]
    #[case(&["1", "5"])]
    #[case(&["5", "1"])]
    fn around_flags_values_strictly_inside(#[case] bounds: &[&str]) {
        assert_eq!(kind(around, &3_i32, bounds), Some(ViolationKind::Around));
        assert_eq!(kind(around, &0_i32, bounds), None);
        assert_eq!(kind(around, &1_i32, bounds), None);
        assert_eq!(kind(around, &5_i32, bounds), None);
        assert_eq!(kind(around, &6_i32, bounds), None);
    }

    #[test]
    fn length_is_exact() {
        assert_eq!(kind(length, &vec![1, 2], &["2"]), None);
        assert_eq!(kind(length, &vec![1, 2], &["3"]), Some(ViolationKind::Length));
        assert_eq!(kind(length, &7_u8, &["7"]), None);
        assert_eq!(kind(length, &2.5_f64, &["2.5"]), None);
    }

    #[rstest]
    #[case::missing(&[], ViolationKind::InvalidParameterCount)]
    #[case::extra(&["1", "2"], ViolationKind::InvalidParameterCount)]
    #[case::not_a_number(&["x"], ViolationKind::BadParameter)]
    fn min_parameter_errors(#[case] raw: &[&str], #[case] expected: ViolationKind) {
        assert_eq!(kind(min, &3_i32, raw), Some(expected));
    }

    #[test]
    fn negative_bound_for_unsigned_is_bad_parameter() {
        assert_eq!(kind(min, &3_u32, &["-1"]), Some(ViolationKind::BadParameter));
    }

    #[test]
    fn parameter_count_is_checked_before_kind() {
        assert_eq!(kind(min, &true, &[]), Some(ViolationKind::InvalidParameterCount));
        assert_eq!(kind(min, &true, &["1"]), Some(ViolationKind::Unsupported));
        assert_eq!(kind(min, &None::<i32>, &["1"]), Some(ViolationKind::Unsupported));
    }

    #[test]
    fn violations_carry_their_bounds() {
        let violation = between(&Value::Integer(9), &args(&["1", "5"])).unwrap_err();
        assert_eq!(violation.args(), ["1", "5"]);
        assert_eq!(violation.to_string(), "not between");
    }
}
