//! Regular-expression evaluators
//!
//! [`Pattern`] covers the fixed-pattern family; [`RegexpEvaluator`] checks
//! caller-supplied expressions and keeps compiled ones in a bounded cache.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::registry::Evaluator;
use crate::value::Value;
use crate::violation::{Violation, ViolationKind};

static ALPHA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

// Forbidden-character classes: a match is the failure.
static ALPHADASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_\-]").unwrap());

static ALPHADASHDOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_\-.]").unwrap());

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9A-Za-z_!#$%&'*+/=?^`{|}~-]+(?:\.[0-9A-Za-z_!#$%&'*+/=?^`{|}~-]+)*@(?:[0-9A-Za-z_](?:[0-9A-Za-z_-]*[0-9A-Za-z_])?\.)+[a-zA-Z0-9](?:[0-9A-Za-z_-]*[0-9A-Za-z_])?$",
    )
    .unwrap()
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:http|https)://[0-9A-Za-z_-]+(?:\.[0-9A-Za-z_-]+)+(?:[0-9A-Za-z_.,@?^=%&:/~+#-]*[0-9A-Za-z_@?^=%&/~+#-])?$",
    )
    .unwrap()
});

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static UUID3: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-3[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static UUID4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap()
});

static UUID5: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-5[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap()
});

static BASE64: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{4})$",
    )
    .unwrap()
});

/// String value of `value`, or an `unsupported` violation.
fn string<'a>(value: &Value<'a>) -> Result<&'a str, Violation> {
    match value.resolve() {
        Value::String(s) => Ok(s),
        other => Err(Violation::unsupported(other.kind_name())),
    }
}

// ============================================================================
// FIXED PATTERNS
// ============================================================================

/// Built-in validators defined by a single fixed expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Alpha,
    AlphaNumeric,
    AlphaDash,
    AlphaDashDot,
    Email,
    Url,
    Numeric,
    Number,
    Uuid,
    Uuid3,
    Uuid4,
    Uuid5,
    Base64,
}

impl Pattern {
    pub const ALL: [Self; 13] = [
        Self::Alpha,
        Self::AlphaNumeric,
        Self::AlphaDash,
        Self::AlphaDashDot,
        Self::Email,
        Self::Url,
        Self::Numeric,
        Self::Number,
        Self::Uuid,
        Self::Uuid3,
        Self::Uuid4,
        Self::Uuid5,
        Self::Base64,
    ];

    /// Registry name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::AlphaNumeric => "alphanumeric",
            Self::AlphaDash => "alphadash",
            Self::AlphaDashDot => "alphadashdot",
            Self::Email => "email",
            Self::Url => "url",
            Self::Numeric => "numeric",
            Self::Number => "number",
            Self::Uuid => "uuid",
            Self::Uuid3 => "uuid3",
            Self::Uuid4 => "uuid4",
            Self::Uuid5 => "uuid5",
            Self::Base64 => "base64",
        }
    }

    #[must_use]
    pub const fn kind(self) -> ViolationKind {
        match self {
            Self::Alpha => ViolationKind::Alpha,
            Self::AlphaNumeric => ViolationKind::AlphaNumeric,
            Self::AlphaDash => ViolationKind::AlphaDash,
            Self::AlphaDashDot => ViolationKind::AlphaDashDot,
            Self::Email => ViolationKind::Email,
            Self::Url => ViolationKind::Url,
            Self::Numeric => ViolationKind::Numeric,
            Self::Number => ViolationKind::Number,
            Self::Uuid => ViolationKind::Uuid,
            Self::Uuid3 => ViolationKind::Uuid3,
            Self::Uuid4 => ViolationKind::Uuid4,
            Self::Uuid5 => ViolationKind::Uuid5,
            Self::Base64 => ViolationKind::Base64,
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Alpha => &ALPHA,
            Self::AlphaNumeric => &ALPHANUMERIC,
            Self::AlphaDash => &ALPHADASH,
            Self::AlphaDashDot => &ALPHADASHDOT,
            Self::Email => &EMAIL,
            Self::Url => &URL,
            Self::Numeric => &NUMERIC,
            Self::Number => &NUMBER,
            Self::Uuid => &UUID,
            Self::Uuid3 => &UUID3,
            Self::Uuid4 => &UUID4,
            Self::Uuid5 => &UUID5,
            Self::Base64 => &BASE64,
        }
    }

    /// Whether `input` satisfies the pattern.
    #[must_use]
    pub fn accepts(self, input: &str) -> bool {
        let matched = self.regex().is_match(input);
        match self {
            Self::AlphaDash | Self::AlphaDashDot => !matched,
            _ => matched,
        }
    }
}

impl Evaluator for Pattern {
    fn evaluate(&self, value: &Value<'_>, _args: &[String]) -> Result<(), Violation> {
        if self.accepts(string(value)?) {
            Ok(())
        } else {
            Err(Violation::of(self.kind()))
        }
    }
}

// ============================================================================
// REGEXP
// ============================================================================

const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// `regexp(pattern)`: the string must match `pattern`.
///
/// Compiled expressions are shared across calls, so one evaluator instance
/// should back every `regexp` annotation.
#[derive(Clone)]
pub struct RegexpEvaluator {
    cache: moka::sync::Cache<String, Regex>,
}

impl RegexpEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            cache: moka::sync::Cache::builder().max_capacity(capacity).build(),
        }
    }

    fn compile(&self, pattern: &str) -> Result<Regex, Arc<regex::Error>> {
        self.cache
            .try_get_with(pattern.to_owned(), || Regex::new(pattern))
    }

    /// Number of compiled expressions currently held.
    #[must_use]
    pub fn cached(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for RegexpEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for RegexpEvaluator {
    fn evaluate(&self, value: &Value<'_>, args: &[String]) -> Result<(), Violation> {
        let input = string(value)?;
        let [pattern] = args else {
            return Err(Violation::invalid_parameter_count(1, args.len()));
        };
        let regex = self
            .compile(pattern)
            .map_err(|_| Violation::bad_parameter(pattern))?;

        if regex.is_match(input) {
            Ok(())
        } else {
            Err(Violation::of(ViolationKind::Regexp).with_arg(pattern))
        }
    }
}
