//! Violations and the path-keyed error collection
//!
//! A [`Violation`] is one failed constraint. [`Errors`] groups violations by
//! the dotted, sequence-indexed path of the field that produced them.
//!
//! Templates and codes use `Cow<'static, str>` so the built-in violations
//! never allocate for their text.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// VIOLATION KIND
// ============================================================================

/// Fixed classification of a violation.
///
/// Everything except [`ViolationKind::Custom`] is produced by the built-in
/// evaluators or by the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    Required,
    Min,
    Max,
    Length,
    Between,
    Around,
    Regexp,
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
    Include,
    Exclude,
    /// The evaluator does not understand the value's kind.
    Unsupported,
    /// An argument could not be interpreted.
    BadParameter,
    /// Too many or too few arguments.
    InvalidParameterCount,
    UnknownConstraint,
    Syntax,
    /// Caller-defined classification, identified by its code.
    Custom(Cow<'static, str>),
}

/// Built-in kinds with their stable code and default message.
const BUILTIN_KINDS: &[(ViolationKind, &str, &str)] = &[
    (ViolationKind::Required, "required", "required"),
    (ViolationKind::Min, "min", "less than min"),
    (ViolationKind::Max, "max", "greater than max"),
    (ViolationKind::Length, "length", "invalid length"),
    (ViolationKind::Between, "between", "not between"),
    (ViolationKind::Around, "around", "not around"),
    (ViolationKind::Regexp, "regexp", "regular expression mismatch"),
    (ViolationKind::Alpha, "alpha", "alpha mismatch"),
    (ViolationKind::AlphaNumeric, "alphanumeric", "alphanumeric mismatch"),
    (ViolationKind::AlphaDash, "alphadash", "alpha dash mismatch"),
    (ViolationKind::AlphaDashDot, "alphadashdot", "alpha dash dot mismatch"),
    (ViolationKind::Email, "email", "invalid email"),
    (ViolationKind::Url, "url", "invalid url"),
    (ViolationKind::Numeric, "numeric", "value not numeric"),
    (ViolationKind::Number, "number", "value not a number"),
    (ViolationKind::Uuid, "uuid", "invalid UUID"),
    (ViolationKind::Uuid3, "uuid3", "invalid UUID3"),
    (ViolationKind::Uuid4, "uuid4", "invalid UUID4"),
    (ViolationKind::Uuid5, "uuid5", "invalid UUID5"),
    (ViolationKind::Base64, "base64", "invalid base64 encoded"),
    (ViolationKind::Include, "include", "value not found in set"),
    (ViolationKind::Exclude, "exclude", "value matches one excluded value"),
    (ViolationKind::Unsupported, "unsupported", "unsupported type"),
    (ViolationKind::BadParameter, "bad_parameter", "bad parameter"),
    (
        ViolationKind::InvalidParameterCount,
        "invalid_parameter_count",
        "invalid parameter count",
    ),
    (
        ViolationKind::UnknownConstraint,
        "unknown_constraint",
        "unknown constraint",
    ),
    (ViolationKind::Syntax, "syntax", "syntax error"),
];

impl ViolationKind {
    /// Stable machine-readable code, e.g. `"required"` or `"bad_parameter"`.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Custom(code) => code,
            builtin => BUILTIN_KINDS
                .iter()
                .find(|(kind, _, _)| kind == builtin)
                .map_or("custom", |(_, code, _)| code),
        }
    }

    /// Message used by the built-in evaluators for this kind.
    #[must_use]
    pub fn default_message(&self) -> Option<&'static str> {
        BUILTIN_KINDS
            .iter()
            .find(|(kind, _, _)| kind == self)
            .map(|(_, _, message)| *message)
    }

    /// Recovers a built-in kind from its rendered default message.
    ///
    /// Used when reading a serialized [`Errors`] back, where only the text
    /// survives.
    #[must_use]
    pub fn from_message(message: &str) -> Option<Self> {
        BUILTIN_KINDS
            .iter()
            .find(|(_, _, text)| *text == message)
            .map(|(kind, _, _)| kind.clone())
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// VIOLATION
// ============================================================================

/// One recorded constraint failure.
///
/// The template may contain `{}` placeholders that are filled, in order, from
/// the positional arguments when the violation is rendered.
///
/// # Examples
///
/// ```rust,ignore
/// use fieldguard::Violation;
///
/// let v = Violation::custom("even", "{} is not even").with_arg(3);
/// assert_eq!(v.to_string(), "3 is not even");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    kind: ViolationKind,
    template: Cow<'static, str>,
    args: Vec<String>,
}

impl Violation {
    /// Creates a violation with an explicit kind and message template.
    pub fn new(kind: ViolationKind, template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Creates a violation of a built-in kind with its default message.
    #[must_use]
    pub fn of(kind: ViolationKind) -> Self {
        let template = kind.default_message().unwrap_or("invalid value");
        Self::new(kind, template)
    }

    /// Creates a caller-classified violation.
    pub fn custom(
        code: impl Into<Cow<'static, str>>,
        template: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(ViolationKind::Custom(code.into()), template)
    }

    /// Appends a positional argument.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    #[must_use]
    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces = self.template.split("{}");
        let mut args = self.args.iter();
        if let Some(first) = pieces.next() {
            f.write_str(first)?;
        }
        for piece in pieces {
            match args.next() {
                Some(arg) => f.write_str(arg)?,
                None => f.write_str("{}")?,
            }
            f.write_str(piece)?;
        }
        Ok(())
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Violation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let kind = ViolationKind::from_message(&text)
            .unwrap_or(ViolationKind::Custom(Cow::Borrowed("custom")));
        Ok(Self::new(kind, text))
    }
}

// ============================================================================
// CONVENIENCE CONSTRUCTORS
// ============================================================================

impl Violation {
    #[must_use]
    pub fn required() -> Self {
        Self::of(ViolationKind::Required)
    }

    /// The evaluator cannot handle values of kind `what`.
    #[must_use]
    pub fn unsupported(what: &str) -> Self {
        Self::of(ViolationKind::Unsupported).with_arg(what)
    }

    /// `param` could not be parsed into the type the evaluator needs.
    #[must_use]
    pub fn bad_parameter(param: &str) -> Self {
        Self::of(ViolationKind::BadParameter).with_arg(param)
    }

    #[must_use]
    pub fn invalid_parameter_count(expected: usize, actual: usize) -> Self {
        Self::of(ViolationKind::InvalidParameterCount)
            .with_arg(expected)
            .with_arg(actual)
    }
}

// ============================================================================
// ERROR COLLECTION
// ============================================================================

/// Violations grouped by field path.
///
/// Paths are kept sorted so rendering is deterministic. Within a path,
/// violations keep insertion order. A path is present only while it has at
/// least one violation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors {
    entries: BTreeMap<String, Vec<Violation>>,
}

impl Errors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `violation` under `path`.
    pub fn add(&mut self, path: impl Into<String>, violation: Violation) {
        self.entries.entry(path.into()).or_default().push(violation);
    }

    /// Records every violation of `violations` under `path`.
    ///
    /// An empty iterator leaves the collection untouched.
    pub fn extend_at(
        &mut self,
        path: impl Into<String>,
        violations: impl IntoIterator<Item = Violation>,
    ) {
        let mut violations = violations.into_iter().peekable();
        if violations.peek().is_some() {
            self.entries
                .entry(path.into())
                .or_default()
                .extend(violations);
        }
    }

    /// Appends every entry of `other` under the same path.
    pub fn merge(&mut self, other: Self) {
        self.merge_prefixed("", other);
    }

    /// Appends every entry of `other` under `prefix + path`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: Self) {
        for (path, violations) in other.entries {
            self.extend_at(format!("{prefix}{path}"), violations);
        }
    }

    /// Violations recorded at exactly `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[Violation]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Kinds recorded at `path`, in insertion order.
    #[must_use]
    pub fn kinds(&self, path: &str) -> Vec<&ViolationKind> {
        self.get(path)
            .map(|violations| violations.iter().map(Violation::kind).collect())
            .unwrap_or_default()
    }

    /// Number of distinct paths with violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of violations across every path.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<Violation>> {
        self.entries.iter()
    }

    /// Rendered violation texts keyed by path.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(path, violations)| {
                let texts = violations.iter().map(ToString::to_string).collect();
                (path.clone(), texts)
            })
            .collect()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    #[must_use = "result must be used"]
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, violations)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{path}: [")?;
            for (j, violation) in violations.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{violation}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

impl IntoIterator for Errors {
    type Item = (String, Vec<Violation>);
    type IntoIter = btree_map::IntoIter<String, Vec<Violation>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = (&'a String, &'a Vec<Violation>);
    type IntoIter = btree_map::Iter<'a, String, Vec<Violation>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<P: Into<String>> FromIterator<(P, Violation)> for Errors {
    fn from_iter<I: IntoIterator<Item = (P, Violation)>>(iter: I) -> Self {
        let mut errors = Self::new();
        errors.extend(iter);
        errors
    }
}

impl<P: Into<String>> Extend<(P, Violation)> for Errors {
    fn extend<I: IntoIterator<Item = (P, Violation)>>(&mut self, iter: I) {
        for (path, violation) in iter {
            self.add(path, violation);
        }
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Errors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = BTreeMap::<String, Vec<Violation>>::deserialize(deserializer)?;
        entries.retain(|_, violations| !violations.is_empty());
        Ok(Self { entries })
    }
}

// ============================================================================
// TESTS
// ============================================================================
