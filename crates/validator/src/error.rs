//! Engine error type
//!
//! [`Error`] unifies the three outcomes that are not a clean pass:
//! violations found in the data, annotations that cannot be compiled, and
//! invalid engine configuration.

use thiserror::Error;

use crate::tag::TagSyntaxError;
use crate::violation::{Errors, ViolationKind};

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything a validation or configuration call can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// The value was walked and violates at least one constraint.
    #[error("{0}")]
    Invalid(Errors),

    /// An annotation names a constraint the registry does not know.
    #[error("unknown constraint `{name}` on `{field}`")]
    UnknownConstraint {
        /// Constraint name as written (lower-cased).
        name: String,
        /// `Record.field`, or `<inline>` for ad-hoc constraints.
        field: String,
    },

    /// An annotation could not be parsed.
    #[error("invalid annotation `{annotation}` on `{field}`: {source}")]
    Syntax {
        annotation: String,
        field: String,
        #[source]
        source: TagSyntaxError,
    },

    /// A validator was registered under an empty name.
    #[error("validator name cannot be empty")]
    EmptyValidatorName,

    /// A record embeds itself, directly or through other embedded records.
    #[error("record `{record}` embeds itself")]
    CyclicEmbedding { record: &'static str },
}

impl Error {
    /// Violations found, if the value was actually walked.
    #[must_use]
    pub const fn violations(&self) -> Option<&Errors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_violations(self) -> Option<Errors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    /// Whether compiling a record's annotations failed.
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownConstraint { .. } | Self::Syntax { .. } | Self::CyclicEmbedding { .. }
        )
    }

    /// Classification for compile errors, matching the violation taxonomy.
    #[must_use]
    pub fn kind(&self) -> Option<ViolationKind> {
        match self {
            Self::UnknownConstraint { .. } => Some(ViolationKind::UnknownConstraint),
            Self::Syntax { .. } => Some(ViolationKind::Syntax),
            _ => None,
        }
    }
}

impl From<Errors> for Error {
    fn from(errors: Errors) -> Self {
        Self::Invalid(errors)
    }
}
