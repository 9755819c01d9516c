//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use fieldguard::prelude::*;
//!
//! #[derive(Record)]
//! struct Login {
//!     #[validate("required, email")]
//!     pub email: String,
//! }
//! ```

pub use crate::engine::{Engine, Mode, default_engine};
pub use crate::error::{Error, Result};
pub use crate::names::NameResolver;
pub use crate::record::{FieldDecl, Record, RecordDescriptor, RecordType, Validatable};
pub use crate::registry::{Evaluator, SharedEvaluator, evaluator};
pub use crate::value::{Inspect, Shape, Value};
pub use crate::violation::{Errors, Violation, ViolationKind};

#[cfg(feature = "derive")]
pub use fieldguard_macros::Record;
