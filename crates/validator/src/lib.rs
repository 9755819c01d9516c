//! # fieldguard
//!
//! Declarative validation for nested records. Constraints are written as
//! short annotations on fields, compiled once per record type into a cached
//! plan, and checked by walking the value. Every violation is reported under
//! a dotted, index-qualified path such as `readers.1.name`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fieldguard::Record;
//!
//! #[derive(Record)]
//! struct Author {
//!     #[validate("required, between(2, 40)")]
//!     pub name: String,
//! }
//!
//! #[derive(Record)]
//! struct Book {
//!     #[validate("required")]
//!     pub title: String,
//!     pub author: Author,
//!     pub readers: Vec<Author>,
//! }
//!
//! let err = fieldguard::validate(&book).unwrap_err();
//! println!("{err}"); // author.name: [required], title: [required]
//! ```
//!
//! ## Pieces
//!
//! - [`tag`]: the annotation grammar (`required, min(1), include(a, "b c")`).
//! - [`Registry`]: constraint names mapped to [`Evaluator`]s; the built-ins
//!   live in [`evaluators`].
//! - [`Engine`]: configuration plus the plan cache; [`Engine::report`]
//!   returns the [`Errors`] collection, [`Engine::validate`] turns it into an
//!   [`Error`].
//! - [`Record`] / [`Inspect`]: how values expose their fields and kinds.
//!   `#[derive(Record)]` (feature `derive`, on by default) writes both.

// Lets derive output (`::fieldguard::...`) resolve inside this crate's tests.
extern crate self as fieldguard;

mod cache;
pub mod engine;
pub mod error;
pub mod evaluators;
pub mod names;
pub mod plan;
pub mod prelude;
pub mod record;
pub mod registry;
pub mod tag;
pub mod value;
pub mod violation;
mod walk;

pub use engine::{
    DEFAULT_TAG, Engine, EngineBuilder, EngineOptions, Mode, default_engine, valid, validate,
};
pub use error::{Error, Result};
pub use names::NameResolver;
pub use plan::{BoundValidator, CompiledPlan, FieldPlan};
pub use record::{FieldDecl, Record, RecordDescriptor, RecordType, Validatable};
pub use registry::{Evaluator, Registry, SharedEvaluator, evaluator};
pub use value::{Descent, Inspect, Sequence, Shape, Value};
pub use violation::{Errors, Violation, ViolationKind};

#[cfg(feature = "derive")]
pub use fieldguard_macros::Record;
