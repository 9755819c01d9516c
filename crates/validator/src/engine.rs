//! Validation engine
//!
//! An [`Engine`] bundles one configuration (annotation tag, traversal
//! [`Mode`], [`NameResolver`] and [`Registry`]) with the plan cache compiled
//! under it. Engines are `Send + Sync`; validation takes `&self`, while
//! reconfiguration takes `&mut self` and invalidates the cache.
//!
//! # Examples
//!
//! ```rust,ignore
//! use fieldguard::{Engine, Mode, Record};
//!
//! #[derive(Record)]
//! struct Signup {
//!     #[validate("required, email")]
//!     pub email: String,
//!     #[validate("between(8, 64)")]
//!     pub password: String,
//! }
//!
//! let engine = Engine::builder().mode(Mode::FirstPerField).build()?;
//! let errors = engine.report(&signup)?;
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::cache::PlanCache;
use crate::error::{Error, Result};
use crate::names::NameResolver;
use crate::plan::{CompiledPlan, Compiler, bind_all};
use crate::record::{Record, RecordType};
use crate::registry::{Registry, SharedEvaluator};
use crate::tag::{self, Annotation};
use crate::value::{Inspect, Value};
use crate::violation::{Errors, Violation};
use crate::walk::Walker;

/// Annotation tag read by default.
pub const DEFAULT_TAG: &str = "validate";

/// Owner reported for errors in ad-hoc constraint lists.
const INLINE_FIELD: &str = "<inline>";

// ============================================================================
// MODE
// ============================================================================

/// How far a walk goes after the first violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every validator of every field runs.
    #[default]
    CollectAll,
    /// A field stops at its first failing validator; other fields continue.
    FirstPerField,
    /// The whole walk stops at the first violation.
    FailFast,
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Engine configuration.
///
/// The plain-data part deserializes from any serde format; resolvers and
/// extra validators are code and are set programmatically.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Tag holding the constraint annotation.
    pub tag_name: String,
    pub mode: Mode,
    #[serde(skip)]
    pub name_resolver: NameResolver,
    /// Added to (or replacing) the built-in validators.
    #[serde(skip)]
    pub extra_validators: Vec<(String, SharedEvaluator)>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            tag_name: DEFAULT_TAG.to_owned(),
            mode: Mode::default(),
            name_resolver: NameResolver::default(),
            extra_validators: Vec::new(),
        }
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extra: Vec<&str> = self
            .extra_validators
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        f.debug_struct("EngineOptions")
            .field("tag_name", &self.tag_name)
            .field("mode", &self.mode)
            .field("extra_validators", &extra)
            .finish()
    }
}

/// Builder for [`Engine`].
#[derive(Debug, Default)]
#[must_use = "builder methods must be chained or built"]
pub struct EngineBuilder {
    options: EngineOptions,
}

impl EngineBuilder {
    pub fn tag_name(mut self, tag: impl Into<String>) -> Self {
        self.options.tag_name = tag.into();
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn name_resolver(mut self, resolver: NameResolver) -> Self {
        self.options.name_resolver = resolver;
        self
    }

    /// Registers `evaluator` under `name`, replacing a built-in of that name.
    pub fn validator(mut self, name: impl Into<String>, evaluator: SharedEvaluator) -> Self {
        self.options
            .extra_validators
            .push((name.into(), evaluator));
        self
    }

    /// Fails if a validator name is empty.
    pub fn build(self) -> Result<Engine> {
        Engine::with_options(self.options)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Annotation-driven validator for [`Record`] types.
#[derive(Debug)]
pub struct Engine {
    tag: String,
    mode: Mode,
    names: NameResolver,
    registry: Registry,
    cache: PlanCache,
}

impl Engine {
    /// Engine with the built-in validators and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(
            DEFAULT_TAG.to_owned(),
            Mode::default(),
            NameResolver::default(),
            Registry::builtin(),
        )
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn with_options(options: EngineOptions) -> Result<Self> {
        let registry = Registry::builtin().derive_with(
            options
                .extra_validators
                .into_iter()
                .map(|(name, evaluator)| (name, Some(evaluator))),
        )?;
        Ok(Self::from_parts(
            options.tag_name,
            options.mode,
            options.name_resolver,
            registry,
        ))
    }

    fn from_parts(tag: String, mode: Mode, names: NameResolver, registry: Registry) -> Self {
        Self {
            tag,
            mode,
            names,
            registry,
            cache: PlanCache::new(),
        }
    }

    fn compiler(&self) -> Compiler<'_> {
        Compiler {
            tag: &self.tag,
            names: &self.names,
            registry: &self.registry,
        }
    }

    // ------------------------------------------------------------------
    // Derived engines
    // ------------------------------------------------------------------

    /// Copy of this engine reading annotations from `tag`.
    #[must_use]
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self::from_parts(tag.into(), self.mode, self.names.clone(), self.registry.clone())
    }

    #[must_use]
    pub fn with_mode(&self, mode: Mode) -> Self {
        Self::from_parts(self.tag.clone(), mode, self.names.clone(), self.registry.clone())
    }

    /// Copy of this engine with `overrides` applied to its registry; `None`
    /// removes a validator. The original engine is unaffected.
    pub fn with_validators<N, I>(&self, overrides: I) -> Result<Self>
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, Option<SharedEvaluator>)>,
    {
        let registry = self.registry.derive_with(overrides)?;
        Ok(Self::from_parts(
            self.tag.clone(),
            self.mode,
            self.names.clone(),
            registry,
        ))
    }

    // ------------------------------------------------------------------
    // Reconfiguration
    // ------------------------------------------------------------------

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
        self.cache.clear();
    }

    pub fn set_name_resolver(&mut self, resolver: NameResolver) {
        self.names = resolver;
        self.cache.clear();
    }

    /// Plans do not depend on the mode, so the cache is kept.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Registers, replaces or (with `None`) removes a validator.
    pub fn set_validation_function(
        &mut self,
        name: &str,
        evaluator: Option<SharedEvaluator>,
    ) -> Result<()> {
        self.registry.register(name, evaluator)?;
        self.cache.clear();
        Ok(())
    }

    /// Drops every compiled plan.
    pub fn reset_cache(&self) {
        self.cache.clear();
    }

    /// Number of record types with a compiled plan.
    #[must_use]
    pub fn cached_plans(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Compiled plan for `T`, compiling it (and its nested types) if needed.
    pub fn plan<T: Record>(&self) -> Result<Arc<CompiledPlan>> {
        let snapshot = self
            .cache
            .ensure(RecordType::of::<T>(), &self.compiler())?;
        Ok(snapshot.root)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Walks `value` and returns every violation found.
    ///
    /// `value` may be a record, an optional record, or a sequence of
    /// records. `Err` means the record's annotations could not be compiled;
    /// violations are always returned in `Ok`.
    pub fn report<T: Inspect>(&self, value: &T) -> Result<Errors> {
        let Some(record_type) = T::shape().descent().record_type() else {
            return Ok(unsupported(&value.inspect()));
        };
        tracing::trace!(record = record_type.name(), "validating");

        let snapshot = self.cache.ensure(record_type, &self.compiler())?;
        let mut walker = Walker::new(&snapshot.plans, self.mode);

        match value.inspect().resolve() {
            Value::Record(record) => walker.record_with(&snapshot.root, record, ""),
            Value::Sequence(items) => walker.sequence(items, ""),
            other => return Ok(unsupported(&other)),
        }
        Ok(walker.finish())
    }

    /// Like [`Engine::report`], but violations become [`Error::Invalid`].
    pub fn validate<T: Inspect>(&self, value: &T) -> Result<()> {
        self.report(value)?.into_result().map_err(Error::Invalid)
    }

    /// Checks one bare value against an ad-hoc annotation such as
    /// `"required, min(3)"`. Violations are reported at the empty path.
    pub fn valid<T: Inspect + ?Sized>(&self, value: &T, constraints: &str) -> Result<()> {
        let annotation = tag::parse(constraints).map_err(|source| Error::Syntax {
            annotation: constraints.to_owned(),
            field: INLINE_FIELD.to_owned(),
            source,
        })?;
        let Annotation::Constraints(constraints) = annotation else {
            return Ok(());
        };
        let validators = bind_all(&self.registry, constraints, INLINE_FIELD)?;

        let value = value.inspect();
        let mut errors = Errors::new();
        for validator in &validators {
            if let Err(violation) = validator.check(&value) {
                errors.add("", violation);
                if self.mode != Mode::CollectAll {
                    break;
                }
            }
        }
        errors.into_result().map_err(Error::Invalid)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn unsupported(value: &Value<'_>) -> Errors {
    Errors::from_iter([("", Violation::unsupported(value.kind_name()))])
}

// ============================================================================
// DEFAULT ENGINE
// ============================================================================

static DEFAULT_ENGINE: LazyLock<Engine> = LazyLock::new(Engine::new);

/// Process-wide engine with default options.
pub fn default_engine() -> &'static Engine {
    &DEFAULT_ENGINE
}

/// [`Engine::validate`] on the default engine.
pub fn validate<T: Inspect>(value: &T) -> Result<()> {
    DEFAULT_ENGINE.validate(value)
}

/// [`Engine::valid`] on the default engine.
pub fn valid<T: Inspect + ?Sized>(value: &T, constraints: &str) -> Result<()> {
    DEFAULT_ENGINE.valid(value, constraints)
}
