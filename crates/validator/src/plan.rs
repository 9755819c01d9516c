//! Compiled validation plans
//!
//! A [`CompiledPlan`] is the flattened, pre-resolved form of a record type's
//! annotations: one [`FieldPlan`] per validated field, each holding its bound
//! evaluators and how the traversal descends into it. Plans are immutable and
//! shared by every walk through the plan cache.

use std::any::TypeId;
use std::fmt;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::names::NameResolver;
use crate::record::{Record, RecordType};
use crate::registry::{Registry, SharedEvaluator};
use crate::tag::{self, Annotation, Constraint};
use crate::value::{Descent, Value};
use crate::violation::Violation;

// ============================================================================
// BOUND VALIDATOR
// ============================================================================

/// A constraint resolved against the registry, with its literal arguments.
#[derive(Clone)]
pub struct BoundValidator {
    name: String,
    args: Vec<String>,
    evaluator: SharedEvaluator,
}

impl BoundValidator {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the evaluator against `value`.
    pub fn check(&self, value: &Value<'_>) -> Result<(), Violation> {
        self.evaluator.evaluate(value, &self.args)
    }
}

impl fmt::Debug for BoundValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundValidator")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish()
    }
}

/// Resolves every constraint of an annotation; `field` names the owner in
/// the error.
pub(crate) fn bind_all(
    registry: &Registry,
    constraints: Vec<Constraint>,
    field: &str,
) -> Result<Vec<BoundValidator>> {
    constraints
        .into_iter()
        .map(|Constraint { name, args }| match registry.resolve(&name) {
            Some(evaluator) => Ok(BoundValidator {
                name,
                args,
                evaluator,
            }),
            None => Err(Error::UnknownConstraint {
                name,
                field: field.to_owned(),
            }),
        })
        .collect()
}

// ============================================================================
// FIELD PLAN
// ============================================================================

/// Field index path from the owning record, through embedded records.
type IndexPath = SmallVec<[usize; 4]>;

/// One validated field of a compiled record.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    declared: &'static str,
    name: String,
    index: IndexPath,
    validators: Vec<BoundValidator>,
    descent: Descent,
}

impl FieldPlan {
    /// Rust field name.
    #[must_use]
    pub const fn declared(&self) -> &'static str {
        self.declared
    }

    /// Name used in error paths.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positions of the field, outermost first; longer than one for fields
    /// promoted from embedded records.
    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[must_use]
    pub fn validators(&self) -> &[BoundValidator] {
        &self.validators
    }

    #[must_use]
    pub const fn descent(&self) -> Descent {
        self.descent
    }

    /// Reads the field from `record`.
    ///
    /// A promoted field whose embedding record is absent reads as
    /// [`Value::Nil`].
    pub fn read<'a>(&self, record: &'a dyn Record) -> Value<'a> {
        let Some((&last, parents)) = self.index.split_last() else {
            return Value::Nil;
        };
        follow(record, parents).map_or(Value::Nil, |owner| owner.field(last))
    }
}

/// Record reached from `record` through the embedded fields at `path`, or
/// `None` when one of them is absent.
pub(crate) fn follow<'a>(record: &'a dyn Record, path: &[usize]) -> Option<&'a dyn Record> {
    let mut current = record;
    for &position in path {
        match current.field(position).resolve() {
            Value::Record(inner) => current = inner,
            _ => return None,
        }
    }
    Some(current)
}

// ============================================================================
// COMPILED PLAN
// ============================================================================

/// Validation plan for one record type.
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    record: RecordType,
    fields: Vec<FieldPlan>,
    embedded: Vec<IndexPath>,
}

impl CompiledPlan {
    #[must_use]
    pub const fn record(&self) -> RecordType {
        self.record
    }

    /// Validated fields in declaration order, embedded fields inlined.
    #[must_use]
    pub fn fields(&self) -> &[FieldPlan] {
        &self.fields
    }

    /// Field by external name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Index paths of embedded records, outermost first.
    pub fn embedded(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.embedded.iter().map(SmallVec::as_slice)
    }

    /// Record types this plan descends into.
    pub fn nested(&self) -> impl Iterator<Item = RecordType> + '_ {
        self.fields
            .iter()
            .filter_map(|field| field.descent.record_type())
    }
}

// ============================================================================
// COMPILER
// ============================================================================

/// Turns record descriptors into plans under one engine configuration.
pub(crate) struct Compiler<'e> {
    pub(crate) tag: &'e str,
    pub(crate) names: &'e NameResolver,
    pub(crate) registry: &'e Registry,
}

impl Compiler<'_> {
    /// Compiles `record` alone; nested record types are only referenced.
    pub(crate) fn compile(&self, record: RecordType) -> Result<CompiledPlan> {
        let mut plan = CompiledPlan {
            record,
            fields: Vec::new(),
            embedded: Vec::new(),
        };
        let mut embedding = vec![record.id()];
        self.collect(record, &IndexPath::new(), &mut embedding, &mut plan)?;

        tracing::debug!(
            record = record.name(),
            fields = plan.fields.len(),
            embedded = plan.embedded.len(),
            "compiled validation plan"
        );
        Ok(plan)
    }

    fn collect(
        &self,
        record: RecordType,
        prefix: &IndexPath,
        embedding: &mut Vec<TypeId>,
        out: &mut CompiledPlan,
    ) -> Result<()> {
        let descriptor = record.descriptor();

        for (position, decl) in descriptor.fields().iter().enumerate() {
            let mut index = prefix.clone();
            index.push(position);

            if decl.is_embedded()
                && let Some(inner) = decl.shape().embedded_record()
            {
                if embedding.contains(&inner.id()) {
                    return Err(Error::CyclicEmbedding {
                        record: descriptor.name(),
                    });
                }
                embedding.push(inner.id());
                out.embedded.push(index.clone());
                self.collect(inner, &index, embedding, out)?;
                embedding.pop();
                continue;
            }

            if !decl.is_public() {
                continue;
            }

            let owner = format!("{}.{}", descriptor.name(), decl.name());
            let annotation = decl.tag(self.tag).unwrap_or_default();
            let constraints = match tag::parse(annotation) {
                Ok(Annotation::Skip) => continue,
                Ok(Annotation::Constraints(constraints)) => constraints,
                Err(source) => {
                    return Err(Error::Syntax {
                        annotation: annotation.to_owned(),
                        field: owner,
                        source,
                    });
                }
            };

            out.fields.push(FieldPlan {
                declared: decl.name(),
                name: self.names.resolve(decl),
                index,
                validators: bind_all(self.registry, constraints, &owner)?,
                descent: decl.shape().descent(),
            });
        }

        Ok(())
    }
}
