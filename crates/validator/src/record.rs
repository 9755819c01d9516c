//! Record metadata
//!
//! A record describes its fields once, through [`Record::describe`], and
//! exposes live field values by position through [`Record::field`]. The plan
//! compiler reads the descriptor; the traversal reads the values.
//!
//! `#[derive(Record)]` writes both for named-field structs. Manual
//! implementations use the [`RecordDescriptor`] builder:
//!
//! ```rust,ignore
//! use fieldguard::{FieldDecl, Inspect, Record, RecordDescriptor, RecordType, Shape, Value};
//!
//! struct Point { x: i64, y: i64 }
//!
//! impl Record for Point {
//!     fn describe() -> RecordDescriptor {
//!         RecordDescriptor::new("Point")
//!             .with_field(FieldDecl::of::<i64>("x").with_tag("validate", "min(0)"))
//!             .with_field(FieldDecl::of::<i64>("y").with_tag("validate", "min(0)"))
//!     }
//!
//!     fn field(&self, index: usize) -> Value<'_> {
//!         match index {
//!             0 => self.x.inspect(),
//!             1 => self.y.inspect(),
//!             _ => Value::Nil,
//!         }
//!     }
//! }
//!
//! impl Inspect for Point {
//!     fn shape() -> Shape { Shape::Record(RecordType::of::<Self>()) }
//!     fn inspect(&self) -> Value<'_> { Value::Record(self) }
//! }
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::value::{Inspect, Shape, Value};
use crate::violation::Errors;

// ============================================================================
// TRAITS
// ============================================================================

/// A structured value with named fields.
pub trait Record: 'static {
    /// Field metadata in declaration order.
    fn describe() -> RecordDescriptor
    where
        Self: Sized;

    /// Value of the field at `index` in the descriptor, or [`Value::Nil`]
    /// when out of range.
    fn field(&self, index: usize) -> Value<'_>;

    /// Record-level self-validation, if the type has one.
    fn validatable(&self) -> Option<&dyn Validatable> {
        None
    }

    #[doc(hidden)]
    fn record_type_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// Record-level checks layered on top of field constraints.
///
/// Violations returned here are merged at the record's own path prefix, so
/// cross-field rules can report against any field name.
pub trait Validatable {
    fn validate(&self) -> Result<(), Errors>;
}

// ============================================================================
// RECORD TYPE
// ============================================================================

/// Identity of a record type plus a lazy handle to its descriptor.
///
/// Building the descriptor on demand keeps self-referencing types finite.
#[derive(Clone, Copy)]
pub struct RecordType {
    id: TypeId,
    name: &'static str,
    describe: fn() -> RecordDescriptor,
}

impl RecordType {
    #[must_use]
    pub fn of<T: Record>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            describe: T::describe,
        }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn descriptor(&self) -> RecordDescriptor {
        (self.describe)()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Metadata table for one record type.
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    name: &'static str,
    fields: Vec<FieldDecl>,
}

impl RecordDescriptor {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Appends a field; its index is its position in the descriptor.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
}

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    name: &'static str,
    shape: Shape,
    public: bool,
    embedded: bool,
    tags: SmallVec<[(&'static str, &'static str); 2]>,
}

impl FieldDecl {
    /// A public, non-embedded field without annotations.
    #[must_use]
    pub fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            public: true,
            embedded: false,
            tags: SmallVec::new(),
        }
    }

    /// Field whose shape is taken from its Rust type.
    #[must_use]
    pub fn of<T: Inspect>(name: &'static str) -> Self {
        Self::new(name, T::shape())
    }

    /// Marks the field as not externally visible.
    #[must_use = "builder methods must be chained or built"]
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// Marks the field as an embedded record whose fields are promoted.
    #[must_use = "builder methods must be chained or built"]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Attaches an annotation under tag `key`, replacing a previous one.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_tag(mut self, key: &'static str, value: &'static str) -> Self {
        self.tags.retain(|(existing, _)| *existing != key);
        self.tags.push((key, value));
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Annotation stored under `key`.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Node {
        label: String,
        next: Option<Box<Node>>,
    }

    impl Record for Node {
        fn describe() -> RecordDescriptor {
            RecordDescriptor::new("Node")
                .with_field(FieldDecl::of::<String>("label").with_tag("validate", "required"))
                .with_field(FieldDecl::of::<Option<Box<Node>>>("next"))
        }

        fn field(&self, index: usize) -> Value<'_> {
            match index {
                0 => self.label.inspect(),
                1 => Inspect::inspect(&self.next),
                _ => Value::Nil,
            }
        }
    }

    impl Inspect for Node {
        fn shape() -> Shape {
            Shape::Record(RecordType::of::<Self>())
        }

        fn inspect(&self) -> Value<'_> {
            Value::Record(self)
        }
    }

    #[test]
    fn self_referencing_descriptor_is_finite() {
        let descriptor = RecordType::of::<Node>().descriptor();
        assert_eq!(descriptor.name(), "Node");
        assert_eq!(descriptor.fields().len(), 2);
        assert_eq!(
            descriptor.fields()[1].shape(),
            &Shape::Optional(Box::new(Shape::Record(RecordType::of::<Node>())))
        );
    }

    #[test]
    fn tags_replace_by_key() {
        let field = FieldDecl::of::<i32>("n")
            .with_tag("validate", "min(1)")
            .with_tag("json", "count")
            .with_tag("validate", "max(9)");
        assert_eq!(field.tag("validate"), Some("max(9)"));
        assert_eq!(field.tag("json"), Some("count"));
        assert_eq!(field.tag("xml"), None);
    }

    #[test]
    fn dyn_record_reports_concrete_type() {
        let node = Node {
            label: "a".into(),
            next: None,
        };
        let record: &dyn Record = &node;
        assert_eq!(record.record_type_id(), TypeId::of::<Node>());
        assert!(record.validatable().is_none());
        assert!(record.field(1).is_nil());
    }
}
