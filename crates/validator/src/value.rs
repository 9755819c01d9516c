//! Value kinds seen by constraint evaluators
//!
//! [`Inspect`] is the bridge between Rust values and the engine: it exposes a
//! borrowed [`Value`] for evaluators and a static [`Shape`] for the plan
//! compiler.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::record::{Record, RecordType};

// ============================================================================
// VALUE
// ============================================================================

/// Borrowed view of a field value, classified by kind.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// An absent optional.
    Nil,
    /// A present optional; [`Value::resolve`] looks through it.
    Present(&'a dyn Inspect),
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    String(&'a str),
    Sequence(&'a dyn Sequence),
    Map { len: usize },
    Record(&'a dyn Record),
    /// A type the engine has no view of; carries a short type name.
    Unsupported(&'static str),
}

impl<'a> Value<'a> {
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Looks through present optionals down to the wrapped value.
    #[must_use]
    pub fn resolve(self) -> Self {
        match self {
            Self::Present(inner) => inner.inspect().resolve(),
            other => other,
        }
    }

    /// Short kind name used in `unsupported` violations.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Present(_) => "optional",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Unsigned(_) => "unsigned",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Map { .. } => "map",
            Self::Record(_) => "record",
            Self::Unsupported(name) => *name,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("Nil"),
            Self::Present(inner) => f.debug_tuple("Present").field(&inner.inspect()).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Self::Unsigned(u) => f.debug_tuple("Unsigned").field(u).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Sequence(items) => f
                .debug_struct("Sequence")
                .field("len", &items.len())
                .finish(),
            Self::Map { len } => f.debug_struct("Map").field("len", len).finish(),
            Self::Record(_) => f.write_str("Record(..)"),
            Self::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
        }
    }
}

/// Indexed access to the elements of a sequence.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, or [`Value::Nil`] when out of range.
    fn get(&self, index: usize) -> Value<'_>;
}

// ============================================================================
// SHAPE
// ============================================================================

/// Static structure of a type, as far as recursion is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Optional(Box<Shape>),
    Sequence(Box<Shape>),
    Record(RecordType),
}

/// How the traversal descends into a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descent {
    None,
    Record(RecordType),
    SequenceOfRecords(RecordType),
}

impl Shape {
    fn unwrap_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    /// Unwraps at most one optional layer, then one more on a sequence
    /// element, and reports whether a record sits underneath.
    #[must_use]
    pub fn descent(&self) -> Descent {
        match self.unwrap_optional() {
            Self::Record(record) => Descent::Record(*record),
            Self::Sequence(element) => match element.unwrap_optional() {
                Self::Record(record) => Descent::SequenceOfRecords(*record),
                _ => Descent::None,
            },
            _ => Descent::None,
        }
    }

    /// Record type of an embedded field (direct or optional).
    #[must_use]
    pub fn embedded_record(&self) -> Option<RecordType> {
        match self.unwrap_optional() {
            Self::Record(record) => Some(*record),
            _ => None,
        }
    }
}

impl Descent {
    /// Record type the traversal may descend into.
    #[must_use]
    pub const fn record_type(&self) -> Option<RecordType> {
        match self {
            Self::None => None,
            Self::Record(record) | Self::SequenceOfRecords(record) => Some(*record),
        }
    }
}

// ============================================================================
// INSPECT
// ============================================================================

/// Types the engine can look at.
///
/// Implemented for primitives, strings, options, smart pointers, sequences
/// and maps; `#[derive(Record)]` implements it for records.
pub trait Inspect {
    /// Static shape of `Self`; scalar unless overridden.
    fn shape() -> Shape
    where
        Self: Sized,
    {
        Shape::Scalar
    }

    fn inspect(&self) -> Value<'_>;
}

macro_rules! inspect_as {
    ($variant:ident($target:ty): $($ty:ty),+ $(,)?) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self) -> Value<'_> {
                    Value::$variant(<$target>::from(*self))
                }
            }
        )+
    };
}

inspect_as!(Integer(i64): i8, i16, i32, i64);
inspect_as!(Unsigned(u64): u8, u16, u32, u64);
inspect_as!(Float(f64): f32, f64);
inspect_as!(Bool(bool): bool);

impl Inspect for isize {
    fn inspect(&self) -> Value<'_> {
        Value::Integer(*self as i64)
    }
}

impl Inspect for usize {
    fn inspect(&self) -> Value<'_> {
        Value::Unsigned(*self as u64)
    }
}

impl Inspect for str {
    fn inspect(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl Inspect for String {
    fn inspect(&self) -> Value<'_> {
        Value::String(self.as_str())
    }
}

impl Inspect for Cow<'_, str> {
    fn inspect(&self) -> Value<'_> {
        Value::String(self.as_ref())
    }
}

impl Inspect for char {
    fn inspect(&self) -> Value<'_> {
        Value::Unsupported("char")
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn inspect(&self) -> Value<'_> {
        match self {
            Some(inner) => Value::Present(inner),
            None => Value::Nil,
        }
    }
}

macro_rules! inspect_transparent {
    ($($ptr:ident),+) => {
        $(
            impl<T: Inspect> Inspect for $ptr<T> {
                fn shape() -> Shape {
                    T::shape()
                }

                fn inspect(&self) -> Value<'_> {
                    T::inspect(self)
                }
            }
        )+
    };
}

inspect_transparent!(Box, Rc, Arc);

impl<T: Inspect> Inspect for &T {
    fn shape() -> Shape {
        T::shape()
    }

    fn inspect(&self) -> Value<'_> {
        T::inspect(self)
    }
}

impl Inspect for &str {
    fn inspect(&self) -> Value<'_> {
        Value::String(self)
    }
}

macro_rules! sequence {
    ($([$($generics:tt)*] $ty:ty),+ $(,)?) => {
        $(
            impl<$($generics)*> Sequence for $ty {
                fn len(&self) -> usize {
                    <[T]>::len(&self[..])
                }

                fn get(&self, index: usize) -> Value<'_> {
                    self[..].get(index).map_or(Value::Nil, Inspect::inspect)
                }
            }

            impl<$($generics)*> Inspect for $ty {
                fn shape() -> Shape {
                    Shape::Sequence(Box::new(T::shape()))
                }

                fn inspect(&self) -> Value<'_> {
                    Value::Sequence(self)
                }
            }
        )+
    };
}

sequence!(
    [T: Inspect] Vec<T>,
    [T: Inspect, const N: usize] [T; N],
);

impl<T: Inspect> Sequence for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Value<'_> {
        VecDeque::get(self, index).map_or(Value::Nil, Inspect::inspect)
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn inspect(&self) -> Value<'_> {
        Value::Sequence(self)
    }
}

impl<K, V, S> Inspect for HashMap<K, V, S> {
    fn inspect(&self) -> Value<'_> {
        Value::Map { len: self.len() }
    }
}

impl<K, V> Inspect for BTreeMap<K, V> {
    fn inspect(&self) -> Value<'_> {
        Value::Map { len: self.len() }
    }
}
