//! Runtime values
//!
//! Everything a property can hold. Primitives, strings and enum constants
//! are plain data; objects, containers and holders are shared references and
//! compare by identity.

mod holder;
mod object;

use std::fmt;
use std::sync::Arc;

pub use holder::{Signal, Variable};
pub use object::{ArrayObject, Instance, ListObject, MapKey, MapObject};

use crate::reflect::{ClassId, Primitive};
use crate::types::Type;

/// A runtime value
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit integer
    Byte(i8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Character
    Char(char),
    /// Immutable string
    Str(Arc<str>),
    /// Enum constant
    Enum {
        /// Enum class
        class: ClassId,
        /// Constant name
        name: Arc<str>,
    },
    /// Object instance
    Object(Arc<Instance>),
    /// Growable list
    List(Arc<ListObject>),
    /// Keyed map
    Map(Arc<MapObject>),
    /// Fixed-length array
    Array(Arc<ArrayObject>),
    /// Observable single-value holder
    Holder(Variable),
}

impl Value {
    /// String value
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Enum constant
    pub fn constant(class: ClassId, name: impl Into<Arc<str>>) -> Self {
        Value::Enum {
            class,
            name: name.into(),
        }
    }

    /// Wrap an instance
    pub fn object(instance: Arc<Instance>) -> Self {
        Value::Object(instance)
    }

    /// New `ArrayList` holding `items`
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(ListObject::from_vec(items)))
    }

    /// New holder containing `value`
    pub fn holder(value: Value) -> Self {
        Value::Holder(Variable::of(value))
    }

    /// Check if null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Zero value of a primitive kind
    pub fn zero(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Bool => Value::Bool(false),
            Primitive::Byte => Value::Byte(0),
            Primitive::Short => Value::Short(0),
            Primitive::Int => Value::Int(0),
            Primitive::Long => Value::Long(0),
            Primitive::Float => Value::Float(0.0),
            Primitive::Double => Value::Double(0.0),
            Primitive::Char => Value::Char('\0'),
        }
    }

    /// Default slot value for a declared type: zero for primitives, null otherwise
    pub fn default_for(ty: &Type) -> Self {
        match ty {
            Type::Class(id) if id.is_primitive() => id.primitive().map(Value::zero).unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Primitive kind of this value, if it is one
    pub fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            Value::Bool(_) => Primitive::Bool,
            Value::Byte(_) => Primitive::Byte,
            Value::Short(_) => Primitive::Short,
            Value::Int(_) => Primitive::Int,
            Value::Long(_) => Primitive::Long,
            Value::Float(_) => Primitive::Float,
            Value::Double(_) => Primitive::Double,
            Value::Char(_) => Primitive::Char,
            _ => return None,
        })
    }

    /// Runtime class; primitives report their boxed class, arrays and null have none
    pub fn class(&self) -> Option<ClassId> {
        match self {
            Value::Null | Value::Array(_) => None,
            Value::Str(_) => Some(ClassId::STRING),
            Value::Enum { class, .. } => Some(*class),
            Value::Object(instance) => Some(instance.class()),
            Value::List(list) => Some(list.class()),
            Value::Map(map) => Some(map.class()),
            Value::Holder(_) => Some(ClassId::VARIABLE),
            primitive => primitive.primitive().map(boxed_class),
        }
    }

    /// Runtime type, including arrays
    pub fn runtime_type(&self) -> Option<Type> {
        match self {
            Value::Array(array) => Some(Type::array(array.component().clone())),
            other => other.class().map(Type::Class),
        }
    }

    /// Convert a primitive to another kind along a widening conversion
    ///
    /// `byte -> short -> int -> long -> float -> double`, and `char -> int`
    /// upward. Returns `None` for narrowing or unrelated kinds.
    pub fn widen(&self, target: Primitive) -> Option<Value> {
        use Primitive::*;

        let source = self.primitive()?;
        if source == target {
            return Some(self.clone());
        }
        let as_i64 = match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            Value::Char(c) => Some(*c as i64),
            _ => None,
        };
        let rank = |p: Primitive| match p {
            Byte => Some(1),
            Short => Some(2),
            Int => Some(3),
            Long => Some(4),
            Float => Some(5),
            Double => Some(6),
            Bool | Char => None,
        };
        let target_rank = rank(target)?;
        let source_rank = match source {
            Char if target_rank >= 3 => 2,
            other => rank(other)?,
        };
        if source_rank >= target_rank {
            return None;
        }

        Some(match (target, as_i64, self) {
            (Short, Some(v), _) => Value::Short(v as i16),
            (Int, Some(v), _) => Value::Int(v as i32),
            (Long, Some(v), _) => Value::Long(v),
            (Float, Some(v), _) => Value::Float(v as f32),
            (Double, Some(v), _) => Value::Double(v as f64),
            (Double, None, Value::Float(f)) => Value::Double(*f as f64),
            _ => return None,
        })
    }

    /// Short description of the runtime kind, for error messages
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Array(array) => format!("{}[]", array.component()),
            other => other
                .runtime_type()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string()),
        }
    }

    /// Instance reference, if this is an object
    pub fn as_instance(&self) -> Option<&Arc<Instance>> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// List reference, if this is a list
    pub fn as_list(&self) -> Option<&Arc<ListObject>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Map reference, if this is a map
    pub fn as_map(&self) -> Option<&Arc<MapObject>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Array reference, if this is an array
    pub fn as_array(&self) -> Option<&Arc<ArrayObject>> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Holder, if this is one
    pub fn as_holder(&self) -> Option<&Variable> {
        match self {
            Value::Holder(holder) => Some(holder),
            _ => None,
        }
    }

    /// String content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content of any integral primitive
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }
}

fn boxed_class(primitive: Primitive) -> ClassId {
    match primitive {
        Primitive::Bool => ClassId::BOXED_BOOLEAN,
        Primitive::Byte => ClassId::BOXED_BYTE,
        Primitive::Short => ClassId::BOXED_SHORT,
        Primitive::Int => ClassId::BOXED_INT,
        Primitive::Long => ClassId::BOXED_LONG,
        Primitive::Float => ClassId::BOXED_FLOAT,
        Primitive::Double => ClassId::BOXED_DOUBLE,
        Primitive::Char => ClassId::BOXED_CHAR,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (
                Value::Enum { class: c1, name: n1 },
                Value::Enum { class: c2, name: n2 },
            ) => c1 == c2 && n1 == n2,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Holder(a), Value::Holder(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}b", v),
            Value::Short(v) => write!(f, "{}s", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}L", v),
            Value::Float(v) => write!(f, "{}f", v),
            Value::Double(v) => write!(f, "{}d", v),
            Value::Char(c) => write!(f, "{:?}", c),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Enum { name, .. } => write!(f, "{}", name),
            Value::Object(instance) => write!(f, "{}@{:p}", self.type_name(), Arc::as_ptr(instance)),
            Value::List(list) => f.debug_list().entries(list.to_vec()).finish(),
            Value::Map(map) => f.debug_map().entries(map.entries()).finish(),
            Value::Array(array) => f.debug_list().entries(array.to_vec()).finish(),
            Value::Holder(holder) => write!(f, "Variable({:?})", holder.get()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<Arc<Instance>> for Value {
    fn from(v: Arc<Instance>) -> Self {
        Value::Object(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_classes_are_boxed() {
        assert_eq!(Value::Int(1).class(), Some(ClassId::BOXED_INT));
        assert_eq!(Value::Bool(true).class(), Some(ClassId::BOXED_BOOLEAN));
        assert_eq!(Value::str("x").class(), Some(ClassId::STRING));
        assert_eq!(Value::Null.class(), None);
    }

    #[test]
    fn test_widening() {
        assert_eq!(Value::Int(7).widen(Primitive::Long), Some(Value::Long(7)));
        assert_eq!(Value::Byte(3).widen(Primitive::Double), Some(Value::Double(3.0)));
        assert_eq!(Value::Char('A').widen(Primitive::Int), Some(Value::Int(65)));
        assert_eq!(Value::Float(1.5).widen(Primitive::Double), Some(Value::Double(1.5)));

        assert_eq!(Value::Long(7).widen(Primitive::Int), None);
        assert_eq!(Value::Char('A').widen(Primitive::Short), None);
        assert_eq!(Value::Bool(true).widen(Primitive::Int), None);
        assert_eq!(Value::Int(1).widen(Primitive::Char), None);
    }

    #[test]
    fn test_reference_equality() {
        let a = Value::list(vec![Value::Int(1)]);
        let b = Value::list(vec![Value::Int(1)]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::str("x"), Value::from("x"));
    }

    #[test]
    fn test_default_for() {
        assert_eq!(Value::default_for(&ClassId::INT.into()), Value::Int(0));
        assert_eq!(Value::default_for(&ClassId::BOOLEAN.into()), Value::Bool(false));
        assert!(Value::default_for(&ClassId::BOXED_INT.into()).is_null());
        assert!(Value::default_for(&ClassId::STRING.into()).is_null());
    }
}
