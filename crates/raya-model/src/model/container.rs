//! List, map and array element access
//!
//! Container models have no fixed property set. An element property is
//! synthesized from its name: a decimal index for lists and arrays, the
//! textual form of the key for maps whose key type can be decoded.

use std::sync::Arc;

use crate::error::{ModelError, ModelResult};
use crate::reflect::{ClassId, ClassKind};
use crate::types::{Type, TypeResolver};
use crate::value::Value;

use super::accessor::coerce;
use super::property::{Access, AccessorKind, Property};

/// Whether map keys of this type can be named by a string
pub(crate) fn is_decodable(key: &Type) -> bool {
    let resolver = TypeResolver::global();
    match resolver.erase(key) {
        Type::Class(id) if id == ClassId::STRING || id.primitive().is_some() => true,
        Type::Class(id) => resolver
            .class(id)
            .is_some_and(|decl| decl.kind == ClassKind::Enum),
        _ => false,
    }
}

/// Decode a property name into a map key of type `key`
pub(crate) fn decode_key(name: &str, key: &Type) -> Option<Value> {
    let resolver = TypeResolver::global();
    let Type::Class(id) = resolver.erase(key) else {
        return None;
    };
    if id == ClassId::STRING {
        return Some(Value::str(name));
    }
    if let Some(primitive) = id.primitive() {
        use crate::reflect::Primitive::*;
        return match primitive {
            Bool => name.parse().ok().map(Value::Bool),
            Byte => name.parse().ok().map(Value::Byte),
            Short => name.parse().ok().map(Value::Short),
            Int => name.parse().ok().map(Value::Int),
            Long => name.parse().ok().map(Value::Long),
            Float => name.parse().ok().map(Value::Float),
            Double => name.parse().ok().map(Value::Double),
            Char => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
        };
    }
    let decl = resolver.class(id)?;
    if decl.kind == ClassKind::Enum && decl.has_constant(name) {
        Some(Value::constant(id, name))
    } else {
        None
    }
}

/// Textual form of a map key, the inverse of [`decode_key`]
pub(crate) fn encode_key(key: &Value) -> Option<String> {
    Some(match key {
        Value::Bool(v) => v.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::Short(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Char(c) => c.to_string(),
        Value::Str(s) => s.to_string(),
        Value::Enum { name, .. } => name.to_string(),
        _ => return None,
    })
}

pub(crate) fn index_property(index: usize, element: &Type) -> Property {
    Property::new(
        Arc::from(index.to_string()),
        element.clone(),
        AccessorKind::Element,
        ClassId::OBJECT,
        Access::Index(index),
    )
}

pub(crate) fn key_property(name: &str, key: Value, value: &Type) -> Property {
    Property::new(
        Arc::from(name),
        value.clone(),
        AccessorKind::Element,
        ClassId::OBJECT,
        Access::Key(key),
    )
}

/// Element read; `this` is a list, array or map
pub(crate) fn get_element(this: &Value, access: &Access) -> ModelResult<Value> {
    match (this, access) {
        (Value::List(list), Access::Index(index)) => {
            list.get(*index).ok_or(ModelError::IndexOutOfBounds {
                index: *index,
                len: list.len(),
            })
        }
        (Value::Array(array), Access::Index(index)) => array.get(*index),
        (Value::Map(map), Access::Key(key)) => Ok(map.get(key).unwrap_or_default()),
        _ => Err(ModelError::reflection(format!(
            "{} has no elements of this kind",
            this.type_name()
        ))),
    }
}

/// Element write; lists grow, arrays stay fixed, maps insert
pub(crate) fn set_element(
    this: &Value,
    property: &Property,
    value: Value,
) -> ModelResult<Value> {
    let value = coerce(value, property.ty(), property.name())?;
    match (this, &property.access) {
        (Value::List(list), Access::Index(index)) => list.set(*index, value)?,
        (Value::Array(array), Access::Index(index)) => array.set(*index, value)?,
        (Value::Map(map), Access::Key(key)) => {
            map.insert(key.clone(), value);
        }
        _ => {
            return Err(ModelError::reflection(format!(
                "{} has no elements of this kind",
                this.type_name()
            )))
        }
    }
    Ok(this.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodable_keys() {
        assert!(is_decodable(&ClassId::STRING.into()));
        assert!(is_decodable(&ClassId::BOXED_INT.into()));
        assert!(is_decodable(&ClassId::CHAR.into()));
        assert!(!is_decodable(&ClassId::OBJECT.into()));
        assert!(!is_decodable(&Type::list_of(ClassId::STRING.into())));
    }

    #[test]
    fn test_decode_and_encode() {
        let int = Type::from(ClassId::BOXED_INT);
        assert_eq!(decode_key("42", &int), Some(Value::Int(42)));
        assert_eq!(decode_key("x", &int), None);
        assert_eq!(decode_key("true", &ClassId::BOXED_BOOLEAN.into()), Some(Value::Bool(true)));
        assert_eq!(decode_key("ab", &ClassId::BOXED_CHAR.into()), None);
        assert_eq!(decode_key("key", &ClassId::STRING.into()), Some(Value::str("key")));

        assert_eq!(encode_key(&Value::Long(-7)).as_deref(), Some("-7"));
        assert_eq!(encode_key(&Value::Null), None);
    }
}
