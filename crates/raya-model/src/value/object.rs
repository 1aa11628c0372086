//! Heap objects: instances, lists, maps and arrays

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{ModelError, ModelResult};
use crate::reflect::{ClassId, ClassTable};
use crate::types::Type;

use super::Value;

/// Object instance with one slot per instance field (or record component)
pub struct Instance {
    /// Runtime class
    class: ClassId,
    /// Slot values, superclass slots first
    slots: RwLock<Vec<Value>>,
}

impl Instance {
    /// Allocate an instance with default slot values and run field initializers
    pub fn new(class: ClassId) -> ModelResult<Arc<Self>> {
        let table = ClassTable::global();
        let decl = table.lookup(class)?;
        if decl.is_interface() || decl.is_atomic() {
            return Err(ModelError::reflection(format!(
                "cannot instantiate `{}`",
                decl.name
            )));
        }

        let mut slots = vec![Value::Null; decl.slot_count];
        for component in &decl.components {
            slots[component.slot] = Value::default_for(&component.ty);
        }

        // Walk the chain so inherited fields are initialized too
        let mut current = Some(decl);
        while let Some(decl) = current {
            for field in &decl.fields {
                if let Some(slot) = field.slot {
                    slots[slot] = match &field.initializer {
                        Some(init) => init(),
                        None => Value::default_for(&field.ty),
                    };
                }
            }
            current = decl
                .superclass
                .as_ref()
                .and_then(Type::raw_class)
                .and_then(|id| table.get(id));
        }

        Ok(Arc::new(Self {
            class,
            slots: RwLock::new(slots),
        }))
    }

    /// Create an instance from explicit slot values
    pub fn with_slots(class: ClassId, slots: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            class,
            slots: RwLock::new(slots),
        })
    }

    /// Runtime class
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Read a slot
    pub fn slot(&self, index: usize) -> Option<Value> {
        self.slots.read().get(index).cloned()
    }

    /// Write a slot
    pub fn set_slot(&self, index: usize, value: Value) -> ModelResult<()> {
        let mut slots = self.slots.write();
        let len = slots.len();
        match slots.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ModelError::IndexOutOfBounds { index, len }),
        }
    }

    /// Copy of all slot values
    pub fn slots(&self) -> Vec<Value> {
        self.slots.read().clone()
    }

    /// Number of slots
    pub fn slot_count(&self) -> usize {
        self.slots.read().len()
    }
}

/// Growable list
pub struct ListObject {
    class: ClassId,
    elements: RwLock<Vec<Value>>,
}

impl ListObject {
    /// Largest index a write may grow the list to
    pub const MAX_INDEX: usize = i32::MAX as usize;

    /// Empty `ArrayList`
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// `ArrayList` holding `elements`
    pub fn from_vec(elements: Vec<Value>) -> Self {
        Self::of_class(ClassId::ARRAY_LIST, elements)
    }

    /// List whose runtime class is a user subclass of `ArrayList`
    pub fn of_class(class: ClassId, elements: Vec<Value>) -> Self {
        Self {
            class,
            elements: RwLock::new(elements),
        }
    }

    /// Runtime class
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Get list length
    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    /// Check if list is empty
    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    /// Get element at index
    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.read().get(index).cloned()
    }

    /// Set element at index, padding with nulls when `index` is past the end
    ///
    /// Indexes above [`ListObject::MAX_INDEX`], or growth the allocator
    /// refuses, fail with `IndexOutOfBounds` and leave the list unchanged.
    pub fn set(&self, index: usize, value: Value) -> ModelResult<()> {
        let mut elements = self.elements.write();
        let len = elements.len();
        if index >= len {
            let out_of_bounds = ModelError::IndexOutOfBounds { index, len };
            if index > Self::MAX_INDEX {
                return Err(out_of_bounds);
            }
            let grow = index + 1 - len;
            if elements.try_reserve_exact(grow).is_err() {
                return Err(out_of_bounds);
            }
            elements.resize(index + 1, Value::Null);
        }
        elements[index] = value;
        Ok(())
    }

    /// Push element to end of list, returns new length
    pub fn push(&self, value: Value) -> usize {
        let mut elements = self.elements.write();
        elements.push(value);
        elements.len()
    }

    /// Copy of all elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.elements.read().clone()
    }
}

impl Default for ListObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-length array
pub struct ArrayObject {
    component: Type,
    elements: RwLock<Vec<Value>>,
}

impl ArrayObject {
    /// Array of `length` default values of `component`
    pub fn new(component: Type, length: usize) -> Self {
        let fill = Value::default_for(&component);
        Self {
            component,
            elements: RwLock::new(vec![fill; length]),
        }
    }

    /// Array holding `elements`
    pub fn from_vec(component: Type, elements: Vec<Value>) -> Self {
        Self {
            component,
            elements: RwLock::new(elements),
        }
    }

    /// Component type
    pub fn component(&self) -> &Type {
        &self.component
    }

    /// Get array length
    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    /// Check if array is empty
    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    /// Get element at index
    pub fn get(&self, index: usize) -> ModelResult<Value> {
        let elements = self.elements.read();
        elements.get(index).cloned().ok_or(ModelError::IndexOutOfBounds {
            index,
            len: elements.len(),
        })
    }

    /// Set element at index
    pub fn set(&self, index: usize, value: Value) -> ModelResult<()> {
        let mut elements = self.elements.write();
        let len = elements.len();
        match elements.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ModelError::IndexOutOfBounds { index, len }),
        }
    }

    /// Copy of all elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.elements.read().clone()
    }
}

/// Map key: hashes primitives, strings and enum constants by content and
/// references by identity
#[derive(Clone, Debug)]
pub struct MapKey(pub Value);

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::Short(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::Char(v) => v.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Enum { class, name } => {
                class.hash(state);
                name.hash(state);
            }
            Value::Object(o) => (Arc::as_ptr(o) as usize).hash(state),
            Value::List(o) => (Arc::as_ptr(o) as usize).hash(state),
            Value::Map(o) => (Arc::as_ptr(o) as usize).hash(state),
            Value::Array(o) => (Arc::as_ptr(o) as usize).hash(state),
            Value::Holder(h) => h.id().hash(state),
        }
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            // Bitwise so that a NaN key can be found again
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl Eq for MapKey {}

/// Keyed map
pub struct MapObject {
    class: ClassId,
    entries: RwLock<FxHashMap<MapKey, Value>>,
}

impl MapObject {
    /// Empty `HashMap`
    pub fn new() -> Self {
        Self::of_class(ClassId::HASH_MAP)
    }

    /// Empty map whose runtime class is a user subclass of `HashMap`
    pub fn of_class(class: ClassId) -> Self {
        Self {
            class,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Runtime class
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Get a value by key
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries.read().get(&MapKey(key.clone())).cloned()
    }

    /// Insert a key-value pair, returning the previous value
    pub fn insert(&self, key: Value, value: Value) -> Option<Value> {
        self.entries.write().insert(MapKey(key), value)
    }

    /// Remove a key
    pub fn remove(&self, key: &Value) -> Option<Value> {
        self.entries.write().remove(&MapKey(key.clone()))
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.read().contains_key(&MapKey(key.clone()))
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<Value> {
        self.entries.read().keys().map(|k| k.0.clone()).collect()
    }

    /// Get all entries as key-value pairs
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.0.clone(), v.clone()))
            .collect()
    }
}

impl Default for MapObject {
    fn default() -> Self {
        Self::new()
    }
}
