//! Process-wide class table
//!
//! Every declared class lives here for the rest of the process. Ids are
//! reserved first (so a class can mention itself while being declared) and
//! published once; a published declaration never changes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::error::{ModelError, ModelResult};
use crate::types::Type;

use super::class::{ClassDecl, ClassKind, TypeParam};
use super::member::Modifiers;
use super::ClassId;

/// Module name of the built-in classes
pub const CORE_MODULE: &str = "core";

static CLASSES: Lazy<ClassTable> = Lazy::new(ClassTable::with_builtins);

/// Registry of class declarations
pub struct ClassTable {
    /// Declarations indexed by id
    classes: DashMap<ClassId, Arc<ClassDecl>>,
    /// Name to id mapping (first declaration wins)
    names: DashMap<Arc<str>, ClassId>,
    /// Next id to reserve
    next_id: AtomicU32,
}

impl ClassTable {
    /// The process-wide table
    pub fn global() -> &'static ClassTable {
        &CLASSES
    }

    /// Create a table holding only the built-in classes
    pub fn with_builtins() -> Self {
        let table = Self {
            classes: DashMap::new(),
            names: DashMap::new(),
            next_id: AtomicU32::new(ClassId::FIRST_USER.index()),
        };
        for decl in builtin_classes() {
            table.insert(decl);
        }
        table
    }

    fn insert(&self, decl: ClassDecl) {
        let id = decl.id;
        self.names.entry(decl.name.clone()).or_insert(id);
        self.classes.insert(id, Arc::new(decl));
    }

    /// Reserve a fresh class id
    pub(crate) fn reserve(&self) -> ClassId {
        ClassId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Publish a finished declaration under its reserved id
    pub(crate) fn publish(&self, decl: ClassDecl) -> ModelResult<ClassId> {
        let id = decl.id;
        if id.is_builtin() || id.index() >= self.next_id.load(Ordering::Relaxed) {
            return Err(ModelError::InvalidDeclaration {
                class: decl.name.to_string(),
                message: format!("class id {} was not reserved", id.index()),
            });
        }
        match self.classes.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(ModelError::InvalidDeclaration {
                class: decl.name.to_string(),
                message: "class is already registered".to_string(),
            }),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                self.names.entry(decl.name.clone()).or_insert(id);
                slot.insert(Arc::new(decl));
                Ok(id)
            }
        }
    }

    /// Get class by id
    pub fn get(&self, id: ClassId) -> Option<Arc<ClassDecl>> {
        self.classes.get(&id).map(|entry| entry.value().clone())
    }

    /// Get class by id, failing for unknown ids
    pub fn lookup(&self, id: ClassId) -> ModelResult<Arc<ClassDecl>> {
        self.get(id)
            .ok_or_else(|| ModelError::unknown_class(format!("#{}", id.index())))
    }

    /// Find a class id by name
    pub fn find(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).map(|entry| *entry.value())
    }

    /// Check if a class is registered
    pub fn contains(&self, id: ClassId) -> bool {
        self.classes.contains_key(&id)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn builtin(id: ClassId, name: &str, kind: ClassKind) -> ClassDecl {
    ClassDecl {
        id,
        name: Arc::from(name),
        module: Arc::from(CORE_MODULE),
        kind,
        modifiers: Modifiers::PUBLIC,
        type_params: Vec::new(),
        superclass: match kind {
            ClassKind::Primitive | ClassKind::Interface => None,
            _ if id == ClassId::OBJECT => None,
            _ => Some(Type::Class(ClassId::OBJECT)),
        },
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        components: Vec::new(),
        constants: Vec::new(),
        constructor: None,
        annotations: Vec::new(),
        slot_count: 0,
    }
}

fn generic(mut decl: ClassDecl, params: &[&str]) -> ClassDecl {
    decl.type_params = params.iter().map(|p| TypeParam::new(*p)).collect();
    decl
}

fn comparable_of(ty: Type) -> Type {
    Type::parameterized(ClassId::COMPARABLE, vec![ty])
}

fn builtin_classes() -> Vec<ClassDecl> {
    let mut classes = vec![builtin(ClassId::OBJECT, "Object", ClassKind::Class)];

    let primitives = [
        (ClassId::BOOLEAN, "bool", ClassId::BOXED_BOOLEAN, "Bool"),
        (ClassId::BYTE, "byte", ClassId::BOXED_BYTE, "Byte"),
        (ClassId::SHORT, "short", ClassId::BOXED_SHORT, "Short"),
        (ClassId::INT, "int", ClassId::BOXED_INT, "Int"),
        (ClassId::LONG, "long", ClassId::BOXED_LONG, "Long"),
        (ClassId::FLOAT, "float", ClassId::BOXED_FLOAT, "Float"),
        (ClassId::DOUBLE, "double", ClassId::BOXED_DOUBLE, "Double"),
        (ClassId::CHAR, "char", ClassId::BOXED_CHAR, "Char"),
    ];
    for (primitive, primitive_name, boxed, boxed_name) in primitives {
        classes.push(builtin(primitive, primitive_name, ClassKind::Primitive));

        let mut decl = builtin(boxed, boxed_name, ClassKind::Atomic);
        if boxed.primitive().is_some_and(|p| p.is_numeric()) {
            decl.superclass = Some(Type::Class(ClassId::NUMBER));
        }
        decl.interfaces = vec![comparable_of(Type::Class(boxed))];
        decl.modifiers = Modifiers::PUBLIC | Modifiers::FINAL;
        classes.push(decl);
    }

    let mut string = builtin(ClassId::STRING, "String", ClassKind::Atomic);
    string.interfaces = vec![comparable_of(Type::Class(ClassId::STRING))];
    string.modifiers = Modifiers::PUBLIC | Modifiers::FINAL;
    classes.push(string);

    let mut number = builtin(ClassId::NUMBER, "Number", ClassKind::Atomic);
    number.modifiers = Modifiers::PUBLIC | Modifiers::ABSTRACT;
    classes.push(number);

    classes.push(generic(
        builtin(ClassId::COMPARABLE, "Comparable", ClassKind::Interface),
        &["T"],
    ));
    classes.push(generic(
        builtin(ClassId::COLLECTION, "Collection", ClassKind::Interface),
        &["E"],
    ));

    let mut list = generic(builtin(ClassId::LIST, "List", ClassKind::Interface), &["E"]);
    list.interfaces = vec![Type::parameterized(
        ClassId::COLLECTION,
        vec![Type::var(ClassId::LIST, "E")],
    )];
    classes.push(list);

    let mut array_list = generic(builtin(ClassId::ARRAY_LIST, "ArrayList", ClassKind::Class), &["E"]);
    array_list.interfaces = vec![Type::parameterized(
        ClassId::LIST,
        vec![Type::var(ClassId::ARRAY_LIST, "E")],
    )];
    classes.push(array_list);

    classes.push(generic(
        builtin(ClassId::MAP, "Map", ClassKind::Interface),
        &["K", "V"],
    ));

    let mut hash_map = generic(builtin(ClassId::HASH_MAP, "HashMap", ClassKind::Class), &["K", "V"]);
    hash_map.interfaces = vec![Type::parameterized(
        ClassId::MAP,
        vec![
            Type::var(ClassId::HASH_MAP, "K"),
            Type::var(ClassId::HASH_MAP, "V"),
        ],
    )];
    classes.push(hash_map);

    classes.push(generic(
        builtin(ClassId::VARIABLE, "Variable", ClassKind::Class),
        &["V"],
    ));

    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let table = ClassTable::with_builtins();
        assert_eq!(table.find("Object"), Some(ClassId::OBJECT));
        assert_eq!(table.find("int"), Some(ClassId::INT));
        assert_eq!(table.find("Int"), Some(ClassId::BOXED_INT));
        assert_eq!(table.find("Variable"), Some(ClassId::VARIABLE));
        assert!(table.get(ClassId::LIST).unwrap().is_interface());
        assert!(table.get(ClassId::OBJECT).unwrap().superclass.is_none());
        assert!(table.get(ClassId::INT).unwrap().superclass.is_none());
    }

    #[test]
    fn test_boxed_numerics_extend_number() {
        let table = ClassTable::with_builtins();
        let long = table.get(ClassId::BOXED_LONG).unwrap();
        assert_eq!(long.superclass, Some(Type::Class(ClassId::NUMBER)));
        let boolean = table.get(ClassId::BOXED_BOOLEAN).unwrap();
        assert_eq!(boolean.superclass, Some(Type::Class(ClassId::OBJECT)));
    }

    #[test]
    fn test_reserve_and_publish() {
        let table = ClassTable::with_builtins();
        let id = table.reserve();
        assert!(!id.is_builtin());
        assert!(!table.contains(id));

        let mut decl = builtin(id, "Sample", ClassKind::Class);
        decl.module = Arc::from("app");
        assert_eq!(table.publish(decl.clone()).unwrap(), id);
        assert!(table.contains(id));
        assert_eq!(table.find("Sample"), Some(id));

        // Publishing twice is rejected
        assert!(table.publish(decl).is_err());
    }

    #[test]
    fn test_publish_unreserved_id_rejected() {
        let table = ClassTable::with_builtins();
        let decl = builtin(ClassId::from_raw(10_000), "Ghost", ClassKind::Class);
        assert!(table.publish(decl).is_err());
        assert!(table.lookup(ClassId::from_raw(10_000)).is_err());
    }
}
