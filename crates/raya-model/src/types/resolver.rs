//! Generic ancestor binding
//!
//! Answers "what does `Foo`'s type parameter `T` hold, as seen from `Bar`?"
//! by walking the supertype edges from `Bar` up to `Foo` and substituting
//! type arguments along the way.
//!
//! ```text
//! class GenericRoot<T> { List<T> list; }
//! class Root extends GenericRoot<Person> {}
//!
//! resolve(Root, GenericRoot)            => [Person]
//! specialize(List<T>, GenericRoot, Root) => List<Person>
//! ```
//!
//! Bindings are keyed by `(declaring class, name)`, so `Map<K, V>` and an
//! unrelated `Pair<K, V>` on the same class never see each other's `K`.
//! Substitution is single-pass; a variable with no binding degrades to the
//! erasure of its first bound once resolution finishes.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::reflect::{ClassDecl, ClassId, ClassTable};

use super::ty::{Type, TypeVar, Wildcard};

/// Type variable bindings keyed by the declaring class and variable name
pub type Bindings = FxHashMap<TypeVar, Type>;

/// Resolves type arguments of generic ancestors
#[derive(Clone, Copy)]
pub struct TypeResolver<'a> {
    table: &'a ClassTable,
}

impl TypeResolver<'static> {
    /// Resolver over the process-wide class table
    pub fn global() -> Self {
        Self::new(ClassTable::global())
    }
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver over a class table
    pub fn new(table: &'a ClassTable) -> Self {
        Self { table }
    }

    /// Concrete type arguments of `ancestor` as seen from `concrete`
    ///
    /// Returns an empty list when the two are unrelated or when `concrete`
    /// says nothing about the ancestor's parameters (e.g. the raw ancestor).
    pub fn resolve(&self, concrete: &Type, ancestor: ClassId) -> Vec<Type> {
        self.resolve_in(concrete, ancestor, &Bindings::default())
    }

    /// Like [`resolve`](Self::resolve), with caller-supplied bindings for
    /// variables left open by `concrete` (e.g. constructor parameter context)
    pub fn resolve_in(&self, concrete: &Type, ancestor: ClassId, context: &Bindings) -> Vec<Type> {
        let Some(bindings) = self.bindings(concrete, ancestor, context) else {
            return Vec::new();
        };
        let Some(decl) = self.table.get(ancestor) else {
            return Vec::new();
        };

        let vars: Vec<TypeVar> = decl
            .type_params
            .iter()
            .map(|p| TypeVar::new(ancestor, p.name.clone()))
            .collect();
        if !vars.iter().any(|v| bindings.contains_key(v)) {
            return Vec::new();
        }

        vars.into_iter()
            .map(|var| match bindings.get(&var) {
                Some(bound) => self.finalize(bound),
                None => self.erase_var(&var),
            })
            .collect()
    }

    /// Type of a member declared in `declaring`, as seen from `from`
    ///
    /// The member's declared type may mention `declaring`'s type variables;
    /// they are replaced with what `from` binds them to, and anything left
    /// open degrades to its erasure.
    pub fn specialize(&self, declared: &Type, declaring: ClassId, from: &Type) -> Type {
        self.specialize_in(declared, declaring, from, &Bindings::default())
    }

    /// Like [`specialize`](Self::specialize) with caller-supplied bindings
    pub fn specialize_in(
        &self,
        declared: &Type,
        declaring: ClassId,
        from: &Type,
        context: &Bindings,
    ) -> Type {
        match self.bindings(from, declaring, context) {
            Some(bindings) => self.finalize(&substitute(declared, &bindings)),
            None => self.finalize(&substitute(declared, context)),
        }
    }

    /// Bindings accumulated on the way from `concrete` up to `ancestor`
    ///
    /// `None` when `ancestor` is not reachable.
    pub fn bindings(&self, concrete: &Type, ancestor: ClassId, context: &Bindings) -> Option<Bindings> {
        let concrete = match concrete {
            Type::Variable(_) | Type::Wildcard(_) => self.finalize(&substitute(concrete, context)),
            other => other.clone(),
        };
        let raw = concrete.raw_class()?;
        let path = self.find_path(raw, ancestor, &mut FxHashSet::default())?;

        let mut bindings = context.clone();
        if let Some(decl) = self.table.get(raw) {
            bind_params(&decl, concrete.args(), context, &mut bindings);
        }

        for edge in &path {
            let Some(edge_raw) = edge.raw_class() else {
                continue;
            };
            if let Some(decl) = self.table.get(edge_raw) {
                let args: Vec<Type> = edge.args().to_vec();
                let snapshot = bindings.clone();
                bind_params(&decl, &args, &snapshot, &mut bindings);
            }
        }
        Some(bindings)
    }

    /// Supertype edges leading from `from` to `target`
    ///
    /// Depth-first: the superclass edge is explored (with everything above
    /// it) before the interface edges, which are tried in declaration order.
    fn find_path(
        &self,
        from: ClassId,
        target: ClassId,
        visited: &mut FxHashSet<ClassId>,
    ) -> Option<Vec<Type>> {
        if from == target {
            return Some(Vec::new());
        }
        if !visited.insert(from) {
            return None;
        }
        let decl = self.table.get(from)?;
        for edge in decl.supertypes() {
            let Some(raw) = edge.raw_class() else {
                continue;
            };
            if let Some(mut rest) = self.find_path(raw, target, visited) {
                rest.insert(0, edge.clone());
                return Some(rest);
            }
        }
        None
    }

    /// Replace whatever is still open with its erasure
    ///
    /// Variables become the erasure of their first bound, wildcards their
    /// upper bound, both defaulting to `Object`.
    pub fn finalize(&self, ty: &Type) -> Type {
        match ty {
            Type::Class(_) => ty.clone(),
            Type::Parameterized { raw, args } => Type::Parameterized {
                raw: *raw,
                args: args.iter().map(|arg| self.finalize(arg)).collect(),
            },
            Type::Variable(var) => self.erase_var(var),
            Type::Wildcard(Wildcard { upper, .. }) => match upper {
                Some(upper) => self.finalize(upper),
                None => Type::Class(ClassId::OBJECT),
            },
            Type::Array(component) => Type::array(self.finalize(component)),
        }
    }

    /// Erasure: the raw class of a type, or an array of erased components
    pub fn erase(&self, ty: &Type) -> Type {
        match ty {
            Type::Class(_) => ty.clone(),
            Type::Parameterized { raw, .. } => Type::Class(*raw),
            Type::Variable(var) => self.erase_var(var),
            Type::Wildcard(Wildcard { upper, .. }) => match upper {
                Some(upper) => self.erase(upper),
                None => Type::Class(ClassId::OBJECT),
            },
            Type::Array(component) => Type::array(self.erase(component)),
        }
    }

    fn erase_var(&self, var: &TypeVar) -> Type {
        let mut seen = FxHashSet::default();
        let mut current = var.clone();
        loop {
            if !seen.insert(current.clone()) {
                return Type::Class(ClassId::OBJECT);
            }
            let bound = self
                .table
                .get(current.owner)
                .and_then(|decl| {
                    decl.type_params
                        .iter()
                        .find(|p| p.name == current.name)
                        .and_then(|p| p.bounds.first().cloned())
                });
            match bound {
                // `T extends U`: continue with U's bound
                Some(Type::Variable(next)) => current = next,
                Some(Type::Array(component)) => return Type::array(self.erase(&component)),
                Some(other) => return self.erase(&other),
                None => return Type::Class(ClassId::OBJECT),
            }
        }
    }

    /// The class, its superclass chain and all interfaces, bottom-up
    ///
    /// Each class appears once, at its first position in a depth-first walk
    /// that visits the superclass before the interfaces.
    pub fn collect_types(&self, class: ClassId) -> Vec<ClassId> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        self.collect_into(class, &mut order, &mut seen);
        order
    }

    fn collect_into(&self, class: ClassId, order: &mut Vec<ClassId>, seen: &mut FxHashSet<ClassId>) {
        if !seen.insert(class) {
            return;
        }
        order.push(class);
        let Some(decl) = self.table.get(class) else {
            return;
        };
        for edge in decl.supertypes() {
            if let Some(raw) = edge.raw_class() {
                self.collect_into(raw, order, seen);
            }
        }
    }

    /// Whether `from` is `to` or one of its subclasses or implementors
    ///
    /// Primitives are compared through their boxed forms.
    pub fn is_subclass(&self, from: ClassId, to: ClassId) -> bool {
        let (from, to) = (from.boxed(), to.boxed());
        from == to
            || to == ClassId::OBJECT
            || self.find_path(from, to, &mut FxHashSet::default()).is_some()
    }

    /// Whether a value of type `from` may be stored where `to` is declared
    pub fn is_assignable(&self, from: &Type, to: &Type) -> bool {
        match (self.erase(from), self.erase(to)) {
            (_, Type::Class(ClassId::OBJECT)) => true,
            (Type::Array(from), Type::Array(to)) => {
                if from.is_primitive() || to.is_primitive() {
                    from == to
                } else {
                    self.is_assignable(&from, &to)
                }
            }
            (Type::Class(from), Type::Class(to)) => self.is_subclass(from, to),
            _ => false,
        }
    }

    /// Look up a class declaration
    pub fn class(&self, id: ClassId) -> Option<Arc<ClassDecl>> {
        self.table.get(id)
    }
}

/// Bind `decl`'s parameters to `args`, substituting `scope` into each argument
fn bind_params(decl: &ClassDecl, args: &[Type], scope: &Bindings, into: &mut Bindings) {
    for (param, arg) in decl.type_params.iter().zip(args) {
        let var = TypeVar::new(decl.id, param.name.clone());
        let bound = substitute(arg, scope);
        // Binding a variable to itself carries no information
        if bound != Type::Variable(var.clone()) {
            into.insert(var, bound);
        }
    }
}

/// Single-pass substitution of bound variables
pub fn substitute(ty: &Type, bindings: &Bindings) -> Type {
    if bindings.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::Class(_) => ty.clone(),
        Type::Parameterized { raw, args } => Type::Parameterized {
            raw: *raw,
            args: args.iter().map(|arg| substitute(arg, bindings)).collect(),
        },
        Type::Variable(var) => bindings.get(var).cloned().unwrap_or_else(|| ty.clone()),
        Type::Wildcard(Wildcard { upper, lower }) => Type::Wildcard(Wildcard {
            upper: upper.as_ref().map(|t| Box::new(substitute(t, bindings))),
            lower: lower.as_ref().map(|t| Box::new(substitute(t, bindings))),
        }),
        Type::Array(component) => Type::array(substitute(component, bindings)),
    }
}
