//! Property discovery
//!
//! Turns a finalized [`Type`] into a [`Model`]. Containers and atomic
//! classes are recognized first; records expose their components; every
//! other class is scanned for accessor methods and then for fields, with
//! fields taking precedence over method pairs of the same name.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::reflect::{
    merge_annotations, Annotation, ClassDecl, ClassId, ClassTable, FieldDecl, MethodDecl,
    Modifiers,
};
use crate::types::{Type, TypeResolver};

use super::accessor;
use super::container::is_decodable;
use super::property::{Access, AccessorKind, Property};
use super::{Model, ModelKind};

/// Build the model of a finalized type
pub(crate) fn build(ty: &Type) -> ModelResult<Model> {
    let resolver = TypeResolver::global();

    if let Type::Array(component) = ty {
        let component = resolver.finalize(component);
        return Ok(Model::new(ty.clone(), None, ModelKind::Array { component }, Vec::new()));
    }

    let raw = ty
        .raw_class()
        .ok_or_else(|| ModelError::reflection(format!("cannot model open type `{}`", ty)))?;
    let decl = ClassTable::global().lookup(raw)?;

    if decl.is_atomic() {
        return Ok(Model::new(ty.clone(), Some(decl), ModelKind::Atomic, Vec::new()));
    }

    let object = Type::Class(ClassId::OBJECT);
    if resolver.is_subclass(raw, ClassId::LIST) {
        let element = resolver
            .resolve(ty, ClassId::LIST)
            .into_iter()
            .next()
            .unwrap_or(object);
        return Ok(Model::new(ty.clone(), Some(decl), ModelKind::List { element }, Vec::new()));
    }
    if resolver.is_subclass(raw, ClassId::MAP) {
        let mut args = resolver.resolve(ty, ClassId::MAP).into_iter();
        let key = args.next().unwrap_or_else(|| object.clone());
        let value = args.next().unwrap_or(object);
        let keyed = is_decodable(&key);
        return Ok(Model::new(
            ty.clone(),
            Some(decl),
            ModelKind::Map { key, value, keyed },
            Vec::new(),
        ));
    }

    if decl.is_record() {
        let properties = record_properties(ty, &decl, &resolver);
        return Ok(Model::new(
            ty.clone(),
            Some(decl),
            ModelKind::Object { record: true },
            properties,
        ));
    }

    let mut properties = method_properties(ty, raw, &resolver);
    for (name, property) in field_properties(ty, &decl, &resolver) {
        properties.insert(name, property);
    }
    Ok(Model::new(
        ty.clone(),
        Some(decl),
        ModelKind::Object { record: false },
        properties.into_values().collect(),
    ))
}

fn record_properties(ty: &Type, decl: &ClassDecl, resolver: &TypeResolver<'_>) -> Vec<Property> {
    let components: Arc<[_]> = decl.components.iter().cloned().collect();
    components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            let getter = accessor::component_getter(component);
            let setter = accessor::component_setter(
                decl.id,
                components.clone(),
                index,
                decl.constructor.clone(),
            );
            Property::new(
                component.name.clone(),
                resolver.specialize(&component.ty, decl.id, ty),
                AccessorKind::RecordComponent,
                decl.id,
                Access::Bound {
                    getter: Some(getter),
                    setter: Some(setter),
                    observer: None,
                },
            )
            .with_annotations(component.annotations.clone(), false)
        })
        .collect()
}

/// An accessor method seen during the scan, with annotations merged from
/// the methods it overrides
struct Candidate {
    method: MethodDecl,
    params: Vec<Type>,
    annotations: Vec<Annotation>,
}

impl Candidate {
    /// Same-signature methods only override when neither side is private
    fn overrides(&self, method: &MethodDecl) -> bool {
        !self.method.modifiers.is_private() && !method.modifiers.is_private()
    }
}

/// Every accessor-shaped method reachable from `raw`, narrowest first.
/// Private methods only count when `@Managed`.
fn scan_methods(ty: &Type, raw: ClassId, resolver: &TypeResolver<'_>) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();

    for class in resolver.collect_types(raw) {
        let Some(decl) = resolver.class(class) else {
            continue;
        };
        for method in &decl.methods {
            if method.is_hidden() || (method.modifiers.is_private() && class != raw) {
                continue;
            }
            // Private accessors need `@Managed`
            if method.modifiers.is_private() && !is_managed(&method.annotations) {
                continue;
            }
            if accessor_name(method).is_none() {
                continue;
            }
            let params: Vec<Type> = method
                .params
                .iter()
                .map(|p| resolver.specialize(p, class, ty))
                .collect();

            match candidates
                .iter_mut()
                .find(|c| c.method.name == method.name && c.params == params)
            {
                Some(existing) => {
                    if existing.overrides(method) {
                        merge_annotations(&mut existing.annotations, &method.annotations);
                    }
                }
                None => candidates.push(Candidate {
                    annotations: method.annotations.clone(),
                    method: method.clone(),
                    params,
                }),
            }
        }
    }
    candidates
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Getter,
    Setter,
}

/// Property name and role of an accessor method
fn accessor_name(method: &MethodDecl) -> Option<(String, Role)> {
    let name = &*method.name;
    let (prefix, role) = match (&method.returns, method.params.len()) {
        (Some(returns), 0) => {
            if name.starts_with("is") && is_boolean(returns) {
                ("is", Role::Getter)
            } else {
                ("get", Role::Getter)
            }
        }
        (None, 1) => ("set", Role::Setter),
        _ => return None,
    };
    let rest = name.strip_prefix(prefix)?;
    let first = rest.chars().next()?;
    if first.is_lowercase() {
        return None;
    }
    Some((decapitalize(rest), role))
}

fn is_boolean(ty: &Type) -> bool {
    matches!(ty, Type::Class(id) if *id == ClassId::BOOLEAN || *id == ClassId::BOXED_BOOLEAN)
}

/// `Name` -> `name`, but `URL` stays `URL`
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if a.is_uppercase() && b.is_uppercase() => name.to_string(),
        (Some(a), _) => a.to_lowercase().chain(name[a.len_utf8()..].chars()).collect(),
        (None, _) => String::new(),
    }
}

fn is_managed(annotations: &[Annotation]) -> bool {
    annotations
        .iter()
        .any(|a| matches!(a, Annotation::Managed { .. }))
}

fn managed_name(annotations: &[Annotation]) -> Option<Arc<str>> {
    annotations.iter().find_map(|a| match a {
        Annotation::Managed { name: Some(name) } => Some(name.clone()),
        _ => None,
    })
}

fn method_properties(
    ty: &Type,
    raw: ClassId,
    resolver: &TypeResolver<'_>,
) -> FxHashMap<Arc<str>, Property> {
    // Pairs keyed by derived name, in discovery order
    let mut names: Vec<String> = Vec::new();
    let mut pairs: FxHashMap<String, [Option<(Candidate, Type)>; 2]> = FxHashMap::default();

    for candidate in scan_methods(ty, raw, resolver) {
        let Some((name, role)) = accessor_name(&candidate.method) else {
            continue;
        };
        let declared = match role {
            Role::Getter => candidate.method.returns.clone(),
            Role::Setter => candidate.method.params.first().cloned(),
        };
        let Some(declared) = declared else {
            continue;
        };
        let value_ty = resolver.specialize(&declared, candidate.method.declaring, ty);
        let slot = match role {
            Role::Getter => 0,
            Role::Setter => 1,
        };
        let pair = pairs.entry(name.clone()).or_insert_with(|| {
            names.push(name.clone());
            [None, None]
        });
        // Narrowest declaration wins
        if pair[slot].is_none() {
            pair[slot] = Some((candidate, value_ty));
        }
    }

    let mut properties = FxHashMap::default();
    for name in names {
        let Some([getter, setter]) = pairs.remove(&name) else {
            continue;
        };
        // Abstract accessors have nothing to call
        let getter = getter.filter(|(c, _)| c.method.body.is_some());
        let mut setter = setter.filter(|(c, _)| c.method.body.is_some());

        let incompatible = match (&getter, &setter) {
            (Some((_, getter_ty)), Some((_, setter_ty))) => {
                let incompatible = !resolver.is_assignable(getter_ty, setter_ty);
                if incompatible {
                    debug!(
                        property = %name,
                        getter = %getter_ty,
                        setter = %setter_ty,
                        "dropping setter with incompatible type"
                    );
                }
                incompatible
            }
            _ => false,
        };
        if incompatible {
            setter = None;
        }

        let (value_ty, declaring) = match (&getter, &setter) {
            (Some((c, t)), _) | (None, Some((c, t))) => (t.clone(), c.method.declaring),
            (None, None) => continue,
        };

        let mut annotations = Vec::new();
        if let Some((c, _)) = &getter {
            merge_annotations(&mut annotations, &c.annotations);
        }
        if let Some((c, _)) = &setter {
            merge_annotations(&mut annotations, &c.annotations);
        }
        let name: Arc<str> = managed_name(&annotations).unwrap_or_else(|| Arc::from(name));

        let property = Property::new(
            name.clone(),
            value_ty,
            AccessorKind::MethodPair,
            declaring,
            Access::Bound {
                getter: getter.map(|(c, _)| accessor::method_getter(c.method)),
                setter: setter.map(|(c, _)| accessor::method_setter(c.method)),
                observer: None,
            },
        )
        .with_annotations(annotations, false);
        properties.insert(name, property);
    }
    properties
}

fn is_eligible(field: &FieldDecl) -> bool {
    !field.modifiers.intersects(Modifiers::STATIC | Modifiers::NATIVE)
        && (field.modifiers.is_public() || field.has_annotation("Managed"))
}

fn field_properties(
    ty: &Type,
    decl: &Arc<ClassDecl>,
    resolver: &TypeResolver<'_>,
) -> Vec<(Arc<str>, Property)> {
    let mut claimed: FxHashSet<Arc<str>> = FxHashSet::default();
    let mut properties = Vec::new();

    // Walk the superclass chain; subclass fields shadow superclass fields
    let mut current = Some(decl.clone());
    while let Some(class) = current {
        for field in &class.fields {
            if !is_eligible(field) {
                continue;
            }
            let Some(slot) = field.slot else {
                continue;
            };
            let field_ty = resolver.specialize(&field.ty, class.id, ty);
            let holder = field_ty
                .raw_class()
                .is_some_and(|raw| resolver.is_subclass(raw, ClassId::VARIABLE));
            if field.modifiers.is_final() && !holder {
                continue;
            }

            let name = managed_name(&field.annotations).unwrap_or_else(|| field.name.clone());
            if !claimed.insert(name.clone()) {
                continue;
            }

            let public = field.modifiers.is_public();
            let property = if holder {
                let content = resolver
                    .resolve(&field_ty, ClassId::VARIABLE)
                    .into_iter()
                    .next()
                    .unwrap_or(Type::Class(ClassId::OBJECT));
                Property::new(
                    name.clone(),
                    content,
                    AccessorKind::Holder,
                    class.id,
                    Access::Bound {
                        getter: Some(accessor::holder_getter(name.clone(), slot, public)),
                        setter: Some(accessor::holder_setter(name.clone(), slot, public)),
                        observer: Some(accessor::holder_observer(name.clone(), slot, public)),
                    },
                )
            } else {
                Property::new(
                    name.clone(),
                    field_ty,
                    AccessorKind::Field,
                    class.id,
                    Access::Bound {
                        getter: Some(accessor::field_getter(name.clone(), slot, public)),
                        setter: Some(accessor::field_setter(name.clone(), slot, public)),
                        observer: None,
                    },
                )
            };
            properties.push((
                name,
                property.with_annotations(field.annotations.clone(), field.modifiers.is_transient()),
            ));
        }

        current = class
            .superclass
            .as_ref()
            .and_then(Type::raw_class)
            .and_then(|raw| resolver.class(raw));
    }
    properties
}
