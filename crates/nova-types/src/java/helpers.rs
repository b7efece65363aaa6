use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    ClassDef, ClassId, ClassKind, ClassType, FieldDef, MethodDef, Type, TypeEnv, TypeVarId,
    WildcardBound,
};

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// Missing class metadata simply returns `None`.
///
/// Example: `ArrayList<String>` instantiated as `List` returns `List<String>`.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    let Type::Class(ClassType { def, args }) = ty else {
        return None;
    };

    let mut queue: VecDeque<Type> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
    queue.push_back(Type::class(*def, args.clone()));

    while let Some(current) = queue.pop_front() {
        let Type::Class(ClassType { def, args }) = current.clone() else {
            continue;
        };
        if !seen.insert((def, args.clone())) {
            continue;
        }

        if def == target {
            return Some(current);
        }

        let Some(class_def) = env.class(def) else {
            continue;
        };

        // A raw instantiation (`List` rather than `List<String>`) has raw supertypes.
        let raw = args.is_empty() && !class_def.type_params.is_empty();
        if raw {
            for sup in direct_supertypes(env, class_def) {
                if let Type::Class(ClassType { def, .. }) = sup {
                    queue.push_back(Type::class(def, vec![]));
                }
            }
            continue;
        }

        let mut subst: HashMap<TypeVarId, Type> =
            HashMap::with_capacity(class_def.type_params.len());
        for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
            subst.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
        }
        for sup in direct_supertypes(env, class_def) {
            queue.push_back(crate::substitute(&sup, &subst));
        }
    }

    None
}

fn direct_supertypes(env: &dyn TypeEnv, class_def: &ClassDef) -> Vec<Type> {
    let mut out: Vec<Type> = class_def.super_class.iter().cloned().collect();
    out.extend(class_def.interfaces.iter().cloned());
    // Every interface implicitly has `Object` as a supertype (JLS 4.10.2).
    if class_def.kind == ClassKind::Interface {
        out.push(Type::class(env.well_known().object, vec![]));
    }
    out
}

/// `id` followed by all of its transitive supertypes in breadth-first order, without duplicates.
#[must_use]
pub fn class_and_supertypes(env: &dyn TypeEnv, id: ClassId) -> Vec<ClassId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current);
        let Some(class_def) = env.class(current) else {
            continue;
        };
        for sup in direct_supertypes(env, class_def) {
            if let Type::Class(ClassType { def, .. }) = sup {
                queue.push_back(def);
            }
        }
    }
    out
}

/// The class declaration backing `ty`, if any.
///
/// Type variables resolve through their first class-typed bound; arrays, primitives and
/// other types have no declaration.
#[must_use]
pub fn resolve_class_in_type(env: &dyn TypeEnv, ty: &Type) -> Option<ClassId> {
    fn inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Option<ClassId> {
        match ty {
            Type::Class(ClassType { def, .. }) => env.class(*def).map(|_| *def),
            Type::TypeVar(id) => {
                if !seen.insert(*id) {
                    return None;
                }
                let tp = env.type_param(*id)?;
                tp.upper_bounds
                    .iter()
                    .find_map(|bound| inner(env, bound, seen))
            }
            _ => None,
        }
    }

    inner(env, ty, &mut HashSet::new())
}

/// Find a field named `name` in `class`, optionally searching all supertypes.
#[must_use]
pub fn find_field_by_name<'env>(
    env: &'env dyn TypeEnv,
    class: ClassId,
    name: &str,
    check_bases: bool,
) -> Option<&'env FieldDef> {
    let classes = if check_bases {
        class_and_supertypes(env, class)
    } else {
        vec![class]
    };
    classes
        .into_iter()
        .filter_map(move |id| env.class(id))
        .find_map(|def| def.fields.iter().find(|field| field.name == name))
}

/// All methods named `name` (any arity) declared in `class`, optionally including inherited ones.
#[must_use]
pub fn find_methods_by_name<'env>(
    env: &'env dyn TypeEnv,
    class: ClassId,
    name: &str,
    check_bases: bool,
) -> Vec<&'env MethodDef> {
    let classes = if check_bases {
        class_and_supertypes(env, class)
    } else {
        vec![class]
    };
    classes
        .into_iter()
        .filter_map(move |id| env.class(id))
        .flat_map(|def| def.methods.iter().filter(|method| method.name == name))
        .collect()
}

/// Whether every class and type parameter mentioned by `ty` still resolves in `env`.
#[must_use]
pub fn is_valid_type(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Void | Type::Null | Type::Primitive(_) | Type::Unknown => true,
        Type::Class(ClassType { def, args }) => {
            env.class(*def).is_some() && args.iter().all(|arg| is_valid_type(env, arg))
        }
        Type::Array(elem) | Type::Ellipsis(elem) => is_valid_type(env, elem),
        Type::TypeVar(id) => env.type_param(*id).is_some(),
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound)) => {
            is_valid_type(env, bound)
        }
        Type::Intersection(parts) => parts.iter().all(|part| is_valid_type(env, part)),
    }
}

/// Whether `ty` can be written down as Java source text at all.
///
/// Whether the type variables it mentions are in scope at a particular location is a separate
/// question, see [`all_type_vars_resolved`].
#[must_use]
pub fn is_denotable(env: &dyn TypeEnv, ty: &Type) -> bool {
    fn inner(env: &dyn TypeEnv, ty: &Type, as_type_arg: bool) -> bool {
        match ty {
            Type::Null | Type::Unknown | Type::Intersection(_) => false,
            Type::Void | Type::Primitive(_) => true,
            Type::Class(ClassType { def, args }) => {
                let Some(class_def) = env.class(*def) else {
                    return false;
                };
                class_def.kind != ClassKind::Anonymous
                    && args.iter().all(|arg| inner(env, arg, true))
            }
            Type::Array(elem) | Type::Ellipsis(elem) => inner(env, elem, false),
            Type::TypeVar(id) => env.type_param(*id).is_some_and(|tp| !tp.is_capture()),
            Type::Wildcard(WildcardBound::Unbounded) => as_type_arg,
            Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound)) => {
                as_type_arg && inner(env, bound, false)
            }
        }
    }

    inner(env, ty, false)
}

/// Type variables mentioned anywhere in `ty`, in first-occurrence order.
#[must_use]
pub fn type_vars_in(ty: &Type) -> Vec<TypeVarId> {
    fn collect(ty: &Type, out: &mut Vec<TypeVarId>) {
        match ty {
            Type::TypeVar(id) => {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            Type::Class(ClassType { args, .. }) => args.iter().for_each(|arg| collect(arg, out)),
            Type::Array(elem) | Type::Ellipsis(elem) => collect(elem, out),
            Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound)) => {
                collect(bound, out)
            }
            Type::Intersection(parts) => parts.iter().for_each(|part| collect(part, out)),
            Type::Void
            | Type::Null
            | Type::Primitive(_)
            | Type::Wildcard(WildcardBound::Unbounded)
            | Type::Unknown => {}
        }
    }

    let mut out = Vec::new();
    collect(ty, &mut out);
    out
}

/// Whether every type variable in `ty` satisfies `in_scope`.
#[must_use]
pub fn all_type_vars_resolved(ty: &Type, in_scope: impl Fn(TypeVarId) -> bool) -> bool {
    type_vars_in(ty).into_iter().all(in_scope)
}
