//! Subtyping (JLS 4.10) and assignment compatibility (JLS 5.2).
//!
//! Both relations are best-effort: raw types are treated leniently (unchecked
//! conversion is allowed) and [`Type::Unknown`] never takes part in either relation.

use crate::{ClassType, Type, TypeEnv, WildcardBound};

/// Whether `sub <: sup`.
#[must_use]
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let sub = sub.to_array_type();
    let sup = sup.to_array_type();

    if matches!(sub, Type::Unknown | Type::Void) || matches!(sup, Type::Unknown | Type::Void) {
        return false;
    }
    if sub == sup {
        return true;
    }

    match (&sub, &sup) {
        (Type::Null, sup) => sup.is_reference(),
        (_, Type::Intersection(parts)) => parts.iter().all(|part| is_subtype(env, &sub, part)),
        (Type::Intersection(parts), _) => parts.iter().any(|part| is_subtype(env, part, &sup)),
        (Type::TypeVar(id), _) => {
            let Some(tp) = env.type_param(*id) else {
                return false;
            };
            if tp.upper_bounds.is_empty() {
                let object = Type::class(env.well_known().object, vec![]);
                return is_subtype(env, &object, &sup);
            }
            tp.upper_bounds
                .iter()
                .any(|bound| is_subtype(env, bound, &sup))
        }
        (_, Type::TypeVar(id)) => env
            .type_param(*id)
            .and_then(|tp| tp.lower_bound.as_ref())
            .is_some_and(|lower| is_subtype(env, &sub, lower)),
        (Type::Array(_), Type::Class(ClassType { def, args })) => {
            let wk = env.well_known();
            args.is_empty() && (*def == wk.object || *def == wk.cloneable || *def == wk.serializable)
        }
        (Type::Array(sub_elem), Type::Array(sup_elem)) => {
            match (sub_elem.as_ref(), sup_elem.as_ref()) {
                (Type::Primitive(a), Type::Primitive(b)) => a == b,
                (a, b) if a.is_reference() && b.is_reference() => is_subtype(env, a, b),
                _ => false,
            }
        }
        (Type::Class(_), Type::Class(ClassType { def, args })) => {
            let Some(Type::Class(ClassType {
                args: found_args, ..
            })) = crate::instantiate_as_supertype(env, &sub, *def)
            else {
                return false;
            };
            // Raw on either side: unchecked conversion.
            if args.is_empty() || found_args.is_empty() {
                return true;
            }
            found_args.len() == args.len()
                && found_args
                    .iter()
                    .zip(args)
                    .all(|(found, expected)| contains(env, found, expected))
        }
        _ => false,
    }
}

/// Type argument containment (JLS 4.5.1): whether `arg` is contained by `target`.
fn contains(env: &dyn TypeEnv, arg: &Type, target: &Type) -> bool {
    if matches!(arg, Type::Unknown) || matches!(target, Type::Unknown) {
        // Recovery placeholders from partially resolved code; don't reject on them.
        return true;
    }
    let object = || Type::class(env.well_known().object, vec![]);
    match target {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(upper)) => match arg {
            Type::Wildcard(WildcardBound::Extends(inner)) => is_subtype(env, inner, upper),
            Type::Wildcard(WildcardBound::Unbounded) | Type::Wildcard(WildcardBound::Super(_)) => {
                is_subtype(env, &object(), upper)
            }
            other => is_subtype(env, other, upper),
        },
        Type::Wildcard(WildcardBound::Super(lower)) => match arg {
            Type::Wildcard(WildcardBound::Super(inner)) => is_subtype(env, lower, inner),
            Type::Wildcard(_) => false,
            other => is_subtype(env, lower, other),
        },
        other => arg == other,
    }
}

/// Whether a value of type `source` may be assigned to a variable of type `target`
/// (identity, widening primitive/reference, boxing and unboxing conversions).
#[must_use]
pub fn is_assignable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    let target = target.to_array_type();
    let source = source.to_array_type();

    match (&target, &source) {
        (Type::Unknown | Type::Void, _) | (_, Type::Unknown | Type::Void) => false,
        (Type::Primitive(t), Type::Primitive(s)) => s.widens_to(*t),
        (Type::Primitive(t), _) => unboxed(env, &source).is_some_and(|s| s.widens_to(*t)),
        (_, Type::Primitive(s)) => {
            let boxed = Type::class(env.well_known().boxed(*s), vec![]);
            is_subtype(env, &boxed, &target)
        }
        (_, Type::Null) => target.is_reference(),
        _ => is_subtype(env, &source, &target),
    }
}

fn unboxed(env: &dyn TypeEnv, ty: &Type) -> Option<crate::PrimitiveType> {
    let Type::Class(ClassType { def, .. }) = ty else {
        return None;
    };
    env.well_known().unboxed(*def)
}
