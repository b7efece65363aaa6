//! A small Java world shared by the cast tests.
//!
//! ```java
//! package com.example;
//! import java.util.*;
//!
//! class Foo { void qux() {} }
//! class Bar { int count; void baz() {} }
//! class SubBar extends Bar {}
//! class Qux { void baz(int times) {} }
//! ```
//!
//! plus `java.util.List<E>`, `java.util.Map<K, V>`, `java.util.Map.Entry` and
//! `com.other.Widget` (not imported).
#![allow(dead_code)]

use nova_hir::{ExprId, ExprTree, ImportDecl, ImportScope, RootId};
use nova_types::{
    ClassDef, ClassId, ClassKind, FieldDef, MethodDef, PrimitiveType, Type, TypeEnv, TypeStore,
};

pub struct Fixture {
    pub store: TypeStore,
    pub list: ClassId,
    pub map: ClassId,
    pub entry: ClassId,
    pub foo: ClassId,
    pub bar: ClassId,
    pub sub_bar: ClassId,
    pub qux: ClassId,
    pub widget: ClassId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut store = TypeStore::with_minimal_jdk();
        let object = Type::class(store.well_known().object, vec![]);

        let e = store.add_type_param("E", vec![object.clone()]);
        let list = store.upsert_class(ClassDef {
            type_params: vec![e],
            ..ClassDef::new("java.util.List", ClassKind::Interface)
        });
        let k = store.add_type_param("K", vec![object.clone()]);
        let v = store.add_type_param("V", vec![object.clone()]);
        let map = store.upsert_class(ClassDef {
            type_params: vec![k, v],
            ..ClassDef::new("java.util.Map", ClassKind::Interface)
        });
        let entry = store.upsert_class(ClassDef::new("java.util.Map$Entry", ClassKind::Interface));

        let foo = store.upsert_class(ClassDef {
            super_class: Some(object.clone()),
            methods: vec![MethodDef::new("qux", vec![], Type::Void)],
            ..ClassDef::new("com.example.Foo", ClassKind::Class)
        });
        let bar = store.upsert_class(ClassDef {
            super_class: Some(object.clone()),
            fields: vec![FieldDef {
                name: "count".to_string(),
                ty: Type::Primitive(PrimitiveType::Int),
                is_static: false,
                is_final: false,
            }],
            methods: vec![MethodDef::new("baz", vec![], Type::Void)],
            ..ClassDef::new("com.example.Bar", ClassKind::Class)
        });
        let sub_bar = store.upsert_class(ClassDef {
            super_class: Some(Type::class(bar, vec![])),
            ..ClassDef::new("com.example.SubBar", ClassKind::Class)
        });
        let qux = store.upsert_class(ClassDef {
            super_class: Some(object.clone()),
            methods: vec![MethodDef::new(
                "baz",
                vec![Type::Primitive(PrimitiveType::Int)],
                Type::Void,
            )],
            ..ClassDef::new("com.example.Qux", ClassKind::Class)
        });
        let widget = store.upsert_class(ClassDef {
            super_class: Some(object),
            ..ClassDef::new("com.other.Widget", ClassKind::Class)
        });

        Self {
            store,
            list,
            map,
            entry,
            foo,
            bar,
            sub_bar,
            qux,
            widget,
        }
    }

    pub fn class(&self, id: ClassId) -> Type {
        Type::class(id, vec![])
    }

    pub fn object(&self) -> Type {
        self.class(self.store.well_known().object)
    }

    pub fn string(&self) -> Type {
        self.class(self.store.well_known().string)
    }

    pub fn integer(&self) -> Type {
        self.class(self.store.well_known().integer)
    }

    pub fn number(&self) -> Type {
        self.class(self.store.well_known().number)
    }

    /// An empty tree for a compilation unit in `com.example` importing `java.util.*`.
    pub fn tree(&self) -> ExprTree {
        ExprTree::new(
            ImportScope::new(Some("com.example")).with_import(ImportDecl::TypeStar {
                package: "java.util".to_string(),
            }),
        )
    }
}

/// A name reference with a recorded type.
pub fn typed_name(tree: &mut ExprTree, name: &str, ty: Option<Type>) -> ExprId {
    let id = tree.name(name);
    if let Some(ty) = ty {
        tree.set_type(id, ty).expect("fresh node");
    }
    id
}

pub fn statement(tree: &mut ExprTree, expr: ExprId) -> RootId {
    tree.add_root(expr).expect("detached statement expression")
}

/// `target = value;` with `value` typed `value_ty`. Returns the statement root and `value`.
pub fn assignment(
    tree: &mut ExprTree,
    target: &str,
    value: &str,
    value_ty: Option<Type>,
) -> (RootId, ExprId) {
    let target = tree.name(target);
    let value = typed_name(tree, value, value_ty);
    let assign = tree.assign(target, value).unwrap();
    (statement(tree, assign), value)
}

/// `target = cond ? a : b;` with the given branch types. Returns the statement root and the
/// conditional.
pub fn conditional_assignment(
    tree: &mut ExprTree,
    then_ty: Option<Type>,
    else_ty: Option<Type>,
) -> (RootId, ExprId) {
    let target = tree.name("x");
    let cond = typed_name(tree, "cond", Some(Type::Primitive(PrimitiveType::Boolean)));
    let a = typed_name(tree, "a", then_ty);
    let b = typed_name(tree, "b", else_ty);
    let conditional = tree.conditional(cond, a, b).unwrap();
    let assign = tree.assign(target, conditional).unwrap();
    (statement(tree, assign), conditional)
}

pub fn render_root(tree: &ExprTree, root: RootId) -> String {
    tree.render(tree.root(root).expect("root is occupied"))
}
