use nova_hir::{BinaryOp, ExprKind, TypeRef};
use nova_ide::{add_type_cast, create_cast_expression, CastAction, CastError, CastFixConfig};
use nova_types::Type;
use pretty_assertions::assert_eq;

use crate::cast_fixture::{assignment, render_root, statement, typed_name, Fixture};

#[test]
fn casts_expression_in_place() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (root, o) = assignment(&mut tree, "s", "o", Some(fx.object()));

    let cast = add_type_cast(&mut tree, &fx.store, o, &fx.string(), &CastFixConfig::default())
        .expect("cast inserted");

    assert_eq!(render_root(&tree, root), "s = (String) o");
    assert_eq!(
        tree.kind(cast),
        &ExprKind::Cast {
            ty: TypeRef::new(fx.string(), "String"),
            operand: Some(o),
            spaced: true,
        }
    );
    assert_eq!(tree.parent(o), Some(cast));
    assert_eq!(tree.ty(cast), Some(fx.string()));
    tree.validate().unwrap();
}

#[test]
fn cast_operand_is_the_deparenthesized_expression() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let a = typed_name(&mut tree, "a", Some(fx.integer()));
    let b = typed_name(&mut tree, "b", Some(fx.integer()));
    let sum = tree.binary(BinaryOp::Add, a, b).unwrap();
    let inner = tree.paren(Some(sum)).unwrap();
    let outer = tree.paren(Some(inner)).unwrap();
    let call = tree.method_call(None, "f", vec![outer]).unwrap();
    let root = statement(&mut tree, call);

    let cast = add_type_cast(
        &mut tree,
        &fx.store,
        outer,
        &fx.integer(),
        &CastFixConfig::default(),
    )
    .unwrap();

    assert_eq!(render_root(&tree, root), "f((Integer) (a + b))");
    assert_eq!(tree.deparenthesize(cast), Some(cast));
    let ExprKind::Cast { operand, .. } = tree.kind(cast) else {
        panic!("expected a cast");
    };
    assert_eq!(*operand, Some(sum));
    assert!(!tree.is_attached(outer));
    tree.validate().unwrap();
}

#[test]
fn compacting_after_a_cast_drops_the_spent_nodes() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let a = typed_name(&mut tree, "a", Some(fx.integer()));
    let b = typed_name(&mut tree, "b", Some(fx.integer()));
    let sum = tree.binary(BinaryOp::Add, a, b).unwrap();
    let paren = tree.paren(Some(sum)).unwrap();
    let call = tree.method_call(None, "f", vec![paren]).unwrap();
    let root = statement(&mut tree, call);

    let cast = add_type_cast(
        &mut tree,
        &fx.store,
        paren,
        &fx.integer(),
        &CastFixConfig::default(),
    )
    .unwrap();
    // The old parentheses and the cast's operand placeholder.
    let live = tree.len() - 2;

    let remap = tree.compact();

    assert_eq!(tree.len(), live);
    assert!(!remap.contains_key(&paren));
    assert_eq!(tree.parent(remap[&sum]), Some(remap[&cast]));
    assert_eq!(render_root(&tree, root), "f((Integer) (a + b))");
    tree.validate().unwrap();
}

#[test]
fn cast_used_as_receiver_is_parenthesized() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let o = typed_name(&mut tree, "o", Some(fx.object()));
    let call = tree.method_call(Some(o), "length", vec![]).unwrap();
    let root = statement(&mut tree, call);

    add_type_cast(&mut tree, &fx.store, o, &fx.string(), &CastFixConfig::default()).unwrap();

    assert_eq!(render_root(&tree, root), "((String) o).length()");
}

#[test]
fn ellipsis_type_casts_like_its_array_type() {
    let fx = Fixture::new();
    let build = || {
        let mut tree = fx.tree();
        let (root, args) = assignment(&mut tree, "values", "args", Some(fx.object()));
        (tree, root, args)
    };

    let (mut with_ellipsis, root, args) = build();
    add_type_cast(
        &mut with_ellipsis,
        &fx.store,
        args,
        &Type::ellipsis(fx.string()),
        &CastFixConfig::default(),
    )
    .unwrap();

    let (mut with_array, _, args) = build();
    add_type_cast(
        &mut with_array,
        &fx.store,
        args,
        &Type::array(fx.string()),
        &CastFixConfig::default(),
    )
    .unwrap();

    assert_eq!(with_ellipsis, with_array);
    assert_eq!(render_root(&with_ellipsis, root), "values = (String[]) args");
}

#[test]
fn null_type_is_rejected_without_mutation() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, o) = assignment(&mut tree, "s", "o", Some(fx.object()));
    let before = tree.clone();

    let result = add_type_cast(&mut tree, &fx.store, o, &Type::Null, &CastFixConfig::default());

    assert_eq!(result, Err(CastError::NoOpCast));
    assert_eq!(tree, before);
}

#[test]
fn malformed_input_is_rejected_without_mutation() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let empty = tree.paren(None).unwrap();
    statement(&mut tree, empty);
    let detached = tree.name("o");
    let before = tree.clone();

    for original in [empty, detached] {
        let result = add_type_cast(
            &mut tree,
            &fx.store,
            original,
            &fx.string(),
            &CastFixConfig::default(),
        );
        assert_eq!(result, Err(CastError::MalformedInput));
        assert_eq!(tree, before);
    }
}

#[test]
fn type_text_is_shortened_against_imports() {
    let fx = Fixture::new();
    let list_of_string = Type::class(fx.list, vec![fx.string()]);
    let map = Type::class(fx.map, vec![fx.string(), fx.integer()]);

    let cases = [
        (list_of_string.clone(), CastFixConfig::default(), "(List<String>) o"),
        (
            Type::class(fx.entry, vec![]),
            CastFixConfig::default(),
            "(Map.Entry) o",
        ),
        (fx.class(fx.foo), CastFixConfig::default(), "(Foo) o"),
        (
            fx.class(fx.widget),
            CastFixConfig::default(),
            "(com.other.Widget) o",
        ),
        (
            list_of_string,
            CastFixConfig {
                shorten_class_references: false,
                ..CastFixConfig::default()
            },
            "(java.util.List<java.lang.String>) o",
        ),
        (
            map.clone(),
            CastFixConfig {
                space_after_comma_in_type_args: false,
                ..CastFixConfig::default()
            },
            "(Map<String,Integer>) o",
        ),
        (
            map,
            CastFixConfig {
                space_after_type_cast: false,
                ..CastFixConfig::default()
            },
            "(Map<String, Integer>)o",
        ),
    ];

    for (ty, config, expected) in cases {
        let mut tree = fx.tree();
        let o = typed_name(&mut tree, "o", Some(fx.object()));
        let root = statement(&mut tree, o);
        add_type_cast(&mut tree, &fx.store, o, &ty, &config).unwrap();
        assert_eq!(render_root(&tree, root), expected);
    }
}

#[test]
fn create_cast_expression_leaves_the_tree_alone() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (root, o) = assignment(&mut tree, "s", "o", Some(fx.object()));
    let assign = tree.root(root).unwrap();

    let cast = create_cast_expression(
        &mut tree,
        &fx.store,
        o,
        &fx.string(),
        &CastFixConfig::default(),
    )
    .unwrap();

    assert_eq!(tree.render(cast), "(String) o");
    assert_eq!(tree.parent_slot(cast), None);
    assert_eq!(tree.root(root), Some(assign));
    assert_eq!(tree.parent(o), Some(assign));
    assert_eq!(render_root(&tree, root), "s = o");
    tree.validate().unwrap();
}

#[test]
fn create_cast_expression_rejects_null_without_allocating() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, o) = assignment(&mut tree, "s", "o", Some(fx.object()));
    let before = tree.clone();

    assert_eq!(
        create_cast_expression(&mut tree, &fx.store, o, &Type::Null, &CastFixConfig::default()),
        Err(CastError::NoOpCast)
    );
    assert_eq!(tree, before);
}

#[test]
fn invoking_an_action_applies_the_cast() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (root, o) = assignment(&mut tree, "n", "o", Some(fx.object()));

    let action = CastAction::new(&fx.store, fx.number(), o);
    assert_eq!(action.label(), "Cast to 'java.lang.Number'");

    let cast = action
        .invoke(&mut tree, &fx.store, &CastFixConfig::default())
        .unwrap();
    assert_eq!(render_root(&tree, root), "n = (Number) o");
    assert_eq!(tree.parent(o), Some(cast));
}

#[test]
fn invoking_an_unavailable_action_does_not_mutate() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, o) = assignment(&mut tree, "s", "o", Some(fx.object()));
    tree.set_tree_read_only(true);
    let before = tree.clone();

    let result = CastAction::new(&fx.store, fx.string(), o).invoke(
        &mut tree,
        &fx.store,
        &CastFixConfig::default(),
    );

    assert_eq!(result, Err(CastError::ReadOnly));
    assert_eq!(tree, before);
}
