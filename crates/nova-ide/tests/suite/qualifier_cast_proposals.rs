use nova_flow::{ControlFlowTypes, NarrowingFacts};
use nova_hir::{ExprId, ExprTree, TypeRef};
use nova_ide::{add_type_cast, AccessKind, CastError, CastFixConfig, QualifierCastProposer};
use nova_types::{PrimitiveType, Type};
use pretty_assertions::assert_eq;

use crate::cast_fixture::{render_root, statement, typed_name, Fixture};

/// `x.<member>()` (or `x.<member>` for fields) with `x: Object`.
fn member_access(
    fx: &Fixture,
    tree: &mut ExprTree,
    member: &str,
    kind: AccessKind,
) -> (nova_hir::RootId, ExprId, ExprId) {
    let x = typed_name(tree, "x", Some(fx.object()));
    let access = match kind {
        AccessKind::MethodCall => tree.method_call(Some(x), member, vec![]).unwrap(),
        AccessKind::FieldAccess => tree.field_access(x, member).unwrap(),
    };
    (statement(tree, access), x, access)
}

fn proposed_types(actions: &[nova_ide::CastAction]) -> Vec<Type> {
    actions.iter().map(|action| action.ty().clone()).collect()
}

#[test]
fn only_conjuncts_declaring_the_method_are_proposed() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (root, x, _) = member_access(&fx, &mut tree, "baz", AccessKind::MethodCall);
    let facts = NarrowingFacts::new()
        .with_guard("x", fx.class(fx.foo))
        .with_guard("x", fx.class(fx.bar));

    let proposer = QualifierCastProposer::new(&fx.store, &facts);
    let actions = proposer.propose(&tree, x, "baz", AccessKind::MethodCall);

    assert_eq!(proposed_types(&actions), vec![fx.class(fx.bar)]);
    assert_eq!(actions[0].label(), "Cast qualifier to 'com.example.Bar'");
    assert_eq!(actions[0].target(), x);

    let action = actions.into_iter().next().unwrap();
    assert!(action.is_available(&tree, &fx.store));
    action
        .invoke(&mut tree, &fx.store, &CastFixConfig::default())
        .unwrap();
    assert_eq!(render_root(&tree, root), "((Bar) x).baz()");
}

#[test]
fn method_match_ignores_arity_and_includes_inherited_methods() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, x, _) = member_access(&fx, &mut tree, "baz", AccessKind::MethodCall);
    let facts = NarrowingFacts::new()
        .with_guard("x", fx.class(fx.qux))
        .with_guard("x", fx.class(fx.sub_bar));

    let actions = QualifierCastProposer::new(&fx.store, &facts).propose(
        &tree,
        x,
        "baz",
        AccessKind::MethodCall,
    );

    assert_eq!(
        proposed_types(&actions),
        vec![fx.class(fx.qux), fx.class(fx.sub_bar)]
    );
}

#[test]
fn fields_are_found_through_the_hierarchy() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (root, x, access) = member_access(&fx, &mut tree, "count", AccessKind::FieldAccess);
    let facts = NarrowingFacts::new()
        .with_guard("x", fx.class(fx.foo))
        .with_guard("x", fx.class(fx.sub_bar));

    let proposer = QualifierCastProposer::new(&fx.store, &facts);
    let actions = proposer.propose(&tree, x, "count", AccessKind::FieldAccess);
    assert_eq!(proposed_types(&actions), vec![fx.class(fx.sub_bar)]);

    // A method named like the field doesn't count, and vice versa.
    assert!(proposer
        .propose(&tree, x, "count", AccessKind::MethodCall)
        .is_empty());
    assert!(proposer
        .propose(&tree, x, "baz", AccessKind::FieldAccess)
        .is_empty());

    assert_eq!(
        proposed_types(&proposer.propose_for_member(&tree, access)),
        vec![fx.class(fx.sub_bar)]
    );
    let action = actions.into_iter().next().unwrap();
    action
        .invoke(&mut tree, &fx.store, &CastFixConfig::default())
        .unwrap();
    assert_eq!(render_root(&tree, root), "((SubBar) x).count");
}

#[test]
fn duplicate_conjuncts_yield_one_action_in_oracle_order() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, x, _) = member_access(&fx, &mut tree, "baz", AccessKind::MethodCall);

    let facts = NarrowingFacts::new()
        .with_guard("x", fx.class(fx.qux))
        .with_guard("x", fx.class(fx.bar))
        .with_guard("x", fx.class(fx.qux));
    let actions = QualifierCastProposer::new(&fx.store, &facts).propose(
        &tree,
        x,
        "baz",
        AccessKind::MethodCall,
    );
    assert_eq!(
        proposed_types(&actions),
        vec![fx.class(fx.qux), fx.class(fx.bar)]
    );

    let facts = NarrowingFacts::new()
        .with_guard("x", fx.class(fx.bar))
        .with_guard("x", fx.class(fx.qux));
    let actions = QualifierCastProposer::new(&fx.store, &facts).propose(
        &tree,
        x,
        "baz",
        AccessKind::MethodCall,
    );
    assert_eq!(
        proposed_types(&actions),
        vec![fx.class(fx.bar), fx.class(fx.qux)]
    );
}

#[test]
fn conjuncts_without_a_class_are_skipped() {
    let mut fx = Fixture::new();
    let bar = fx.class(fx.bar);
    let t = fx.store.add_type_param("T", vec![bar]);
    let mut tree = fx.tree();
    let (_, x, _) = member_access(&fx, &mut tree, "baz", AccessKind::MethodCall);

    let facts = NarrowingFacts::new()
        .with_guard("x", Type::Primitive(PrimitiveType::Int))
        .with_guard("x", Type::array(fx.class(fx.bar)))
        .with_guard("x", Type::Null)
        .with_guard("x", Type::TypeVar(t));
    let actions = QualifierCastProposer::new(&fx.store, &facts).propose(
        &tree,
        x,
        "baz",
        AccessKind::MethodCall,
    );

    // Type variables resolve through their bound.
    assert_eq!(proposed_types(&actions), vec![Type::TypeVar(t)]);
    assert_eq!(actions[0].label(), "Cast qualifier to 'T'");
}

#[test]
fn no_narrowing_means_no_proposals() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, x, access) = member_access(&fx, &mut tree, "baz", AccessKind::MethodCall);
    let facts = NarrowingFacts::new();

    let proposer = QualifierCastProposer::new(&fx.store, facts);
    assert!(proposer
        .propose(&tree, x, "baz", AccessKind::MethodCall)
        .is_empty());
    assert!(proposer.propose_for_member(&tree, access).is_empty());
}

#[test]
fn unqualified_members_have_nothing_to_cast() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let call = tree.method_call(None, "baz", vec![]).unwrap();
    statement(&mut tree, call);
    let x = tree.name("x");
    let facts = NarrowingFacts::new().with_guard("x", fx.class(fx.bar));

    let proposer = QualifierCastProposer::new(&fx.store, &facts);
    assert!(proposer.propose_for_member(&tree, call).is_empty());
    assert!(proposer.propose_for_member(&tree, x).is_empty());
}

#[test]
fn facts_can_come_from_instanceof_guards() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, _, access) = member_access(&fx, &mut tree, "baz", AccessKind::MethodCall);
    let guarded = tree.name("x");
    let guard = tree.instance_of(guarded, TypeRef::new(fx.class(fx.bar), "Bar")).unwrap();
    statement(&mut tree, guard);

    let mut facts = NarrowingFacts::new();
    assert!(facts.record_instanceof(&tree, guard));

    let actions = QualifierCastProposer::new(&fx.store, &facts).propose_for_member(&tree, access);
    assert_eq!(proposed_types(&actions), vec![fx.class(fx.bar)]);
}

#[test]
fn stale_proposal_is_not_applied_to_a_replaced_statement() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (root, x, access) = member_access(&fx, &mut tree, "baz", AccessKind::MethodCall);
    let facts = NarrowingFacts::new().with_guard("x", fx.class(fx.bar));
    let action = QualifierCastProposer::new(&fx.store, &facts)
        .propose_for_member(&tree, access)
        .into_iter()
        .next()
        .expect("qualifier cast");

    let replacement = tree.name("somethingElse");
    tree.replace(access, replacement).unwrap();
    let before = tree.clone();

    assert!(!action.is_available(&tree, &fx.store));
    assert_eq!(
        action.invoke(&mut tree, &fx.store, &CastFixConfig::default()),
        Err(CastError::MalformedInput)
    );
    assert_eq!(
        add_type_cast(
            &mut tree,
            &fx.store,
            x,
            &fx.class(fx.bar),
            &CastFixConfig::default()
        ),
        Err(CastError::MalformedInput)
    );
    assert_eq!(tree, before);
    assert_eq!(render_root(&tree, root), "somethingElse");
}

/// An oracle that reports a fixed list regardless of the expression.
struct FixedConjuncts(Vec<Type>);

impl ControlFlowTypes for FixedConjuncts {
    fn control_flow_type_conjuncts(&self, _tree: &ExprTree, _expr: ExprId) -> Vec<Type> {
        self.0.clone()
    }
}

#[test]
fn any_oracle_can_be_injected() {
    let fx = Fixture::new();
    let mut tree = fx.tree();
    let (_, x, _) = member_access(&fx, &mut tree, "qux", AccessKind::MethodCall);
    let oracle = FixedConjuncts(vec![fx.class(fx.bar), fx.class(fx.foo)]);

    let actions = QualifierCastProposer::new(&fx.store, oracle).propose(
        &tree,
        x,
        "qux",
        AccessKind::MethodCall,
    );
    assert_eq!(proposed_types(&actions), vec![fx.class(fx.foo)]);
}
