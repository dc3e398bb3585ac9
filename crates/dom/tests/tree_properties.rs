//! End-to-end properties of the tree: mutation contracts, selector
//! behavior, class lookup and serialization.

use graphics_dom::{DomSerializer, NodeArena, NodeId};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// `<root><a class="foo"/><b/><a id="last"/></root>`
fn sample() -> (NodeArena, NodeId, NodeId, [NodeId; 3]) {
    let mut arena = NodeArena::new();
    let doc = arena.create_document();
    let root = arena.create_element(doc, "root").unwrap();
    arena.append_child(doc, root).unwrap();

    let a1 = arena.create_element(doc, "a").unwrap();
    arena.set_attribute(a1, "class", "foo").unwrap();
    let b = arena.create_element(doc, "b").unwrap();
    let a2 = arena.create_element(doc, "a").unwrap();
    arena.set_attribute(a2, "id", "last").unwrap();
    for child in [a1, b, a2] {
        arena.append_child(root, child).unwrap();
    }
    (arena, doc, root, [a1, b, a2])
}

#[test]
fn append_then_remove() {
    let (mut arena, doc, root, _) = sample();
    let extra = arena.create_element(doc, "c").unwrap();

    arena.append_child(root, extra).unwrap();
    assert_eq!(arena.parent_node(extra).unwrap(), Some(root));
    assert_eq!(arena.child_nodes(root).unwrap().last(), Some(&extra));

    arena.remove_child(root, extra).unwrap();
    assert_eq!(arena.parent_node(extra).unwrap(), None);
    assert!(!arena.child_nodes(root).unwrap().contains(&extra));
}

#[test]
fn cycle_insertion_leaves_tree_unchanged() {
    init_tracing();
    let (mut arena, doc, root, [a1, _, _]) = sample();
    let before = DomSerializer::new().serialize(&arena, doc).unwrap();

    let err = arena.insert_before(a1, root, None).unwrap_err();
    assert!(err.is_hierarchy_violation());
    let err = arena.append_child(a1, a1).unwrap_err();
    assert!(err.is_hierarchy_violation());

    assert_eq!(DomSerializer::new().serialize(&arena, doc).unwrap(), before);
    assert_eq!(arena.parent_node(root).unwrap(), Some(doc));
}

#[test]
fn document_has_at_most_one_element() {
    init_tracing();
    let (mut arena, doc, root, _) = sample();
    let second = arena.create_element(doc, "root").unwrap();
    assert!(arena.append_child(doc, second).unwrap_err().is_hierarchy_violation());
    assert!(arena.append_child(doc, root).unwrap_err().is_hierarchy_violation());

    let comment = arena.create_comment(doc, "still fine").unwrap();
    arena.append_child(doc, comment).unwrap();
    assert_eq!(arena.child_nodes(doc).unwrap().len(), 2);
}

#[test]
fn deep_clone_is_equal_but_distinct() {
    let (mut arena, _doc, root, _) = sample();
    let copy = arena.clone_node(root, true).unwrap();

    assert!(arena.is_equal_node(root, copy).unwrap());
    assert!(!arena.is_same_node(root, copy));
    assert_eq!(arena.parent_node(copy).unwrap(), None);
    assert_eq!(
        arena.child_nodes(copy).unwrap().len(),
        arena.child_nodes(root).unwrap().len()
    );
}

#[test]
fn class_name_lookup_round_trip() {
    let mut arena = NodeArena::new();
    let doc = arena.create_document();
    let root = arena.create_element(doc, "root").unwrap();
    let el = arena.create_element(doc, "g").unwrap();
    arena.set_attribute(el, "id", "a").unwrap();
    arena.set_attribute(el, "class", "x y").unwrap();
    arena.append_child(doc, root).unwrap();
    arena.append_child(root, el).unwrap();

    for query in ["x", "y", "x y", "y  x"] {
        assert_eq!(arena.get_elements_by_class_name(doc, query).unwrap(), vec![el], "{}", query);
    }
    assert!(arena.get_elements_by_class_name(doc, "z").unwrap().is_empty());
    assert!(arena.get_elements_by_class_name(doc, "x z").unwrap().is_empty());
}

#[test]
fn selector_queries() {
    let (arena, doc, root, [a1, b, a2]) = sample();

    assert_eq!(arena.query_selector_all(root, "a").unwrap(), vec![a1, a2]);
    assert_eq!(arena.query_selector(doc, "#last").unwrap(), Some(a2));
    assert_eq!(
        arena.query_selector_all(doc, "root > a:first-child").unwrap(),
        vec![a1]
    );
    assert_eq!(arena.query_selector_all(doc, "b ~ a").unwrap(), vec![a2]);
    assert_eq!(arena.query_selector_all(doc, "root b").unwrap(), vec![b]);
}

#[test]
fn nth_child_odd_positions() {
    let mut arena = NodeArena::new();
    let doc = arena.create_document();
    let root = arena.create_element(doc, "root").unwrap();
    arena.append_child(doc, root).unwrap();
    let children: Vec<NodeId> = (0..5)
        .map(|_| {
            let child = arena.create_element(doc, "item").unwrap();
            arena.append_child(root, child).unwrap();
            child
        })
        .collect();

    assert_eq!(
        arena.query_selector_all(root, "item:nth-child(2n+1)").unwrap(),
        vec![children[0], children[2], children[4]]
    );
    assert_eq!(
        arena.query_selector_all(root, "item:nth-child(odd)").unwrap(),
        vec![children[0], children[2], children[4]]
    );
    assert_eq!(
        arena.query_selector_all(root, "item:nth-last-child(-n+2)").unwrap(),
        vec![children[3], children[4]]
    );
}

fn five_items() -> (NodeArena, NodeId, Vec<NodeId>) {
    let mut arena = NodeArena::new();
    let doc = arena.create_document();
    let root = arena.create_element(doc, "root").unwrap();
    arena.append_child(doc, root).unwrap();
    let children = (0..5)
        .map(|_| {
            let child = arena.create_element(doc, "item").unwrap();
            arena.append_child(root, child).unwrap();
            child
        })
        .collect();
    (arena, root, children)
}

#[test]
fn nth_child_offsets_use_modulo_rule() {
    let (arena, root, children) = five_items();
    let positions = |selector: &str| -> Vec<usize> {
        arena
            .query_selector_all(root, selector)
            .unwrap()
            .iter()
            .map(|id| children.iter().position(|c| c == id).unwrap() + 1)
            .collect()
    };

    assert_eq!(positions("item:nth-child(2n)"), vec![2, 4]);
    assert_eq!(positions("item:nth-child(3n+2)"), vec![2, 5]);
    // offset >= factor or negative never equals index % factor
    assert!(positions("item:nth-child(n+2)").is_empty());
    assert!(positions("item:nth-child(2n+3)").is_empty());
    assert!(positions("item:nth-child(2n-1)").is_empty());
    // negative factor selects the first `offset` positions
    assert_eq!(positions("item:nth-child(-2n+5)"), vec![1, 2, 3, 4, 5]);
    assert_eq!(positions("item:nth-last-child(-n+2)"), vec![4, 5]);
}

#[test]
fn nth_child_extreme_arguments() {
    let (arena, root, children) = five_items();

    assert!(arena
        .query_selector_all(root, "item:nth-child(2n-9223372036854775808)")
        .unwrap()
        .is_empty());
    assert_eq!(
        arena
            .query_selector_all(root, "item:nth-child(-9223372036854775808n+3)")
            .unwrap(),
        children[..3].to_vec()
    );
    assert!(arena
        .query_selector_all(root, "item:nth-child(99999999999999999999n)")
        .unwrap()
        .is_empty());
}

#[test]
fn attribute_values_are_case_folded() {
    let mut arena = NodeArena::new();
    let doc = arena.create_document();
    let root = arena.create_element(doc, "root").unwrap();
    let camel = arena.create_element(doc, "g").unwrap();
    let lower = arena.create_element(doc, "g").unwrap();
    arena.set_attribute(camel, "name", "CamelCase").unwrap();
    arena.set_attribute(lower, "name", "camelcase").unwrap();
    arena.append_child(doc, root).unwrap();
    arena.append(root, &[camel, lower]).unwrap();

    assert_eq!(arena.query_selector_all(doc, "[name=CamelCase]").unwrap(), vec![lower]);
    assert_eq!(arena.query_selector_all(doc, "[NAME^=Camel]").unwrap(), vec![lower]);
}

#[test]
fn deep_tree_operations_do_not_recurse() {
    const DEPTH: usize = 10_000;
    let mut arena = NodeArena::with_capacity(DEPTH * 2 + 2);
    let doc = arena.create_document();
    // built bottom-up so each insert only checks a parentless node
    let mut top = arena.create_element(doc, "g").unwrap();
    for _ in 1..DEPTH {
        let parent = arena.create_element(doc, "g").unwrap();
        arena.append_child(parent, top).unwrap();
        top = parent;
    }

    let copy = arena.clone_node(top, true).unwrap();
    assert!(arena.is_equal_node(top, copy).unwrap());
    assert_eq!(arena.descendants(copy).unwrap().len(), DEPTH - 1);

    let xml = DomSerializer::new().serialize(&arena, top).unwrap();
    assert_eq!(xml.matches("<g>").count(), DEPTH);
    assert!(xml.ends_with("</g>\n"));
}

#[test]
fn invalid_selector_matches_nothing() {
    init_tracing();
    let (arena, doc, _root, _) = sample();
    assert!(arena.query_selector_all(doc, "[=x]").unwrap().is_empty());
    assert_eq!(arena.query_selector(doc, "a::before").unwrap(), None);
}

#[test]
fn serialization_is_idempotent() {
    let (mut arena, doc, root, _) = sample();
    let note = arena.create_comment(doc, "generated").unwrap();
    arena.insert_before(root, note, arena.first_child(root).unwrap()).unwrap();

    let serializer = DomSerializer::new();
    let first = serializer.serialize(&arena, doc).unwrap();
    let second = serializer.serialize(&arena, doc).unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with("<?xml"));
    assert!(first.contains("  <!--generated-->\n"));
}
