//! Property tests for list regions and the sweep.

use proptest::prelude::*;
use serde_json::{Value, json};
use vdb_core::{Element, ElementId, ElementTree};
use vdb_runtime::Model;

fn region_tree() -> (ElementTree, ElementId) {
    let mut tree = ElementTree::new();
    let root = tree.root();
    let list = tree
        .append(root, Element::new("ul").bind_list("m>items"))
        .unwrap();
    let item = tree.append(list, Element::new("li")).unwrap();
    tree.append(item, Element::new("span").bind_property("m>label"))
        .unwrap();
    (tree, list)
}

fn items(labels: &[String]) -> Value {
    json!({ "items": labels.iter().map(|l| json!({ "label": l })).collect::<Vec<_>>() })
}

fn rendered(tree: &ElementTree, list: ElementId) -> Vec<String> {
    tree.children(list)
        .iter()
        .map(|&li| {
            let span = tree.first_child(li).unwrap();
            tree.element(span).unwrap().text().to_owned()
        })
        .collect()
}

proptest! {
    #[test]
    fn materialized_children_match_array(labels in prop::collection::vec("[a-z]{1,6}", 0..8)) {
        let (mut tree, list) = region_tree();
        let model = Model::json("m", items(&labels), &mut tree).unwrap();
        prop_assert_eq!(rendered(&tree, list), labels.clone());
        prop_assert_eq!(model.property_subscribers().len(), labels.len());
    }

    #[test]
    fn appends_keep_region_in_step(
        initial in prop::collection::vec("[a-z]{1,6}", 0..4),
        added in prop::collection::vec("[a-z]{1,6}", 1..5),
    ) {
        let (mut tree, list) = region_tree();
        let mut model = Model::json("m", items(&initial), &mut tree).unwrap();
        for label in &added {
            model.append_list_item(&mut tree, "items", json!({ "label": label })).unwrap();
        }
        let expected: Vec<String> = initial.iter().chain(&added).cloned().collect();
        prop_assert_eq!(rendered(&tree, list), expected);

        for (i, &li) in tree.children(list).iter().enumerate() {
            let span = tree.first_child(li).unwrap();
            let expected = format!("items/{i}/label");
            prop_assert_eq!(model.bound_paths(span), Some(expected));
        }
    }

    #[test]
    fn sweep_twice_changes_nothing(labels in prop::collection::vec("[a-z]{1,6}", 1..6)) {
        let (mut tree, list) = region_tree();
        let mut model = Model::json("m", items(&labels), &mut tree).unwrap();
        let first = model.update_subscribers(&mut tree);
        let before = rendered(&tree, list);
        let second = model.update_subscribers(&mut tree);
        prop_assert_eq!(first, second);
        prop_assert_eq!(rendered(&tree, list), before);
    }
}
