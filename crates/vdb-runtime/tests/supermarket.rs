//! End-to-end binding scenarios over a small supermarket page.

use serde_json::{Value, json};
use vdb_core::{BindingKind, Element, ElementId, ElementTree};
use vdb_runtime::{ModelError, Page};

const MODEL: &str = "supermarket";

struct Ids {
    heading: ElementId,
    list: ElementId,
    summary: ElementId,
}

fn data() -> Value {
    json!({
        "name": "Corner Shop",
        "products": [
            {
                "name": "Apples",
                "quantity": 100,
                "tags": [{ "label": "fruit" }, { "label": "local" }]
            }
        ]
    })
}

/// `h1`, a product list whose items hold a nested tag list, and a summary
/// element carrying two bindings.
fn page() -> (Page, Ids) {
    let mut tree = ElementTree::new();
    let root = tree.root();
    let heading = tree
        .append(root, Element::new("h1").bind_property("supermarket>name"))
        .unwrap();
    let list = tree
        .append(root, Element::new("ul").bind_list("supermarket>products"))
        .unwrap();
    let item = tree.append(list, Element::new("li")).unwrap();
    tree.append(item, Element::new("span").bind_property("supermarket>name"))
        .unwrap();
    tree.append(
        item,
        Element::new("span").bind_property("supermarket>quantity"),
    )
    .unwrap();
    tree.append(
        item,
        Element::new("ui5-input").bind_property("supermarket>name>value"),
    )
    .unwrap();
    let tags = tree
        .append(item, Element::new("ol").bind_list("supermarket>tags"))
        .unwrap();
    let tag = tree.append(tags, Element::new("li")).unwrap();
    tree.append(tag, Element::new("b").bind_property("supermarket>label"))
        .unwrap();
    let summary = tree
        .append(
            root,
            Element::new("span")
                .bind_property("[supermarket>name, supermarket>products>products-list]"),
        )
        .unwrap();

    let mut page = Page::new(tree);
    page.add_json_model(MODEL, data()).unwrap();
    (
        page,
        Ids {
            heading,
            list,
            summary,
        },
    )
}

/// The `name`, `quantity`, input, and tag list elements of product item `i`.
fn item_parts(page: &Page, ids: &Ids, i: usize) -> [ElementId; 4] {
    let item = page.tree().children(ids.list)[i];
    let children = page.tree().children(item);
    [children[0], children[1], children[2], children[3]]
}

fn text(page: &Page, id: ElementId) -> &str {
    page.tree().element(id).unwrap().text()
}

fn tag_labels(page: &Page, tags: ElementId) -> Vec<String> {
    page.tree()
        .children(tags)
        .iter()
        .map(|&li| text(page, page.tree().first_child(li).unwrap()).to_owned())
        .collect()
}

#[test]
fn initial_render() {
    let (page, ids) = page();
    assert_eq!(text(&page, ids.heading), "Corner Shop");
    assert_eq!(page.tree().children(ids.list).len(), 1);

    let [name, quantity, input, tags] = item_parts(&page, &ids, 0);
    assert_eq!(text(&page, name), "Apples");
    assert_eq!(text(&page, quantity), "100");
    assert_eq!(
        page.tree().element(input).unwrap().property("value"),
        Some(&json!("Apples"))
    );
    assert_eq!(tag_labels(&page, tags), vec!["fruit", "local"]);
}

#[test]
fn set_property_updates_only_the_bound_field() {
    let (mut page, ids) = page();
    page.set_property(MODEL, "products/0/name", json!("Frozen Yogurt"))
        .unwrap();

    let [name, quantity, input, _] = item_parts(&page, &ids, 0);
    assert_eq!(text(&page, name), "Frozen Yogurt");
    assert_eq!(
        page.tree().element(input).unwrap().property("value"),
        Some(&json!("Frozen Yogurt"))
    );
    assert_eq!(text(&page, quantity), "100");
    assert_eq!(text(&page, ids.heading), "Corner Shop");
    let model = page.model(MODEL).unwrap();
    assert_eq!(model.get("products/0/quantity").unwrap(), &json!(100));
}

#[test]
fn append_adds_a_bound_item() {
    let (mut page, ids) = page();
    let appended = page
        .append_list_item(
            MODEL,
            "products",
            json!({ "name": "Bananas", "quantity": 8, "tags": [{ "label": "imported" }] }),
        )
        .unwrap();
    assert_eq!(appended.index, 1);
    assert_eq!(appended.data["products"][1]["name"], json!("Bananas"));

    assert_eq!(page.tree().children(ids.list).len(), 2);
    let [name, quantity, _, tags] = item_parts(&page, &ids, 1);
    let model = page.model(MODEL).unwrap();
    assert_eq!(model.bound_paths(name).as_deref(), Some("products/1/name"));
    assert_eq!(model.get("products/1/quantity").unwrap(), &json!(8));
    assert_eq!(text(&page, name), "Bananas");
    assert_eq!(text(&page, quantity), "8");

    assert_eq!(tag_labels(&page, tags), vec!["imported"]);
    let label = page
        .tree()
        .first_child(page.tree().children(tags)[0])
        .unwrap();
    assert_eq!(
        model.bound_paths(label).as_deref(),
        Some("products/1/tags/0/label")
    );

    let [first_name, ..] = item_parts(&page, &ids, 0);
    assert_eq!(text(&page, first_name), "Apples");
}

#[test]
fn input_in_appended_item_writes_its_own_path() {
    let (mut page, ids) = page();
    page.append_list_item(MODEL, "products", json!({ "name": "Bananas", "quantity": 8, "tags": [] }))
        .unwrap();
    let [name, _, input, _] = item_parts(&page, &ids, 1);

    assert_eq!(page.input(input, "Kiwis").unwrap(), 1);
    assert_eq!(text(&page, name), "Kiwis");
    let model = page.model(MODEL).unwrap();
    assert_eq!(model.get("products/1/name").unwrap(), &json!("Kiwis"));
    assert_eq!(model.get("products/0/name").unwrap(), &json!("Apples"));
}

#[test]
fn repeated_input_does_not_duplicate_observers() {
    let (mut page, ids) = page();
    let [_, _, input, _] = item_parts(&page, &ids, 0);
    page.input(input, "Pears").unwrap();
    page.input(input, "Pears").unwrap();
    assert_eq!(page.tree().element(input).unwrap().observers().len(), 1);
    assert_eq!(
        page.model(MODEL).unwrap().get("products/0/name").unwrap(),
        &json!("Pears")
    );
}

#[test]
fn multi_binding_element() {
    let (mut page, ids) = page();
    let summary = page.tree().element(ids.summary).unwrap();
    assert_eq!(
        summary.annotation(BindingKind::Property),
        Some("[supermarket>name, supermarket>products>products-list]")
    );
    assert_eq!(summary.text(), "Corner Shop");
    assert_eq!(
        summary.property("products-list").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
    assert_eq!(
        page.model(MODEL).unwrap().bound_paths(ids.summary).as_deref(),
        Some("name+products")
    );

    page.append_list_item(MODEL, "products", json!({ "name": "Bananas", "tags": [] }))
        .unwrap();
    let summary = page.tree().element(ids.summary).unwrap();
    assert_eq!(
        summary.property("products-list").and_then(Value::as_array).map(Vec::len),
        Some(2)
    );
}

#[test]
fn append_to_nested_list() {
    let (mut page, ids) = page();
    page.append_list_item(MODEL, "products/0/tags", json!({ "label": "sale" }))
        .unwrap();
    let [.., tags] = item_parts(&page, &ids, 0);
    assert_eq!(tag_labels(&page, tags), vec!["fruit", "local", "sale"]);
}

#[test]
fn empty_nested_list_grows_from_its_template() {
    let (mut page, ids) = page();
    page.append_list_item(MODEL, "products", json!({ "name": "Salt", "tags": [] }))
        .unwrap();
    let [.., tags] = item_parts(&page, &ids, 1);
    assert!(page.tree().children(tags).is_empty());

    page.append_list_item(MODEL, "products/1/tags", json!({ "label": "pantry" }))
        .unwrap();
    assert_eq!(tag_labels(&page, tags), vec!["pantry"]);
}

#[test]
fn bound_item_returns_nearest_item() {
    let (mut page, ids) = page();
    page.append_list_item(
        MODEL,
        "products",
        json!({ "name": "Bananas", "quantity": 8, "tags": [{ "label": "imported" }] }),
    )
    .unwrap();
    let [_, quantity, _, tags] = item_parts(&page, &ids, 1);
    let item = page.tree().children(ids.list)[1];

    let product = page.bound_item(MODEL, quantity).unwrap();
    assert_eq!(product["name"], json!("Bananas"));
    assert_eq!(page.bound_item(MODEL, item).unwrap()["quantity"], json!(8));

    let tag = page.tree().children(tags)[0];
    assert_eq!(
        page.bound_item(MODEL, tag).unwrap(),
        &json!({ "label": "imported" })
    );

    assert!(matches!(
        page.bound_item(MODEL, ids.heading),
        Err(ModelError::NotInListContext { .. })
    ));
}

#[test]
fn bind_element_and_property_rebinds() {
    let (mut page, ids) = page();
    page.bind_element_and_property(MODEL, ids.heading, "products/0/tags/1/label")
        .unwrap();
    assert_eq!(text(&page, ids.heading), "local");
    page.set_property(MODEL, "products/0/tags/1/label", json!("regional"))
        .unwrap();
    assert_eq!(text(&page, ids.heading), "regional");
}

#[test]
fn removed_items_stop_receiving_updates() {
    let (mut page, ids) = page();
    let item = page.tree().children(ids.list)[0];
    let removed = page.remove_element(item).unwrap();
    let model = page.model(MODEL).unwrap();
    for id in &removed {
        assert!(model.derived(*id).is_none());
    }
    page.set_property(MODEL, "products/0/name", json!("Gone"))
        .unwrap();
    assert!(page.tree().children(ids.list).is_empty());
}

#[test]
fn identical_pages_render_identically() {
    let (mut left, _) = page();
    let (mut right, _) = page();
    for page in [&mut left, &mut right] {
        page.set_property(MODEL, "products/0/quantity", json!(42))
            .unwrap();
        page.append_list_item(MODEL, "products", json!({ "name": "Figs", "tags": [] }))
            .unwrap();
    }
    let left_order = left.tree().document_order();
    assert_eq!(left_order, right.tree().document_order());
    for id in left_order {
        assert_eq!(left.tree().element(id), right.tree().element(id));
    }
}
