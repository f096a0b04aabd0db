#![allow(dead_code)]

pub mod fixtures;

use std::sync::Once;
use xmlbind::core::{Blueprint, RecursionScope, RecursiveSource};
use xmlbind::{Document, Node, map};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

static INIT: Once = Once::new();

/// Routes `log` output through the test harness. Run with `RUST_LOG=trace` to see it.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Parses `xml` and returns its document element.
pub fn root_element(xml: &str) -> Node {
    init_logging();
    let doc = Document::parse(xml).expect("test fixture should be well-formed XML");
    doc.root_element().expect("test fixture should have a document element")
}

/// `{title, child?}`, one level per `<Child>` element.
pub fn titled_children() -> RecursiveSource<Node> {
    RecursiveSource::new(|scope: &RecursionScope<Node>| {
        Blueprint::new()
            .field("title", map().to_node("Title").mandatory().as_string())
            .field("child", map().to_node("Child").as_recursive_object(scope))
    })
}

/// `{id, name, subcategories}` for nested `<Category>` elements.
pub fn categories() -> RecursiveSource<Node> {
    RecursiveSource::new(|scope: &RecursionScope<Node>| {
        Blueprint::new()
            .field("id", map().to_node("@id").mandatory().as_number())
            .field("name", map().to_node("Name").mandatory().as_string())
            .field(
                "subcategories",
                map()
                    .to_elements_array("Category")
                    .as_array()
                    .of_recursive_objects(scope),
            )
    })
}
