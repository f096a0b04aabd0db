/// Three nested `<Child>` levels, each with a `<Title>`.
pub const RECURSIVE_CHILDREN: &str = "<Root>\
    <Child><Title>Level 0</Title>\
        <Child><Title>Level 1</Title>\
            <Child><Title>Level 2</Title></Child>\
        </Child>\
    </Child>\
</Root>";

/// A category tree in which `categories[1].subcategories[0].subcategories[1]` has no `id`.
pub const CATALOG_MISSING_ID: &str = r#"<Catalog>
    <Category id="1"><Name>Books</Name></Category>
    <Category id="2">
        <Name>Music</Name>
        <Category id="21">
            <Name>Jazz</Name>
            <Category id="211"><Name>Bebop</Name></Category>
            <Category><Name>Swing</Name></Category>
        </Category>
    </Category>
</Catalog>"#;

/// The same tree with every `id` present.
pub const CATALOG: &str = r#"<Catalog>
    <Category id="1"><Name>Books</Name></Category>
    <Category id="2">
        <Name>Music</Name>
        <Category id="21">
            <Name>Jazz</Name>
            <Category id="211"><Name>Bebop</Name></Category>
            <Category id="212"><Name>Swing</Name></Category>
        </Category>
    </Category>
</Catalog>"#;

pub const PRODUCT: &str = r#"<product sku="A-100" available="yes">
    <name>Desk lamp</name>
    <price currency="EUR">24.90</price>
    <stock>0</stock>
    <tag>lighting</tag>
    <tag></tag>
    <tag>office</tag>
    <discontinued>FALSE</discontinued>
</product>"#;
