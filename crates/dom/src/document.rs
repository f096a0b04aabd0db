//! An owned XML tree built from `roxmltree`.
//!
//! `roxmltree` borrows from the input text, which would tie every node handle to the
//! lifetime of the source string. The binding layer compiles extraction closures that are
//! reused across documents, so the parsed tree is copied into an `Arc`-shared arena and
//! nodes become cheap, `'static` handles into it.
use crate::node::{NodeType, QName, TypedNode, XmlNode};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] roxmltree::Error),
}

#[derive(Debug)]
struct NodeData {
    node_type: NodeType,
    prefix: Option<String>,
    local_name: Option<String>,
    /// Content of text, comment, attribute and processing-instruction nodes.
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: Vec<usize>,
}

impl NodeData {
    fn new(node_type: NodeType, parent: Option<usize>) -> Self {
        Self {
            node_type,
            prefix: None,
            local_name: None,
            value: String::new(),
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

fn prefix_for(scope: &roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE {
        return Some("xml".to_string());
    }
    scope
        .lookup_prefix(uri)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}

/// Node ids are assigned in document order: an element, then its attributes, then its
/// children.
#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    fn push(&mut self, data: NodeData) -> usize {
        let id = self.nodes.len();
        if let Some(parent) = data.parent {
            let list = if data.node_type == NodeType::Attribute {
                &mut self.nodes[parent].attributes
            } else {
                &mut self.nodes[parent].children
            };
            list.push(id);
        }
        self.nodes.push(data);
        id
    }

    fn append(&mut self, source: roxmltree::Node<'_, '_>, parent: Option<usize>) {
        let node_type = match source.node_type() {
            roxmltree::NodeType::Root => NodeType::Document,
            roxmltree::NodeType::Element => NodeType::Element,
            roxmltree::NodeType::PI => NodeType::ProcessingInstruction,
            roxmltree::NodeType::Comment => NodeType::Comment,
            roxmltree::NodeType::Text => NodeType::Text,
        };
        let mut data = NodeData::new(node_type, parent);

        match node_type {
            NodeType::Element => {
                let tag = source.tag_name();
                data.prefix = tag.namespace().and_then(|uri| prefix_for(&source, uri));
                data.local_name = Some(tag.name().to_string());
            }
            NodeType::ProcessingInstruction => {
                if let Some(pi) = source.pi() {
                    data.local_name = Some(pi.target.to_string());
                    data.value = pi.value.unwrap_or_default().to_string();
                }
            }
            NodeType::Text | NodeType::Comment => {
                data.value = source.text().unwrap_or_default().to_string();
            }
            _ => {}
        }

        let id = self.push(data);

        for attribute in source.attributes() {
            let mut attr = NodeData::new(NodeType::Attribute, Some(id));
            attr.prefix = attribute
                .namespace()
                .and_then(|uri| prefix_for(&source, uri));
            attr.local_name = Some(attribute.name().to_string());
            attr.value = attribute.value().to_string();
            self.push(attr);
        }

        for child in source.children() {
            self.append(child, Some(id));
        }
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        for &child in &self.nodes[id].children {
            let data = &self.nodes[child];
            match data.node_type {
                NodeType::Text | NodeType::CDataSection => out.push_str(&data.value),
                NodeType::Element => self.collect_text(child, out),
                _ => {}
            }
        }
    }
}

/// A parsed, immutable XML document.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Arc<Tree>,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self, DomError> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let source = roxmltree::Document::parse_with_options(text, options)?;

        let mut tree = Tree::default();
        tree.append(source.root(), None);
        Ok(Self {
            tree: Arc::new(tree),
        })
    }

    /// The document node.
    pub fn root(&self) -> Node {
        Node {
            tree: Arc::clone(&self.tree),
            id: 0,
        }
    }

    /// The single top-level element.
    pub fn root_element(&self) -> Option<Node> {
        self.root()
            .children()
            .find(|node| node.node_type() == NodeType::Element)
    }

    /// Total number of nodes in the tree, attributes included.
    pub fn len(&self) -> usize {
        self.tree.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.nodes.is_empty()
    }
}

/// A handle to a node of a [`Document`]. Cloning is a reference-count bump.
#[derive(Clone)]
pub struct Node {
    tree: Arc<Tree>,
    id: usize,
}

impl Node {
    fn data(&self) -> &NodeData {
        &self.tree.nodes[self.id]
    }

    fn sibling_handle(&self, id: usize) -> Node {
        Node {
            tree: Arc::clone(&self.tree),
            id,
        }
    }

    /// Position of the node in document order.
    pub fn position(&self) -> usize {
        self.id
    }

    /// The document this node belongs to.
    pub fn document(&self) -> Document {
        Document {
            tree: Arc::clone(&self.tree),
        }
    }

    pub fn local_name(&self) -> Option<&str> {
        self.data().local_name.as_deref()
    }
}

impl TypedNode for Node {
    fn node_type(&self) -> NodeType {
        self.data().node_type
    }
}

impl XmlNode for Node {
    fn name(&self) -> Option<QName<'_>> {
        let data = self.data();
        data.local_name.as_deref().map(|local_part| QName {
            prefix: data.prefix.as_deref(),
            local_part,
        })
    }

    fn string_value(&self) -> String {
        let data = self.data();
        match data.node_type {
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment => {
                let mut out = String::new();
                self.tree.collect_text(self.id, &mut out);
                out
            }
            _ => data.value.clone(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + '_> {
        Box::new(
            self.data()
                .attributes
                .iter()
                .map(move |&id| self.sibling_handle(id)),
        )
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + '_> {
        Box::new(
            self.data()
                .children
                .iter()
                .map(move |&id| self.sibling_handle(id)),
        )
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| self.sibling_handle(id))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        match &data.local_name {
            Some(name) => write!(f, "{}#{}({})", data.node_type, self.id, name),
            None => write!(f, "{}#{}", data.node_type, self.id),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.tree, &other.tree)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.tree) as usize).hash(state);
        self.id.hash(state);
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        let this_tree = Arc::as_ptr(&self.tree) as usize;
        let other_tree = Arc::as_ptr(&other.tree) as usize;
        this_tree.cmp(&other_tree).then(self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(parent: &Node, name: &str) -> Node {
        parent
            .children()
            .find(|n| n.name().is_some_and(|q| q.local_part == name))
            .unwrap()
    }

    #[test]
    fn test_attributes_are_nodes_owned_by_their_element() {
        let doc = Document::parse(r#"<root><item id="123" status="active">Text</item></root>"#)
            .unwrap();
        let root = doc.root_element().unwrap();
        let item = element(&root, "item");

        let attrs: Vec<_> = item.attributes().collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].node_type(), NodeType::Attribute);
        assert_eq!(attrs[0].name().unwrap().local_part, "id");
        assert_eq!(attrs[0].string_value(), "123");
        assert_eq!(attrs[1].string_value(), "active");
        assert_eq!(attrs[0].parent(), Some(item.clone()));
        assert!(item < attrs[0] && attrs[0] < attrs[1]);
    }

    #[test]
    fn test_string_value_concatenates_descendant_text() {
        let doc =
            Document::parse("<a>one<b>two<!-- skipped --><c>three</c></b><![CDATA[four]]></a>")
                .unwrap();
        let a = doc.root_element().unwrap();
        assert_eq!(a.string_value(), "onetwothreefour");
        assert_eq!(doc.root().string_value(), "onetwothreefour");
        assert_eq!(doc.root().node_type(), NodeType::Document);
    }

    #[test]
    fn test_comments_and_processing_instructions() {
        let doc = Document::parse("<a><!-- note --><?target data?></a>").unwrap();
        let a = doc.root_element().unwrap();
        let children: Vec<_> = a.children().collect();
        assert_eq!(children[0].node_type(), NodeType::Comment);
        assert_eq!(children[0].string_value(), " note ");
        assert_eq!(children[1].node_type(), NodeType::ProcessingInstruction);
        assert_eq!(children[1].name().unwrap().local_part, "target");
        assert_eq!(children[1].string_value(), "data");
    }

    #[test]
    fn test_namespace_prefixes_are_recovered() {
        let doc = Document::parse(
            r#"<r:root xmlns:r="urn:r" xmlns:x="urn:x"><r:item x:kind="k" xml:lang="en"/></r:root>"#,
        )
        .unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.name().unwrap().to_string(), "r:root");
        let item = element(&root, "item");
        let names: Vec<String> = item
            .attributes()
            .map(|a| a.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["x:kind", "xml:lang"]);
    }

    #[test]
    fn test_nodes_of_different_documents_are_distinct() {
        let first = Document::parse("<a/>").unwrap();
        let second = Document::parse("<a/>").unwrap();
        assert_ne!(first.root(), second.root());
        assert_eq!(first.root(), first.root());
        assert_eq!(first.root_element().unwrap().document().len(), first.len());
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let err = Document::parse("<a><b></a>").unwrap_err();
        assert!(err.to_string().starts_with("XML parsing error"));
    }
}
