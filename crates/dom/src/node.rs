//! The node-type taxonomy and the traits a navigable node has to implement.
use std::fmt;
use std::hash::Hash;

/// A qualified name, consisting of an optional prefix and a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

impl fmt::Display for QName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_part),
            None => f.write_str(self.local_part),
        }
    }
}

/// Node types, tagged with their DOM Level 1 `nodeType` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element,
    Attribute,
    Text,
    CDataSection,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
}

impl NodeType {
    /// The numeric DOM `nodeType` tag.
    pub fn code(self) -> u16 {
        match self {
            NodeType::Element => 1,
            NodeType::Attribute => 2,
            NodeType::Text => 3,
            NodeType::CDataSection => 4,
            NodeType::ProcessingInstruction => 7,
            NodeType::Comment => 8,
            NodeType::Document => 9,
            NodeType::DocumentType => 10,
            NodeType::DocumentFragment => 11,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            1 => NodeType::Element,
            2 => NodeType::Attribute,
            3 => NodeType::Text,
            4 => NodeType::CDataSection,
            7 => NodeType::ProcessingInstruction,
            8 => NodeType::Comment,
            9 => NodeType::Document,
            10 => NodeType::DocumentType,
            11 => NodeType::DocumentFragment,
            _ => return None,
        })
    }

    /// The DOM interface name of the node type, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Element => "Element",
            NodeType::Attribute => "Attr",
            NodeType::Text => "Text",
            NodeType::CDataSection => "CDATASection",
            NodeType::ProcessingInstruction => "ProcessingInstruction",
            NodeType::Comment => "Comment",
            NodeType::Document => "Document",
            NodeType::DocumentType => "DocumentType",
            NodeType::DocumentFragment => "DocumentFragment",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can report its DOM node type.
///
/// This is the only capability the binding layer needs from a node; navigation is the
/// business of the XPath evaluator.
pub trait TypedNode {
    fn node_type(&self) -> NodeType;
}

/// A node in a read-only, navigable XML tree.
///
/// The XPath evaluator is written exclusively against this trait. The total order of nodes
/// must be document order.
pub trait XmlNode: TypedNode + fmt::Debug + Clone + PartialEq + Eq + Hash + PartialOrd + Ord {
    /// The qualified name of the node. `None` for text, comment and document nodes. For a
    /// processing instruction this is its target.
    fn name(&self) -> Option<QName<'_>>;

    /// The string value as defined by the XPath 1.0 `string()` function:
    /// - text, comment and attribute nodes yield their content,
    /// - elements and documents yield the concatenation of all descendant text nodes.
    fn string_value(&self) -> String;

    /// Attribute nodes of an element; empty for every other node.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + '_>;

    /// Child nodes in document order.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + '_>;

    /// The parent node. `None` for the document node. The parent of an attribute is the
    /// element that owns it.
    fn parent(&self) -> Option<Self>;
}
