//! Foundation types shared by the xmlbind crates: the DOM node taxonomy, an owned XML tree
//! and the contract every XPath evaluator has to fulfil.

pub mod document;
pub mod node;
pub mod select;
pub mod text;

pub use document::{Document, DomError, Node};
pub use node::{NodeType, QName, TypedNode, XmlNode};
pub use select::{SelectError, Selected, XPathSelect};
pub use text::parse_number;
