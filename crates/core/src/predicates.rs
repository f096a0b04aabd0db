//! Node classification used to validate lookup results and describe them in errors.
use xmlbind_dom::{NodeType, Selected, TypedNode};

/// True if the selection is a single node, as opposed to nothing, a node array or a
/// primitive.
pub fn is_node<N>(selected: &Selected<N>) -> bool {
    matches!(selected, Selected::Node(_))
}

pub fn is_element<N: TypedNode>(node: &N) -> bool {
    node.node_type() == NodeType::Element
}

pub fn is_attr<N: TypedNode>(node: &N) -> bool {
    node.node_type() == NodeType::Attribute
}

pub fn is_text<N: TypedNode>(node: &N) -> bool {
    node.node_type() == NodeType::Text
}

pub fn is_cdata<N: TypedNode>(node: &N) -> bool {
    node.node_type() == NodeType::CDataSection
}

pub fn is_comment<N: TypedNode>(node: &N) -> bool {
    node.node_type() == NodeType::Comment
}

pub fn is_processing_instruction<N: TypedNode>(node: &N) -> bool {
    node.node_type() == NodeType::ProcessingInstruction
}

pub fn is_document<N: TypedNode>(node: &N) -> bool {
    node.node_type() == NodeType::Document
}

/// A short description of a selection: the DOM interface name for nodes (`Element`,
/// `Attr`), `T[]` for homogeneous node arrays and the primitive type otherwise.
pub fn type_name<N: TypedNode>(selected: &Selected<N>) -> String {
    match selected {
        Selected::Nothing => "undefined".to_string(),
        Selected::Node(node) => node.node_type().name().to_string(),
        Selected::Nodes(nodes) => match nodes.first() {
            Some(first) if nodes.iter().all(|n| n.node_type() == first.node_type()) => {
                format!("{}[]", first.node_type().name())
            }
            Some(_) => "Node[]".to_string(),
            None => "[]".to_string(),
        },
        Selected::String(_) => "string".to_string(),
        Selected::Number(_) => "number".to_string(),
        Selected::Boolean(_) => "boolean".to_string(),
    }
}
