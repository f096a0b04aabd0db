use crate::error::LookupError;
use crate::predicates::{is_attr, is_element, type_name};
use std::fmt;
use std::sync::Arc;
use xmlbind_dom::{Selected, TypedNode, XPathSelect};

/// The node subtype a lookup accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Node,
    Element,
    Attribute,
}

impl NodeKind {
    pub fn matches<N: TypedNode>(self, node: &N) -> bool {
        match self {
            NodeKind::Node => true,
            NodeKind::Element => is_element(node),
            NodeKind::Attribute => is_attr(node),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Node => "Node",
            NodeKind::Element => "Element",
            NodeKind::Attribute => "Attr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Single,
    Array,
}

impl Cardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            Cardinality::Single => "a single node",
            Cardinality::Array => "a nodes array",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful lookup found.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult<N> {
    Node(N),
    /// Never empty.
    Nodes(Vec<N>),
}

/// A compiled lookup. `Ok(None)` means nothing was found.
pub type LookupFn<N> = Arc<
    dyn Fn(&N, &dyn XPathSelect<N>) -> Result<Option<LookupResult<N>>, LookupError> + Send + Sync,
>;

/// Evaluates an XPath expression and checks the shape of what comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupFactory {
    kind: NodeKind,
    cardinality: Cardinality,
}

impl LookupFactory {
    pub const fn new(kind: NodeKind, cardinality: Cardinality) -> Self {
        Self { kind, cardinality }
    }

    pub const fn node() -> Self {
        Self::new(NodeKind::Node, Cardinality::Single)
    }

    pub const fn element() -> Self {
        Self::new(NodeKind::Element, Cardinality::Single)
    }

    pub const fn attribute() -> Self {
        Self::new(NodeKind::Attribute, Cardinality::Single)
    }

    pub const fn nodes_array() -> Self {
        Self::new(NodeKind::Node, Cardinality::Array)
    }

    pub const fn elements_array() -> Self {
        Self::new(NodeKind::Element, Cardinality::Array)
    }

    pub const fn attributes_array() -> Self {
        Self::new(NodeKind::Attribute, Cardinality::Array)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// `Element`, `Attr[]`, ...
    pub fn expected_type(&self) -> String {
        match self.cardinality {
            Cardinality::Single => self.kind.name().to_string(),
            Cardinality::Array => format!("{}[]", self.kind.name()),
        }
    }

    pub fn create_lookup<N: TypedNode + 'static>(&self, path: &str) -> LookupFn<N> {
        let factory = *self;
        let path: Arc<str> = Arc::from(path);
        Arc::new(move |node: &N, select: &dyn XPathSelect<N>| {
            let single = factory.cardinality == Cardinality::Single;
            let selected =
                select
                    .select(&path, node, single)
                    .map_err(|source| LookupError::Select {
                        path: path.to_string(),
                        source,
                    })?;
            factory.validate(&path, selected)
        })
    }

    /// Checks the raw selection against the expected subtype and cardinality.
    pub fn validate<N: TypedNode>(
        &self,
        path: &str,
        selected: Selected<N>,
    ) -> Result<Option<LookupResult<N>>, LookupError> {
        let reason = match (self.cardinality, selected) {
            (_, Selected::Nothing) => return Ok(None),
            (Cardinality::Single, Selected::Node(node)) if self.kind.matches(&node) => {
                return Ok(Some(LookupResult::Node(node)));
            }
            (Cardinality::Array, Selected::Nodes(nodes)) if nodes.is_empty() => return Ok(None),
            (Cardinality::Array, Selected::Nodes(nodes))
                if nodes.iter().all(|n| self.kind.matches(n)) =>
            {
                return Ok(Some(LookupResult::Nodes(nodes)));
            }
            (Cardinality::Array, Selected::Nodes(nodes))
                if nodes.iter().any(|n| n.node_type() != nodes[0].node_type()) =>
            {
                "elements are of different type".to_string()
            }
            (_, other) => format!("got {}", type_name(&other)),
        };
        Err(LookupError::UnexpectedResult {
            expected: self.expected_type(),
            reason,
            path: path.to_string(),
        })
    }
}
