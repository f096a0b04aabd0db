//! The contract between the binding layer and an XPath evaluator.
use thiserror::Error;

/// The raw result of an XPath selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selected<N> {
    /// A node-set came back empty, or a single-node selection matched nothing.
    Nothing,
    Node(N),
    Nodes(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<N> Selected<N> {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Selected::Nothing)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("XPath expression \"{expression}\" could not be evaluated: {message}")]
pub struct SelectError {
    pub expression: String,
    pub message: String,
}

impl SelectError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

/// Evaluates an XPath expression against a context node.
///
/// With `single` set, a node-set result collapses to its first node in document order, or
/// to [`Selected::Nothing`] when it is empty. Primitive results are returned as they are.
pub trait XPathSelect<N> {
    fn select(&self, expression: &str, context: &N, single: bool)
    -> Result<Selected<N>, SelectError>;
}

impl<N, F> XPathSelect<N> for F
where
    F: Fn(&str, &N, bool) -> Result<Selected<N>, SelectError>,
{
    fn select(
        &self,
        expression: &str,
        context: &N,
        single: bool,
    ) -> Result<Selected<N>, SelectError> {
        self(expression, context, single)
    }
}
