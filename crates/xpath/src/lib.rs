//! An XPath 1.0 engine for any [`XmlNode`](xmlbind_dom::XmlNode) tree.
//!
//! [`XPathEvaluator`] is the default implementation of the
//! [`XPathSelect`](xmlbind_dom::XPathSelect) contract the binding layer is written against.

pub mod ast;
pub mod axes;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, PathStart, Step};
pub use engine::{EvaluationContext, XPathValue, evaluate, format_number};
pub use error::XPathError;
pub use evaluator::{EvaluatorBuilder, XPathEvaluator};
pub use parser::parse_expression;
