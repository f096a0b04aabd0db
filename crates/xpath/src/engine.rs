//! The evaluation engine for executing a parsed XPath AST against any [`XmlNode`] tree.

use crate::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, PathStart, Step};
use crate::axes;
use crate::error::XPathError;
use crate::functions;
use std::fmt;
use xmlbind_dom::{NodeType, XmlNode, parse_number};

/// The possible result types of an XPath expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<N> {
    /// Always sorted in document order, without duplicates.
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<N: XmlNode> XPathValue<N> {
    /// Coerces the value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerces the value to a number as per XPath 1.0 rules.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::String(s) => parse_number(s),
            XPathValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            XPathValue::NodeSet(_) => parse_number(&self.to_string()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            XPathValue::NodeSet(_) => "node-set",
            XPathValue::String(_) => "string",
            XPathValue::Number(_) => "number",
            XPathValue::Boolean(_) => "boolean",
        }
    }
}

impl<N: XmlNode> fmt::Display for XPathValue<N> {
    /// Coerces the value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => match nodes.first() {
                Some(node) => f.write_str(&node.string_value()),
                None => Ok(()),
            },
            XPathValue::String(s) => f.write_str(s),
            XPathValue::Number(n) => f.write_str(&format_number(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Renders a number the way XPath's `string()` does: no exponent, no trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// The dynamic context of an evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationContext<N> {
    pub node: N,
    /// 1-based.
    pub position: usize,
    pub size: usize,
    /// If true, calls to unknown functions are errors instead of evaluating to `""`.
    pub strict: bool,
}

impl<N: XmlNode> EvaluationContext<N> {
    pub fn new(node: N, strict: bool) -> Self {
        Self {
            node,
            position: 1,
            size: 1,
            strict,
        }
    }

    fn focus(&self, node: N, position: usize, size: usize) -> Self {
        Self {
            node,
            position,
            size,
            strict: self.strict,
        }
    }

    /// The root of the tree containing the context node.
    pub fn root(&self) -> N {
        let mut current = self.node.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}

/// Evaluates a compiled expression and returns a concrete [`XPathValue`].
pub fn evaluate<N: XmlNode>(
    expr: &Expression,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => {
            evaluate_location_path(path, e_ctx).map(XPathValue::NodeSet)
        }
        Expression::FunctionCall { name, args } => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, e_ctx)?);
            }
            functions::evaluate_function(name, evaluated_args, e_ctx)
        }
        Expression::BinaryOp { left, op, right } => evaluate_binary(left, *op, right, e_ctx),
        Expression::Negate(operand) => {
            let value = evaluate(operand, e_ctx)?;
            Ok(XPathValue::Number(-value.to_number()))
        }
        Expression::Filter {
            primary,
            predicates,
        } => {
            let nodes = expect_node_set(evaluate(primary, e_ctx)?)?;
            apply_predicates(nodes, predicates, e_ctx).map(XPathValue::NodeSet)
        }
    }
}

fn expect_node_set<N: XmlNode>(value: XPathValue<N>) -> Result<Vec<N>, XPathError> {
    match value {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::Type(format!(
            "expected a node-set, got a {}",
            other.type_name()
        ))),
    }
}

fn evaluate_binary<N: XmlNode>(
    left: &Expression,
    op: BinaryOperator,
    right: &Expression,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    // `or` and `and` short-circuit.
    match op {
        BinaryOperator::Or => {
            if evaluate(left, e_ctx)?.to_bool() {
                return Ok(XPathValue::Boolean(true));
            }
            return Ok(XPathValue::Boolean(evaluate(right, e_ctx)?.to_bool()));
        }
        BinaryOperator::And => {
            if !evaluate(left, e_ctx)?.to_bool() {
                return Ok(XPathValue::Boolean(false));
            }
            return Ok(XPathValue::Boolean(evaluate(right, e_ctx)?.to_bool()));
        }
        _ => {}
    }

    let left = evaluate(left, e_ctx)?;
    let right = evaluate(right, e_ctx)?;
    match op {
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => Ok(XPathValue::Boolean(compare(op, &left, &right))),
        BinaryOperator::Plus => Ok(XPathValue::Number(left.to_number() + right.to_number())),
        BinaryOperator::Minus => Ok(XPathValue::Number(left.to_number() - right.to_number())),
        BinaryOperator::Multiply => Ok(XPathValue::Number(left.to_number() * right.to_number())),
        BinaryOperator::Divide => Ok(XPathValue::Number(left.to_number() / right.to_number())),
        BinaryOperator::Modulo => Ok(XPathValue::Number(left.to_number() % right.to_number())),
        BinaryOperator::Union => {
            let mut nodes = expect_node_set(left)?;
            nodes.extend(expect_node_set(right)?);
            Ok(XPathValue::NodeSet(document_order(nodes)))
        }
        BinaryOperator::Or | BinaryOperator::And => unreachable!("handled above"),
    }
}

/// Node-set comparisons are existential: true if any member satisfies the comparison.
fn compare<N: XmlNode>(op: BinaryOperator, left: &XPathValue<N>, right: &XPathValue<N>) -> bool {
    match (left, right) {
        (XPathValue::NodeSet(l), XPathValue::NodeSet(r)) => {
            let right_values: Vec<XPathValue<N>> = r
                .iter()
                .map(|n| XPathValue::String(n.string_value()))
                .collect();
            l.iter().any(|a| {
                let a = XPathValue::String(a.string_value());
                right_values.iter().any(|b| compare_atoms(op, &a, b))
            })
        }
        (XPathValue::NodeSet(nodes), XPathValue::Boolean(_)) => {
            compare_atoms(op, &XPathValue::Boolean(!nodes.is_empty()), right)
        }
        (XPathValue::Boolean(_), XPathValue::NodeSet(nodes)) => {
            compare_atoms(op, left, &XPathValue::Boolean(!nodes.is_empty()))
        }
        (XPathValue::NodeSet(nodes), other) => nodes
            .iter()
            .any(|n| compare_atoms(op, &XPathValue::String(n.string_value()), other)),
        (other, XPathValue::NodeSet(nodes)) => nodes
            .iter()
            .any(|n| compare_atoms(op, other, &XPathValue::String(n.string_value()))),
        _ => compare_atoms(op, left, right),
    }
}

fn compare_atoms<N: XmlNode>(
    op: BinaryOperator,
    left: &XPathValue<N>,
    right: &XPathValue<N>,
) -> bool {
    match op {
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let equal = match (left, right) {
                (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
                    left.to_bool() == right.to_bool()
                }
                (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
                    left.to_number() == right.to_number()
                }
                _ => left.to_string() == right.to_string(),
            };
            if op == BinaryOperator::Equals {
                equal
            } else {
                !equal
            }
        }
        BinaryOperator::LessThan => left.to_number() < right.to_number(),
        BinaryOperator::LessThanOrEqual => left.to_number() <= right.to_number(),
        BinaryOperator::GreaterThan => left.to_number() > right.to_number(),
        BinaryOperator::GreaterThanOrEqual => left.to_number() >= right.to_number(),
        _ => false,
    }
}

fn document_order<N: XmlNode>(mut nodes: Vec<N>) -> Vec<N> {
    nodes.sort();
    nodes.dedup();
    nodes
}

fn evaluate_location_path<N: XmlNode>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError> {
    let mut current_nodes = match &path.start {
        PathStart::Context => vec![e_ctx.node.clone()],
        PathStart::Root => vec![e_ctx.root()],
        PathStart::Expression(start) => expect_node_set(evaluate(start, e_ctx)?)?,
    };
    for step in &path.steps {
        current_nodes = evaluate_step(step, &current_nodes, e_ctx)?;
    }
    Ok(current_nodes)
}

/// Evaluates a single step from every node of the context set, chaining axis collection,
/// node testing and predicate application.
fn evaluate_step<N: XmlNode>(
    step: &Step,
    context_nodes: &[N],
    e_ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError> {
    let mut results = Vec::new();
    for node in context_nodes {
        let candidates: Vec<N> = axes::collect(step.axis, node)
            .into_iter()
            .filter(|candidate| matches_node_test(candidate, &step.node_test, step.axis))
            .collect();
        results.extend(apply_predicates(candidates, &step.predicates, e_ctx)?);
    }
    Ok(document_order(results))
}

fn principal_node_type(axis: Axis) -> NodeType {
    match axis {
        Axis::Attribute => NodeType::Attribute,
        _ => NodeType::Element,
    }
}

/// An unprefixed name test matches on the local name alone.
fn matches_node_test<N: XmlNode>(node: &N, test: &NodeTest, axis: Axis) -> bool {
    match test {
        NodeTest::Wildcard => node.node_type() == principal_node_type(axis),
        NodeTest::PrefixWildcard(prefix) => {
            node.node_type() == principal_node_type(axis)
                && node.name().and_then(|q| q.prefix) == Some(prefix.as_str())
        }
        NodeTest::Name { prefix, local_part } => {
            node.node_type() == principal_node_type(axis)
                && node.name().is_some_and(|q| {
                    q.local_part == local_part
                        && prefix.as_deref().is_none_or(|p| q.prefix == Some(p))
                })
        }
        NodeTest::AnyNode => true,
        NodeTest::Text => matches!(node.node_type(), NodeType::Text | NodeType::CDataSection),
        NodeTest::Comment => node.node_type() == NodeType::Comment,
        NodeTest::ProcessingInstruction(target) => {
            node.node_type() == NodeType::ProcessingInstruction
                && target.as_deref().is_none_or(|t| {
                    node.name().is_some_and(|q| q.local_part == t)
                })
        }
    }
}

/// Filters `nodes` through each predicate in turn. Positions follow the order of `nodes`,
/// which for a step is the axis order.
fn apply_predicates<N: XmlNode>(
    nodes: Vec<N>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext<N>,
) -> Result<Vec<N>, XPathError> {
    let mut final_nodes = nodes;
    for predicate in predicates {
        let context_size = final_nodes.len();
        let mut kept = Vec::with_capacity(context_size);
        for (i, node) in final_nodes.into_iter().enumerate() {
            let predicate_ctx = e_ctx.focus(node.clone(), i + 1, context_size);
            let keep = match evaluate(predicate, &predicate_ctx)? {
                XPathValue::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        final_nodes = kept;
    }
    Ok(final_nodes)
}
