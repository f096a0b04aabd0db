//! A reusable, thread-safe evaluator with an optional compiled-expression cache.
use crate::ast::Expression;
use crate::engine::{EvaluationContext, XPathValue, evaluate};
use crate::error::XPathError;
use crate::parser::parse_expression;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use xmlbind_dom::{SelectError, Selected, XPathSelect, XmlNode};

/// Evaluates XPath 1.0 expressions against [`XmlNode`] trees.
///
/// Bindings evaluate the same handful of expressions for every node they visit, so by
/// default parsed expressions are cached by their source text. Entries are never evicted;
/// callers that evaluate arbitrary, unbounded expressions should build the evaluator with
/// [`EvaluatorBuilder::cache_expressions`] set to `false`.
#[derive(Debug)]
pub struct XPathEvaluator {
    cache: Option<RwLock<HashMap<String, Arc<Expression>>>>,
    strict_functions: bool,
}

impl Default for XPathEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl XPathEvaluator {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    /// Parses `expression`, going through the cache when it is enabled.
    pub fn compile(&self, expression: &str) -> Result<Arc<Expression>, XPathError> {
        let Some(cache) = &self.cache else {
            return parse_expression(expression).map(Arc::new);
        };

        if let Ok(entries) = cache.read()
            && let Some(compiled) = entries.get(expression)
        {
            return Ok(Arc::clone(compiled));
        }

        log::trace!("Compiling XPath expression '{}'", expression);
        let compiled = Arc::new(parse_expression(expression)?);
        // A poisoned cache only costs a re-parse next time.
        if let Ok(mut entries) = cache.write() {
            entries.insert(expression.to_string(), Arc::clone(&compiled));
        }
        Ok(compiled)
    }

    pub fn evaluate<N: XmlNode>(
        &self,
        expression: &str,
        context: &N,
    ) -> Result<XPathValue<N>, XPathError> {
        let compiled = self.compile(expression)?;
        let e_ctx = EvaluationContext::new(context.clone(), self.strict_functions);
        evaluate(&compiled, &e_ctx)
    }

    /// Number of cached expressions.
    pub fn cached_expressions(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|cache| cache.read().ok().map(|entries| entries.len()))
            .unwrap_or(0)
    }
}

impl<N: XmlNode> XPathSelect<N> for XPathEvaluator {
    fn select(
        &self,
        expression: &str,
        context: &N,
        single: bool,
    ) -> Result<Selected<N>, SelectError> {
        let value = self
            .evaluate(expression, context)
            .map_err(|e| SelectError::new(expression, e.to_string()))?;
        Ok(match value {
            XPathValue::NodeSet(nodes) if single => match nodes.into_iter().next() {
                Some(node) => Selected::Node(node),
                None => Selected::Nothing,
            },
            XPathValue::NodeSet(nodes) if nodes.is_empty() => Selected::Nothing,
            XPathValue::NodeSet(nodes) => Selected::Nodes(nodes),
            XPathValue::String(s) => Selected::String(s),
            XPathValue::Number(n) => Selected::Number(n),
            XPathValue::Boolean(b) => Selected::Boolean(b),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EvaluatorBuilder {
    cache_expressions: bool,
    strict_functions: bool,
}

impl Default for EvaluatorBuilder {
    fn default() -> Self {
        Self {
            cache_expressions: true,
            strict_functions: true,
        }
    }
}

impl EvaluatorBuilder {
    /// Enabled by default. The cache grows with every distinct expression, so disable it
    /// when expressions come from untrusted or unbounded input.
    pub fn cache_expressions(mut self, enabled: bool) -> Self {
        self.cache_expressions = enabled;
        self
    }

    /// When disabled, calls to unknown functions evaluate to `""` with a warning.
    pub fn strict_functions(mut self, enabled: bool) -> Self {
        self.strict_functions = enabled;
        self
    }

    pub fn build(self) -> XPathEvaluator {
        XPathEvaluator {
            cache: self
                .cache_expressions
                .then(|| RwLock::new(HashMap::new())),
            strict_functions: self.strict_functions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlbind_dom::{Document, Node};

    const XML: &str = r#"<list><entry key="x">1</entry><entry key="y">2</entry></list>"#;

    #[test]
    fn test_single_selection_takes_the_first_node() {
        let doc = Document::parse(XML).unwrap();
        let evaluator = XPathEvaluator::new();
        let selected = evaluator.select("//entry", &doc.root(), true).unwrap();
        let Selected::Node(node) = selected else {
            panic!("expected a single node, got {:?}", selected);
        };
        assert_eq!(node.string_value(), "1");
    }

    #[test]
    fn test_array_and_empty_selections() {
        let doc = Document::parse(XML).unwrap();
        let evaluator = XPathEvaluator::new();
        let all = evaluator.select("//entry/@key", &doc.root(), false).unwrap();
        let Selected::Nodes(nodes) = all else {
            panic!("expected nodes, got {:?}", all);
        };
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            evaluator.select("//missing", &doc.root(), false).unwrap(),
            Selected::<Node>::Nothing
        );
        assert_eq!(
            evaluator.select("//missing", &doc.root(), true).unwrap(),
            Selected::<Node>::Nothing
        );
    }

    #[test]
    fn test_primitive_results_pass_through() {
        let doc = Document::parse(XML).unwrap();
        let evaluator = XPathEvaluator::new();
        let entry = doc.root_element().unwrap().children().next().unwrap();
        assert_eq!(
            evaluator.select("string(.)", &entry, true).unwrap(),
            Selected::String("1".into())
        );
        assert_eq!(
            evaluator.select("number(.)", &entry, true).unwrap(),
            Selected::Number(1.0)
        );
        assert_eq!(
            evaluator.select("@key = 'x'", &entry, true).unwrap(),
            Selected::Boolean(true)
        );
    }

    #[test]
    fn test_errors_name_the_expression() {
        let doc = Document::parse(XML).unwrap();
        let evaluator = XPathEvaluator::new();
        let err = evaluator.select("//entry[", &doc.root(), true).unwrap_err();
        assert_eq!(err.expression, "//entry[");
        assert!(err.to_string().starts_with("XPath expression \"//entry[\""));
    }

    #[test]
    fn test_expression_cache() {
        let doc = Document::parse(XML).unwrap();
        let cached = XPathEvaluator::new();
        cached.evaluate("//entry", &doc.root()).unwrap();
        cached.evaluate("//entry", &doc.root()).unwrap();
        cached.evaluate("count(//entry)", &doc.root()).unwrap();
        assert_eq!(cached.cached_expressions(), 2);

        let uncached = XPathEvaluator::builder().cache_expressions(false).build();
        uncached.evaluate("//entry", &doc.root()).unwrap();
        assert_eq!(uncached.cached_expressions(), 0);
    }

    #[test]
    fn test_cache_keeps_every_distinct_expression() {
        let doc = Document::parse(XML).unwrap();
        let cached = XPathEvaluator::new();
        let uncached = XPathEvaluator::builder().cache_expressions(false).build();
        for i in 0..50 {
            let expression = format!("count(//entry) + {i}");
            cached.evaluate(&expression, &doc.root()).unwrap();
            uncached.evaluate(&expression, &doc.root()).unwrap();
        }
        assert_eq!(cached.cached_expressions(), 50);
        assert_eq!(uncached.cached_expressions(), 0);
    }

    #[test]
    fn test_lenient_functions() {
        let doc = Document::parse(XML).unwrap();
        let lenient = XPathEvaluator::builder().strict_functions(false).build();
        assert_eq!(
            lenient.evaluate("custom()", &doc.root()).unwrap(),
            XPathValue::String(String::new())
        );
        assert!(XPathEvaluator::new().evaluate("custom()", &doc.root()).is_err());
    }
}
