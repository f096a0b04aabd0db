use super::factory::{Cardinality, LookupFactory, LookupFn};
use crate::binding::BindingBuilder;
use crate::blueprint::Blueprint;
use crate::error::{BoxError, LookupError};
use crate::extractor::{
    BooleanExtractor, CallbackExtractor, CustomArrayExtractor, DataExtractorFactory,
    NodesArrayDataMapper, NumberExtractor, ObjectExtractor, RecursiveObjectExtractor,
    RecursiveSource, SingleNodeDataExtractorFactory, StringExtractor,
};
use crate::value::Object;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use xmlbind_dom::{TypedNode, XPathSelect};

/// A lookup factory bound to a path, with a mandatory / optional policy.
///
/// Builders are values: every method returns a new builder and leaves `self` untouched, so
/// one base lookup can feed several chains.
pub struct LookupBuilder<N> {
    factory: LookupFactory,
    path: Arc<str>,
    mandatory: bool,
    name: Option<String>,
    _node: PhantomData<fn(&N)>,
}

impl<N> Clone for LookupBuilder<N> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory,
            path: Arc::clone(&self.path),
            mandatory: self.mandatory,
            name: self.name.clone(),
            _node: PhantomData,
        }
    }
}

impl<N> fmt::Debug for LookupBuilder<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupBuilder")
            .field("factory", &self.factory)
            .field("path", &self.path)
            .field("mandatory", &self.mandatory)
            .field("name", &self.name)
            .finish()
    }
}

impl<N: TypedNode + 'static> LookupBuilder<N> {
    /// Lookups start out optional.
    pub fn new(factory: LookupFactory, path: &str) -> Self {
        Self {
            factory,
            path: Arc::from(path),
            mandatory: false,
            name: None,
            _node: PhantomData,
        }
    }

    pub fn mandatory(&self) -> Self {
        Self {
            mandatory: true,
            ..self.clone()
        }
    }

    pub fn optional(&self) -> Self {
        Self {
            mandatory: false,
            ..self.clone()
        }
    }

    /// Sets the name bindings built from this lookup report in their errors.
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn get_path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn factory(&self) -> LookupFactory {
        self.factory
    }

    pub fn cardinality(&self) -> Cardinality {
        self.factory.cardinality()
    }

    /// Compiles the lookup. A mandatory lookup that finds nothing fails with
    /// [`LookupError::NotFound`].
    pub fn build_lookup(&self) -> LookupFn<N> {
        let lookup = self.factory.create_lookup::<N>(&self.path);
        if !self.mandatory {
            return lookup;
        }
        let path = Arc::clone(&self.path);
        Arc::new(move |node: &N, select: &dyn XPathSelect<N>| {
            match lookup(node, select)? {
                Some(result) => Ok(Some(result)),
                None => Err(LookupError::NotFound {
                    path: path.to_string(),
                }),
            }
        })
    }

    fn bind<R: 'static>(&self, extractor: DataExtractorFactory<N, R>) -> BindingBuilder<N, R> {
        BindingBuilder::new(self.clone(), extractor)
    }
}

/// A lookup that yields at most one node.
pub struct NodeLookupBuilder<N>(LookupBuilder<N>);

impl<N> Clone for NodeLookupBuilder<N> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<N> fmt::Debug for NodeLookupBuilder<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeLookupBuilder").field(&self.0).finish()
    }
}

impl<N: TypedNode + 'static> NodeLookupBuilder<N> {
    pub(crate) fn new(lookup: LookupBuilder<N>) -> Self {
        Self(lookup)
    }

    pub fn mandatory(&self) -> Self {
        Self(self.0.mandatory())
    }

    pub fn optional(&self) -> Self {
        Self(self.0.optional())
    }

    pub fn named(&self, name: impl Into<String>) -> Self {
        Self(self.0.named(name))
    }

    pub fn get_path(&self) -> &str {
        self.0.get_path()
    }

    pub fn build_lookup(&self) -> LookupFn<N> {
        self.0.build_lookup()
    }

    pub fn lookup(&self) -> &LookupBuilder<N> {
        &self.0
    }

    pub fn as_string(&self) -> BindingBuilder<N, String> {
        self.0.bind(DataExtractorFactory::single(StringExtractor))
    }

    pub fn as_number(&self) -> BindingBuilder<N, f64> {
        self.0.bind(DataExtractorFactory::single(NumberExtractor))
    }

    pub fn as_boolean(&self) -> BindingBuilder<N, bool> {
        self.0.bind(DataExtractorFactory::single(BooleanExtractor))
    }

    pub fn as_object(&self, blueprint: Blueprint<N>) -> BindingBuilder<N, Object> {
        self.0
            .bind(DataExtractorFactory::single(ObjectExtractor::new(blueprint)))
    }

    /// Maps the node with a blueprint produced by a recursion scope; see [`RecursiveSource`].
    pub fn as_recursive_object(
        &self,
        source: impl Into<RecursiveSource<N>>,
    ) -> BindingBuilder<N, Object> {
        self.0.bind(DataExtractorFactory::single(
            RecursiveObjectExtractor::new(source.into()),
        ))
    }

    pub fn callback<T, F>(&self, callback: F) -> BindingBuilder<N, T>
    where
        T: 'static,
        F: Fn(&N, &dyn XPathSelect<N>) -> Result<Option<T>, BoxError> + Send + Sync + 'static,
    {
        self.0
            .bind(DataExtractorFactory::single(CallbackExtractor::new(callback)))
    }

    /// Like [`callback`](Self::callback), with the extractor supplied as a factory.
    pub fn callback_factory<F>(&self, factory: F) -> BindingBuilder<N, F::Output>
    where
        F: SingleNodeDataExtractorFactory<N> + Send + Sync + 'static,
        F::Output: 'static,
    {
        self.0.bind(DataExtractorFactory::single(factory))
    }
}

/// A lookup that yields a non-empty array of nodes, or nothing.
pub struct NodesArrayLookupBuilder<N>(LookupBuilder<N>);

impl<N> Clone for NodesArrayLookupBuilder<N> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<N> fmt::Debug for NodesArrayLookupBuilder<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodesArrayLookupBuilder")
            .field(&self.0)
            .finish()
    }
}

impl<N: TypedNode + 'static> NodesArrayLookupBuilder<N> {
    pub(crate) fn new(lookup: LookupBuilder<N>) -> Self {
        Self(lookup)
    }

    pub fn mandatory(&self) -> Self {
        Self(self.0.mandatory())
    }

    pub fn optional(&self) -> Self {
        Self(self.0.optional())
    }

    pub fn named(&self, name: impl Into<String>) -> Self {
        Self(self.0.named(name))
    }

    pub fn get_path(&self) -> &str {
        self.0.get_path()
    }

    pub fn build_lookup(&self) -> LookupFn<N> {
        self.0.build_lookup()
    }

    pub fn lookup(&self) -> &LookupBuilder<N> {
        &self.0
    }

    pub fn as_array(&self) -> ArrayExtractionBuilder<N> {
        ArrayExtractionBuilder(self.0.clone())
    }
}

/// Chooses how the nodes of an array lookup are extracted: element by element
/// (`of_*`, [`using_mapper`](Self::using_mapper)) or all at once ([`callback`](Self::callback)).
pub struct ArrayExtractionBuilder<N>(LookupBuilder<N>);

impl<N> Clone for ArrayExtractionBuilder<N> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<N: TypedNode + 'static> ArrayExtractionBuilder<N> {
    pub fn of_strings(&self) -> BindingBuilder<N, Vec<String>> {
        self.using_mapper(StringExtractor)
    }

    pub fn of_numbers(&self) -> BindingBuilder<N, Vec<f64>> {
        self.using_mapper(NumberExtractor)
    }

    pub fn of_booleans(&self) -> BindingBuilder<N, Vec<bool>> {
        self.using_mapper(BooleanExtractor)
    }

    pub fn of_objects(&self, blueprint: Blueprint<N>) -> BindingBuilder<N, Vec<Object>> {
        self.using_mapper(ObjectExtractor::new(blueprint))
    }

    pub fn of_recursive_objects(
        &self,
        source: impl Into<RecursiveSource<N>>,
    ) -> BindingBuilder<N, Vec<Object>> {
        self.using_mapper(RecursiveObjectExtractor::new(source.into()))
    }

    /// Applies a single-node extractor to every node, dropping elements it yields nothing for.
    pub fn using_mapper<F>(&self, mapper: F) -> BindingBuilder<N, Vec<F::Output>>
    where
        F: SingleNodeDataExtractorFactory<N> + Send + Sync + 'static,
        F::Output: 'static,
    {
        self.0
            .bind(DataExtractorFactory::array(NodesArrayDataMapper::new(mapper)))
    }

    /// Hands the whole node array to `callback`, for aggregates such as sums or joins.
    pub fn callback<T, F>(&self, callback: F) -> BindingBuilder<N, T>
    where
        T: 'static,
        F: Fn(&[N], &dyn XPathSelect<N>) -> Result<Option<T>, BoxError> + Send + Sync + 'static,
    {
        self.0
            .bind(DataExtractorFactory::array(CustomArrayExtractor::new(callback)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupResult;
    use xmlbind_dom::{Document, Node};
    use xmlbind_xpath::XPathEvaluator;

    fn document() -> Document {
        Document::parse(r#"<root><item id="1"/><item id="2"/></root>"#).unwrap()
    }

    #[test]
    fn test_mandatory_and_optional_return_new_builders() {
        let base = LookupBuilder::<Node>::new(LookupFactory::element(), "missing");
        let mandatory = base.mandatory();
        assert!(!base.is_mandatory());
        assert!(mandatory.is_mandatory());
        assert!(!mandatory.optional().is_mandatory());
        assert_eq!(mandatory.get_path(), "missing");
    }

    #[test]
    fn test_build_lookup_applies_the_mandatory_policy() {
        let doc = document();
        let evaluator = XPathEvaluator::new();
        let base = LookupBuilder::<Node>::new(LookupFactory::element(), "missing");

        let optional = base.build_lookup();
        assert_eq!(optional(&doc.root(), &evaluator), Ok(None));

        let mandatory = base.mandatory().build_lookup();
        let err = mandatory(&doc.root(), &evaluator).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Mandatory node(s) was not found by path: missing"
        );
    }

    #[test]
    fn test_array_lookup_results() {
        let doc = document();
        let evaluator = XPathEvaluator::new();
        let items = NodesArrayLookupBuilder::new(LookupBuilder::<Node>::new(
            LookupFactory::elements_array(),
            "//item",
        ));
        let Some(LookupResult::Nodes(nodes)) = items.build_lookup()(&doc.root(), &evaluator).unwrap()
        else {
            panic!("expected nodes");
        };
        assert_eq!(nodes.len(), 2);

        let attrs = NodesArrayLookupBuilder::new(LookupBuilder::<Node>::new(
            LookupFactory::attributes_array(),
            "//item",
        ));
        let err = attrs.build_lookup()(&doc.root(), &evaluator).unwrap_err();
        assert!(matches!(err, LookupError::UnexpectedResult { .. }));
    }

    #[test]
    fn test_one_base_lookup_feeds_several_chains() {
        let doc = document();
        let evaluator = XPathEvaluator::new();
        let first = NodeLookupBuilder::new(LookupBuilder::<Node>::new(
            LookupFactory::attribute(),
            "//item[1]/@id",
        ))
        .mandatory();

        let as_number = first.as_number().create_node_data_extractor().unwrap();
        let as_text = first
            .callback(|node: &Node, select: &dyn XPathSelect<Node>| {
                let raw = crate::extractor::extract_string(node, select).map_err(BoxError::from)?;
                Ok(raw.map(|s| format!("#{}", s)))
            })
            .create_node_data_extractor()
            .unwrap();

        assert_eq!(as_number.extract(&doc.root(), &evaluator).unwrap(), Some(1.0));
        assert_eq!(
            as_text.extract(&doc.root(), &evaluator).unwrap(),
            Some("#1".to_string())
        );
        assert!(first.lookup().is_mandatory());
    }
}
