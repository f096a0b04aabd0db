//! The entry point of the fluent API.
//!
//! ```ignore
//! let title = map().to_node("title").mandatory().as_string();
//! let tags = map().to_elements_array("tag").as_array().of_strings();
//! let kind = map().constant("book");
//! ```
use crate::binding::NodeDataExtractor;
use crate::error::Error;
use crate::extractor::{SingleNodeDataExtractorFactory, SingleNodeExtractFn};
use crate::lookup::{LookupBuilder, LookupFactory, NodeLookupBuilder, NodesArrayLookupBuilder};
use std::sync::Arc;
use xmlbind_dom::{TypedNode, XPathSelect};

pub fn map() -> MappingBuilder {
    MappingBuilder::default()
}

/// Starts a binding. A name set here is carried into the errors of the binding it starts.
#[derive(Debug, Clone, Default)]
pub struct MappingBuilder {
    name: Option<String>,
}

impl MappingBuilder {
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    fn lookup<N: TypedNode + 'static>(&self, factory: LookupFactory, path: &str) -> LookupBuilder<N> {
        let lookup = LookupBuilder::new(factory, path);
        match &self.name {
            Some(name) => lookup.named(name.clone()),
            None => lookup,
        }
    }

    /// Any single node: element, attribute, text, comment...
    pub fn to_node<N: TypedNode + 'static>(&self, path: &str) -> NodeLookupBuilder<N> {
        NodeLookupBuilder::new(self.lookup(LookupFactory::node(), path))
    }

    pub fn to_element<N: TypedNode + 'static>(&self, path: &str) -> NodeLookupBuilder<N> {
        NodeLookupBuilder::new(self.lookup(LookupFactory::element(), path))
    }

    pub fn to_attribute<N: TypedNode + 'static>(&self, path: &str) -> NodeLookupBuilder<N> {
        NodeLookupBuilder::new(self.lookup(LookupFactory::attribute(), path))
    }

    pub fn to_nodes_array<N: TypedNode + 'static>(&self, path: &str) -> NodesArrayLookupBuilder<N> {
        NodesArrayLookupBuilder::new(self.lookup(LookupFactory::nodes_array(), path))
    }

    pub fn to_elements_array<N: TypedNode + 'static>(
        &self,
        path: &str,
    ) -> NodesArrayLookupBuilder<N> {
        NodesArrayLookupBuilder::new(self.lookup(LookupFactory::elements_array(), path))
    }

    pub fn to_attributes_array<N: TypedNode + 'static>(
        &self,
        path: &str,
    ) -> NodesArrayLookupBuilder<N> {
        NodesArrayLookupBuilder::new(self.lookup(LookupFactory::attributes_array(), path))
    }

    /// A value independent of the document.
    pub fn constant<T: Clone + Send + Sync + 'static>(&self, value: T) -> ConstantBuilder<T> {
        ConstantBuilder { value }
    }
}

#[derive(Debug, Clone)]
pub struct ConstantBuilder<T> {
    value: T,
}

impl<T: Clone + Send + Sync + 'static> ConstantBuilder<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn create_node_data_extractor<N: 'static>(&self) -> NodeDataExtractor<N, T> {
        let value = self.value.clone();
        NodeDataExtractor::new(Arc::new(move |_: &N, _: &dyn XPathSelect<N>| {
            Ok(Some(value.clone()))
        }))
    }
}

impl<N: 'static, T: Clone + Send + Sync + 'static> SingleNodeDataExtractorFactory<N>
    for ConstantBuilder<T>
{
    type Output = T;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, T>, Error> {
        Ok(self.create_node_data_extractor().into_fn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{Cardinality, NodeKind};
    use xmlbind_dom::{Document, Node};
    use xmlbind_xpath::XPathEvaluator;

    #[test]
    fn test_lookup_kinds() {
        let cases = [
            (map().to_node::<Node>("x").lookup().factory(), NodeKind::Node, Cardinality::Single),
            (map().to_element::<Node>("x").lookup().factory(), NodeKind::Element, Cardinality::Single),
            (map().to_attribute::<Node>("@x").lookup().factory(), NodeKind::Attribute, Cardinality::Single),
            (map().to_nodes_array::<Node>("x").lookup().factory(), NodeKind::Node, Cardinality::Array),
            (map().to_elements_array::<Node>("x").lookup().factory(), NodeKind::Element, Cardinality::Array),
            (map().to_attributes_array::<Node>("@x").lookup().factory(), NodeKind::Attribute, Cardinality::Array),
        ];
        for (factory, kind, cardinality) in cases {
            assert_eq!(factory.kind(), kind);
            assert_eq!(factory.cardinality(), cardinality);
        }
    }

    #[test]
    fn test_named_mapping_names_the_lookup() {
        let lookup = map().named("id").to_attribute::<Node>("@id");
        assert_eq!(lookup.lookup().name(), Some("id"));
        assert_eq!(map().to_attribute::<Node>("@id").lookup().name(), None);
    }

    #[test]
    fn test_constant_ignores_the_document() {
        let doc = Document::parse("<a/>").unwrap();
        let constant = map().constant(42.0);
        assert_eq!(constant.value(), &42.0);
        let extractor = constant.create_node_data_extractor::<Node>();
        assert_eq!(
            extractor.extract(&doc.root(), &XPathEvaluator::new()).unwrap(),
            Some(42.0)
        );
    }
}
