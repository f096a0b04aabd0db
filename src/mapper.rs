// src/mapper.rs
use crate::error::XmlBindError;
use serde::de::DeserializeOwned;
use xmlbind_core::{Blueprint, MappingError, Object, ObjectMapper, create_object_mapper};
use xmlbind_dom::{Document, Node};
use xmlbind_xpath::XPathEvaluator;

/// A compiled blueprint paired with the XPath evaluator it queries with.
///
/// Building the mapper compiles every field once; the mapper can then be applied to any
/// number of documents, from any number of threads.
///
/// ```ignore
/// let mapper = XmlMapper::new(
///     Blueprint::new()
///         .field("id", map().to_attribute("item/@id").mandatory().as_string())
///         .field("tags", map().to_elements_array("item/tag").as_array().of_strings()),
/// )?;
/// let item = mapper.map_str(r#"<item id="7"><tag>a</tag></item>"#)?;
/// ```
#[derive(Debug)]
pub struct XmlMapper {
    mapper: ObjectMapper<Node>,
    evaluator: XPathEvaluator,
}

impl XmlMapper {
    pub fn new(blueprint: Blueprint<Node>) -> Result<Self, MappingError> {
        Ok(Self {
            mapper: create_object_mapper(blueprint)?,
            evaluator: XPathEvaluator::new(),
        })
    }

    /// Replaces the default evaluator, e.g. one built with lenient unknown functions.
    pub fn with_evaluator(self, evaluator: XPathEvaluator) -> Self {
        Self { evaluator, ..self }
    }

    pub fn evaluator(&self) -> &XPathEvaluator {
        &self.evaluator
    }

    /// Maps with `node` as the context node.
    pub fn map(&self, node: &Node) -> Result<Object, MappingError> {
        self.mapper.map(node, &self.evaluator)
    }

    /// Maps with the document node as the context node, so paths start at the document
    /// element's name (`catalog/item`, not `item`).
    pub fn map_document(&self, document: &Document) -> Result<Object, MappingError> {
        self.map(&document.root())
    }

    pub fn map_str(&self, xml: &str) -> Result<Object, XmlBindError> {
        let document = Document::parse(xml)?;
        log::debug!("Parsed document with {} node(s)", document.len());
        Ok(self.map_document(&document)?)
    }

    /// Maps `xml` and deserializes the resulting object into `T`.
    pub fn map_str_into<T: DeserializeOwned>(&self, xml: &str) -> Result<T, XmlBindError> {
        let object = self.map_str(xml)?;
        object.deserialize_into().map_err(XmlBindError::from)
    }
}
