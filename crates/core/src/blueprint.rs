//! Object blueprints: an ordered set of named field extractors.
use crate::error::{BoxError, Error};
use crate::extractor::SingleNodeDataExtractorFactory;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use xmlbind_dom::XPathSelect;

/// A field extractor in its compiled form.
pub type FieldFn<N> =
    Arc<dyn Fn(&N, &dyn XPathSelect<N>) -> Result<Option<Value>, Error> + Send + Sync>;

/// Erases the output type of a single-node factory so fields of different types can share
/// one blueprint.
pub(crate) trait FieldFactory<N>: Send + Sync {
    fn create_field_extractor(&self) -> Result<FieldFn<N>, Error>;
}

impl<N, F> FieldFactory<N> for F
where
    N: 'static,
    F: SingleNodeDataExtractorFactory<N> + Send + Sync,
    F::Output: Into<Value> + 'static,
{
    fn create_field_extractor(&self) -> Result<FieldFn<N>, Error> {
        let extract = self.create_single_node_data_extractor()?;
        Ok(Arc::new(move |node: &N, select: &dyn XPathSelect<N>| {
            Ok(extract(node, select)?.map(Into::into))
        }))
    }
}

pub(crate) enum FieldExtractor<N> {
    /// Used as is on every invocation.
    Function(FieldFn<N>),
    /// Compiled once, when the object mapper is created.
    Factory(Arc<dyn FieldFactory<N>>),
}

impl<N> Clone for FieldExtractor<N> {
    fn clone(&self) -> Self {
        match self {
            FieldExtractor::Function(f) => FieldExtractor::Function(Arc::clone(f)),
            FieldExtractor::Factory(f) => FieldExtractor::Factory(Arc::clone(f)),
        }
    }
}

impl<N> FieldExtractor<N> {
    pub(crate) fn resolve(&self) -> Result<FieldFn<N>, Error> {
        match self {
            FieldExtractor::Function(f) => Ok(Arc::clone(f)),
            FieldExtractor::Factory(factory) => factory.create_field_extractor(),
        }
    }
}

/// Describes the object produced for a node: each field is either a plain function or an
/// extractor factory.
///
/// Field order is kept, and re-declaring a field replaces its extractor in place.
///
/// ```ignore
/// let person = Blueprint::new()
///     .field("name", map().to_node("name").mandatory().as_string())
///     .field("age", map().to_node("age").as_number())
///     .field_fn("kind", |_, _| Ok(Some("person".into())));
/// ```
pub struct Blueprint<N> {
    fields: IndexMap<String, FieldExtractor<N>>,
}

impl<N> Clone for Blueprint<N> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<N> Default for Blueprint<N> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }
}

impl<N> fmt::Debug for Blueprint<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<N: 'static> Blueprint<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: SingleNodeDataExtractorFactory<N> + Send + Sync + 'static,
        F::Output: Into<Value> + 'static,
    {
        self.fields
            .insert(name.into(), FieldExtractor::Factory(Arc::new(factory)));
        self
    }

    /// A field computed by `extract` on every invocation. Returning `Ok(None)` omits the
    /// field from the object.
    pub fn field_fn<F>(mut self, name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&N, &dyn XPathSelect<N>) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        let extract: FieldFn<N> = Arc::new(move |node: &N, select: &dyn XPathSelect<N>| {
            extract(node, select).map_err(Error::from_boxed)
        });
        self.fields
            .insert(name.into(), FieldExtractor::Function(extract));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub(crate) fn into_fields(self) -> IndexMap<String, FieldExtractor<N>> {
        self.fields
    }
}
