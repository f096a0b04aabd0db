//! The lookup-to-extractor binding: lookup, extraction, conversion and default, compiled into
//! one function.
use crate::error::{BindingError, BindingStage, BoxError, Error};
use crate::extractor::{DataExtractorFactory, SingleNodeDataExtractorFactory, SingleNodeExtractFn};
use crate::lookup::{Cardinality, LookupBuilder, LookupResult};
use std::fmt;
use std::sync::Arc;
use xmlbind_dom::{TypedNode, XPathSelect};

type ConversionFn<R, T> = Arc<dyn Fn(R) -> Result<T, BoxError> + Send + Sync>;

type CompiledExtractFn<N, R> =
    Arc<dyn Fn(LookupResult<N>, &dyn XPathSelect<N>) -> Result<Option<R>, Error> + Send + Sync>;

/// A compiled binding: a pure function of the context node and the XPath evaluator.
pub struct NodeDataExtractor<N, T> {
    extract: SingleNodeExtractFn<N, T>,
}

impl<N, T> Clone for NodeDataExtractor<N, T> {
    fn clone(&self) -> Self {
        Self {
            extract: Arc::clone(&self.extract),
        }
    }
}

impl<N, T> fmt::Debug for NodeDataExtractor<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeDataExtractor")
    }
}

impl<N, T> NodeDataExtractor<N, T> {
    pub fn new(extract: SingleNodeExtractFn<N, T>) -> Self {
        Self { extract }
    }

    pub fn extract(&self, node: &N, select: &dyn XPathSelect<N>) -> Result<Option<T>, Error> {
        (self.extract)(node, select)
    }

    pub fn into_fn(self) -> SingleNodeExtractFn<N, T> {
        self.extract
    }
}

/// Composes a lookup with an extractor factory, an optional conversion and an optional
/// default value.
///
/// `R` is the extractor's output and `T` the value after conversion. Every method returns a
/// new builder. Nothing runs until [`create_node_data_extractor`](Self::create_node_data_extractor)
/// is called, and the lookup only runs when the resulting extractor is invoked.
pub struct BindingBuilder<N, R, T = R> {
    lookup: LookupBuilder<N>,
    extractor: DataExtractorFactory<N, R>,
    conversion: ConversionFn<R, T>,
    default: Option<T>,
    name: Option<String>,
}

impl<N, R, T: Clone> Clone for BindingBuilder<N, R, T> {
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup.clone(),
            extractor: self.extractor.clone(),
            conversion: Arc::clone(&self.conversion),
            default: self.default.clone(),
            name: self.name.clone(),
        }
    }
}

impl<N, R, T: fmt::Debug> fmt::Debug for BindingBuilder<N, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingBuilder")
            .field("lookup", &self.lookup)
            .field("extractor", &self.extractor.cardinality())
            .field("default", &self.default)
            .field("name", &self.name)
            .finish()
    }
}

impl<N: TypedNode + 'static, R: 'static> BindingBuilder<N, R> {
    /// The binding takes its name from the lookup, if it has one.
    pub fn new(lookup: LookupBuilder<N>, extractor: DataExtractorFactory<N, R>) -> Self {
        let name = lookup.name().map(str::to_string);
        Self {
            lookup,
            extractor,
            conversion: Arc::new(|raw: R| Ok::<R, BoxError>(raw)),
            default: None,
            name,
        }
    }
}

impl<N, R, T> BindingBuilder<N, R, T>
where
    N: TypedNode + 'static,
    R: 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    /// The value returned when the lookup or the extractor yields nothing.
    pub fn with_default(&self, value: T) -> Self {
        Self {
            default: Some(value),
            ..self.clone()
        }
    }

    /// Converts extracted values. Replaces any earlier conversion and discards the default,
    /// which was typed for the previous output.
    pub fn with_conversion<U, F>(&self, conversion: F) -> BindingBuilder<N, R, U>
    where
        F: Fn(R) -> Result<U, BoxError> + Send + Sync + 'static,
    {
        BindingBuilder {
            lookup: self.lookup.clone(),
            extractor: self.extractor.clone(),
            conversion: Arc::new(conversion),
            default: None,
            name: self.name.clone(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn lookup(&self) -> &LookupBuilder<N> {
        &self.lookup
    }

    /// Compiles the binding.
    ///
    /// Fails right away with [`Error::IncompatibleExtractor`] when a single-node lookup is
    /// paired with a nodes-array extractor or the other way round.
    pub fn create_node_data_extractor(&self) -> Result<NodeDataExtractor<N, T>, Error> {
        let extract = self.compile_extractor()?;
        let lookup = self.lookup.build_lookup();
        let conversion = Arc::clone(&self.conversion);
        let default = self.default.clone();
        let name = self.name.clone();
        let path: Arc<str> = Arc::from(self.lookup.get_path());
        log::trace!(
            "Compiled binding {:?} for lookup path '{}'",
            name.as_deref().unwrap_or("<unnamed>"),
            path
        );

        Ok(NodeDataExtractor::new(Arc::new(
            move |node: &N, select: &dyn XPathSelect<N>| {
                let found = match lookup(node, select) {
                    Ok(Some(found)) => found,
                    Ok(None) => return Ok(default.clone()),
                    Err(e) => return Err(wrap(&name, &path, BindingStage::Lookup, e.into())),
                };

                let raw = extract(found, select)
                    .map_err(|e| wrap(&name, &path, BindingStage::Extraction, e))?;

                let converted = match raw {
                    Some(raw) => Some(conversion(raw).map_err(|e| {
                        wrap(&name, &path, BindingStage::Conversion, Error::from_boxed(e))
                    })?),
                    None => None,
                };
                Ok(converted.or_else(|| default.clone()))
            },
        )))
    }

    fn compile_extractor(&self) -> Result<CompiledExtractFn<N, R>, Error> {
        let path = self.lookup.get_path().to_string();
        match (self.lookup.cardinality(), &self.extractor) {
            (Cardinality::Single, DataExtractorFactory::Single(factory)) => {
                let extract = factory.create_single_node_data_extractor()?;
                Ok(Arc::new(
                    move |found: LookupResult<N>, select: &dyn XPathSelect<N>| match found {
                        LookupResult::Node(node) => extract(&node, select),
                        LookupResult::Nodes(_) => Err(Error::IncompatibleExtractor {
                            path: path.clone(),
                            lookup: Cardinality::Array.as_str(),
                            extractor: Cardinality::Single.as_str(),
                        }),
                    },
                ))
            }
            (Cardinality::Array, DataExtractorFactory::Array(factory)) => {
                let extract = factory.create_nodes_array_data_extractor()?;
                Ok(Arc::new(
                    move |found: LookupResult<N>, select: &dyn XPathSelect<N>| match found {
                        LookupResult::Nodes(nodes) => extract(&nodes, select),
                        LookupResult::Node(node) => extract(std::slice::from_ref(&node), select),
                    },
                ))
            }
            (lookup, extractor) => Err(Error::IncompatibleExtractor {
                path,
                lookup: lookup.as_str(),
                extractor: extractor.cardinality().as_str(),
            }),
        }
    }
}

/// Attributes a failure to the binding. Mapping errors already carry their context and
/// pass through unchanged.
fn wrap(name: &Option<String>, path: &str, stage: BindingStage, cause: Error) -> Error {
    match cause {
        Error::Mapping(mapping) => Error::Mapping(mapping),
        cause => BindingError::new(name.clone(), path, stage, cause).into(),
    }
}

impl<N, R, T> SingleNodeDataExtractorFactory<N> for BindingBuilder<N, R, T>
where
    N: TypedNode + 'static,
    R: 'static,
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, T>, Error> {
        Ok(self.create_node_data_extractor()?.into_fn())
    }
}
