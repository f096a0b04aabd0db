//! Data extractor factories: turn looked-up nodes into values.
//!
//! Extractors come in two capability sets. Single-node extractors receive one node;
//! nodes-array extractors receive the whole non-empty result of an array lookup. A binding
//! only accepts the set matching its lookup's cardinality.
mod array;
mod custom;
mod object;
mod primitive;
mod recursive;

pub use array::NodesArrayDataMapper;
pub use custom::{CallbackExtractor, CustomArrayExtractor};
pub use object::ObjectExtractor;
pub use primitive::{
    BooleanExtractor, NumberExtractor, StringExtractor, extract_boolean, extract_number,
    extract_string, string_to_boolean,
};
pub use recursive::{BlueprintFactory, RecursionScope, RecursiveObjectExtractor, RecursiveSource};

use crate::error::Error;
use crate::lookup::Cardinality;
use std::sync::Arc;
use xmlbind_dom::XPathSelect;

/// A compiled single-node extractor. `Ok(None)` means "no value".
pub type SingleNodeExtractFn<N, T> =
    Arc<dyn Fn(&N, &dyn XPathSelect<N>) -> Result<Option<T>, Error> + Send + Sync>;

/// A compiled nodes-array extractor. The slice is never empty.
pub type NodesArrayExtractFn<N, T> =
    Arc<dyn Fn(&[N], &dyn XPathSelect<N>) -> Result<Option<T>, Error> + Send + Sync>;

pub trait SingleNodeDataExtractorFactory<N> {
    type Output;

    fn create_single_node_data_extractor(
        &self,
    ) -> Result<SingleNodeExtractFn<N, Self::Output>, Error>;
}

pub trait NodesArrayDataExtractorFactory<N> {
    type Output;

    fn create_nodes_array_data_extractor(
        &self,
    ) -> Result<NodesArrayExtractFn<N, Self::Output>, Error>;
}

impl<N, F: SingleNodeDataExtractorFactory<N> + ?Sized> SingleNodeDataExtractorFactory<N>
    for Arc<F>
{
    type Output = F::Output;

    fn create_single_node_data_extractor(
        &self,
    ) -> Result<SingleNodeExtractFn<N, Self::Output>, Error> {
        (**self).create_single_node_data_extractor()
    }
}

/// An extractor factory tagged with its capability set.
pub enum DataExtractorFactory<N, R> {
    Single(Arc<dyn SingleNodeDataExtractorFactory<N, Output = R> + Send + Sync>),
    Array(Arc<dyn NodesArrayDataExtractorFactory<N, Output = R> + Send + Sync>),
}

impl<N, R> Clone for DataExtractorFactory<N, R> {
    fn clone(&self) -> Self {
        match self {
            DataExtractorFactory::Single(factory) => DataExtractorFactory::Single(Arc::clone(factory)),
            DataExtractorFactory::Array(factory) => DataExtractorFactory::Array(Arc::clone(factory)),
        }
    }
}

impl<N, R> DataExtractorFactory<N, R> {
    pub fn single<F>(factory: F) -> Self
    where
        F: SingleNodeDataExtractorFactory<N, Output = R> + Send + Sync + 'static,
    {
        DataExtractorFactory::Single(Arc::new(factory))
    }

    pub fn array<F>(factory: F) -> Self
    where
        F: NodesArrayDataExtractorFactory<N, Output = R> + Send + Sync + 'static,
    {
        DataExtractorFactory::Array(Arc::new(factory))
    }

    /// The lookup cardinality this extractor pairs with.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            DataExtractorFactory::Single(_) => Cardinality::Single,
            DataExtractorFactory::Array(_) => Cardinality::Array,
        }
    }
}
