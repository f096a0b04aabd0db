use super::{
    NodesArrayDataExtractorFactory, NodesArrayExtractFn, SingleNodeDataExtractorFactory,
    SingleNodeExtractFn,
};
use crate::error::{BoxError, Error};
use std::sync::Arc;
use xmlbind_dom::XPathSelect;

type SingleCallback<N, T> =
    Arc<dyn Fn(&N, &dyn XPathSelect<N>) -> Result<Option<T>, BoxError> + Send + Sync>;

type ArrayCallback<N, T> =
    Arc<dyn Fn(&[N], &dyn XPathSelect<N>) -> Result<Option<T>, BoxError> + Send + Sync>;

/// A caller-supplied function extracting a value from one node.
pub struct CallbackExtractor<N, T> {
    callback: SingleCallback<N, T>,
}

impl<N, T> Clone for CallbackExtractor<N, T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<N: 'static, T: 'static> CallbackExtractor<N, T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&N, &dyn XPathSelect<N>) -> Result<Option<T>, BoxError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl<N: 'static, T: 'static> SingleNodeDataExtractorFactory<N> for CallbackExtractor<N, T> {
    type Output = T;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, T>, Error> {
        let callback = Arc::clone(&self.callback);
        Ok(Arc::new(move |node: &N, select: &dyn XPathSelect<N>| {
            callback(node, select).map_err(Error::from_boxed)
        }))
    }
}

/// A caller-supplied function receiving every node of an array lookup at once.
pub struct CustomArrayExtractor<N, T> {
    callback: ArrayCallback<N, T>,
}

impl<N, T> Clone for CustomArrayExtractor<N, T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<N: 'static, T: 'static> CustomArrayExtractor<N, T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&[N], &dyn XPathSelect<N>) -> Result<Option<T>, BoxError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl<N: 'static, T: 'static> NodesArrayDataExtractorFactory<N> for CustomArrayExtractor<N, T> {
    type Output = T;

    fn create_nodes_array_data_extractor(&self) -> Result<NodesArrayExtractFn<N, T>, Error> {
        let callback = Arc::clone(&self.callback);
        Ok(Arc::new(move |nodes: &[N], select: &dyn XPathSelect<N>| {
            callback(nodes, select).map_err(Error::from_boxed)
        }))
    }
}
