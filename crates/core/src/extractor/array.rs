use super::{NodesArrayDataExtractorFactory, NodesArrayExtractFn, SingleNodeDataExtractorFactory};
use crate::error::{Error, MappingError};
use std::sync::Arc;
use xmlbind_dom::XPathSelect;

/// Applies a single-node extractor to each node of an array lookup, in lookup order.
///
/// Elements the extractor yields nothing for are dropped. A failing element aborts the
/// whole array with a [`MappingError`] carrying the element's index.
pub struct NodesArrayDataMapper<N, T> {
    element: Arc<dyn SingleNodeDataExtractorFactory<N, Output = T> + Send + Sync>,
}

impl<N, T> Clone for NodesArrayDataMapper<N, T> {
    fn clone(&self) -> Self {
        Self {
            element: Arc::clone(&self.element),
        }
    }
}

impl<N, T> NodesArrayDataMapper<N, T> {
    pub fn new<F>(element: F) -> Self
    where
        F: SingleNodeDataExtractorFactory<N, Output = T> + Send + Sync + 'static,
    {
        Self {
            element: Arc::new(element),
        }
    }
}

impl<N: 'static, T: 'static> NodesArrayDataExtractorFactory<N> for NodesArrayDataMapper<N, T> {
    type Output = Vec<T>;

    fn create_nodes_array_data_extractor(&self) -> Result<NodesArrayExtractFn<N, Vec<T>>, Error> {
        let extract = self.element.create_single_node_data_extractor()?;
        Ok(Arc::new(move |nodes: &[N], select: &dyn XPathSelect<N>| {
            let mut values = Vec::with_capacity(nodes.len());
            for (index, node) in nodes.iter().enumerate() {
                match extract(node, select) {
                    Ok(Some(value)) => values.push(value),
                    Ok(None) => {}
                    Err(error) => return Err(MappingError::new(index, error).into()),
                }
            }
            Ok(Some(values))
        }))
    }
}
