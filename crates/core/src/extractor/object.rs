use super::{SingleNodeDataExtractorFactory, SingleNodeExtractFn};
use crate::blueprint::Blueprint;
use crate::error::Error;
use crate::mapper::create_object_mapper;
use crate::value::Object;
use std::sync::Arc;
use xmlbind_dom::XPathSelect;

/// Maps a node to an [`Object`] described by a blueprint.
pub struct ObjectExtractor<N> {
    blueprint: Blueprint<N>,
}

impl<N> Clone for ObjectExtractor<N> {
    fn clone(&self) -> Self {
        Self {
            blueprint: self.blueprint.clone(),
        }
    }
}

impl<N: 'static> ObjectExtractor<N> {
    pub fn new(blueprint: Blueprint<N>) -> Self {
        Self { blueprint }
    }
}

impl<N: 'static> SingleNodeDataExtractorFactory<N> for ObjectExtractor<N> {
    type Output = Object;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, Object>, Error> {
        let mapper = create_object_mapper(self.blueprint.clone())?;
        Ok(Arc::new(move |node: &N, select: &dyn XPathSelect<N>| {
            Ok(Some(mapper.map(node, select)?))
        }))
    }
}
