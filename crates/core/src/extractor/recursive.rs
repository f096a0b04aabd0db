//! Self-similar structures (trees, nested categories) mapped with a blueprint that refers
//! to itself through a recursion scope.
use super::{SingleNodeDataExtractorFactory, SingleNodeExtractFn};
use crate::blueprint::Blueprint;
use crate::error::Error;
use crate::mapper::create_object_mapper;
use crate::value::Object;
use std::fmt;
use std::sync::Arc;
use xmlbind_dom::XPathSelect;

/// Produces the blueprint for one level of a recursive structure.
pub type BlueprintFactory<N> = Arc<dyn Fn(&RecursionScope<N>) -> Blueprint<N> + Send + Sync>;

/// One level of a recursive mapping: the depth plus the factory shared by all levels.
///
/// The factory receives the scope of the level it builds, which it passes on to
/// `as_recursive_object` / `of_recursive_objects` for the next level down.
pub struct RecursionScope<N> {
    depth: usize,
    factory: BlueprintFactory<N>,
}

impl<N> Clone for RecursionScope<N> {
    fn clone(&self) -> Self {
        Self {
            depth: self.depth,
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<N> fmt::Debug for RecursionScope<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursionScope")
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl<N> RecursionScope<N> {
    pub fn root(factory: BlueprintFactory<N>) -> Self {
        Self { depth: 0, factory }
    }

    /// 0 for the outermost recursive object.
    pub fn get_depth(&self) -> usize {
        self.depth
    }

    /// The scope one level down, sharing this scope's factory.
    pub fn descend(&self) -> Self {
        Self {
            depth: self.depth + 1,
            factory: Arc::clone(&self.factory),
        }
    }

    pub fn blueprint(&self) -> Blueprint<N> {
        (self.factory)(self)
    }

    pub fn shares_factory_with(&self, other: &RecursionScope<N>) -> bool {
        Arc::ptr_eq(&self.factory, &other.factory)
    }
}

/// Where a recursive extractor gets its scope: a fresh factory starts at depth 0, a parent
/// scope continues one level below it.
pub enum RecursiveSource<N> {
    Root(BlueprintFactory<N>),
    Parent(RecursionScope<N>),
}

impl<N> Clone for RecursiveSource<N> {
    fn clone(&self) -> Self {
        match self {
            RecursiveSource::Root(factory) => RecursiveSource::Root(Arc::clone(factory)),
            RecursiveSource::Parent(scope) => RecursiveSource::Parent(scope.clone()),
        }
    }
}

impl<N> RecursiveSource<N> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&RecursionScope<N>) -> Blueprint<N> + Send + Sync + 'static,
    {
        RecursiveSource::Root(Arc::new(factory))
    }

    /// The scope of the objects extracted from this source.
    pub fn scope(&self) -> RecursionScope<N> {
        match self {
            RecursiveSource::Root(factory) => RecursionScope::root(Arc::clone(factory)),
            RecursiveSource::Parent(parent) => parent.descend(),
        }
    }
}

impl<N> From<&RecursionScope<N>> for RecursiveSource<N> {
    fn from(scope: &RecursionScope<N>) -> Self {
        RecursiveSource::Parent(scope.clone())
    }
}

impl<N> From<RecursionScope<N>> for RecursiveSource<N> {
    fn from(scope: RecursionScope<N>) -> Self {
        RecursiveSource::Parent(scope)
    }
}

/// Maps a node with the blueprint of its recursion level.
///
/// The blueprint for a level is only built when a node at that level is actually mapped,
/// so the depth of the structure is bounded by the document, not by the blueprint.
pub struct RecursiveObjectExtractor<N> {
    source: RecursiveSource<N>,
}

impl<N> Clone for RecursiveObjectExtractor<N> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<N: 'static> RecursiveObjectExtractor<N> {
    pub fn new(source: RecursiveSource<N>) -> Self {
        Self { source }
    }
}

impl<N: 'static> SingleNodeDataExtractorFactory<N> for RecursiveObjectExtractor<N> {
    type Output = Object;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, Object>, Error> {
        let scope = self.source.scope();
        Ok(Arc::new(move |node: &N, select: &dyn XPathSelect<N>| {
            log::trace!("Mapping recursive object at depth {}", scope.get_depth());
            let mapper = create_object_mapper(scope.blueprint())?;
            Ok(Some(mapper.map(node, select)?))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::map;
    use crate::value::Value;
    use xmlbind_dom::{Document, Node};
    use xmlbind_xpath::XPathEvaluator;

    const XML: &str = "<Root><Title>Level 0</Title><Child><Title>Level 1</Title>\
                       <Child><Title>Level 2</Title></Child></Child></Root>";

    fn source() -> RecursiveSource<Node> {
        RecursiveSource::new(|scope: &RecursionScope<Node>| {
            let depth = scope.get_depth();
            Blueprint::new()
                .field("title", map().to_node("Title").mandatory().as_string())
                .field("child", map().to_node("Child").as_recursive_object(scope))
                .field_fn("depth", move |_, _| Ok(Some(Value::from(depth))))
        })
    }

    #[test]
    fn test_each_level_sees_its_depth() {
        let doc = Document::parse(XML).unwrap();
        let extract = RecursiveObjectExtractor::new(source())
            .create_single_node_data_extractor()
            .unwrap();
        let root = extract(&doc.root_element().unwrap(), &XPathEvaluator::new())
            .unwrap()
            .unwrap();

        let mut level = Some(&root);
        let mut seen = Vec::new();
        while let Some(object) = level {
            seen.push((
                object.get("title").and_then(Value::as_str).unwrap().to_string(),
                object.get("depth").and_then(Value::as_f64).unwrap(),
            ));
            level = object.get("child").and_then(Value::as_object);
        }
        assert_eq!(
            seen,
            [
                ("Level 0".to_string(), 0.0),
                ("Level 1".to_string(), 1.0),
                ("Level 2".to_string(), 2.0),
            ]
        );
    }

    #[test]
    fn test_descend_shares_the_factory() {
        let scope = source().scope();
        let child = RecursiveSource::from(&scope).scope();
        assert_eq!(scope.get_depth(), 0);
        assert_eq!(child.get_depth(), 1);
        assert_eq!(child.descend().get_depth(), 2);
        assert!(child.shares_factory_with(&scope));
        assert_eq!(
            child.blueprint().field_names().collect::<Vec<_>>(),
            ["title", "child", "depth"]
        );
    }

    #[test]
    fn test_missing_mandatory_field_deep_down_reports_full_path() {
        let doc = Document::parse("<Root><Title>0</Title><Child><Child/></Child></Root>").unwrap();
        let extract = RecursiveObjectExtractor::new(source())
            .create_single_node_data_extractor()
            .unwrap();
        let err = extract(&doc.root_element().unwrap(), &XPathEvaluator::new()).unwrap_err();
        let Error::Mapping(mapping) = err else {
            panic!("expected a mapping error, got {:?}", err);
        };
        assert_eq!(mapping.mapping_path().to_string(), "child.title");
    }
}
