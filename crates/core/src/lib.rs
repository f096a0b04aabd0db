//! Declarative bindings from XML nodes to typed values.
//!
//! A binding is a pipeline of four stages: a **lookup** resolves an XPath expression against
//! a context node, an **extractor** turns what was found into a value, an optional
//! **conversion** post-processes it, and an optional **default** stands in when nothing was
//! found. Bindings are assembled with immutable builders starting at [`map`], grouped into
//! [`Blueprint`]s, and compiled into [`ObjectMapper`]s.
//!
//! The crate is generic over the node type and never evaluates XPath itself: every compiled
//! function receives a [`XPathSelect`](xmlbind_dom::XPathSelect) implementation to query with.

pub mod binding;
pub mod blueprint;
pub mod builder;
pub mod error;
pub mod extractor;
pub mod lookup;
pub mod mapper;
pub mod predicates;
pub mod value;

pub use binding::{BindingBuilder, NodeDataExtractor};
pub use blueprint::{Blueprint, FieldFn};
pub use builder::{ConstantBuilder, MappingBuilder, map};
pub use error::{
    BindingError, BindingStage, BoxError, Error, LookupError, MappingError, MappingPath,
    PathSegment,
};
pub use extractor::{
    BlueprintFactory, NodesArrayDataExtractorFactory, RecursionScope, RecursiveSource,
    SingleNodeDataExtractorFactory,
};
pub use lookup::{
    ArrayExtractionBuilder, LookupBuilder, LookupFactory, NodeLookupBuilder,
    NodesArrayLookupBuilder,
};
pub use mapper::{ObjectMapper, create_object_mapper};
pub use value::{Object, Value};
