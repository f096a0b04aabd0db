//! Lookups: resolve an XPath expression against a context node and validate what it
//! returns.
mod builder;
mod factory;

pub use builder::{
    ArrayExtractionBuilder, LookupBuilder, NodeLookupBuilder, NodesArrayLookupBuilder,
};
pub use factory::{Cardinality, LookupFactory, LookupFn, LookupResult, NodeKind};
