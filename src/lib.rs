//! Map XML documents to typed values with declarative XPath bindings.
//!
//! ```ignore
//! use xmlbind::prelude::*;
//!
//! let mapper = XmlMapper::new(
//!     Blueprint::new()
//!         .field("title", map().to_node("book/title").mandatory().as_string())
//!         .field("price", map().to_node("book/price").as_number().with_default(0.0)),
//! )?;
//! let book = mapper.map_str("<book><title>Dune</title></book>")?;
//! ```
//!
//! The building blocks live in three crates, re-exported here:
//! [`dom`] holds the owned XML tree, [`xpath`] the XPath 1.0 evaluator and [`core`] the
//! binding layer.

pub mod error;
pub mod mapper;

pub use error::XmlBindError;
pub use mapper::XmlMapper;

pub use xmlbind_core as core;
pub use xmlbind_dom as dom;
pub use xmlbind_xpath as xpath;

pub use xmlbind_core::{
    BindingBuilder, BindingError, BindingStage, Blueprint, BoxError, Error, LookupError,
    MappingError, Object, ObjectMapper, RecursionScope, RecursiveSource, Value,
    create_object_mapper, map,
};
pub use xmlbind_dom::{Document, Node, XPathSelect};
pub use xmlbind_xpath::XPathEvaluator;

pub mod prelude {
    pub use crate::{
        Blueprint, BoxError, Document, Node, Object, RecursionScope, RecursiveSource, Value,
        XPathEvaluator, XPathSelect, XmlBindError, XmlMapper, map,
    };
}
