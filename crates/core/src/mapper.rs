//! The object mapper: runs a blueprint's field extractors against a node.
use crate::blueprint::{Blueprint, FieldFn};
use crate::error::MappingError;
use crate::value::Object;
use std::fmt;
use std::sync::Arc;
use xmlbind_dom::XPathSelect;

/// A blueprint with every field factory compiled.
pub struct ObjectMapper<N> {
    fields: Arc<[(String, FieldFn<N>)]>,
}

impl<N> Clone for ObjectMapper<N> {
    fn clone(&self) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<N> fmt::Debug for ObjectMapper<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMapper")
            .field(
                "fields",
                &self.fields.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Compiles `blueprint`. Factories run once here; a factory that cannot be compiled fails
/// with a [`MappingError`] naming its field.
pub fn create_object_mapper<N: 'static>(
    blueprint: Blueprint<N>,
) -> Result<ObjectMapper<N>, MappingError> {
    let fields = blueprint
        .into_fields()
        .into_iter()
        .map(|(name, extractor)| match extractor.resolve() {
            Ok(extract) => Ok((name, extract)),
            Err(e) => Err(MappingError::new(name, e)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::trace!("Created object mapper with {} field(s)", fields.len());
    Ok(ObjectMapper {
        fields: fields.into(),
    })
}

impl<N> ObjectMapper<N> {
    /// Builds the object for `node`. Fields are evaluated in declaration order; fields that
    /// yield no value are left out. The first failing field aborts the mapping, with its
    /// name prepended to the error's mapping path.
    pub fn map(&self, node: &N, select: &dyn XPathSelect<N>) -> Result<Object, MappingError> {
        let mut object = Object::new();
        for (name, extract) in self.fields.iter() {
            match extract(node, select) {
                Ok(Some(value)) => {
                    object.insert(name.as_str(), value);
                }
                Ok(None) => {}
                Err(e) => {
                    let error = MappingError::new(name.as_str(), e);
                    log::debug!("{}", error);
                    return Err(error);
                }
            }
        }
        Ok(object)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}
