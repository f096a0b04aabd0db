// src/error.rs
use thiserror::Error;
use xmlbind_core::MappingError;
use xmlbind_dom::DomError;

/// Everything that can go wrong between raw XML text and a mapped object.
#[derive(Error, Debug)]
pub enum XmlBindError {
    #[error("Parsing failed: {0}")]
    Parse(#[from] DomError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("Mapped object does not fit the target type: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl XmlBindError {
    /// The mapping path of the failing field, when the failure happened during mapping.
    pub fn mapping_path(&self) -> Option<String> {
        match self {
            XmlBindError::Mapping(e) => Some(e.mapping_path().to_string()),
            XmlBindError::Parse(_) | XmlBindError::Deserialize(_) => None,
        }
    }
}
