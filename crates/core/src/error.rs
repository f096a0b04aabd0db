//! Errors raised while compiling and running bindings.
//!
//! [`MappingError`] is the only error that accumulates context across nesting levels: each
//! blueprint field and array element it bubbles through prepends its own segment to the
//! mapping path, so the top-level caller sees e.g. `categories[1].subcategories[0].id`.
use std::fmt;
use thiserror::Error;
use xmlbind_dom::SelectError;

/// An error returned by caller-supplied code: callbacks, conversions, blueprint functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One step of a [`MappingPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Where in a nested mapping an error occurred, outermost segment first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MappingPath {
    segments: Vec<PathSegment>,
}

impl MappingPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Adds an enclosing segment in front of the path.
    pub fn prepend(&mut self, segment: impl Into<PathSegment>) {
        self.segments.insert(0, segment.into());
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for MappingPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Fields join with `.`, indices attach as `[N]` to whatever precedes them.
impl fmt::Display for MappingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
#[error("Error in mapping \"{mapping_path}\", caused by {cause}")]
pub struct MappingError {
    mapping_path: MappingPath,
    #[source]
    cause: Box<Error>,
}

impl MappingError {
    /// Starts a mapping path at `segment`. A cause that already is a mapping error keeps
    /// its own path, with `segment` prepended.
    pub fn new(segment: impl Into<PathSegment>, cause: impl Into<Error>) -> Self {
        match cause.into() {
            Error::Mapping(inner) => inner.pop_up(segment),
            cause => Self {
                mapping_path: MappingPath {
                    segments: vec![segment.into()],
                },
                cause: Box::new(cause),
            },
        }
    }

    /// Re-raises the error one level further out.
    pub fn pop_up(mut self, segment: impl Into<PathSegment>) -> Self {
        self.mapping_path.prepend(segment);
        self
    }

    pub fn mapping_path(&self) -> &MappingPath {
        &self.mapping_path
    }

    /// The error that started the mapping failure.
    pub fn cause(&self) -> &Error {
        &self.cause
    }

    pub fn into_cause(self) -> Error {
        *self.cause
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("Unexpected lookup result. Expected type {expected}, {reason}. Lookup path: \"{path}\"")]
    UnexpectedResult {
        expected: String,
        reason: String,
        path: String,
    },

    #[error("Mandatory node(s) was not found by path: {path}")]
    NotFound { path: String },

    #[error("{source}. Lookup path: \"{path}\"")]
    Select {
        path: String,
        #[source]
        source: SelectError,
    },
}

impl LookupError {
    /// The XPath expression of the failed lookup.
    pub fn path(&self) -> &str {
        match self {
            LookupError::UnexpectedResult { path, .. }
            | LookupError::NotFound { path }
            | LookupError::Select { path, .. } => path,
        }
    }
}

/// The part of a binding that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStage {
    Lookup,
    Extraction,
    Conversion,
}

impl fmt::Display for BindingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingStage::Lookup => "lookup",
            BindingStage::Extraction => "extraction",
            BindingStage::Conversion => "conversion",
        })
    }
}

fn quoted_name(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" \"{}\"", name),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
#[error(
    "Binding{} failed during {stage}: {cause}. Lookup path: \"{lookup_path}\"",
    quoted_name(.binding_name)
)]
pub struct BindingError {
    binding_name: Option<String>,
    lookup_path: String,
    stage: BindingStage,
    #[source]
    cause: Box<Error>,
}

impl BindingError {
    pub fn new(
        binding_name: Option<String>,
        lookup_path: impl Into<String>,
        stage: BindingStage,
        cause: Error,
    ) -> Self {
        Self {
            binding_name,
            lookup_path: lookup_path.into(),
            stage,
            cause: Box::new(cause),
        }
    }

    pub fn binding_name(&self) -> Option<&str> {
        self.binding_name.as_deref()
    }

    pub fn lookup_path(&self) -> &str {
        &self.lookup_path
    }

    pub fn stage(&self) -> BindingStage {
        self.stage
    }

    pub fn cause(&self) -> &Error {
        &self.cause
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("Unexpected extraction result. Expected {expected}, got {actual}")]
    UnexpectedValue {
        expected: &'static str,
        actual: String,
    },

    #[error(
        "Lookup \"{path}\" yields {lookup} but the data extractor expects {extractor}"
    )]
    IncompatibleExtractor {
        path: String,
        lookup: &'static str,
        extractor: &'static str,
    },

    #[error("{0}")]
    Callback(#[source] BoxError),
}

impl Error {
    /// Normalizes an error coming out of caller-supplied code. Errors raised by this crate
    /// and passed through a callback come back as themselves.
    pub fn from_boxed(error: BoxError) -> Self {
        let error = match error.downcast::<MappingError>() {
            Ok(mapping) => return Error::Mapping(*mapping),
            Err(other) => other,
        };
        match error.downcast::<Error>() {
            Ok(inner) => *inner,
            Err(other) => Error::Callback(other),
        }
    }

    /// The innermost error that is not a wrapper added by bindings or mappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Binding(binding) => binding.cause().root_cause(),
            Error::Mapping(mapping) => mapping.cause().root_cause(),
            other => other,
        }
    }
}
