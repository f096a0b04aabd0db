use super::{SingleNodeDataExtractorFactory, SingleNodeExtractFn};
use crate::error::Error;
use crate::predicates::type_name;
use std::sync::Arc;
use xmlbind_dom::{Selected, TypedNode, XPathSelect, parse_number};

/// The XPath string value of `node`: concatenated descendant text for elements, the value
/// for attributes, text and comments.
pub fn extract_string<N: TypedNode>(
    node: &N,
    select: &dyn XPathSelect<N>,
) -> Result<Option<String>, Error> {
    match select.select("string(.)", node, true)? {
        Selected::String(s) => Ok(Some(s)),
        other => Err(Error::UnexpectedValue {
            expected: "string",
            actual: type_name(&other),
        }),
    }
}

/// The XPath number value of `node`. Non-numeric content is `NaN`, not an error.
pub fn extract_number<N: TypedNode>(
    node: &N,
    select: &dyn XPathSelect<N>,
) -> Result<Option<f64>, Error> {
    match select.select("number(.)", node, true)? {
        Selected::Number(n) => Ok(Some(n)),
        other => Err(Error::UnexpectedValue {
            expected: "number",
            actual: type_name(&other),
        }),
    }
}

pub fn extract_boolean<N: TypedNode>(
    node: &N,
    select: &dyn XPathSelect<N>,
) -> Result<Option<bool>, Error> {
    Ok(extract_string(node, select)?.map(|s| string_to_boolean(&s)))
}

/// `false` for blank text, `FALSE` and `NULL` (any case) and numeric zero in any spelling;
/// `true` for everything else.
pub fn string_to_boolean(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("FALSE")
        || trimmed.eq_ignore_ascii_case("NULL")
    {
        return false;
    }
    parse_number(trimmed) != 0.0
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringExtractor;

impl<N: TypedNode + 'static> SingleNodeDataExtractorFactory<N> for StringExtractor {
    type Output = String;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, String>, Error> {
        Ok(Arc::new(extract_string::<N>))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberExtractor;

impl<N: TypedNode + 'static> SingleNodeDataExtractorFactory<N> for NumberExtractor {
    type Output = f64;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, f64>, Error> {
        Ok(Arc::new(extract_number::<N>))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanExtractor;

impl<N: TypedNode + 'static> SingleNodeDataExtractorFactory<N> for BooleanExtractor {
    type Output = bool;

    fn create_single_node_data_extractor(&self) -> Result<SingleNodeExtractFn<N, bool>, Error> {
        Ok(Arc::new(extract_boolean::<N>))
    }
}
