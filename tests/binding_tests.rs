mod common;

use common::fixtures::PRODUCT;
use common::{TestResult, init_logging, root_element};
use std::sync::Arc;
use xmlbind::core::extractor::{
    SingleNodeDataExtractorFactory, SingleNodeExtractFn, extract_boolean, extract_string,
    string_to_boolean,
};
use xmlbind::core::{BindingStage, Error, LookupError};
use xmlbind::dom::{SelectError, Selected, TypedNode};
use xmlbind::prelude::*;

#[test]
fn test_optional_binding_yields_none_or_default() -> TestResult {
    let product = root_element(PRODUCT);
    let evaluator = XPathEvaluator::new();
    let weight = map().to_node::<Node>("weight").as_number();

    assert_eq!(weight.create_node_data_extractor()?.extract(&product, &evaluator)?, None);
    assert_eq!(
        weight
            .with_default(1.5)
            .create_node_data_extractor()?
            .extract(&product, &evaluator)?,
        Some(1.5)
    );
    // a value that is present wins over the default
    assert_eq!(
        map()
            .to_node::<Node>("price")
            .as_number()
            .with_default(0.0)
            .create_node_data_extractor()?
            .extract(&product, &evaluator)?,
        Some(24.9)
    );
    Ok(())
}

#[test]
fn test_mandatory_bindings_name_the_binding_and_path() {
    let product = root_element(PRODUCT);
    let evaluator = XPathEvaluator::new();

    let single = map()
        .to_element::<Node>("manufacturer/name")
        .mandatory()
        .as_string()
        .named("manufacturer");
    let err = single
        .create_node_data_extractor()
        .unwrap()
        .extract(&product, &evaluator)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("\"manufacturer\""), "{message}");
    assert!(message.contains("manufacturer/name"), "{message}");

    let array = map()
        .named("colors")
        .to_elements_array::<Node>("color")
        .mandatory()
        .as_array()
        .of_strings();
    let err = array
        .create_node_data_extractor()
        .unwrap()
        .extract(&product, &evaluator)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("\"colors\""), "{message}");
    assert!(message.contains("color"), "{message}");
    let Error::Binding(binding) = &err else {
        panic!("expected a binding error, got {:?}", err);
    };
    assert_eq!(binding.stage(), BindingStage::Lookup);
    assert!(matches!(
        binding.cause(),
        Error::Lookup(LookupError::NotFound { path }) if path == "color"
    ));
}

#[test]
fn test_conversion_after_default_drops_the_default() -> TestResult {
    let product = root_element(PRODUCT);
    let evaluator = XPathEvaluator::new();

    let dropped = map()
        .to_node::<Node>("weight")
        .as_string()
        .with_default("unknown".to_string())
        .with_conversion(|s| Ok(s.to_uppercase()));
    assert_eq!(dropped.create_node_data_extractor()?.extract(&product, &evaluator)?, None);

    let retyped = map()
        .to_node::<Node>("weight")
        .as_string()
        .with_conversion(|s| Ok(s.len()))
        .with_default(0);
    assert_eq!(
        retyped.create_node_data_extractor()?.extract(&product, &evaluator)?,
        Some(0)
    );
    Ok(())
}

#[test]
fn test_conversion_sees_the_extracted_value() -> TestResult {
    let product = root_element(PRODUCT);
    let cents = map()
        .to_node::<Node>("price")
        .as_number()
        .with_conversion(|price| Ok((price * 100.0).round() as u64));
    assert_eq!(
        cents
            .create_node_data_extractor()?
            .extract(&product, &XPathEvaluator::new())?,
        Some(2490)
    );
    Ok(())
}

#[test]
fn test_array_extraction_compacts_and_reports_indices() -> TestResult {
    let product = root_element(PRODUCT);
    let evaluator = XPathEvaluator::new();

    let lenient = map()
        .to_elements_array::<Node>("tag")
        .as_array()
        .using_mapper(map().to_node("text()").as_string());
    assert_eq!(
        lenient.create_node_data_extractor()?.extract(&product, &evaluator)?,
        Some(vec!["lighting".to_string(), "office".to_string()])
    );

    let strict = map()
        .to_elements_array::<Node>("tag")
        .as_array()
        .using_mapper(map().to_node("text()").mandatory().as_string());
    let err = strict
        .create_node_data_extractor()?
        .extract(&product, &evaluator)
        .unwrap_err();
    let Error::Mapping(mapping) = err else {
        panic!("expected a mapping error, got {:?}", err);
    };
    assert_eq!(mapping.mapping_path().to_string(), "[1]");
    assert!(mapping.to_string().contains("Lookup path: \"text()\""));
    Ok(())
}

#[test]
fn test_array_callback_receives_all_nodes() -> TestResult {
    let product = root_element(PRODUCT);
    let count = map()
        .to_elements_array::<Node>("tag")
        .as_array()
        .callback(|nodes: &[Node], _: &dyn XPathSelect<Node>| Ok(Some(nodes.len())));
    assert_eq!(
        count
            .create_node_data_extractor()?
            .extract(&product, &XPathEvaluator::new())?,
        Some(3)
    );
    Ok(())
}

#[test]
fn test_boolean_extraction_agrees_with_string_conversion() -> TestResult {
    let xml = r#"<flags a="yes" b="0" c="FALSE" d="" e=" null " f="-0.0" g="Infinity">
        <flag>true</flag><flag>false</flag><flag>0</flag><flag>12</flag><flag/>
    </flags>"#;
    let flags = root_element(xml);
    let evaluator = XPathEvaluator::new();

    let mut checked = 0;
    for path in ["@*", "flag", "flag/text()"] {
        let Selected::Nodes(nodes) = evaluator.select(path, &flags, false)? else {
            panic!("expected nodes for {path}");
        };
        for node in nodes {
            let as_string = extract_string(&node, &evaluator)?.map(|s| string_to_boolean(&s));
            assert_eq!(extract_boolean(&node, &evaluator)?, as_string, "{path}");
            checked += 1;
        }
    }
    assert_eq!(checked, 7 + 5 + 4);

    let attribute = |name: &str| -> Result<Option<bool>, Error> {
        map()
            .to_attribute::<Node>(&format!("@{name}"))
            .as_boolean()
            .create_node_data_extractor()?
            .extract(&flags, &evaluator)
    };
    assert_eq!(attribute("a")?, Some(true));
    assert_eq!(attribute("b")?, Some(false));
    assert_eq!(attribute("c")?, Some(false));
    assert_eq!(attribute("d")?, Some(false));
    assert_eq!(attribute("e")?, Some(false));
    assert_eq!(attribute("f")?, Some(false));
    assert_eq!(attribute("g")?, Some(true));
    assert_eq!(attribute("missing")?, None);
    Ok(())
}

#[test]
fn test_infinity_and_negative_zero() -> TestResult {
    let node = root_element(r#"<n inf="Infinity" neg="-Infinity" zero="-0" nan="abc"/>"#);
    let evaluator = XPathEvaluator::new();
    let number = |path: &str| -> Result<Option<f64>, Error> {
        map()
            .to_attribute::<Node>(path)
            .mandatory()
            .as_number()
            .create_node_data_extractor()?
            .extract(&node, &evaluator)
    };

    assert_eq!(number("@inf")?, Some(f64::INFINITY));
    assert_eq!(number("@neg")?, Some(f64::NEG_INFINITY));
    let zero = number("@zero")?.unwrap();
    assert_eq!(zero, 0.0);
    assert!(zero.is_sign_negative());
    assert!(number("@nan")?.unwrap().is_nan());
    Ok(())
}

#[test]
fn test_incompatible_lookup_and_extractor() {
    init_logging();
    let paired = map()
        .to_element::<Node>("tag")
        .callback_factory(xmlbind::core::extractor::ObjectExtractor::new(Blueprint::new()));
    assert!(paired.create_node_data_extractor().is_ok());

    let mismatched = xmlbind::core::BindingBuilder::<Node, Vec<String>>::new(
        map().to_element::<Node>("tag").lookup().clone(),
        xmlbind::core::extractor::DataExtractorFactory::array(
            xmlbind::core::extractor::NodesArrayDataMapper::new(
                xmlbind::core::extractor::StringExtractor,
            ),
        ),
    );
    let err = mismatched.create_node_data_extractor().unwrap_err();
    assert!(matches!(err, Error::IncompatibleExtractor { .. }));
    assert_eq!(
        err.to_string(),
        "Lookup \"tag\" yields a single node but the data extractor expects a nodes array"
    );
}

#[test]
fn test_wrong_result_shape_from_a_custom_evaluator() {
    let node = root_element("<a/>");
    let double = |expression: &str, _: &Node, _: bool| -> Result<Selected<Node>, SelectError> {
        match expression {
            "count(*)" => Ok(Selected::Number(0.0)),
            other => Err(SelectError::new(other, "not supported by this double")),
        }
    };

    let shape = map().to_node::<Node>("count(*)").as_number().named("count");
    let err = shape
        .create_node_data_extractor()
        .unwrap()
        .extract(&node, &double)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Binding \"count\" failed during lookup"), "{message}");
    assert!(message.contains("Expected type Node, got number"), "{message}");
    assert!(message.ends_with("Lookup path: \"count(*)\""), "{message}");

    let failing = map().to_node::<Node>("x").as_string();
    let err = failing
        .create_node_data_extractor()
        .unwrap()
        .extract(&node, &double)
        .unwrap_err();
    assert!(err.to_string().contains("not supported by this double"));
    assert!(matches!(err.root_cause(), Error::Lookup(LookupError::Select { .. })));
}

#[test]
fn test_constant_binding() -> TestResult {
    let node = root_element("<a/>");
    let mapper = XmlMapper::new(
        Blueprint::new()
            .field("kind", map().constant("product"))
            .field("version", map().constant(2.0)),
    )?;
    let object = mapper.map(&node)?;
    assert_eq!(object.get("kind"), Some(&Value::from("product")));
    assert_eq!(object.get("version"), Some(&Value::Number(2.0)));
    Ok(())
}

#[test]
fn test_attribute_arrays_of_numbers_and_booleans() -> TestResult {
    let evaluator = XPathEvaluator::new();

    let measures = root_element(r#"<m a="1" b=" 2.5 " c="Infinity" d="-0" e="n/a"/>"#);
    let numbers = map()
        .to_attributes_array::<Node>("@*")
        .as_array()
        .of_numbers()
        .create_node_data_extractor()?
        .extract(&measures, &evaluator)?
        .unwrap();
    assert_eq!(numbers.len(), 5);
    assert_eq!(&numbers[..3], &[1.0, 2.5, f64::INFINITY]);
    assert!(numbers[3] == 0.0 && numbers[3].is_sign_negative());
    assert!(numbers[4].is_nan());

    let flags = root_element(r#"<f a="yes" b="0" c="" d="NULL" e="Infinity" g="-0.0"/>"#);
    let booleans = map().to_attributes_array::<Node>("@*").as_array().of_booleans();
    assert_eq!(
        booleans.create_node_data_extractor()?.extract(&flags, &evaluator)?,
        Some(vec![true, false, false, false, true, false])
    );
    assert_eq!(
        map()
            .to_attributes_array::<Node>("@missing")
            .as_array()
            .of_booleans()
            .create_node_data_extractor()?
            .extract(&flags, &evaluator)?,
        None
    );

    let err = map()
        .to_attributes_array::<Node>("*")
        .as_array()
        .of_numbers()
        .create_node_data_extractor()?
        .extract(&root_element("<r><x>1</x></r>"), &evaluator)
        .unwrap_err();
    assert!(err.to_string().contains("Expected type Attr[]"), "{err}");
    Ok(())
}

#[test]
fn test_nodes_array_accepts_mixed_node_types() -> TestResult {
    let mixed = root_element("<mix>a<b>x</b><!--c--><?pi d?></mix>");
    let evaluator = XPathEvaluator::new();

    let strings = map().to_nodes_array::<Node>("node()").as_array().of_strings();
    assert_eq!(
        strings.create_node_data_extractor()?.extract(&mixed, &evaluator)?,
        Some(vec!["a".to_string(), "x".into(), "c".into(), "d".into()])
    );

    let kinds = map()
        .to_nodes_array::<Node>("node()")
        .as_array()
        .callback(|nodes: &[Node], _: &dyn XPathSelect<Node>| {
            Ok(Some(nodes.iter().map(|n| n.node_type().name()).collect::<Vec<_>>()))
        });
    assert_eq!(
        kinds.create_node_data_extractor()?.extract(&mixed, &evaluator)?,
        Some(vec!["Text", "Element", "Comment", "ProcessingInstruction"])
    );

    let err = map()
        .to_elements_array::<Node>("node()")
        .as_array()
        .of_strings()
        .create_node_data_extractor()?
        .extract(&mixed, &evaluator)
        .unwrap_err();
    assert!(err.to_string().contains("elements are of different type"), "{err}");
    Ok(())
}

/// Upper-cases the text of a node and rejects blank text.
struct Shout;

impl SingleNodeDataExtractorFactory<Node> for Shout {
    type Output = String;

    fn create_single_node_data_extractor(
        &self,
    ) -> Result<SingleNodeExtractFn<Node, String>, Error> {
        Ok(Arc::new(|node: &Node, select: &dyn XPathSelect<Node>| {
            match extract_string(node, select)? {
                Some(text) if text.trim().is_empty() => Err(Error::Callback("blank text".into())),
                text => Ok(text.map(|t| t.to_uppercase())),
            }
        }))
    }
}

#[test]
fn test_callback_factory_extracts_through_the_factory() -> TestResult {
    let product = root_element(PRODUCT);
    let evaluator = XPathEvaluator::new();

    let name = map().to_element::<Node>("name").callback_factory(Shout);
    assert_eq!(
        name.create_node_data_extractor()?.extract(&product, &evaluator)?,
        Some("DESK LAMP".to_string())
    );

    // a binding is itself a factory
    let currency = map()
        .to_element::<Node>("price")
        .callback_factory(map().to_attribute("@currency").mandatory().as_string());
    assert_eq!(
        currency.create_node_data_extractor()?.extract(&product, &evaluator)?,
        Some("EUR".to_string())
    );

    let blank = map().to_element::<Node>("tag[2]").callback_factory(Shout).named("tag");
    let err = blank
        .create_node_data_extractor()?
        .extract(&product, &evaluator)
        .unwrap_err();
    let Error::Binding(binding) = &err else {
        panic!("expected a binding error, got {:?}", err);
    };
    assert_eq!(binding.stage(), BindingStage::Extraction);
    assert_eq!(binding.binding_name(), Some("tag"));
    assert!(matches!(binding.cause(), Error::Callback(_)));
    assert_eq!(
        err.to_string(),
        "Binding \"tag\" failed during extraction: blank text. Lookup path: \"tag[2]\""
    );

    let tags = map().to_elements_array::<Node>("tag").as_array().using_mapper(Shout);
    let err = tags
        .create_node_data_extractor()?
        .extract(&product, &evaluator)
        .unwrap_err();
    let Error::Mapping(mapping) = &err else {
        panic!("expected a mapping error, got {:?}", err);
    };
    assert_eq!(mapping.mapping_path().to_string(), "[1]");
    assert!(matches!(mapping.cause(), Error::Callback(_)));
    Ok(())
}
