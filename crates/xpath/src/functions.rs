//! The XPath 1.0 core function library.

use crate::engine::{EvaluationContext, XPathValue};
use crate::error::XPathError;
use xmlbind_dom::XmlNode;

/// Dispatches a function call to the correct implementation.
///
/// Unknown functions fail in strict mode and evaluate to the empty string otherwise.
pub fn evaluate_function<N: XmlNode>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    match name {
        // Node-set
        "position" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(e_ctx.position as f64))
        }
        "last" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Number(e_ctx.size as f64))
        }
        "count" => {
            arity(name, &args, 1, 1)?;
            let nodes = node_set_arg(name, args)?;
            Ok(XPathValue::Number(nodes.len() as f64))
        }
        "local-name" | "name" => func_name(name, args, e_ctx),

        // String
        "string" => {
            let s = string_or_context(name, args, e_ctx)?;
            Ok(XPathValue::String(s))
        }
        "concat" => {
            arity(name, &args, 2, usize::MAX)?;
            Ok(XPathValue::String(
                args.iter().map(|v| v.to_string()).collect(),
            ))
        }
        "contains" => {
            let (s1, s2) = two_strings(name, args)?;
            Ok(XPathValue::Boolean(s1.contains(&s2)))
        }
        "starts-with" => {
            let (s1, s2) = two_strings(name, args)?;
            Ok(XPathValue::Boolean(s1.starts_with(&s2)))
        }
        "substring-before" => {
            let (s1, s2) = two_strings(name, args)?;
            let before = s1.find(&s2).map(|i| &s1[..i]).unwrap_or_default();
            Ok(XPathValue::String(before.to_string()))
        }
        "substring-after" => {
            let (s1, s2) = two_strings(name, args)?;
            let after = s1.find(&s2).map(|i| &s1[i + s2.len()..]).unwrap_or_default();
            Ok(XPathValue::String(after.to_string()))
        }
        "substring" => func_substring(args),
        "string-length" => {
            let s = string_or_context(name, args, e_ctx)?;
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            let s = string_or_context(name, args, e_ctx)?;
            Ok(XPathValue::String(
                s.split_whitespace().collect::<Vec<_>>().join(" "),
            ))
        }
        "translate" => func_translate(args),

        // Boolean
        "boolean" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(args[0].to_bool()))
        }
        "not" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(true))
        }
        "false" => {
            arity(name, &args, 0, 0)?;
            Ok(XPathValue::Boolean(false))
        }

        // Number
        "number" => {
            arity(name, &args, 0, 1)?;
            let n = match args.first() {
                Some(value) => value.to_number(),
                None => XPathValue::NodeSet(vec![e_ctx.node.clone()]).to_number(),
            };
            Ok(XPathValue::Number(n))
        }
        "sum" => {
            arity(name, &args, 1, 1)?;
            let total = node_set_arg(name, args)?
                .iter()
                .map(|n| XPathValue::<N>::String(n.string_value()).to_number())
                .sum();
            Ok(XPathValue::Number(total))
        }
        "floor" => number_fn(name, args, f64::floor),
        "ceiling" => number_fn(name, args, f64::ceil),
        "round" => number_fn(name, args, round),

        _ => {
            if e_ctx.strict {
                Err(XPathError::UnknownFunction(name.to_string()))
            } else {
                log::warn!("Unknown XPath function '{}' evaluated to an empty string", name);
                Ok(XPathValue::String(String::new()))
            }
        }
    }
}

fn arity<N>(name: &str, args: &[XPathValue<N>], min: usize, max: usize) -> Result<(), XPathError> {
    if args.len() < min || args.len() > max {
        let expected = match (min, max) {
            (min, max) if min == max => format!("{}", min),
            (min, usize::MAX) => format!("at least {}", min),
            (min, max) => format!("{} to {}", min, max),
        };
        return Err(XPathError::function(
            name,
            format!("Expected {} argument(s), got {}", expected, args.len()),
        ));
    }
    Ok(())
}

fn node_set_arg<N: XmlNode>(name: &str, mut args: Vec<XPathValue<N>>) -> Result<Vec<N>, XPathError> {
    match args.remove(0) {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(XPathError::Type(format!(
            "{}() argument must be a node-set, got a {}",
            name,
            other.type_name()
        ))),
    }
}

fn string_or_context<N: XmlNode>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<String, XPathError> {
    arity(name, &args, 0, 1)?;
    Ok(match args.first() {
        Some(value) => value.to_string(),
        None => e_ctx.node.string_value(),
    })
}

fn two_strings<N: XmlNode>(
    name: &str,
    args: Vec<XPathValue<N>>,
) -> Result<(String, String), XPathError> {
    arity(name, &args, 2, 2)?;
    Ok((args[0].to_string(), args[1].to_string()))
}

fn number_fn<N: XmlNode>(
    name: &str,
    args: Vec<XPathValue<N>>,
    f: fn(f64) -> f64,
) -> Result<XPathValue<N>, XPathError> {
    arity(name, &args, 1, 1)?;
    Ok(XPathValue::Number(f(args[0].to_number())))
}

/// Rounds half up, keeping the sign of values in `[-0.5, 0)`.
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        return n;
    }
    if (-0.5..0.0).contains(&n) {
        return -0.0;
    }
    (n + 0.5).floor()
}

fn func_name<N: XmlNode>(
    name: &str,
    mut args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<N>,
) -> Result<XPathValue<N>, XPathError> {
    arity(name, &args, 0, 1)?;
    let node = if args.is_empty() {
        Some(e_ctx.node.clone())
    } else {
        node_set_arg(name, std::mem::take(&mut args))?.into_iter().next()
    };
    let qualified = node
        .as_ref()
        .and_then(|n| n.name())
        .map(|q| {
            if name == "local-name" {
                q.local_part.to_string()
            } else {
                q.to_string()
            }
        })
        .unwrap_or_default();
    Ok(XPathValue::String(qualified))
}

fn func_substring<N: XmlNode>(args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    arity("substring", &args, 2, 3)?;
    let s = args[0].to_string();
    let first = round(args[1].to_number());
    let last = match args.get(2) {
        Some(length) => first + round(length.to_number()),
        None => f64::INFINITY,
    };
    let result = s
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (i + 1) as f64;
            pos >= first && pos < last
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XPathValue::String(result))
}

fn func_translate<N: XmlNode>(args: Vec<XPathValue<N>>) -> Result<XPathValue<N>, XPathError> {
    arity("translate", &args, 3, 3)?;
    let s = args[0].to_string();
    let from: Vec<char> = args[1].to_string().chars().collect();
    let to: Vec<char> = args[2].to_string().chars().collect();
    let result = s
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XPathValue::String(result))
}
