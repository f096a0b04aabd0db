//! A `nom`-based parser for the XPath 1.0 expression language.

use crate::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, satisfy},
    combinator::{map, not, opt, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    match terminated(expression, multispace0).parse(input.trim_start()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => Err(XPathError::Parse {
            expression: input.to_string(),
            message: format!("unexpected input at '{}'", rest),
        }),
        Err(e) => Err(XPathError::Parse {
            expression: input.to_string(),
            message: e.to_string(),
        }),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// An operator name such as `and` or `div`; must not run on into a longer name.
fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_name_char)))
}

/// Parses a left-associative chain `operand (operator operand)*`.
fn left_assoc<'a>(
    input: &'a str,
    operand: fn(&'a str) -> IResult<&'a str, Expression>,
    operator: fn(&'a str) -> IResult<&'a str, BinaryOperator>,
) -> IResult<&'a str, Expression> {
    let (mut input, mut left) = operand(input)?;
    loop {
        match pair(ws(operator), operand).parse(input) {
            Ok((rest, (op, right))) => {
                left = Expression::BinaryOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                };
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, left)),
            Err(e) => return Err(e),
        }
    }
}

// --- Operators ---

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::Or, keyword("or")).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::And, keyword("and")).parse(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::NotEquals, tag("!=")),
        value(BinaryOperator::Equals, char('=')),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::LessThanOrEqual, tag("<=")),
        value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
        value(BinaryOperator::LessThan, char('<')),
        value(BinaryOperator::GreaterThan, char('>')),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Plus, char('+')),
        value(BinaryOperator::Minus, char('-')),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Multiply, char('*')),
        value(BinaryOperator::Divide, keyword("div")),
        value(BinaryOperator::Modulo, keyword("mod")),
    ))
    .parse(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::Union, char('|')).parse(input)
}

// --- Expressions, lowest precedence first ---

fn expression(input: &str) -> IResult<&str, Expression> {
    left_assoc(input, and_expr, or_op)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(input, equality_expr, and_op)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(input, relational_expr, equality_op)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(input, additive_expr, relational_op)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(input, multiplicative_expr, additive_op)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(input, unary_expr, multiplicative_op)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    if let Ok((rest, _)) = ws(char::<&str, nom::error::Error<&str>>('-')).parse(input) {
        let (rest, operand) = unary_expr(rest)?;
        return Ok((rest, Expression::Negate(Box::new(operand))));
    }
    union_expr(input)
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    left_assoc(input, path_expr, union_op)
}

/// A primary expression optionally continued by a relative path, or a plain location path.
///
/// Primary expressions are tried first so that `position()` is read as a function call
/// rather than as a step named `position`.
fn path_expr(input: &str) -> IResult<&str, Expression> {
    match filter_expr(input) {
        Ok((rest, primary)) => {
            let (rest, tail) = many0(pair(ws(step_separator), step)).parse(rest)?;
            if tail.is_empty() {
                return Ok((rest, primary));
            }
            let mut steps = Vec::new();
            push_steps(&mut steps, tail);
            Ok((
                rest,
                Expression::LocationPath(LocationPath {
                    start: PathStart::Expression(Box::new(primary)),
                    steps,
                }),
            ))
        }
        Err(nom::Err::Error(_)) => map(location_path, Expression::LocationPath).parse(input),
        Err(e) => Err(e),
    }
}

fn filter_expr(input: &str) -> IResult<&str, Expression> {
    let (rest, primary) = primary_expr(input)?;
    let (rest, predicates) = many0(predicate).parse(rest)?;
    if predicates.is_empty() {
        Ok((rest, primary))
    } else {
        Ok((
            rest,
            Expression::Filter {
                primary: Box::new(primary),
                predicates,
            },
        ))
    }
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(number_literal, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    ))
    .parse(input)
}

// --- Literals ---

/// `Digits ('.' Digits?)?` or `'.' Digits`. Signs and exponents are not part of XPath 1.0.
fn number_literal(input: &str) -> IResult<&str, f64> {
    map(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        |digits: &str| digits.parse().unwrap_or(f64::NAN),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        str::to_string,
    )
    .parse(input)
}

// --- Names ---

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_name_start), take_while(is_name_char))).parse(input)
}

fn q_name(input: &str) -> IResult<&str, (Option<&str>, &str)> {
    map(
        pair(nc_name, opt(preceded(char(':'), nc_name))),
        |(first, second)| match second {
            Some(local) => (Some(first), local),
            None => (None, first),
        },
    )
    .parse(input)
}

const NODE_TYPE_NAMES: [&str; 4] = ["node", "text", "comment", "processing-instruction"];

fn function_call(input: &str) -> IResult<&str, Expression> {
    let (rest, (prefix, local)) = q_name(input)?;
    if prefix.is_none() && NODE_TYPE_NAMES.contains(&local) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let (rest, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(rest)?;
    let name = match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    };
    Ok((rest, Expression::FunctionCall { name, args }))
}

// --- Node tests ---

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    let (rest, kind) = terminated(
        alt((
            tag("node"),
            tag("text"),
            tag("comment"),
            tag("processing-instruction"),
        )),
        ws(char('(')),
    )
    .parse(input)?;
    let (rest, target) = if kind == "processing-instruction" {
        opt(ws(string_literal)).parse(rest)?
    } else {
        (rest, None)
    };
    let (rest, _) = char(')').parse(rest)?;

    let test = match kind {
        "text" => NodeTest::Text,
        "comment" => NodeTest::Comment,
        "processing-instruction" => NodeTest::ProcessingInstruction(target),
        _ => NodeTest::AnyNode,
    };
    Ok((rest, test))
}

pub fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        node_type_test,
        value(NodeTest::Wildcard, char('*')),
        map(terminated(nc_name, tag(":*")), |prefix| {
            NodeTest::PrefixWildcard(prefix.to_string())
        }),
        map(q_name, |(prefix, local)| NodeTest::Name {
            prefix: prefix.map(str::to_string),
            local_part: local.to_string(),
        }),
    ))
    .parse(input)
}

// --- Steps and paths ---

fn axis_name(input: &str) -> IResult<&str, Axis> {
    terminated(
        alt((
            value(Axis::AncestorOrSelf, tag("ancestor-or-self")),
            value(Axis::Ancestor, tag("ancestor")),
            value(Axis::Attribute, tag("attribute")),
            value(Axis::Child, tag("child")),
            value(Axis::DescendantOrSelf, tag("descendant-or-self")),
            value(Axis::Descendant, tag("descendant")),
            value(Axis::FollowingSibling, tag("following-sibling")),
            value(Axis::Following, tag("following")),
            value(Axis::Parent, tag("parent")),
            value(Axis::PrecedingSibling, tag("preceding-sibling")),
            value(Axis::Preceding, tag("preceding")),
            value(Axis::SelfAxis, tag("self")),
        )),
        ws(tag("::")),
    )
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    alt((
        value(Step::new(Axis::Parent, NodeTest::AnyNode), tag("..")),
        value(Step::new(Axis::SelfAxis, NodeTest::AnyNode), char('.')),
        full_step,
    ))
    .parse(input)
}

fn full_step(input: &str) -> IResult<&str, Step> {
    let (rest, axis) = opt(alt((
        value(Axis::Attribute, ws(char('@'))),
        axis_name,
    )))
    .parse(input)?;
    let (rest, node_test) = node_test(rest)?;
    let (rest, predicates) = many0(predicate).parse(rest)?;
    Ok((
        rest,
        Step {
            axis: axis.unwrap_or(Axis::Child),
            node_test,
            predicates,
        },
    ))
}

fn step_separator(input: &str) -> IResult<&str, &str> {
    alt((tag("//"), tag("/"))).parse(input)
}

fn push_steps(steps: &mut Vec<Step>, tail: Vec<(&str, Step)>) {
    for (separator, step) in tail {
        if separator == "//" {
            steps.push(Step::descendant_or_self());
        }
        steps.push(step);
    }
}

fn relative_steps(input: &str) -> IResult<&str, Vec<Step>> {
    let (rest, first) = step(input)?;
    let (rest, tail) = many0(pair(ws(step_separator), step)).parse(rest)?;
    let mut steps = vec![first];
    push_steps(&mut steps, tail);
    Ok((rest, steps))
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    if let Ok((rest, _)) = tag::<&str, &str, nom::error::Error<&str>>("//").parse(input) {
        let (rest, tail) = relative_steps(rest)?;
        let mut steps = vec![Step::descendant_or_self()];
        steps.extend(tail);
        return Ok((
            rest,
            LocationPath {
                start: PathStart::Root,
                steps,
            },
        ));
    }
    if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('/').parse(input) {
        // A lone `/` selects the root itself.
        let (rest, steps) = opt(preceded(multispace0, relative_steps)).parse(rest)?;
        return Ok((
            rest,
            LocationPath {
                start: PathStart::Root,
                steps: steps.unwrap_or_default(),
            },
        ));
    }
    let (rest, steps) = relative_steps(input)?;
    Ok((
        rest,
        LocationPath {
            start: PathStart::Context,
            steps,
        },
    ))
}
