//! A `nom`-based parser for the CartoCSS subset.
//!
//! Token-level grammar (values, selectors, comments) is written with `nom`
//! combinators. The block structure is driven by [`StylesheetParser`], which
//! records a [`SyntaxError`] and resynchronises at the next `;` or block
//! boundary so that one pass reports every problem in the text.

use crate::ast::*;
use crate::error::SyntaxError;
use log::{debug, warn};
use mapstyle_types::{Color, Comparison};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{map, not, opt, recognize, value},
    multi::{many0, many1, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};

type Res<'a, T> = IResult<&'a str, T>;

// --- Main Public Parsers ---

/// Parses a complete stylesheet, collecting every syntax error encountered.
pub fn parse_stylesheet(source: &str) -> Result<ParsedStylesheet, Vec<SyntaxError>> {
    let mut parser = StylesheetParser::new(source);
    let sheet = parser.run();
    if parser.errors.is_empty() {
        debug!(
            "Parsed {} rulesets, {} variables, {} map properties",
            sheet.rulesets.len(),
            sheet.variables.len(),
            sheet.map_properties.len()
        );
        Ok(sheet)
    } else {
        Err(parser.errors)
    }
}

/// Parses a single property value expression.
pub fn parse_value(input: &str) -> Result<ValueNode, SyntaxError> {
    match delimited(sp, value_list, sp).parse(input) {
        Ok(("", node)) => Ok(node),
        Ok((rem, _)) => Err(SyntaxError::at(
            input,
            rem,
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(_) => Err(SyntaxError::at(input, input, "invalid value")),
    }
}

// --- Combinators & Helpers ---

fn block_comment(input: &str) -> Res<&str> {
    recognize((tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

fn line_comment(input: &str) -> Res<&str> {
    recognize(pair(tag("//"), take_while(|c| c != '\n'))).parse(input)
}

/// Skips whitespace and comments.
fn sp(input: &str) -> Res<()> {
    value((), many0(alt((multispace1, block_comment, line_comment)))).parse(input)
}

fn skip_space(input: &str) -> &str {
    sp(input).map(|(rest, _)| rest).unwrap_or(input)
}

fn ws<'a, F, O>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(sp, inner, sp)
}

fn fail<T>(input: &str, kind: nom::error::ErrorKind) -> Res<'_, T> {
    Err(nom::Err::Error(nom::error::Error::new(input, kind)))
}

fn ident(input: &str) -> Res<&str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    ))
    .parse(input)
}

fn property_name(input: &str) -> Res<&str> {
    recognize(pair(opt(char('-')), ident)).parse(input)
}

fn name_chars(input: &str) -> Res<&str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-').parse(input)
}

/// Field names inside brackets may contain dots (nested data) and colons.
fn field_token(input: &str) -> Res<&str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')).parse(input)
}

// --- Literal Parsers ---

fn unit(input: &str) -> Res<&str> {
    alt((tag("px"), tag("pt"), tag("em"), tag("deg"), tag("%"))).parse(input)
}

fn number(input: &str) -> Res<f64> {
    let (rest, text) = recognize(pair(
        opt(char('-')),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit1)))),
            recognize(pair(char('.'), digit1)),
        )),
    ))
    .parse(input)?;
    let (rest, _) = opt(unit).parse(rest)?;
    match text.parse::<f64>() {
        Ok(n) => Ok((rest, n)),
        Err(_) => fail(input, nom::error::ErrorKind::Float),
    }
}

fn string_literal(input: &str) -> Res<String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn hex_color(input: &str) -> Res<Color> {
    let (rest, digits) =
        preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit())).parse(input)?;
    if rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return fail(input, nom::error::ErrorKind::HexDigit);
    }
    match Color::parse_hex(&format!("#{}", digits)) {
        Ok(color) => Ok((rest, color)),
        Err(_) => fail(input, nom::error::ErrorKind::HexDigit),
    }
}

fn url(input: &str) -> Res<String> {
    delimited(
        pair(tag("url("), sp),
        alt((
            string_literal,
            map(take_while1(|c: char| c != ')' && !c.is_whitespace()), str::to_string),
        )),
        pair(sp, char(')')),
    )
    .parse(input)
}

fn field(input: &str) -> Res<FieldPath> {
    map(delimited(pair(char('['), sp), field_token, pair(sp, char(']'))), FieldPath::new).parse(input)
}

fn variable(input: &str) -> Res<String> {
    map(preceded(char('@'), ident), str::to_string).parse(input)
}

fn keyword_or_color(word: &str) -> ValueNode {
    match Color::from_name(word) {
        Some(color) => ValueNode::Color(color),
        None => ValueNode::Keyword(word.to_string()),
    }
}

// --- Value Expression Parsers (in order of precedence) ---

fn call(input: &str) -> Res<ValueNode> {
    let (rest, name) = ident(input)?;
    let (rest, args) = delimited(
        pair(char('('), sp),
        separated_list0(ws(char(',')), additive),
        pair(sp, char(')')),
    )
    .parse(rest)?;
    Ok((
        rest,
        ValueNode::Call {
            name: name.to_string(),
            args,
        },
    ))
}

fn primary(input: &str) -> Res<ValueNode> {
    alt((
        map(url, ValueNode::Url),
        call,
        map(hex_color, ValueNode::Color),
        map(number, ValueNode::Number),
        map(string_literal, ValueNode::Str),
        map(field, ValueNode::Field),
        map(variable, ValueNode::Variable),
        map(ident, keyword_or_color),
        delimited(pair(char('('), sp), additive, pair(sp, char(')'))),
    ))
    .parse(input)
}

fn unary(input: &str) -> Res<ValueNode> {
    alt((
        primary,
        map(preceded(char('-'), primary), |node| ValueNode::Negate(Box::new(node))),
    ))
    .parse(input)
}

fn build_binary_parser<'a, F, G>(
    operand: F,
    operator: G,
) -> impl FnMut(&'a str) -> Res<'a, ValueNode>
where
    F: Parser<&'a str, Output = ValueNode, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = ArithmeticOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &'a str| {
        let (input, mut left) = operand.clone().parse(input)?;
        let (input, remainder) = many0(pair(ws(operator.clone()), operand.clone())).parse(input)?;
        for (op, right) in remainder {
            left = ValueNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

fn multiplicative_op(input: &str) -> Res<ArithmeticOperator> {
    alt((
        map(char('*'), |_| ArithmeticOperator::Multiply),
        map(char('/'), |_| ArithmeticOperator::Divide),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> Res<ArithmeticOperator> {
    alt((
        map(char('+'), |_| ArithmeticOperator::Add),
        map(char('-'), |_| ArithmeticOperator::Subtract),
    ))
    .parse(input)
}

fn multiplicative(input: &str) -> Res<ValueNode> {
    build_binary_parser(unary, multiplicative_op)(input)
}

fn additive(input: &str) -> Res<ValueNode> {
    build_binary_parser(multiplicative, additive_op)(input)
}

fn value_list(input: &str) -> Res<ValueNode> {
    map(separated_list1(ws(char(',')), additive), |mut items| {
        if items.len() == 1 {
            items.remove(0)
        } else {
            ValueNode::List(items)
        }
    })
    .parse(input)
}

// --- Selector Parsers ---

#[derive(Debug, Clone)]
enum RawOperand<'a> {
    Number(f64),
    Str(String),
    Token(&'a str),
}

#[derive(Debug, Clone)]
struct RawFilter<'a> {
    at: &'a str,
    key: &'a str,
    op: Comparison,
    operand: RawOperand<'a>,
}

#[derive(Debug, Clone)]
enum SelectorPart<'a> {
    Element(&'a str),
    Attachment(&'a str),
    Filter(RawFilter<'a>),
}

fn comparison(input: &str) -> Res<Comparison> {
    alt((
        map(tag("!="), |_| Comparison::Ne),
        map(tag(">="), |_| Comparison::Ge),
        map(tag("<="), |_| Comparison::Le),
        map(tag("="), |_| Comparison::Eq),
        map(tag(">"), |_| Comparison::Gt),
        map(tag("<"), |_| Comparison::Lt),
    ))
    .parse(input)
}

fn filter_operand(input: &str) -> Res<RawOperand<'_>> {
    alt((
        map(terminated(number, not(name_chars)), RawOperand::Number),
        map(string_literal, RawOperand::Str),
        map(field_token, RawOperand::Token),
    ))
    .parse(input)
}

fn raw_filter(input: &str) -> Res<RawFilter<'_>> {
    let at = input;
    let (rest, (key, op, operand)) = delimited(
        pair(char('['), sp),
        (
            field_token,
            ws(comparison),
            filter_operand,
        ),
        pair(sp, char(']')),
    )
    .parse(input)?;
    Ok((rest, RawFilter { at, key, op, operand }))
}

fn selector_part(input: &str) -> Res<SelectorPart<'_>> {
    alt((
        map(preceded(tag("::"), name_chars), SelectorPart::Attachment),
        map(raw_filter, SelectorPart::Filter),
        map(recognize(pair(alt((char('#'), char('.'))), name_chars)), SelectorPart::Element),
        map(ident, SelectorPart::Element),
    ))
    .parse(input)
}

fn raw_selector(input: &str) -> Res<Vec<SelectorPart<'_>>> {
    many1(preceded(sp, selector_part)).parse(input)
}

fn selector_list(input: &str) -> Res<Vec<Vec<SelectorPart<'_>>>> {
    separated_list1(ws(char(',')), raw_selector).parse(input)
}

fn declaration_head(input: &str) -> Res<&str> {
    terminated(property_name, (sp, char(':'), not(char(':')), sp)).parse(input)
}

fn variable_head(input: &str) -> Res<&str> {
    delimited(char('@'), ident, (sp, char(':'), sp)).parse(input)
}

/// Skips to just after the next `;` or closed block, or to just before the
/// `}` closing the enclosing block.
fn recover(input: &str) -> &str {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return &input[i..],
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &input[i + 1..];
                }
            }
            ';' if depth == 0 => return &input[i + 1..],
            _ => {}
        }
    }
    ""
}

// --- Block Driver ---

struct StylesheetParser<'a> {
    source: &'a str,
    errors: Vec<SyntaxError>,
    next_index: usize,
    /// Set once the input ends inside a block, so enclosing blocks stay quiet.
    unclosed: bool,
}

impl<'a> StylesheetParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            errors: Vec::new(),
            next_index: 0,
            unclosed: false,
        }
    }

    fn error(&mut self, at: &str, message: impl Into<String>) {
        self.errors.push(SyntaxError::at(self.source, at, message));
    }

    fn run(&mut self) -> ParsedStylesheet {
        let mut sheet = ParsedStylesheet::default();
        let mut rest = self.source;
        loop {
            rest = skip_space(rest);
            if rest.is_empty() {
                break;
            }
            if let Some(after) = rest.strip_prefix('}') {
                self.error(rest, "unexpected '}'");
                rest = after;
                continue;
            }
            if rest.starts_with('@') {
                rest = self.variable(rest, &mut sheet);
                continue;
            }
            match self.ruleset(rest, true) {
                Ok((remaining, ruleset)) => {
                    rest = remaining;
                    if ruleset.selectors.iter().any(Selector::is_map) {
                        if !ruleset.children.is_empty() {
                            warn!("Nested blocks inside 'Map' are ignored");
                        }
                        sheet.map_properties.extend(ruleset.declarations);
                    } else {
                        sheet.rulesets.push(ruleset);
                    }
                }
                Err(remaining) => rest = remaining,
            }
        }
        sheet
    }

    fn variable(&mut self, input: &'a str, sheet: &mut ParsedStylesheet) -> &'a str {
        let parsed = pair(variable_head, value_list).parse(input);
        match parsed {
            Ok((rest, (name, node))) => {
                let rest = skip_space(rest);
                match rest.strip_prefix(';') {
                    Some(after) => {
                        sheet.variables.push((name.to_string(), node));
                        after
                    }
                    None => {
                        self.error(rest, format!("expected ';' after variable '@{}'", name));
                        recover(rest)
                    }
                }
            }
            Err(_) => {
                self.error(input, "invalid variable declaration");
                recover(input)
            }
        }
    }

    fn selectors(&mut self, raw: Vec<Vec<SelectorPart<'a>>>, at: &'a str, top_level: bool) -> Vec<Selector> {
        let mut selectors = Vec::with_capacity(raw.len());
        for parts in raw {
            let mut selector = Selector::default();
            for part in parts {
                match part {
                    SelectorPart::Element(name) => selector.elements.push(name.to_string()),
                    SelectorPart::Attachment(name) => selector.attachment = Some(name.to_string()),
                    SelectorPart::Filter(filter) => match convert_filter(&filter) {
                        Ok(converted) => selector.filters.push(converted),
                        Err(message) => self.error(filter.at, message),
                    },
                }
            }
            if top_level && selector.elements.is_empty() {
                self.error(at, "a top-level selector must name an element such as '#layer'");
            }
            selectors.push(selector);
        }
        selectors
    }

    fn ruleset(&mut self, input: &'a str, top_level: bool) -> Result<(&'a str, Ruleset), &'a str> {
        let (rest, raw) = match selector_list(input) {
            Ok(parsed) => parsed,
            Err(_) => {
                self.error(input, "expected a selector");
                return Err(recover(input));
            }
        };
        let selectors = self.selectors(raw, input, top_level);

        let rest = skip_space(rest);
        let Some(mut rest) = rest.strip_prefix('{') else {
            self.error(rest, "expected '{' after selector");
            return Err(recover(rest));
        };

        let mut ruleset = Ruleset {
            selectors,
            ..Default::default()
        };
        loop {
            rest = skip_space(rest);
            if let Some(after) = rest.strip_prefix('}') {
                return Ok((after, ruleset));
            }
            if rest.is_empty() {
                if !self.unclosed {
                    self.unclosed = true;
                    self.error(input, "unclosed block");
                }
                return Err(rest);
            }
            if let Some(after) = rest.strip_prefix(';') {
                rest = after;
                continue;
            }
            if rest.starts_with('@') {
                self.error(rest, "variables must be declared at the top level");
                rest = recover(rest);
                continue;
            }
            if declaration_head(rest).is_ok() {
                rest = self.declaration(rest, &mut ruleset.declarations);
                continue;
            }
            match self.ruleset(rest, false) {
                Ok((after, child)) => {
                    ruleset.children.push(child);
                    rest = after;
                }
                Err(after) => rest = after,
            }
        }
    }

    fn declaration(&mut self, input: &'a str, declarations: &mut Vec<Declaration>) -> &'a str {
        let Ok((rest, name)) = declaration_head(input) else {
            self.error(input, "expected a declaration");
            return recover(input);
        };
        match value_list(rest) {
            Ok((after_value, node)) => {
                let after_value = skip_space(after_value);
                let remaining = if let Some(after) = after_value.strip_prefix(';') {
                    after
                } else if after_value.starts_with('}') || after_value.is_empty() {
                    after_value
                } else {
                    self.error(after_value, format!("unexpected input after value of '{}'", name));
                    return recover(after_value);
                };
                declarations.push(Declaration {
                    name: name.to_string(),
                    value: node,
                    index: self.next_index,
                    line: SyntaxError::at(self.source, input, "").line,
                });
                self.next_index += 1;
                remaining
            }
            Err(_) => {
                self.error(rest, format!("invalid value for '{}'", name));
                recover(rest)
            }
        }
    }
}

/// `value` as an `i64` when it is a whole number in range.
fn integer(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
}

fn convert_filter(raw: &RawFilter<'_>) -> Result<SelectorFilter, String> {
    match raw.key {
        "zoom" => match raw.operand {
            RawOperand::Number(n) => integer(n)
                .and_then(|z| u32::try_from(z).ok())
                .map(|z| SelectorFilter::Zoom(raw.op, z))
                .ok_or_else(|| format!("zoom filter needs a non-negative 32-bit integer, got {}", n)),
            _ => Err("zoom filter needs a number".to_string()),
        },
        "frame-offset" => {
            if raw.op != Comparison::Eq {
                return Err(format!("frame-offset filters only support '=', got '{}'", raw.op));
            }
            match raw.operand {
                RawOperand::Number(n) => integer(n)
                    .map(SelectorFilter::FrameOffset)
                    .ok_or_else(|| format!("frame-offset must be an integer, got {}", n)),
                _ => Err("frame-offset filter needs a number".to_string()),
            }
        }
        key => {
            let (filter_key, value) = if key == "mapnik::geometry_type" {
                let value = match &raw.operand {
                    RawOperand::Number(n) => FilterOperand::Number(*n),
                    RawOperand::Str(s) => FilterOperand::Str(s.clone()),
                    RawOperand::Token(t) => FilterOperand::Str(t.to_string()),
                };
                (FilterKey::GeometryType, value)
            } else {
                let value = match &raw.operand {
                    RawOperand::Number(n) => FilterOperand::Number(*n),
                    RawOperand::Str(s) => FilterOperand::Str(s.clone()),
                    RawOperand::Token(t) => FilterOperand::Field(FieldPath::new(t)),
                };
                (FilterKey::Field(FieldPath::new(key)), value)
            };
            Ok(SelectorFilter::Data(Filter {
                key: filter_key,
                op: raw.op,
                value,
            }))
        }
    }
}
