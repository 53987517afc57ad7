// crumbs-template/src/parser.rs

use std::collections::HashSet;
use std::ops::Range;

use chumsky::prelude::*;

use crate::ast::{Placeholder, Segment, Span, Template};
use crate::error::{ParseError, ParseErrorKind};

fn segments_parser() -> impl Parser<char, Vec<Segment>, Error = Simple<char>> {
    // Pattern text runs up to the closing brace of its placeholder. Nested
    // `{...}` groups are kept verbatim, so `\d{4}` and `{a,b}` both work.
    let pattern_text = recursive(|nested| {
        choice((
            none_of("{}").repeated().at_least(1).collect::<String>(),
            nested
                .delimited_by(just('{'), just('}'))
                .map(|inner: String| format!("{{{inner}}}")),
        ))
        .repeated()
        .map(|chunks: Vec<String>| chunks.concat())
    });

    // Empty names are accepted here and rejected in `parse_template`, which
    // has a better message for them.
    let name = filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .collect::<String>();

    // {name} or {name:pattern}
    let placeholder = name
        .then(just(':').ignore_then(pattern_text).or_not())
        .delimited_by(just('{'), just('}'))
        .map_with_span(|(name, pattern), span: Range<usize>| {
            Segment::Arg(Placeholder {
                name,
                pattern,
                span: Span::new(span.start, span.end),
            })
        });

    let literal = none_of("{}")
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(Segment::Literal);

    choice((placeholder, literal)).repeated().then_ignore(end())
}

/// Parse a template string into its segments.
///
/// Fails on unbalanced braces, an empty argument name, or an argument name
/// used twice.
pub fn parse_template(input: &str) -> Result<Template, ParseError> {
    let segments = segments_parser().parse(input).map_err(|errs| {
        // chumsky reports the furthest failure first
        match errs.into_iter().next() {
            Some(e) => ParseError::new(
                ParseErrorKind::Syntax,
                e.span().start,
                format!("unbalanced braces or malformed argument: {e}"),
            ),
            None => ParseError::new(ParseErrorKind::Syntax, 0, "invalid template"),
        }
    })?;

    let mut seen: HashSet<&str> = HashSet::new();
    for seg in &segments {
        let Segment::Arg(p) = seg else { continue };

        if p.name.is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::EmptyName,
                p.span.start,
                "argument name must not be empty",
            ));
        }
        if !seen.insert(p.name.as_str()) {
            return Err(ParseError::new(
                ParseErrorKind::DuplicateName(p.name.clone()),
                p.span.start,
                format!("argument `{}` appears more than once", p.name),
            ));
        }
    }

    Ok(Template { segments })
}
