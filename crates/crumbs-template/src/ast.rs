// crumbs-template/src/ast.rs

use std::fmt;

/// A parsed crumb template: literal text interleaved with named arguments.
///
/// `Display` renders the template with every argument open, which gives
/// back the exact source text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Fixed text, separators included.
    Literal(String),

    /// `{name}` or `{name:pattern}`
    Arg(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,

    /// Verbatim pattern text after the `:`. `Some("")` for `{name:}` so the
    /// colon survives a re-render.
    pub pattern: Option<String>,

    /// Span of the entire `{ ... }` including braces.
    pub span: Span,
}

/// Character span in the source template string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize, // inclusive
    pub end: usize,   // exclusive
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl Placeholder {
    /// Pattern text, with the empty pattern treated as no pattern.
    pub fn pattern_text(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pattern {
            Some(p) => write!(f, "{{{}:{}}}", self.name, p),
            None => write!(f, "{{{}}}", self.name),
        }
    }
}

impl Template {
    /// Argument names in template order.
    pub fn arg_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.placeholders().map(|p| p.name.as_str())
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Arg(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    pub fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.placeholder(name).is_some()
    }

    /// Replace the pattern text of argument `name`.
    ///
    /// Returns false when the template has no such argument.
    pub fn set_pattern(&mut self, name: &str, pattern: Option<String>) -> bool {
        for seg in &mut self.segments {
            if let Segment::Arg(p) = seg {
                if p.name == name {
                    p.pattern = pattern;
                    return true;
                }
            }
        }
        false
    }

    /// Render the template, substituting every argument for which `lookup`
    /// returns a value. Arguments without a value keep their placeholder
    /// syntax, pattern included.
    pub fn render<'v, F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<&'v str>,
    {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Arg(p) => match lookup(&p.name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&p.to_string()),
                },
            }
        }
        out
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_| None))
    }
}
