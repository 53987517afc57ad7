// Compilation module: splits a crumb into path components and compiles the
// open ones into entry-name matchers.

use std::collections::BTreeMap;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

use crumbs_template::{Segment, Template};
use regex::Regex;

use crate::Error;

fn is_sep(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Text(String),
    Open {
        name: String,
        /// Placeholder syntax, pattern included.
        raw: String,
    },
}

/// One path component: the text between two separators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Component {
    pub pieces: Vec<Piece>,
}

impl Component {
    fn push_text(&mut self, t: &str) {
        if t.is_empty() {
            return;
        }
        if let Some(Piece::Text(last)) = self.pieces.last_mut() {
            last.push_str(t);
        } else {
            self.pieces.push(Piece::Text(t.to_string()));
        }
    }

    pub fn is_open(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, Piece::Open { .. }))
    }

    pub fn open_args(&self) -> impl Iterator<Item = &str> + '_ {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Open { name, .. } => Some(name.as_str()),
            Piece::Text(_) => None,
        })
    }

    /// Component text with open arguments in placeholder syntax.
    pub fn render(&self) -> String {
        self.pieces
            .iter()
            .map(|p| match p {
                Piece::Text(t) => t.as_str(),
                Piece::Open { raw, .. } => raw.as_str(),
            })
            .collect()
    }
}

/// Split the template, with `values` substituted, into path components.
///
/// Bound values are spliced in as text, so a value holding separators
/// (e.g. a base directory) spans several components.
pub(crate) fn components(template: &Template, values: &BTreeMap<String, String>) -> Vec<Component> {
    fn push_text(cur: &mut Component, out: &mut Vec<Component>, text: &str) {
        let mut parts = text.split(is_sep);
        if let Some(first) = parts.next() {
            cur.push_text(first);
        }
        for part in parts {
            out.push(std::mem::take(cur));
            cur.push_text(part);
        }
    }

    let mut out = Vec::new();
    let mut cur = Component::default();

    for seg in &template.segments {
        match seg {
            Segment::Literal(lit) => push_text(&mut cur, &mut out, lit),
            Segment::Arg(p) => match values.get(&p.name) {
                Some(v) => push_text(&mut cur, &mut out, v),
                None => cur.pieces.push(Piece::Open {
                    name: p.name.clone(),
                    raw: p.to_string(),
                }),
            },
        }
    }
    out.push(cur);
    out
}

/// Join literal components into a path string. A lone empty component is
/// the filesystem root.
pub(crate) fn join(parts: &[Component]) -> String {
    let s = parts
        .iter()
        .map(Component::render)
        .collect::<Vec<_>>()
        .join(MAIN_SEPARATOR_STR);
    if s.is_empty() && !parts.is_empty() {
        MAIN_SEPARATOR.to_string()
    } else {
        s
    }
}

/// Matcher for the entry names that can fill an open component.
#[derive(Debug, Clone)]
pub(crate) enum ComponentMatcher {
    /// The component is exactly one argument: the entry name is its value.
    Whole(String),

    /// Literal text around one or more arguments, one lazy capture group
    /// per argument.
    Regex { regex: Regex, names: Vec<String> },
}

impl ComponentMatcher {
    pub fn compile(c: &Component) -> Result<ComponentMatcher, Error> {
        if let [Piece::Open { name, .. }] = c.pieces.as_slice() {
            return Ok(ComponentMatcher::Whole(name.clone()));
        }

        let mut pat = String::from("^");
        let mut names = Vec::new();
        for piece in &c.pieces {
            match piece {
                Piece::Text(t) => pat.push_str(&regex::escape(t)),
                Piece::Open { name, .. } => {
                    pat.push_str("(.+?)");
                    names.push(name.clone());
                }
            }
        }
        pat.push('$');

        let regex = Regex::new(&pat).map_err(|e| Error::Pattern {
            pattern: c.render(),
            msg: format!("invalid regex pattern for component: {e}"),
        })?;

        Ok(ComponentMatcher::Regex { regex, names })
    }

    /// Argument values extracted from `entry`, or `None` if it does not fit.
    pub fn capture(&self, entry: &str) -> Option<Vec<(String, String)>> {
        match self {
            ComponentMatcher::Whole(name) => Some(vec![(name.clone(), entry.to_string())]),
            ComponentMatcher::Regex { regex, names } => {
                let caps = regex.captures(entry)?;
                names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| caps.get(i + 1).map(|m| (n.clone(), m.as_str().to_string())))
                    .collect()
            }
        }
    }
}
