//! Entry-name matching for crumb arguments.
//!
//! Each argument may carry a pattern that limits which directory entries
//! can fill it. How the pattern text is read is decided once per crumb by
//! its [`MatchMode`]; after compilation every pattern answers the same
//! question through [`Pattern::matches`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use regex::{Regex, RegexBuilder};

use crate::Error;

/// How argument pattern text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Shell-style wildcards (`*`, `?`, `[...]`, `{a,b}`) over the whole name.
    #[default]
    Glob,
    /// Regular expression anchored at the start of the name.
    Regex,
    /// As `Regex`, ignoring case.
    RegexIgnoreCase,
}

impl FromStr for MatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "glob" | "fnmatch" => Ok(MatchMode::Glob),
            "regex" | "re" => Ok(MatchMode::Regex),
            "regex-i" | "re.ignorecase" => Ok(MatchMode::RegexIgnoreCase),
            other => Err(Error::Pattern {
                pattern: other.to_string(),
                msg: "unknown match mode, expected glob, regex or regex-i".into(),
            }),
        }
    }
}

/// A compiled argument pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// No constraint.
    Any,
    Glob { text: String, matcher: GlobMatcher },
    Regex { text: String, regex: Regex },
}

impl Pattern {
    /// Compile `text` under `mode`. Empty text compiles to [`Pattern::Any`].
    pub fn compile(text: &str, mode: MatchMode) -> Result<Pattern, Error> {
        if text.is_empty() {
            return Ok(Pattern::Any);
        }

        match mode {
            MatchMode::Glob => Ok(Pattern::Glob {
                text: text.to_string(),
                matcher: Glob::new(text)?.compile_matcher(),
            }),
            MatchMode::Regex | MatchMode::RegexIgnoreCase => {
                let regex = RegexBuilder::new(&format!("^(?:{text})"))
                    .case_insensitive(mode == MatchMode::RegexIgnoreCase)
                    .build()
                    .map_err(|e| Error::Pattern {
                        pattern: text.to_string(),
                        msg: e.to_string(),
                    })?;
                Ok(Pattern::Regex {
                    text: text.to_string(),
                    regex,
                })
            }
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Glob { matcher, .. } => matcher.is_match(name),
            Pattern::Regex { regex, .. } => regex.is_match(name),
        }
    }

    /// The source text, `None` for [`Pattern::Any`].
    pub fn text(&self) -> Option<&str> {
        match self {
            Pattern::Any => None,
            Pattern::Glob { text, .. } | Pattern::Regex { text, .. } => Some(text),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text().unwrap_or("*"))
    }
}

/// Compiled patterns for the arguments of one crumb, keyed by name.
///
/// Arguments without an entry match anything.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    mode: MatchMode,
    patterns: BTreeMap<String, Pattern>,
}

impl PatternStore {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            patterns: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    /// Compile and store `text` for `name`. Empty text clears it.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), Error> {
        match Pattern::compile(text, self.mode)? {
            Pattern::Any => {
                self.patterns.remove(name);
            }
            p => {
                self.patterns.insert(name.to_string(), p);
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, name: &str) {
        self.patterns.remove(name);
    }

    pub fn matches(&self, name: &str, candidate: &str) -> bool {
        self.patterns
            .get(name)
            .map_or(true, |p| p.matches(candidate))
    }
}

/// Glob exclusions applied to every entry name during traversal.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    globs: Vec<String>,
    set: GlobSet,
}

impl IgnoreList {
    pub fn new<I, S>(globs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let globs: Vec<String> = globs.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for g in &globs {
            builder.add(Glob::new(g)?);
        }
        Ok(Self {
            globs,
            set: builder.build()?,
        })
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    pub fn globs(&self) -> &[String] {
        &self.globs
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self {
            globs: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl PartialEq for IgnoreList {
    fn eq(&self, other: &Self) -> bool {
        self.globs == other.globs
    }
}

impl Eq for IgnoreList {}
