//! The crumb: a parsed template plus the values bound to some of its
//! arguments and the configuration used to match it against a filesystem.
//!
//! Crumbs are value objects. [`Crumb::replace`] and the listing methods
//! derive new crumbs and leave their receiver alone, so a crumb can be
//! shared freely as long as nobody calls one of the `&mut self` methods
//! ([`Crumb::bind`], [`Crumb::unbind`], [`Crumb::set_pattern`],
//! [`Crumb::clear_pattern`]) on it.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crumbs_template::{parse_template, Segment, Span, Template};

use crate::compile::{components, join};
use crate::pattern::{IgnoreList, MatchMode, Pattern, PatternStore};
use crate::Error;

/// Per-instance configuration, carried by every crumb derived from this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrumbOptions {
    /// Glob exclusions applied to entry names while listing.
    pub ignore: Vec<String>,

    /// How argument patterns are read.
    pub mode: MatchMode,

    /// Only return listings that point at existing paths.
    pub check_exists: bool,
}

impl Default for CrumbOptions {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            mode: MatchMode::Glob,
            check_exists: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Crumb {
    template: Template,
    values: BTreeMap<String, String>,
    patterns: PatternStore,
    ignore: IgnoreList,
    check_exists: bool,
}

impl Crumb {
    /// Parse `path` with default options.
    pub fn new(path: &str) -> Result<Crumb, Error> {
        Crumb::with_options(path, &CrumbOptions::default())
    }

    pub fn with_options(path: &str, opts: &CrumbOptions) -> Result<Crumb, Error> {
        let template = parse_template(path)?;

        let mut patterns = PatternStore::new(opts.mode);
        for p in template.placeholders() {
            if let Some(text) = p.pattern_text() {
                patterns.set(&p.name, text)?;
            }
        }

        Ok(Crumb {
            template,
            values: BTreeMap::new(),
            patterns,
            ignore: IgnoreList::new(opts.ignore.iter().cloned())?,
            check_exists: opts.check_exists,
        })
    }

    pub fn options(&self) -> CrumbOptions {
        CrumbOptions {
            ignore: self.ignore.globs().to_vec(),
            mode: self.patterns.mode(),
            check_exists: self.check_exists,
        }
    }

    pub fn with_ignore<I, S>(mut self, globs: I) -> Result<Crumb, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = IgnoreList::new(globs)?;
        Ok(self)
    }

    /// Switch the match mode, recompiling every argument pattern.
    pub fn with_mode(mut self, mode: MatchMode) -> Result<Crumb, Error> {
        let mut patterns = PatternStore::new(mode);
        for p in self.template.placeholders() {
            if let Some(text) = p.pattern_text() {
                patterns.set(&p.name, text)?;
            }
        }
        self.patterns = patterns;
        Ok(self)
    }

    pub fn with_check_exists(mut self, check_exists: bool) -> Crumb {
        self.check_exists = check_exists;
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn mode(&self) -> MatchMode {
        self.patterns.mode()
    }

    pub fn ignore_list(&self) -> &IgnoreList {
        &self.ignore
    }

    pub fn check_exists(&self) -> bool {
        self.check_exists
    }

    pub(crate) fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    pub(crate) fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// The current path: bound values substituted, open arguments in their
    /// placeholder syntax.
    pub fn path(&self) -> String {
        self.template
            .render(|name| self.values.get(name).map(String::as_str))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.template.contains(name)
    }

    pub(crate) fn check_arg(&self, name: &str) -> Result<(), Error> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(Error::UnknownArgument {
                name: name.to_string(),
                template: self.path(),
            })
        }
    }

    /// Every argument name, bound or not, in template order.
    pub fn all_args(&self) -> Vec<&str> {
        self.template.arg_names().collect()
    }

    /// Argument names with no bound value, in template order.
    pub fn open_args(&self) -> Vec<&str> {
        self.template
            .arg_names()
            .filter(|n| !self.values.contains_key(*n))
            .collect()
    }

    pub fn has_open_args(&self) -> bool {
        self.template
            .arg_names()
            .any(|n| !self.values.contains_key(n))
    }

    /// The bound value of `name`, `None` while it is open.
    pub fn get(&self, name: &str) -> Result<Option<&str>, Error> {
        self.check_arg(name)?;
        Ok(self.values.get(name).map(String::as_str))
    }

    /// A copy of this crumb with `values` bound. Existing bindings for the
    /// same names are replaced.
    pub fn replace<I, K, V>(&self, values: I) -> Result<Crumb, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cr = self.clone();
        for (k, v) in values {
            cr.bind(k.as_ref(), v.as_ref())?;
        }
        Ok(cr)
    }

    /// Bind `name` in place.
    pub fn bind(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.check_arg(name)?;
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Reopen `name`, returning its previous value.
    pub fn unbind(&mut self, name: &str) -> Result<Option<String>, Error> {
        self.check_arg(name)?;
        Ok(self.values.remove(name))
    }

    pub fn get_pattern(&self, name: &str) -> Result<Option<&Pattern>, Error> {
        self.check_arg(name)?;
        Ok(self.patterns.get(name))
    }

    /// Constrain `name` to entries matching `text`. The placeholder text of
    /// the crumb's path changes accordingly.
    pub fn set_pattern(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.check_arg(name)?;
        self.patterns.set(name, text)?;
        self.template.set_pattern(name, Some(text.to_string()));
        Ok(())
    }

    pub fn clear_pattern(&mut self, name: &str) -> Result<(), Error> {
        self.check_arg(name)?;
        self.patterns.clear(name);
        self.template.set_pattern(name, None);
        Ok(())
    }

    /// Split into the literal path before the first open argument and the
    /// template text from that argument's path component on.
    ///
    /// Without open arguments the whole path is the prefix.
    pub fn split(&self) -> (String, String) {
        let comps = components(&self.template, &self.values);
        match comps.iter().position(|c| c.is_open()) {
            Some(idx) => (join(&comps[..idx]), join(&comps[idx..])),
            None => (self.path(), String::new()),
        }
    }

    /// The concrete path, for operations that need every argument bound.
    pub fn resolved_path(&self) -> Result<PathBuf, Error> {
        if self.has_open_args() {
            return Err(Error::NotFullySpecified {
                path: self.path(),
                open: self.open_args().into_iter().map(String::from).collect(),
            });
        }
        Ok(PathBuf::from(self.path()))
    }

    pub fn is_abs(&self) -> bool {
        Path::new(&self.split().0).is_absolute()
    }

    /// A copy rooted at the current directory when this crumb is relative.
    pub fn abspath(&self) -> Result<Crumb, Error> {
        if self.is_abs() {
            return Ok(self.clone());
        }

        let cwd = std::env::current_dir().map_err(|e| Error::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        self.rooted_at(&cwd)
    }

    /// A copy with `dir` in front of the template. `dir` is taken as
    /// literal text, braces included.
    pub fn rooted_at(&self, dir: &Path) -> Result<Crumb, Error> {
        let Some(dir) = dir.to_str() else {
            return Err(Error::NonUtf8Path {
                path: dir.to_path_buf(),
            });
        };

        let mut prefix = dir.to_string();
        if !prefix.ends_with(std::path::is_separator) {
            prefix.push(std::path::MAIN_SEPARATOR);
        }
        let shift = prefix.chars().count();

        let mut segments = Vec::with_capacity(self.template.segments.len() + 1);
        segments.push(Segment::Literal(prefix));
        for seg in &self.template.segments {
            if let (Segment::Literal(lit), Some(Segment::Literal(prev))) = (seg, segments.last_mut()) {
                prev.push_str(lit);
                continue;
            }
            segments.push(match seg {
                Segment::Arg(p) => {
                    let mut p = p.clone();
                    p.span = Span::new(p.span.start + shift, p.span.end + shift);
                    Segment::Arg(p)
                }
                lit => lit.clone(),
            });
        }

        let mut cr = self.clone();
        cr.template = Template { segments };
        Ok(cr)
    }

    /// Create the resolved prefix directory with all its parents, or the
    /// whole path when every argument is bound.
    pub fn touch(&self) -> Result<PathBuf, Error> {
        let dir = PathBuf::from(self.split().0);
        if dir.as_os_str().is_empty() {
            return Ok(dir);
        }
        fs::create_dir_all(&dir).map_err(|e| Error::Io {
            path: dir.clone(),
            source: e,
        })?;
        tracing::debug!(path = %dir.display(), "touched");
        Ok(dir)
    }
}

impl FromStr for Crumb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Crumb::new(s)
    }
}

impl fmt::Display for Crumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl PartialEq for Crumb {
    fn eq(&self, other: &Self) -> bool {
        self.template.to_string() == other.template.to_string()
            && self.values == other.values
            && self.ignore == other.ignore
            && self.patterns.mode() == other.patterns.mode()
            && self.check_exists == other.check_exists
    }
}

impl Eq for Crumb {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::MAIN_SEPARATOR_STR;

    fn cr(s: &str) -> Crumb {
        Crumb::new(s).unwrap()
    }

    #[test]
    fn args_in_template_order() {
        let c = cr("{base}/raw/{subject}/{session}/{kind}");
        assert_eq!(c.all_args(), vec!["base", "subject", "session", "kind"]);
        assert_eq!(c.open_args(), vec!["base", "subject", "session", "kind"]);

        let c = c.replace([("subject", "s1")]).unwrap();
        assert_eq!(c.all_args(), vec!["base", "subject", "session", "kind"]);
        assert_eq!(c.open_args(), vec!["base", "session", "kind"]);
    }

    #[test]
    fn replace_is_pure() {
        let c = cr("/data/{sid}/{img:anat*}");
        let d = c.replace([("sid", "s1")]).unwrap();

        assert_eq!(c.path(), "/data/{sid}/{img:anat*}");
        assert_eq!(d.path(), "/data/s1/{img:anat*}");
        assert_eq!(c.get("sid").unwrap(), None);
        assert_eq!(d.get("sid").unwrap(), Some("s1"));
    }

    #[test]
    fn replace_overwrites_prior_binding() {
        let c = cr("/data/{sid}/{img}")
            .replace([("sid", "s1")])
            .unwrap()
            .replace([("sid", "s2")])
            .unwrap();
        assert_eq!(c.path(), "/data/s2/{img}");
    }

    #[test]
    fn replace_unknown_argument_fails() {
        let c = cr("/data/{sid}");
        let err = c.replace([("nope", "x")]).unwrap_err();
        assert!(matches!(err, Error::UnknownArgument { ref name, .. } if name == "nope"));
    }

    #[test]
    fn bind_in_place() {
        let mut c = cr("/data/{sid}/{img}");
        c.bind("img", "t1.nii").unwrap();
        assert_eq!(c.path(), "/data/{sid}/t1.nii");
        assert_eq!(c.unbind("img").unwrap(), Some("t1.nii".to_string()));
        assert_eq!(c.path(), "/data/{sid}/{img}");
        assert!(c.bind("other", "x").is_err());
    }

    #[test]
    fn set_pattern_validates_and_renders() {
        let mut c = cr("/data/{sid}/{img}");
        c.set_pattern("img", "anat*").unwrap();
        assert_eq!(c.path(), "/data/{sid}/{img:anat*}");
        assert!(c.get_pattern("img").unwrap().unwrap().matches("anat_1"));
        assert!(c.get_pattern("sid").unwrap().is_none());

        c.clear_pattern("img").unwrap();
        assert_eq!(c.path(), "/data/{sid}/{img}");

        assert!(matches!(
            c.set_pattern("missing", "*"),
            Err(Error::UnknownArgument { .. })
        ));
    }

    #[test]
    fn split_at_first_open_argument() {
        let c = cr("/data/raw/{sid}/{img}");
        let (prefix, rest) = c.split();
        assert_eq!(Path::new(&prefix), Path::new("/data/raw"));
        assert_eq!(rest, ["{sid}", "{img}"].join(MAIN_SEPARATOR_STR));

        let c = c.replace([("sid", "s1")]).unwrap();
        assert_eq!(Path::new(&c.split().0), Path::new("/data/raw/s1"));
    }

    #[test]
    fn split_of_leading_argument_has_empty_prefix() {
        let (prefix, _) = cr("{base}/raw").split();
        assert_eq!(prefix, "");
    }

    #[test]
    fn resolved_path_requires_all_bound() {
        let c = cr("/data/{sid}/{img}");
        match c.resolved_path() {
            Err(Error::NotFullySpecified { open, .. }) => assert_eq!(open, vec!["sid", "img"]),
            other => panic!("unexpected {other:?}"),
        }

        let c = c.replace([("sid", "s1"), ("img", "t1.nii")]).unwrap();
        assert_eq!(c.resolved_path().unwrap(), PathBuf::from("/data/s1/t1.nii"));
    }

    #[test]
    fn options_survive_derivation() {
        let opts = CrumbOptions {
            ignore: vec![".*".into()],
            mode: MatchMode::Regex,
            check_exists: false,
        };
        let c = Crumb::with_options("/d/{a}/{b}", &opts).unwrap();
        let d = c.replace([("a", "x")]).unwrap();
        assert_eq!(d.options(), opts);
    }

    #[test]
    fn with_mode_recompiles_patterns() {
        let c = cr(r"/d/{sid:s\d}");
        assert!(!c.get_pattern("sid").unwrap().unwrap().matches("s1"));

        let c = c.with_mode(MatchMode::Regex).unwrap();
        assert!(c.get_pattern("sid").unwrap().unwrap().matches("s1"));
    }

    #[test]
    fn invalid_inline_pattern_fails_at_construction() {
        let opts = CrumbOptions {
            mode: MatchMode::Regex,
            ..CrumbOptions::default()
        };
        assert!(matches!(
            Crumb::with_options("/d/{a:(}", &opts),
            Err(Error::Pattern { .. })
        ));
    }

    #[test]
    fn abspath_roots_relative_crumbs() {
        let c = cr("data/{sid}").replace([("sid", "s1")]).unwrap();
        assert!(!c.is_abs());

        let a = c.abspath().unwrap();
        assert!(a.is_abs());
        assert_eq!(a.get("sid").unwrap(), Some("s1"));
        assert!(a.path().ends_with("s1"));

        let abs = cr("/data/{sid}");
        assert_eq!(abs.abspath().unwrap(), abs);
    }

    #[test]
    fn rooting_keeps_directory_text_literal() {
        let c = cr("data/{sid:s*}").replace([("sid", "s1")]).unwrap();
        let rooted = c.rooted_at(Path::new("/tmp/proj{x}")).unwrap();

        assert_eq!(rooted.all_args(), vec!["sid"]);
        assert_eq!(rooted.template().to_string(), "/tmp/proj{x}/data/{sid:s*}");
        assert_eq!(rooted.path(), "/tmp/proj{x}/data/s1");
        assert!(rooted.is_abs());
        assert!(rooted.get_pattern("sid").unwrap().unwrap().matches("s2"));

        let p = rooted.template().placeholder("sid").unwrap();
        assert_eq!(p.span.start, "/tmp/proj{x}/data/".chars().count());
    }

    #[cfg(unix)]
    #[test]
    fn rooting_at_non_utf8_directory_fails() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = Path::new(OsStr::from_bytes(b"/tmp/\xff"));
        assert!(matches!(
            cr("data/{sid}").rooted_at(dir),
            Err(Error::NonUtf8Path { .. })
        ));
    }

    #[test]
    fn equality_and_display() {
        let a = cr("/d/{a}").replace([("a", "1")]).unwrap();
        let b = cr("/d/{a}").replace([("a", "1")]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "/d/1");
        assert_ne!(a, cr("/d/{a}"));
        assert_eq!("/d/{a}".parse::<Crumb>().unwrap(), cr("/d/{a}"));
    }
}
