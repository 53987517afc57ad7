//! Filesystem traversal: enumerate the values that complete a crumb's open
//! arguments.
//!
//! Traversal is depth-first over an explicit stack of [`WalkCtx`] states,
//! one per directory still to be listed. A missing or unreadable directory
//! contributes no completions; it never aborts the walk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::{components, join, Component, ComponentMatcher};
use crate::{Crumb, Error, ValueTuple};

/// Where a traversal stops.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Stop<'a> {
    /// Collect completions up to these (open) arguments.
    Args(&'a [&'a str]),

    /// Bind every open argument.
    Leaves,
}

/// Per-directory traversal state.
#[derive(Debug, Clone)]
struct WalkCtx {
    /// Directory to list ("" means the current directory).
    dir: PathBuf,

    /// Index of the open component this directory's entries fill.
    comp: usize,

    /// Values bound so far on this branch, in template order.
    bound: Vec<(String, String)>,
}

/// One traversal plan: the crumb's components and a matcher for each open
/// component down to the level the walk collects at.
struct Plan<'c> {
    crumb: &'c Crumb,
    comps: Vec<Component>,
    matchers: Vec<Option<ComponentMatcher>>,

    /// Open component whose entries end a branch.
    depth: usize,

    /// Last open component; the only level that may hold non-directories.
    last: usize,

    /// How many bound values a completion keeps: those of the open
    /// components up to the target level.
    keep: usize,
}

impl<'c> Plan<'c> {
    /// `None` when there is nothing to walk: no open components, or only
    /// bound targets and no existence check.
    fn new(crumb: &'c Crumb, stop: Stop<'_>) -> Result<Option<Plan<'c>>, Error> {
        let comps = components(crumb.template(), crumb.values());

        let Some(last) = comps.iter().rposition(Component::is_open) else {
            return Ok(None);
        };
        let target = match stop {
            Stop::Leaves => Some(last),
            Stop::Args(names) => comps
                .iter()
                .rposition(|c| c.open_args().any(|a| names.contains(&a))),
        };

        // with existence checks a target only counts when a full
        // completion exists below it
        let depth = match (target, crumb.check_exists()) {
            (_, true) => last,
            (Some(t), false) => t,
            (None, false) => return Ok(None),
        };
        let keep = target.map_or(0, |t| {
            comps[..=t].iter().map(|c| c.open_args().count()).sum()
        });

        let matchers = comps[..=depth]
            .iter()
            .map(|c| c.is_open().then(|| ComponentMatcher::compile(c)).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Plan {
            crumb,
            comps,
            matchers,
            depth,
            last,
            keep,
        }))
    }

    fn next_open(&self, from: usize) -> usize {
        self.comps[from..]
            .iter()
            .position(Component::is_open)
            .map_or(self.comps.len(), |i| from + i)
    }

    /// `dir` extended with the literal components in `from..to`.
    fn descend(&self, dir: &Path, from: usize, to: usize) -> PathBuf {
        let mut out = dir.to_path_buf();
        for c in &self.comps[from..to] {
            out.push(c.render());
        }
        out
    }

    /// Values an entry binds at component `comp`, if it fits the component
    /// and every argument's pattern.
    fn accept(&self, comp: usize, name: &str) -> Option<Vec<(String, String)>> {
        if self.crumb.ignore_list().is_ignored(name) {
            return None;
        }
        let matcher = self.matchers[comp].as_ref()?;
        let caps = matcher.capture(name)?;
        caps.iter()
            .all(|(arg, value)| self.crumb.patterns().matches(arg, value))
            .then_some(caps)
    }
}

/// Run a traversal, returning the distinct sets of newly bound values in
/// lexicographic order.
///
/// With nothing left to bind the single empty completion is returned, after
/// an existence check of the whole path if the crumb asks for one.
///
/// Targeted walks on a crumb that checks existence still descend to the
/// last open level, then cut each completion back to the target values, so
/// a targeted listing never reports a value no full completion has.
pub(crate) fn expand(crumb: &Crumb, stop: Stop<'_>) -> Result<Vec<ValueTuple>, Error> {
    let Some(plan) = Plan::new(crumb, stop)? else {
        let keep = !crumb.check_exists() || path_exists(Path::new(&crumb.split().0));
        return Ok(if keep { vec![ValueTuple::default()] } else { Vec::new() });
    };

    let first = plan.next_open(0);
    let start = WalkCtx {
        dir: PathBuf::from(join(&plan.comps[..first])),
        comp: first,
        bound: Vec::new(),
    };

    tracing::debug!(
        crumb = %crumb,
        start = %start.dir.display(),
        depth = plan.depth,
        "walk: start"
    );

    let mut found: BTreeSet<ValueTuple> = BTreeSet::new();
    let mut stack = vec![start];

    while let Some(ctx) = stack.pop() {
        let mut children = Vec::new();

        for (name, is_dir) in list_dir(&ctx.dir) {
            let Some(caps) = plan.accept(ctx.comp, &name) else {
                continue;
            };

            let mut bound = ctx.bound.clone();
            bound.extend(caps);

            let here = ctx.dir.join(&name);
            let next = plan.next_open(ctx.comp + 1);

            if ctx.comp == plan.depth {
                if !is_dir && ctx.comp != plan.last {
                    continue;
                }
                if crumb.check_exists() && !path_exists(&plan.descend(&here, ctx.comp + 1, next)) {
                    continue;
                }
                bound.truncate(plan.keep);
                found.insert(ValueTuple::new(bound));
            } else if is_dir {
                children.push(WalkCtx {
                    dir: plan.descend(&here, ctx.comp + 1, next),
                    comp: next,
                    bound,
                });
            }
        }

        // reversed so siblings pop in sorted order
        stack.extend(children.into_iter().rev());
    }

    tracing::debug!(crumb = %crumb, count = found.len(), "walk: done");
    Ok(found.into_iter().collect())
}

/// Sorted `(name, is_dir)` entries of `dir`; empty if it can't be read.
fn list_dir(dir: &Path) -> Vec<(String, bool)> {
    let target = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };

    let rd = match fs::read_dir(target) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::trace!(dir = %target.display(), error = %e, "walk: skip unreadable directory");
            return Vec::new();
        }
    };

    let mut entries: Vec<(String, bool)> = rd
        .filter_map(Result::ok)
        .filter_map(|ent| {
            let is_dir = ent.path().is_dir();
            match ent.file_name().into_string() {
                Ok(name) => Some((name, is_dir)),
                Err(raw) => {
                    tracing::trace!(name = ?raw, "walk: skip non-utf8 entry");
                    None
                }
            }
        })
        .collect();
    entries.sort();

    tracing::trace!(dir = %target.display(), entries = entries.len(), "walk: listed");
    entries
}

/// True for existing paths and for dangling symlinks.
pub(crate) fn path_exists(p: &Path) -> bool {
    p.exists() || p.symlink_metadata().is_ok()
}

/// A listing target with an optional inline pattern (`name:pattern`).
fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once(':') {
        Some((name, pattern)) => (name, Some(pattern)),
        None => (target, None),
    }
}

impl Crumb {
    /// The crumb to list with: inline pattern overrides applied to a copy.
    fn with_overrides<'t>(&self, targets: &[&'t str]) -> Result<(Crumb, Vec<&'t str>), Error> {
        let mut eff = self.clone();
        let mut names = Vec::with_capacity(targets.len());
        for &target in targets {
            let (name, pattern) = parse_target(target);
            eff.check_arg(name)?;
            if let Some(p) = pattern {
                eff.set_pattern(name, p)?;
            }
            names.push(name);
        }
        Ok((eff, names))
    }

    /// Completions for a targeted listing: the values bound on the way to
    /// the targets, in template order, plus the bare target names.
    ///
    /// No targets lists every open argument.
    fn listing(&self, targets: &[&str]) -> Result<(Vec<String>, Vec<ValueTuple>), Error> {
        if targets.is_empty() {
            let names = self.open_args().into_iter().map(String::from).collect();
            return Ok((names, expand(self, Stop::Leaves)?));
        }

        let (eff, names) = self.with_overrides(targets)?;

        // a bound target lists its value only if that value passes the
        // target's pattern, inline override included
        let rejected = names.iter().any(|n| {
            eff.values()
                .get(*n)
                .is_some_and(|v| !eff.patterns().matches(n, v))
        });
        if rejected {
            return Ok((names.into_iter().map(String::from).collect(), Vec::new()));
        }

        let open: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !eff.values().contains_key(*n))
            .collect();

        let found = expand(&eff, Stop::Args(&open))?;
        Ok((names.into_iter().map(String::from).collect(), found))
    }

    /// Projection of a completion onto `names`, reading bound values from
    /// this crumb.
    pub(crate) fn project(&self, found: &ValueTuple, names: &[String]) -> Option<ValueTuple> {
        let mut pairs = found.clone().into_inner();
        pairs.extend(
            self.values()
                .iter()
                .filter(|(n, _)| found.get(n).is_none())
                .map(|(n, v)| (n.clone(), v.clone())),
        );
        ValueTuple::new(pairs).project(names)
    }

    /// Distinct values of `arg` found on disk, sorted.
    ///
    /// `arg` may carry an inline pattern, `"img:anat*"`, used for this call
    /// only; on a bound `arg` it filters the bound value. Open arguments
    /// before `arg` are expanded along the way.
    pub fn ls(&self, arg: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .ls_values(&[arg])?
            .into_iter()
            .filter_map(|t| t.values().next().map(String::from))
            .collect())
    }

    /// Distinct value tuples of `args` found on disk, in the order given.
    /// With no `args`, every full completion of the open arguments.
    pub fn ls_values(&self, args: &[&str]) -> Result<Vec<ValueTuple>, Error> {
        let (names, found) = self.listing(args)?;
        let set: BTreeSet<ValueTuple> = found
            .iter()
            .filter_map(|f| self.project(f, &names))
            .collect();
        Ok(set.into_iter().collect())
    }

    /// One crumb per distinct completion of `arg`, arguments after it
    /// left open.
    pub fn ls_crumbs(&self, arg: &str) -> Result<Vec<Crumb>, Error> {
        let (_, found) = self.listing(&[arg])?;
        found.iter().map(|f| self.replace(f.iter())).collect()
    }

    /// As [`Crumb::ls_crumbs`], rendered to path strings.
    pub fn ls_paths(&self, arg: &str) -> Result<Vec<String>, Error> {
        Ok(self.ls_crumbs(arg)?.iter().map(Crumb::path).collect())
    }

    /// Every full completion of the open arguments, as value tuples over
    /// the open arguments in template order.
    pub fn unfold_values(&self) -> Result<Vec<ValueTuple>, Error> {
        expand(self, Stop::Leaves)
    }

    /// Every full completion, as fully bound crumbs.
    pub fn unfold(&self) -> Result<Vec<Crumb>, Error> {
        self.unfold_values()?
            .iter()
            .map(|t| self.replace(t.iter()))
            .collect()
    }

    /// Every full completion, rendered.
    pub fn unfold_paths(&self) -> Result<Vec<String>, Error> {
        Ok(self.unfold()?.iter().map(Crumb::path).collect())
    }

    /// Whether this crumb denotes anything on disk: the path itself when
    /// fully bound, otherwise at least one full completion.
    pub fn exists(&self) -> Result<bool, Error> {
        if !self.has_open_args() {
            return Ok(path_exists(Path::new(&self.path())));
        }
        let probe = self.clone().with_check_exists(true);
        Ok(!expand(&probe, Stop::Leaves)?.is_empty())
    }
}
