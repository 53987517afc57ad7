//! Operations across crumbs: joins on shared arguments and rebuilding paths
//! from their results.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Crumb, Error, ValueTuple};

/// Names to join on: `on` itself, checked against every crumb, or when
/// empty the arguments all crumbs share, in the first crumb's order.
fn join_names(crumbs: &[&Crumb], on: &[&str]) -> Result<Vec<String>, Error> {
    if on.is_empty() {
        let first = crumbs.first().ok_or(Error::NoCommonArguments)?;
        let common: Vec<String> = first
            .all_args()
            .into_iter()
            .filter(|a| crumbs.iter().all(|c| c.contains(a)))
            .map(String::from)
            .collect();
        if common.is_empty() {
            return Err(Error::NoCommonArguments);
        }
        return Ok(common);
    }

    for c in crumbs {
        for name in on {
            c.check_arg(name)?;
        }
    }
    Ok(on.iter().map(|s| s.to_string()).collect())
}

fn projected(crumb: &Crumb, names: &[String]) -> Result<BTreeSet<ValueTuple>, Error> {
    Ok(crumb
        .unfold_values()?
        .iter()
        .filter_map(|t| crumb.project(t, names))
        .collect())
}

/// Distinct tuples over `names` from the full expansion of `crumb`, bound
/// values included.
pub fn joint_values(crumb: &Crumb, names: &[&str]) -> Result<Vec<ValueTuple>, Error> {
    let names = join_names(&[crumb], names)?;
    Ok(projected(crumb, &names)?.into_iter().collect())
}

/// Value tuples over `on` present in the full expansion of every crumb,
/// sorted.
///
/// With an empty `on`, joins on every argument the crumbs have in common.
pub fn intersection(crumbs: &[&Crumb], on: &[&str]) -> Result<Vec<ValueTuple>, Error> {
    let names = join_names(crumbs, on)?;

    let mut acc: Option<BTreeSet<ValueTuple>> = None;
    for c in crumbs {
        let set = projected(c, &names)?;
        acc = Some(match acc {
            Some(prev) => prev.intersection(&set).cloned().collect(),
            None => set,
        });
    }

    tracing::debug!(on = ?names, crumbs = crumbs.len(), "intersection");
    Ok(acc.unwrap_or_default().into_iter().collect())
}

/// Value tuples over `on` found under `a` but not under `b`, sorted.
pub fn difference(a: &Crumb, b: &Crumb, on: &[&str]) -> Result<Vec<ValueTuple>, Error> {
    let names = join_names(&[a, b], on)?;
    let left = projected(a, &names)?;
    let right = projected(b, &names)?;

    tracing::debug!(on = ?names, "difference");
    Ok(left.difference(&right).cloned().collect())
}

/// `crumb` with each tuple bound, in input order.
pub fn build_crumbs<'a>(
    crumb: &'a Crumb,
    tuples: &'a [ValueTuple],
) -> impl Iterator<Item = Result<Crumb, Error>> + 'a {
    tuples.iter().map(move |t| crumb.replace(t.iter()))
}

/// As [`build_crumbs`], rendered to path strings.
pub fn build_paths<'a>(
    crumb: &'a Crumb,
    tuples: &'a [ValueTuple],
) -> impl Iterator<Item = Result<String, Error>> + 'a {
    build_crumbs(crumb, tuples).map(|r| r.map(|c| c.path()))
}

/// List `arg` once per `(group, pattern)` and collect the crumbs each
/// pattern selects. Groups that match nothing are left out.
pub fn groupby_pattern(
    crumb: &Crumb,
    arg: &str,
    groups: &[(&str, &str)],
) -> Result<BTreeMap<String, Vec<Crumb>>, Error> {
    crumb.check_arg(arg)?;

    let mut out = BTreeMap::new();
    for (group, pattern) in groups {
        let matched = crumb.ls_crumbs(&format!("{arg}:{pattern}"))?;
        if !matched.is_empty() {
            out.insert(group.to_string(), matched);
        }
    }
    Ok(out)
}

/// Column view of `tuples`: every name mapped to its values, row order
/// kept.
pub fn to_columns(tuples: &[ValueTuple]) -> BTreeMap<String, Vec<String>> {
    let mut cols: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for t in tuples {
        for (name, value) in t.iter() {
            cols.entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }
    }
    cols
}
