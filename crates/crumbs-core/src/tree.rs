use std::path::PathBuf;

use crate::{Crumb, Error, ValueTuple};

/// Create one directory tree per row of values.
///
/// Each row binds some arguments of `crumb`; every open argument in front
/// of the last one it binds must be bound too. Rows are all checked before
/// anything is created. With no rows the crumb itself is touched.
pub fn mktree(crumb: &Crumb, rows: &[ValueTuple]) -> Result<Vec<PathBuf>, Error> {
    if rows.is_empty() {
        return Ok(vec![crumb.touch()?]);
    }

    let open = crumb.open_args();
    let mut crumbs = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let given: Vec<&str> = row.names().collect();

        if let Some(last) = open.iter().rposition(|a| given.contains(a)) {
            if let Some(missing) = open[..last].iter().find(|a| !given.contains(*a)) {
                return Err(Error::OpenDependency {
                    row: idx,
                    missing: missing.to_string(),
                });
            }
        }

        crumbs.push(crumb.replace(row.iter())?);
    }

    crumbs.iter().map(Crumb::touch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vt(pairs: &[(&str, &str)]) -> ValueTuple {
        pairs.iter().copied().collect()
    }

    #[test]
    fn creates_one_dir_per_row() {
        let tmp = tempfile::tempdir().unwrap();
        let c = Crumb::new("{base}/{sid}/{ses}/{img}")
            .unwrap()
            .replace([("base", tmp.path().to_str().unwrap())])
            .unwrap();

        let rows = vec![
            vt(&[("sid", "s1"), ("ses", "v1")]),
            vt(&[("sid", "s2"), ("ses", "v1")]),
        ];
        let made = mktree(&c, &rows).unwrap();

        assert_eq!(made.len(), 2);
        assert!(tmp.path().join("s1/v1").is_dir());
        assert!(tmp.path().join("s2/v1").is_dir());
    }

    #[test]
    fn rejects_rows_leaving_dependencies_open() {
        let tmp = tempfile::tempdir().unwrap();
        let c = Crumb::new("{base}/{sid}/{ses}")
            .unwrap()
            .replace([("base", tmp.path().to_str().unwrap())])
            .unwrap();

        let rows = vec![vt(&[("sid", "s1")]), vt(&[("ses", "v1")])];
        match mktree(&c, &rows) {
            Err(Error::OpenDependency { row, missing }) => {
                assert_eq!(row, 1);
                assert_eq!(missing, "sid");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!tmp.path().join("s1").exists());
    }

    #[test]
    fn no_rows_touches_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let c = Crumb::new("{base}/raw/{sid}")
            .unwrap()
            .replace([("base", tmp.path().to_str().unwrap())])
            .unwrap();

        mktree(&c, &[]).unwrap();
        assert!(tmp.path().join("raw").is_dir());
    }
}
