use std::fs;
use std::path::Path;

use crumbs_core::{groupby_pattern, mktree, to_columns, Crumb, ValueTuple};
use pretty_assertions::assert_eq;

fn create_dir(path: &Path) {
    fs::create_dir_all(path).unwrap();
    assert!(path.is_dir());
}

fn vt(pairs: &[(&str, &str)]) -> ValueTuple {
    pairs.iter().copied().collect()
}

fn base(template: &str, root: &Path) -> Crumb {
    Crumb::new(template)
        .unwrap()
        .replace([("base", root.to_str().unwrap())])
        .unwrap()
}

#[test]
fn golden_groupby_pattern() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    for kind in ["anat_1", "anat_2", "rest", "dwi"] {
        create_dir(&root.join("s1").join(kind));
    }

    let c = base("{base}/{sid}/{kind}", root);
    let groups = groupby_pattern(
        &c,
        "kind",
        &[("anatomy", "anat*"), ("resting", "rest*"), ("pet", "pet*")],
    )
    .unwrap();

    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["anatomy", "resting"]);
    let anat: Vec<Option<&str>> = groups["anatomy"]
        .iter()
        .map(|c| c.get("kind").unwrap())
        .collect();
    assert_eq!(anat, vec![Some("anat_1"), Some("anat_2")]);
    assert_eq!(groups["resting"].len(), 1);
}

#[test]
fn golden_mktree_then_list() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let c = base("{base}/raw/{subject}/{session}", root);

    let rows = vec![
        vt(&[("subject", "s1"), ("session", "v1")]),
        vt(&[("subject", "s1"), ("session", "v2")]),
        vt(&[("subject", "s2"), ("session", "v1")]),
    ];
    mktree(&c, &rows).unwrap();

    let found = c.unfold_values().unwrap();
    assert_eq!(found, rows);

    let cols = to_columns(&found);
    assert_eq!(cols["subject"], vec!["s1", "s1", "s2"]);
    assert_eq!(cols["session"], vec!["v1", "v2", "v1"]);
}
