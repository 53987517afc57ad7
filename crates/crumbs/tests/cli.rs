use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn create_dir(path: &Path) {
    fs::create_dir_all(path).unwrap();
    assert!(path.is_dir());
}

fn crumb(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crumb"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

fn tree(root: &Path) {
    for sid in ["s1", "s2", ".cache"] {
        create_dir(&root.join("raw").join(sid).join("anat"));
    }
    create_dir(&root.join("proc/s1/anat"));
}

#[test]
fn ls_values_skip_hidden_entries() {
    let tmp = tempfile::tempdir().unwrap();
    tree(tmp.path());
    let template = format!("{}/raw/{{sid}}/{{kind}}", tmp.path().display());

    let out = crumb(&["ls", &template, "-a", "sid"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "s1\ns2\n");

    let out = crumb(&["--all", "ls", &template, "-a", "sid"]);
    assert_eq!(stdout(&out), ".cache\ns1\ns2\n");
}

#[test]
fn ls_empty_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    let template = format!("{}/missing/{{sid}}", tmp.path().display());

    let out = crumb(&["ls", &template, "-a", "sid"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
}

#[test]
fn errors_exit_two() {
    let out = crumb(&["ls", "/data/{sid", "-a", "sid"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(!out.stderr.is_empty());

    let out = crumb(&["ls", "/data/{sid}", "-a", "nope"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn intersect_prints_rows_or_paths() {
    let tmp = tempfile::tempdir().unwrap();
    tree(tmp.path());
    let raw = format!("{}/raw/{{sid}}/{{kind}}", tmp.path().display());
    let proc = format!("{}/proc/{{sid}}/{{kind}}", tmp.path().display());

    let out = crumb(&["intersect", &raw, &proc, "-o", "sid"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "s1\n");

    let out = crumb(&["intersect", &raw, &proc, "-o", "sid", "-b", "2"]);
    assert_eq!(
        stdout(&out),
        format!("{}/proc/s1/{{kind}}\n", tmp.path().display())
    );

    let out = crumb(&["diff", &raw, &proc, "-o", "sid"]);
    assert_eq!(stdout(&out), "s2\n");
}

#[test]
fn json_output() {
    let tmp = tempfile::tempdir().unwrap();
    tree(tmp.path());
    let template = format!("{}/raw/{{sid}}/{{kind}}", tmp.path().display());

    let out = crumb(&["--format", "json", "ls", &template, "-a", "sid"]);
    let text = stdout(&out);
    assert!(text.contains("\"kind\": \"values\""));
    assert!(text.contains("\"count\": 2"));
}

#[test]
fn mktree_creates_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let template = format!("{}/{{sid}}/{{ses}}", tmp.path().display());

    let out = crumb(&["-q", "mktree", &template, "-r", "sid=s1,ses=v1", "-r", "sid=s2,ses=v1"]);
    assert!(out.status.success());
    assert!(stdout(&out).is_empty());
    assert!(tmp.path().join("s1/v1").is_dir());
    assert!(tmp.path().join("s2/v1").is_dir());
}
