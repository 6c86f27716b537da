//! Runs the `stanza` binary end to end.

use std::fs;
use std::process::Command;

fn stanza() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stanza"))
}

#[test]
fn render_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("list.tmpl");
    let rows = dir.path().join("rows.yaml");
    fs::write(
        &template,
        "<ul>\n<!-- BEGIN li -->  <li>{label}</li>\n<!-- END li --></ul>\n",
    )
    .unwrap();
    fs::write(&rows, "- label: one\n- label: two\n").unwrap();

    let output = stanza()
        .arg("render")
        .arg(&template)
        .arg("--rows")
        .arg(format!("li={}", rows.display()))
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>\n"
    );
}

#[test]
fn render_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("hello.tmpl");
    let vars = dir.path().join("vars.json");
    let out = dir.path().join("out.txt");
    fs::write(&template, "Hello, {name}!{unset}").unwrap();
    fs::write(&vars, r#"{"name": "World"}"#).unwrap();

    let status = stanza()
        .arg("render")
        .arg(&template)
        .arg("--vars")
        .arg(&vars)
        .arg("--strip")
        .arg("--output")
        .arg(&out)
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(fs::read_to_string(out).unwrap(), "Hello, World!");
}

#[test]
fn blocks_reports_invalid_nesting() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("bad.tmpl");
    fs::write(&template, "<!-- BEGIN rows -->x<!-- END row -->").unwrap();

    let output = stanza().arg("blocks").arg(&template).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalidly nested block rows"), "{stderr}");
    assert!(stderr.contains("rows"), "{stderr}");
}

#[test]
fn vars_lists_counts() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.tmpl");
    fs::write(&template, "{a}{b}{a}{9z}").unwrap();

    let output = stanza().arg("vars").arg(&template).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a\t2\nb\t1\n");
}

#[test]
fn missing_template_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = stanza()
        .arg("render")
        .arg(dir.path().join("nope.tmpl"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}
