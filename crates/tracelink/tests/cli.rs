//! End-to-end runs of the tracelink binary on throwaway projects

use std::path::Path;
use std::process::{Command, Output};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, content).expect("write file");
}

fn tracelink(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tracelink"))
        .args(args)
        .current_dir(root)
        .env_remove("TRACELINK_LOG")
        .output()
        .expect("run tracelink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A project with its own config so the root does not depend on the caller
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), ".config/tracelink/config.yaml", "exclude:\n  - out/**\n");
    dir
}

const REQUIREMENTS: &str = "\
# Requirements

## Login
`req~login~1`

Users log in with a password.

Needs: dsn
";

const DESIGN: &str = "\
# Design

## Password check
`dsn~password-check~1`

Covers:
* `req~login~1`

Needs: impl
";

#[test]
fn clean_trace_exits_ok() {
    let dir = project();
    write(dir.path(), "doc/requirements.md", REQUIREMENTS);
    write(dir.path(), "doc/design.md", DESIGN);
    write(dir.path(), "src/login.rs", "// [impl->dsn~password-check~1]\nfn login() {}\n");

    let output = tracelink(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "ok - 3 total\n");
}

#[test]
fn defects_exit_with_failure() {
    let dir = project();
    write(dir.path(), "doc/requirements.md", REQUIREMENTS);
    write(dir.path(), "doc/design.md", DESIGN);

    let output = tracelink(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "not ok - 0/0>0>0/1 - dsn~password-check~1 (-impl)\n\
         |\n\
         |--> ( ) req~login~1\n\
         |\n\
         \n\
         not ok - 2 total, 1 defect\n"
    );
}

#[test]
fn paths_on_the_command_line_limit_the_import() {
    let dir = project();
    write(dir.path(), "doc/requirements.md", REQUIREMENTS);
    write(dir.path(), "other/design.md", DESIGN);

    let output = tracelink(dir.path(), &["-v", "failures", "doc"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "req~login~1\n");
}

#[test]
fn excluded_paths_are_skipped() {
    let dir = project();
    write(dir.path(), "doc/requirements.md", REQUIREMENTS);
    write(dir.path(), "doc/design.md", DESIGN);
    write(dir.path(), "src/login.rs", "// [impl->dsn~password-check~1]\n");
    write(dir.path(), "out/generated.rs", "// [impl->dsn~password-check~1]\n");

    let output = tracelink(dir.path(), &["-v", "summary"]);
    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
    assert_eq!(stdout(&output), "ok - 3 total\n");
}

#[test]
fn artifact_type_filter_drops_needs() {
    let dir = project();
    write(dir.path(), "doc/requirements.md", REQUIREMENTS);
    write(dir.path(), "doc/design.md", DESIGN);

    let output = tracelink(dir.path(), &["-a", "req,dsn", "-v", "summary"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "ok - 2 total\n");
}

#[test]
fn config_sets_report_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        ".config/tracelink/config.yaml",
        "inputs:\n  - doc\nreport:\n  verbosity: minimal\n",
    );
    write(dir.path(), "doc/requirements.md", REQUIREMENTS);

    let output = tracelink(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "not ok\n");

    // flags win over config
    let output = tracelink(dir.path(), &["-v", "quiet"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
}

#[test]
fn json_report_is_written_to_file() {
    let dir = project();
    write(dir.path(), "doc/requirements.md", REQUIREMENTS);
    let report = dir.path().join("report.json");

    let output = tracelink(
        dir.path(),
        &["-f", "json", "-o", report.to_str().expect("utf-8 path")],
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");

    let json = std::fs::read_to_string(&report).expect("report written");
    assert!(json.contains("req~login~1"));
    assert!(json.contains("uncovered_artifact_types"));
}

#[test]
fn malformed_identifier_is_a_cli_error() {
    let dir = project();
    write(dir.path(), "doc/requirements.md", "# Broken\n\nreq~login~-1\n");

    let output = tracelink(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("doc/requirements.md:3"));
    assert_eq!(stdout(&output), "");
}

#[test]
fn tildes_in_prose_do_not_break_the_run() {
    let dir = project();
    write(dir.path(), "README.md", "# Notes\n\n~deprecated~\n\nSee ~/a~b for details.\n");
    write(dir.path(), "src/map.rs", "// map[k->a~b~c]\n");

    let output = tracelink(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "ok - 0 total\n");
}

#[test]
fn specobject_documents_are_traced_and_exported() {
    let dir = project();
    write(
        dir.path(),
        "doc/requirements.xml",
        "<specdocument>\n  <specobjects doctype=\"req\">\n    <specobject>\n      <id>export</id>\n      <version>1</version>\n      <needscoverage><needsobj>impl</needsobj></needscoverage>\n    </specobject>\n  </specobjects>\n</specdocument>\n",
    );
    write(dir.path(), "pom.xml", "<project><version>1.0</version></project>\n");
    write(dir.path(), "src/export.rs", "// [impl->req~export~1]\n");

    let output = tracelink(dir.path(), &["-v", "summary"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "ok - 2 total\n");

    let output = tracelink(dir.path(), &["-f", "specobject"]);
    assert_eq!(output.status.code(), Some(0));
    let xml = stdout(&output);
    assert!(xml.contains("<specobjects doctype=\"impl\">"));
    assert!(xml.contains("<specobjects doctype=\"req\">"));
    assert!(xml.contains("<linksto>req:export</linksto>"));
}

#[test]
fn unknown_report_format_is_a_cli_error() {
    let dir = project();
    let output = tracelink(dir.path(), &["-f", "pdf"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown report format 'pdf'"));
}

#[test]
fn broken_config_is_a_cli_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), ".config/tracelink/config.yaml", "inputs: [unclosed\n");

    let output = tracelink(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_input_path_is_a_cli_error() {
    let dir = project();
    let output = tracelink(dir.path(), &["does-not-exist"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn empty_project_is_ok() {
    let dir = project();
    let output = tracelink(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "ok - 0 total\n");
}
