use std::io::Write;
use std::process::Command;

use kvscan::{load_config, ConfigError, Limits, OptionTable, ScanErrorKind};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

const MYSQL_CONF: &str = "\
# mysql connection
mysql_host = db.internal       # primary
mysql_user=app
mysql_password='p@ss word # not a comment'
mysql_database=\"orders\"
mysql_port=
";

fn write_conf(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[test]
fn loads_every_value_flavor_from_disk() {
    let file = write_conf(MYSQL_CONF);
    let config = load_config(file.path(), &Limits::default()).expect("valid config");

    assert_eq!(config.len(), 4);
    assert_eq!(config["mysql_host"], "db.internal");
    assert_eq!(config["mysql_user"], "app");
    assert_eq!(config["mysql_password"], "p@ss word # not a comment");
    assert_eq!(config["mysql_database"], "orders");
    // `mysql_port=` is followed only by a newline, so no value is ever closed
    assert!(!config.contains_key("mysql_port"));
}

#[test]
fn missing_file_is_source_unavailable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.conf");
    let err = load_config(&path, &Limits::default()).expect_err("no such file");
    match err {
        ConfigError::SourceUnavailable { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn syntax_error_rejects_whole_file_and_names_it() {
    let file = write_conf("good=1\nalso=2\nbad name\n");
    let err = load_config(file.path(), &Limits::default()).expect_err("missing '='");
    assert_eq!(err.scan_kind(), Some(ScanErrorKind::MissingEquals));
    let message = err.to_string();
    assert!(message.contains(&file.path().display().to_string()));
    assert!(message.contains("line 3"));
    assert!(message.contains("'n'"));
}

#[test]
fn unknown_names_are_caught_after_scanning() {
    let file = write_conf(MYSQL_CONF);
    let config = load_config(file.path(), &Limits::default()).expect("valid config");
    let table = OptionTable::new()
        .declare("mysql_host", "localhost")
        .declare("mysql_user", "root")
        .declare_optional("mysql_password");
    assert!(matches!(
        table.resolve(&config),
        Err(ConfigError::UnknownOption { name }) if name == "mysql_database"
    ));
}

#[test]
fn reloading_the_same_file_is_stable() {
    let file = write_conf(MYSQL_CONF);
    let first = load_config(file.path(), &Limits::default()).expect("valid");
    let second = load_config(file.path(), &Limits::default()).expect("valid");
    assert_eq!(first, second);
}

// ─── Binary ────────────────────────────────────────────────────

fn kvscan() -> Command {
    Command::new(env!("CARGO_BIN_EXE_kvscan"))
}

#[test]
fn cli_prints_sorted_params() {
    let file = write_conf("b=2\na='one two'\n");
    let output = kvscan().arg(file.path()).output().expect("run kvscan");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "param=a value=one two\nparam=b value=2\n"
    );
}

#[test]
fn cli_ordered_keeps_duplicates() {
    let file = write_conf("k=1\nj=2\nk=3\n");
    let output = kvscan()
        .arg(file.path())
        .arg("--ordered")
        .output()
        .expect("run kvscan");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "param=k value=1\nparam=j value=2\nparam=k value=3\n"
    );
}

#[test]
fn cli_fails_on_syntax_error() {
    let file = write_conf("x=1 y\n");
    let output = kvscan().arg(file.path()).output().expect("run kvscan");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1"));
    assert!(stderr.contains("'y'"));
}

#[test]
fn cli_reports_each_error_once() {
    let file = write_conf("x=1 y\n");
    let output = kvscan().arg(file.path()).output().expect("run kvscan");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("unexpected char after value").count(), 1);

    let output = kvscan()
        .arg("/nonexistent/kvscan/once.conf")
        .output()
        .expect("run kvscan");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("once.conf").count(), 1);
}

#[test]
fn cli_accepts_latin1_values() {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(b"password='p\xe4ss'\nhost=db\n")
        .expect("write temp file");
    file.flush().expect("flush temp file");
    let output = kvscan().arg(file.path()).output().expect("run kvscan");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "param=host value=db\nparam=password value=p\u{e4}ss\n"
    );
}

#[test]
fn cli_fails_on_unknown_param() {
    let file = write_conf("host=a\nport=1\n");
    let output = kvscan()
        .arg(file.path())
        .args(["--known", "host"])
        .output()
        .expect("run kvscan");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Unknown parameter").count(), 1);
    assert!(stderr.contains("Unknown parameter \"port\""));
}

#[test]
fn cli_respects_limits() {
    let file = write_conf("toolong=1\n");
    let output = kvscan()
        .arg(file.path())
        .args(["--max-name-length", "3"])
        .output()
        .expect("run kvscan");
    assert!(!output.status.success());
}

#[test]
fn cli_fails_on_missing_file() {
    let output = kvscan()
        .arg("/nonexistent/kvscan/test.conf")
        .output()
        .expect("run kvscan");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("/nonexistent/kvscan/test.conf"));
}
