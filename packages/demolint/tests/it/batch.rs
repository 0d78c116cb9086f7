//! Validating directories and lists of demo files.

use std::fs;
use std::path::{Path, PathBuf};

use demolint::{Check, Settings, validate_dir, validate_paths};
use pretty_assertions::assert_eq as pretty_assert_eq;
use simple_test_case::test_case;

use crate::{demo_with_actions, fixture};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(&path, content).expect("write demo");
    path
}

#[test]
fn test_every_document_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.txt", &demo_with_actions(&["DONE()"]));
    write(dir.path(), "bad.txt", &demo_with_actions(&["NOPE()", "DONE()"]));
    write(dir.path(), "empty.txt", "");

    let report = validate_dir(dir.path(), &Settings::default()).unwrap();
    let ids = report.documents().keys().cloned().collect::<Vec<_>>();
    pretty_assert_eq!(ids, vec!["bad", "empty", "good"]);
    pretty_assert_eq!(report.total(), 3);
    pretty_assert_eq!(report.passed(), 1);
    pretty_assert_eq!(report.failed(), 2);
    assert!(!report.is_valid());

    assert!(report.get("good").unwrap().report.is_valid);
    assert!(report.get("bad").unwrap().report.has(Check::UnknownAction));
    assert!(report.get("empty").unwrap().report.has(Check::MissingSection));
}

#[test]
fn test_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let report = validate_dir(dir.path(), &Settings::default()).unwrap();
    pretty_assert_eq!(report.total(), 0);
    assert!(report.is_valid());
}

#[test_case("*.txt", &["a"]; "default pattern")]
#[test_case("*.demo", &["b"]; "custom pattern")]
#[test_case("*", &["a", "b", "c"]; "everything")]
#[test]
fn test_pattern_filters_files(pattern: &str, expected: &[&str]) {
    let dir = tempfile::tempdir().unwrap();
    let demo = demo_with_actions(&["DONE()"]);
    write(dir.path(), "a.txt", &demo);
    write(dir.path(), "b.demo", &demo);
    write(dir.path(), "c.md", &demo);

    let settings = Settings {
        pattern: pattern.to_string(),
        ..Settings::default()
    };
    let report = validate_dir(dir.path(), &settings).unwrap();
    let ids = report.documents().keys().map(String::as_str).collect::<Vec<_>>();
    pretty_assert_eq!(ids, expected);
}

#[test]
fn test_subdirectories_need_recursive() {
    let dir = tempfile::tempdir().unwrap();
    let demo = demo_with_actions(&["DONE()"]);
    write(dir.path(), "top.txt", &demo);
    write(dir.path(), "office/calc.txt", &demo);

    let flat = validate_dir(dir.path(), &Settings::default()).unwrap();
    let ids = flat.documents().keys().map(String::as_str).collect::<Vec<_>>();
    pretty_assert_eq!(ids, vec!["top"]);

    let settings = Settings {
        recursive: true,
        ..Settings::default()
    };
    let nested = validate_dir(dir.path(), &settings).unwrap();
    let ids = nested.documents().keys().map(String::as_str).collect::<Vec<_>>();
    pretty_assert_eq!(ids, vec!["office/calc", "top"]);
}

#[test]
fn test_invalid_pattern_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        pattern: "[".to_string(),
        ..Settings::default()
    };
    let error = validate_dir(dir.path(), &settings).unwrap_err();
    assert!(format!("{error:?}").contains("invalid glob pattern"));
}

#[test]
fn test_missing_path_is_unreadable() {
    let paths = vec![
        PathBuf::from(fixture("valid.txt")),
        PathBuf::from("does/not/exist.txt"),
    ];
    let report = validate_paths(&paths, &Settings::default()).unwrap();
    pretty_assert_eq!(report.total(), 2);
    pretty_assert_eq!(report.passed(), 1);

    let missing = report.get("exist").unwrap();
    assert!(missing.source.is_none());
    assert!(missing.report.has(Check::Unreadable));
}

#[test]
fn test_colliding_ids_keep_both_documents() {
    let dir = tempfile::tempdir().unwrap();
    let demo = demo_with_actions(&["DONE()"]);
    let first = write(dir.path(), "one/notepad.txt", &demo);
    let second = write(dir.path(), "two/notepad.txt", &demo);

    let report = validate_paths(&[first, second], &Settings::default()).unwrap();
    pretty_assert_eq!(report.total(), 2);
    assert!(report.get("notepad").is_some());
}

#[test]
fn test_repeated_directory_keeps_every_document() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", &demo_with_actions(&["DONE()"]));

    let paths = vec![dir.path().to_path_buf(); 3];
    let report = validate_paths(&paths, &Settings::default()).unwrap();
    pretty_assert_eq!(report.total(), 3);
    pretty_assert_eq!(report.passed(), 3);
    assert!(report.get("a").is_some());
}

#[test]
fn test_max_wait_setting_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "slow.txt", &demo_with_actions(&["WAIT(10)", "DONE()"]));

    let settings = Settings {
        max_wait_seconds: 5.0,
        ..Settings::default()
    };
    let report = validate_dir(dir.path(), &settings).unwrap();
    let slow = report.get("slow").unwrap();
    assert!(slow.report.is_valid);
    assert!(slow.report.has(Check::LongWait));
}

#[test]
fn test_json_report_shape() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.txt", &demo_with_actions(&["DONE()"]));
    write(dir.path(), "bad.txt", &demo_with_actions(&["WAIT(1)"]));

    let report = validate_dir(dir.path(), &Settings::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    pretty_assert_eq!(json["passed"], 1);
    pretty_assert_eq!(json["failed"], 1);
    pretty_assert_eq!(json["documents"]["good"]["is_valid"], true);
    pretty_assert_eq!(json["documents"]["bad"]["is_valid"], false);
    pretty_assert_eq!(
        json["documents"]["bad"]["errors"][0]["message"],
        "demo must end with DONE()"
    );
}
