//! DONE()/FAIL() placement.

use demolint::{Check, validate};
use pretty_assertions::assert_eq as pretty_assert_eq;

use crate::demo_with_actions;

#[test]
fn test_missing_done_is_error() {
    let report = validate(&demo_with_actions(&["CLICK(x=0.1, y=0.1)", "WAIT(1)"]));
    assert!(!report.is_valid);
    pretty_assert_eq!(report.error_messages(), vec!["demo must end with DONE()".to_string()]);
    pretty_assert_eq!(report.errors[0].check, Check::MissingDone);
}

#[test]
fn test_done_not_last_is_only_warning() {
    let report = validate(&demo_with_actions(&["DONE()", "CLICK(x=0.1, y=0.1)"]));
    assert!(report.is_valid, "{:?}", report.errors);
    assert!(!report.has(Check::MissingDone));
    pretty_assert_eq!(
        report.warning_messages(),
        vec!["line 6: DONE() is not the last action".to_string()]
    );
}

#[test]
fn test_early_done_before_final_done_warns() {
    let report = validate(&demo_with_actions(&["DONE()", "WAIT(1)", "DONE()"]));
    assert!(report.is_valid);
    pretty_assert_eq!(
        report.warning_messages(),
        vec!["line 6: DONE() appears before the final action".to_string()]
    );
}

#[test]
fn test_ending_with_fail_without_done_is_error() {
    let report = validate(&demo_with_actions(&["CLICK(x=0.1, y=0.1)", "FAIL()"]));
    assert!(!report.is_valid);
    assert!(report.has(Check::MissingDone));
    assert!(!report.has(Check::FailNotLast));
}

#[test]
fn test_fail_before_end_warns() {
    let report = validate(&demo_with_actions(&["FAIL()", "DONE()"]));
    assert!(report.is_valid);
    assert!(report.has(Check::FailNotLast));
}

#[test]
fn test_malformed_done_does_not_count() {
    let report = validate(&demo_with_actions(&["DONE(now)"]));
    assert!(report.has(Check::MalformedAction));
    assert!(report.has(Check::MissingDone));
}
