//! Section presence, order, and content checks.

use demolint::{Check, Section, validate};
use indoc::indoc;
use pretty_assertions::assert_eq as pretty_assert_eq;
use simple_test_case::test_case;

use crate::{demo_with_actions, fixture};

#[test]
fn test_valid_demo_has_no_diagnostics() {
    let report = validate(&demo_with_actions(&["CLICK(x=0.5, y=0.5)", "DONE()"]));
    assert!(report.is_valid);
    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
}

#[test]
fn test_bundled_demos_are_valid() {
    for name in [
        "notepad_hello.txt",
        "calc_copy_column.txt",
        "explorer_drag_file.txt",
    ] {
        let path = format!("{}/demos/{name}", env!("CARGO_MANIFEST_DIR"));
        let content = std::fs::read_to_string(&path).expect("read bundled demo");
        let report = validate(&content);
        assert!(report.is_valid, "{name}: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "{name}: {:?}", report.warnings);
    }
}

#[test_case(Section::Task; "task")]
#[test_case(Section::Domain; "domain")]
#[test_case(Section::Steps; "steps")]
#[test]
fn test_missing_required_section(missing: Section) {
    let full = demo_with_actions(&["DONE()"]);
    let document = full
        .lines()
        .filter(|line| !line.starts_with(missing.marker()))
        .collect::<Vec<_>>()
        .join("\n");

    let report = validate(&document);
    assert!(!report.is_valid);

    let marker_errors = report
        .errors
        .iter()
        .filter(|e| e.check == Check::MissingSection)
        .map(|e| e.message.clone())
        .collect::<Vec<_>>();
    pretty_assert_eq!(
        marker_errors,
        vec![format!("missing required section {}", missing.marker())]
    );
}

#[test]
fn test_all_required_sections_missing() {
    let report = validate("ACTION: DONE()\n");
    for section in Section::REQUIRED {
        assert!(
            report
                .errors
                .iter()
                .any(|e| e.check == Check::MissingSection && e.message.contains(section.marker())),
            "no error for {}: {:?}",
            section.marker(),
            report.errors
        );
    }
}

#[test]
fn test_missing_expected_outcome_is_warning() {
    let report = validate(indoc! {"
        TASK: t
        DOMAIN: d
        STEPS:
        1. Finish
           ACTION: DONE()
    "});
    assert!(report.is_valid);
    pretty_assert_eq!(
        report.warning_messages(),
        vec!["missing optional section EXPECTED_OUTCOME:".to_string()]
    );
}

#[test]
fn test_duplicate_section_is_warning() {
    let report = validate(indoc! {"
        TASK: t
        DOMAIN: d
        DOMAIN: again
        STEPS:
        ACTION: DONE()
        EXPECTED_OUTCOME: x
    "});
    assert!(report.is_valid);
    assert!(report.has(Check::DuplicateSection));
    pretty_assert_eq!(report.warnings[0].line, Some(3));
}

#[test]
fn test_out_of_order_sections_warn() {
    let report = validate(indoc! {"
        DOMAIN: d
        TASK: t
        STEPS:
        ACTION: DONE()
        EXPECTED_OUTCOME: x
    "});
    assert!(report.is_valid);
    let order = report
        .warnings
        .iter()
        .find(|w| w.check == Check::SectionOrder)
        .expect("section order warning");
    pretty_assert_eq!(order.line, Some(2));
    assert!(order.message.contains("found DOMAIN:, TASK:, STEPS:, EXPECTED_OUTCOME:"));
}

#[test]
fn test_empty_task_is_warning() {
    let report = validate(indoc! {"
        TASK:
        DOMAIN: d
        STEPS:
        ACTION: DONE()
        EXPECTED_OUTCOME: x
    "});
    assert!(report.is_valid);
    pretty_assert_eq!(
        report.warning_messages(),
        vec!["line 1: section TASK: is empty".to_string()]
    );
}

#[test]
fn test_invalid_fixture_reports_everything() {
    let content = std::fs::read_to_string(fixture("invalid.txt")).expect("read fixture");
    let report = validate(&content);
    assert!(!report.is_valid);

    for check in [
        Check::MissingSection,
        Check::StepSequence,
        Check::UnknownAction,
        Check::MalformedAction,
        Check::MissingDone,
    ] {
        assert!(report.has(check), "expected {check}: {:?}", report.errors);
    }
}
