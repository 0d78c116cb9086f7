//! Action grammar coverage through the public API.

use demolint::{Action, ActionError, ActionKind, Demo};
use pretty_assertions::assert_eq as pretty_assert_eq;

#[test]
fn test_every_keyword_has_a_parseable_example() {
    let examples = [
        "CLICK(x=0.5, y=0.5)",
        "RIGHT_CLICK(x=0.5, y=0.5)",
        "DOUBLE_CLICK(x=0.5, y=0.5)",
        "TRIPLE_CLICK(x=0.5, y=0.5)",
        r#"TYPE("text")"#,
        r#"HOTKEY("ctrl+s")"#,
        "WAIT(2)",
        "DRAG(start_x=0.1, start_y=0.2, end_x=0.3, end_y=0.4)",
        "HOVER(x=0.5, y=0.5)",
        r#"SCROLL(direction="left")"#,
        "DONE()",
        "FAIL()",
    ];

    let kinds = examples
        .iter()
        .map(|text| Action::parse(text).map(|action| action.kind()))
        .collect::<Result<Vec<_>, _>>()
        .expect("all examples parse");
    pretty_assert_eq!(kinds, ActionKind::ALL.to_vec());
}

#[test]
fn test_keywords_are_case_sensitive() {
    pretty_assert_eq!(
        Action::parse("click(x=0.5, y=0.5)"),
        Err(ActionError::UnknownKeyword("click".to_string()))
    );
}

#[test]
fn test_parsed_demo_serializes_actions() {
    let demo = Demo::parse("STEPS:\n1. go\n   ACTION: CLICK(x=0.5, y=0.25)\n2. bad\n   ACTION: NOPE()\n");
    let json = serde_json::to_value(&demo).expect("serialize demo");

    let first = &json["steps"][0]["actions"][0]["parsed"];
    pretty_assert_eq!(first["action"], "CLICK");
    pretty_assert_eq!(first["x"], 0.5);
    pretty_assert_eq!(first["y"], 0.25);

    let second = &json["steps"][1]["actions"][0]["parsed"];
    pretty_assert_eq!(second["error"], r#"unknown action type "NOPE""#);
}
