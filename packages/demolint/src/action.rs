//! The demo action grammar.
//!
//! Every step in a demo carries exactly one action, written as a call-like
//! expression such as `CLICK(x=0.5, y=0.5)` or `TYPE("hello")`. The set of
//! keywords is closed and each keyword has a fixed argument shape.
//!
//! Parsing never panics on user input: anything that doesn't fit the grammar
//! comes back as an [`ActionError`] so callers can collect it as a diagnostic.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use derive_more::Display;
use itertools::Itertools;
use regex::Regex;
use serde::Serialize;

/// A decimal number, optionally negative. Negative values are accepted by the
/// grammar so that range checks can report them instead of syntax checks.
const NUM: &str = r"-?(?:\d+(?:\.\d*)?|\.\d+)";

static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid regex"));

static POINT_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\(\s*x\s*=\s*({NUM})\s*,\s*y\s*=\s*({NUM})\s*\)$"
    ))
    .expect("valid regex")
});

static TEXT_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\(\s*"((?:[^"\\]|\\.)*)"\s*\)$"#).expect("valid regex")
});

static WAIT_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\(\s*({NUM})\s*\)$")).expect("valid regex")
});

static DRAG_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\(\s*start_x\s*=\s*({NUM})\s*,\s*start_y\s*=\s*({NUM})\s*,\s*end_x\s*=\s*({NUM})\s*,\s*end_y\s*=\s*({NUM})\s*\)$"
    ))
    .expect("valid regex")
});

static SCROLL_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\(\s*direction\s*=\s*"(up|down|left|right)"\s*\)$"#).expect("valid regex")
});

static NO_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*\)$").expect("valid regex"));

/// The keyword of an action, without its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Click,
    RightClick,
    DoubleClick,
    TripleClick,
    Type,
    Hotkey,
    Wait,
    Drag,
    Hover,
    Scroll,
    Done,
    Fail,
}

impl ActionKind {
    /// Every keyword in the grammar, in documentation order.
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Click,
        ActionKind::RightClick,
        ActionKind::DoubleClick,
        ActionKind::TripleClick,
        ActionKind::Type,
        ActionKind::Hotkey,
        ActionKind::Wait,
        ActionKind::Drag,
        ActionKind::Hover,
        ActionKind::Scroll,
        ActionKind::Done,
        ActionKind::Fail,
    ];

    /// The keyword as written in demo files.
    pub fn keyword(self) -> &'static str {
        match self {
            ActionKind::Click => "CLICK",
            ActionKind::RightClick => "RIGHT_CLICK",
            ActionKind::DoubleClick => "DOUBLE_CLICK",
            ActionKind::TripleClick => "TRIPLE_CLICK",
            ActionKind::Type => "TYPE",
            ActionKind::Hotkey => "HOTKEY",
            ActionKind::Wait => "WAIT",
            ActionKind::Drag => "DRAG",
            ActionKind::Hover => "HOVER",
            ActionKind::Scroll => "SCROLL",
            ActionKind::Done => "DONE",
            ActionKind::Fail => "FAIL",
        }
    }

    /// The expected argument shape, used in diagnostics and the grammar reference.
    pub fn signature(self) -> &'static str {
        match self {
            ActionKind::Click => "CLICK(x=<num>, y=<num>)",
            ActionKind::RightClick => "RIGHT_CLICK(x=<num>, y=<num>)",
            ActionKind::DoubleClick => "DOUBLE_CLICK(x=<num>, y=<num>)",
            ActionKind::TripleClick => "TRIPLE_CLICK(x=<num>, y=<num>)",
            ActionKind::Type => r#"TYPE("<text>")"#,
            ActionKind::Hotkey => r#"HOTKEY("<key>+<key>[, <key>+<key>...]")"#,
            ActionKind::Wait => "WAIT(<seconds>)",
            ActionKind::Drag => "DRAG(start_x=<num>, start_y=<num>, end_x=<num>, end_y=<num>)",
            ActionKind::Hover => "HOVER(x=<num>, y=<num>)",
            ActionKind::Scroll => r#"SCROLL(direction="up|down|left|right")"#,
            ActionKind::Done => "DONE()",
            ActionKind::Fail => "FAIL()",
        }
    }

    /// Look up a keyword. Keywords are case sensitive.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Why an action failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ActionError {
    /// The text doesn't have a `KEYWORD(...)` shape at all.
    #[display("expected an action of the form KEYWORD(...)")]
    Unrecognized,

    /// The keyword isn't part of the grammar.
    #[display("unknown action type {_0:?}")]
    UnknownKeyword(String),

    /// The keyword is known but its arguments don't match its shape.
    #[display("invalid {_0} format, expected {}", _0.signature())]
    Malformed(ActionKind),
}

impl std::error::Error for ActionError {}

/// A position in normalized screen space.
///
/// Both axes are expected in `[0, 1]`; values outside that range still parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates fall within `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single key chord such as `ctrl+shift+s`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyCombo(Vec<String>);

impl KeyCombo {
    /// The individual key names, in order.
    pub fn keys(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for KeyCombo {
    type Err = ();

    fn from_str(combo: &str) -> Result<Self, Self::Err> {
        let keys = combo.split('+').map(str::trim).collect_vec();
        if keys.iter().any(|key| key.is_empty() || key.contains(char::is_whitespace)) {
            return Err(());
        }
        Ok(Self(keys.into_iter().map(String::from).collect()))
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("+"))
    }
}

/// Direction argument of `SCROLL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[display("up")]
    Up,
    #[display("down")]
    Down,
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

/// A parsed action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Click(Point),
    RightClick(Point),
    DoubleClick(Point),
    TripleClick(Point),
    Type { text: String },
    Hotkey { combos: Vec<KeyCombo> },
    Wait { seconds: f64 },
    Drag { start: Point, end: Point },
    Hover(Point),
    Scroll { direction: ScrollDirection },
    Done,
    Fail,
}

impl Action {
    /// Parse the text of an action, e.g. `CLICK(x=0.1, y=0.2)`.
    ///
    /// Leading and trailing whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, ActionError> {
        let text = text.trim();
        let Some(captures) = KEYWORD.captures(text) else {
            return Err(ActionError::Unrecognized);
        };

        let keyword = &captures[1];
        let kind = ActionKind::from_keyword(keyword)
            .ok_or_else(|| ActionError::UnknownKeyword(keyword.to_string()))?;

        // The argument regexes anchor on the opening parenthesis.
        let args = text[captures.get(1).map_or(0, |m| m.end())..].trim_start();
        parse_args(kind, args).ok_or(ActionError::Malformed(kind))
    }

    /// The keyword of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Click(_) => ActionKind::Click,
            Action::RightClick(_) => ActionKind::RightClick,
            Action::DoubleClick(_) => ActionKind::DoubleClick,
            Action::TripleClick(_) => ActionKind::TripleClick,
            Action::Type { .. } => ActionKind::Type,
            Action::Hotkey { .. } => ActionKind::Hotkey,
            Action::Wait { .. } => ActionKind::Wait,
            Action::Drag { .. } => ActionKind::Drag,
            Action::Hover(_) => ActionKind::Hover,
            Action::Scroll { .. } => ActionKind::Scroll,
            Action::Done => ActionKind::Done,
            Action::Fail => ActionKind::Fail,
        }
    }

    /// Every screen position referenced by the action, labeled by argument.
    pub fn points(&self) -> Vec<(&'static str, Point)> {
        match self {
            Action::Click(point)
            | Action::RightClick(point)
            | Action::DoubleClick(point)
            | Action::TripleClick(point)
            | Action::Hover(point) => vec![("coordinates", *point)],
            Action::Drag { start, end } => vec![("start", *start), ("end", *end)],
            _ => Vec::new(),
        }
    }

    /// Whether this action ends the demo.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Done | Action::Fail)
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Action::Click(p)
            | Action::RightClick(p)
            | Action::DoubleClick(p)
            | Action::TripleClick(p)
            | Action::Hover(p) => write!(f, "{kind}(x={}, y={})", p.x, p.y),
            Action::Type { text } => write!(f, "{kind}(\"{}\")", escape(text)),
            Action::Hotkey { combos } => {
                write!(f, "{kind}(\"{}\")", escape(&combos.iter().join(", ")))
            }
            Action::Wait { seconds } => write!(f, "{kind}({seconds})"),
            Action::Drag { start, end } => write!(
                f,
                "{kind}(start_x={}, start_y={}, end_x={}, end_y={})",
                start.x, start.y, end.x, end.y
            ),
            Action::Scroll { direction } => write!(f, "{kind}(direction=\"{direction}\")"),
            Action::Done | Action::Fail => write!(f, "{kind}()"),
        }
    }
}

/// Parse the parenthesized arguments for a known keyword.
fn parse_args(kind: ActionKind, args: &str) -> Option<Action> {
    match kind {
        ActionKind::Click => parse_point(args).map(Action::Click),
        ActionKind::RightClick => parse_point(args).map(Action::RightClick),
        ActionKind::DoubleClick => parse_point(args).map(Action::DoubleClick),
        ActionKind::TripleClick => parse_point(args).map(Action::TripleClick),
        ActionKind::Hover => parse_point(args).map(Action::Hover),
        ActionKind::Type => {
            let captures = TEXT_ARGS.captures(args)?;
            Some(Action::Type {
                text: unescape(&captures[1]),
            })
        }
        ActionKind::Hotkey => {
            let captures = TEXT_ARGS.captures(args)?;
            let combos = unescape(&captures[1])
                .split(',')
                .map(str::parse::<KeyCombo>)
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            Some(Action::Hotkey { combos })
        }
        ActionKind::Wait => {
            let captures = WAIT_ARGS.captures(args)?;
            let seconds = number(&captures[1])?;
            (seconds >= 0.0).then_some(Action::Wait { seconds })
        }
        ActionKind::Drag => {
            let captures = DRAG_ARGS.captures(args)?;
            Some(Action::Drag {
                start: Point::new(number(&captures[1])?, number(&captures[2])?),
                end: Point::new(number(&captures[3])?, number(&captures[4])?),
            })
        }
        ActionKind::Scroll => {
            let captures = SCROLL_ARGS.captures(args)?;
            let direction = match &captures[1] {
                "up" => ScrollDirection::Up,
                "down" => ScrollDirection::Down,
                "left" => ScrollDirection::Left,
                "right" => ScrollDirection::Right,
                _ => return None,
            };
            Some(Action::Scroll { direction })
        }
        ActionKind::Done => NO_ARGS.is_match(args).then_some(Action::Done),
        ActionKind::Fail => NO_ARGS.is_match(args).then_some(Action::Fail),
    }
}

fn parse_point(args: &str) -> Option<Point> {
    let captures = POINT_ARGS.captures(args)?;
    Some(Point::new(number(&captures[1])?, number(&captures[2])?))
}

fn number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

/// Resolve the escapes allowed inside quoted action arguments.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
