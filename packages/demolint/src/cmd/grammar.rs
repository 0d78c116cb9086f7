//! Reference for the demo format and its action grammar.

use clap::Args;
use color_eyre::Result;
use color_print::{cformat, cstr};

use demolint::{ActionKind, Section};

#[derive(Args, Clone, Debug)]
pub struct Config {}

pub fn main(_config: Config) -> Result<()> {
    println!("{FORMAT}");

    println!("{}", cstr!("<bold>Sections</bold>"));
    println!();
    for section in Section::ALL {
        let note = if section.is_required() {
            "required"
        } else {
            "optional, warns if absent"
        };
        println!("{}", cformat!("  <cyan>{:<18}</cyan> <dim>{}</dim>", section.marker(), note));
    }
    println!();

    println!("{}", cstr!("<bold>Actions</bold>"));
    println!();
    for kind in ActionKind::ALL {
        println!("{}", cformat!("  <green>{}</green>", kind.signature()));
    }
    println!();

    println!("{RULES}");
    Ok(())
}

const FORMAT: &str = cstr!("\
<bold><blue>Demo Format</blue></bold>

  A demo is a plain-text walkthrough that an agent replays as context. Each
  step carries exactly one <cyan>ACTION:</cyan> line.

    <yellow>TASK: Open Notepad and type hello</yellow>
    <yellow>DOMAIN: notepad</yellow>

    <yellow>STEPS:</yellow>
    <yellow>1. Open the start menu</yellow>
    <yellow>   ACTION: CLICK(x=0.02, y=0.98)</yellow>
    <yellow>2. Type the greeting</yellow>
    <yellow>   ACTION: TYPE(\"hello\")</yellow>
    <yellow>3. Finish</yellow>
    <yellow>   ACTION: DONE()</yellow>

    <yellow>EXPECTED_OUTCOME: Notepad shows hello</yellow>

  Step labels are optional (<cyan>1.</cyan>, <cyan>1)</cyan>, <cyan>Step 1:</cyan>). When present they must count
  up from 1 without gaps.
");

const RULES: &str = cstr!("\
<bold>Validation Rules</bold>

  <red>Errors</red> <dim>(the demo is invalid):</dim>
    • A required section is missing
    • Step numbers are not 1, 2, 3, ...
    • A numbered step has no ACTION line, or more than one
    • An action keyword is unknown, or its arguments are malformed
    • <cyan>DONE()</cyan> does not appear anywhere

  <yellow>Warnings</yellow> <dim>(reported, the demo stays valid):</dim>
    • <cyan>EXPECTED_OUTCOME:</cyan> is missing
    • Coordinates outside the normalized range [0, 1]
    • <cyan>DONE()</cyan> or <cyan>FAIL()</cyan> appears before the final action
    • Sections are repeated, empty, or out of order
    • <cyan>WAIT</cyan> is longer than <cyan>max_wait_seconds</cyan>, or <cyan>TYPE</cyan> text is empty

<bold>Settings</bold>

  Settings are loaded from these locations (later files win):

    <cyan>$CONFIG_DIR/settings.yaml</cyan>     <dim>User-level settings</dim>
    <cyan>.demolint.yaml</cyan>                <dim>Project root</dim>

    <yellow>pattern: \"*.txt\"</yellow>            <dim># Files to pick up in directories</dim>
    <yellow>recursive: false</yellow>            <dim># Descend into subdirectories</dim>
    <yellow>max_wait_seconds: 30</yellow>        <dim># Longer WAITs produce a warning</dim>
");
