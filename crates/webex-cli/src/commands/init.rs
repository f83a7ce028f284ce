//! The `webex init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create webex.toml
    if std::path::Path::new("webex.toml").exists() {
        println!("webex.toml already exists, skipping.");
    } else {
        std::fs::write("webex.toml", SAMPLE_CONFIG)?;
        println!("Created webex.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizzes/example.toml or add your own quizzes");
    println!("  2. Run: webex validate --quiz quizzes/example.toml");
    println!("  3. Run: webex grade --quiz quizzes/example.toml --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# webex configuration

output_dir = "./webex-results"

[rules]
# Dropdowns are marked correct/incorrect. When false they never score.
select_marks_correctness = true
# Show the points suffix only when a section has points to earn.
points_only_when_possible = false
# Regex answers: "normalized" or "raw".
regex_source = "normalized"
# Divisor of the running section average.
average_divisor = 5.0
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Quiz"
description = "A short self-check quiz with a scored survey"

[[sections]]
id = "basics"
title = "Basics"

[[sections.items]]
type = "solveme"
id = "capital"
answer = '["Paris"]'
ignore_case = true
points = 2
response = "paris"

[[sections.items]]
type = "solveme"
id = "pi"
answer = '[3.14]'
tol = 0.01
points = 1
response = "3.1416"

[[sections.items]]
type = "select"
id = "borrow"
points = 1
response = "answer"

[[sections.items]]
type = "radiogroup"
id = "planet"
selected = 0
options = [
    { label = "Mars", value = "x", points = 0 },
    { label = "Jupiter", value = "answer", points = 1 },
]

[[sections]]
id = "survey"
title = "Team Survey"
show_points = false
average = true

[[sections.domains]]
label = "Trust"
items = "1,3"

[[sections.domains]]
label = "Care"
ids = ["listens"]

[[sections.items]]
type = "radiogroup"
id = "relies"
selected = 2
options = [
    { label = "Never", value = "x", points = 0 },
    { label = "Sometimes", value = "x", points = 1 },
    { label = "Often", value = "answer", points = 2 },
]

[[sections.items]]
type = "radiogroup"
id = "listens"
selected = 1
options = [
    { label = "Never", value = "x", points = 0 },
    { label = "Sometimes", value = "x", points = 1 },
    { label = "Often", value = "answer", points = 2 },
]

[[sections.items]]
type = "radiogroup"
id = "admits"
selected = 0
options = [
    { label = "Never", value = "x", points = 0 },
    { label = "Sometimes", value = "x", points = 1 },
    { label = "Often", value = "answer", points = 2 },
]
"#;
