//! The `webex validate` command.

use std::path::PathBuf;

use anyhow::Result;

use webex_core::parser;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quizzes = parser::load_quizzes(&quiz_path)?;

    let mut total_warnings = 0;

    for quiz in &quizzes {
        println!(
            "Quiz: {} ({} sections, {} items)",
            quiz.title,
            quiz.sections.len(),
            quiz.item_count()
        );

        let warnings = parser::validate_quiz(quiz);
        for w in &warnings {
            let prefix = match (&w.section_id, &w.item) {
                (Some(section), Some(item)) => format!("  [{section}/{item}]"),
                (Some(section), None) => format!("  [{section}]"),
                (None, Some(item)) => format!("  [{item}]"),
                (None, None) => "  ".to_string(),
            };
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
