//! Terminal rendering for wellbotctl.

use crate::presentation::{Presentation, ResultSource};
use crate::selection::SelectionSet;
use owo_colors::OwoColorize;
use wellbot_common::body_parts::BODY_PARTS;
use wellbot_common::FeedbackRecord;

const HR: &str = "──────────────────────────────────────────";

pub fn print_parts(selection: &SelectionSet) {
    println!("{}", "Body parts".bold());
    println!("{}", HR.dimmed());
    for (part, anatomical) in BODY_PARTS {
        let mark = if selection.contains(part) { "●" } else { "○" };
        println!(
            "{} {:15} {}",
            mark.green(),
            part,
            anatomical.dimmed()
        );
    }
}

pub fn print_selection(selection: &SelectionSet) {
    println!("{} {}", "Selected:".bold(), selection.summary());
}

/// Diagnosis with the condition name in bold, then recommendations
pub fn print_presentation(presentation: &Presentation) {
    let (diagnosis_heading, recommendations_heading) = presentation.headings();
    let parts = presentation.condition_parts();

    println!();
    println!("{}", diagnosis_heading.bold().cyan());
    println!("{}", HR.dimmed());
    match parts.condition {
        Some(condition) => println!(
            "{}{}{}",
            parts.before,
            condition.bold().yellow(),
            parts.after
        ),
        None => println!("{}", parts.before),
    }

    println!();
    println!("{}", recommendations_heading.bold().cyan());
    println!("{}", HR.dimmed());
    println!("{}", presentation.shown().recommendations);

    if let Some(err) = presentation.translation_error() {
        println!();
        println!("{} {}", "translation unavailable:".yellow(), err.dimmed());
    }
    if presentation.source() == ResultSource::Storage {
        println!("{}", "(restored from local storage)".dimmed());
    }
}

pub fn print_feedback_records(records: &[FeedbackRecord]) {
    if records.is_empty() {
        println!("{}", "No feedback yet.".dimmed());
        return;
    }
    println!(
        "{:>5}  {:10}  {:8}  {:19}  {}",
        "id".bold(),
        "usefulness".bold(),
        "accuracy".bold(),
        "timestamp".bold(),
        "comments".bold()
    );
    for record in records {
        println!(
            "{:>5}  {:10}  {:8}  {:19}  {}",
            record.id,
            record.usefulness,
            record.accuracy,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.comments.as_deref().unwrap_or("")
        );
    }
}

pub fn print_ok(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}
