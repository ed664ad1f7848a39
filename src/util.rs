use chrono::{DateTime, NaiveDate, Utc};

use crate::entities::{goal, task};
use crate::model::Period;
use crate::sheet::{self, GoalSheet};

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn period_of(goal: &goal::Model) -> String {
    match u32::try_from(goal.month) {
        Ok(month) => Period {
            month,
            year: goal.year,
        }
        .label(),
        Err(_) => format!("{}/{}", goal.month, goal.year),
    }
}

pub fn format_goal_detail(goal: &goal::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("Goal ID: {}\n", goal.id));
    output.push_str(&format!("Period: {}\n", period_of(goal)));
    output.push_str(&format!("Name: {}\n", goal.name));
    if !goal.header_text.trim().is_empty() {
        output.push_str(&format!("Header: {}\n", goal.header_text));
    }
    output.push_str(&format!("Description: {}\n", goal.description));
    output.push_str(&format!("Completion: {}\n", goal.completion_criteria));
    output.push_str(&format!("Created: {}\n", format_datetime(goal.created_at)));
    output.push_str(&format!("Updated: {}\n", format_datetime(goal.updated_at)));
    output.trim_end().to_string()
}

pub fn format_goal_list(goals: &[goal::Model]) -> String {
    let mut output = format!("{:<4} {:<16} {:<30} {}\n", "ID", "PERIOD", "NAME", "CREATED");
    for goal in goals {
        output.push_str(&format!(
            "{:<4} {:<16} {:<30} {}\n",
            goal.id,
            period_of(goal),
            sheet::display_name(goal),
            sheet::created_label(goal)
        ));
        if !goal.description.trim().is_empty() {
            let preview = sheet::description_preview(&goal.description);
            output.push_str(&format!("     {preview}\n"));
        }
    }
    output.trim_end().to_string()
}

pub fn format_task_list(tasks: &[task::Model]) -> String {
    if tasks.is_empty() {
        return "Tasks: (none)".to_string();
    }
    let mut output = String::from("Tasks:\n");
    for task in tasks {
        output.push_str(&format!("{}. {}\n", task.task_order + 1, task.task_description));
    }
    output.trim_end().to_string()
}

pub fn format_sheet(detail: &GoalSheet, today: NaiveDate) -> String {
    let goal = &detail.goal;
    let mut output = String::new();
    output.push_str(&format!("# {}\n", sheet::header_title(goal, today)));
    if !goal.header_text.trim().is_empty() {
        output.push_str(&format!("{}\n", goal.header_text.trim()));
    }
    output.push('\n');
    output.push_str(&format!("Goal ID: {}\n", goal.id));
    output.push_str(&format!("Name: {}\n", sheet::display_name(goal)));
    output.push_str(&format!("Created: {}\n", sheet::created_label(goal)));
    let details = sheet::combine_details(&goal.description, &goal.completion_criteria);
    if !details.is_empty() {
        output.push_str(&format!("\n{}\n", details.trim_end()));
    }
    output.push_str("\nPractice tasks:\n");
    for (idx, row) in sheet::task_rows(&detail.tasks).iter().enumerate() {
        output.push_str(&format!("{}. {}\n", idx + 1, row));
    }
    output.push_str("\nJournal:\n");
    if detail.journal.trim().is_empty() {
        output.push_str("(empty)");
    } else {
        output.push_str(&detail.journal);
    }
    output.trim_end().to_string()
}
