use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{goal, task};
use crate::error::AppError;
use crate::model::Period;
use crate::store::GoalStore;

pub const MAX_TASKS: usize = 5;
const PREVIEW_CHARS: usize = 100;
const DETAILS_SEPARATOR: &str = "\n\n";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SheetSelection {
    Current,
    Goal(i64),
}

impl From<Option<i64>> for SheetSelection {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(id) => Self::Goal(id),
            None => Self::Current,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GoalSheet {
    pub goal: goal::Model,
    pub tasks: Vec<task::Model>,
    pub journal: String,
}

pub async fn load_sheet(store: &GoalStore, selection: SheetSelection) -> Result<GoalSheet, AppError> {
    let goal = match selection {
        SheetSelection::Current => store.get_or_create_current_goal(Period::current()).await?,
        SheetSelection::Goal(id) => store.get_goal(id).await?,
    };
    let tasks = store.list_tasks(goal.id).await?;
    let journal = store.get_journal_content(goal.id).await?;
    Ok(GoalSheet {
        goal,
        tasks,
        journal,
    })
}

pub fn display_name(goal: &goal::Model) -> String {
    let name = goal.name.trim();
    if name.is_empty() {
        format!("Untitled Goal #{}", goal.id)
    } else {
        name.to_string()
    }
}

pub fn header_title(goal: &goal::Model, today: NaiveDate) -> String {
    let name = goal.name.trim();
    if name.is_empty() {
        Period::containing(today).label()
    } else {
        name.to_string()
    }
}

pub fn created_label(goal: &goal::Model) -> String {
    goal.created_at.format("%B %d, %Y").to_string()
}

pub fn description_preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

pub fn combine_details(description: &str, criteria: &str) -> String {
    if description.is_empty() && criteria.is_empty() {
        String::new()
    } else {
        format!("{description}{DETAILS_SEPARATOR}{criteria}")
    }
}

pub fn split_details(text: &str) -> (String, String) {
    match text.split_once(DETAILS_SEPARATOR) {
        Some((description, criteria)) => (description.to_string(), criteria.to_string()),
        None => (text.to_string(), String::new()),
    }
}

pub fn details_changed(goal: &goal::Model, name: &str, details: &str) -> bool {
    if name.trim() != goal.name.trim() {
        return true;
    }
    let stored = combine_details(&goal.description, &goal.completion_criteria);
    details.trim() != stored.trim()
}

pub fn task_rows(tasks: &[task::Model]) -> Vec<String> {
    if tasks.is_empty() {
        return vec![String::new()];
    }
    tasks
        .iter()
        .map(|task| task.task_description.clone())
        .collect()
}

pub fn check_task_count<S: AsRef<str>>(tasks: &[S]) -> Result<(), AppError> {
    let count = tasks
        .iter()
        .filter(|task| !task.as_ref().trim().is_empty())
        .count();
    if count > MAX_TASKS {
        return Err(AppError::InvalidInput(format!(
            "at most {MAX_TASKS} tasks per goal, got {count}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn goal_named(id: i64, name: &str) -> goal::Model {
        let created = Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap();
        goal::Model {
            id,
            month: 6,
            year: 2024,
            name: name.to_string(),
            description: "Learn the piece".to_string(),
            completion_criteria: "Play it cleanly".to_string(),
            header_text: String::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(display_name(&goal_named(4, "  ")), "Untitled Goal #4");
        assert_eq!(display_name(&goal_named(4, " Minuet ")), "Minuet");
    }

    #[test]
    fn header_title_falls_back_to_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(header_title(&goal_named(1, ""), today), "March 2025");
        assert_eq!(header_title(&goal_named(1, "Tremolo"), today), "Tremolo");
    }

    #[test]
    fn created_label_is_long_date() {
        assert_eq!(created_label(&goal_named(1, "")), "June 03, 2024");
    }

    #[test]
    fn preview_truncates_long_descriptions() {
        let long = "a".repeat(120);
        let preview = description_preview(&long);
        assert_eq!(preview.len(), 103);
        assert!(preview.ends_with("..."));
        assert_eq!(description_preview("short"), "short");
    }

    #[test]
    fn details_split_on_first_blank_line() {
        let text = combine_details("Learn it", "Play at 80 bpm\n\nwithout stops");
        assert_eq!(
            split_details(&text),
            (
                "Learn it".to_string(),
                "Play at 80 bpm\n\nwithout stops".to_string()
            )
        );
        assert_eq!(combine_details("", ""), "");
        assert_eq!(
            split_details("just a description"),
            ("just a description".to_string(), String::new())
        );
    }

    #[test]
    fn details_changed_ignores_whitespace() {
        let goal = goal_named(1, "Minuet");
        assert!(!details_changed(
            &goal,
            " Minuet ",
            "Learn the piece\n\nPlay it cleanly\n"
        ));
        assert!(details_changed(&goal, "Minuet in G", "Learn the piece\n\nPlay it cleanly"));
        assert!(details_changed(&goal, "Minuet", "Learn the piece"));
    }

    #[test]
    fn task_rows_never_empty() {
        assert_eq!(task_rows(&[]), vec![String::new()]);
    }

    #[test]
    fn task_count_caps_non_blank_entries() {
        assert!(check_task_count(&["a", "b", "c", "d", "e", "", "  "]).is_ok());
        assert!(check_task_count::<&str>(&[]).is_ok());
        let err = check_task_count(&["a", "b", "c", "d", "e", "f"]).unwrap_err();
        match err {
            AppError::InvalidInput(message) => assert!(message.contains("at most 5")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_sheet_for_unknown_goal_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let db = db::connect(&dir.path().join("goalsheet.db"))
            .await
            .expect("connect db");
        let store = GoalStore::new(db);
        store.initialize_schema().await.expect("init");

        let err = load_sheet(&store, SheetSelection::Goal(3)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let current = load_sheet(&store, SheetSelection::Current).await.expect("current");
        let again = load_sheet(&store, None.into()).await.expect("again");
        assert_eq!(current.goal.id, again.goal.id);
        assert_eq!(current.journal, "");
        assert_eq!(task_rows(&current.tasks), vec![String::new()]);
    }
}
