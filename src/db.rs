use std::fs::{self, File, OpenOptions};
use std::path::Path;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use url::Url;

use crate::config::Config;
use crate::entities::{journal_entry, task};
use crate::error::AppError;

// Column order and defaults match databases written by earlier versions of the tool.
const CREATE_GOALS: &str = r#"
CREATE TABLE IF NOT EXISTS goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    month INTEGER NOT NULL,
    year INTEGER NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    completion_criteria TEXT NOT NULL DEFAULT '',
    header_text TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)"#;

const CREATE_TASKS: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    goal_id INTEGER NOT NULL,
    task_description TEXT NOT NULL DEFAULT '',
    task_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (goal_id) REFERENCES goals (id)
)"#;

const CREATE_JOURNAL_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS journal_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    goal_id INTEGER NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (goal_id) REFERENCES goals (id)
)"#;

const ADD_HEADER_TEXT: &str = "ALTER TABLE goals ADD COLUMN header_text TEXT NOT NULL DEFAULT ''";

pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn open_lock(config: &Config) -> Result<fd_lock::RwLock<File>, AppError> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(config.lock_path())?;
    Ok(fd_lock::RwLock::new(file))
}

pub async fn connect(path: &Path) -> Result<DatabaseConnection, AppError> {
    let mut url = Url::from_file_path(path)
        .map_err(|_| AppError::InvalidInput(format!("invalid sqlite path: {}", path.display())))?;
    url.set_query(Some("mode=rwc"));
    let sqlite_url = url.as_str().replacen("file://", "sqlite://", 1);
    Ok(Database::connect(&sqlite_url).await?)
}

pub async fn initialize_schema<C: ConnectionTrait>(db: &C) -> Result<(), AppError> {
    for ddl in [CREATE_GOALS, CREATE_TASKS, CREATE_JOURNAL_ENTRIES] {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, ddl))
            .await?;
    }

    let builder = db.get_database_backend();

    let mut task_index = Index::create()
        .name("idx_tasks_goal_order")
        .table(task::Entity)
        .col(task::Column::GoalId)
        .col(task::Column::TaskOrder)
        .to_owned();
    task_index.if_not_exists();
    db.execute(builder.build(&task_index)).await?;

    let mut journal_index = Index::create()
        .name("idx_journal_entries_goal")
        .table(journal_entry::Entity)
        .col(journal_entry::Column::GoalId)
        .to_owned();
    journal_index.if_not_exists();
    db.execute(builder.build(&journal_index)).await?;

    Ok(())
}

pub async fn migrate_schema<C: ConnectionTrait>(db: &C) -> Result<bool, AppError> {
    let columns = table_columns(db, "goals").await?;
    if columns.iter().any(|name| name == "header_text") {
        return Ok(false);
    }
    tracing::info!("migrating goals table: adding header_text column");
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        ADD_HEADER_TEXT,
    ))
    .await?;
    Ok(true)
}

pub async fn table_columns<C: ConnectionTrait>(
    db: &C,
    table: &str,
) -> Result<Vec<String>, AppError> {
    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("PRAGMA table_info({table})"),
        ))
        .await?;
    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        columns.push(row.try_get::<String>("", "name")?);
    }
    Ok(columns)
}
