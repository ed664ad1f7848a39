use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DB_PATH_ENV;

#[derive(Parser, Debug)]
#[command(
    name = "goalsheet",
    version,
    about = "Track monthly practice goals, tasks and journal notes with SQLite"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env = DB_PATH_ENV,
        help = "SQLite database file (defaults to ~/.goalsheet/goalsheet.db)"
    )]
    pub db: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Goal(GoalCommand),
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Journal(JournalCommand),
    #[command(subcommand)]
    Sheet(SheetCommand),
    /// Create missing tables and apply column migrations
    Migrate,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    Current(GoalCurrent),
    List(GoalList),
    Show(GoalShow),
    New,
    Save(GoalSave),
    Done(GoalDone),
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    List(TaskList),
    Set(TaskSet),
}

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    Show(JournalShow),
    Save(JournalSave),
}

#[derive(Subcommand, Debug)]
pub enum SheetCommand {
    Show(SheetShow),
    Edit(SheetEdit),
}

#[derive(Args, Debug)]
pub struct GoalCurrent {
    #[arg(long, requires = "year")]
    pub month: Option<u32>,
    #[arg(long, requires = "month")]
    pub year: Option<i32>,
}

#[derive(Args, Debug)]
pub struct GoalList {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GoalShow {
    pub id: i64,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GoalSave {
    pub id: i64,
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub criteria: String,
    #[arg(long, help = "Header text; left unchanged when omitted")]
    pub header: Option<String>,
}

#[derive(Args, Debug)]
pub struct GoalDone {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct TaskList {
    pub goal_id: i64,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TaskSet {
    pub goal_id: i64,
    #[arg(
        value_name = "TASK",
        num_args = 0..,
        allow_hyphen_values = true,
        help = "Tasks in order; blank entries are dropped"
    )]
    pub tasks: Vec<String>,
}

#[derive(Args, Debug)]
pub struct JournalShow {
    pub goal_id: i64,
}

#[derive(Args, Debug)]
pub struct JournalSave {
    pub goal_id: i64,
    #[arg(help = "Journal text; read from stdin when omitted")]
    pub content: Option<String>,
}

#[derive(Args, Debug)]
pub struct SheetShow {
    #[arg(help = "Goal id; the current month's sheet when omitted")]
    pub id: Option<i64>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SheetEdit {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(
        long,
        help = "Description and completion criteria separated by a blank line"
    )]
    pub details: Option<String>,
}
