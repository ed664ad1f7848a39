mod cli;
mod config;
mod db;
mod entities;
mod error;
mod model;
mod sheet;
mod store;
mod util;

use std::io::Read;

use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    Cli, Command, GoalCommand, GoalCurrent, GoalDone, GoalList, GoalSave, GoalShow, JournalCommand,
    JournalSave, JournalShow, SheetCommand, SheetEdit, SheetShow, TaskCommand, TaskList, TaskSet,
};
use crate::config::Config;
use crate::error::AppError;
use crate::model::{GoalFields, Period};
use crate::sheet::SheetSelection;
use crate::store::GoalStore;
use crate::util::{format_goal_detail, format_goal_list, format_sheet, format_task_list};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let Cli { db, command } = Cli::parse();
    let config = Config::from_env(db)?;
    db::ensure_parent_dir(&config.db_path)?;
    let mut lock = db::open_lock(&config)?;
    let _guard = lock.write()?;

    let connection = db::connect(&config.db_path).await?;
    let store = GoalStore::new(connection);
    store.initialize_schema().await?;
    let migrated = store.migrate_schema().await?;

    match command {
        Command::Goal(command) => handle_goal(&store, command).await,
        Command::Task(command) => handle_task(&store, command).await,
        Command::Journal(command) => handle_journal(&store, command).await,
        Command::Sheet(command) => handle_sheet(&store, command).await,
        Command::Migrate => {
            if migrated {
                println!("Migrated database: {}", config.db_path.display());
            } else {
                println!("Database is up to date: {}", config.db_path.display());
            }
            Ok(())
        }
    }
}

async fn handle_goal(store: &GoalStore, command: GoalCommand) -> Result<(), AppError> {
    match command {
        GoalCommand::Current(args) => handle_goal_current(store, args).await,
        GoalCommand::List(args) => handle_goal_list(store, args).await,
        GoalCommand::Show(args) => handle_goal_show(store, args).await,
        GoalCommand::New => handle_goal_new(store).await,
        GoalCommand::Save(args) => handle_goal_save(store, args).await,
        GoalCommand::Done(args) => handle_goal_done(store, args).await,
    }
}

async fn handle_task(store: &GoalStore, command: TaskCommand) -> Result<(), AppError> {
    match command {
        TaskCommand::List(args) => handle_task_list(store, args).await,
        TaskCommand::Set(args) => handle_task_set(store, args).await,
    }
}

async fn handle_journal(store: &GoalStore, command: JournalCommand) -> Result<(), AppError> {
    match command {
        JournalCommand::Show(args) => handle_journal_show(store, args).await,
        JournalCommand::Save(args) => handle_journal_save(store, args).await,
    }
}

async fn handle_sheet(store: &GoalStore, command: SheetCommand) -> Result<(), AppError> {
    match command {
        SheetCommand::Show(args) => handle_sheet_show(store, args).await,
        SheetCommand::Edit(args) => handle_sheet_edit(store, args).await,
    }
}

async fn handle_goal_current(store: &GoalStore, args: GoalCurrent) -> Result<(), AppError> {
    let period = match (args.month, args.year) {
        (Some(month), Some(year)) => Period::new(month, year)?,
        _ => Period::current(),
    };
    let goal = store.get_or_create_current_goal(period).await?;
    println!("Current goal ID: {} ({})", goal.id, period.label());
    Ok(())
}

async fn handle_goal_list(store: &GoalStore, args: GoalList) -> Result<(), AppError> {
    let goals = store.list_goals().await?;
    if args.json {
        return print_json(&goals);
    }
    if goals.is_empty() {
        println!("No goal sheets yet. Run `goalsheet goal new` to get started.");
        return Ok(());
    }
    println!("{}", format_goal_list(&goals));
    Ok(())
}

async fn handle_goal_show(store: &GoalStore, args: GoalShow) -> Result<(), AppError> {
    let goal = store.get_goal(args.id).await?;
    if args.json {
        return print_json(&goal);
    }
    println!("{}", format_goal_detail(&goal));
    Ok(())
}

async fn handle_goal_new(store: &GoalStore) -> Result<(), AppError> {
    let goal = store.create_goal(Period::current()).await?;
    println!("Created goal ID: {}", goal.id);
    Ok(())
}

async fn handle_goal_save(store: &GoalStore, args: GoalSave) -> Result<(), AppError> {
    let goal = store
        .save_goal(
            args.id,
            GoalFields {
                name: args.name,
                description: args.description,
                completion_criteria: args.criteria,
                header_text: args.header,
            },
        )
        .await?;
    println!("Saved goal ID: {}", goal.id);
    Ok(())
}

async fn handle_goal_done(store: &GoalStore, args: GoalDone) -> Result<(), AppError> {
    let goal = store.get_goal(args.id).await?;
    let name = sheet::display_name(&goal);
    store.delete_goal(goal.id).await?;
    println!("Goal '{name}' completed and deleted.");
    Ok(())
}

async fn handle_task_list(store: &GoalStore, args: TaskList) -> Result<(), AppError> {
    let tasks = store.list_tasks(args.goal_id).await?;
    if args.json {
        return print_json(&tasks);
    }
    println!("{}", format_task_list(&tasks));
    Ok(())
}

async fn handle_task_set(store: &GoalStore, args: TaskSet) -> Result<(), AppError> {
    sheet::check_task_count(&args.tasks)?;
    let tasks = store.replace_tasks(args.goal_id, &args.tasks).await?;
    println!("Saved {} task(s) for goal ID: {}", tasks.len(), args.goal_id);
    Ok(())
}

async fn handle_journal_show(store: &GoalStore, args: JournalShow) -> Result<(), AppError> {
    let content = store.get_journal_content(args.goal_id).await?;
    println!("{content}");
    Ok(())
}

async fn handle_journal_save(store: &GoalStore, args: JournalSave) -> Result<(), AppError> {
    let content = match args.content {
        Some(content) => content,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    // Save failures are logged by the store, not reported here.
    store.save_journal_content(args.goal_id, &content).await;
    println!(
        "Journal submitted for goal ID: {} ({} chars)",
        args.goal_id,
        content.chars().count()
    );
    Ok(())
}

async fn handle_sheet_show(store: &GoalStore, args: SheetShow) -> Result<(), AppError> {
    let detail = sheet::load_sheet(store, SheetSelection::from(args.id)).await?;
    if args.json {
        return print_json(&detail);
    }
    println!("{}", format_sheet(&detail, Local::now().date_naive()));
    Ok(())
}

async fn handle_sheet_edit(store: &GoalStore, args: SheetEdit) -> Result<(), AppError> {
    let goal = store.get_goal(args.id).await?;
    let name = args.name.unwrap_or_else(|| goal.name.clone());
    let details = args
        .details
        .unwrap_or_else(|| sheet::combine_details(&goal.description, &goal.completion_criteria));
    if !sheet::details_changed(&goal, &name, &details) {
        println!("No changes for goal ID: {}", goal.id);
        return Ok(());
    }
    let (description, completion_criteria) = sheet::split_details(&details);
    store
        .save_goal(
            goal.id,
            GoalFields {
                name,
                description,
                completion_criteria,
                header_text: None,
            },
        )
        .await?;
    println!("Saved goal ID: {}", goal.id);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
