use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db;
use crate::entities::{goal, journal_entry, task};
use crate::error::AppError;
use crate::model::{GoalFields, JournalWrite, Period};

pub struct GoalStore {
    db: DatabaseConnection,
}

impl GoalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn initialize_schema(&self) -> Result<(), AppError> {
        db::initialize_schema(&self.db).await
    }

    pub async fn migrate_schema(&self) -> Result<bool, AppError> {
        db::migrate_schema(&self.db).await
    }

    pub async fn get_or_create_current_goal(&self, period: Period) -> Result<goal::Model, AppError> {
        let existing = goal::Entity::find()
            .filter(goal::Column::Month.eq(period.month as i32))
            .filter(goal::Column::Year.eq(period.year))
            .order_by_asc(goal::Column::Id)
            .one(&self.db)
            .await?;
        if let Some(goal) = existing {
            return Ok(goal);
        }

        let goal = insert_empty_goal(&self.db, period).await?;
        tracing::info!(
            goal_id = goal.id,
            month = period.month,
            year = period.year,
            "created goal for period"
        );
        Ok(goal)
    }

    pub async fn list_goals(&self) -> Result<Vec<goal::Model>, AppError> {
        Ok(goal::Entity::find()
            .order_by_desc(goal::Column::Year)
            .order_by_desc(goal::Column::Month)
            .order_by_asc(goal::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_goal(&self, id: i64) -> Result<goal::Model, AppError> {
        goal::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("goal id {id}")))
    }

    pub async fn create_goal(&self, period: Period) -> Result<goal::Model, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<goal::Model, AppError> = async {
            let goal = insert_empty_goal(&txn, period).await?;
            let now = Utc::now();
            let journal = journal_entry::ActiveModel {
                goal_id: Set(goal.id),
                content: Set(String::new()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            journal_entry::Entity::insert(journal).exec(&txn).await?;
            Ok(goal)
        }
        .await;

        let goal = finalize_transaction(txn, result).await?;
        tracing::info!(goal_id = goal.id, "created goal");
        Ok(goal)
    }

    pub async fn delete_goal(&self, id: i64) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            journal_entry::Entity::delete_many()
                .filter(journal_entry::Column::GoalId.eq(id))
                .exec(&txn)
                .await?;
            task::Entity::delete_many()
                .filter(task::Column::GoalId.eq(id))
                .exec(&txn)
                .await?;
            let deleted = goal::Entity::delete_by_id(id).exec(&txn).await?;
            if deleted.rows_affected == 0 {
                return Err(AppError::NotFound(format!("goal id {id}")));
            }
            Ok(())
        }
        .await;

        finalize_transaction(txn, result).await?;
        tracing::info!(goal_id = id, "deleted goal");
        Ok(())
    }

    pub async fn save_goal(&self, id: i64, fields: GoalFields) -> Result<goal::Model, AppError> {
        let mut active = goal::ActiveModel {
            id: Set(id),
            name: Set(fields.name),
            description: Set(fields.description),
            completion_criteria: Set(fields.completion_criteria),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(header_text) = fields.header_text {
            active.header_text = Set(header_text);
        }

        match active.update(&self.db).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotFound(_)) | Err(sea_orm::DbErr::RecordNotUpdated) => {
                Err(AppError::NotFound(format!("goal id {id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list_tasks(&self, goal_id: i64) -> Result<Vec<task::Model>, AppError> {
        Ok(task::Entity::find()
            .filter(task::Column::GoalId.eq(goal_id))
            .order_by_asc(task::Column::TaskOrder)
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn replace_tasks<S: AsRef<str>>(
        &self,
        goal_id: i64,
        descriptions: &[S],
    ) -> Result<Vec<task::Model>, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            if goal::Entity::find_by_id(goal_id).one(&txn).await?.is_none() {
                return Err(AppError::NotFound(format!("goal id {goal_id}")));
            }
            task::Entity::delete_many()
                .filter(task::Column::GoalId.eq(goal_id))
                .exec(&txn)
                .await?;

            let now = Utc::now();
            let kept = descriptions
                .iter()
                .map(|description| description.as_ref().trim())
                .filter(|description| !description.is_empty());
            for (order, description) in kept.enumerate() {
                let active = task::ActiveModel {
                    goal_id: Set(goal_id),
                    task_description: Set(description.to_string()),
                    task_order: Set(order as i32),
                    created_at: Set(now),
                    ..Default::default()
                };
                task::Entity::insert(active).exec(&txn).await?;
            }
            Ok(())
        }
        .await;

        finalize_transaction(txn, result).await?;
        self.list_tasks(goal_id).await
    }

    pub async fn get_journal_content(&self, goal_id: i64) -> Result<String, AppError> {
        let entry = journal_entry::Entity::find()
            .filter(journal_entry::Column::GoalId.eq(goal_id))
            .order_by_desc(journal_entry::Column::UpdatedAt)
            .order_by_desc(journal_entry::Column::Id)
            .one(&self.db)
            .await?;
        Ok(entry.map(|entry| entry.content).unwrap_or_default())
    }

    // Errors are logged, never returned.
    pub async fn save_journal_content(&self, goal_id: i64, content: &str) {
        match self.try_save_journal_content(goal_id, content).await {
            Ok(write) => tracing::debug!(
                goal_id,
                len = content.len(),
                write = write.as_str(),
                "journal saved"
            ),
            Err(err) => tracing::error!(goal_id, error = %err, "failed to save journal"),
        }
    }

    pub async fn try_save_journal_content(
        &self,
        goal_id: i64,
        content: &str,
    ) -> Result<JournalWrite, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<JournalWrite, AppError> = async {
            let now = Utc::now();
            let existing = journal_entry::Entity::find()
                .filter(journal_entry::Column::GoalId.eq(goal_id))
                .one(&txn)
                .await?;
            if existing.is_some() {
                journal_entry::Entity::update_many()
                    .col_expr(journal_entry::Column::Content, Expr::value(content))
                    .col_expr(journal_entry::Column::UpdatedAt, Expr::value(now))
                    .filter(journal_entry::Column::GoalId.eq(goal_id))
                    .exec(&txn)
                    .await?;
                return Ok(JournalWrite::Updated);
            }

            let active = journal_entry::ActiveModel {
                goal_id: Set(goal_id),
                content: Set(content.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            journal_entry::Entity::insert(active).exec(&txn).await?;
            Ok(JournalWrite::Inserted)
        }
        .await;

        finalize_transaction(txn, result).await
    }
}

async fn insert_empty_goal<C: sea_orm::ConnectionTrait>(
    db: &C,
    period: Period,
) -> Result<goal::Model, AppError> {
    let now = Utc::now();
    let active = goal::ActiveModel {
        month: Set(period.month as i32),
        year: Set(period.year),
        name: Set(String::new()),
        description: Set(String::new()),
        completion_criteria: Set(String::new()),
        header_text: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let insert = goal::Entity::insert(active).exec(db).await?;
    goal::Entity::find_by_id(insert.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("goal not found after insert".to_string()))
}

async fn finalize_transaction<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                return Err(rollback_err.into());
            }
            Err(err)
        }
    }
}
