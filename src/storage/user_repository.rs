use async_trait::async_trait;
use sea_orm::{prelude::*, sea_query::Expr, Set, TransactionTrait};
use uuid::Uuid;

use crate::models::internal::{now_millis, User};
use crate::storage::entities::{transactions, users};
use crate::storage::repository::RepositoryError;

/// Starting balance for new accounts.
pub const DEFAULT_CREDITS: i64 = 20;

/// Pending or settled credit purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub amount: i64,
    pub credits: i64,
    pub is_paid: bool,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        credits: i64,
    ) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Debit `cost` only if the balance covers it, in a single conditional
    /// update. Returns false (and changes nothing) otherwise.
    async fn spend_credits(&self, user_id: &str, cost: i64) -> Result<bool, RepositoryError>;

    /// Unconditional increment, used for refunds and grants.
    async fn add_credits(&self, user_id: &str, amount: i64) -> Result<(), RepositoryError>;

    async fn create_transaction(
        &self,
        user_id: &str,
        plan_id: &str,
        amount: i64,
        credits: i64,
    ) -> Result<TransactionRecord, RepositoryError>;

    async fn find_transaction(&self, id: &str)
        -> Result<Option<TransactionRecord>, RepositoryError>;

    /// Mark an unpaid transaction paid and credit its owner. Returns the
    /// credited amount, or `None` if it was unknown or already paid.
    async fn settle_transaction(&self, id: &str) -> Result<Option<i64>, RepositoryError>;
}

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        credits: i64,
    ) -> Result<User, RepositoryError> {
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            credits: Set(credits),
            created_at: Set(now_millis()),
        };

        let model = user.insert(&self.db).await?;
        tracing::info!("Created user: {}", model.id);
        Ok(User::from(model))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let model = users::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(User::from))
    }

    async fn spend_credits(&self, user_id: &str, cost: i64) -> Result<bool, RepositoryError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).sub(cost),
            )
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::Credits.gte(cost))
            .exec(&self.db)
            .await?;

        let spent = result.rows_affected == 1;
        tracing::debug!(user_id, cost, spent, "Credit spend");
        Ok(spent)
    }

    async fn add_credits(&self, user_id: &str, amount: i64) -> Result<(), RepositoryError> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(amount),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn create_transaction(
        &self,
        user_id: &str,
        plan_id: &str,
        amount: i64,
        credits: i64,
    ) -> Result<TransactionRecord, RepositoryError> {
        let transaction = transactions::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            plan_id: Set(plan_id.to_string()),
            amount: Set(amount),
            credits: Set(credits),
            is_paid: Set(false),
            created_at: Set(now_millis()),
        };

        let model = transaction.insert(&self.db).await?;
        Ok(TransactionRecord::from(model))
    }

    async fn find_transaction(
        &self,
        id: &str,
    ) -> Result<Option<TransactionRecord>, RepositoryError> {
        let model = transactions::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(TransactionRecord::from))
    }

    async fn settle_transaction(&self, id: &str) -> Result<Option<i64>, RepositoryError> {
        let txn = self.db.begin().await?;

        // Flip is_paid only from false so a replayed event cannot credit twice
        let flipped = transactions::Entity::update_many()
            .col_expr(transactions::Column::IsPaid, Expr::value(true))
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::IsPaid.eq(false))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            return Ok(None);
        }

        let transaction = transactions::Entity::find_by_id(id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("transaction {}", id)))?;

        let credited = users::Entity::update_many()
            .col_expr(
                users::Column::Credits,
                Expr::col(users::Column::Credits).add(transaction.credits),
            )
            .filter(users::Column::Id.eq(transaction.user_id.as_str()))
            .exec(&txn)
            .await?;
        if credited.rows_affected == 0 {
            return Err(RepositoryError::NotFound(format!(
                "user {}",
                transaction.user_id
            )));
        }

        txn.commit().await?;
        tracing::info!(
            "Settled transaction {}: +{} credits for {}",
            id,
            transaction.credits,
            transaction.user_id
        );
        Ok(Some(transaction.credits))
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            credits: model.credits,
            created_at: model.created_at,
        }
    }
}

impl From<transactions::Model> for TransactionRecord {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            plan_id: model.plan_id,
            amount: model.amount,
            credits: model.credits,
            is_paid: model.is_paid,
        }
    }
}
