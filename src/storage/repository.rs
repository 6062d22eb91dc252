use async_trait::async_trait;
use sea_orm::{prelude::*, sea_query::Expr, PaginatorTrait, QueryOrder, Set, TransactionTrait};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::internal::{now_millis, Chat, Role, Turn};
use crate::storage::entities::{chats, messages};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DbError(#[from] sea_orm::DbErr),
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Image turn flagged for the public gallery.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedImage {
    pub image_url: String,
    pub user_name: String,
}

// ============================================
// TRAIT DEFINITION
// ============================================
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create_chat(
        &self,
        user_id: &str,
        user_name: &str,
        name: &str,
    ) -> Result<Chat, RepositoryError>;

    /// Chat with its turns, only if owned by `user_id`.
    async fn find_chat(&self, chat_id: &str, user_id: &str)
        -> Result<Option<Chat>, RepositoryError>;

    async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError>;

    /// Returns false when no chat matched.
    async fn delete_chat(&self, chat_id: &str, user_id: &str) -> Result<bool, RepositoryError>;

    /// Appends turns in order, all or nothing.
    async fn append_turns(&self, chat_id: &str, turns: &[Turn]) -> Result<(), RepositoryError>;

    async fn count_turns(&self, chat_id: &str) -> Result<u64, RepositoryError>;

    async fn published_images(&self) -> Result<Vec<PublishedImage>, RepositoryError>;
}

// ============================================
// IMPLEMENTATION STRUCT
// ============================================
pub struct SeaOrmChatRepository {
    db: DatabaseConnection,
}

impl SeaOrmChatRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_turns(&self, chat_id: &str) -> Result<Vec<Turn>, RepositoryError> {
        let models = messages::Entity::find()
            .filter(messages::Column::ChatId.eq(chat_id))
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Turn::try_from).collect()
    }
}

#[async_trait]
impl ChatRepository for SeaOrmChatRepository {
    async fn create_chat(
        &self,
        user_id: &str,
        user_name: &str,
        name: &str,
    ) -> Result<Chat, RepositoryError> {
        let now = now_millis();
        let chat = chats::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            user_name: Set(user_name.to_string()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = chat.insert(&self.db).await?;
        tracing::info!("Created chat: {}", model.id);

        Ok(Chat::from_parts(model, Vec::new()))
    }

    async fn find_chat(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Option<Chat>, RepositoryError> {
        let model = chats::Entity::find_by_id(chat_id.to_string())
            .filter(chats::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => {
                let turns = self.load_turns(&model.id).await?;
                Ok(Some(Chat::from_parts(model, turns)))
            }
            None => Ok(None),
        }
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        let chat_models = chats::Entity::find()
            .filter(chats::Column::UserId.eq(user_id))
            .order_by_desc(chats::Column::UpdatedAt)
            .all(&self.db)
            .await?;

        let ids: Vec<String> = chat_models.iter().map(|c| c.id.clone()).collect();
        let message_models = messages::Entity::find()
            .filter(messages::Column::ChatId.is_in(ids))
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await?;

        let mut by_chat: HashMap<String, Vec<Turn>> = HashMap::new();
        for model in message_models {
            let chat_id = model.chat_id.clone();
            by_chat.entry(chat_id).or_default().push(Turn::try_from(model)?);
        }

        Ok(chat_models
            .into_iter()
            .map(|model| {
                let turns = by_chat.remove(&model.id).unwrap_or_default();
                Chat::from_parts(model, turns)
            })
            .collect())
    }

    async fn delete_chat(&self, chat_id: &str, user_id: &str) -> Result<bool, RepositoryError> {
        let txn = self.db.begin().await?;

        // Write first so the transaction takes the write lock up front
        let deleted = chats::Entity::delete_many()
            .filter(chats::Column::Id.eq(chat_id))
            .filter(chats::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Ok(false);
        }

        messages::Entity::delete_many()
            .filter(messages::Column::ChatId.eq(chat_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!("Deleted chat: {}", chat_id);
        Ok(true)
    }

    async fn append_turns(&self, chat_id: &str, turns: &[Turn]) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let touched = chats::Entity::update_many()
            .col_expr(chats::Column::UpdatedAt, Expr::value(now_millis()))
            .filter(chats::Column::Id.eq(chat_id))
            .exec(&txn)
            .await?;
        if touched.rows_affected == 0 {
            return Err(RepositoryError::NotFound(format!("chat {}", chat_id)));
        }

        for turn in turns {
            let message = messages::ActiveModel {
                chat_id: Set(chat_id.to_string()),
                role: Set(turn.role.to_string()),
                content: Set(turn.content.clone()),
                is_image: Set(turn.is_image),
                is_published: Set(turn.is_published),
                timestamp: Set(turn.timestamp),
                ..Default::default()
            };
            message.insert(&txn).await?;
        }

        txn.commit().await?;
        tracing::debug!("Appended {} turns to chat {}", turns.len(), chat_id);
        Ok(())
    }

    async fn count_turns(&self, chat_id: &str) -> Result<u64, RepositoryError> {
        let count = messages::Entity::find()
            .filter(messages::Column::ChatId.eq(chat_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn published_images(&self) -> Result<Vec<PublishedImage>, RepositoryError> {
        let rows = messages::Entity::find()
            .filter(messages::Column::IsImage.eq(true))
            .filter(messages::Column::IsPublished.eq(true))
            .find_also_related(chats::Entity)
            .order_by_desc(messages::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(message, chat)| {
                chat.map(|chat| PublishedImage {
                    image_url: message.content,
                    user_name: chat.user_name,
                })
            })
            .collect())
    }
}

// ============================================
// Conversions
// ============================================

impl Chat {
    fn from_parts(model: chats::Model, messages: Vec<Turn>) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            user_name: model.user_name,
            name: model.name,
            messages,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<messages::Model> for Turn {
    type Error = RepositoryError;

    fn try_from(model: messages::Model) -> Result<Self, Self::Error> {
        let role: Role = model
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Corrupt(format!("message {}: {}", model.id, e)))?;

        Ok(Self {
            role,
            content: model.content,
            timestamp: model.timestamp,
            is_image: model.is_image,
            is_published: model.is_published,
        })
    }
}
