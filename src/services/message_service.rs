use std::sync::Arc;

use crate::models::internal::{now_millis, Turn, User};
use crate::services::image_service::{png_data_uri, ImageError, ImageGenerator, MediaStore};
use crate::services::llm_client::{ChatCompletion, ChatMessage, LlmError, SYSTEM_PROMPT};
use crate::storage::repository::{ChatRepository, RepositoryError};
use crate::storage::user_repository::UserRepository;

/// Credits debited per text reply.
pub const TEXT_COST: i64 = 1;
/// Credits debited per generated image.
pub const IMAGE_COST: i64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,
    #[error("You don't have enough credits to use this feature!")]
    InsufficientCredits,
    #[error("Chat not found")]
    ChatNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}

/// Text and image message flows.
///
/// Credits are reserved with an atomic conditional debit before any upstream
/// call, and refunded if anything afterwards fails. Turns are only written
/// once the reply exists, so a failed request leaves the chat untouched.
pub struct MessageService {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
    llm: Arc<dyn ChatCompletion>,
    images: Arc<dyn ImageGenerator>,
    media: Arc<dyn MediaStore>,
    image_folder: String,
}

impl MessageService {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        users: Arc<dyn UserRepository>,
        llm: Arc<dyn ChatCompletion>,
        images: Arc<dyn ImageGenerator>,
        media: Arc<dyn MediaStore>,
        image_folder: String,
    ) -> Self {
        Self {
            chats,
            users,
            llm,
            images,
            media,
            image_folder,
        }
    }

    /// Answer a prompt with the chat model and record both turns.
    ///
    /// Only the system instruction and the new prompt are sent; earlier turns
    /// of the chat are not forwarded.
    pub async fn send_text(
        &self,
        user: &User,
        chat_id: &str,
        prompt: &str,
    ) -> Result<Turn, MessageError> {
        if prompt.trim().is_empty() {
            return Err(MessageError::EmptyPrompt);
        }
        self.reserve(user, chat_id, TEXT_COST).await?;

        let result = self.text_reply(chat_id, prompt).await;
        self.settle(user, TEXT_COST, result).await
    }

    /// Generate an image, rehost it in the media store and record both turns.
    pub async fn send_image(
        &self,
        user: &User,
        chat_id: &str,
        prompt: &str,
        is_published: bool,
    ) -> Result<Turn, MessageError> {
        if prompt.trim().is_empty() {
            return Err(MessageError::EmptyPrompt);
        }
        self.reserve(user, chat_id, IMAGE_COST).await?;

        let result = self.image_reply(chat_id, prompt, is_published).await;
        self.settle(user, IMAGE_COST, result).await
    }

    async fn text_reply(&self, chat_id: &str, prompt: &str) -> Result<Turn, MessageError> {
        let user_turn = Turn::user_text(prompt);
        let reply_text = self
            .llm
            .complete(vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ])
            .await?;
        let reply = Turn::assistant_text(reply_text);

        self.chats
            .append_turns(chat_id, &[user_turn, reply.clone()])
            .await?;
        Ok(reply)
    }

    async fn image_reply(
        &self,
        chat_id: &str,
        prompt: &str,
        is_published: bool,
    ) -> Result<Turn, MessageError> {
        let user_turn = Turn::user_text(prompt);
        let file_stem = now_millis().to_string();

        let bytes = self.images.generate(prompt, &file_stem).await?;
        let url = self
            .media
            .upload(
                png_data_uri(&bytes),
                &format!("{}.png", file_stem),
                &self.image_folder,
            )
            .await?;
        let reply = Turn::assistant_image(url, is_published);

        self.chats
            .append_turns(chat_id, &[user_turn, reply.clone()])
            .await?;
        Ok(reply)
    }

    /// Balance pre-check, chat lookup, then the atomic debit.
    async fn reserve(&self, user: &User, chat_id: &str, cost: i64) -> Result<(), MessageError> {
        if user.credits < cost {
            return Err(MessageError::InsufficientCredits);
        }

        if self.chats.find_chat(chat_id, &user.id).await?.is_none() {
            return Err(MessageError::ChatNotFound);
        }

        // The pre-check above used the balance read at authentication time;
        // this is the authoritative one.
        if !self.users.spend_credits(&user.id, cost).await? {
            return Err(MessageError::InsufficientCredits);
        }
        Ok(())
    }

    async fn settle(
        &self,
        user: &User,
        cost: i64,
        result: Result<Turn, MessageError>,
    ) -> Result<Turn, MessageError> {
        if result.is_err() {
            if let Err(e) = self.users.add_credits(&user.id, cost).await {
                tracing::error!(user_id = %user.id, cost, "Credit refund failed: {}", e);
            } else {
                tracing::info!(user_id = %user.id, cost, "Refunded credits after failed request");
            }
        }
        result
    }
}
