use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::internal::{Chat, Turn, User};
use crate::services::payment::Plan;

// ==================== REQUEST DTOs ====================

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageRequest {
    pub chat_id: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageMessageRequest {
    pub chat_id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteChatRequest {
    pub chat_id: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub plan_id: String,
}

// ==================== RESPONSE DTOs ====================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub reply: Turn,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub success: bool,
    pub chat: Chat,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatListResponse {
    pub success: bool,
    pub chats: Vec<Chat>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedImageDto {
    pub image_url: String,
    pub user_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublishedImagesResponse {
    pub success: bool,
    pub images: Vec<PublishedImageDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub success: bool,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// US dollars
    pub price: i64,
    pub credits: i64,
    pub features: Vec<String>,
}

impl From<&Plan> for PlanDto {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.to_string(),
            name: plan.name.to_string(),
            price: plan.price,
            credits: plan.credits,
            features: plan.features.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<PlanDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}
