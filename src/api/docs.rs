use axum::Json;
use utoipa::OpenApi;

use crate::api::{chat, credit, dto, message, user};
use crate::models::internal::{Chat, Role, Turn, User};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FlashGPT API",
        description = "Chat, image generation and credit endpoints"
    ),
    paths(
        message::text_message,
        message::image_message,
        chat::create_chat,
        chat::list_chats,
        chat::delete_chat,
        user::user_data,
        user::published_images,
        credit::list_plans,
        credit::purchase_plan,
        credit::stripe_webhook,
    ),
    components(schemas(
        Role,
        Turn,
        Chat,
        User,
        dto::TextMessageRequest,
        dto::ImageMessageRequest,
        dto::DeleteChatRequest,
        dto::PurchaseRequest,
        dto::MessageResponse,
        dto::ChatResponse,
        dto::ChatListResponse,
        dto::UserResponse,
        dto::PublishedImageDto,
        dto::PublishedImagesResponse,
        dto::PlanDto,
        dto::PlansResponse,
        dto::PurchaseResponse,
        dto::StatusResponse,
        dto::WebhookAck,
        dto::ErrorResponse,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
