use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::dto::*;
use crate::api::error::AppError;
use crate::api::routes::AppState;
use crate::auth::AuthUser;

const DEFAULT_CHAT_NAME: &str = "New Chat";

#[utoipa::path(
    post,
    path = "/api/chat/create",
    responses(
        (status = 200, description = "Empty chat created", body = ChatResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn create_chat(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ChatResponse>, AppError> {
    let chat = state
        .chats
        .create_chat(&user.id, &user.name, DEFAULT_CHAT_NAME)
        .await?;

    Ok(Json(ChatResponse {
        success: true,
        chat,
    }))
}

#[utoipa::path(
    get,
    path = "/api/chat/get",
    responses(
        (status = 200, description = "Caller's chats, most recent first", body = ChatListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_chats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ChatListResponse>, AppError> {
    let chats = state.chats.list_chats(&user.id).await?;

    Ok(Json(ChatListResponse {
        success: true,
        chats,
    }))
}

#[utoipa::path(
    post,
    path = "/api/chat/delete",
    request_body = DeleteChatRequest,
    responses(
        (status = 200, description = "Chat deleted", body = StatusResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Chat not found", body = ErrorResponse)
    )
)]
pub async fn delete_chat(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<DeleteChatRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(req) = payload?;

    if !state.chats.delete_chat(&req.chat_id, &user.id).await? {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    Ok(Json(StatusResponse {
        success: true,
        message: "Chat Deleted".to_string(),
    }))
}
