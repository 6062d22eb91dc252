use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::dto::*;
use crate::api::error::AppError;
use crate::api::routes::AppState;
use crate::auth::AuthUser;

#[utoipa::path(
    post,
    path = "/api/message/text",
    request_body = TextMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = MessageResponse),
        (status = 400, description = "Empty prompt", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not enough credits", body = ErrorResponse),
        (status = 404, description = "Chat not found", body = ErrorResponse),
        (status = 500, description = "Upstream or storage failure", body = ErrorResponse)
    )
)]
pub async fn text_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<TextMessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload?;

    let reply = state
        .messages
        .send_text(&user, &req.chat_id, &req.prompt)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        reply,
    }))
}

#[utoipa::path(
    post,
    path = "/api/message/image",
    request_body = ImageMessageRequest,
    responses(
        (status = 200, description = "Hosted image reply", body = MessageResponse),
        (status = 400, description = "Empty prompt", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not enough credits", body = ErrorResponse),
        (status = 404, description = "Chat not found", body = ErrorResponse),
        (status = 500, description = "Upstream or storage failure", body = ErrorResponse)
    )
)]
pub async fn image_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ImageMessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload?;

    let reply = state
        .messages
        .send_image(&user, &req.chat_id, &req.prompt, req.is_published)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        reply,
    }))
}
