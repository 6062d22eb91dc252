use axum::{extract::State, Json};

use crate::api::dto::*;
use crate::api::error::AppError;
use crate::api::routes::AppState;
use crate::auth::AuthUser;

#[utoipa::path(
    get,
    path = "/api/user/data",
    responses(
        (status = 200, description = "Authenticated user with current balance", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn user_data(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user,
    })
}

#[utoipa::path(
    get,
    path = "/api/user/published-images",
    responses(
        (status = 200, description = "Community gallery, newest first", body = PublishedImagesResponse)
    )
)]
pub async fn published_images(
    State(state): State<AppState>,
) -> Result<Json<PublishedImagesResponse>, AppError> {
    let images = state
        .chats
        .published_images()
        .await?
        .into_iter()
        .map(|image| PublishedImageDto {
            image_url: image.image_url,
            user_name: image.user_name,
        })
        .collect();

    Ok(Json(PublishedImagesResponse {
        success: true,
        images,
    }))
}
