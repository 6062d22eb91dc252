use axum::{
    body::Bytes,
    extract::rejection::JsonRejection,
    extract::State,
    http::{header, HeaderMap},
    Json,
};

use crate::api::dto::*;
use crate::api::error::AppError;
use crate::api::routes::AppState;
use crate::auth::AuthUser;
use crate::services::payment::{find_plan, SignatureValidation, WebhookEvent, PLANS};

#[utoipa::path(
    get,
    path = "/api/credit/plan",
    responses(
        (status = 200, description = "Purchasable credit plans", body = PlansResponse)
    )
)]
pub async fn list_plans() -> Json<PlansResponse> {
    Json(PlansResponse {
        success: true,
        plans: PLANS.iter().map(PlanDto::from).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/api/credit/purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Checkout session opened", body = PurchaseResponse),
        (status = 400, description = "Unknown plan", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn purchase_plan(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let Json(req) = payload?;

    let plan = find_plan(&req.plan_id)
        .ok_or_else(|| AppError::Validation("Invalid plan".to_string()))?;

    let transaction = state
        .users
        .create_transaction(&user.id, plan.id, plan.price, plan.credits)
        .await?;

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(state.config.client_url.as_str());

    let url = state
        .payments
        .create_checkout(plan, &transaction.id, origin)
        .await?;

    tracing::info!(
        "Opened checkout for transaction {} ({} credits, user {})",
        transaction.id,
        plan.credits,
        user.id
    );

    Ok(Json(PurchaseResponse { success: true, url }))
}

/// Stripe event sink. Only signed `checkout.session.completed` events tagged
/// with this app settle a transaction; everything else is acknowledged.
#[utoipa::path(
    post,
    path = "/api/stripe",
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Bad signature or payload", body = ErrorResponse)
    )
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());
    let now = chrono::Utc::now().timestamp();

    match state.webhook.validate(signature, &body, now) {
        SignatureValidation::Valid => {}
        SignatureValidation::Missing => {
            return Err(AppError::Validation(
                "Webhook Error: missing signature".to_string(),
            ))
        }
        SignatureValidation::Expired => {
            return Err(AppError::Validation(
                "Webhook Error: signature expired".to_string(),
            ))
        }
        SignatureValidation::Invalid => {
            return Err(AppError::Validation(
                "Webhook Error: invalid signature".to_string(),
            ))
        }
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Webhook Error: {}", e)))?;

    match event.completed_transaction_id() {
        Some(transaction_id) => {
            if state.users.settle_transaction(transaction_id).await?.is_none() {
                tracing::warn!(
                    "Ignoring checkout for unknown or already paid transaction {}",
                    transaction_id
                );
            }
        }
        None => tracing::debug!("Unhandled webhook event type: {}", event.event_type),
    }

    Ok(Json(WebhookAck { received: true }))
}
