//! Credit purchases through Stripe Checkout.
//!
//! A purchase creates an unpaid transaction locally, then opens a hosted
//! checkout session carrying the transaction id in its metadata. Stripe later
//! posts `checkout.session.completed` to the webhook, which is verified with
//! [`WebhookVerifier`] before the transaction is settled.

use async_trait::async_trait;
use ring::hmac;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag written into checkout metadata so events from other apps sharing the
/// Stripe account are ignored.
pub const APP_ID: &str = "flashgpt";

/// Maximum age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    #[serde(rename = "_id")]
    pub id: &'static str,
    pub name: &'static str,
    /// US dollars
    pub price: i64,
    pub credits: i64,
    pub features: &'static [&'static str],
}

pub const PLANS: &[Plan] = &[
    Plan {
        id: "basic",
        name: "Basic",
        price: 10,
        credits: 100,
        features: &[
            "100 text generations",
            "50 image generations",
            "Standard support",
            "Access to basic models",
        ],
    },
    Plan {
        id: "pro",
        name: "Pro",
        price: 20,
        credits: 500,
        features: &[
            "500 text generations",
            "200 image generations",
            "Priority support",
            "Access to pro models",
            "Faster response time",
        ],
    },
    Plan {
        id: "premium",
        name: "Premium",
        price: 30,
        credits: 1000,
        features: &[
            "1000 text generations",
            "500 image generations",
            "24/7 VIP support",
            "Access to premium models",
            "Dedicated account manager",
        ],
    },
];

pub fn find_plan(id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|p| p.id == id)
}

/// Opens hosted checkout sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the URL the buyer should be redirected to.
    async fn create_checkout(
        &self,
        plan: &Plan,
        transaction_id: &str,
        origin: &str,
    ) -> Result<String, PaymentError>;
}

#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(api_base: String, secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout(
        &self,
        plan: &Plan,
        transaction_id: &str,
        origin: &str,
    ) -> Result<String, PaymentError> {
        let expires_at = chrono::Utc::now().timestamp() + 30 * 60;
        let form = [
            ("mode", "payment".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                plan.name.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                (plan.price * 100).to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", format!("{}/loading", origin)),
            ("cancel_url", origin.to_string()),
            ("metadata[transactionId]", transaction_id.to_string()),
            ("metadata[appId]", APP_ID.to_string()),
            ("expires_at", expires_at.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PaymentError::ApiError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let session: CheckoutSession = response.json().await?;
        session
            .url
            .ok_or_else(|| PaymentError::InvalidResponse("session has no url".to_string()))
    }
}

#[derive(Deserialize)]
struct CheckoutSession {
    url: Option<String>,
}

// ============================================
// Webhooks
// ============================================

/// Webhook signature validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureValidation {
    Valid,
    Invalid,
    /// Timestamp outside the tolerance window
    Expired,
    Missing,
}

/// Verifies the `Stripe-Signature` header: `t=<unix>,v1=<hex hmac>[,v1=..]`,
/// where the HMAC-SHA256 covers `"{t}.{raw body}"`.
pub struct WebhookVerifier {
    key: hmac::Key,
}

impl WebhookVerifier {
    pub fn new(signing_secret: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, signing_secret.as_bytes()),
        }
    }

    pub fn sign(&self, timestamp: i64, body: &[u8]) -> String {
        let tag = hmac::sign(&self.key, &signed_payload(timestamp, body));
        hex::encode(tag.as_ref())
    }

    pub fn validate(&self, signature_header: Option<&str>, body: &[u8], now: i64) -> SignatureValidation {
        let Some(header) = signature_header else {
            return SignatureValidation::Missing;
        };

        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }

        let Some(timestamp) = timestamp else {
            return SignatureValidation::Invalid;
        };
        if signatures.is_empty() {
            return SignatureValidation::Invalid;
        }

        let expected = self.sign(timestamp, body);
        let matched = signatures.iter().any(|candidate| {
            subtle::ConstantTimeEq::ct_eq(candidate.as_bytes(), expected.as_bytes()).into()
        });

        if !matched {
            SignatureValidation::Invalid
        } else if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            SignatureValidation::Expired
        } else {
            SignatureValidation::Valid
        }
    }
}

fn signed_payload(timestamp: i64, body: &[u8]) -> Vec<u8> {
    let mut payload = format!("{}.", timestamp).into_bytes();
    payload.extend_from_slice(body);
    payload
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: Value,
}

impl WebhookEvent {
    /// Transaction id of a completed checkout started by this app.
    pub fn completed_transaction_id(&self) -> Option<&str> {
        if self.event_type != "checkout.session.completed" {
            return None;
        }
        let metadata = self.data.object.get("metadata")?;
        if metadata.get("appId")?.as_str()? != APP_ID {
            return None;
        }
        metadata.get("transactionId")?.as_str()
    }
}
