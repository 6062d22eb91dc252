pub mod image_service;
pub mod llm_client;
pub mod message_service;
pub mod payment;

use std::time::Duration;

// Re-export for convenience
pub use image_service::{ImageGenerator, ImageKitClient, MediaStore};
pub use llm_client::{ChatCompletion, GroqClient};
pub use message_service::MessageService;
pub use payment::{PaymentGateway, StripeClient, WebhookVerifier};

/// Shared upstream HTTP client; reqwest defaults plus a request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}
