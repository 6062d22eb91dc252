use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashgpt_server::{
    api::routes,
    auth,
    config::Config,
    services::{self, GroqClient, ImageKitClient, MessageService, StripeClient, WebhookVerifier},
    storage::{
        self, user_repository::DEFAULT_CREDITS, SeaOrmChatRepository, SeaOrmUserRepository,
        UserRepository,
    },
};

#[derive(Parser)]
#[command(name = "flashgpt-server", version, about = "FlashGPT chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an account and print its id and a session token
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = DEFAULT_CREDITS)]
        credits: i64,
    },
    /// Print a fresh session token for an existing account
    IssueToken {
        #[arg(long)]
        user_id: String,
    },
    /// Add credits to an account
    GrantCredits {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        credits: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load config
    let config = Arc::new(Config::load()?);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "flashgpt_server={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database
    let db = storage::init_db(&config.database_url, config.max_connections).await?;
    let users = Arc::new(SeaOrmUserRepository::new(db.clone()));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, db, users).await,
        Command::CreateUser {
            name,
            email,
            credits,
        } => {
            let user = users.create_user(&name, &email, credits).await?;
            let token = auth::issue_token(&user.id, &config.jwt_secret, config.jwt_ttl_days)?;
            println!("id:    {}", user.id);
            println!("token: {}", token);
            Ok(())
        }
        Command::IssueToken { user_id } => {
            let user = users
                .find_by_id(&user_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no user with id {}", user_id))?;
            println!(
                "{}",
                auth::issue_token(&user.id, &config.jwt_secret, config.jwt_ttl_days)?
            );
            Ok(())
        }
        Command::GrantCredits { user_id, credits } => {
            users.add_credits(&user_id, credits).await?;
            tracing::info!("Granted {} credits to {}", credits, user_id);
            Ok(())
        }
    }
}

async fn serve(
    config: Arc<Config>,
    db: sea_orm::DatabaseConnection,
    users: Arc<SeaOrmUserRepository>,
) -> anyhow::Result<()> {
    let http = services::http_client(config.http_timeout())?;

    let chats = Arc::new(SeaOrmChatRepository::new(db));

    let llm = Arc::new(
        GroqClient::new(
            config.groq_base_url.clone(),
            config.groq_api_key.clone(),
            config.groq_model.clone(),
        )
        .with_http_client(http.clone()),
    );

    let imagekit = Arc::new(
        ImageKitClient::new(
            config.imagekit_url_endpoint.clone(),
            config.imagekit_upload_url.clone(),
            config.imagekit_private_key.clone(),
            config.imagekit_folder.clone(),
        )
        .with_http_client(http.clone()),
    );

    let stripe = Arc::new(
        StripeClient::new(
            config.stripe_api_base.clone(),
            config.stripe_secret_key.clone(),
        )
        .with_http_client(http),
    );

    let messages = Arc::new(MessageService::new(
        chats.clone(),
        users.clone(),
        llm,
        imagekit.clone(),
        imagekit,
        config.imagekit_folder.clone(),
    ));

    let state = routes::AppState {
        config: config.clone(),
        chats,
        users,
        messages,
        payments: stripe,
        webhook: Arc::new(WebhookVerifier::new(&config.stripe_webhook_secret)),
    };

    let app = routes::create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Chat model: {}", config.groq_model);

    axum::serve(listener, app).await?;

    Ok(())
}
