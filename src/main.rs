use intake_voice::{
    completion::{CompletionProvider, CompletionRequester, OpenAiClient},
    config::Config,
    db,
    history::{HistoryStore, MemoryHistoryStore, PgHistoryStore},
    AppState,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let config = Config::from_env().expect("Invalid configuration");
    let system_prompt = config.system_prompt().expect("Failed to load system prompt");

    let history: Arc<dyn HistoryStore> = match config.database_url.as_deref() {
        Some(db_url) => {
            tracing::info!("Initializing PostgreSQL chat history...");
            let db_pool = db::create_pool(db_url, config.database_max_connections)
                .expect("Failed to create database pool.");
            let store = PgHistoryStore::new(db_pool);

            // Unreachable at startup is not fatal: reads degrade to empty
            // history and the schema step is retried on first use.
            match store.ensure_schema().await {
                Ok(()) => tracing::info!("✅ Chat history schema ready"),
                Err(e) => tracing::error!("❌ Failed to prepare chat history schema: {}", e),
            }
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not found. Chat history will be kept in memory only.");
            Arc::new(MemoryHistoryStore::new())
        }
    };

    let completion = match config.openai_api_key.clone() {
        Some(api_key) => {
            tracing::info!("Initializing OpenAI client ({})...", config.openai_model);
            let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiClient::new(
                api_key,
                config.openai_base_url.clone(),
                config.openai_model.clone(),
            ));
            Some(CompletionRequester::new(history.clone(), provider, system_prompt))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not found. /api/story will answer with an error.");
            None
        }
    };

    let shared_state = Arc::new(AppState { history, completion });
    let app = intake_voice::app(shared_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,intake_voice=trace,sqlx=info,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,intake_voice=info,sqlx=warn,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();

    tracing::info!("🎙️ Voice intake starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    let build_mode = if cfg!(debug_assertions) {
        "development"
    } else {
        "production"
    };
    tracing::info!("Build mode: {}", build_mode);
    tracing::info!("Log level: {}", log_level);

    let db_configured = std::env::var("DATABASE_URL").is_ok();
    let openai_configured = std::env::var("OPENAI_API_KEY").is_ok();
    tracing::info!(
        "Configuration - Database: {}, OpenAI: {}",
        if db_configured { "✅" } else { "❌" },
        if openai_configured { "✅" } else { "❌" }
    );

    Ok(())
}
