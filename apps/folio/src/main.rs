mod chat;
mod config;
mod content;
mod errors;
mod llm_client;
mod markdown;
mod models;
mod routes;
mod state;
mod view;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::registry::WidgetRegistry;
use crate::chat::session::gemini_session_factory;
use crate::config::Config;
use crate::content::loader::{HttpMarkdownFetcher, PostContentLoader};
use crate::models::resume::ResumeDocument;
use crate::routes::build_router;
use crate::state::AppState;
use crate::view::render::PageRenderer;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio v{}", env!("CARGO_PKG_VERSION"));

    // Resume document: RESUME_PATH override or the embedded copy
    let resume = Arc::new(ResumeDocument::load(config.resume_path.as_deref())?);
    info!(
        "Resume loaded for {} ({} posts)",
        resume.personal_info.name,
        resume.blog_posts.len()
    );

    // Chat sessions are created per widget; a missing key only disables chat
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; the chat widget will be disabled");
    } else {
        info!("Chat enabled (model: {})", llm_client::MODEL);
    }
    let session_factory = gemini_session_factory(Arc::clone(&resume), config.llm_settings())
        .context("Failed to build the Gemini HTTP client")?;

    // Remote markdown for blog posts
    let fetcher = HttpMarkdownFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to build the markdown HTTP client")?;
    let loader = PostContentLoader::new(Arc::new(fetcher));

    let pages = PageRenderer::new(&config.assets_dir).context("Failed to load page templates")?;

    // Idle chat widgets are swept in the background
    let widgets = WidgetRegistry::new();
    let idle_ttl = Duration::from_secs(config.chat_idle_ttl_secs);
    widgets.spawn_sweeper(idle_ttl, idle_ttl.clamp(Duration::from_secs(1), SWEEP_INTERVAL));
    info!("Chat widgets expire after {}s idle", config.chat_idle_ttl_secs);

    let state = AppState {
        resume,
        widgets,
        session_factory,
        loader,
        pages: Arc::new(pages),
    };

    let app = build_router(state, &config.assets_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
