//! Gateway HTTP server.

use crate::channels::{WebPayload, WhatsAppPayload};
use crate::config::{self, Config};
use crate::llm::{LlmBackend, OpenAiClient};
use crate::pipeline::{Pipeline, Timeouts};
use crate::reply::{self, EncodedReply};
use crate::store::{MemoryStore, RecordStore, SupabaseStore};
use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Body of `GET /webhook`, used by the telephony provider's console to check the URL.
pub const WEBHOOK_HEALTH: &str = "Webhook is running";

const WHATSAPP_ALLOW: &str = "GET, POST";
const WEB_ALLOW: &str = "POST";

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub pipeline: Pipeline,
}

impl GatewayState {
    pub fn new(config: Config, pipeline: Pipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }
}

/// Construct the AI client and record store from config and wire them into a pipeline.
/// A store URL without a key is a startup error; no URL at all falls back to the in-memory store.
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let api_key = config::resolve_ai_api_key(config);
    if api_key.is_none() {
        log::warn!(
            "no AI API key configured (OPENAI_API_KEY); assistant replies will use the fallback text"
        );
    }
    let llm: Arc<dyn LlmBackend> = Arc::new(
        OpenAiClient::new(
            config::resolve_ai_base_url(config),
            api_key,
            config.ai.timeout(),
        )
        .context("building AI client")?
        .with_sampling(config.ai.max_tokens, config.ai.temperature),
    );

    let store: Arc<dyn RecordStore> = match config::resolve_store_url(config) {
        Some(url) => {
            let key = config::resolve_store_key(config)
                .context("store url is set but no store key (SUPABASE_KEY or store.key)")?;
            log::info!("record store: supabase at {}", url);
            Arc::new(
                SupabaseStore::new(&url, key, config.store.timeout())
                    .context("building store client")?,
            )
        }
        None => {
            log::warn!("no store url configured (SUPABASE_URL); tickets are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(Pipeline::new(
        config.deployment.clone(),
        llm,
        store,
        &config.ai.model,
        Timeouts {
            ai: config.ai.timeout(),
            store: config.store.timeout(),
        },
    ))
}

/// Routes for the gateway; exposed separately from `run_gateway` so tests can serve fakes.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route(
            "/webhook",
            get(webhook_health)
                .post(whatsapp_webhook)
                .fallback(whatsapp_method_not_allowed),
        )
        .route("/api/ai", post(web_chat).fallback(web_method_not_allowed))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_gateway(config: Config) -> Result<()> {
    let pipeline = build_pipeline(&config)?;
    log::info!(
        "deployment {} ({:?} script, {:?} assistant, model {})",
        config.deployment.name,
        config.deployment.script,
        config.deployment.assistant,
        config.ai.model
    );
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let app = router(GatewayState::new(config, pipeline));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "deployment": state.pipeline.deployment().name,
        "port": state.config.gateway.port,
    }))
}

/// GET /webhook: static text, no side effects.
async fn webhook_health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        WEBHOOK_HEALTH,
    )
}

/// POST /webhook: Twilio WhatsApp form. Always answers 200 with a TwiML envelope; an undecodable
/// form is handled as an empty message so the customer still gets the menu.
async fn whatsapp_webhook(
    State(state): State<GatewayState>,
    payload: Result<Form<WhatsAppPayload>, FormRejection>,
) -> EncodedReply {
    let payload = match payload {
        Ok(Form(p)) => p,
        Err(e) => {
            log::warn!("whatsapp: undecodable webhook body: {}", e);
            WhatsAppPayload::default()
        }
    };
    let message = payload.into_inbound();
    let channel = message.channel;
    let handled = state.pipeline.handle(message).await;
    reply::encode(&handled.reply, channel)
}

/// POST /api/ai: web widget JSON. A body that is not valid JSON is the one pre-dispatch failure
/// answered with 500.
async fn web_chat(
    State(state): State<GatewayState>,
    payload: Result<Json<WebPayload>, JsonRejection>,
) -> EncodedReply {
    let payload = match payload {
        Ok(Json(p)) => p,
        Err(e) => {
            log::warn!("web: rejected request body: {}", e);
            return reply::encode_error("invalid request body");
        }
    };
    let message = payload.into_inbound(&state.pipeline.deployment().web_visitor_label);
    let channel = message.channel;
    let handled = state.pipeline.handle(message).await;
    reply::encode(&handled.reply, channel)
}

async fn whatsapp_method_not_allowed() -> EncodedReply {
    reply::method_not_allowed(WHATSAPP_ALLOW)
}

async fn web_method_not_allowed() -> EncodedReply {
    reply::method_not_allowed(WEB_ALLOW)
}
