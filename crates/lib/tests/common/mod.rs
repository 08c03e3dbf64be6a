//! Shared helpers for gateway integration tests: serve a router on a free port with fake
//! collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wathiq::config::{Config, DeploymentConfig};
use wathiq::gateway::{self, GatewayState};
use wathiq::llm::{ChatMessage, ChatResponse, LlmBackend, LlmError, ToolDefinition};
use wathiq::pipeline::{Pipeline, Timeouts};
use wathiq::store::MemoryStore;

/// Backend with a fixed answer (or a fixed failure) that counts calls.
pub struct ScriptedLlm {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn answering(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedLlm {
    async fn chat(
        &self,
        _model: &str,
        _messages: Vec<ChatMessage>,
        _tools: Option<Vec<ToolDefinition>>,
    ) -> Result<ChatResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(text) => Ok(ChatResponse::text(text)),
            None => Err(LlmError::Api("502 Bad Gateway".to_string())),
        }
    }
}

pub struct TestGateway {
    pub base_url: String,
    pub store: MemoryStore,
    pub llm: Arc<ScriptedLlm>,
    pub deployment: DeploymentConfig,
}

impl TestGateway {
    /// Wait until the detached ticket writes have landed (or give up after ~2s).
    pub async fn wait_for_tickets(&self, count: usize) -> Vec<wathiq::store::Ticket> {
        for _ in 0..40 {
            let tickets = self.store.tickets().await;
            if tickets.len() >= count {
                return tickets;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.store.tickets().await
    }
}

/// Serve `deployment` on 127.0.0.1 with an in-memory store. The server task is left running when
/// the test ends.
pub async fn spawn_gateway(deployment: DeploymentConfig, llm: ScriptedLlm) -> TestGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();

    let store = MemoryStore::new();
    let llm = Arc::new(llm);
    let mut config = Config::default();
    config.gateway.port = port;
    config.deployment = deployment.clone();
    let pipeline = Pipeline::new(
        deployment.clone(),
        llm.clone(),
        Arc::new(store.clone()),
        &config.ai.model,
        Timeouts {
            ai: Duration::from_millis(500),
            store: Duration::from_millis(200),
        },
    );
    let app = gateway::router(GatewayState::new(config, pipeline));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestGateway {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        llm,
        deployment,
    }
}
