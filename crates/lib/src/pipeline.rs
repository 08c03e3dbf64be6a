//! Per-message pipeline: classify, respond, run any requested action, record the ticket.
//!
//! `handle` always produces reply text. The decision stage runs in its own task so that even a
//! panic inside a strategy or action ends in the fallback text rather than a dropped request.
//! The ticket write is spawned and not awaited.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::actions::ActionExecutor;
use crate::channels::InboundMessage;
use crate::config::DeploymentConfig;
use crate::intent;
use crate::llm::LlmBackend;
use crate::store::RecordStore;
use crate::strategy::{AssistantDecision, ReplyKind, Strategy, StrategyContext};
use crate::ticket::{self, TicketRecorder};

/// Result of handling one message.
pub struct Handled {
    pub reply: String,
    pub kind: ReplyKind,
    pub strategy: &'static str,
    /// The detached ticket write.
    pub ticket: JoinHandle<()>,
}

/// Bounds on the two kinds of outbound calls made while a customer waits for the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// One completion request.
    pub ai: Duration,
    /// One store request (settings read, appointment write).
    pub store: Duration,
}

/// Shared, cheaply clonable pipeline. Collaborators are constructed once per process.
#[derive(Clone)]
pub struct Pipeline {
    deployment: Arc<DeploymentConfig>,
    llm: Arc<dyn LlmBackend>,
    store: Arc<dyn RecordStore>,
    executor: ActionExecutor,
    recorder: TicketRecorder,
    model: Arc<str>,
    timeouts: Timeouts,
}

impl Pipeline {
    pub fn new(
        deployment: DeploymentConfig,
        llm: Arc<dyn LlmBackend>,
        store: Arc<dyn RecordStore>,
        model: &str,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            deployment: Arc::new(deployment),
            executor: ActionExecutor::new(store.clone(), timeouts.store),
            recorder: TicketRecorder::new(store.clone()),
            llm,
            store,
            model: Arc::from(model),
            timeouts,
        }
    }

    pub fn deployment(&self) -> &DeploymentConfig {
        &self.deployment
    }

    /// Handle one message end to end.
    pub async fn handle(&self, message: InboundMessage) -> Handled {
        let selector = intent::classify(&message.text, &self.deployment);
        let strategy = Strategy::select(selector, &self.deployment);
        let strategy_name = strategy.name();
        log::debug!(
            "pipeline: {:?} message from {} -> {}",
            message.channel,
            message.sender,
            strategy_name
        );

        let (reply, kind) = self.decide(strategy, message.clone()).await;

        let label = ticket::label_for(&self.deployment.ticket_policy, kind);
        let ticket = self
            .recorder
            .record(ticket::build_ticket(&message, &reply, label));
        Handled {
            reply,
            kind,
            strategy: strategy_name,
            ticket,
        }
    }

    /// Respond and, for an action request, execute it. Runs in a separate task; a panic there
    /// is logged and replaced by the fallback text.
    async fn decide(&self, strategy: Strategy, message: InboundMessage) -> (String, ReplyKind) {
        let this = self.clone();
        let strategy_name = strategy.name();
        let task = tokio::spawn(async move {
            let ctx = StrategyContext {
                deployment: &this.deployment,
                llm: this.llm.as_ref(),
                store: this.store.as_ref(),
                model: &this.model,
                ai_timeout: this.timeouts.ai,
                settings_timeout: this.timeouts.store,
            };
            let output = strategy.respond(&message, &ctx).await;
            match output.decision {
                AssistantDecision::TextReply { content } => (content, output.kind),
                AssistantDecision::ActionRequest(request) => {
                    log::info!(
                        "pipeline: running action {} for {}",
                        request.name(),
                        message.sender
                    );
                    let outcome = this
                        .executor
                        .execute(&request, &message, &this.deployment)
                        .await;
                    (outcome.reply, outcome.kind)
                }
            }
        });
        match task.await {
            Ok(decided) => decided,
            Err(e) => {
                log::error!("pipeline: {} stage aborted: {}", strategy_name, e);
                (
                    self.deployment.fallback_text.clone(),
                    ReplyKind::AssistantUnavailable,
                )
            }
        }
    }
}
