//! Hand-written fakes for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::llm::{ChatMessage, ChatResponse, LlmBackend, LlmError, ToolDefinition};
use crate::store::{Appointment, NewTicket, RecordStore, StoreError};

pub enum FakeReply {
    Respond(ChatResponse),
    Fail,
    Hang,
}

/// Backend that answers every call the same way and counts calls.
pub struct FakeLlm {
    reply: FakeReply,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatMessage>>,
    last_tools: Mutex<Option<Vec<ToolDefinition>>>,
}

impl FakeLlm {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
            last_tools: Mutex::new(None),
        }
    }

    pub fn text(content: &str) -> Self {
        Self::new(FakeReply::Respond(ChatResponse::text(content)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }

    pub fn last_tool_names(&self) -> Vec<String> {
        self.last_tools
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|t| t.function.name.clone())
            .collect()
    }
}

#[async_trait]
impl LlmBackend for FakeLlm {
    async fn chat(
        &self,
        _model: &str,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<ChatResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages;
        *self.last_tools.lock().unwrap() = tools;
        match &self.reply {
            FakeReply::Respond(res) => Ok(res.clone()),
            FakeReply::Fail => Err(LlmError::Api("503 Service Unavailable".to_string())),
            FakeReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LlmError::EmptyResponse)
            }
        }
    }
}

/// Store where every operation fails.
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn insert_ticket(&self, _ticket: NewTicket) -> Result<(), StoreError> {
        Err(StoreError::Api("500 tickets unavailable".to_string()))
    }

    async fn insert_appointment(&self, _appointment: Appointment) -> Result<(), StoreError> {
        Err(StoreError::Api("500 appointments unavailable".to_string()))
    }

    async fn load_instructions(&self) -> Result<Option<String>, StoreError> {
        Err(StoreError::Api("500 settings unavailable".to_string()))
    }
}

/// Store where every operation stalls (unreachable host that never answers).
pub struct HangingStore;

#[async_trait]
impl RecordStore for HangingStore {
    async fn insert_ticket(&self, _ticket: NewTicket) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn insert_appointment(&self, _appointment: Appointment) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn load_instructions(&self) -> Result<Option<String>, StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }
}
