//! In-process record store. Used when no Supabase project is configured, and by tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Appointment, NewTicket, RecordStore, StoreError, Ticket};

#[derive(Default)]
struct Records {
    tickets: Vec<Ticket>,
    appointments: Vec<Appointment>,
    instructions: Option<String>,
}

/// In-memory store: append-only vectors behind a lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Records>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose settings record carries the given instruction.
    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        let records = Records {
            instructions: Some(instructions.into()),
            ..Records::default()
        };
        Self {
            inner: Arc::new(RwLock::new(records)),
        }
    }

    /// Snapshot of stored tickets in insertion order.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.inner.read().await.tickets.clone()
    }

    /// Snapshot of stored appointments in insertion order.
    pub async fn appointments(&self) -> Vec<Appointment> {
        self.inner.read().await.appointments.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<(), StoreError> {
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            customer_name: ticket.customer_name,
            last_message: ticket.last_message,
            ai_reply: ticket.ai_reply,
            status: ticket.status,
            tag: ticket.tag,
            created_at: chrono::Utc::now(),
        };
        self.inner.write().await.tickets.push(ticket);
        Ok(())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.inner.write().await.appointments.push(appointment);
        Ok(())
    }

    async fn load_instructions(&self) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().await.instructions.clone())
    }
}
