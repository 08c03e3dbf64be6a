//! Record store: append-only tickets and appointments, plus the optional settings record.
//!
//! The pipeline only sees the [`RecordStore`] trait. [`SupabaseStore`] talks to a
//! Supabase/PostgREST project; [`MemoryStore`] keeps records in process (tests, local runs).

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a ticket stands from the support team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Automated,
    Answered,
    Pending,
    Escalated,
}

/// Ticket as written by the core; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub customer_name: String,
    pub last_message: String,
    pub ai_reply: Option<String>,
    pub status: TicketStatus,
    pub tag: String,
}

/// Persisted ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub customer_name: String,
    pub last_message: String,
    pub ai_reply: Option<String>,
    pub status: TicketStatus,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted appointment. `date` is stored exactly as the customer/assistant gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub customer_name: String,
    pub date: String,
    pub service: String,
    pub details: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("store api error: {0}")]
    Api(String),
    #[error("store request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Insert-only record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<(), StoreError>;

    async fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError>;

    /// Free-text system instruction from the settings record. `Ok(None)` when there is no record
    /// or it has no instruction.
    async fn load_instructions(&self) -> Result<Option<String>, StoreError>;
}
