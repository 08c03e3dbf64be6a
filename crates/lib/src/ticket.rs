//! Ticket recording: one append-only ticket per handled message, written off the reply path.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::channels::InboundMessage;
use crate::config::{TicketLabel, TicketPolicy};
use crate::store::{NewTicket, RecordStore};
use crate::strategy::ReplyKind;

/// Status and tag for a reply kind.
pub fn label_for(policy: &TicketPolicy, kind: ReplyKind) -> &TicketLabel {
    match kind {
        ReplyKind::Menu | ReplyKind::MenuFallback => &policy.menu,
        ReplyKind::Assistant => &policy.assistant,
        ReplyKind::AssistantUnavailable => &policy.fallback,
        ReplyKind::Booked => &policy.booked,
        ReplyKind::BookingFailed => &policy.booking_failed,
    }
}

/// Build the ticket for a message and its final reply.
pub fn build_ticket(message: &InboundMessage, reply: &str, label: &TicketLabel) -> NewTicket {
    NewTicket {
        customer_name: message.sender.clone(),
        last_message: message.text.clone(),
        ai_reply: Some(reply.to_string()),
        status: label.status,
        tag: label.tag.clone(),
    }
}

#[derive(Clone)]
pub struct TicketRecorder {
    store: Arc<dyn RecordStore>,
}

impl TicketRecorder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Write the ticket in a detached task. Failures are logged and dropped; the handle is only
    /// useful to callers that want to wait for the write (tests).
    pub fn record(&self, ticket: NewTicket) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            let customer = ticket.customer_name.clone();
            match store.insert_ticket(ticket).await {
                Ok(()) => log::debug!("ticket: recorded for {}", customer),
                Err(e) => log::warn!("ticket: write for {} failed: {}", customer, e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::Channel;
    use crate::store::{MemoryStore, TicketStatus};
    use crate::testing::FailingStore;

    #[test]
    fn labels_follow_policy() {
        let policy = TicketPolicy::default();
        assert_eq!(label_for(&policy, ReplyKind::MenuFallback).tag, "menu");
        assert_eq!(
            label_for(&policy, ReplyKind::AssistantUnavailable).status,
            TicketStatus::Pending
        );
        assert_eq!(
            label_for(&policy, ReplyKind::BookingFailed).status,
            TicketStatus::Escalated
        );
    }

    #[tokio::test]
    async fn record_writes_ticket() {
        let store = MemoryStore::new();
        let recorder = TicketRecorder::new(Arc::new(store.clone()));
        let message = InboundMessage::new("X", "", Channel::WhatsApp);
        let label = TicketLabel::new(TicketStatus::Automated, "menu");
        recorder
            .record(build_ticket(&message, "menu text", &label))
            .await
            .unwrap();
        let tickets = store.tickets().await;
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].customer_name, "X");
        assert_eq!(tickets[0].last_message, "");
        assert_eq!(tickets[0].ai_reply.as_deref(), Some("menu text"));
        assert_eq!(tickets[0].status, TicketStatus::Automated);
    }

    #[tokio::test]
    async fn record_failure_is_swallowed() {
        let recorder = TicketRecorder::new(Arc::new(FailingStore));
        let message = InboundMessage::new("X", "hello there", Channel::Web);
        let label = TicketLabel::new(TicketStatus::Answered, "ai");
        let handle = recorder.record(build_ticket(&message, "hi", &label));
        assert!(handle.await.is_ok());
    }
}
