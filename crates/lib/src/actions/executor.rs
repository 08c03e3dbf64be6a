//! Runs validated action requests against the record store.

use std::sync::Arc;
use std::time::Duration;

use super::{ActionKind, ActionRequest, UNSPECIFIED};
use crate::channels::InboundMessage;
use crate::config::DeploymentConfig;
use crate::store::{Appointment, RecordStore, StoreError};
use crate::strategy::ReplyKind;

/// Customer-facing result of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub reply: String,
    pub kind: ReplyKind,
}

/// Executes actions; one instance per process, shared by all requests.
#[derive(Clone)]
pub struct ActionExecutor {
    store: Arc<dyn RecordStore>,
    write_timeout: Duration,
}

impl ActionExecutor {
    /// `write_timeout` bounds each store write made on the reply path.
    pub fn new(store: Arc<dyn RecordStore>, write_timeout: Duration) -> Self {
        Self {
            store,
            write_timeout,
        }
    }

    /// Perform the write for `request`. A store failure or timeout is logged and turned into the
    /// deployment's retry-later text; it is not retried here.
    pub async fn execute(
        &self,
        request: &ActionRequest,
        message: &InboundMessage,
        deployment: &DeploymentConfig,
    ) -> ActionOutcome {
        match request.kind() {
            ActionKind::CreateAppointment => {
                self.create_appointment(request, message, deployment).await
            }
        }
    }

    async fn create_appointment(
        &self,
        request: &ActionRequest,
        message: &InboundMessage,
        deployment: &DeploymentConfig,
    ) -> ActionOutcome {
        // validate() guarantees a non-blank date
        let date = request.argument("date").unwrap_or_default().to_string();
        let appointment = Appointment {
            customer_name: message.sender.clone(),
            date: date.clone(),
            service: request.argument("service").unwrap_or(UNSPECIFIED).to_string(),
            details: request.argument("details").unwrap_or(UNSPECIFIED).to_string(),
        };
        let write = self.store.insert_appointment(appointment);
        let written = tokio::time::timeout(self.write_timeout, write)
            .await
            .unwrap_or(Err(StoreError::Timeout(self.write_timeout)));
        match written {
            Ok(()) => {
                log::info!("action: appointment booked for {} on {}", message.sender, date);
                ActionOutcome {
                    reply: deployment.confirmation_for(&date),
                    kind: ReplyKind::Booked,
                }
            }
            Err(e) => {
                log::warn!("action: booking for {} failed: {}", message.sender, e);
                ActionOutcome {
                    reply: deployment.booking_failed_text.clone(),
                    kind: ReplyKind::BookingFailed,
                }
            }
        }
    }
}
