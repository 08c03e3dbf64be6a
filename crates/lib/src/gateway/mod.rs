//! Gateway: HTTP endpoints for the WhatsApp webhook and the web chat widget.
//!
//! One port serves `GET /` (health), `/webhook` (Twilio WhatsApp, TwiML replies) and
//! `/api/ai` (web widget, JSON replies).

mod server;

pub use server::{build_pipeline, router, run_gateway, GatewayState, WEBHOOK_HEALTH};
