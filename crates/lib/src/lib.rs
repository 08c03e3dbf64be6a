//! Wathiq core library: the message pipeline (classify, respond, act, record, encode) and the
//! HTTP gateway used by the CLI.

pub mod actions;
pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod intent;
pub mod llm;
pub mod pipeline;
pub mod presets;
pub mod reply;
pub mod store;
pub mod strategy;
pub mod ticket;

#[cfg(test)]
mod testing;
