//! Chat application module for interactive conversations over Groq.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! groqchat client library. It supports:
//!
//! - Streaming responses with real-time fragment display
//! - Slash commands for session control
//! - A fixed registry of selectable models
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`store`]: Transcript, active model and usage counters
//! - [`session`]: One streamed request/response round at a time
//! - [`commands`]: Slash command parsing and handling

pub mod commands;
pub mod config;
pub mod session;
pub mod store;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ASSISTANT_LABEL, ChatSession, RoundState, SessionStats};
pub use store::SessionStore;
