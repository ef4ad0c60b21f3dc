// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod render;
pub mod service;
pub mod sse;
pub mod types;

// Re-exports
pub use client::Groq;
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use service::{CompletionService, FragmentStream, fragments};
pub use sse::process_sse;
pub use types::*;
