// Public modules
pub mod chat_completion_chunk;
pub mod completion_request;
pub mod model;
pub mod turn;
pub mod usage;

// Re-exports
pub use chat_completion_chunk::{
    ChatCompletionChunk, ChunkChoice, ChunkDelta, CompletionStreamEvent, GroqExtension,
    ReportedUsage,
};
pub(crate) use chat_completion_chunk::StreamErrorEnvelope;
pub use completion_request::{CompletionRequest, RequestMessage};
pub use model::{BOUND_STEP, KnownModel, MIN_BOUND, ModelDescriptor, PREFERRED_BOUND, registry};
pub use turn::{Role, Turn};
pub use usage::{UsageCounters, estimate_round_tokens, word_count};
