//! Logging trait for completion client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`Groq`](crate::Groq) client.

use crate::{ChatCompletionChunk, CompletionRequest, Error};

/// A trait for logging completion client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including the outbound request and individual streamed chunks.
///
/// # Example
///
/// ```rust,ignore
/// use groqchat::{ChatCompletionChunk, ClientLogger, CompletionRequest, Error};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &CompletionRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_stream_chunk(&self, chunk: &ChatCompletionChunk) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Chunk: {}", serde_json::to_string(chunk).unwrap()).unwrap();
///     }
///
///     fn log_error(&self, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Error: {error}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &CompletionRequest);

    /// Log an individual streamed chunk.
    ///
    /// This method is called for each [`ChatCompletionChunk`] received during
    /// a streaming request, including chunks that carry no text.
    fn log_stream_chunk(&self, chunk: &ChatCompletionChunk);

    /// Log a failure, whether raised before the stream opened or while it was
    /// being read.
    fn log_error(&self, error: &Error);
}
