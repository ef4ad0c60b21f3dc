//! The seam between a chat session and whatever produces completions.

use std::pin::Pin;

use futures::stream::{Stream, StreamExt};

use crate::{CompletionRequest, CompletionStreamEvent, Result};

/// A single-pass stream of text fragments.
///
/// The stream ends when the response is complete and yields an `Err` if the
/// service fails part way through.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Something that turns a transcript into a streamed completion.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Start a streamed completion for `request`.
    ///
    /// Errors raised before any text is produced (connection, authentication,
    /// HTTP status) are returned directly; later failures arrive through the
    /// stream.
    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream>;
}

/// Reduces a stream of completion events to the text fragments they carry.
///
/// Chunks without text are dropped, errors pass through, and the stream stops
/// at the `[DONE]` sentinel.
pub fn fragments<S>(events: S) -> FragmentStream
where
    S: Stream<Item = Result<CompletionStreamEvent>> + Send + 'static,
{
    let fragments = events
        .take_while(|event| {
            let more = !matches!(event, Ok(CompletionStreamEvent::Done));
            async move { more }
        })
        .filter_map(|event| async move {
            match event {
                Ok(CompletionStreamEvent::Chunk(chunk)) => chunk.text().map(str::to_string).map(Ok),
                Ok(CompletionStreamEvent::Done) => None,
                Err(err) => Some(Err(err)),
            }
        });
    Box::pin(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatCompletionChunk, ChunkChoice, ChunkDelta, Error};
    use futures::stream;

    fn chunk(text: Option<&str>) -> Result<CompletionStreamEvent> {
        Ok(CompletionStreamEvent::Chunk(ChatCompletionChunk {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    role: None,
                    content: text.map(str::to_string),
                },
                ..ChunkChoice::default()
            }],
            ..ChatCompletionChunk::default()
        }))
    }

    #[tokio::test]
    async fn keeps_text_in_order_and_stops_at_done() {
        let events = stream::iter(vec![
            chunk(Some("")),
            chunk(Some("Hi")),
            chunk(None),
            chunk(Some(" there")),
            chunk(Some("!")),
            Ok(CompletionStreamEvent::Done),
            chunk(Some("ignored")),
        ]);
        let collected: Vec<String> = fragments(events)
            .map(|fragment| fragment.unwrap())
            .collect()
            .await;
        assert_eq!(collected, vec!["Hi", " there", "!"]);
    }

    #[tokio::test]
    async fn passes_errors_through() {
        let events = stream::iter(vec![
            chunk(Some("Partial")),
            Err(Error::streaming("connection reset", None)),
        ]);
        let mut fragments = fragments(events);
        assert_eq!(fragments.next().await.unwrap().unwrap(), "Partial");
        assert!(fragments.next().await.unwrap().is_err());
    }
}
