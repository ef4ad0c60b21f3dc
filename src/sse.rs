//! Server-Sent Events (SSE) processing for streaming completions.
//!
//! This module turns the raw byte stream of a chat completion response into a
//! stream of [`CompletionStreamEvent`]s, handling buffering across network
//! chunks, keep-alive comments and the `[DONE]` terminator.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability::{STREAM_BYTES, STREAM_ERRORS, STREAM_EVENTS};
use crate::types::StreamErrorEnvelope;
use crate::{ChatCompletionChunk, CompletionStreamEvent, Error, Result};

/// Process a stream of bytes into a stream of server-sent events.
///
/// Events are only decoded once their terminating blank line has arrived, so a
/// multi-byte character split across network chunks is reassembled before it
/// is interpreted as UTF-8.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<CompletionStreamEvent>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let stream = Box::pin(
        byte_stream
            .map(|result| {
                result.map_err(|e| {
                    Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e)))
                })
            })
            .fuse(),
    );

    let buffer: Vec<u8> = Vec::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First check if we have a complete event in the buffer
                if let Some(block) = take_block(&mut buffer) {
                    match decode_block(&block) {
                        Some(event) => {
                            count_event(&event);
                            return Some((event, (stream, buffer)));
                        }
                        None => continue,
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                    }
                    Some(Err(e)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream; a final event may lack its blank line
                        let block = std::mem::take(&mut buffer);
                        if block.iter().all(u8::is_ascii_whitespace) {
                            return None;
                        }
                        let event = decode_block(&block)?;
                        count_event(&event);
                        return Some((event, (stream, buffer)));
                    }
                }
            }
        },
    )
}

fn count_event(event: &Result<CompletionStreamEvent>) {
    match event {
        Ok(_) => STREAM_EVENTS.click(),
        Err(_) => STREAM_ERRORS.click(),
    }
}

/// Removes the first blank-line-terminated block from `buffer`.
fn take_block(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = buffer.windows(2).position(|w| w == b"\n\n")?;
    let rest = buffer.split_off(end + 2);
    let mut block = std::mem::replace(buffer, rest);
    block.truncate(end);
    Some(block)
}

/// Decodes one SSE block.
///
/// Returns `None` for blocks that carry no data, such as keep-alive comments.
fn decode_block(block: &[u8]) -> Option<Result<CompletionStreamEvent>> {
    let text = match std::str::from_utf8(block) {
        Ok(text) => text,
        Err(e) => {
            return Some(Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            )));
        }
    };

    let mut data: Option<String> = None;
    for line in text.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match data.as_mut() {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            }
        }
    }

    let data = data?;
    Some(parse_data(data.trim()))
}

/// Parse the payload of a `data:` field.
fn parse_data(data: &str) -> Result<CompletionStreamEvent> {
    if data == "[DONE]" {
        return Ok(CompletionStreamEvent::Done);
    }
    if let Ok(envelope) = serde_json::from_str::<StreamErrorEnvelope>(data) {
        return Err(Error::api(
            500,
            envelope
                .error
                .error_type
                .or_else(|| Some("stream_error".to_string())),
            envelope
                .error
                .message
                .unwrap_or_else(|| data.to_string()),
            None,
        ));
    }
    serde_json::from_str::<ChatCompletionChunk>(data)
        .map(CompletionStreamEvent::Chunk)
        .map_err(|e| {
            Error::serialization(
                format!("Failed to parse event JSON: {e}"),
                Some(Box::new(e)),
            )
        })
}
