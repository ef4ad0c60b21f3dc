use serde::{Deserialize, Serialize};

use crate::types::{KnownModel, Role, Turn};

/// A transcript entry as sent on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestMessage {
    /// The role of the message.
    pub role: Role,

    /// The text of the message.
    pub content: String,
}

impl From<&Turn> for RequestMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            content: turn.content().to_string(),
        }
    }
}

/// Body of a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: KnownModel,

    /// The full transcript, oldest first.
    pub messages: Vec<RequestMessage>,

    /// Upper bound on the length of the response.
    pub max_tokens: u32,

    /// Whether the response is streamed.
    pub stream: bool,
}

impl CompletionRequest {
    /// Build a streaming request that replays every turn of `transcript`.
    pub fn streaming(model: KnownModel, transcript: &[Turn], max_tokens: u32) -> Self {
        Self {
            model,
            messages: transcript.iter().map(RequestMessage::from).collect(),
            max_tokens,
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn streaming_request_replays_transcript() {
        let transcript = vec![
            Turn::user("Hello"),
            Turn::assistant("Hi there!"),
            Turn::user("How are you?"),
        ];
        let request =
            CompletionRequest::streaming(KnownModel::Llama31_8bInstant, &transcript, 1024);

        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    {"role": "user", "content": "Hello"},
                    {"role": "assistant", "content": "Hi there!"},
                    {"role": "user", "content": "How are you?"}
                ],
                "max_tokens": 1024,
                "stream": true
            })
        );
    }
}
