use serde::{Deserialize, Serialize};

/// One server-sent event decoded from a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionStreamEvent {
    /// A `chat.completion.chunk` payload.
    Chunk(ChatCompletionChunk),

    /// The `[DONE]` sentinel that terminates the stream.
    Done,
}

/// A streamed slice of a chat completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Identifier shared by every chunk of one completion.
    #[serde(default)]
    pub id: String,

    /// Model that produced the chunk.
    #[serde(default)]
    pub model: String,

    /// Incremental choices; chat sessions only request one.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,

    /// Provider-specific extension carrying the real token usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_groq: Option<GroqExtension>,
}

impl ChatCompletionChunk {
    /// Text carried by the first choice, if any.
    ///
    /// Empty deltas (role-only or finish chunks) yield `None`.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|text| !text.is_empty())
    }

    /// Finish reason of the first choice, if the completion ended in this chunk.
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_deref())
    }
}

/// One choice inside a chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Index of the choice.
    #[serde(default)]
    pub index: u32,

    /// Incremental content.
    #[serde(default)]
    pub delta: ChunkDelta,

    /// Set on the last chunk of the choice.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental content of a choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkDelta {
    /// Role, sent on the first chunk only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Text fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Groq's `x_groq` extension object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroqExtension {
    /// Request identifier.
    #[serde(default)]
    pub id: Option<String>,

    /// Provider-reported usage, present on the final chunk.
    #[serde(default)]
    pub usage: Option<ReportedUsage>,
}

/// Token usage as reported by the provider.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportedUsage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,

    /// Tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Sum of the two.
    #[serde(default)]
    pub total_tokens: u64,
}

/// An error object delivered inside the event stream.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamErrorEnvelope {
    pub error: StreamErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_chunk_carries_role_only() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"chatcmpl-1","object":"chat.completion.chunk","created":1,"model":"gemma2-9b-it","choices":[{"index":0,"delta":{"role":"assistant","content":""},"logprobs":null,"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.id, "chatcmpl-1");
        assert_eq!(chunk.text(), None);
        assert_eq!(chunk.finish_reason(), None);
    }

    #[test]
    fn content_chunk() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"chatcmpl-1","model":"gemma2-9b-it","choices":[{"index":0,"delta":{"content":" there"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.text(), Some(" there"));
    }

    #[test]
    fn final_chunk_reports_usage() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"chatcmpl-1","model":"gemma2-9b-it","choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"x_groq":{"id":"req_1","usage":{"prompt_tokens":12,"completion_tokens":3,"total_tokens":15}}}"#,
        )
        .unwrap();
        assert_eq!(chunk.text(), None);
        assert_eq!(chunk.finish_reason(), Some("stop"));
        let usage = chunk.x_groq.and_then(|x| x.usage).unwrap();
        assert_eq!(usage.total_tokens, 15);
    }
}
