use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Per-session usage counters.
///
/// `total_tokens_used` is an estimate built from [`word_count`]; it is not the
/// provider's tokenizer and should be displayed as an approximation.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageCounters {
    /// Estimated tokens spent across completed rounds.
    pub total_tokens_used: u64,

    /// Number of completed rounds (one user turn plus one assistant turn).
    pub conversation_count: u64,
}

impl UsageCounters {
    /// Create counters with the given values.
    pub fn new(total_tokens_used: u64, conversation_count: u64) -> Self {
        Self {
            total_tokens_used,
            conversation_count,
        }
    }
}

impl Add for UsageCounters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            total_tokens_used: self
                .total_tokens_used
                .saturating_add(rhs.total_tokens_used),
            conversation_count: self
                .conversation_count
                .saturating_add(rhs.conversation_count),
        }
    }
}

/// Whitespace-delimited word count, used as a stand-in for a token count.
pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Estimated token cost of one round.
pub fn estimate_round_tokens(prompt: &str, response: &str) -> u64 {
    word_count(prompt) + word_count(response)
}
