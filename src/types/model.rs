use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Smallest response-length bound accepted by any model.
pub const MIN_BOUND: u32 = 512;

/// Granularity of the response-length bound.
pub const BOUND_STEP: u32 = 512;

/// Preferred bound when the model allows it.
pub const PREFERRED_BOUND: u32 = 32768;

/// Static description of a model offered by the completion service.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ModelDescriptor {
    /// Identifier sent on the wire.
    pub id: &'static str,
    /// Human-friendly name.
    pub display_name: &'static str,
    /// Largest response-length bound the model accepts.
    pub max_tokens: u32,
    /// Organization that trained the model.
    pub developer: &'static str,
    /// One-line summary.
    pub description: &'static str,
    /// Short label describing latency.
    pub speed_label: &'static str,
}

impl ModelDescriptor {
    /// Returns the `[min, max]` range accepted for the response-length bound.
    pub fn bound_range(&self) -> (u32, u32) {
        (MIN_BOUND, self.max_tokens)
    }

    /// Returns true if `bound` is accepted by this model.
    pub fn accepts_bound(&self, bound: u32) -> bool {
        (MIN_BOUND..=self.max_tokens).contains(&bound)
    }

    /// Snaps `requested` down to the bound step and clamps it into the accepted range.
    pub fn clamp_bound(&self, requested: u32) -> u32 {
        let snapped = requested - requested % BOUND_STEP;
        snapped.clamp(MIN_BOUND, self.max_tokens)
    }

    /// The bound used when nothing else was asked for.
    pub fn default_bound(&self) -> u32 {
        PREFERRED_BOUND.min(self.max_tokens)
    }

    /// Label used by model pickers, e.g. `Gemma2-9B-IT (Ultra Fast)`.
    pub fn picker_label(&self) -> String {
        format!("{} ({})", self.display_name, self.speed_label)
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

static REGISTRY: [ModelDescriptor; 6] = [
    ModelDescriptor {
        id: "gemma2-9b-it",
        display_name: "Gemma2-9B-IT",
        max_tokens: 8192,
        developer: "Google",
        description: "Google's efficient instruction-tuned model",
        speed_label: "Ultra Fast",
    },
    ModelDescriptor {
        id: "llama-3.3-70b-versatile",
        display_name: "LLaMA3.3-70B-Versatile",
        max_tokens: 128000,
        developer: "Meta",
        description: "Meta's most versatile large language model",
        speed_label: "High Performance",
    },
    ModelDescriptor {
        id: "llama-3.1-8b-instant",
        display_name: "LLaMA3.1-8B-Instant",
        max_tokens: 128000,
        developer: "Meta",
        description: "Lightning-fast responses with great quality",
        speed_label: "Instant",
    },
    ModelDescriptor {
        id: "llama3-70b-8192",
        display_name: "LLaMA3-70B-8192",
        max_tokens: 8192,
        developer: "Meta",
        description: "Powerful model for complex reasoning",
        speed_label: "Fast",
    },
    ModelDescriptor {
        id: "llama3-8b-8192",
        display_name: "LLaMA3-8B-8192",
        max_tokens: 8192,
        developer: "Meta",
        description: "Balanced performance and efficiency",
        speed_label: "Quick",
    },
    ModelDescriptor {
        id: "mixtral-8x7b-32768",
        display_name: "Mixtral-8x7B-Instruct",
        max_tokens: 32768,
        developer: "Mistral",
        description: "Expert mixture model for diverse tasks",
        speed_label: "Optimized",
    },
];

/// Returns every registered model, in picker order.
pub fn registry() -> &'static [ModelDescriptor] {
    &REGISTRY
}

/// Models offered by the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KnownModel {
    /// Google Gemma 2 9B, instruction tuned.
    #[serde(rename = "gemma2-9b-it")]
    Gemma2_9bIt,

    /// Meta Llama 3.3 70B, versatile.
    #[default]
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33_70bVersatile,

    /// Meta Llama 3.1 8B, instant.
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31_8bInstant,

    /// Meta Llama 3 70B with an 8k window.
    #[serde(rename = "llama3-70b-8192")]
    Llama3_70b8192,

    /// Meta Llama 3 8B with an 8k window.
    #[serde(rename = "llama3-8b-8192")]
    Llama3_8b8192,

    /// Mistral Mixtral 8x7B with a 32k window.
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b32768,
}

impl KnownModel {
    /// Every known model, in registry order.
    pub const ALL: [KnownModel; 6] = [
        KnownModel::Gemma2_9bIt,
        KnownModel::Llama33_70bVersatile,
        KnownModel::Llama31_8bInstant,
        KnownModel::Llama3_70b8192,
        KnownModel::Llama3_8b8192,
        KnownModel::Mixtral8x7b32768,
    ];

    /// Returns the registry entry for this model.
    pub fn descriptor(self) -> &'static ModelDescriptor {
        let idx = match self {
            KnownModel::Gemma2_9bIt => 0,
            KnownModel::Llama33_70bVersatile => 1,
            KnownModel::Llama31_8bInstant => 2,
            KnownModel::Llama3_70b8192 => 3,
            KnownModel::Llama3_8b8192 => 4,
            KnownModel::Mixtral8x7b32768 => 5,
        };
        &REGISTRY[idx]
    }

    /// Identifier sent on the wire.
    pub fn id(self) -> &'static str {
        self.descriptor().id
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for KnownModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .into_iter()
            .find(|model| model.id() == s)
            .ok_or_else(|| Error::unknown_model(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_and_enum_agree() {
        assert_eq!(registry().len(), KnownModel::ALL.len());
        for (model, descriptor) in KnownModel::ALL.iter().zip(registry()) {
            assert_eq!(model.descriptor(), descriptor);
            assert_eq!(model.id(), descriptor.id);
        }
    }

    #[test]
    fn default_model() {
        assert_eq!(KnownModel::default(), KnownModel::Llama33_70bVersatile);
        assert_eq!(KnownModel::default().id(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!(
            "mixtral-8x7b-32768".parse::<KnownModel>().unwrap(),
            KnownModel::Mixtral8x7b32768
        );
        let err = "gpt-4o".parse::<KnownModel>().unwrap_err();
        assert!(err.is_unknown_model());
    }

    #[test]
    fn serialization_uses_wire_id() {
        let json = serde_json::to_string(&KnownModel::Gemma2_9bIt).unwrap();
        assert_eq!(json, r#""gemma2-9b-it""#);
        let model: KnownModel = serde_json::from_str(r#""llama3-8b-8192""#).unwrap();
        assert_eq!(model, KnownModel::Llama3_8b8192);
    }

    #[test]
    fn bound_clamping() {
        let gemma = KnownModel::Gemma2_9bIt.descriptor();
        assert_eq!(gemma.clamp_bound(100), 512);
        assert_eq!(gemma.clamp_bound(1000), 512);
        assert_eq!(gemma.clamp_bound(1024), 1024);
        assert_eq!(gemma.clamp_bound(32768), 8192);
        assert_eq!(gemma.default_bound(), 8192);

        let llama = KnownModel::Llama33_70bVersatile.descriptor();
        assert_eq!(llama.default_bound(), 32768);
        assert_eq!(llama.clamp_bound(u32::MAX), 128000);
    }

    #[test]
    fn bound_acceptance() {
        let mixtral = KnownModel::Mixtral8x7b32768.descriptor();
        assert!(!mixtral.accepts_bound(511));
        assert!(mixtral.accepts_bound(512));
        assert!(mixtral.accepts_bound(32768));
        assert!(!mixtral.accepts_bound(32769));
        assert_eq!(mixtral.bound_range(), (512, 32768));
    }

    #[test]
    fn picker_label() {
        assert_eq!(
            KnownModel::Llama31_8bInstant.descriptor().picker_label(),
            "LLaMA3.1-8B-Instant (Instant)"
        );
    }
}
