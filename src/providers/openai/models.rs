use lazy_static::lazy_static;

use crate::models::{Capability, Modalities};

pub(super) struct KnownModel {
    pub id: &'static str,
    pub context_window: u64,
    pub max_output_tokens: u64,
}

lazy_static! {
    // The OpenAI listing endpoint only returns ids and creation dates. Context
    // lengths have to be kept here and updated whenever new models are added or
    // the context length of a model changes. The catalog source usually has
    // fresher numbers; these only fill the gap when it is disabled.
    pub(super) static ref OPENAI_MODELS: [KnownModel; 7] = [
        KnownModel { id: "gpt-4o-mini", context_window: 128000, max_output_tokens: 16384 },
        KnownModel { id: "gpt-4o", context_window: 128000, max_output_tokens: 16384 },
        KnownModel { id: "gpt-4.1", context_window: 1047576, max_output_tokens: 32768 },
        KnownModel { id: "gpt-4-turbo", context_window: 128000, max_output_tokens: 4096 },
        KnownModel { id: "gpt-4", context_window: 8192, max_output_tokens: 8192 },
        KnownModel { id: "gpt-3.5-turbo", context_window: 16385, max_output_tokens: 4096 },
        KnownModel { id: "o3-mini", context_window: 200000, max_output_tokens: 100000 },
    ];
}

pub(super) fn known_model(id: &str) -> Option<&'static KnownModel> {
    OPENAI_MODELS.iter().find(|m| m.id == id)
}

/// Guesses modalities and capabilities from an OpenAI model id.
pub(super) fn infer_from_id(id: &str) -> (Modalities, Vec<Capability>) {
    if id.contains("embedding") {
        return (Modalities::new(["text"], ["embeddings"]), vec![Capability::Batch]);
    }

    if id.starts_with("dall-e") || id.starts_with("gpt-image") {
        return (Modalities::new(["text"], ["image"]), vec![]);
    }

    if id.starts_with("tts") || id.contains("-tts") {
        return (Modalities::new(["text"], ["audio"]), vec![]);
    }

    if id.starts_with("whisper") || id.contains("transcribe") {
        return (Modalities::new(["audio"], ["text"]), vec![]);
    }

    if id.contains("moderation") {
        return (Modalities::new(["text", "image"], ["moderation"]), vec![]);
    }

    let mut capabilities = vec![Capability::Streaming, Capability::FunctionCalling];
    let mut input = vec!["text"];
    let mut output = vec!["text"];

    if id.starts_with("gpt-4o") || id.starts_with("gpt-4.1") || id.starts_with("gpt-5") {
        input.push("image");
        capabilities.extend([Capability::Vision, Capability::StructuredOutput]);
    }

    if id.starts_with('o') && id.chars().nth(1).is_some_and(|c| c.is_ascii_digit()) {
        capabilities.extend([Capability::Reasoning, Capability::StructuredOutput]);
    }

    if id.contains("audio") {
        input.push("audio");
        output.push("audio");
    }

    (Modalities::new(input, output), capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_id() {
        let (modalities, capabilities) = infer_from_id("text-embedding-3-large");
        assert!(modalities.produces("embeddings"));
        assert!(!modalities.produces("text"));
        assert_eq!(capabilities, vec![Capability::Batch]);

        let (modalities, capabilities) = infer_from_id("gpt-4o-2024-08-06");
        assert!(modalities.accepts("image"));
        assert!(capabilities.contains(&Capability::Vision));

        let (_, capabilities) = infer_from_id("o3-mini");
        assert!(capabilities.contains(&Capability::Reasoning));

        let (modalities, _) = infer_from_id("gpt-4o-audio-preview");
        assert!(modalities.produces("audio"));
        assert!(modalities.produces("text"));

        let (modalities, _) = infer_from_id("dall-e-3");
        assert!(modalities.produces("image"));
    }

    #[test]
    fn test_known_model() {
        assert_eq!(known_model("gpt-4").unwrap().context_window, 8192);
        assert!(known_model("gpt-4-0613").is_none());
    }
}
