//! An umbrella module for the Ollama provider

mod api;
mod provider;

pub use self::provider::OllamaProvider;
