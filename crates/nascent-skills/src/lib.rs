//! Hosted model collaborators: OpenRouter chat completion and multi-model
//! learning, plugged into the core through its collaborator traits.

pub use nascent_core::{ChatCompletion, MultiModelLearn};

mod openrouter;

pub use openrouter::{
    FreeModel, LlmMode, OpenRouterClient, OpenRouterSettings, DEFAULT_MODEL, FREE_MODELS,
    LEARNING_MODELS, OPENROUTER_API_URL,
};
