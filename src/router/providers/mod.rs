//! Backend provider adapters.
//!
//! Each adapter translates the unified call shape into its backend's
//! request/response shape and normalizes token usage back to the common
//! structure. Base URLs are injectable for tests.

mod base;
mod deepseek;
mod openai;
mod openrouter;
mod traits;

pub use deepseek::DeepSeekAdapter;
pub use openai::{OpenAiAdapter, OpenAiImageAdapter};
pub use openrouter::OpenRouterAdapter;
pub use traits::ProviderAdapter;
