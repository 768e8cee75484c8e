//! Completion service clients.
//!
//! - [`AnthropicCompletionService`]: Anthropic Messages API over reqwest
//! - [`MockCompletionService`]: scripted replies for tests

pub mod anthropic;
pub mod mock;

pub use anthropic::AnthropicCompletionService;
pub use mock::MockCompletionService;
