//! Idea capture: normalization of raw text through a completion service and
//! the review-then-persist workflow around it.

pub mod normalizer;
pub mod prompt;
pub mod workflow;

pub use normalizer::{Normalizer, parse_completion, strip_fences};
pub use workflow::CaptureWorkflow;
