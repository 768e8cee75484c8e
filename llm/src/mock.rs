use async_trait::async_trait;
use errors::CompletionError;
use parking_lot::Mutex;
use sparks_core::traits::CompletionService;
use std::collections::VecDeque;

/// Scripted completion service for tests.
///
/// Replies are consumed in order; once the script runs dry the default reply
/// is returned. Every call is recorded.
#[derive(Default)]
pub struct MockCompletionService {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    default_reply: Mutex<Option<String>>,
    sticky_error: Mutex<Option<CompletionError>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockCompletionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answers with `reply` unless something is queued.
    pub fn replying(reply: impl Into<String>) -> Self {
        let mock = Self::new();
        *mock.default_reply.lock() = Some(reply.into());
        mock
    }

    /// Fails every call with `error`.
    pub fn failing(error: CompletionError) -> Self {
        let mock = Self::new();
        *mock.sticky_error.lock() = Some(error);
        mock
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.script.lock().push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, error: CompletionError) {
        self.script.lock().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// `(system, user)` of the most recent call.
    pub fn last_call(&self) -> Option<(String, String)> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .push((system.to_string(), user.to_string()));

        if let Some(error) = self.sticky_error.lock().clone() {
            return Err(error);
        }
        if let Some(next) = self.script.lock().pop_front() {
            return next;
        }

        self.default_reply
            .lock()
            .clone()
            .ok_or_else(|| CompletionError::Upstream {
                status: None,
                reason: "MockCompletionService has no reply scripted".to_string(),
            })
    }
}
