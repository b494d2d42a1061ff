//! The seam between prompt construction and the remote agent.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use recruiter_core::{AgentMessage, ThreadId};

use crate::error::AgentError;

/// A remote conversational agent addressed through threads.
///
/// `invoke` posts one user message to `thread`, runs the agent over it, and
/// returns the assistant messages produced by that run, oldest first.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn create_thread(&self) -> Result<ThreadId, AgentError>;

    async fn invoke(&self, thread: &ThreadId, prompt: &str)
        -> Result<Vec<AgentMessage>, AgentError>;

    async fn delete_thread(&self, thread: &ThreadId) -> Result<(), AgentError>;
}

#[async_trait]
impl<T: AgentInvoker + ?Sized> AgentInvoker for &T {
    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        (**self).create_thread().await
    }

    async fn invoke(
        &self,
        thread: &ThreadId,
        prompt: &str,
    ) -> Result<Vec<AgentMessage>, AgentError> {
        (**self).invoke(thread, prompt).await
    }

    async fn delete_thread(&self, thread: &ThreadId) -> Result<(), AgentError> {
        (**self).delete_thread(thread).await
    }
}

#[async_trait]
impl<T: AgentInvoker + ?Sized> AgentInvoker for Box<T> {
    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        (**self).create_thread().await
    }

    async fn invoke(
        &self,
        thread: &ThreadId,
        prompt: &str,
    ) -> Result<Vec<AgentMessage>, AgentError> {
        (**self).invoke(thread, prompt).await
    }

    async fn delete_thread(&self, thread: &ThreadId) -> Result<(), AgentError> {
        (**self).delete_thread(thread).await
    }
}

/// Offline invoker: every prompt comes back as a single assistant message.
#[derive(Debug, Default)]
pub struct EchoInvoker {
    next_thread: AtomicUsize,
    open: Mutex<BTreeSet<String>>,
}

impl EchoInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Threads created and not yet deleted.
    pub fn open_threads(&self) -> usize {
        self.open.lock().map(|open| open.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AgentInvoker for EchoInvoker {
    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        let n = self.next_thread.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("echo-thread-{n}");
        if let Ok(mut open) = self.open.lock() {
            open.insert(id.clone());
        }
        Ok(ThreadId(id))
    }

    async fn invoke(
        &self,
        thread: &ThreadId,
        prompt: &str,
    ) -> Result<Vec<AgentMessage>, AgentError> {
        let known = self
            .open
            .lock()
            .map(|open| open.contains(&thread.0))
            .unwrap_or(false);
        if !known {
            return Err(AgentError::Protocol(format!("unknown thread {thread}")));
        }
        Ok(vec![AgentMessage::assistant(prompt)])
    }

    async fn delete_thread(&self, thread: &ThreadId) -> Result<(), AgentError> {
        if let Ok(mut open) = self.open.lock() {
            open.remove(&thread.0);
        }
        Ok(())
    }
}
