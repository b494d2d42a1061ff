//! Thread lifecycle around one or more invocations.

use recruiter_core::{AgentMessage, ThreadId};

use crate::error::AgentError;
use crate::invoker::AgentInvoker;

/// An open thread on `invoker`. Close it with [`Conversation::close`] or
/// [`Conversation::finish`]; dropping it leaves the remote thread behind.
pub struct Conversation<'a, I: AgentInvoker + ?Sized> {
    invoker: &'a I,
    thread: ThreadId,
}

impl<'a, I: AgentInvoker + ?Sized> Conversation<'a, I> {
    pub async fn start(invoker: &'a I) -> Result<Self, AgentError> {
        let thread = invoker.create_thread().await?;
        Ok(Conversation { invoker, thread })
    }

    pub fn thread(&self) -> &ThreadId {
        &self.thread
    }

    /// One user turn; returns the agent's replies in order.
    pub async fn send(&self, prompt: &str) -> Result<Vec<AgentMessage>, AgentError> {
        self.invoker.invoke(&self.thread, prompt).await
    }

    /// Delete the thread.
    pub async fn close(self) -> Result<(), AgentError> {
        self.invoker.delete_thread(&self.thread).await
    }

    /// Delete the thread and hand back `result` unchanged. A failed delete is
    /// logged, never returned.
    pub async fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        let thread = self.thread.clone();
        if let Err(err) = self.close().await {
            tracing::warn!(thread = %thread, error = %err, "failed to delete thread");
        }
        result
    }
}
