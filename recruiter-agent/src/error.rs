use thiserror::Error;

use recruiter_core::{RunId, ThreadId};

/// Error surface for agent invocation, administration, and CV generation.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP {status} from {url}: {body}")]
    Http { status: u16, url: String, body: String },

    #[error("transport error calling {url}: {message}")]
    Transport { url: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] recruiter_core::ConfigError),

    #[error("template error: {0}")]
    Render(#[from] recruiter_renderer::RenderError),

    #[error("run {run} on thread {thread} ended with status '{status}': {message}")]
    RunFailed {
        thread: ThreadId,
        run: RunId,
        status: String,
        message: String,
    },

    #[error("run {run} on thread {thread} did not finish within {timeout_secs}s")]
    Timeout {
        thread: ThreadId,
        run: RunId,
        timeout_secs: u64,
    },

    #[error("agent protocol error: {0}")]
    Protocol(String),
}

pub(crate) fn http_err(url: &str, err: ureq::Error) -> AgentError {
    match err {
        ureq::Error::Status(status, response) => AgentError::Http {
            status,
            url: url.to_string(),
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => AgentError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}
