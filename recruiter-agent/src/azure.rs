//! Azure AI Foundry agents service client.
//!
//! # Wire protocol
//!
//! Every request carries `?api-version=<version>` and
//! `Authorization: Bearer <token>`. One `invoke` is:
//!
//! ```text
//! POST   {endpoint}/threads/{thread}/messages          {"role":"user","content":prompt}
//! POST   {endpoint}/threads/{thread}/runs              {"assistant_id":agent}
//! GET    {endpoint}/threads/{thread}/runs/{run}        polled until terminal
//! GET    {endpoint}/threads/{thread}/messages?order=asc&run_id={run}
//! ```
//!
//! `ureq` is blocking; each HTTP call runs inside `spawn_blocking` and polling
//! sleeps on the tokio timer between calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use recruiter_core::{AgentId, AgentMessage, AzureAiOptions, MessageRole, RunId, ThreadId};

use crate::error::{http_err, AgentError};
use crate::invoker::AgentInvoker;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const PAGE_LIMIT: &str = "100";

// ---------------------------------------------------------------------------
// Agent definitions
// ---------------------------------------------------------------------------

/// A persistent agent as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: AgentId,
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Request body for creating an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewAgent {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }

    /// Still worth polling.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RunObject {
    id: String,
    status: RunStatus,
    #[serde(default)]
    last_error: Option<RunErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
struct RunErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// `None` while the run is pending; otherwise its final outcome.
fn settle(thread: &ThreadId, run: &RunObject) -> Option<Result<RunId, AgentError>> {
    match run.status {
        RunStatus::Completed => Some(Ok(RunId(run.id.clone()))),
        status if status.is_pending() => None,
        status => {
            let message = match &run.last_error {
                Some(RunErrorDetail {
                    code: Some(code),
                    message: Some(message),
                }) => format!("{code}: {message}"),
                Some(RunErrorDetail {
                    message: Some(message),
                    ..
                }) => message.clone(),
                Some(RunErrorDetail {
                    code: Some(code), ..
                }) => code.clone(),
                _ => "no error details".to_string(),
            };
            Some(Err(AgentError::RunFailed {
                thread: thread.clone(),
                run: RunId(run.id.clone()),
                status: status.as_str().to_string(),
                message,
            }))
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    data: Vec<ThreadMessage>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    id: String,
    role: String,
    #[serde(default)]
    content: Vec<ContentPart>,
    #[serde(default)]
    created_at: i64,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    value: String,
}

impl ThreadMessage {
    /// Text content only; other content kinds (images, files) are skipped.
    fn into_agent_message(self) -> AgentMessage {
        let role = match self.role.as_str() {
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::User,
        };
        let content = self
            .content
            .into_iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.map(|t| t.value))
            .collect::<String>();
        AgentMessage {
            role,
            content,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0)
                .unwrap_or_else(Utc::now),
        }
    }
}

// ---------------------------------------------------------------------------
// Blocking REST layer
// ---------------------------------------------------------------------------

struct RestClient {
    http: ureq::Agent,
    endpoint: String,
    api_version: String,
    token: String,
}

impl RestClient {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.http
            .request(method, url)
            .query("api-version", &self.api_version)
            .set("Authorization", &format!("Bearer {}", self.token))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, AgentError> {
        let url = self.url(path);
        let mut request = self.request("GET", &url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request.call().map_err(|e| http_err(&url, e))?;
        read_json(&url, response)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T, AgentError> {
        let url = self.url(path);
        let response = self
            .request("POST", &url)
            .send_json(body)
            .map_err(|e| http_err(&url, e))?;
        read_json(&url, response)
    }

    fn delete(&self, path: &str) -> Result<(), AgentError> {
        let url = self.url(path);
        self.request("DELETE", &url)
            .call()
            .map_err(|e| http_err(&url, e))?;
        Ok(())
    }

    fn create_thread(&self) -> Result<ThreadId, AgentError> {
        let thread: IdObject = self.post("threads", json!({}))?;
        Ok(ThreadId(thread.id))
    }

    fn post_message(&self, thread: &ThreadId, prompt: &str) -> Result<(), AgentError> {
        let _: IdObject = self.post(
            &format!("threads/{thread}/messages"),
            json!({ "role": "user", "content": prompt }),
        )?;
        Ok(())
    }

    fn create_run(&self, thread: &ThreadId, agent: &AgentId) -> Result<RunObject, AgentError> {
        self.post(
            &format!("threads/{thread}/runs"),
            json!({ "assistant_id": agent.0 }),
        )
    }

    fn get_run(&self, thread: &ThreadId, run: &str) -> Result<RunObject, AgentError> {
        self.get(&format!("threads/{thread}/runs/{run}"), &[])
    }

    fn run_messages(&self, thread: &ThreadId, run: &RunId) -> Result<Vec<AgentMessage>, AgentError> {
        let path = format!("threads/{thread}/messages");
        let mut messages = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut query = vec![
                ("order", "asc"),
                ("run_id", run.0.as_str()),
                ("limit", PAGE_LIMIT),
            ];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let page: MessagePage = self.get(&path, &query)?;
            after = page.data.last().map(|m| m.id.clone());
            messages.extend(page.data.into_iter().map(ThreadMessage::into_agent_message));
            if !page.has_more || after.is_none() {
                break;
            }
        }
        messages.retain(|m| m.role == MessageRole::Assistant);
        Ok(messages)
    }
}

fn read_json<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T, AgentError> {
    let body = response.into_string().map_err(|e| AgentError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(serde_json::from_str(&body)?)
}

// ---------------------------------------------------------------------------
// AzureAgentsClient
// ---------------------------------------------------------------------------

/// [`AgentInvoker`] backed by the Azure AI Foundry agents REST API.
#[derive(Clone)]
pub struct AzureAgentsClient {
    rest: Arc<RestClient>,
    agent: Option<AgentId>,
    poll_interval: Duration,
    run_timeout: Duration,
}

impl std::fmt::Debug for AzureAgentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureAgentsClient")
            .field("endpoint", &self.rest.endpoint)
            .field("api_version", &self.rest.api_version)
            .field("agent", &self.agent)
            .field("poll_interval", &self.poll_interval)
            .field("run_timeout", &self.run_timeout)
            .finish_non_exhaustive()
    }
}

impl AzureAgentsClient {
    /// Client bound to the configured agent. Requires a valid endpoint, an
    /// agent id, and a token.
    pub fn from_options(options: &AzureAiOptions) -> Result<Self, AgentError> {
        options.validate()?;
        let client = Self::admin(options)?;
        Ok(client.with_agent(AgentId(options.agent_id.trim().to_string())))
    }

    /// Client without a bound agent, for administration calls. Only the
    /// endpoint and token are required.
    pub fn admin(options: &AzureAiOptions) -> Result<Self, AgentError> {
        options.validate_endpoint()?;
        let token = options.require_token()?.to_string();
        let http = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();
        Ok(AzureAgentsClient {
            rest: Arc::new(RestClient {
                http,
                endpoint: options.endpoint.trim().trim_end_matches('/').to_string(),
                api_version: options.api_version.clone(),
                token,
            }),
            agent: None,
            poll_interval: Duration::from_millis(options.poll_interval_ms.max(1)),
            run_timeout: Duration::from_secs(options.run_timeout_secs),
        })
    }

    /// Same connection, invoking `agent`.
    pub fn with_agent(mut self, agent: AgentId) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn agent(&self) -> Option<&AgentId> {
        self.agent.as_ref()
    }

    pub async fn get_agent(&self, id: &AgentId) -> Result<AgentDefinition, AgentError> {
        let path = format!("assistants/{id}");
        self.blocking(move |rest| rest.get(&path, &[])).await
    }

    pub async fn create_agent(&self, agent: &NewAgent) -> Result<AgentDefinition, AgentError> {
        let body = serde_json::to_value(agent)?;
        let created: AgentDefinition = self.blocking(move |rest| rest.post("assistants", body)).await?;
        tracing::info!(agent = %created.id, model = %created.model, "created agent");
        Ok(created)
    }

    pub async fn delete_agent(&self, id: &AgentId) -> Result<(), AgentError> {
        let path = format!("assistants/{id}");
        self.blocking(move |rest| rest.delete(&path)).await?;
        tracing::info!(agent = %id, "deleted agent");
        Ok(())
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, AgentError>
    where
        T: Send + 'static,
        F: FnOnce(&RestClient) -> Result<T, AgentError> + Send + 'static,
    {
        let rest = Arc::clone(&self.rest);
        tokio::task::spawn_blocking(move || f(&rest))
            .await
            .map_err(|err| AgentError::Protocol(format!("request task join error: {err}")))?
    }

    async fn wait_for_run(&self, thread: &ThreadId, mut run: RunObject) -> Result<RunId, AgentError> {
        let deadline = tokio::time::Instant::now() + self.run_timeout;
        loop {
            if let Some(outcome) = settle(thread, &run) {
                return outcome;
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AgentError::Timeout {
                    thread: thread.clone(),
                    run: RunId(run.id),
                    timeout_secs: self.run_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            let t = thread.clone();
            let id = run.id.clone();
            run = self.blocking(move |rest| rest.get_run(&t, &id)).await?;
            tracing::debug!(thread = %thread, run = %run.id, status = run.status.as_str(), "polled run");
        }
    }
}

#[async_trait]
impl AgentInvoker for AzureAgentsClient {
    async fn create_thread(&self) -> Result<ThreadId, AgentError> {
        let thread = self.blocking(|rest| rest.create_thread()).await?;
        tracing::debug!(thread = %thread, "created thread");
        Ok(thread)
    }

    async fn invoke(
        &self,
        thread: &ThreadId,
        prompt: &str,
    ) -> Result<Vec<AgentMessage>, AgentError> {
        let agent = self
            .agent
            .clone()
            .ok_or_else(|| AgentError::Protocol("no agent id bound to this client".to_string()))?;

        let t = thread.clone();
        let p = prompt.to_string();
        self.blocking(move |rest| rest.post_message(&t, &p)).await?;

        let t = thread.clone();
        let run = self.blocking(move |rest| rest.create_run(&t, &agent)).await?;
        tracing::debug!(thread = %thread, run = %run.id, "started run");

        let run_id = self.wait_for_run(thread, run).await?;
        let t = thread.clone();
        let messages = self.blocking(move |rest| rest.run_messages(&t, &run_id)).await?;
        tracing::debug!(thread = %thread, messages = messages.len(), "run completed");
        Ok(messages)
    }

    async fn delete_thread(&self, thread: &ThreadId) -> Result<(), AgentError> {
        let path = format!("threads/{thread}");
        self.blocking(move |rest| rest.delete(&path)).await?;
        tracing::debug!(thread = %thread, "deleted thread");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn options() -> AzureAiOptions {
        AzureAiOptions {
            endpoint: "https://example.services.ai.azure.com/api/projects/demo/".to_string(),
            agent_id: "asst_123".to_string(),
            token: Some("secret".to_string()),
            ..AzureAiOptions::default()
        }
    }

    fn run(json: serde_json::Value) -> RunObject {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn from_options_binds_agent_and_normalizes_endpoint() {
        let client = AzureAgentsClient::from_options(&options()).unwrap();
        assert_eq!(client.agent(), Some(&AgentId::from("asst_123")));
        assert_eq!(
            client.rest.url("threads"),
            "https://example.services.ai.azure.com/api/projects/demo/threads"
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let client = AzureAgentsClient::from_options(&options()).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("asst_123"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let opts = AzureAiOptions {
            token: None,
            ..options()
        };
        let err = AzureAgentsClient::from_options(&opts).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
        assert!(err.to_string().contains("azure_ai.token"));
    }

    #[test]
    fn admin_client_does_not_need_agent_id() {
        let opts = AzureAiOptions {
            agent_id: String::new(),
            ..options()
        };
        assert!(AzureAgentsClient::from_options(&opts).is_err());
        let admin = AzureAgentsClient::admin(&opts).unwrap();
        assert!(admin.agent().is_none());
    }

    #[tokio::test]
    async fn invoke_without_agent_is_rejected_before_any_request() {
        let admin = AzureAgentsClient::admin(&options()).unwrap();
        let err = admin
            .invoke(&ThreadId::from("thread_1"), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Protocol(_)));
    }

    #[rstest]
    #[case("queued")]
    #[case("in_progress")]
    #[case("cancelling")]
    fn pending_runs_keep_polling(#[case] status: &str) {
        let r = run(json!({ "id": "run_1", "status": status }));
        assert!(settle(&ThreadId::from("t"), &r).is_none());
    }

    #[test]
    fn completed_run_yields_run_id() {
        let r = run(json!({ "id": "run_1", "status": "completed", "last_error": null }));
        let id = settle(&ThreadId::from("t"), &r).unwrap().unwrap();
        assert_eq!(id, RunId::from("run_1"));
    }

    #[rstest]
    #[case("failed", json!({ "code": "rate_limit_exceeded", "message": "slow down" }), "rate_limit_exceeded: slow down")]
    #[case("expired", serde_json::Value::Null, "no error details")]
    #[case("requires_action", serde_json::Value::Null, "no error details")]
    #[case("cancelled", json!({ "message": "cancelled by user" }), "cancelled by user")]
    #[case("something_new", serde_json::Value::Null, "no error details")]
    fn terminal_non_completed_runs_fail(
        #[case] status: &str,
        #[case] last_error: serde_json::Value,
        #[case] expected: &str,
    ) {
        let r = run(json!({ "id": "run_9", "status": status, "last_error": last_error }));
        let err = settle(&ThreadId::from("thread_1"), &r).unwrap().unwrap_err();
        match err {
            AgentError::RunFailed {
                thread,
                run,
                message,
                ..
            } => {
                assert_eq!(thread, ThreadId::from("thread_1"));
                assert_eq!(run, RunId::from("run_9"));
                assert_eq!(message, expected);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn message_text_parts_are_concatenated() {
        let page: MessagePage = serde_json::from_value(json!({
            "object": "list",
            "data": [{
                "id": "msg_1",
                "role": "assistant",
                "created_at": 1_700_000_000,
                "content": [
                    { "type": "text", "text": { "value": "# CV\n", "annotations": [] } },
                    { "type": "image_file", "image_file": { "file_id": "f" } },
                    { "type": "text", "text": { "value": "Jane Doe", "annotations": [] } }
                ]
            }],
            "has_more": false
        }))
        .unwrap();
        let messages: Vec<AgentMessage> = page
            .data
            .into_iter()
            .map(ThreadMessage::into_agent_message)
            .collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[0].content, "# CV\nJane Doe");
        assert_eq!(messages[0].created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn new_agent_omits_unset_fields() {
        let body = serde_json::to_value(NewAgent {
            model: "gpt-4o".to_string(),
            name: Some("Helper".to_string()),
            ..NewAgent::default()
        })
        .unwrap();
        assert_eq!(body, json!({ "model": "gpt-4o", "name": "Helper" }));
    }
}
