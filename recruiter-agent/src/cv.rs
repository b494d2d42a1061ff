//! CV generation: render the CV prompt and send it to the agent on a fresh thread.

use recruiter_core::join_contents;
use recruiter_renderer::{PromptBuilder, TemplateSource};

use crate::conversation::Conversation;
use crate::error::AgentError;
use crate::invoker::AgentInvoker;

pub struct CvGenerator<I> {
    invoker: I,
    builder: PromptBuilder,
}

impl<I: AgentInvoker> CvGenerator<I> {
    pub fn new(invoker: I, builder: PromptBuilder) -> Self {
        CvGenerator { invoker, builder }
    }

    /// Generator using the `generate_cv` template from `source`.
    pub fn from_source(invoker: I, source: &dyn TemplateSource) -> Result<Self, AgentError> {
        Ok(Self::new(invoker, PromptBuilder::cv(source)?))
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// The prompt `generate` would send, without contacting the agent.
    pub fn prompt_for(&self, profile: &str, offer: Option<&str>) -> String {
        self.builder.build(profile, offer)
    }

    /// Every run gets its own thread, deleted afterwards whether or not the
    /// run succeeded. Reply messages are concatenated in order.
    pub async fn generate(&self, profile: &str, offer: Option<&str>) -> Result<String, AgentError> {
        let prompt = self.prompt_for(profile, offer);
        let tailored = offer.is_some_and(|o| !o.trim().is_empty());
        tracing::info!(tailored, prompt_chars = prompt.chars().count(), "generating CV");

        let conversation = Conversation::start(&self.invoker).await?;
        let result = conversation
            .send(&prompt)
            .await
            .map(|messages| join_contents(&messages));
        conversation.finish(result).await
    }

    /// Structured inputs are pretty-printed before substitution.
    pub async fn generate_from_json(
        &self,
        profile: &serde_json::Value,
        offer: Option<&serde_json::Value>,
    ) -> Result<String, AgentError> {
        let profile = serde_json::to_string_pretty(profile)?;
        let offer = offer.map(|o| serde_json::to_string_pretty(o)).transpose()?;
        self.generate(&profile, offer.as_deref()).await
    }
}
