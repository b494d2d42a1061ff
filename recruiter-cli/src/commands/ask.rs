//! `recruiter ask`: a fixed list of questions over one thread.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use recruiter_agent::{AgentInvoker, AzureAgentsClient, Conversation, EchoInvoker, NewAgent};

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Questions, asked in order.
    #[arg(required = true, value_name = "QUESTION")]
    pub questions: Vec<String>,

    /// Create a temporary agent for this run and delete it afterwards.
    #[arg(long, requires = "model")]
    pub create_agent: bool,

    /// Model deployment for the temporary agent.
    #[arg(long, requires = "create_agent")]
    pub model: Option<String>,

    /// Display name of the temporary agent.
    #[arg(long, requires = "create_agent")]
    pub name: Option<String>,

    /// Description of the temporary agent.
    #[arg(long, requires = "create_agent")]
    pub description: Option<String>,

    /// System instructions for the temporary agent.
    #[arg(long, requires = "create_agent")]
    pub instructions: Option<String>,

    /// Echo questions back instead of calling the agent.
    #[arg(long)]
    pub offline: bool,
}

impl AskArgs {
    pub fn run(self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        if self.offline {
            if self.create_agent {
                tracing::warn!("--create-agent has no effect with --offline");
            }
            let invoker = EchoInvoker::new();
            return super::block_on(ask_all(&invoker, &self.questions, &mut stdout))?;
        }

        let options = super::load_options()?;
        if !self.create_agent {
            let client = AzureAgentsClient::from_options(&options).context(
                "invalid Azure AI settings (see recruiter.yaml or RECRUITER_AZURE_AI__*)",
            )?;
            return super::block_on(ask_all(&client, &self.questions, &mut stdout))?;
        }

        let admin = AzureAgentsClient::admin(&options)
            .context("invalid Azure AI settings (see recruiter.yaml or RECRUITER_AZURE_AI__*)")?;
        let definition = NewAgent {
            model: self.model.clone().unwrap_or_default(),
            name: self.name.clone(),
            description: self.description.clone(),
            instructions: self.instructions.clone(),
        };
        super::block_on(async {
            let agent = admin
                .create_agent(&definition)
                .await
                .context("failed to create agent")?;
            let client = admin.clone().with_agent(agent.id.clone());
            let result = ask_all(&client, &self.questions, &mut stdout).await;
            if let Err(err) = admin.delete_agent(&agent.id).await {
                tracing::warn!(agent = %agent.id, error = %err, "failed to delete temporary agent");
            }
            result
        })?
    }
}

/// Ask every question in order on one thread, printing each answer.
pub async fn ask_all<W: Write>(
    invoker: &dyn AgentInvoker,
    questions: &[String],
    output: &mut W,
) -> Result<()> {
    let conversation = Conversation::start(invoker)
        .await
        .context("failed to create conversation thread")?;
    let result = ask_each(&conversation, questions, output).await;
    conversation.finish(result).await
}

async fn ask_each<W: Write>(
    conversation: &Conversation<'_, dyn AgentInvoker + '_>,
    questions: &[String],
    output: &mut W,
) -> Result<()> {
    for question in questions {
        tracing::debug!(thread = %conversation.thread(), "asking question");
        let messages = conversation
            .send(question)
            .await
            .with_context(|| format!("agent invocation failed for '{question}'"))?;
        writeln!(output, "{} {question}", "You:".cyan().bold())?;
        writeln!(output, "{}", "Agent:".green().bold())?;
        if messages.is_empty() {
            writeln!(output, "{}", super::chat::NO_RESPONSE)?;
        }
        for message in &messages {
            writeln!(output, "{}", message.content)?;
        }
        writeln!(output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_are_answered_in_order_on_one_thread() {
        colored::control::set_override(false);
        let echo = EchoInvoker::new();
        let questions = vec![
            "Who was Alfred Hajos?".to_string(),
            "What are the latest achievements?".to_string(),
        ];
        let mut out = Vec::new();
        super::super::block_on(ask_all(&echo, &questions, &mut out))
            .unwrap()
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        let first = out.find("Agent:\nWho was Alfred Hajos?").unwrap();
        let second = out.find("Agent:\nWhat are the latest achievements?").unwrap();
        assert!(first < second);
        assert_eq!(echo.open_threads(), 0);
    }
}
