//! `recruiter chat`: interactive loop over one thread.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use recruiter_agent::{AgentInvoker, AzureAgentsClient, Conversation, EchoInvoker};

pub(crate) const NO_RESPONSE: &str = "I didn't receive a response. Please try again.";

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Echo prompts back instead of calling the agent.
    #[arg(long)]
    pub offline: bool,
}

impl ChatArgs {
    pub fn run(self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        if self.offline {
            let invoker = EchoInvoker::new();
            return super::block_on(session(&invoker, stdin.lock(), stdout.lock()))?;
        }

        let options = super::load_options()?;
        let client = AzureAgentsClient::from_options(&options)
            .context("invalid Azure AI settings (see recruiter.yaml or RECRUITER_AZURE_AI__*)")?;
        super::block_on(async {
            let agent_id = client.agent().cloned().context("no agent id configured")?;
            let definition = client
                .get_agent(&agent_id)
                .await
                .with_context(|| format!("failed to look up agent '{agent_id}'"))?;
            tracing::info!(
                agent = %definition.id,
                name = definition.name.as_deref().unwrap_or(""),
                model = %definition.model,
                "using existing agent"
            );
            session(&client, stdin.lock(), stdout.lock()).await
        })?
    }
}

fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Read turns from `input` until EOF or an exit word; the thread is deleted
/// on every path out.
pub async fn session<R: BufRead, W: Write>(
    invoker: &dyn AgentInvoker,
    mut input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output, "{}", "=== Recruiting Assistant Agent ===".bold())?;
    writeln!(output, "Ask me anything about recruiting, interviewing, or hiring!")?;
    writeln!(output, "Type 'exit' or 'quit' to end the conversation.\n")?;

    let conversation = Conversation::start(invoker)
        .await
        .context("failed to create conversation thread")?;
    tracing::debug!(thread = %conversation.thread(), "chat session started");

    let result = turns(&conversation, &mut input, &mut output).await;
    conversation.finish(result).await
}

async fn turns<R: BufRead, W: Write>(
    conversation: &Conversation<'_, dyn AgentInvoker + '_>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let mut line = String::new();
    loop {
        write!(output, "{}", "You: ".cyan().bold())?;
        output.flush()?;

        line.clear();
        let read = input.read_line(&mut line).context("failed to read input")?;
        if read == 0 || is_exit(&line) {
            writeln!(output, "\nGoodbye! Thanks for using the Recruiting Assistant.")?;
            return Ok(());
        }

        writeln!(output, "\n{}", "Agent:".green().bold())?;
        output.flush()?;
        let messages = conversation
            .send(line.trim())
            .await
            .context("agent invocation failed")?;

        if messages.is_empty() {
            writeln!(output, "{NO_RESPONSE}")?;
        }
        for message in &messages {
            writeln!(output, "{}", message.content)?;
        }
        writeln!(output)?;
    }
}
