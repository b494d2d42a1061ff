pub mod ask;
pub mod chat;
pub mod cv;
pub mod render;
pub mod templates;

use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};

use recruiter_agent::{AgentInvoker, AzureAgentsClient, EchoInvoker};
use recruiter_core::{config, AzureAiOptions};
use recruiter_renderer::TemplateLibrary;

/// Run `future` to completion on a fresh multi-thread runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Layered settings from the working directory, home, and environment.
pub fn load_options() -> Result<AzureAiOptions> {
    let settings = config::load().context("failed to load recruiter settings")?;
    Ok(settings.azure_ai)
}

/// The configured remote agent, or the echo invoker when `offline`.
pub fn invoker(offline: bool) -> Result<Box<dyn AgentInvoker>> {
    if offline {
        tracing::info!("offline mode: replies echo the prompt");
        return Ok(Box::new(EchoInvoker::new()));
    }
    let options = load_options()?;
    let client = AzureAgentsClient::from_options(&options)
        .context("invalid Azure AI settings (see recruiter.yaml or RECRUITER_AZURE_AI__*)")?;
    Ok(Box::new(client))
}

pub fn library(templates_dir: Option<&Path>) -> Result<TemplateLibrary> {
    TemplateLibrary::new(templates_dir).with_context(|| match templates_dir {
        Some(dir) => format!("failed to load templates from {}", dir.display()),
        None => "failed to load embedded templates".to_string(),
    })
}

pub fn read_input(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))
}
