//! Agent invocation: the [`AgentInvoker`] seam, the Azure AI Foundry REST
//! client, thread lifecycle, and CV generation on top of them.

pub mod azure;
pub mod conversation;
pub mod cv;
mod error;
pub mod invoker;
mod logging;

pub use azure::{AgentDefinition, AzureAgentsClient, NewAgent, RunStatus};
pub use conversation::Conversation;
pub use cv::CvGenerator;
pub use error::AgentError;
pub use invoker::{AgentInvoker, EchoInvoker};
pub use logging::init_tracing;
