//! Recruiter core library: domain types, configuration, errors.
//!
//! - [`types`]: id newtypes and conversation messages
//! - [`config`]: layered settings load / validate
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{AzureAiOptions, Settings};
pub use error::ConfigError;
pub use types::{join_contents, AgentId, AgentMessage, MessageRole, RunId, ThreadId};
