//! # recruiter-renderer
//!
//! Conditional prompt templating: `{{name}}` placeholders and one level of
//! `{{#if name}} … {{else}} … {{/if}}`, parsed once and rendered per call.
//!
//! ## Usage
//!
//! ```rust
//! use recruiter_renderer::{Context, Template};
//!
//! let template = Template::parse(
//!     "Candidate: {{jobProfile}}{{#if jobOffer}} Target role: {{jobOffer}}{{else}} No specific role targeted.{{/if}}",
//! )
//! .unwrap();
//!
//! let ctx = Context::new()
//!     .with("jobProfile", "Jane Doe")
//!     .with("jobOffer", "Senior Engineer");
//! assert_eq!(template.render(&ctx), "Candidate: Jane Doe Target role: Senior Engineer");
//!
//! let ctx = Context::new().with("jobProfile", "Jane Doe");
//! assert_eq!(template.render(&ctx), "Candidate: Jane Doe No specific role targeted.");
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod source;
pub mod template;

pub use builder::PromptBuilder;
pub use context::Context;
pub use error::{MalformedReason, RenderError};
pub use source::{TemplateDocument, TemplateLibrary, TemplateSource};
pub use template::{render, Segment, Template};
