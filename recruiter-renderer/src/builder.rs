//! Prompt builder: one required value, one optional value, one template.

use crate::context::Context;
use crate::error::RenderError;
use crate::source::{TemplateSource, GENERATE_CV};
use crate::template::Template;

/// Context names used by the CV template.
pub const JOB_PROFILE: &str = "jobProfile";
pub const JOB_OFFER: &str = "jobOffer";

/// Builds prompts from a template parsed once at construction.
///
/// The builder owns its [`Template`]; `build` borrows it immutably, so one
/// builder can be shared across threads and tasks.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: Template,
    primary: String,
    secondary: String,
}

impl PromptBuilder {
    pub fn new(
        template: Template,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        PromptBuilder {
            template,
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// Load and parse `template_name` from `source`.
    pub fn from_source(
        source: &dyn TemplateSource,
        template_name: &str,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let body = source.load(template_name)?;
        let template = Template::parse(&body)?;
        Ok(Self::new(template, primary, secondary))
    }

    /// The CV prompt: `jobProfile` required, `jobOffer` optional.
    pub fn cv(source: &dyn TemplateSource) -> Result<Self, RenderError> {
        Self::from_source(source, GENERATE_CV, JOB_PROFILE, JOB_OFFER)
    }

    /// Render with `primary` always set and `secondary` set only when given.
    pub fn build(&self, primary: &str, secondary: Option<&str>) -> String {
        let mut ctx = Context::new();
        ctx.insert(self.primary.as_str(), primary);
        if let Some(value) = secondary {
            ctx.insert(self.secondary.as_str(), value);
        }
        self.template.render(&ctx).trim().to_string()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TemplateLibrary;

    fn builder(src: &str) -> PromptBuilder {
        PromptBuilder::new(Template::parse(src).unwrap(), JOB_PROFILE, JOB_OFFER)
    }

    #[test]
    fn primary_is_always_present_even_when_empty() {
        let b = builder("[{{jobProfile}}]{{#if jobProfile}} set{{/if}}");
        assert_eq!(b.build("", None), "[]");
        assert_eq!(b.build("x", None), "[x] set");
    }

    #[test]
    fn secondary_selects_branch() {
        let b = builder("{{#if jobOffer}}tailored: {{jobOffer}}{{else}}generic{{/if}}");
        assert_eq!(b.build("p", Some("Engineer")), "tailored: Engineer");
        assert_eq!(b.build("p", None), "generic");
        assert_eq!(b.build("p", Some("   ")), "generic");
    }

    #[test]
    fn output_is_trimmed() {
        let b = builder("\n\n  {{jobProfile}}  \n");
        assert_eq!(b.build("Jane", None), "Jane");
    }

    #[test]
    fn cv_builder_produces_tailored_and_generic_prompts() {
        let b = PromptBuilder::cv(&TemplateLibrary::embedded()).unwrap();

        let tailored = b.build("Jane Doe, 8 years Rust", Some("Senior Engineer at Acme"));
        assert!(tailored.contains("Jane Doe, 8 years Rust"));
        assert!(tailored.contains("Senior Engineer at Acme"));
        assert!(tailored.contains("INSTRUCTIONS FOR TAILORED CV"));
        assert!(!tailored.contains("INSTRUCTIONS FOR GENERIC CV"));

        let generic = b.build("Jane Doe, 8 years Rust", None);
        assert!(generic.contains("INSTRUCTIONS FOR GENERIC CV"));
        assert!(!generic.contains("TARGET JOB OFFER"));

        for prompt in [&tailored, &generic] {
            assert!(!prompt.contains("{{"), "markers must not survive: {prompt}");
        }
    }

    #[test]
    fn builder_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PromptBuilder>();

        let b = std::sync::Arc::new(builder("{{jobProfile}}/{{jobOffer}}"));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let b = b.clone();
                std::thread::spawn(move || b.build(&i.to_string(), Some("o")))
            })
            .collect();
        let mut out: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        out.sort();
        assert_eq!(out, vec!["0/o", "1/o", "2/o", "3/o"]);
    }
}
