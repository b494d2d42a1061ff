//! `recruiter render`: render any template with `--var key=value` pairs.

use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Args;

use recruiter_renderer::source::extract_template_body;
use recruiter_renderer::{Context, Template, TemplateSource};

use crate::GlobalOpts;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template file, or a library template name with `--name`.
    pub target: String,

    /// Variable as `key=value`; repeatable.
    #[arg(long = "var", short = 'V', value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// The file is a packaged document; render only its template body.
    #[arg(long)]
    pub document: bool,

    /// Look `target` up in the template library instead of reading a file.
    #[arg(long, conflicts_with = "document")]
    pub name: bool,
}

impl RenderArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let body = if self.name {
            let library = super::library(global.templates_dir.as_deref())?;
            library
                .load(&self.target)
                .with_context(|| format!("failed to load template '{}'", self.target))?
        } else {
            let raw = super::read_input(Path::new(&self.target), "template")?;
            if self.document {
                extract_template_body(&raw)
            } else {
                raw
            }
        };

        let template = Template::parse(&body)
            .with_context(|| format!("failed to parse template '{}'", self.target))?;
        let ctx: Context = self.vars.into_iter().collect();

        let used = template.variables();
        for (name, _) in ctx.iter() {
            if !used.contains(name) {
                tracing::warn!(variable = name, "variable is not used by the template");
            }
        }
        println!("{}", template.render(&ctx));
        Ok(())
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_splits_on_first_equals() {
        assert_eq!(
            parse_var("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_var(" jobOffer =").unwrap(),
            ("jobOffer".to_string(), String::new())
        );
    }

    #[test]
    fn var_without_key_is_rejected() {
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }
}
