//! `recruiter cv`: generate a CV, optionally tailored to a job offer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use recruiter_agent::{CvGenerator, EchoInvoker};

use crate::GlobalOpts;

#[derive(Args, Debug)]
pub struct CvArgs {
    /// File with the candidate's job profile.
    #[arg(long, value_name = "FILE")]
    pub profile: PathBuf,

    /// File with the job offer to tailor the CV for.
    #[arg(long, value_name = "FILE")]
    pub offer: Option<PathBuf>,

    /// Parse both inputs as JSON and pretty-print them into the prompt.
    #[arg(long)]
    pub json: bool,

    /// Print the rendered prompt and exit without calling the agent.
    #[arg(long)]
    pub print_prompt: bool,

    /// Echo the prompt back instead of calling the agent.
    #[arg(long)]
    pub offline: bool,
}

/// Profile and offer as read from disk.
enum Inputs {
    Text {
        profile: String,
        offer: Option<String>,
    },
    Json {
        profile: serde_json::Value,
        offer: Option<serde_json::Value>,
    },
}

impl Inputs {
    /// The strings substituted into the prompt.
    fn as_text(&self) -> Result<(String, Option<String>)> {
        match self {
            Inputs::Text { profile, offer } => Ok((profile.clone(), offer.clone())),
            Inputs::Json { profile, offer } => Ok((
                serde_json::to_string_pretty(profile).context("failed to format job profile")?,
                offer
                    .as_ref()
                    .map(|o| serde_json::to_string_pretty(o))
                    .transpose()
                    .context("failed to format job offer")?,
            )),
        }
    }
}

impl CvArgs {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        let inputs = self.read_inputs()?;
        let library = super::library(global.templates_dir.as_deref())?;

        if self.print_prompt {
            let generator = CvGenerator::from_source(EchoInvoker::new(), &library)
                .context("failed to prepare the CV template")?;
            let (profile, offer) = inputs.as_text()?;
            println!("{}", generator.prompt_for(&profile, offer.as_deref()));
            return Ok(());
        }

        let generator = CvGenerator::from_source(super::invoker(self.offline)?, &library)
            .context("failed to prepare the CV template")?;
        let cv = match &inputs {
            Inputs::Text { profile, offer } => {
                super::block_on(generator.generate(profile, offer.as_deref()))?
            }
            Inputs::Json { profile, offer } => {
                super::block_on(generator.generate_from_json(profile, offer.as_ref()))?
            }
        }
        .context("CV generation failed")?;
        println!("{cv}");
        Ok(())
    }

    fn read_inputs(&self) -> Result<Inputs> {
        let profile = super::read_input(&self.profile, "job profile")?;
        let offer = self
            .offer
            .as_deref()
            .map(|path| super::read_input(path, "job offer"))
            .transpose()?;
        if !self.json {
            return Ok(Inputs::Text { profile, offer });
        }
        Ok(Inputs::Json {
            profile: parse_json(&profile, "job profile")?,
            offer: offer.map(|o| parse_json(&o, "job offer")).transpose()?,
        })
    }
}

fn parse_json(raw: &str, what: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).with_context(|| format!("{what} is not valid JSON"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_inputs_are_pretty_printed_for_the_prompt() {
        let inputs = Inputs::Json {
            profile: json!({ "name": "Jane", "skills": ["rust"] }),
            offer: None,
        };
        let (profile, offer) = inputs.as_text().unwrap();
        assert_eq!(
            profile,
            "{\n  \"name\": \"Jane\",\n  \"skills\": [\n    \"rust\"\n  ]\n}"
        );
        assert!(offer.is_none());
    }

    #[test]
    fn invalid_json_names_the_input() {
        let err = parse_json("{not json", "job offer").unwrap_err();
        assert!(err.to_string().contains("job offer is not valid JSON"));
    }
}
