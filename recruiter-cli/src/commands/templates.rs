//! `recruiter templates list`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use recruiter_renderer::{Template, TemplateLibrary, TemplateSource};

use crate::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List embedded templates and directory overrides.
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: TemplatesCommand, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TemplatesCommand::List(args) => list(args, global),
    }
}

#[derive(Debug, Serialize)]
struct TemplateEntry {
    template: String,
    name: Option<String>,
    description: Option<String>,
    variables: Vec<String>,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "template")]
    template: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "description")]
    description: String,
    #[tabled(rename = "variables")]
    variables: String,
}

fn list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let library = super::library(global.templates_dir.as_deref())?;
    let entries = collect_entries(&library)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("failed to serialize template list")?
        );
        return Ok(());
    }

    let rows: Vec<TemplateRow> = entries
        .into_iter()
        .map(|entry| TemplateRow {
            template: entry.template,
            name: entry.name.unwrap_or_default(),
            description: entry.description.unwrap_or_default(),
            variables: entry.variables.join(", "),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

/// Declared input variables win; otherwise the names used in the body.
fn collect_entries(library: &TemplateLibrary) -> Result<Vec<TemplateEntry>> {
    library
        .names()
        .into_iter()
        .map(|template| {
            let doc = library
                .parsed(&template)
                .with_context(|| format!("failed to read template '{template}'"))?;
            let variables = if doc.header.input_variables.is_empty() {
                Template::parse(&doc.body)
                    .with_context(|| format!("template '{template}' is malformed"))?
                    .variables()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            } else {
                doc.header
                    .input_variables
                    .iter()
                    .map(|v| v.name.clone())
                    .collect()
            };
            Ok(TemplateEntry {
                template,
                name: doc.header.name,
                description: doc.header.description,
                variables,
            })
        })
        .collect()
}
