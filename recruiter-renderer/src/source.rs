//! Template sources: embedded documents plus optional directory overrides.
//!
//! # Packaging format
//!
//! A template document is a YAML header followed by a `template: |` line; every
//! following line is the template body indented by two spaces:
//!
//! ```text
//! name: GenerateCV
//! description: Generate a CV from a job profile
//! template: |
//!   Candidate: {{jobProfile}}
//!   {{#if jobOffer}}Target role: {{jobOffer}}{{/if}}
//! ```
//!
//! [`extract_template_body`] strips the two-space prefix from each body line
//! and trims the result. A document without a `template: |` line is returned
//! whole (trimmed).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, RenderError};

/// Marker line that starts the template body.
pub const TEMPLATE_MARKER: &str = "template: |";
const BODY_INDENT: &str = "  ";

/// Name of the embedded CV prompt.
pub const GENERATE_CV: &str = "generate_cv";

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const EMBEDDED: &[(&str, &str)] = &[(GENERATE_CV, include_str!("templates/generate_cv.yaml"))];

// ---------------------------------------------------------------------------
// TemplateSource
// ---------------------------------------------------------------------------

/// Supplies template text by logical name.
pub trait TemplateSource {
    /// The raw packaged document stored under `name`.
    fn document(&self, name: &str) -> Result<&str, RenderError>;

    /// All names this source can serve, sorted.
    fn names(&self) -> Vec<String>;

    /// The template body of `name`, extracted from its document.
    fn load(&self, name: &str) -> Result<String, RenderError> {
        self.document(name).map(extract_template_body)
    }
}

/// Embedded templates merged with `.yaml` files from a user directory.
///
/// User files override embedded ones of the same name. Names are the file's
/// path relative to the directory, without extension, lowercased, with `/`
/// separators (`cv/short.yaml` → `cv/short`).
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    documents: BTreeMap<String, String>,
}

impl TemplateLibrary {
    /// Embedded templates only.
    pub fn embedded() -> Self {
        let documents = EMBEDDED
            .iter()
            .map(|(name, doc)| (name.to_string(), doc.to_string()))
            .collect();
        TemplateLibrary { documents }
    }

    /// Embedded templates plus any overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut library = Self::embedded();
        if let Some(dir) = user_template_dir {
            for (name, contents) in load_user_templates(dir)? {
                library.documents.insert(name, contents);
            }
        }
        Ok(library)
    }

    /// Parse the header and body of `name`.
    pub fn parsed(&self, name: &str) -> Result<TemplateDocument, RenderError> {
        TemplateDocument::parse(name, self.document(name)?)
    }
}

impl TemplateSource for TemplateLibrary {
    fn document(&self, name: &str) -> Result<&str, RenderError> {
        self.documents
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RenderError::TemplateNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    fn names(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Packaging format
// ---------------------------------------------------------------------------

/// Strip the header and the two-space body indentation from `document`.
pub fn extract_template_body(document: &str) -> String {
    let Some((_, body)) = split_document(document) else {
        return document.trim().to_string();
    };
    body.iter()
        .map(|line| match line.strip_prefix(BODY_INDENT) {
            Some(rest) if line.len() > BODY_INDENT.len() => rest,
            _ => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Split into header text and body lines at the `template: |` line.
fn split_document(document: &str) -> Option<(String, Vec<&str>)> {
    let lines: Vec<&str> = document
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let marker = lines.iter().position(|l| l.trim_end() == TEMPLATE_MARKER)?;
    let header = lines[..marker].join("\n");
    Some((header, lines[marker + 1..].to_vec()))
}

/// Header metadata of a packaged document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateHeader {
    pub name: Option<String>,
    pub description: Option<String>,
    pub template_format: Option<String>,
    #[serde(default)]
    pub input_variables: Vec<InputVariable>,
}

/// One declared input of a packaged template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputVariable {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: bool,
}

/// A packaged document split into header and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDocument {
    pub header: TemplateHeader,
    pub body: String,
}

impl TemplateDocument {
    /// `name` is only used in error messages.
    pub fn parse(name: &str, document: &str) -> Result<Self, RenderError> {
        let header = match split_document(document) {
            Some((header, _)) if !header.trim().is_empty() => serde_yaml::from_str(&header)
                .map_err(|e| RenderError::Header {
                    name: name.to_string(),
                    source: e,
                })?,
            _ => TemplateHeader::default(),
        };
        Ok(TemplateDocument {
            header,
            body: extract_template_body(document),
        })
    }
}

// ---------------------------------------------------------------------------
// User template loading helpers
// ---------------------------------------------------------------------------

fn normalize_template_name(path: &Path) -> String {
    path.with_extension("")
        .to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files.sort();
    let mut templates = Vec::new();
    for path in files {
        let ext = path.extension().and_then(|s| s.to_str());
        if !matches!(ext, Some("yaml") | Some("yml")) {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Template;
    use tempfile::TempDir;

    const DOC: &str = "name: Sample\ndescription: A sample\ntemplate: |\n  Hello {{who}}\n\n    indented more\n  bye\n";

    #[test]
    fn body_is_dedented_by_two_spaces_and_trimmed() {
        assert_eq!(
            extract_template_body(DOC),
            "Hello {{who}}\n\n  indented more\nbye"
        );
    }

    #[test]
    fn document_without_marker_is_returned_whole() {
        assert_eq!(extract_template_body("  just text  \n"), "just text");
    }

    #[test]
    fn crlf_documents_are_accepted() {
        let doc = "name: x\r\ntemplate: |\r\n  line one\r\n  line two\r\n";
        assert_eq!(extract_template_body(doc), "line one\nline two");
    }

    #[test]
    fn short_lines_keep_their_spaces() {
        let doc = "template: |\n  a\n  \n  b";
        assert_eq!(extract_template_body(doc), "a\n  \nb");
    }

    #[test]
    fn header_is_parsed() {
        let doc = TemplateDocument::parse("sample", DOC).unwrap();
        assert_eq!(doc.header.name.as_deref(), Some("Sample"));
        assert_eq!(doc.header.description.as_deref(), Some("A sample"));
        assert!(doc.header.input_variables.is_empty());
        assert!(doc.body.starts_with("Hello"));
    }

    #[test]
    fn invalid_header_names_the_document() {
        let err = TemplateDocument::parse("broken", "name: [unclosed\ntemplate: |\n  x").unwrap_err();
        assert!(matches!(err, RenderError::Header { .. }));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn embedded_cv_template_parses() {
        let library = TemplateLibrary::embedded();
        let body = library.load(GENERATE_CV).expect("embedded template");
        let template = Template::parse(&body).expect("embedded template is well-formed");
        let vars = template.variables();
        assert!(vars.contains("jobProfile"));
        assert!(vars.contains("jobOffer"));

        let doc = library.parsed(GENERATE_CV).unwrap();
        assert_eq!(doc.header.input_variables.len(), 2);
    }

    #[test]
    fn missing_template_lists_available_names() {
        let library = TemplateLibrary::embedded();
        let err = library.load("nope").unwrap_err();
        match &err {
            RenderError::TemplateNotFound { name, available } => {
                assert_eq!(name, "nope");
                assert_eq!(available, &vec![GENERATE_CV.to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("generate_cv"));
    }

    #[test]
    fn user_directory_overrides_and_extends() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("generate_cv.yaml"),
            "name: Override\ntemplate: |\n  custom {{jobProfile}}\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("Extra")).unwrap();
        std::fs::write(dir.path().join("Extra/Cover.yml"), "template: |\n  cover\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let library = TemplateLibrary::new(Some(dir.path())).unwrap();
        assert_eq!(library.names(), vec!["extra/cover", "generate_cv"]);
        assert_eq!(library.load(GENERATE_CV).unwrap(), "custom {{jobProfile}}");
        assert_eq!(library.load("extra/cover").unwrap(), "cover");
    }

    #[test]
    fn missing_user_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let library = TemplateLibrary::new(Some(&dir.path().join("absent"))).unwrap();
        assert_eq!(library.names(), vec![GENERATE_CV]);
    }
}
