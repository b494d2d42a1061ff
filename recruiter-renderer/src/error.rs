//! Error types for recruiter-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading or parsing templates.
///
/// Rendering a parsed [`Template`](crate::Template) never fails: missing
/// placeholders and condition names fall back to the empty string / falsy.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Unbalanced, nested, or unknown marker. `position` is the byte offset of
    /// the marker's opening `{{`; `line` and `column` are 1-based.
    #[error("malformed template: {reason} `{marker}` at line {line}, column {column} (offset {position})")]
    MalformedTemplate {
        marker: String,
        position: usize,
        line: usize,
        column: usize,
        reason: MalformedReason,
    },

    /// The template source has no template under this name.
    #[error("template '{name}' not found; available: {}", available.join(", "))]
    TemplateNotFound {
        name: String,
        available: Vec<String>,
    },

    /// The header section of a packaged template document is not valid YAML.
    #[error("invalid header in template document '{name}': {source}")]
    Header {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Why a marker was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("unterminated marker")]
    Unterminated,
    #[error("empty marker")]
    EmptyMarker,
    #[error("invalid name in marker")]
    InvalidName,
    #[error("unknown marker")]
    UnknownMarker,
    #[error("missing condition name in")]
    MissingCondition,
    #[error("nested conditional")]
    NestedConditional,
    #[error("`else` outside a conditional")]
    StrayElse,
    #[error("second `else` in one conditional")]
    DuplicateElse,
    #[error("`/if` without a matching `#if`")]
    StrayEndIf,
    #[error("conditional never closed, opened by")]
    UnclosedConditional,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}
