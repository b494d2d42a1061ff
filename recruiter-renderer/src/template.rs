//! Template parser and renderer.
//!
//! # Syntax
//!
//! | Marker               | Meaning                                             |
//! |----------------------|-----------------------------------------------------|
//! | `{{name}}`           | value of `name`, or nothing when absent             |
//! | `{{#if name}}`       | opens a conditional on the truthiness of `name`     |
//! | `{{else}}`           | optional separator, at most once per conditional    |
//! | `{{/if}}`            | closes the conditional                              |
//!
//! Whitespace inside a marker around the keyword and name is ignored
//! (`{{ name }}`, `{{#if  name }}`). Names are case-sensitive and contain no
//! whitespace or braces. Conditionals are one level deep; a `{{#if}}` inside an
//! open conditional is rejected. A lone `}}` is ordinary text.
//!
//! Parsing happens once ([`Template::parse`]); [`Template::render`] then walks
//! the segment list against any number of contexts without reparsing.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::context::Context;
use crate::error::{MalformedReason, RenderError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

// ---------------------------------------------------------------------------
// Segment tree
// ---------------------------------------------------------------------------

/// One node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, emitted verbatim.
    Text(String),
    /// `{{name}}`, substituted at render time.
    Placeholder(String),
    /// `{{#if name}} … {{else}} … {{/if}}`.
    Conditional(Conditional),
}

/// A conditional block. Branches only ever contain `Text` and `Placeholder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub name: String,
    pub then_branch: Vec<Segment>,
    pub else_branch: Option<Vec<Segment>>,
}

/// A parsed, immutable template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    source_len: usize,
}

impl Template {
    /// Parse `source` into a segment list.
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let segments = Parser::new(source).run()?;
        Ok(Template {
            segments,
            source_len: source.len(),
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Render against `ctx`; the result is trimmed once at the end.
    pub fn render(&self, ctx: &Context) -> String {
        let mut out = String::with_capacity(self.source_len);
        render_segments(&self.segments, ctx, &mut out);
        out.trim().to_string()
    }

    /// Every placeholder and condition name referenced, sorted.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_names(&self.segments, &mut names);
        names
    }
}

impl FromStr for Template {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

/// Parse `template` and render it against `ctx` in one call.
///
/// Prefer [`Template::parse`] + [`Template::render`] when the same template is
/// rendered more than once.
pub fn render(template: &str, ctx: &Context) -> Result<String, RenderError> {
    Ok(Template::parse(template)?.render(ctx))
}

fn render_segments(segments: &[Segment], ctx: &Context, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => out.push_str(ctx.get(name).unwrap_or_default()),
            Segment::Conditional(block) => {
                if ctx.is_truthy(&block.name) {
                    render_segments(&block.then_branch, ctx, out);
                } else if let Some(else_branch) = &block.else_branch {
                    render_segments(else_branch, ctx, out);
                }
            }
        }
    }
}

fn collect_names<'a>(segments: &'a [Segment], names: &mut BTreeSet<&'a str>) {
    for segment in segments {
        match segment {
            Segment::Text(_) => {}
            Segment::Placeholder(name) => {
                names.insert(name.as_str());
            }
            Segment::Conditional(block) => {
                names.insert(block.name.as_str());
                collect_names(&block.then_branch, names);
                if let Some(else_branch) = &block.else_branch {
                    collect_names(else_branch, names);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Tag<'a> {
    Placeholder(&'a str),
    If(&'a str),
    Else,
    EndIf,
}

/// A `{{ … }}` marker located in the source.
#[derive(Debug)]
struct Marker<'a> {
    /// Full marker text including braces.
    raw: &'a str,
    /// Byte offset of the opening `{{`.
    position: usize,
    tag: Tag<'a>,
}

fn classify(inner: &str) -> Result<Tag<'_>, MalformedReason> {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return Err(MalformedReason::EmptyMarker);
    }

    if let Some(rest) = trimmed.strip_prefix('#') {
        let (keyword, name) = match rest.split_once(char::is_whitespace) {
            Some((keyword, name)) => (keyword, name.trim()),
            None => (rest, ""),
        };
        if keyword != "if" {
            return Err(MalformedReason::UnknownMarker);
        }
        if name.is_empty() {
            return Err(MalformedReason::MissingCondition);
        }
        return valid_name(name).map(Tag::If);
    }

    if let Some(rest) = trimmed.strip_prefix('/') {
        return match rest.trim() {
            "if" => Ok(Tag::EndIf),
            _ => Err(MalformedReason::UnknownMarker),
        };
    }

    if trimmed == "else" {
        return Ok(Tag::Else);
    }

    valid_name(trimmed).map(Tag::Placeholder)
}

fn valid_name(name: &str) -> Result<&str, MalformedReason> {
    if name
        .chars()
        .any(|c| c.is_whitespace() || c == '{' || c == '}')
    {
        return Err(MalformedReason::InvalidName);
    }
    Ok(name)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// A conditional whose `{{/if}}` has not been seen yet.
struct OpenBlock<'a> {
    marker: &'a str,
    position: usize,
    name: &'a str,
    then_branch: Vec<Segment>,
    else_branch: Option<Vec<Segment>>,
}

struct Parser<'a> {
    source: &'a str,
    cursor: usize,
    segments: Vec<Segment>,
    open: Option<OpenBlock<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Parser {
            source,
            cursor: 0,
            segments: Vec::new(),
            open: None,
        }
    }

    fn run(mut self) -> Result<Vec<Segment>, RenderError> {
        while let Some(marker) = self.next_marker()? {
            self.apply(marker)?;
        }

        if let Some(block) = self.open.take() {
            return Err(self.malformed(
                block.marker,
                block.position,
                MalformedReason::UnclosedConditional,
            ));
        }
        Ok(self.segments)
    }

    /// Advance past the next marker, pushing any text before it.
    fn next_marker(&mut self) -> Result<Option<Marker<'a>>, RenderError> {
        let source = self.source;
        let rest = &source[self.cursor..];
        let Some(offset) = rest.find(OPEN) else {
            self.push_text(rest);
            self.cursor = source.len();
            return Ok(None);
        };

        let position = self.cursor + offset;
        self.push_text(&rest[..offset]);

        let inner_start = position + OPEN.len();
        let Some(close) = source[inner_start..].find(CLOSE) else {
            let raw = source[position..].lines().next().unwrap_or(OPEN);
            return Err(self.malformed(raw, position, MalformedReason::Unterminated));
        };

        let end = inner_start + close + CLOSE.len();
        let raw = &source[position..end];
        let inner = &source[inner_start..inner_start + close];
        self.cursor = end;

        let tag = classify(inner).map_err(|reason| self.malformed(raw, position, reason))?;
        Ok(Some(Marker { raw, position, tag }))
    }

    fn apply(&mut self, marker: Marker<'a>) -> Result<(), RenderError> {
        match marker.tag {
            Tag::Placeholder(name) => {
                self.sink().push(Segment::Placeholder(name.to_string()));
            }
            Tag::If(name) => {
                if self.open.is_some() {
                    return Err(self.malformed(
                        marker.raw,
                        marker.position,
                        MalformedReason::NestedConditional,
                    ));
                }
                self.open = Some(OpenBlock {
                    marker: marker.raw,
                    position: marker.position,
                    name,
                    then_branch: Vec::new(),
                    else_branch: None,
                });
            }
            Tag::Else => {
                let reason = match self.open.as_mut() {
                    None => Some(MalformedReason::StrayElse),
                    Some(block) if block.else_branch.is_some() => {
                        Some(MalformedReason::DuplicateElse)
                    }
                    Some(block) => {
                        block.else_branch = Some(Vec::new());
                        None
                    }
                };
                if let Some(reason) = reason {
                    return Err(self.malformed(marker.raw, marker.position, reason));
                }
            }
            Tag::EndIf => {
                let Some(block) = self.open.take() else {
                    return Err(self.malformed(
                        marker.raw,
                        marker.position,
                        MalformedReason::StrayEndIf,
                    ));
                };
                self.segments.push(Segment::Conditional(Conditional {
                    name: block.name.to_string(),
                    then_branch: block.then_branch,
                    else_branch: block.else_branch,
                }));
            }
        }
        Ok(())
    }

    /// Where text and placeholders currently land.
    fn sink(&mut self) -> &mut Vec<Segment> {
        match self.open.as_mut() {
            Some(OpenBlock {
                else_branch: Some(branch),
                ..
            }) => branch,
            Some(block) => &mut block.then_branch,
            None => &mut self.segments,
        }
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.sink().push(Segment::Text(text.to_string()));
        }
    }

    fn malformed(&self, marker: &str, position: usize, reason: MalformedReason) -> RenderError {
        let (line, column) = line_column(self.source, position);
        RenderError::MalformedTemplate {
            marker: marker.to_string(),
            position,
            line,
            column,
            reason,
        }
    }
}

/// 1-based line and column (in chars) of byte offset `position`.
fn line_column(source: &str, position: usize) -> (usize, usize) {
    let before = &source[..position];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
