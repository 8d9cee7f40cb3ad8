//! deb822 source stanzas, as read by apt from `sources.list.d/*.sources`.

use std::fmt::Write;
use std::path::Path;

use crate::config::{SourceConfig, SourceType};
use crate::error::TemplateError;

/// Everything needed to render one stanza. Borrowed from the
/// [`SourceConfig`] plus the key path produced by the key writer.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub types: &'a [SourceType],
    pub uri: &'a str,
    pub suite: &'a str,
    pub components: &'a [String],
    pub signed_by: &'a Path,
}

impl<'a> RenderContext<'a> {
    pub fn new(source: &'a SourceConfig, signed_by: &'a Path) -> Self {
        Self {
            types: source.types(),
            uri: source.repo_uri(),
            suite: source.suite(),
            components: source.components(),
            signed_by,
        }
    }
}

/// Renders the stanza. Fields come out in a fixed order; list values are
/// space separated.
pub fn render(ctx: &RenderContext<'_>) -> Result<String, TemplateError> {
    let signed_by = ctx.signed_by.to_string_lossy();

    let fields: [(&'static str, String); 5] = [
        ("Types", join("Types", ctx.types.iter().map(SourceType::as_str))?),
        ("URIs", scalar("URIs", ctx.uri)?),
        ("Suites", scalar("Suites", ctx.suite)?),
        (
            "Components",
            join("Components", ctx.components.iter().map(String::as_str))?,
        ),
        ("Signed-By", scalar("Signed-By", &signed_by)?),
    ];

    let mut out = String::new();
    for (field, value) in &fields {
        writeln!(out, "{}: {}", field, value)?;
    }
    Ok(out)
}

fn scalar(field: &'static str, value: &str) -> Result<String, TemplateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || has_line_break(trimmed) {
        return Err(invalid(field, value));
    }
    Ok(trimmed.to_string())
}

fn join<'v>(
    field: &'static str,
    values: impl Iterator<Item = &'v str>,
) -> Result<String, TemplateError> {
    let mut joined = String::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(invalid(field, value));
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(trimmed);
    }
    if joined.is_empty() {
        return Err(invalid(field, ""));
    }
    Ok(joined)
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\n', '\r'])
}

fn invalid(field: &'static str, value: &str) -> TemplateError {
    TemplateError::InvalidValue {
        field,
        value: value.to_string(),
    }
}
